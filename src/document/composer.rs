//! Page composer - partitions cards into sheets and places them on the grid.

use super::model::{Card, Document, Page, PlacedCard, Signature, Slot, SlotContent};
use super::template::Template;
use super::ComposeError;
use crate::layout::LayoutSpec;

/// Compose `cards` into sheets using the template named `template_id`.
///
/// Unknown template ids fall back to the classic template.
pub fn compose(
    cards: &[Card],
    template_id: &str,
    layout: &LayoutSpec,
    signature: &Signature,
) -> Result<Document, ComposeError> {
    compose_with_template(cards, Template::resolve(template_id), layout, signature)
}

/// Compose with an already resolved template.
pub fn compose_with_template(
    cards: &[Card],
    template: Template,
    layout: &LayoutSpec,
    signature: &Signature,
) -> Result<Document, ComposeError> {
    if cards.is_empty() {
        return Err(ComposeError::EmptyInput);
    }
    if !layout.fits_page() {
        return Err(ComposeError::LayoutOverflow);
    }

    let per_page = layout.cards_per_page.count();
    let pages = cards
        .chunks(per_page)
        .enumerate()
        .map(|(page_idx, chunk)| compose_page(page_idx, chunk, per_page, layout))
        .collect();

    Ok(Document {
        template,
        layout: *layout,
        signature: signature.clone(),
        pages,
    })
}

/// Compose only the first sheet, as shown to customers before payment.
pub fn compose_preview(
    cards: &[Card],
    template_id: &str,
    layout: &LayoutSpec,
    signature: &Signature,
) -> Result<Document, ComposeError> {
    let first_sheet = cards.len().min(layout.cards_per_page.count());
    compose(&cards[..first_sheet], template_id, layout, signature)
}

fn compose_page(page_idx: usize, chunk: &[Card], per_page: usize, layout: &LayoutSpec) -> Page {
    let first_index = page_idx * per_page;

    let slots = (0..per_page)
        .map(|i| {
            let col = i % layout.grid_cols;
            let row = i / layout.grid_cols;
            let (left_in, top_in) = layout.slot_origin(row, col);

            let content = match chunk.get(i) {
                Some(card) => SlotContent::Card(PlacedCard {
                    index: first_index + i,
                    card: card.clone(),
                }),
                None => SlotContent::Placeholder,
            };

            Slot {
                row,
                col,
                left_in,
                top_in,
                content,
            }
        })
        .collect();

    Page {
        number: page_idx + 1,
        slots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_layout;

    fn guests(n: usize) -> Vec<Card> {
        (0..n)
            .map(|i| Card::new(format!("Guest {}", i), Some("Gift"), "Thank you!"))
            .collect()
    }

    fn signature() -> Signature {
        Signature::new("Collin and Annika")
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let layout = compute_layout(4).unwrap();
        let result = compose(&[], "classic", &layout, &signature());
        assert_eq!(result.unwrap_err(), ComposeError::EmptyInput);
    }

    #[test]
    fn test_page_count_is_ceiling() {
        for k in [1u8, 2, 4] {
            let layout = compute_layout(k).unwrap();
            for n in 1..=13usize {
                let doc = compose(&guests(n), "classic", &layout, &signature()).unwrap();
                let expected = (n + k as usize - 1) / k as usize;
                assert_eq!(doc.page_count(), expected, "n={} k={}", n, k);
            }
        }
    }

    #[test]
    fn test_order_is_preserved() {
        let layout = compute_layout(4).unwrap();
        let cards = guests(9);
        let doc = compose(&cards, "modern", &layout, &signature()).unwrap();

        let flattened: Vec<Card> = doc.cards().map(|placed| placed.card.clone()).collect();
        assert_eq!(flattened, cards);

        let indices: Vec<usize> = doc.cards().map(|placed| placed.index).collect();
        assert_eq!(indices, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_last_page_is_padded() {
        let layout = compute_layout(4).unwrap();
        let doc = compose(&guests(1), "classic", &layout, &signature()).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.pages[0].slots.len(), 4);
        assert_eq!(doc.pages[0].cards().count(), 1);
        assert_eq!(doc.pages[0].placeholder_count(), 3);
    }

    #[test]
    fn test_full_pages_have_no_placeholders() {
        let layout = compute_layout(2).unwrap();
        let doc = compose(&guests(6), "classic", &layout, &signature()).unwrap();
        assert!(doc.pages.iter().all(|page| page.placeholder_count() == 0));
    }

    #[test]
    fn test_positions_follow_grid() {
        let layout = compute_layout(4).unwrap();
        let doc = compose(&guests(4), "classic", &layout, &signature()).unwrap();
        let slot = &doc.pages[0].slots[3];
        assert_eq!((slot.row, slot.col), (1, 1));
        let expected_left = layout.page_margin_in + layout.card_width_in + layout.gap_in;
        let expected_top = layout.page_margin_in + layout.card_height_in + layout.gap_in;
        assert!((slot.left_in - expected_left).abs() < 1e-9);
        assert!((slot.top_in - expected_top).abs() < 1e-9);
    }

    #[test]
    fn test_overflowing_layout_is_rejected() {
        let mut layout = compute_layout(4).unwrap();
        layout.card_width_in = 5.0;
        let result = compose(&guests(2), "classic", &layout, &signature());
        assert_eq!(result.unwrap_err(), ComposeError::LayoutOverflow);
    }

    #[test]
    fn test_preview_is_first_sheet_only() {
        let layout = compute_layout(2).unwrap();
        let doc = compose_preview(&guests(7), "classic", &layout, &signature()).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.card_count(), 2);
    }
}
