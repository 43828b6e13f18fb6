//! Layout calculator - sheet geometry for 1, 2 or 4 cards per letter page.
//!
//! Card sizes are derived from the page: the grid fills the area inside a
//! uniform margin exactly, so every layout is centered and nothing clips.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Slack allowed when comparing summed inch values against the page size.
const FIT_TOLERANCE_IN: f64 = 1e-9;

/// Smallest margin a home printer is expected to print inside.
pub const MIN_MARGIN_IN: f64 = 0.25;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("invalid configuration: {0} cards per page (expected 1, 2 or 4)")]
    InvalidConfiguration(u8),
}

/// Physical page size in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width_in: f64,
    pub height_in: f64,
}

impl PageGeometry {
    /// US letter, 8.5 x 11 in.
    pub const LETTER: PageGeometry = PageGeometry {
        width_in: 8.5,
        height_in: 11.0,
    };
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::LETTER
    }
}

/// Supported card densities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CardsPerPage {
    One,
    Two,
    Four,
}

impl CardsPerPage {
    pub fn count(self) -> usize {
        match self {
            CardsPerPage::One => 1,
            CardsPerPage::Two => 2,
            CardsPerPage::Four => 4,
        }
    }

    /// Type size tier for this density. Fewer cards per page means larger type.
    pub fn font_scale(self) -> FontScale {
        match self {
            CardsPerPage::One => FontScale::Large,
            CardsPerPage::Two => FontScale::Medium,
            CardsPerPage::Four => FontScale::Standard,
        }
    }
}

impl TryFrom<u8> for CardsPerPage {
    type Error = LayoutError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(CardsPerPage::One),
            2 => Ok(CardsPerPage::Two),
            4 => Ok(CardsPerPage::Four),
            other => Err(LayoutError::InvalidConfiguration(other)),
        }
    }
}

impl From<CardsPerPage> for u8 {
    fn from(value: CardsPerPage) -> Self {
        value.count() as u8
    }
}

impl Default for CardsPerPage {
    fn default() -> Self {
        CardsPerPage::Four
    }
}

/// Font size tier used by the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontScale {
    Large,
    Medium,
    Standard,
}

impl FontScale {
    /// Multiplier applied to the base type sizes of every style role.
    pub fn multiplier(self) -> f64 {
        match self {
            FontScale::Large => 1.5,
            FontScale::Medium => 1.25,
            FontScale::Standard => 1.0,
        }
    }
}

/// Resolved sheet geometry for one PDF generation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutSpec {
    pub cards_per_page: CardsPerPage,
    pub card_width_in: f64,
    pub card_height_in: f64,
    pub grid_cols: usize,
    pub grid_rows: usize,
    pub page_margin_in: f64,
    pub gap_in: f64,
    pub page: PageGeometry,
}

impl LayoutSpec {
    /// Build a layout whose grid exactly fills the page inside `margin`.
    fn filling(
        cards_per_page: CardsPerPage,
        page: PageGeometry,
        grid_cols: usize,
        grid_rows: usize,
        margin: f64,
        gap: f64,
    ) -> Self {
        let card_width_in =
            (page.width_in - 2.0 * margin - (grid_cols as f64 - 1.0) * gap) / grid_cols as f64;
        let card_height_in =
            (page.height_in - 2.0 * margin - (grid_rows as f64 - 1.0) * gap) / grid_rows as f64;

        Self {
            cards_per_page,
            card_width_in,
            card_height_in,
            grid_cols,
            grid_rows,
            page_margin_in: margin,
            gap_in: gap,
            page,
        }
    }

    pub fn slots_per_page(&self) -> usize {
        self.grid_cols * self.grid_rows
    }

    /// Width taken by the packed grid including both margins.
    pub fn used_width_in(&self) -> f64 {
        let cols = self.grid_cols as f64;
        cols * self.card_width_in + (cols - 1.0) * self.gap_in + 2.0 * self.page_margin_in
    }

    /// Height taken by the packed grid including both margins.
    pub fn used_height_in(&self) -> f64 {
        let rows = self.grid_rows as f64;
        rows * self.card_height_in + (rows - 1.0) * self.gap_in + 2.0 * self.page_margin_in
    }

    /// Whether the grid fits on the physical page without clipping.
    pub fn fits_page(&self) -> bool {
        self.page_margin_in + FIT_TOLERANCE_IN >= MIN_MARGIN_IN
            && self.grid_cols * self.grid_rows >= self.cards_per_page.count()
            && self.used_width_in() <= self.page.width_in + FIT_TOLERANCE_IN
            && self.used_height_in() <= self.page.height_in + FIT_TOLERANCE_IN
    }

    /// Top-left corner of the slot at (`row`, `col`), in inches from the page origin.
    pub fn slot_origin(&self, row: usize, col: usize) -> (f64, f64) {
        let left = self.page_margin_in + col as f64 * (self.card_width_in + self.gap_in);
        let top = self.page_margin_in + row as f64 * (self.card_height_in + self.gap_in);
        (left, top)
    }

    pub fn font_scale(&self) -> FontScale {
        self.cards_per_page.font_scale()
    }
}

/// Compute the letter-page layout for `cards_per_page` (1, 2 or 4).
pub fn compute_layout(cards_per_page: u8) -> Result<LayoutSpec, LayoutError> {
    let density = CardsPerPage::try_from(cards_per_page)?;
    Ok(layout_for(density, PageGeometry::LETTER))
}

/// Layout for an already validated density on an arbitrary page.
pub fn layout_for(density: CardsPerPage, page: PageGeometry) -> LayoutSpec {
    match density {
        // Single large card, generous margin.
        CardsPerPage::One => LayoutSpec::filling(density, page, 1, 1, 0.75, 0.0),
        // Two cards stacked vertically.
        CardsPerPage::Two => LayoutSpec::filling(density, page, 1, 2, 0.5, 0.2),
        CardsPerPage::Four => LayoutSpec::filling(density, page, 2, 2, MIN_MARGIN_IN, 0.1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_all_densities_fit_letter() {
        for k in [1u8, 2, 4] {
            let layout = compute_layout(k).unwrap();
            assert!(layout.fits_page(), "layout for {} does not fit", k);
            assert!(layout.slots_per_page() >= k as usize);
            assert!(layout.used_width_in() <= 8.5 + 1e-9);
            assert!(layout.used_height_in() <= 11.0 + 1e-9);
            assert!(layout.page_margin_in >= MIN_MARGIN_IN);
        }
    }

    #[test]
    fn test_single_card_dimensions() {
        let layout = compute_layout(1).unwrap();
        assert_eq!((layout.grid_cols, layout.grid_rows), (1, 1));
        assert!(approx(layout.card_width_in, 7.0));
        assert!(approx(layout.card_height_in, 9.5));
    }

    #[test]
    fn test_two_cards_stack_vertically() {
        let layout = compute_layout(2).unwrap();
        assert_eq!((layout.grid_cols, layout.grid_rows), (1, 2));
        assert!(approx(layout.card_width_in, 7.5));
        assert!(approx(layout.card_height_in, 4.9));
        assert!(layout.gap_in >= 0.15 && layout.gap_in <= 0.25);
    }

    #[test]
    fn test_four_cards_grid() {
        let layout = compute_layout(4).unwrap();
        assert_eq!((layout.grid_cols, layout.grid_rows), (2, 2));
        assert!(approx(layout.card_width_in, 3.95));
        assert!(approx(layout.card_height_in, 5.2));
    }

    #[test]
    fn test_invalid_densities_rejected() {
        for k in [0u8, 3, 5, 6, 8, 255] {
            assert_eq!(
                compute_layout(k),
                Err(LayoutError::InvalidConfiguration(k))
            );
        }
    }

    #[test]
    fn test_font_scale_is_monotonic() {
        let one = CardsPerPage::One.font_scale().multiplier();
        let two = CardsPerPage::Two.font_scale().multiplier();
        let four = CardsPerPage::Four.font_scale().multiplier();
        assert!(one > two);
        assert!(two > four);
    }

    #[test]
    fn test_slot_origin_row_major() {
        let layout = compute_layout(4).unwrap();
        let (left, top) = layout.slot_origin(1, 1);
        assert!(approx(left, 0.25 + 3.95 + 0.1));
        assert!(approx(top, 0.25 + 5.2 + 0.1));
    }

    #[test]
    fn test_cards_per_page_serde() {
        let parsed: CardsPerPage = serde_json::from_str("2").unwrap();
        assert_eq!(parsed, CardsPerPage::Two);
        assert!(serde_json::from_str::<CardsPerPage>("3").is_err());
        assert_eq!(serde_json::to_string(&CardsPerPage::Four).unwrap(), "4");
    }
}
