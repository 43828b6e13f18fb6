//! Stock thank-you messages chosen by gift type.

/// Rough gift categories used to pick a prewritten message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiftKind {
    Cash,
    GiftCard,
    Other,
}

impl GiftKind {
    pub fn classify(gift: Option<&str>) -> GiftKind {
        let gift = gift.unwrap_or_default().to_lowercase();
        if gift.contains("cash") {
            GiftKind::Cash
        } else if gift.contains("card") {
            GiftKind::GiftCard
        } else {
            GiftKind::Other
        }
    }
}

const CASH_MESSAGE: &str = "Time has truly flown since our beautiful wedding day. Your generous gift has been such a blessing as we've settled into married life together. We have been putting it toward creating our home, and every time we make a purchase, we think of your kindness and generosity. Thank you so much for celebrating with us and for your thoughtful gift.";

const GIFT_CARD_MESSAGE: &str = "We were so happy you could join us on our special day! Your gift card was incredibly thoughtful and will help us as we build our life together. We've already started planning how to use it for our home. Thank you for your generosity and for being part of our celebration.";

const OTHER_MESSAGE: &str = "What a wonderful celebration we had, and having you there made it even more special! Your thoughtful gift means so much to us as we begin this new chapter. We're so grateful for your presence and your generosity. Thank you from the bottom of our hearts!";

/// Prewritten message for a guest, picked by the kind of gift they gave.
pub fn prewritten_message(gift: Option<&str>) -> &'static str {
    match GiftKind::classify(gift) {
        GiftKind::Cash => CASH_MESSAGE,
        GiftKind::GiftCard => GIFT_CARD_MESSAGE,
        GiftKind::Other => OTHER_MESSAGE,
    }
}

/// Message used for uploaded rows that have no message column value.
pub fn default_message(gift: Option<&str>) -> String {
    let gift_clause = match gift.map(str::trim).filter(|g| !g.is_empty()) {
        Some(gift) => format!(" of {}", gift),
        None => String::new(),
    };
    format!(
        "Thank you so much for your generous gift{}. Your kindness means the world to us as we begin this new chapter together.",
        gift_clause
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(GiftKind::classify(Some("Cash gift - $200")), GiftKind::Cash);
        assert_eq!(
            GiftKind::classify(Some("Target gift card - $50")),
            GiftKind::GiftCard
        );
        assert_eq!(GiftKind::classify(Some("Instant Pot")), GiftKind::Other);
        assert_eq!(GiftKind::classify(None), GiftKind::Other);
    }

    #[test]
    fn test_prewritten_message_by_kind() {
        assert!(prewritten_message(Some("CASH")).contains("generous gift"));
        assert!(prewritten_message(Some("Amazon gift card")).contains("gift card"));
        assert!(prewritten_message(Some("Handmade quilt")).starts_with("What a wonderful"));
    }

    #[test]
    fn test_default_message() {
        assert!(default_message(Some("Vase")).starts_with("Thank you so much for your generous gift of Vase."));
        assert!(default_message(Some("  ")).starts_with("Thank you so much for your generous gift."));
        assert!(default_message(None).starts_with("Thank you so much for your generous gift."));
    }
}
