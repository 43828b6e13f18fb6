//! Deterministic messages used when no remote provider answers.

use super::{MessageRequest, Tone};

/// Tone-keyed message bodies. The card already prints the greeting and the
/// signature, so these are body text only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalMessages;

impl LocalMessages {
    pub fn generate(&self, request: &MessageRequest) -> String {
        let gift = request
            .gift
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_lowercase);
        let first_name = request
            .recipient_name
            .split_whitespace()
            .next()
            .unwrap_or(&request.recipient_name);

        match (request.tone, gift) {
            (Tone::Warm, Some(gift)) => format!(
                "We can't thank you enough for being part of our special day and for your incredibly thoughtful {}. It means the world to us that you took the time to celebrate with us, and your generosity has touched our hearts deeply. We're so grateful to have you in our lives!",
                gift
            ),
            (Tone::Warm, None) => "We can't thank you enough for being part of our special day. It means the world to us that you took the time to celebrate with us, and your generosity has touched our hearts deeply. We're so grateful to have you in our lives!".to_string(),
            (Tone::Formal, Some(gift)) => format!(
                "We wish to express our sincere gratitude for your presence at our wedding and for your generous gift of {}. Your thoughtfulness is deeply appreciated as we begin our married life together. We are honored to have shared this special occasion with you.",
                gift
            ),
            (Tone::Formal, None) => "We wish to express our sincere gratitude for your presence at our wedding and for your generosity. Your thoughtfulness is deeply appreciated as we begin our married life together. We are honored to have shared this special occasion with you.".to_string(),
            (Tone::Casual, Some(gift)) => format!(
                "Hey {}! Thanks so much for coming to our wedding and for the awesome {}! We had such a blast celebrating with you. Your gift is going to be so useful as we set up our new place together. Really appreciate you being there!",
                first_name, gift
            ),
            (Tone::Casual, None) => format!(
                "Hey {}! Thanks so much for coming to our wedding! We had such a blast celebrating with you. Really appreciate you being there!",
                first_name
            ),
            (Tone::Poetic, Some(gift)) => format!(
                "Like stars that light the evening sky,\nYour presence made our wedding shine.\nYour gift of {}, so thoughtful and kind,\nFills our hearts with joy divine.\n\nThank you for sharing in our love's sweet story,\nAnd for being part of our forever.",
                gift
            ),
            (Tone::Poetic, None) => "Like stars that light the evening sky,\nYour presence made our wedding shine.\nSo thoughtful, generous and kind,\nYou fill our hearts with joy divine.\n\nThank you for sharing in our love's sweet story,\nAnd for being part of our forever.".to_string(),
        }
    }
}
