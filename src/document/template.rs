//! Card templates - the closed set of visual styles a customer can pick.
//!
//! Every template supplies style declarations per [`StyleRole`]. The composer
//! owns type sizes (they scale with cards-per-page), so templates only carry
//! families, colours, borders and spacing.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

/// Semantic parts of a card that a template can style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleRole {
    Card,
    Header,
    Recipient,
    Message,
    Signature,
    Name,
}

impl StyleRole {
    pub const ALL: [StyleRole; 6] = [
        StyleRole::Card,
        StyleRole::Header,
        StyleRole::Recipient,
        StyleRole::Message,
        StyleRole::Signature,
        StyleRole::Name,
    ];

    /// CSS class used for this role in the composed markup.
    pub fn class_name(self) -> &'static str {
        match self {
            StyleRole::Card => "card",
            StyleRole::Header => "header",
            StyleRole::Recipient => "recipient",
            StyleRole::Message => "message",
            StyleRole::Signature => "signature-text",
            StyleRole::Name => "names",
        }
    }

    /// Base type size in points for a 4-up card.
    pub fn base_font_size_pt(self) -> Option<f64> {
        match self {
            StyleRole::Card => None,
            StyleRole::Header => Some(26.0),
            StyleRole::Recipient => Some(12.0),
            StyleRole::Message => Some(10.0),
            StyleRole::Signature => Some(9.0),
            StyleRole::Name => Some(17.0),
        }
    }
}

/// Declares `Template` with its id and display name, and `Template::ALL`
/// from one list, so a variant cannot be missing from the catalogue or the
/// parser.
macro_rules! templates {
    ($($variant:ident => $id:literal, $name:literal;)+) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
        #[serde(rename_all = "lowercase")]
        pub enum Template {
            $($variant,)+
        }

        impl Template {
            pub const ALL: &'static [Template] = &[$(Template::$variant,)+];

            pub fn id(self) -> &'static str {
                match self {
                    $(Template::$variant => $id,)+
                }
            }

            pub fn display_name(self) -> &'static str {
                match self {
                    $(Template::$variant => $name,)+
                }
            }
        }
    };
}

templates! {
    Classic => "classic", "Classic Elegance";
    Modern => "modern", "Modern Minimal";
    Romantic => "romantic", "Romantic Blush";
    Botanical => "botanical", "Botanical";
    Vintage => "vintage", "Vintage Charm";
    Champagne => "champagne", "Champagne Luxe";
    Rustic => "rustic", "Rustic";
    Watercolor => "watercolor", "Watercolor";
    Formal => "formal", "Formal";
    Minimal => "minimal", "Minimal";
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown template '{0}'")]
pub struct UnknownTemplate(pub String);

const SERIF_DISPLAY: &str = "font-family: 'Playfair Display', serif;";
const SERIF_BODY: &str = "font-family: 'Cormorant Garamond', serif;";
const SANS: &str = "font-family: 'Inter', sans-serif;";

const HEADER: &str = "color: #5c4a3d;";
const HEADER_CAPS: &str = "color: #2d2d2d; letter-spacing: 2px; text-transform: uppercase;";
const RECIPIENT: &str = "color: #4a3f35; font-weight: 500;";
const MESSAGE: &str = "color: #3d3d3d;";
const SIGNATURE: &str = "color: #6b5a4a; font-style: italic;";
const SIGNATURE_PLAIN: &str = "color: #7a7a7a; letter-spacing: 0.5px;";
const NAME: &str = "color: #5c4a3d;";
const BLUSH: &str = "color: #c9a89a;";

/// Per-role declarations of one template.
struct Palette {
    sans: bool,
    card: &'static str,
    header: &'static str,
    recipient: &'static str,
    message: &'static str,
    signature: &'static str,
    name: &'static str,
}

impl Palette {
    const fn serif(card: &'static str) -> Self {
        Self {
            sans: false,
            card,
            header: HEADER,
            recipient: RECIPIENT,
            message: MESSAGE,
            signature: SIGNATURE,
            name: NAME,
        }
    }
}

impl Template {
    /// Look up a template id, falling back to [`Template::Classic`].
    pub fn resolve(id: &str) -> Template {
        match id.parse() {
            Ok(template) => template,
            Err(UnknownTemplate(id)) => {
                log::warn!("Unknown template '{}', falling back to classic", id);
                Template::Classic
            }
        }
    }

    /// Style declarations for `role`, without the selector.
    pub fn declarations(self, role: StyleRole) -> String {
        let palette = self.palette();
        match palette.font_family(role) {
            Some(family) => format!("{} {}", family, palette.role(role)),
            None => palette.role(role).to_string(),
        }
    }

    fn palette(self) -> Palette {
        match self {
            Template::Classic => Palette::serif("background: #fefefe; border: 3px double #c9b8a8;"),
            Template::Modern => Palette {
                sans: true,
                card: "background: #ffffff; box-shadow: inset 0 0 0 1px #e0e0e0;",
                header: HEADER_CAPS,
                recipient: "color: #5a5a5a; letter-spacing: 1px; text-transform: uppercase;",
                message: MESSAGE,
                signature: SIGNATURE_PLAIN,
                name: "color: #4a4a4a;",
            },
            Template::Romantic => Palette {
                sans: false,
                card: "background: linear-gradient(180deg, #fff5f2 0%, #f9eae5 100%); border: 1px solid #e8d4cc;",
                header: "color: #c9a89a; font-style: italic;",
                recipient: "color: #8b6b5a;",
                message: "color: #5c4a3d;",
                signature: "color: #a89080; font-style: italic;",
                name: BLUSH,
            },
            Template::Botanical => Palette::serif("background: #f5f8f5; border: 2px solid #b8c4b8;"),
            Template::Vintage => Palette::serif("background: #faf8f5; border: 2px solid #c9b8a8;"),
            Template::Champagne => Palette::serif(
                "background: linear-gradient(135deg, #faf9f7 0%, #f0ece5 100%); border: 3px solid #b8a090;",
            ),
            Template::Rustic => Palette::serif("background: #fdfcfa; border: 2px dashed #b8a090;"),
            Template::Watercolor => Palette {
                header: BLUSH,
                name: BLUSH,
                ..Palette::serif("background: linear-gradient(135deg, #fff9f7 0%, #fdf5f0 100%);")
            },
            Template::Formal => Palette::serif(
                "background: white; box-shadow: inset 0 0 0 2px #d4c5b5, inset 0 0 0 4px white, inset 0 0 0 5px #d4c5b5;",
            ),
            Template::Minimal => Palette {
                sans: true,
                header: HEADER_CAPS,
                signature: SIGNATURE_PLAIN,
                ..Palette::serif("background: white; border: 1px solid #e5e5e5;")
            },
        }
    }
}

impl Palette {
    fn font_family(&self, role: StyleRole) -> Option<&'static str> {
        match role {
            StyleRole::Card => None,
            StyleRole::Header if self.sans => Some(SANS),
            StyleRole::Header | StyleRole::Name => Some(SERIF_DISPLAY),
            StyleRole::Recipient | StyleRole::Message | StyleRole::Signature if self.sans => {
                Some(SANS)
            }
            StyleRole::Recipient | StyleRole::Message | StyleRole::Signature => Some(SERIF_BODY),
        }
    }

    fn role(&self, role: StyleRole) -> &'static str {
        match role {
            StyleRole::Card => self.card,
            StyleRole::Header => self.header,
            StyleRole::Recipient => self.recipient,
            StyleRole::Message => self.message,
            StyleRole::Signature => self.signature,
            StyleRole::Name => self.name,
        }
    }
}

impl Default for Template {
    fn default() -> Self {
        Template::Classic
    }
}

impl FromStr for Template {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Template::ALL
            .iter()
            .copied()
            .find(|template| template.id() == wanted)
            .ok_or_else(|| UnknownTemplate(s.to_string()))
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Template entry for the public catalogue.
#[derive(Debug, Serialize, ToSchema)]
pub struct TemplateInfo {
    pub id: String,
    pub name: String,
}

impl From<Template> for TemplateInfo {
    fn from(template: Template) -> Self {
        Self {
            id: template.id().to_string(),
            name: template.display_name().to_string(),
        }
    }
}
