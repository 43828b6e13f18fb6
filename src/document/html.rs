//! Markup and stylesheet emission for composed documents.
//!
//! Output is a self-contained HTML page per sheet, with every card absolutely
//! positioned in inches so the renderer cannot reflow the grid.

use std::fmt::Write;

use super::escape::{escape_html, escape_multiline};
use super::model::{Document, Slot, SlotContent};
use super::template::StyleRole;

const FONTS_LINK: &str = "https://fonts.googleapis.com/css2?family=Playfair+Display:wght@400;500;600&family=Cormorant+Garamond:wght@300;400;500&family=Inter:wght@300;400;500&display=swap";

/// Fixed header printed on every card.
pub const CARD_HEADER: &str = "Thank You";

/// Format an inch value with fixed precision so output is byte-stable.
fn inches(value: f64) -> String {
    format!("{:.4}in", value)
}

impl Document {
    pub fn stylesheet(&self) -> String {
        let layout = &self.layout;
        let scale = layout.font_scale().multiplier();
        let padding = layout.card_width_in.min(layout.card_height_in) * 0.1;

        let mut css = String::new();
        let _ = writeln!(
            css,
            "@page {{ size: {} {}; margin: 0; }}",
            inches(layout.page.width_in),
            inches(layout.page.height_in)
        );
        css.push_str("* { margin: 0; padding: 0; box-sizing: border-box; }\n");
        css.push_str("body { -webkit-print-color-adjust: exact; print-color-adjust: exact; }\n");
        let _ = writeln!(
            css,
            ".sheet {{ position: relative; width: {}; height: {}; overflow: hidden; break-after: page; page-break-after: always; }}",
            inches(layout.page.width_in),
            inches(layout.page.height_in)
        );
        css.push_str(".sheet:last-child { break-after: auto; page-break-after: auto; }\n");
        let _ = writeln!(
            css,
            ".card {{ position: absolute; width: {}; height: {}; padding: {}; display: flex; flex-direction: column; justify-content: center; overflow: hidden; }}",
            inches(layout.card_width_in),
            inches(layout.card_height_in),
            inches(padding)
        );
        css.push_str(".header { text-align: center; margin-bottom: 0.6em; }\n");
        css.push_str(".recipient { text-align: center; margin-bottom: 0.8em; }\n");
        css.push_str(
            ".message { line-height: 1.7; text-align: justify; overflow-wrap: anywhere; }\n",
        );
        css.push_str(".signature { text-align: center; margin-top: 1.4em; }\n");
        css.push_str(".names { margin-top: 0.2em; }\n");

        for role in StyleRole::ALL {
            let mut declarations = self.template.declarations(role);
            if let Some(base) = role.base_font_size_pt() {
                let _ = write!(declarations, " font-size: {:.1}pt;", base * scale);
            }
            let _ = writeln!(css, ".{} {{ {} }}", role.class_name(), declarations);
        }

        css
    }

    pub fn markup(&self) -> String {
        let mut html = String::new();
        for page in &self.pages {
            let _ = writeln!(html, "<div class=\"sheet\" data-page=\"{}\">", page.number);
            for slot in &page.slots {
                self.write_slot(&mut html, slot);
            }
            html.push_str("</div>\n");
        }
        html
    }

    fn write_slot(&self, html: &mut String, slot: &Slot) {
        let position = format!(
            "left: {}; top: {};",
            inches(slot.left_in),
            inches(slot.top_in)
        );

        match &slot.content {
            SlotContent::Placeholder => {
                let _ = writeln!(
                    html,
                    "  <div class=\"card placeholder\" style=\"{}\"></div>",
                    position
                );
            }
            SlotContent::Card(placed) => {
                let card = &placed.card;
                let _ = writeln!(
                    html,
                    "  <div class=\"card\" style=\"{}\" data-index=\"{}\">",
                    position, placed.index
                );
                let _ = writeln!(html, "    <div class=\"header\">{}</div>", CARD_HEADER);
                let _ = writeln!(
                    html,
                    "    <div class=\"recipient\">Dear {},</div>",
                    escape_html(&card.recipient_name)
                );
                let _ = writeln!(
                    html,
                    "    <div class=\"message\">{}</div>",
                    escape_multiline(&card.message)
                );
                html.push_str("    <div class=\"signature\">\n");
                let _ = writeln!(
                    html,
                    "      <div class=\"signature-text\">{}</div>",
                    escape_html(&self.signature.closing)
                );
                let _ = writeln!(
                    html,
                    "      <div class=\"names\">{}</div>",
                    escape_html(&self.signature.names)
                );
                html.push_str("    </div>\n  </div>\n");
            }
        }
    }

    /// Full HTML page: stylesheet plus one `.sheet` per page.
    pub fn to_html(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<link href=\"{}\" rel=\"stylesheet\">\n<style>\n{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
            escape_html(self.template.display_name()),
            FONTS_LINK,
            self.stylesheet(),
            self.markup()
        )
    }
}
