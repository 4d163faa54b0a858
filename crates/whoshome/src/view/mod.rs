//! Terminal rendering of the household.
//!
//! Everything here is a pure function of its inputs (roster, counts, clock),
//! which keeps rendering testable without a terminal.

pub mod card;
pub mod dashboard;
pub mod form;
pub mod overview;

pub use card::{presence_badge, relative_label, render_card};
pub use dashboard::render_dashboard;
pub use form::{AddMemberForm, AddMemberRequest};
pub use overview::StatusOverview;

use crate::config::DisplayConfig;
use crate::member::Swatch;

/// How rendered output should look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    /// Emit ANSI escapes for member colours.
    pub ansi_colors: bool,
    /// Width of the status bar, in cells.
    pub bar_width: usize,
}

impl Style {
    /// Plain output with the default bar width, for pipes and tests.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            ansi_colors: false,
            ..Self::from(&DisplayConfig::default())
        }
    }

    /// Paint `text` with the swatch colour, if colours are enabled.
    #[must_use]
    pub fn paint(&self, swatch: Option<&Swatch>, text: &str) -> String {
        match swatch {
            Some(swatch) if self.ansi_colors => {
                let (r, g, b) = swatch.rgb();
                format!("\x1b[1;38;2;{r};{g};{b}m{text}\x1b[0m")
            }
            _ => text.to_string(),
        }
    }
}

impl From<&DisplayConfig> for Style {
    fn from(config: &DisplayConfig) -> Self {
        Self {
            ansi_colors: config.ansi_colors,
            bar_width: config.bar_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::find_swatch;

    #[test]
    fn test_plain_style_does_not_paint() {
        let style = Style::plain();
        assert_eq!(style.paint(find_swatch("red"), "A"), "A");
        assert_eq!(style.bar_width, 20);
    }

    #[test]
    fn test_ansi_paint_uses_truecolor() {
        let style = Style {
            ansi_colors: true,
            bar_width: 10,
        };
        assert_eq!(
            style.paint(find_swatch("red"), "A"),
            "\x1b[1;38;2;239;68;68mA\x1b[0m"
        );
        assert_eq!(style.paint(None, "A"), "A");
    }
}
