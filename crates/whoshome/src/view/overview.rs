//! Summary of who is home.

use serde::Serialize;

/// Home and total counts, with everything derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusOverview {
    /// Members at home.
    pub home: usize,
    /// Members in the roster.
    pub total: usize,
}

impl StatusOverview {
    /// Build an overview from the two counts.
    #[must_use]
    pub fn new(home: usize, total: usize) -> Self {
        Self { home, total }
    }

    /// Share of members at home, in `0.0..=1.0`. Zero for an empty roster.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn proportion(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.home as f64 / self.total as f64
        }
    }

    /// Rounded percentage of members at home.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(&self) -> u8 {
        (self.proportion() * 100.0).round() as u8
    }

    /// The progress ring drawn as a `width`-cell bar.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn bar(&self, width: usize) -> String {
        let filled = ((self.proportion() * width as f64).round() as usize).min(width);
        format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
    }

    /// "{home} of {total} home".
    #[must_use]
    pub fn ratio(&self) -> String {
        format!("{} of {} home", self.home, self.total)
    }

    /// "{home} family member(s) at home", singular only for exactly one.
    #[must_use]
    pub fn headline(&self) -> String {
        let noun = if self.home == 1 { "member" } else { "members" };
        format!("{} family {noun} at home", self.home)
    }

    /// "{total} family members".
    #[must_use]
    pub fn total_line(&self) -> String {
        format!("{} family members", self.total)
    }

    /// Render the overview block.
    #[must_use]
    pub fn render(&self, width: usize) -> String {
        format!(
            "{} {}  {}%\n{}\n{}",
            self.bar(width),
            self.ratio(),
            self.percent(),
            self.headline(),
            self.total_line()
        )
    }
}
