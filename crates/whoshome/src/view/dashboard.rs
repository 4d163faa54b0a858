//! The full-screen household view.

use std::fmt::Write as _;

use chrono::{DateTime, TimeZone, Utc};

use super::card::render_card;
use super::{StatusOverview, Style};
use crate::household::Household;

const TITLE: &str = "Family Home";
const SUBTITLE: &str = "Who's at home right now";
const LIST_HEADING: &str = "Family Status";
const LOADING: &str = "Loading...";
const EMPTY: &str = "No family members yet.";

/// Render the dashboard for `household` as seen at `now`.
///
/// The clock is shown in `now`'s timezone; relative labels are computed in
/// UTC.
#[must_use]
pub fn render_dashboard<Tz>(household: &Household, now: &DateTime<Tz>, style: &Style) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if household.is_loading() {
        return LOADING.to_string();
    }

    let clock = now.format("%-I:%M %p").to_string();
    let date = now.format("%a, %b %-d").to_string();
    let utc_now = now.with_timezone(&Utc);
    let overview = StatusOverview::new(household.home_count(), household.total_count());

    let mut out = String::new();
    let _ = writeln!(out, "{TITLE:<32}{clock:>12}");
    let _ = writeln!(out, "{SUBTITLE:<32}{date:>12}");
    out.push('\n');
    let _ = writeln!(out, "{}", overview.render(style.bar_width));
    out.push('\n');
    let _ = writeln!(out, "{LIST_HEADING}");

    if household.members().is_empty() {
        let _ = writeln!(out, "  {EMPTY}");
    }
    for (index, member) in household.members().iter().enumerate() {
        let _ = writeln!(out, "{}", render_card(index + 1, member, utc_now, style));
    }
    out
}
