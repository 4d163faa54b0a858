//! One roster entry.

use chrono::{DateTime, Utc};

use super::Style;
use crate::member::Member;

/// Describe when a member last arrived or left, relative to `now`.
///
/// Returns `None` when the member has never been toggled. Timestamps in the
/// future count as "just now".
#[must_use]
pub fn relative_label(
    last_updated: Option<DateTime<Utc>>,
    is_home: bool,
    now: DateTime<Utc>,
) -> Option<String> {
    let at = last_updated?;
    let action = if is_home { "Arrived" } else { "Left" };
    let minutes = (now - at).num_minutes().max(0);

    Some(match minutes {
        0 => format!("{action} just now"),
        1..=59 => format!("{action} {minutes}m ago"),
        60..=119 => format!("{action} 1h ago"),
        _ => format!("{action} {}h ago", minutes / 60),
    })
}

/// The presence badge shown on a card.
#[must_use]
pub fn presence_badge(is_home: bool) -> &'static str {
    if is_home {
        "Home"
    } else {
        "Away"
    }
}

/// Render a member as a single line prefixed with its 1-based position.
#[must_use]
pub fn render_card(position: usize, member: &Member, now: DateTime<Utc>, style: &Style) -> String {
    let avatar = style.paint(member.swatch(), &format!("({})", member.initial()));
    let mut line = format!(
        "#{position:<2} {avatar} {:<16} {:<12} [{}]",
        member.name,
        member.role,
        presence_badge(member.is_home)
    );
    if let Some(label) = relative_label(member.last_updated, member.is_home, now) {
        line.push_str("  ");
        line.push_str(&label);
    }
    line.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn label_after(elapsed: Duration, is_home: bool) -> Option<String> {
        relative_label(Some(now() - elapsed), is_home, now())
    }

    fn member(last_updated: Option<DateTime<Utc>>) -> Member {
        Member {
            id: "m-1".to_string(),
            name: "alice".to_string(),
            role: "Parent".to_string(),
            is_home: true,
            last_updated,
            color: "#3b82f6".to_string(),
        }
    }

    #[test]
    fn test_relative_label_thresholds() {
        assert_eq!(label_after(Duration::seconds(30), true).unwrap(), "Arrived just now");
        assert_eq!(label_after(Duration::minutes(1), false).unwrap(), "Left 1m ago");
        assert_eq!(label_after(Duration::minutes(5), true).unwrap(), "Arrived 5m ago");
        assert_eq!(label_after(Duration::minutes(59), true).unwrap(), "Arrived 59m ago");
        assert_eq!(label_after(Duration::minutes(60), false).unwrap(), "Left 1h ago");
        assert_eq!(label_after(Duration::minutes(119), false).unwrap(), "Left 1h ago");
        assert_eq!(label_after(Duration::minutes(120), true).unwrap(), "Arrived 2h ago");
        assert_eq!(label_after(Duration::minutes(125), false).unwrap(), "Left 2h ago");
        assert_eq!(label_after(Duration::hours(30), true).unwrap(), "Arrived 30h ago");
    }

    #[test]
    fn test_relative_label_future_is_just_now() {
        assert_eq!(
            label_after(Duration::minutes(-10), true).unwrap(),
            "Arrived just now"
        );
    }

    #[test]
    fn test_relative_label_absent() {
        assert!(relative_label(None, true, now()).is_none());
    }

    #[test]
    fn test_presence_badge() {
        assert_eq!(presence_badge(true), "Home");
        assert_eq!(presence_badge(false), "Away");
    }

    #[test]
    fn test_render_card_plain() {
        let line = render_card(1, &member(Some(now() - Duration::minutes(5))), now(), &Style::plain());
        assert!(line.starts_with("#1  (A) alice"));
        assert!(line.contains("Parent"));
        assert!(line.contains("[Home]"));
        assert!(line.ends_with("Arrived 5m ago"));
    }

    #[test]
    fn test_render_card_without_label() {
        let line = render_card(3, &member(None), now(), &Style::plain());
        assert!(line.ends_with("[Home]"));
        assert!(!line.contains("ago"));
    }
}
