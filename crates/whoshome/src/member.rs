//! Household member records.
//!
//! This module defines the in-memory [`Member`], the raw row shape used by the
//! remote table ([`MemberRecord`]), the write payloads sent to it, and the
//! fixed colour palette members are painted with.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::store::StoreError;

/// A named entry of the colour palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Swatch {
    /// Human-friendly name, accepted wherever a colour is typed.
    pub name: &'static str,
    /// Lowercase `#rrggbb` token stored with the member.
    pub token: &'static str,
}

impl Swatch {
    /// Split the token into its red, green and blue components.
    #[must_use]
    pub fn rgb(&self) -> (u8, u8, u8) {
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&self.token[range], 16).unwrap_or_default()
        };
        (channel(1..3), channel(3..5), channel(5..7))
    }
}

impl std::fmt::Display for Swatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.token)
    }
}

/// The colours a member can be created with. The first entry is the default.
pub const PALETTE: [Swatch; 8] = [
    Swatch { name: "pink", token: "#ec4899" },
    Swatch { name: "blue", token: "#3b82f6" },
    Swatch { name: "green", token: "#10b981" },
    Swatch { name: "amber", token: "#f59e0b" },
    Swatch { name: "violet", token: "#8b5cf6" },
    Swatch { name: "red", token: "#ef4444" },
    Swatch { name: "cyan", token: "#06b6d4" },
    Swatch { name: "orange", token: "#f97316" },
];

/// The swatch preselected for new members.
#[must_use]
pub fn default_swatch() -> &'static Swatch {
    &PALETTE[0]
}

/// Look up a palette entry by token (case-insensitive) or by name.
#[must_use]
pub fn find_swatch(input: &str) -> Option<&'static Swatch> {
    let input = input.trim();
    PALETTE
        .iter()
        .find(|s| s.token.eq_ignore_ascii_case(input) || s.name.eq_ignore_ascii_case(input))
}

/// A member of the household roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Identifier assigned by the store.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-text role, such as "Parent".
    pub role: String,
    /// Presence flag.
    pub is_home: bool,
    /// When the presence flag last changed. Absent until the first toggle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Palette token.
    pub color: String,
}

impl Member {
    /// The uppercased first character of the name, used as an avatar.
    #[must_use]
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect::<String>())
            .unwrap_or_default()
    }

    /// The palette entry for this member's colour, if it is a known one.
    #[must_use]
    pub fn swatch(&self) -> Option<&'static Swatch> {
        find_swatch(&self.color)
    }

    /// A copy of this member with a new presence flag stamped at `at`.
    #[must_use]
    pub fn with_presence(&self, is_home: bool, at: DateTime<Utc>) -> Self {
        Self {
            is_home,
            last_updated: Some(at),
            ..self.clone()
        }
    }
}

/// A row as stored in the remote table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    /// Identifier, either text or a numeric key depending on the table.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-text role.
    pub role: String,
    /// Presence flag.
    #[serde(default)]
    pub is_home: bool,
    /// ISO-8601 timestamp of the last presence change.
    #[serde(default)]
    pub last_updated: Option<String>,
    /// Palette token.
    pub color: String,
    /// ISO-8601 creation timestamp, assigned by the store.
    #[serde(default)]
    pub created_at: Option<String>,
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

impl TryFrom<MemberRecord> for Member {
    type Error = StoreError;

    fn try_from(record: MemberRecord) -> std::result::Result<Self, Self::Error> {
        let last_updated = record
            .last_updated
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;

        Ok(Self {
            id: record.id,
            name: record.name,
            role: record.role,
            is_home: record.is_home,
            last_updated,
            color: record.color,
        })
    }
}

/// Insert payload for a new member. The store assigns the id and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMember {
    /// Display name, already trimmed.
    pub name: String,
    /// Role, already trimmed.
    pub role: String,
    /// Palette token.
    pub color: String,
    /// Always `false` for a new member.
    pub is_home: bool,
    /// Creation time, recorded as the first presence change.
    pub last_updated: String,
}

impl NewMember {
    /// Build an insert payload for a member created at `at`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        swatch: &Swatch,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            color: swatch.token.to_string(),
            is_home: false,
            last_updated: format_timestamp(at),
        }
    }
}

/// Update payload for a presence change: exactly the two fields a toggle touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceUpdate {
    /// New presence flag.
    pub is_home: bool,
    /// ISO-8601 timestamp of the change.
    pub last_updated: String,
}

impl PresenceUpdate {
    /// Build an update setting the flag to `is_home` at `at`.
    #[must_use]
    pub fn new(is_home: bool, at: DateTime<Utc>) -> Self {
        Self {
            is_home,
            last_updated: format_timestamp(at),
        }
    }
}

/// Format a timestamp the way it is written to the store.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The current time, rounded up to the next whole millisecond.
///
/// Stored timestamps carry millisecond precision; rounding up keeps the
/// stamped value no earlier than the moment it was taken.
#[must_use]
pub fn stamp_now() -> DateTime<Utc> {
    ceil_millis(Utc::now())
}

fn ceil_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    let truncated = at.trunc_subsecs(3);
    if truncated < at {
        truncated + TimeDelta::milliseconds(1)
    } else {
        truncated
    }
}

/// Parse a timestamp read from the store.
///
/// Accepts RFC 3339 with an offset, and offset-less ISO-8601 (as produced by
/// `timestamp` columns or `SQLite`'s `datetime()`), which is taken as UTC.
///
/// # Errors
///
/// Returns [`StoreError::Decode`] if the value matches neither form.
pub fn parse_timestamp(value: &str) -> std::result::Result<DateTime<Utc>, StoreError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| StoreError::decode(format!("invalid timestamp '{value}'")))
}
