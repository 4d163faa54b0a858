//! Draft state for adding a member.
//!
//! The form only collects input. A successful [`AddMemberForm::submit`] hands
//! back an [`AddMemberRequest`] for the caller to pass to
//! [`Household::add_member`](crate::household::Household::add_member).

use crate::member::{default_swatch, find_swatch, Swatch, PALETTE};

/// A validated request to add a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddMemberRequest {
    /// Trimmed name.
    pub name: String,
    /// Trimmed role.
    pub role: String,
    /// Chosen palette entry.
    pub color: &'static Swatch,
}

/// The add-member form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddMemberForm {
    open: bool,
    name: String,
    role: String,
    color: &'static Swatch,
}

impl Default for AddMemberForm {
    fn default() -> Self {
        Self {
            open: false,
            name: String::new(),
            role: String::new(),
            color: default_swatch(),
        }
    }
}

impl AddMemberForm {
    /// A closed, empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the form.
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Hide the form. The draft is kept for the next time it opens.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Whether the form is showing.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Replace the draft name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Replace the draft role.
    pub fn set_role(&mut self, role: impl Into<String>) {
        self.role = role.into();
    }

    /// Draft name as typed.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Draft role as typed.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Pick a colour by palette name, token, or 1-based palette number.
    ///
    /// Returns `false` and keeps the current choice if nothing matches.
    pub fn select_color(&mut self, choice: &str) -> bool {
        let choice = choice.trim();
        let by_number = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| PALETTE.get(i));

        match by_number.or_else(|| find_swatch(choice)) {
            Some(swatch) => {
                self.color = swatch;
                true
            }
            None => false,
        }
    }

    /// The colour that will be used.
    #[must_use]
    pub fn selected_color(&self) -> &'static Swatch {
        self.color
    }

    /// Turn the draft into a request.
    ///
    /// Yields nothing and leaves the form untouched while either field is
    /// blank. On success the draft is cleared, the colour reset and the form
    /// closed.
    pub fn submit(&mut self) -> Option<AddMemberRequest> {
        let (name, role) = (self.name.trim(), self.role.trim());
        if name.is_empty() || role.is_empty() {
            return None;
        }

        let request = AddMemberRequest {
            name: name.to_string(),
            role: role.to_string(),
            color: self.color,
        };
        *self = Self::default();
        Some(request)
    }
}
