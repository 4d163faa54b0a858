//! The household controller.
//!
//! [`Household`] owns the roster for one session. Every change goes through
//! the injected [`RemoteStore`] first; the roster is only touched after the
//! store has confirmed the write, so a failed call never needs a rollback.
//! Failures are logged, surfaced through the [`Notifier`] where the user must
//! see them, and returned so callers can branch on [`Error::kind`].

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::member::{find_swatch, stamp_now, Member, NewMember, PresenceUpdate};
use crate::notify::{Notice, Notifier, Operation};
use crate::store::{Order, RemoteStore};

/// The roster of one session and the handlers that change it.
#[derive(Debug)]
pub struct Household {
    store: Arc<dyn RemoteStore>,
    notifier: Arc<dyn Notifier>,
    roster: Vec<Member>,
    loading: bool,
}

impl Household {
    /// Create a controller with an empty roster, waiting for [`Household::load`].
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            roster: Vec::new(),
            loading: true,
        }
    }

    /// Members in creation order.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.roster
    }

    /// The member with this id, if present.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Member> {
        self.roster.iter().find(|m| m.id == id)
    }

    /// Whether the initial load has not finished yet.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Number of members currently home.
    #[must_use]
    pub fn home_count(&self) -> usize {
        self.roster.iter().filter(|m| m.is_home).count()
    }

    /// Number of members in the roster.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.roster.len()
    }

    /// Resolve a user-typed selector to a member id.
    ///
    /// Accepts an exact id, a 1-based position written `#N`, or a prefix that
    /// matches exactly one id.
    #[must_use]
    pub fn resolve(&self, selector: &str) -> Option<&str> {
        let selector = selector.trim();
        if selector.is_empty() {
            return None;
        }
        if let Some(member) = self.get(selector) {
            return Some(&member.id);
        }
        if let Some(position) = selector.strip_prefix('#') {
            return position
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| self.roster.get(i))
                .map(|m| m.id.as_str());
        }
        let mut matches = self.roster.iter().filter(|m| m.id.starts_with(selector));
        match (matches.next(), matches.next()) {
            (Some(member), None) => Some(&member.id),
            _ => None,
        }
    }

    /// Replace the roster with the store's contents, oldest first.
    ///
    /// On failure the roster is left empty and the error is only logged; the
    /// loading flag is cleared either way. There is no retry.
    ///
    /// # Errors
    ///
    /// Returns the store or decode error that ended the load.
    pub async fn load(&mut self) -> Result<usize> {
        self.loading = true;
        let result = self.fetch().await;
        self.loading = false;

        match result {
            Ok(members) => {
                info!("Loaded {} members from {} store", members.len(), self.store.name());
                self.roster = members;
                Ok(self.roster.len())
            }
            Err(e) => {
                error!("Error loading members: {}", e);
                self.roster.clear();
                Err(e)
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<Member>> {
        let records = self.store.list(Order::creation()).await?;
        let members = records
            .into_iter()
            .map(Member::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(members)
    }

    /// Create a member and append it to the roster.
    ///
    /// `name` and `role` are trimmed and must not be empty; `color` must name
    /// a palette entry. Invalid input is rejected before the store is called.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, or the store error after it
    /// has been logged and shown to the user.
    pub async fn add_member(&mut self, name: &str, role: &str, color: &str) -> Result<Member> {
        let (name, role) = (name.trim(), role.trim());
        if name.is_empty() {
            return Err(Error::empty_field("name"));
        }
        if role.is_empty() {
            return Err(Error::empty_field("role"));
        }
        let swatch = find_swatch(color).ok_or_else(|| Error::UnknownColor {
            token: color.to_string(),
        })?;

        debug!("Adding member {} ({}, {})", name, role, swatch.token);
        let payload = NewMember::new(name, role, swatch, stamp_now());
        let created = match self.store.insert(&payload).await {
            // The stored creation stamp is not shown until the first toggle.
            Ok(record) => Member::try_from(record)
                .map(|member| Member {
                    last_updated: None,
                    ..member
                })
                .map_err(Error::from),
            Err(e) => Err(e.into()),
        };

        match created {
            Ok(member) => {
                info!("Member added: {} ({})", member.name, member.id);
                self.roster.push(member.clone());
                Ok(member)
            }
            Err(e) => Err(self.fail(Operation::Add, e)),
        }
    }

    /// Flip a member's presence flag and stamp the change with the current time.
    ///
    /// Unknown ids are a logged no-op: the store is not called and the user is
    /// not alerted.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown ids, or the store error after it
    /// has been logged and shown to the user.
    pub async fn toggle_status(&mut self, id: &str) -> Result<Member> {
        let Some(position) = self.roster.iter().position(|m| m.id == id) else {
            info!("Member not found: {}", id);
            return Err(Error::member_not_found(id));
        };

        let is_home = !self.roster[position].is_home;
        let at = stamp_now();
        debug!("Setting {} is_home={} at {}", id, is_home, at);

        if let Err(e) = self
            .store
            .update(id, &PresenceUpdate::new(is_home, at))
            .await
        {
            return Err(self.fail(Operation::Toggle, e.into()));
        }

        let updated = self.roster[position].with_presence(is_home, at);
        self.roster[position] = updated.clone();
        info!(
            "{} is now {}",
            updated.name,
            if is_home { "home" } else { "away" }
        );
        Ok(updated)
    }

    /// Delete a member from the store, then from the roster.
    ///
    /// The store is asked even when the id is not in the roster; a successful
    /// delete of an unknown id changes nothing and returns `None`.
    ///
    /// # Errors
    ///
    /// Returns the store error after it has been logged and shown to the user.
    pub async fn delete_member(&mut self, id: &str) -> Result<Option<Member>> {
        if let Err(e) = self.store.delete(id).await {
            return Err(self.fail(Operation::Delete, e.into()));
        }

        let removed = self
            .roster
            .iter()
            .position(|m| m.id == id)
            .map(|position| self.roster.remove(position));
        match &removed {
            Some(member) => info!("Member deleted: {} ({})", member.name, member.id),
            None => warn!("Deleted id {} was not in the roster", id),
        }
        Ok(removed)
    }

    /// Log a failed mutation and alert the user.
    fn fail(&self, operation: Operation, error: Error) -> Error {
        let notice = Notice::failure(operation, &error);
        error!("{}", notice);
        self.notifier.notify(&notice);
        error
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::error::ErrorKind;
    use crate::member::MemberRecord;
    use crate::notify::RecordingNotifier;
    use crate::store::{MemoryStore, SqliteStore, StoreCall, StoreOp};

    fn record(id: &str, name: &str, is_home: bool, created_at: &str) -> MemberRecord {
        MemberRecord {
            id: id.to_string(),
            name: name.to_string(),
            role: "Parent".to_string(),
            is_home,
            last_updated: None,
            color: "#3b82f6".to_string(),
            created_at: Some(created_at.to_string()),
        }
    }

    fn seeded_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_records(vec![
            record("a", "Alice", true, "2026-10-01T08:00:00Z"),
            record("b", "Bob", false, "2026-10-02T08:00:00Z"),
            record("c", "Carol", true, "2026-10-03T08:00:00Z"),
        ]))
    }

    async fn loaded(store: &Arc<MemoryStore>) -> (Household, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut household = Household::new(store.clone(), notifier.clone());
        household.load().await.unwrap();
        (household, notifier)
    }

    fn ids(household: &Household) -> Vec<&str> {
        household.members().iter().map(|m| m.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_load_orders_by_creation_and_clears_loading() {
        crate::logging::init_test_logging();
        let store = Arc::new(MemoryStore::with_records(vec![
            record("late", "Late", false, "2026-10-05T00:00:00Z"),
            record("early", "Early", false, "2026-10-01T00:00:00Z"),
        ]));
        let notifier = Arc::new(RecordingNotifier::default());
        let mut household = Household::new(store.clone(), notifier);
        assert!(household.is_loading());

        assert_eq!(household.load().await.unwrap(), 2);
        assert!(!household.is_loading());
        assert_eq!(ids(&household), ["early", "late"]);
        assert_eq!(store.calls(), [StoreCall::List(Order::creation())]);
    }

    #[tokio::test]
    async fn test_load_empty_store() {
        let store = Arc::new(MemoryStore::new());
        let (household, _) = loaded(&store).await;
        assert_eq!(household.total_count(), 0);
        assert_eq!(household.home_count(), 0);
    }

    #[tokio::test]
    async fn test_load_failure_is_logged_only() {
        let store = seeded_store();
        store.fail(StoreOp::List);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut household = Household::new(store.clone(), notifier.clone());

        let err = household.load().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteUnavailable);
        assert!(!household.is_loading());
        assert_eq!(household.total_count(), 0);
        assert!(notifier.notices().is_empty());
        assert_eq!(store.call_count(StoreOp::List), 1);
    }

    #[tokio::test]
    async fn test_load_with_undecodable_record_fails() {
        let mut bad = record("x", "X", false, "2026-10-01T00:00:00Z");
        bad.last_updated = Some("not a time".to_string());
        let store = Arc::new(MemoryStore::with_records(vec![bad]));
        let mut household = Household::new(store, Arc::new(RecordingNotifier::default()));

        assert!(household.load().await.is_err());
        assert!(household.members().is_empty());
    }

    #[tokio::test]
    async fn test_counts() {
        let store = seeded_store();
        let (household, _) = loaded(&store).await;
        assert_eq!(household.home_count(), 2);
        assert_eq!(household.total_count(), 3);
        assert!(household.home_count() <= household.total_count());
    }

    #[tokio::test]
    async fn test_add_member_appends() {
        let store = seeded_store();
        let (mut household, notifier) = loaded(&store).await;

        let member = household
            .add_member("Alice", "Parent", "#3b82f6")
            .await
            .unwrap();

        assert!(!member.is_home);
        assert!(member.last_updated.is_none());
        assert_eq!(member.color, "#3b82f6");
        assert_eq!(household.total_count(), 4);
        assert_eq!(household.members().last(), Some(&member));
        assert!(notifier.notices().is_empty());

        let inserted = match &store.calls()[1] {
            StoreCall::Insert(payload) => payload.clone(),
            other => panic!("unexpected call {other:?}"),
        };
        assert!(!inserted.is_home);
        let sent = crate::member::parse_timestamp(&inserted.last_updated).unwrap();
        assert!(sent <= Utc::now());
        assert!(store.records()[3].last_updated.is_some());
    }

    #[tokio::test]
    async fn test_add_member_trims_and_accepts_color_names() {
        let store = Arc::new(MemoryStore::new());
        let (mut household, _) = loaded(&store).await;

        let member = household
            .add_member("  Dana ", " Grandparent  ", "Amber")
            .await
            .unwrap();
        assert_eq!(member.name, "Dana");
        assert_eq!(member.role, "Grandparent");
        assert_eq!(member.color, "#f59e0b");
    }

    #[tokio::test]
    async fn test_add_member_validation_skips_store() {
        let store = Arc::new(MemoryStore::new());
        let (mut household, notifier) = loaded(&store).await;

        let err = household.add_member("   ", "Parent", "#3b82f6").await.unwrap_err();
        assert!(err.is_validation());
        let err = household.add_member("Alice", "", "#3b82f6").await.unwrap_err();
        assert!(err.is_validation());
        let err = household.add_member("Alice", "Parent", "#123456").await.unwrap_err();
        assert!(err.is_validation());

        assert_eq!(store.call_count(StoreOp::Insert), 0);
        assert_eq!(household.total_count(), 0);
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_add_member_failure_notifies_and_keeps_roster() {
        let store = seeded_store();
        let (mut household, notifier) = loaded(&store).await;
        let before = household.members().to_vec();
        store.fail(StoreOp::Insert);

        let err = household.add_member("Eve", "Child", "red").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteUnavailable);
        assert_eq!(household.members(), before.as_slice());

        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].operation, Operation::Add);
        assert!(notices[0].message.starts_with("Error adding member"));
    }

    #[tokio::test]
    async fn test_toggle_twice() {
        let store = seeded_store();
        let (mut household, _) = loaded(&store).await;
        let original = household.get("b").unwrap().clone();

        let before = Utc::now();
        let home = household.toggle_status("b").await.unwrap();
        assert!(home.is_home);
        let first = home.last_updated.unwrap();
        assert!(first >= before);

        let away = household.toggle_status("b").await.unwrap();
        assert!(!away.is_home);
        let second = away.last_updated.unwrap();
        assert!(second >= first);

        assert_eq!(away.name, original.name);
        assert_eq!(away.role, original.role);
        assert_eq!(away.color, original.color);
        assert_eq!(ids(&household), ["a", "b", "c"]);
        assert_eq!(household.get("b"), Some(&away));
        assert_eq!(store.call_count(StoreOp::Update), 2);
    }

    #[tokio::test]
    async fn test_toggle_stamp_never_precedes_call() {
        let store = seeded_store();
        let (mut household, _) = loaded(&store).await;

        for _ in 0..200 {
            let before = Utc::now();
            let toggled = household.toggle_status("a").await.unwrap();
            assert!(toggled.last_updated.unwrap() >= before);
        }
    }

    #[tokio::test]
    async fn test_toggle_sends_only_presence_fields() {
        let store = seeded_store();
        let (mut household, _) = loaded(&store).await;

        let updated = household.toggle_status("a").await.unwrap();
        let call = store.calls().pop().unwrap();
        match call {
            StoreCall::Update(id, update) => {
                assert_eq!(id, "a");
                assert!(!update.is_home);
                assert_eq!(
                    update,
                    PresenceUpdate::new(false, updated.last_updated.unwrap())
                );
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_toggle_unknown_id_is_noop() {
        let store = seeded_store();
        let (mut household, notifier) = loaded(&store).await;
        let before = household.members().to_vec();

        let err = household.toggle_status("zzz").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(household.members(), before.as_slice());
        assert_eq!(store.call_count(StoreOp::Update), 0);
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_failure_keeps_state() {
        let store = seeded_store();
        let (mut household, notifier) = loaded(&store).await;
        let before = household.members().to_vec();
        store.fail(StoreOp::Update);

        assert!(household.toggle_status("a").await.is_err());
        assert_eq!(household.members(), before.as_slice());
        assert_eq!(notifier.notices().len(), 1);
        assert_eq!(notifier.notices()[0].operation, Operation::Toggle);
    }

    #[tokio::test]
    async fn test_delete_preserves_order() {
        let store = seeded_store();
        let (mut household, _) = loaded(&store).await;

        let removed = household.delete_member("b").await.unwrap();
        assert_eq!(removed.map(|m| m.name), Some("Bob".to_string()));
        assert_eq!(ids(&household), ["a", "c"]);
        assert_eq!(household.total_count(), 2);
    }

    #[tokio::test]
    async fn test_delete_unknown_still_asks_store() {
        let store = seeded_store();
        let (mut household, notifier) = loaded(&store).await;

        let removed = household.delete_member("nope").await.unwrap();
        assert!(removed.is_none());
        assert_eq!(household.total_count(), 3);
        assert_eq!(store.call_count(StoreOp::Delete), 1);
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_notifies() {
        let store = seeded_store();
        let (mut household, notifier) = loaded(&store).await;
        store.fail(StoreOp::Delete);

        assert!(household.delete_member("a").await.is_err());
        assert_eq!(household.total_count(), 3);
        assert_eq!(notifier.notices()[0].operation, Operation::Delete);
    }

    #[tokio::test]
    async fn test_resolve_selectors() {
        let store = Arc::new(MemoryStore::with_records(vec![
            record("abc-1", "Alice", true, "2026-10-01T08:00:00Z"),
            record("abd-2", "Bob", false, "2026-10-02T08:00:00Z"),
        ]));
        let (household, _) = loaded(&store).await;

        assert_eq!(household.resolve("abc-1"), Some("abc-1"));
        assert_eq!(household.resolve("#2"), Some("abd-2"));
        assert_eq!(household.resolve("abd"), Some("abd-2"));
        assert_eq!(household.resolve("ab"), None);
        assert_eq!(household.resolve("#0"), None);
        assert_eq!(household.resolve("#9"), None);
        assert_eq!(household.resolve(""), None);
    }

    #[tokio::test]
    async fn test_roundtrip_through_sqlite() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let notifier = Arc::new(RecordingNotifier::default());
        let mut household = Household::new(store.clone(), notifier.clone());
        household.load().await.unwrap();

        let alice = household.add_member("Alice", "Parent", "blue").await.unwrap();
        let bob = household.add_member("Bob", "Child", "green").await.unwrap();
        household.toggle_status(&alice.id).await.unwrap();
        assert!(household.get(&bob.id).unwrap().last_updated.is_none());

        let mut reloaded = Household::new(store, notifier);
        reloaded.load().await.unwrap();
        let ids: Vec<_> = reloaded.members().iter().map(|m| m.id.clone()).collect();
        assert_eq!(ids, [alice.id.clone(), bob.id.clone()]);
        assert_eq!(reloaded.get(&alice.id), household.get(&alice.id));
        assert_eq!(reloaded.home_count(), 1);

        // The creation stamp written with the insert shows up after a reload.
        let stored_bob = reloaded.get(&bob.id).unwrap();
        assert!(stored_bob.last_updated.is_some());
        assert!(!stored_bob.is_home);
    }
}
