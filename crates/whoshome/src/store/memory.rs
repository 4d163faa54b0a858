//! In-process member table.
//!
//! Nothing is persisted. Every call is recorded and individual operations can
//! be made to fail, which makes this store a stand-in for the hosted table in
//! tests and an ephemeral backend for trying the tool out.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Column, Order, RemoteStore, Result, StoreError};
use crate::member::{format_timestamp, parse_timestamp, MemberRecord, NewMember, PresenceUpdate};

/// The four store operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// [`RemoteStore::list`].
    List,
    /// [`RemoteStore::insert`].
    Insert,
    /// [`RemoteStore::update`].
    Update,
    /// [`RemoteStore::delete`].
    Delete,
}

impl std::fmt::Display for StoreOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Insert => write!(f, "insert"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// A call received by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// A listing.
    List(Order),
    /// An insert of this payload.
    Insert(NewMember),
    /// A presence update of this id.
    Update(String, PresenceUpdate),
    /// A delete of this id.
    Delete(String),
}

impl StoreCall {
    /// The operation this call invoked.
    #[must_use]
    pub fn op(&self) -> StoreOp {
        match self {
            Self::List(_) => StoreOp::List,
            Self::Insert(_) => StoreOp::Insert,
            Self::Update(..) => StoreOp::Update,
            Self::Delete(_) => StoreOp::Delete,
        }
    }
}

#[derive(Debug, Default)]
struct Table {
    rows: Vec<MemberRecord>,
    next_id: u64,
    calls: Vec<StoreCall>,
    failing: HashSet<StoreOp>,
}

/// Member table held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: Mutex<Table>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds these rows.
    #[must_use]
    pub fn with_records(rows: Vec<MemberRecord>) -> Self {
        let next_id = rows.len() as u64;
        Self {
            table: Mutex::new(Table {
                rows,
                next_id,
                ..Table::default()
            }),
        }
    }

    /// Make every subsequent call of `op` fail until [`MemoryStore::recover`].
    pub fn fail(&self, op: StoreOp) {
        self.table().failing.insert(op);
    }

    /// Let `op` succeed again.
    pub fn recover(&self, op: StoreOp) {
        self.table().failing.remove(&op);
    }

    /// Every call received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.table().calls.clone()
    }

    /// Number of calls of `op` received so far.
    #[must_use]
    pub fn call_count(&self, op: StoreOp) -> usize {
        self.table().calls.iter().filter(|c| c.op() == op).count()
    }

    /// Current rows in insertion order.
    #[must_use]
    pub fn records(&self) -> Vec<MemberRecord> {
        self.table().rows.clone()
    }

    fn table(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call and decide whether it should fail.
    fn enter(&self, call: StoreCall) -> Result<MutexGuard<'_, Table>> {
        let mut table = self.table();
        let op = call.op();
        table.calls.push(call);
        if table.failing.contains(&op) {
            return Err(StoreError::unavailable(format!("{op} failed")));
        }
        Ok(table)
    }
}

fn timestamp_key(value: Option<&str>) -> Option<DateTime<Utc>> {
    value.and_then(|v| parse_timestamp(v).ok())
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self, order: Order) -> Result<Vec<MemberRecord>> {
        let table = self.enter(StoreCall::List(order))?;
        let mut rows = table.rows.clone();
        // Stable sort keeps insertion order between equal keys.
        rows.sort_by(|a, b| {
            let ordering = match order.column {
                Column::CreatedAt => timestamp_key(a.created_at.as_deref())
                    .cmp(&timestamp_key(b.created_at.as_deref())),
            };
            if order.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
        Ok(rows)
    }

    async fn insert(&self, member: &NewMember) -> Result<MemberRecord> {
        let mut table = self.enter(StoreCall::Insert(member.clone()))?;
        table.next_id += 1;
        let record = MemberRecord {
            id: format!("mem-{}", table.next_id),
            name: member.name.clone(),
            role: member.role.clone(),
            is_home: member.is_home,
            last_updated: Some(member.last_updated.clone()),
            color: member.color.clone(),
            created_at: Some(format_timestamp(Utc::now())),
        };
        table.rows.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, update: &PresenceUpdate) -> Result<()> {
        let mut table = self.enter(StoreCall::Update(id.to_string(), update.clone()))?;
        if let Some(row) = table.rows.iter_mut().find(|r| r.id == id) {
            row.is_home = update.is_home;
            row.last_updated = Some(update.last_updated.clone());
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut table = self.enter(StoreCall::Delete(id.to_string()))?;
        table.rows.retain(|r| r.id != id);
        Ok(())
    }
}
