//! Audit emission, listing, and single-step revert.

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cmdb_core::{AuditEntryId, Entity, EntityId};
use cmdb_graph::EntityStore;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::entry::{AuditAction, AuditEntry, AuditEvent, Seq};
use crate::error::{RevertError, RevertResult};
use crate::log::{AuditLog, MemoryAuditLog};

/// Label under which audit entries appear in the label catalog.
pub const AUDIT_LABEL: &str = "AuditLogEntry";

/// Summary recorded on revert entries.
pub const REVERT_SUMMARY: &str = "Reverted to previous values";

/// Default ceiling for `list_all`.
pub const DEFAULT_LIST_LIMIT: usize = 200;

/// Default ceiling for per-entity listings.
pub const DEFAULT_TARGET_LIMIT: usize = 100;

const UNNAMED: &str = "Unnamed";

/// Source of entry timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock, UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Permission check consulted before a revert writes.
pub trait Authorizer {
    fn can_edit(&self, label: &str) -> bool;
}

impl<F> Authorizer for F
where
    F: Fn(&str) -> bool,
{
    fn can_edit(&self, label: &str) -> bool {
        self(label)
    }
}

/// Authorizer that permits everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn can_edit(&self, _label: &str) -> bool {
        true
    }
}

/// Result of a successful revert.
#[derive(Debug, Clone, PartialEq)]
pub struct Reverted {
    /// The entity with its restored property bag.
    pub entity: Entity,
    /// The revert's own audit entry, when emission succeeded.
    pub entry: Option<AuditEntry>,
}

/// Records mutations and rolls entities back to captured snapshots.
pub struct AuditEngine {
    store: EntityStore,
    log: Arc<dyn AuditLog>,
    clock: Arc<dyn Clock>,
    enabled: bool,
    /// Next sequence number; held while appending so sequence and log order agree.
    next_seq: Mutex<Seq>,
}

impl AuditEngine {
    /// Create an engine over a store and a log.
    pub fn new(store: EntityStore, log: Arc<dyn AuditLog>) -> Self {
        store.registry().get_or_create_label(AUDIT_LABEL);
        let next_seq = log.last_seq() + 1;
        Self {
            store,
            log,
            clock: Arc::new(SystemClock),
            enabled: true,
            next_seq: Mutex::new(next_seq),
        }
    }

    /// Create an engine with a fresh in-memory log.
    pub fn in_memory(store: EntityStore) -> Self {
        Self::new(store, Arc::new(MemoryAuditLog::new()))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Turn emission on or off. Listing and revert are unaffected.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    // ==================== Emission ====================

    /// Append one entry.
    ///
    /// Never fails: a disabled engine or a failing log yields `None`, and the
    /// caller's mutation stands regardless.
    pub fn emit(&self, event: AuditEvent) -> Option<AuditEntry> {
        if !self.enabled {
            debug!(
                target: "cmdb::audit",
                action = %event.action,
                label = %event.target_label,
                "Audit disabled, dropping entry"
            );
            return None;
        }

        let mut next_seq = self.next_seq.lock();
        let entry = event.into_entry(*next_seq, self.clock.now());
        match self.log.append(&entry) {
            Ok(()) => {
                *next_seq += 1;
                debug!(
                    target: "cmdb::audit",
                    id = %entry.id,
                    action = %entry.action,
                    label = %entry.target_label,
                    "Recorded audit entry"
                );
                Some(entry)
            }
            Err(e) => {
                error!(
                    target: "cmdb::audit",
                    error = %e,
                    action = %entry.action,
                    label = %entry.target_label,
                    "Failed to record audit entry"
                );
                None
            }
        }
    }

    // ==================== Listing ====================

    /// Entries about one entity, newest first, at most `limit`.
    pub fn list_for_target(&self, target_id: EntityId, limit: usize) -> Vec<AuditEntry> {
        self.list(limit, |entry| entry.target_id == Some(target_id))
    }

    /// All entries, newest first, at most `limit`.
    pub fn list_all(&self, limit: usize) -> Vec<AuditEntry> {
        self.list(limit, |_| true)
    }

    fn list(&self, limit: usize, keep: impl Fn(&AuditEntry) -> bool) -> Vec<AuditEntry> {
        let entries = match self.log.entries() {
            Ok(entries) => entries,
            Err(e) => {
                error!(target: "cmdb::audit", error = %e, "Failed to read audit log");
                return Vec::new();
            }
        };

        let mut selected: Vec<AuditEntry> = entries.into_iter().filter(|e| keep(e)).collect();
        selected.sort_by_key(|e| Reverse((e.timestamp, e.seq)));
        selected.truncate(limit);
        selected
    }

    /// Look up one entry.
    pub fn get(&self, entry_id: AuditEntryId) -> Option<AuditEntry> {
        match self.log.entries() {
            Ok(entries) => entries.into_iter().find(|e| e.id == entry_id),
            Err(e) => {
                error!(target: "cmdb::audit", error = %e, "Failed to read audit log");
                None
            }
        }
    }

    // ==================== Revert ====================

    /// Restore an entity to the `old_properties` snapshot of one entry.
    ///
    /// All checks run before the single write, so a refused revert changes
    /// nothing. The revert is recorded as a new entry whose old snapshot is
    /// the bag it overwrote.
    pub fn revert(
        &self,
        entry_id: AuditEntryId,
        user: Option<&str>,
        authorizer: &dyn Authorizer,
    ) -> RevertResult<Reverted> {
        let entry = self
            .get(entry_id)
            .ok_or(RevertError::EntryNotFound(entry_id))?;

        let snapshot = match entry.old_properties {
            Some(props) if !props.is_empty() => props,
            _ => return Err(RevertError::NoPreviousValues),
        };

        let label = entry.target_label;
        let target_id = match entry.target_id {
            Some(id) if !label.trim().is_empty() => id,
            _ => return Err(RevertError::MissingNodeInfo),
        };

        if !authorizer.can_edit(&label) {
            warn!(
                target: "cmdb::audit",
                entry = %entry_id,
                label = %label,
                user = user.unwrap_or_default(),
                "Revert denied"
            );
            return Err(RevertError::AccessDenied { label });
        }

        if self.store.get_by_id(Some(&label), target_id).is_none() {
            return Err(RevertError::TargetNotFound {
                label,
                id: target_id,
            });
        }

        let replaced = self.store.update_properties(target_id, snapshot)?;
        info!(
            target: "cmdb::audit",
            entry = %entry_id,
            label = %label,
            id = %target_id,
            "Reverted entity"
        );

        let event = AuditEvent::new(AuditAction::Revert, label, target_id)
            .name(replaced.entity.display_name(UNNAMED))
            .user(user)
            .summary(REVERT_SUMMARY)
            .old_properties(replaced.previous);
        let entry = self.emit(event);

        Ok(Reverted {
            entity: replaced.entity,
            entry,
        })
    }
}

impl std::fmt::Debug for AuditEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditEngine")
            .field("enabled", &self.enabled)
            .field("next_seq", &*self.next_seq.lock())
            .finish_non_exhaustive()
    }
}
