//! Audit entry types.

use crate::{AuditError, AuditResult};
use chrono::{DateTime, Utc};
use cmdb_core::{codec, AuditEntryId, EntityId, Properties};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Append sequence number, unique and increasing within one log.
pub type Seq = u64;

/// User recorded when the caller does not name one.
pub const SYSTEM_USER: &str = "System";

/// The kind of mutation an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Connect,
    Disconnect,
    Revert,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::Connect => "connect",
            AuditAction::Disconnect => "disconnect",
            AuditAction::Revert => "revert",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(AuditAction::Create),
            "update" => Ok(AuditAction::Update),
            "delete" => Ok(AuditAction::Delete),
            "connect" => Ok(AuditAction::Connect),
            "disconnect" => Ok(AuditAction::Disconnect),
            "revert" => Ok(AuditAction::Revert),
            other => Err(AuditError::invalid_format(format!("unknown action: {}", other))),
        }
    }
}

/// One immutable audit record.
///
/// An empty `target_label` or absent `target_id` means the entry does not
/// identify the entity it describes; such entries cannot be reverted.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub seq: Seq,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub target_label: String,
    pub target_id: Option<EntityId>,
    pub target_name: String,
    pub user: String,
    pub change_summary: String,
    pub old_properties: Option<Properties>,
    pub new_properties: Option<Properties>,
    pub relationship_type: Option<String>,
    pub related_label: Option<String>,
    pub related_id: Option<EntityId>,
}

/// The caller-supplied part of an entry, before it is stamped.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub target_label: String,
    pub target_id: Option<EntityId>,
    pub target_name: String,
    pub user: Option<String>,
    pub change_summary: String,
    pub old_properties: Option<Properties>,
    pub new_properties: Option<Properties>,
    pub relationship_type: Option<String>,
    pub related_label: Option<String>,
    pub related_id: Option<EntityId>,
}

impl AuditEvent {
    pub fn new(action: AuditAction, target_label: impl Into<String>, target_id: EntityId) -> Self {
        Self {
            action,
            target_label: target_label.into(),
            target_id: Some(target_id),
            target_name: String::new(),
            user: None,
            change_summary: String::new(),
            old_properties: None,
            new_properties: None,
            relationship_type: None,
            related_label: None,
            related_id: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.target_name = name.into();
        self
    }

    /// Acting user. Blank names fall back to the system user.
    pub fn user(mut self, user: Option<&str>) -> Self {
        self.user = user.filter(|u| !u.trim().is_empty()).map(str::to_string);
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.change_summary = summary.into();
        self
    }

    pub fn old_properties(mut self, properties: Properties) -> Self {
        self.old_properties = Some(properties);
        self
    }

    pub fn new_properties(mut self, properties: Properties) -> Self {
        self.new_properties = Some(properties);
        self
    }

    pub fn relationship(
        mut self,
        rel_type: impl Into<String>,
        related_label: impl Into<String>,
        related_id: EntityId,
    ) -> Self {
        self.relationship_type = Some(rel_type.into());
        self.related_label = Some(related_label.into());
        self.related_id = Some(related_id);
        self
    }

    /// Stamp the event into a full entry.
    pub fn into_entry(self, seq: Seq, timestamp: DateTime<Utc>) -> AuditEntry {
        AuditEntry {
            id: AuditEntryId::new(),
            seq,
            timestamp,
            action: self.action,
            target_label: self.target_label,
            target_id: self.target_id,
            target_name: self.target_name,
            user: self.user.unwrap_or_else(|| SYSTEM_USER.to_string()),
            change_summary: self.change_summary,
            old_properties: self.old_properties,
            new_properties: self.new_properties,
            relationship_type: self.relationship_type,
            related_label: self.related_label,
            related_id: self.related_id,
        }
    }
}

/// Storage form of an entry, one JSON object per line.
///
/// Field names are a stable contract. Missing values are written as empty
/// strings; property snapshots are encoded JSON object strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: String,
    #[serde(default)]
    pub seq: Seq,
    pub timestamp: String,
    pub action: String,
    #[serde(default)]
    pub node_label: String,
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub node_name: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub changes: String,
    #[serde(default)]
    pub relationship_type: String,
    #[serde(default)]
    pub target_label: String,
    #[serde(default)]
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_props: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_props: Option<String>,
}

impl From<&AuditEntry> for AuditRecord {
    fn from(entry: &AuditEntry) -> Self {
        let id_or_empty = |id: Option<EntityId>| id.map(|i| i.to_string()).unwrap_or_default();
        Self {
            id: entry.id.to_string(),
            seq: entry.seq,
            timestamp: entry.timestamp.to_rfc3339(),
            action: entry.action.to_string(),
            node_label: entry.target_label.clone(),
            node_id: id_or_empty(entry.target_id),
            node_name: entry.target_name.clone(),
            user: entry.user.clone(),
            changes: entry.change_summary.clone(),
            relationship_type: entry.relationship_type.clone().unwrap_or_default(),
            target_label: entry.related_label.clone().unwrap_or_default(),
            target_id: id_or_empty(entry.related_id),
            old_props: entry.old_properties.as_ref().map(codec::encode_properties),
            new_props: entry.new_properties.as_ref().map(codec::encode_properties),
        }
    }
}

impl TryFrom<AuditRecord> for AuditEntry {
    type Error = AuditError;

    fn try_from(record: AuditRecord) -> AuditResult<Self> {
        let id = record
            .id
            .parse::<AuditEntryId>()
            .map_err(|e| AuditError::invalid_format(e.to_string()))?;
        let timestamp = DateTime::parse_from_rfc3339(&record.timestamp)
            .map_err(|e| AuditError::invalid_format(format!("bad timestamp: {}", e)))?
            .with_timezone(&Utc);
        let action = record.action.parse::<AuditAction>()?;

        Ok(AuditEntry {
            id,
            seq: record.seq,
            timestamp,
            action,
            target_label: record.node_label,
            target_id: optional_id(&record.node_id)?,
            target_name: record.node_name,
            user: if record.user.is_empty() {
                SYSTEM_USER.to_string()
            } else {
                record.user
            },
            change_summary: record.changes,
            old_properties: codec::decode_optional(record.old_props.as_deref()),
            new_properties: codec::decode_optional(record.new_props.as_deref()),
            relationship_type: non_empty(record.relationship_type),
            related_label: non_empty(record.target_label),
            related_id: optional_id(&record.target_id)?,
        })
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn optional_id(raw: &str) -> AuditResult<Option<EntityId>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    raw.parse::<EntityId>()
        .map(Some)
        .map_err(|e| AuditError::invalid_format(e.to_string()))
}
