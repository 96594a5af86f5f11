use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::fields::FieldId;
use crate::policy::ActivePolicy;
use crate::studio::OwnershipMap;

/// Values as read from the save at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub fields: BTreeMap<FieldId, String>,
    pub owned_cinemas: OwnershipMap,
    pub has_owned_cinemas: bool,
    pub policy_unlocked: bool,
    pub active_policy: Option<ActivePolicy>,
}

impl Snapshot {
    pub fn value(&self, id: FieldId) -> &str {
        self.fields
            .get(&id)
            .map(String::as_str)
            .unwrap_or(crate::document::MISSING_FIELD_VALUE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapabilityIssue {
    /// `Policy` is false or missing; the active policy is not written.
    PolicyLocked,
    /// No `ownedCinemas` object; non-zero ownership edits cannot be saved.
    OwnershipBlockMissing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Capabilities {
    pub can_save: bool,
    pub can_edit_policy: bool,
    pub can_edit_ownership: bool,
    pub issues: Vec<CapabilityIssue>,
}

impl Capabilities {
    pub fn new(has_path: bool, policy_unlocked: bool, has_owned_cinemas: bool) -> Self {
        let mut issues = Vec::new();
        if !policy_unlocked {
            issues.push(CapabilityIssue::PolicyLocked);
        }
        if !has_owned_cinemas {
            issues.push(CapabilityIssue::OwnershipBlockMissing);
        }

        Self {
            can_save: has_path,
            can_edit_policy: policy_unlocked,
            can_edit_ownership: has_owned_cinemas,
            issues,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReport {
    pub path: PathBuf,
    pub backup_path: PathBuf,
    /// Keys whose on-disk value differs from what was loaded.
    pub changed: Vec<String>,
}
