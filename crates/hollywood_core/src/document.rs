use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::core_api::CoreError;
use crate::fields::{FieldDescriptor, FieldId, REGISTRY, compile_builtin};
use crate::layout::DocumentLayout;
use crate::policy::ActivePolicy;
use crate::studio::{OwnershipMap, Studio};

/// Value assigned to any recognized scalar key the save does not contain.
pub const MISSING_FIELD_VALUE: &str = "0";

pub(crate) static OWNED_CINEMAS_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_builtin(r#""ownedCinemas":(\{[^{}]*\})"#));
pub(crate) static POLICY_FLAG_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_builtin(r#""Policy":(true|false)"#));
pub(crate) static ACTIVE_POLICY_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_builtin(r#""ACTIVE_POLICY":"([A-Za-z0-9_]+)""#));
static STUDIO_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    Studio::ALL
        .iter()
        .map(|studio| compile_builtin(&format!(r#""{}"\s*:\s*([0-9]+)"#, studio.code())))
        .collect()
});

/// One loaded save file. Rebuilt from scratch on every load.
#[derive(Debug, Clone)]
pub struct SaveDocument {
    path: Option<PathBuf>,
    raw_text: String,
    detected_fields: BTreeMap<FieldId, String>,
    owned_cinemas: Option<OwnershipMap>,
    active_policy: Option<ActivePolicy>,
    layout: DocumentLayout,
}

impl SaveDocument {
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let raw_text = fs::read_to_string(path)
            .map_err(|e| CoreError::io(format!("failed to read {}", path.display()), e))?;
        Ok(Self::parse(raw_text, Some(path.to_path_buf())))
    }

    pub fn parse(raw_text: String, path: Option<PathBuf>) -> Self {
        let detected_fields = extract_fields(&raw_text, &REGISTRY);
        let owned_cinemas = extract_owned_cinemas(&raw_text);
        let active_policy = extract_policy(&raw_text);
        let layout = DocumentLayout::locate(&raw_text);

        debug!(
            path = ?path,
            bytes = raw_text.len(),
            located = layout.spans.len(),
            owned_cinemas = owned_cinemas.is_some(),
            policy_unlocked = active_policy.is_some(),
            "parsed save document"
        );

        Self {
            path,
            raw_text,
            detected_fields,
            owned_cinemas,
            active_policy,
            layout,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn detected_fields(&self) -> &BTreeMap<FieldId, String> {
        &self.detected_fields
    }

    pub fn value(&self, id: FieldId) -> &str {
        self.detected_fields
            .get(&id)
            .map(String::as_str)
            .unwrap_or(MISSING_FIELD_VALUE)
    }

    /// All-zero when the save has no `ownedCinemas` block.
    pub fn owned_cinemas(&self) -> OwnershipMap {
        self.owned_cinemas.unwrap_or_default()
    }

    pub fn has_owned_cinemas_block(&self) -> bool {
        self.owned_cinemas.is_some()
    }

    pub fn policy_unlocked(&self) -> bool {
        self.active_policy.is_some()
    }

    pub fn active_policy(&self) -> Option<&ActivePolicy> {
        self.active_policy.as_ref()
    }

    pub fn layout(&self) -> &DocumentLayout {
        &self.layout
    }
}

/// First match wins: a key that recurs is governed by its first occurrence.
pub fn extract_fields(
    raw_text: &str,
    registry: &[FieldDescriptor],
) -> BTreeMap<FieldId, String> {
    registry
        .iter()
        .map(|descriptor| {
            let value = raw_text
                .lines()
                .find_map(|line| {
                    descriptor
                        .extract_regex()
                        .captures(line)
                        .and_then(|caps| caps.get(1))
                        .map(|m| m.as_str().to_string())
                })
                .unwrap_or_else(|| MISSING_FIELD_VALUE.to_string());
            (descriptor.id, value)
        })
        .collect()
}

/// `None` when the save has no `ownedCinemas` object at all. Studio entries that
/// are missing or not plain integers read as 0.
pub fn extract_owned_cinemas(raw_text: &str) -> Option<OwnershipMap> {
    let literal = OWNED_CINEMAS_RE
        .captures(raw_text)
        .and_then(|caps| caps.get(1))?
        .as_str();

    let mut map = OwnershipMap::default();
    for (studio, re) in Studio::ALL.iter().zip(STUDIO_RES.iter()) {
        let count = re
            .captures(literal)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0);
        map.set(*studio, count);
    }
    Some(map)
}

/// `None` unless the `Policy` unlock flag is `true`.
pub fn extract_policy(raw_text: &str) -> Option<ActivePolicy> {
    let unlocked = POLICY_FLAG_RE
        .captures(raw_text)
        .and_then(|caps| caps.get(1))
        .is_some_and(|m| m.as_str() == "true");
    if !unlocked {
        return None;
    }

    let policy = ACTIVE_POLICY_RE
        .captures(raw_text)
        .and_then(|caps| caps.get(1))
        .map(|m| ActivePolicy::from_token(m.as_str()))
        .unwrap_or(ActivePolicy::BASELINE);
    Some(policy)
}
