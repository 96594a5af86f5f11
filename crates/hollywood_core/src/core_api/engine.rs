use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::codec::{self, ValidatedUpdates};
use crate::derived::{self, IndependentCinemas};
use crate::document::SaveDocument;
use crate::fields::FieldId;
use crate::layout::{DocumentLayout, SpanId};
use crate::persist;
use crate::policy::{ACTIVE_POLICY_KEY, ActivePolicy};
use crate::rewrite;
use crate::studio::{OWNED_CINEMAS_KEY, OwnershipMap, Studio};

use super::error::{CoreError, CoreErrorCode};
use super::types::{Capabilities, SaveReport, Snapshot};

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

/// Edit buffers for the form. Text is kept as typed until save validates it.
#[derive(Debug, Clone)]
struct EditForm {
    scalars: BTreeMap<FieldId, String>,
    owned_cinemas: [String; 6],
    active_policy: Option<ActivePolicy>,
}

#[derive(Debug)]
pub struct Session {
    snapshot: Snapshot,
    capabilities: Capabilities,
    document: SaveDocument,
    form: EditForm,
}

impl Engine {
    pub fn new() -> Self {
        Self
    }

    /// Load. On failure no session exists, so any previously opened one is untouched.
    pub fn open_path<P: AsRef<Path>>(&self, path: P) -> Result<Session, CoreError> {
        let document = SaveDocument::load(path.as_ref())?;
        Ok(Session::from_document(document))
    }

    /// In-memory session with no backing file; `save` is unavailable.
    pub fn open_text<S: Into<String>>(&self, text: S) -> Session {
        Session::from_document(SaveDocument::parse(text.into(), None))
    }
}

impl Session {
    fn from_document(document: SaveDocument) -> Self {
        let snapshot = Snapshot {
            fields: document.detected_fields().clone(),
            owned_cinemas: document.owned_cinemas(),
            has_owned_cinemas: document.has_owned_cinemas_block(),
            policy_unlocked: document.policy_unlocked(),
            active_policy: document.active_policy().cloned(),
        };
        let capabilities = Capabilities::new(
            document.path().is_some(),
            snapshot.policy_unlocked,
            snapshot.has_owned_cinemas,
        );
        let form = EditForm {
            scalars: FieldId::EDITABLE
                .iter()
                .map(|id| (*id, snapshot.value(*id).to_string()))
                .collect(),
            owned_cinemas: Studio::ALL.map(|studio| snapshot.owned_cinemas.get(studio).to_string()),
            active_policy: snapshot.active_policy.clone(),
        };

        Self {
            snapshot,
            capabilities,
            document,
            form,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn path(&self) -> Option<&Path> {
        self.document.path()
    }

    pub fn raw_text(&self) -> &str {
        self.document.raw_text()
    }

    pub fn layout(&self) -> &DocumentLayout {
        self.document.layout()
    }

    /// Current edit buffer for editable fields, the loaded value for read-only ones.
    pub fn field(&self, id: FieldId) -> &str {
        self.form
            .scalars
            .get(&id)
            .map(String::as_str)
            .unwrap_or_else(|| self.snapshot.value(id))
    }

    pub fn set_field(&mut self, id: FieldId, value: impl Into<String>) -> Result<(), CoreError> {
        if !id.is_editable() {
            return Err(CoreError::new(
                CoreErrorCode::UnsupportedOperation,
                format!("{} is read-only", id.key()),
            ));
        }
        self.form.scalars.insert(id, value.into());
        Ok(())
    }

    pub fn owned_cinemas(&self, studio: Studio) -> &str {
        &self.form.owned_cinemas[studio.index()]
    }

    pub fn set_owned_cinemas(&mut self, studio: Studio, value: impl Into<String>) {
        self.form.owned_cinemas[studio.index()] = value.into();
    }

    /// `None` while the policy section is locked.
    pub fn active_policy(&self) -> Option<&ActivePolicy> {
        self.form.active_policy.as_ref()
    }

    /// Ignored when the save has the policy section locked: there is nothing to rewrite.
    pub fn set_active_policy(&mut self, policy: ActivePolicy) {
        if !self.snapshot.policy_unlocked {
            warn!(policy = %policy, "policy section locked, active policy not set");
            return;
        }
        self.form.active_policy = Some(policy);
    }

    pub fn independent_cinemas(&self) -> IndependentCinemas {
        derived::recompute_independent(
            self.field(FieldId::AllCinemas),
            self.form.owned_cinemas.iter().map(String::as_str),
        )
    }

    /// Runs every codec before anything is written; the first failure aborts.
    pub fn validate(&self) -> Result<ValidatedUpdates, CoreError> {
        let mut scalars = BTreeMap::new();
        for id in FieldId::EDITABLE {
            let encoded = codec::validate_and_encode(id, self.field(id))?;
            scalars.insert(id, encoded);
        }

        let mut owned_cinemas = OwnershipMap::default();
        for studio in Studio::ALL {
            let count = codec::encode_owned_cinemas(studio, self.owned_cinemas(studio))?;
            owned_cinemas.set(studio, count);
        }

        let active_policy = if self.snapshot.policy_unlocked {
            self.form.active_policy.clone()
        } else {
            None
        };

        Ok(ValidatedUpdates {
            scalars,
            owned_cinemas,
            active_policy,
        })
    }

    /// Validate and rewrite in memory without touching disk.
    pub fn render_text(&self) -> Result<String, CoreError> {
        let updates = self.validate()?;
        rewrite::rewrite(self.document.raw_text(), &updates)
    }

    pub fn save(&mut self) -> Result<SaveReport, CoreError> {
        let path = self.document.path().map(Path::to_path_buf).ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::UnsupportedOperation,
                "session has no backing file to save to",
            )
        })?;

        debug!(path = %path.display(), "validating edits");
        let updates = self.validate()?;
        let text = rewrite::rewrite(self.document.raw_text(), &updates)?;
        let changed = self.changed_keys(&updates);

        let backup_path = persist::backup_path(&path);
        debug!(backup = %backup_path.display(), "writing backup");
        persist::write_backup(&path, &backup_path)?;

        debug!(path = %path.display(), "replacing save");
        persist::write_atomic(&path, &text)?;
        info!(
            path = %path.display(),
            changed = changed.len(),
            "save committed"
        );

        *self = Session::from_document(SaveDocument::parse(text, Some(path.clone())));
        Ok(SaveReport {
            path,
            backup_path,
            changed,
        })
    }

    fn changed_keys(&self, updates: &ValidatedUpdates) -> Vec<String> {
        let layout = self.document.layout();
        let mut out = Vec::new();

        for (id, value) in &updates.scalars {
            let present = layout.get(SpanId::Field(*id)).is_some();
            if present && self.snapshot.value(*id) != value.as_str() {
                out.push(id.key().to_string());
            }
        }
        if self.snapshot.has_owned_cinemas && self.snapshot.owned_cinemas != updates.owned_cinemas
        {
            out.push(OWNED_CINEMAS_KEY.to_string());
        }
        if updates.active_policy.is_some()
            && updates.active_policy != self.snapshot.active_policy
            && layout.get(SpanId::ActivePolicy).is_some()
        {
            out.push(ACTIVE_POLICY_KEY.to_string());
        }
        out
    }
}
