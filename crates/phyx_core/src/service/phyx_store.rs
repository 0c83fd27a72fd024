//! Phyx document store.
//!
//! # Responsibility
//! - Hold the current (editable) document, the loaded baseline and the
//!   transient reasoning results.
//! - Expose editing operations that touch only the current document.
//! - Report unsaved changes by comparing current against loaded.
//!
//! # Invariants
//! - Current and loaded are separately owned values; editing one is never
//!   observable through the other.
//! - Replacing the current document wholesale clears reasoning results.
//! - Deletion and duplication locate records by handle, never by position.
//! - Failed operations leave the store unchanged and emit no event.

use crate::model::document::{Document, Phylogeny, PhylogenyId, Phyloref, PhylorefId};
use crate::model::nomen_code::DEFAULT_NOMEN_CODE_URI;
use crate::service::events::{EventRegistry, StoreEvent, StoreListener, SubscriptionId};
use crate::service::open_tree::{open_tree_phylogeny, open_tree_taxon_names};
use crate::taxon::name_resolver::{SpecifierNameResolver, TaxonNameResolver};
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Record collection an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Phyloref,
    Phylogeny,
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Phyloref => write!(f, "phyloref"),
            Self::Phylogeny => write!(f, "phylogeny"),
        }
    }
}

/// Errors raised by store operations.
///
/// These are caller contract violations; none of them is retried.
#[derive(Debug)]
pub enum StoreError {
    /// A required argument was absent or empty.
    MissingArgument(&'static str),
    /// An argument was present but unusable.
    InvalidArgument { field: &'static str, reason: String },
    /// Target record is not in its collection.
    NotFound { kind: RecordKind, id: Uuid },
    /// Command payload named an operation the store does not know.
    UnknownCommand(String),
    /// Document text or payload could not be read as Phyx JSON.
    InvalidJson(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingArgument(field) => write!(f, "missing required argument: `{field}`"),
            Self::InvalidArgument { field, reason } => {
                write!(f, "invalid argument `{field}`: {reason}")
            }
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::UnknownCommand(op) => write!(f, "unknown store command: `{op}`"),
            Self::InvalidJson(err) => write!(f, "invalid phyx json: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidJson(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidJson(value)
    }
}

/// Store configuration supplied by the hosting application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Code reported when the current document declares none.
    pub default_nomen_code_uri: String,
    /// Spaces per indent level in `to_json_text`.
    pub json_indent: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            default_nomen_code_uri: DEFAULT_NOMEN_CODE_URI.to_string(),
            json_indent: 4,
        }
    }
}

/// Partial curator update. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CuratorUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub orcid: Option<String>,
}

impl CuratorUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.orcid.is_none()
    }
}

/// Editing store for one Phyx document.
///
/// Owned by the application's top-level controller and lent to UI code;
/// every mutation takes `&mut self`, so writes are serialized by the
/// borrow checker.
pub struct PhyxStore {
    settings: StoreSettings,
    current: Document,
    loaded: Document,
    reasoning_results: Option<Value>,
    resolver: Box<dyn TaxonNameResolver>,
    events: EventRegistry,
}

impl Default for PhyxStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PhyxStore {
    /// Creates an empty store with default settings.
    pub fn new() -> Self {
        Self::with_settings(StoreSettings::default())
    }

    pub fn with_settings(settings: StoreSettings) -> Self {
        Self {
            settings,
            current: Document::new(),
            loaded: Document::new(),
            reasoning_results: None,
            resolver: Box::new(SpecifierNameResolver),
            events: EventRegistry::new(),
        }
    }

    /// Replaces the taxon name resolver used for Open Tree derivation.
    pub fn with_resolver(mut self, resolver: Box<dyn TaxonNameResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    // ---- subscriptions -------------------------------------------------

    pub fn subscribe(&mut self, listener: StoreListener) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // ---- replacement ---------------------------------------------------

    pub fn current_document(&self) -> &Document {
        &self.current
    }

    pub fn loaded_document(&self) -> &Document {
        &self.loaded
    }

    /// Replaces the current document. Does not touch the loaded baseline,
    /// so the swap counts as an unsaved change until the baseline is reset.
    pub fn set_current_document(&mut self, document: Document) {
        info!(
            "event=current_replaced module=store status=ok phylorefs={} phylogenies={}",
            document.phylorefs.len(),
            document.phylogenies.len()
        );
        self.current = document;
        self.events.emit(StoreEvent::CurrentReplaced);

        // Inference over the previous document no longer applies.
        if self.reasoning_results.take().is_some() {
            debug!("event=reasoning_results_cleared module=store status=ok");
            self.events.emit(StoreEvent::ReasoningResultsChanged);
        }
    }

    /// Sets the change-detection baseline.
    ///
    /// `None` snapshots a deep copy of the current document ("mark as
    /// saved"). `Some(document)` installs the caller's document as-is.
    pub fn set_loaded_document(&mut self, document: Option<Document>) {
        let from_current = document.is_none();
        self.loaded = document.unwrap_or_else(|| self.current.clone());
        info!("event=loaded_replaced module=store status=ok from_current={from_current}");
        self.events.emit(StoreEvent::LoadedReplaced);
    }

    /// Empties both documents and drops reasoning results.
    pub fn reset(&mut self) {
        self.set_current_document(Document::new());
        self.set_loaded_document(None);
    }

    pub fn reasoning_results(&self) -> Option<&Value> {
        self.reasoning_results.as_ref()
    }

    pub fn set_reasoning_results(&mut self, results: Value) {
        self.reasoning_results = Some(results);
        debug!("event=reasoning_results_set module=store status=ok");
        self.events.emit(StoreEvent::ReasoningResultsChanged);
    }

    pub fn clear_reasoning_results(&mut self) {
        if self.reasoning_results.take().is_some() {
            self.events.emit(StoreEvent::ReasoningResultsChanged);
        }
    }

    // ---- change detection ----------------------------------------------

    /// True when the current document differs structurally from the
    /// baseline. Recomputed on every call.
    pub fn has_unsaved_changes(&self) -> bool {
        self.current != self.loaded
    }

    /// Declared code of the current document, else the configured default.
    pub fn default_nomen_code_uri(&self) -> &str {
        self.current
            .default_nomen_code_uri
            .as_deref()
            .unwrap_or(self.settings.default_nomen_code_uri.as_str())
    }

    /// Canonical indented JSON of the current document.
    pub fn to_json_text(&self) -> StoreResult<String> {
        self.current.to_json_text(self.settings.json_indent)
    }

    // ---- collection editing --------------------------------------------

    pub fn phyloref(&self, id: PhylorefId) -> Option<&Phyloref> {
        self.current.phyloref(id)
    }

    pub fn phylogeny(&self, id: PhylogenyId) -> Option<&Phylogeny> {
        self.current.phylogeny(id)
    }

    /// Appends an empty phyloref and returns its handle.
    pub fn add_empty_phyloref(&mut self) -> PhylorefId {
        self.add_phyloref(Phyloref::new())
    }

    /// Appends an empty phylogeny and returns its handle.
    pub fn add_empty_phylogeny(&mut self) -> PhylogenyId {
        self.add_phylogeny(Phylogeny::new())
    }

    pub fn add_phyloref(&mut self, phyloref: Phyloref) -> PhylorefId {
        let id = phyloref.id();
        self.current.phylorefs.push(phyloref);
        debug!("event=phyloref_added module=store status=ok phyloref_id={id}");
        self.events.emit(StoreEvent::PhylorefAdded(id));
        id
    }

    pub fn add_phylogeny(&mut self, phylogeny: Phylogeny) -> PhylogenyId {
        let id = phylogeny.id();
        self.current.phylogenies.push(phylogeny);
        debug!("event=phylogeny_added module=store status=ok phylogeny_id={id}");
        self.events.emit(StoreEvent::PhylogenyAdded(id));
        id
    }

    /// Removes exactly the phyloref with this handle.
    ///
    /// # Errors
    /// - `NotFound` when no phyloref has this handle; the list is unchanged.
    pub fn delete_phyloref(&mut self, id: PhylorefId) -> StoreResult<Phyloref> {
        let index = self.current.phyloref_index(id).ok_or_else(|| {
            warn!("event=phyloref_delete module=store status=not_found phyloref_id={id}");
            StoreError::NotFound {
                kind: RecordKind::Phyloref,
                id,
            }
        })?;
        let removed = self.current.phylorefs.remove(index);
        debug!("event=phyloref_deleted module=store status=ok phyloref_id={id} index={index}");
        self.events.emit(StoreEvent::PhylorefRemoved(id));
        Ok(removed)
    }

    /// Removes exactly the phylogeny with this handle.
    ///
    /// # Errors
    /// - `NotFound` when no phylogeny has this handle; the list is unchanged.
    pub fn delete_phylogeny(&mut self, id: PhylogenyId) -> StoreResult<Phylogeny> {
        let index = self.current.phylogeny_index(id).ok_or_else(|| {
            warn!("event=phylogeny_delete module=store status=not_found phylogeny_id={id}");
            StoreError::NotFound {
                kind: RecordKind::Phylogeny,
                id,
            }
        })?;
        let removed = self.current.phylogenies.remove(index);
        debug!(
            "event=phylogeny_deleted module=store status=ok phylogeny_id={id} index={index}"
        );
        self.events.emit(StoreEvent::PhylogenyRemoved(id));
        Ok(removed)
    }

    /// Inserts a deep copy of `phyloref` right after the record with the
    /// same handle, or appends it when that record is no longer present.
    ///
    /// Returns the copy's fresh handle.
    pub fn duplicate_phyloref(&mut self, phyloref: &Phyloref) -> PhylorefId {
        let copy = phyloref.duplicate();
        let id = copy.id();
        let index = match self.current.phyloref_index(phyloref.id()) {
            Some(found) => found + 1,
            None => {
                debug!(
                    "event=phyloref_duplicate module=store status=appended source_id={}",
                    phyloref.id()
                );
                self.current.phylorefs.len()
            }
        };
        self.current.phylorefs.insert(index, copy);
        debug!("event=phyloref_added module=store status=ok phyloref_id={id} index={index}");
        self.events.emit(StoreEvent::PhylorefAdded(id));
        id
    }

    /// Same placement policy as `duplicate_phyloref`.
    pub fn duplicate_phylogeny(&mut self, phylogeny: &Phylogeny) -> PhylogenyId {
        let copy = phylogeny.duplicate();
        let id = copy.id();
        let index = self
            .current
            .phylogeny_index(phylogeny.id())
            .map_or(self.current.phylogenies.len(), |found| found + 1);
        self.current.phylogenies.insert(index, copy);
        debug!("event=phylogeny_added module=store status=ok phylogeny_id={id} index={index}");
        self.events.emit(StoreEvent::PhylogenyAdded(id));
        id
    }

    /// Edits one phyloref body in place.
    pub fn update_phyloref<F>(&mut self, id: PhylorefId, edit: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Value),
    {
        let index = self
            .current
            .phyloref_index(id)
            .ok_or(StoreError::NotFound {
                kind: RecordKind::Phyloref,
                id,
            })?;
        edit(self.current.phylorefs[index].body_mut());
        self.events.emit(StoreEvent::PhylorefChanged(id));
        Ok(())
    }

    /// Edits one phylogeny body in place.
    pub fn update_phylogeny<F>(&mut self, id: PhylogenyId, edit: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Value),
    {
        let index = self
            .current
            .phylogeny_index(id)
            .ok_or(StoreError::NotFound {
                kind: RecordKind::Phylogeny,
                id,
            })?;
        edit(self.current.phylogenies[index].body_mut());
        self.events.emit(StoreEvent::PhylogenyChanged(id));
        Ok(())
    }

    // ---- metadata ------------------------------------------------------

    /// Declares the document's default nomenclatural code. The value is
    /// stored exactly as given.
    ///
    /// # Errors
    /// - `MissingArgument("uri")` when `uri` is empty.
    pub fn set_default_nomen_code_uri(&mut self, uri: &str) -> StoreResult<()> {
        if uri.is_empty() {
            return Err(StoreError::MissingArgument("uri"));
        }
        self.current.default_nomen_code_uri = Some(uri.to_string());
        debug!("event=nomen_code_set module=store status=ok uri={uri}");
        self.events.emit(StoreEvent::MetadataChanged);
        Ok(())
    }

    /// Drops the document's declared code so the default applies again.
    pub fn clear_default_nomen_code_uri(&mut self) {
        if self.current.default_nomen_code_uri.take().is_some() {
            self.events.emit(StoreEvent::MetadataChanged);
        }
    }

    /// Writes only the curator fields present in `update`.
    pub fn set_curator(&mut self, update: CuratorUpdate) {
        if update.is_empty() {
            return;
        }
        let CuratorUpdate { name, email, orcid } = update;
        // Curator values are personal data; only log which fields moved.
        debug!(
            "event=curator_set module=store status=ok name={} email={} orcid={}",
            name.is_some(),
            email.is_some(),
            orcid.is_some()
        );
        if name.is_some() {
            self.current.curator = name;
        }
        if email.is_some() {
            self.current.curator_email = email;
        }
        if orcid.is_some() {
            self.current.curator_orcid = orcid;
        }
        self.events.emit(StoreEvent::MetadataChanged);
    }

    // ---- Open Tree derivation ------------------------------------------

    /// Taxon names the tree service should be queried with, in phyloref and
    /// specifier order, duplicates kept.
    pub fn open_tree_taxon_names(&self) -> Vec<String> {
        open_tree_taxon_names(&self.current, self.resolver.as_ref())
    }

    /// Appends a phylogeny synthesized from the names referenced by the
    /// current phylorefs and returns its handle.
    pub fn create_phylogeny_from_open_tree(&mut self) -> PhylogenyId {
        let phylogeny = open_tree_phylogeny(&self.current, self.resolver.as_ref());
        info!(
            "event=open_tree_phylogeny module=store status=ok phylorefs={}",
            self.current.phylorefs.len()
        );
        self.add_phylogeny(phylogeny)
    }
}

#[cfg(test)]
mod tests {
    use super::{CuratorUpdate, PhyxStore, StoreError, StoreSettings};
    use crate::model::document::Document;
    use serde_json::json;

    #[test]
    fn default_code_comes_from_settings_when_document_has_none() {
        let settings = StoreSettings {
            default_nomen_code_uri: "urn:test:code".to_string(),
            ..StoreSettings::default()
        };
        let mut store = PhyxStore::with_settings(settings);
        assert_eq!(store.default_nomen_code_uri(), "urn:test:code");

        store.set_default_nomen_code_uri("urn:other").unwrap();
        assert_eq!(store.default_nomen_code_uri(), "urn:other");
    }

    #[test]
    fn empty_code_uri_is_missing_argument() {
        let mut store = PhyxStore::new();
        let err = store.set_default_nomen_code_uri("").unwrap_err();
        assert!(matches!(err, StoreError::MissingArgument("uri")));
        assert_eq!(store.current_document().default_nomen_code_uri, None);
    }

    #[test]
    fn code_uri_is_stored_as_given() {
        let mut store = PhyxStore::new();
        store.set_default_nomen_code_uri(" urn:x ").unwrap();
        assert_eq!(
            store.current_document().default_nomen_code_uri.as_deref(),
            Some(" urn:x ")
        );

        store.set_default_nomen_code_uri("  ").unwrap();
        assert_eq!(store.default_nomen_code_uri(), "  ");
    }

    #[test]
    fn empty_curator_update_is_a_no_op() {
        let mut store = PhyxStore::new();
        store.set_loaded_document(None);
        store.set_curator(CuratorUpdate::default());
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: StoreSettings = serde_json::from_value(json!({"json_indent": 2})).unwrap();
        assert_eq!(settings.json_indent, 2);
        assert_eq!(
            settings.default_nomen_code_uri,
            StoreSettings::default().default_nomen_code_uri
        );
    }

    #[test]
    fn reset_empties_both_documents() {
        let mut store = PhyxStore::new();
        store.add_empty_phyloref();
        store.set_reasoning_results(json!({"ok": true}));
        store.reset();
        assert_eq!(store.current_document(), &Document::new());
        assert!(!store.has_unsaved_changes());
        assert!(store.reasoning_results().is_none());
    }
}
