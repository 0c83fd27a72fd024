//! JSON command payloads for UI and bridge callers.
//!
//! # Responsibility
//! - Parse `{ "op": ..., ... }` payloads into typed store commands.
//! - Execute commands against a `PhyxStore`.
//!
//! # Invariants
//! - A payload missing a required field fails with `MissingArgument` naming
//!   that field; `null` counts as missing.
//! - Parsing never mutates the store.

use crate::model::document::{Document, PhylogenyId, PhylorefId};
use crate::service::phyx_store::{CuratorUpdate, PhyxStore, RecordKind, StoreError, StoreResult};
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

/// One store operation, as sent by an editing UI.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCommand {
    SetCurrentPhyx(Document),
    /// `None` resets the baseline to a copy of the current document.
    SetLoadedPhyx(Option<Document>),
    CreateEmptyPhyloref,
    CreateEmptyPhylogeny,
    DeletePhyloref(PhylorefId),
    DeletePhylogeny(PhylogenyId),
    DuplicatePhyloref(PhylorefId),
    SetDefaultNomenCodeUri(String),
    SetCurator(CuratorUpdate),
    SetReasoningResults(Value),
    CreatePhylogenyFromOpenTree,
}

impl StoreCommand {
    /// Wire name of the operation.
    pub fn op_name(&self) -> &'static str {
        match self {
            Self::SetCurrentPhyx(_) => "setCurrentPhyx",
            Self::SetLoadedPhyx(_) => "setLoadedPhyx",
            Self::CreateEmptyPhyloref => "createEmptyPhyloref",
            Self::CreateEmptyPhylogeny => "createEmptyPhylogeny",
            Self::DeletePhyloref(_) => "deletePhyloref",
            Self::DeletePhylogeny(_) => "deletePhylogeny",
            Self::DuplicatePhyloref(_) => "duplicatePhyloref",
            Self::SetDefaultNomenCodeUri(_) => "setDefaultNomenCodeURI",
            Self::SetCurator(_) => "setCurator",
            Self::SetReasoningResults(_) => "setReasoningResults",
            Self::CreatePhylogenyFromOpenTree => "createPhylogenyFromOpenTree",
        }
    }

    /// Parses a command payload.
    ///
    /// # Errors
    /// - `MissingArgument` for an absent `op` or required field.
    /// - `InvalidArgument` for wrongly typed fields or malformed handles.
    /// - `InvalidJson` when an embedded document does not have Phyx shape.
    /// - `UnknownCommand` for an unrecognized `op`.
    pub fn from_json(payload: &Value) -> StoreResult<Self> {
        let op = required_str(payload, "op")?;
        let command = match op {
            "setCurrentPhyx" => Self::SetCurrentPhyx(parse_document(required(payload, "phyx")?)?),
            "setLoadedPhyx" => Self::SetLoadedPhyx(
                optional(payload, "phyx")
                    .map(parse_document)
                    .transpose()?,
            ),
            "createEmptyPhyloref" => Self::CreateEmptyPhyloref,
            "createEmptyPhylogeny" => Self::CreateEmptyPhylogeny,
            "deletePhyloref" => Self::DeletePhyloref(required_id(payload, "phyloref")?),
            "deletePhylogeny" => Self::DeletePhylogeny(required_id(payload, "phylogeny")?),
            "duplicatePhyloref" => Self::DuplicatePhyloref(required_id(payload, "phyloref")?),
            "setDefaultNomenCodeURI" => {
                Self::SetDefaultNomenCodeUri(required_str(payload, "uri")?.to_string())
            }
            "setCurator" => Self::SetCurator(CuratorUpdate {
                name: optional_string(payload, "name")?,
                email: optional_string(payload, "email")?,
                orcid: optional_string(payload, "orcid")?,
            }),
            "setReasoningResults" => {
                Self::SetReasoningResults(required(payload, "results")?.clone())
            }
            "createPhylogenyFromOpenTree" => Self::CreatePhylogenyFromOpenTree,
            other => return Err(StoreError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

impl PhyxStore {
    /// Executes one command. Returns the handle of a record the command
    /// created, if any.
    pub fn dispatch(&mut self, command: StoreCommand) -> StoreResult<Option<Uuid>> {
        debug!(
            "event=command_dispatch module=store status=start op={}",
            command.op_name()
        );
        let created = match command {
            StoreCommand::SetCurrentPhyx(document) => {
                self.set_current_document(document);
                None
            }
            StoreCommand::SetLoadedPhyx(document) => {
                self.set_loaded_document(document);
                None
            }
            StoreCommand::CreateEmptyPhyloref => Some(self.add_empty_phyloref()),
            StoreCommand::CreateEmptyPhylogeny => Some(self.add_empty_phylogeny()),
            StoreCommand::DeletePhyloref(id) => {
                self.delete_phyloref(id)?;
                None
            }
            StoreCommand::DeletePhylogeny(id) => {
                self.delete_phylogeny(id)?;
                None
            }
            StoreCommand::DuplicatePhyloref(id) => {
                // A bare handle carries no record to fall back on, so an
                // unknown handle cannot be appended.
                let source = self.phyloref(id).cloned().ok_or(StoreError::NotFound {
                    kind: RecordKind::Phyloref,
                    id,
                })?;
                Some(self.duplicate_phyloref(&source))
            }
            StoreCommand::SetDefaultNomenCodeUri(uri) => {
                self.set_default_nomen_code_uri(&uri)?;
                None
            }
            StoreCommand::SetCurator(update) => {
                self.set_curator(update);
                None
            }
            StoreCommand::SetReasoningResults(results) => {
                self.set_reasoning_results(results);
                None
            }
            StoreCommand::CreatePhylogenyFromOpenTree => {
                Some(self.create_phylogeny_from_open_tree())
            }
        };
        Ok(created)
    }
}

fn optional<'a>(payload: &'a Value, field: &str) -> Option<&'a Value> {
    payload.get(field).filter(|value| !value.is_null())
}

fn required<'a>(payload: &'a Value, field: &'static str) -> StoreResult<&'a Value> {
    optional(payload, field).ok_or(StoreError::MissingArgument(field))
}

fn required_str<'a>(payload: &'a Value, field: &'static str) -> StoreResult<&'a str> {
    required(payload, field)?
        .as_str()
        .ok_or_else(|| StoreError::InvalidArgument {
            field,
            reason: "expected a string".to_string(),
        })
}

fn optional_string(payload: &Value, field: &'static str) -> StoreResult<Option<String>> {
    optional(payload, field)
        .map(|value| {
            value
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| StoreError::InvalidArgument {
                    field,
                    reason: "expected a string".to_string(),
                })
        })
        .transpose()
}

fn required_id(payload: &Value, field: &'static str) -> StoreResult<Uuid> {
    let raw = required_str(payload, field)?;
    Uuid::parse_str(raw.trim()).map_err(|err| StoreError::InvalidArgument {
        field,
        reason: err.to_string(),
    })
}

fn parse_document(value: &Value) -> StoreResult<Document> {
    Document::deserialize(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::StoreCommand;
    use crate::service::phyx_store::StoreError;
    use serde_json::json;

    #[test]
    fn missing_op_is_missing_argument() {
        let err = StoreCommand::from_json(&json!({})).unwrap_err();
        assert!(matches!(err, StoreError::MissingArgument("op")));
    }

    #[test]
    fn null_target_counts_as_missing() {
        let err =
            StoreCommand::from_json(&json!({"op": "deletePhyloref", "phyloref": null})).unwrap_err();
        assert!(matches!(err, StoreError::MissingArgument("phyloref")));
    }

    #[test]
    fn malformed_handle_is_invalid_argument() {
        let err = StoreCommand::from_json(&json!({"op": "deletePhylogeny", "phylogeny": "x"}))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidArgument {
                field: "phylogeny",
                ..
            }
        ));
    }

    #[test]
    fn unknown_op_is_rejected() {
        let err = StoreCommand::from_json(&json!({"op": "launchRockets"})).unwrap_err();
        assert!(matches!(err, StoreError::UnknownCommand(op) if op == "launchRockets"));
    }

    #[test]
    fn op_names_round_trip_through_parser() {
        let command = StoreCommand::from_json(&json!({"op": "createEmptyPhylogeny"})).unwrap();
        assert_eq!(command, StoreCommand::CreateEmptyPhylogeny);
        assert_eq!(command.op_name(), "createEmptyPhylogeny");
    }
}
