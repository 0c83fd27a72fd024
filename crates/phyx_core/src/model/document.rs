//! Phyx document model.
//!
//! # Responsibility
//! - Define the document shape shared by the editing store and its
//!   collaborators (file loading, export, reasoning).
//! - Give every phyloref/phylogeny a stable handle for identity-based edits.
//!
//! # Invariants
//! - Record handles are never serialized; they are assigned on construction
//!   or deserialization.
//! - Structural equality ignores record handles, so two independent parses of
//!   the same file compare equal.
//! - Record bodies are opaque JSON; no shape validation happens here.

use crate::service::phyx_store::{StoreError, StoreResult};
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Stable handle of a phyloref inside the store.
pub type PhylorefId = Uuid;
/// Stable handle of a phylogeny inside the store.
pub type PhylogenyId = Uuid;

/// JSON key of the specifiers that must be included in the clade.
pub const INTERNAL_SPECIFIERS_KEY: &str = "internalSpecifiers";
/// JSON key of the specifiers that must be excluded from the clade.
pub const EXTERNAL_SPECIFIERS_KEY: &str = "externalSpecifiers";

/// Top-level keys backed by declared `Document` fields.
pub const RESERVED_DOCUMENT_KEYS: [&str; 6] = [
    "phylorefs",
    "phylogenies",
    "defaultNomenclaturalCodeURI",
    "curator",
    "curatorEmail",
    "curatorORCID",
];

macro_rules! opaque_record {
    ($(#[$meta:meta])* $name:ident, $id:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            id: $id,
            body: Value,
        }

        impl $name {
            /// Creates an empty record (`{}`) with a fresh handle.
            pub fn new() -> Self {
                Self::from_value(Value::Object(Map::new()))
            }

            /// Wraps an arbitrary JSON value with a fresh handle.
            pub fn from_value(body: Value) -> Self {
                Self {
                    id: Uuid::new_v4(),
                    body,
                }
            }

            /// Stable handle used for identity-based lookup.
            pub fn id(&self) -> $id {
                self.id
            }

            pub fn body(&self) -> &Value {
                &self.body
            }

            pub fn body_mut(&mut self) -> &mut Value {
                &mut self.body
            }

            pub fn into_body(self) -> Value {
                self.body
            }

            /// Deep copy of the body under a fresh handle.
            pub fn duplicate(&self) -> Self {
                Self::from_value(self.body.clone())
            }

            /// Returns a top-level string field, if the body is an object and
            /// the field holds a string.
            pub fn str_field(&self, key: &str) -> Option<&str> {
                self.body.get(key).and_then(Value::as_str)
            }

            pub fn label(&self) -> Option<&str> {
                self.str_field("label")
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.body == other.body
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                self.body.serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                Value::deserialize(deserializer).map(Self::from_value)
            }
        }
    };
}

opaque_record!(
    /// Phylogenetic clade definition with one or more specifiers.
    ///
    /// The body is ontology-defined; the store only reads its specifier
    /// arrays.
    Phyloref,
    PhylorefId
);

opaque_record!(
    /// Phylogeny record. Synthesized phylogenies carry `label`,
    /// `description` and `newick`; loaded ones are free-form.
    Phylogeny,
    PhylogenyId
);

impl Phyloref {
    /// Specifiers in declaration order: internal ones first, then external.
    ///
    /// Missing or non-array specifier fields contribute nothing.
    pub fn specifiers(&self) -> Vec<&Value> {
        [INTERNAL_SPECIFIERS_KEY, EXTERNAL_SPECIFIERS_KEY]
            .iter()
            .filter_map(|key| self.body.get(*key).and_then(Value::as_array))
            .flatten()
            .collect()
    }
}

impl Phylogeny {
    /// Builds a phylogeny from its three descriptive fields.
    pub fn with_newick(
        label: impl Into<String>,
        description: impl Into<String>,
        newick: impl Into<String>,
    ) -> Self {
        let mut body = Map::new();
        body.insert("label".to_string(), Value::String(label.into()));
        body.insert("description".to_string(), Value::String(description.into()));
        body.insert("newick".to_string(), Value::String(newick.into()));
        Self::from_value(Value::Object(body))
    }

    pub fn newick(&self) -> Option<&str> {
        self.str_field("newick")
    }
}

/// One Phyx file held in memory.
///
/// Unknown top-level fields are kept aside and written back verbatim. They
/// never shadow a declared field, so exported text always reloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub phylorefs: Vec<Phyloref>,
    #[serde(default)]
    pub phylogenies: Vec<Phylogeny>,
    /// Absent means "use the default code"; the default is never persisted.
    #[serde(
        rename = "defaultNomenclaturalCodeURI",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_nomen_code_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curator: Option<String>,
    #[serde(
        rename = "curatorEmail",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub curator_email: Option<String>,
    #[serde(
        rename = "curatorORCID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub curator_orcid: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Document {
    /// Creates an empty document with no phylorefs or phylogenies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a document from Phyx JSON text.
    ///
    /// Only the top-level container shape is interpreted; record bodies are
    /// accepted as-is.
    ///
    /// # Errors
    /// - `InvalidJson` when the text is not JSON or the collections are not
    ///   arrays.
    pub fn from_json_str(text: &str) -> StoreResult<Self> {
        serde_json::from_str(text).map_err(Into::into)
    }

    /// Serializes to indented JSON.
    ///
    /// Output is deterministic: declared fields come first in declaration
    /// order, object keys everywhere else are sorted.
    pub fn to_json_text(&self, indent: usize) -> StoreResult<String> {
        let indent = " ".repeat(indent);
        let mut out = Vec::new();
        let formatter = PrettyFormatter::with_indent(indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(out).map_err(|err| serde_json::Error::custom(err).into())
    }

    /// Unknown top-level fields, sorted by key.
    pub fn extra_fields(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub fn extra_field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Stores an unknown top-level field and returns the previous value.
    ///
    /// # Errors
    /// - `InvalidArgument` when `key` names a declared field; those are set
    ///   through the typed fields instead.
    pub fn set_extra_field(
        &mut self,
        key: impl Into<String>,
        value: Value,
    ) -> StoreResult<Option<Value>> {
        let key = key.into();
        if RESERVED_DOCUMENT_KEYS.contains(&key.as_str()) {
            return Err(StoreError::InvalidArgument {
                field: "key",
                reason: format!("`{key}` is a declared document field"),
            });
        }
        Ok(self.extra.insert(key, value))
    }

    pub fn remove_extra_field(&mut self, key: &str) -> Option<Value> {
        self.extra.remove(key)
    }

    pub fn phyloref_index(&self, id: PhylorefId) -> Option<usize> {
        self.phylorefs.iter().position(|phyloref| phyloref.id() == id)
    }

    pub fn phylogeny_index(&self, id: PhylogenyId) -> Option<usize> {
        self.phylogenies
            .iter()
            .position(|phylogeny| phylogeny.id() == id)
    }

    pub fn phyloref(&self, id: PhylorefId) -> Option<&Phyloref> {
        self.phyloref_index(id).map(|index| &self.phylorefs[index])
    }

    pub fn phylogeny(&self, id: PhylogenyId) -> Option<&Phylogeny> {
        self.phylogeny_index(id).map(|index| &self.phylogenies[index])
    }
}

#[cfg(test)]
mod tests {
    use super::{Document, Phyloref, Phylogeny, RESERVED_DOCUMENT_KEYS};
    use crate::service::phyx_store::StoreError;
    use serde_json::json;

    #[test]
    fn specifiers_list_internal_before_external() {
        let phyloref = Phyloref::from_value(json!({
            "externalSpecifiers": [{"label": "C"}],
            "internalSpecifiers": [{"label": "A"}, {"label": "B"}]
        }));
        let labels: Vec<_> = phyloref
            .specifiers()
            .into_iter()
            .map(|spec| spec["label"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
    }

    #[test]
    fn specifiers_ignore_non_array_fields() {
        let phyloref = Phyloref::from_value(json!({"internalSpecifiers": "oops"}));
        assert!(phyloref.specifiers().is_empty());
        assert!(Phyloref::from_value(json!(42)).specifiers().is_empty());
    }

    #[test]
    fn equality_ignores_handles() {
        let first = Phylogeny::with_newick("a", "b", "(x)");
        let second = Phylogeny::with_newick("a", "b", "(x)");
        assert_ne!(first.id(), second.id());
        assert_eq!(first, second);
    }

    #[test]
    fn duplicate_gets_fresh_handle() {
        let original = Phyloref::from_value(json!({"label": "clade"}));
        let copy = original.duplicate();
        assert_ne!(original.id(), copy.id());
        assert_eq!(copy.label(), Some("clade"));
    }

    #[test]
    fn json_text_uses_requested_indent() {
        let text = Document::new().to_json_text(2).unwrap();
        assert_eq!(text, "{\n  \"phylorefs\": [],\n  \"phylogenies\": []\n}");
    }

    #[test]
    fn declared_keys_cannot_be_stored_as_extra_fields() {
        let mut document = Document::new();
        for key in RESERVED_DOCUMENT_KEYS {
            let err = document
                .set_extra_field(key, json!([{"x": 1}]))
                .expect_err("declared key must be refused");
            assert!(matches!(err, StoreError::InvalidArgument { field: "key", .. }));
        }
        assert!(document.extra_fields().is_empty());

        let text = document.to_json_text(4).unwrap();
        assert_eq!(text.matches("\"phylorefs\"").count(), 1);
        assert_eq!(Document::from_json_str(&text).unwrap(), document);
    }

    #[test]
    fn extra_fields_round_trip_through_json_text() {
        let mut document = Document::new();
        let previous = document
            .set_extra_field("@context", json!("http://example.org/context.json"))
            .unwrap();
        assert_eq!(previous, None);

        let reloaded = Document::from_json_str(&document.to_json_text(4).unwrap()).unwrap();
        assert_eq!(
            reloaded.extra_field("@context"),
            Some(&json!("http://example.org/context.json"))
        );
        assert_eq!(reloaded, document);
    }
}
