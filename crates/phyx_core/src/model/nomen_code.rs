//! Nomenclatural codes identified by OBO NOMEN URIs.

use serde::{Deserialize, Serialize};

/// Code used when a document does not declare one.
pub const DEFAULT_NOMEN_CODE_URI: &str = NOMEN_CODE_UNKNOWN_URI;

pub const NOMEN_CODE_UNKNOWN_URI: &str = "http://purl.obolibrary.org/obo/NOMEN_0000036";
pub const NOMEN_CODE_ICZN_URI: &str = "http://purl.obolibrary.org/obo/NOMEN_0000107";
pub const NOMEN_CODE_ICN_URI: &str = "http://purl.obolibrary.org/obo/NOMEN_0000109";
pub const NOMEN_CODE_ICNP_URI: &str = "http://purl.obolibrary.org/obo/NOMEN_0000110";
pub const NOMEN_CODE_ICTV_URI: &str = "http://purl.obolibrary.org/obo/NOMEN_0000111";

/// Naming-rules standard governing how a taxon name is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NomenclaturalCode {
    /// Code not known or not specified.
    #[default]
    Unknown,
    /// International Code of Zoological Nomenclature.
    Iczn,
    /// International Code of Nomenclature for algae, fungi, and plants.
    Icn,
    /// International Code of Nomenclature of Prokaryotes.
    Icnp,
    /// International Code of Virus Classification and Nomenclature.
    Ictv,
}

impl NomenclaturalCode {
    pub const ALL: [NomenclaturalCode; 5] = [
        Self::Unknown,
        Self::Iczn,
        Self::Icn,
        Self::Icnp,
        Self::Ictv,
    ];

    pub fn uri(self) -> &'static str {
        match self {
            Self::Unknown => NOMEN_CODE_UNKNOWN_URI,
            Self::Iczn => NOMEN_CODE_ICZN_URI,
            Self::Icn => NOMEN_CODE_ICN_URI,
            Self::Icnp => NOMEN_CODE_ICNP_URI,
            Self::Ictv => NOMEN_CODE_ICTV_URI,
        }
    }

    /// Short label for pickers and validation messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Code not known",
            Self::Iczn => "Animals (ICZN)",
            Self::Icn => "Plants, fungi and algae (ICN)",
            Self::Icnp => "Prokaryotes (ICNP)",
            Self::Ictv => "Viruses (ICTV)",
        }
    }

    /// Matches a URI against the known codes, ignoring surrounding
    /// whitespace. Unrecognized URIs return `None`.
    pub fn from_uri(uri: &str) -> Option<Self> {
        let uri = uri.trim();
        Self::ALL.into_iter().find(|code| code.uri() == uri)
    }
}
