//! Core document model for Phyx curation.
//! This crate owns the editable document and its change-detection rules.

pub mod logging;
pub mod model;
pub mod service;
pub mod taxon;

pub use logging::{default_log_level, init_logging, logging_status, LogSettings};
pub use model::document::{Document, Phylogeny, PhylogenyId, Phyloref, PhylorefId};
pub use model::nomen_code::{NomenclaturalCode, DEFAULT_NOMEN_CODE_URI};
pub use service::command::StoreCommand;
pub use service::events::{StoreEvent, StoreListener, SubscriptionId};
pub use service::open_tree::{
    open_tree_newick, open_tree_phylogeny, open_tree_taxon_names, EMPTY_CLADE_NEWICK,
    OPEN_TREE_PHYLOGENY_DESCRIPTION, OPEN_TREE_PHYLOGENY_LABEL,
};
pub use service::phyx_store::{
    CuratorUpdate, PhyxStore, RecordKind, StoreError, StoreResult, StoreSettings,
};
pub use taxon::name_resolver::{parse_name_complete, SpecifierNameResolver, TaxonNameResolver};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
