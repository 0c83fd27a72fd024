//! Open-Tree-style synthetic phylogeny derivation.
//!
//! Builds the taxon name list a tree-service collaborator queries with, and a
//! placeholder phylogeny whose newick groups those names in a single clade.
//! Nothing here talks to the network.

use crate::model::document::{Document, Phylogeny};
use crate::taxon::name_resolver::TaxonNameResolver;

/// Label of every phylogeny synthesized from the Open Tree of Life.
pub const OPEN_TREE_PHYLOGENY_LABEL: &str = "Open Tree of Life phylogeny";
/// Description naming the data source of synthesized phylogenies.
pub const OPEN_TREE_PHYLOGENY_DESCRIPTION: &str =
    "Phylogeny generated from the Open Tree of Life synthetic tree for the taxa \
     referenced by the specifiers of this file's phyloreferences.";
/// Newick used when no specifier resolves to a name.
pub const EMPTY_CLADE_NEWICK: &str = "()";

/// Resolved names of every specifier, phyloref by phyloref.
///
/// Unresolvable specifiers are skipped; order and duplicates are kept.
pub fn open_tree_taxon_names<R>(document: &Document, resolver: &R) -> Vec<String>
where
    R: TaxonNameResolver + ?Sized,
{
    document
        .phylorefs
        .iter()
        .flat_map(|phyloref| phyloref.specifiers())
        .filter_map(|specifier| resolver.resolve_name(specifier))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Groups names into one clade: `(A,B,C)`, or `()` when empty.
pub fn open_tree_newick(names: &[String]) -> String {
    if names.is_empty() {
        return EMPTY_CLADE_NEWICK.to_string();
    }
    format!("({})", names.join(","))
}

/// Synthesized phylogeny for the document's referenced taxa.
pub fn open_tree_phylogeny<R>(document: &Document, resolver: &R) -> Phylogeny
where
    R: TaxonNameResolver + ?Sized,
{
    let names = open_tree_taxon_names(document, resolver);
    Phylogeny::with_newick(
        OPEN_TREE_PHYLOGENY_LABEL,
        OPEN_TREE_PHYLOGENY_DESCRIPTION,
        open_tree_newick(&names),
    )
}

#[cfg(test)]
mod tests {
    use super::{open_tree_newick, EMPTY_CLADE_NEWICK};

    #[test]
    fn empty_name_list_yields_empty_clade() {
        assert_eq!(open_tree_newick(&[]), EMPTY_CLADE_NEWICK);
    }

    #[test]
    fn single_name_is_still_grouped() {
        assert_eq!(open_tree_newick(&["Aves".to_string()]), "(Aves)");
    }
}
