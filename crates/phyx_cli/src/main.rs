//! CLI smoke entry point.
//!
//! # Responsibility
//! - Load one Phyx file into a `PhyxStore` and print derived state.
//! - Keep output deterministic for quick local sanity checks.

use phyx_core::{core_version, Document, PhyxStore};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let Some(path) = std::env::args().nth(1) else {
        println!("phyx_core version={}", core_version());
        println!("usage: phyx_cli <file.json>");
        return ExitCode::SUCCESS;
    };

    match run(&path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("phyx_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str) -> Result<(), Box<dyn Error>> {
    let text = std::fs::read_to_string(path)?;
    let document = Document::from_json_str(&text)?;

    let mut store = PhyxStore::new();
    store.set_current_document(document);
    store.set_loaded_document(None);

    let names = store.open_tree_taxon_names();
    let derived = store.create_phylogeny_from_open_tree();
    let newick = store
        .phylogeny(derived)
        .and_then(|phylogeny| phylogeny.newick())
        .unwrap_or_default();

    let current = store.current_document();
    println!("phylorefs={}", current.phylorefs.len());
    println!("phylogenies={}", current.phylogenies.len());
    println!("nomen_code={}", store.default_nomen_code_uri());
    println!("open_tree_names={}", names.len());
    println!("open_tree_newick={newick}");
    println!("unsaved_changes={}", store.has_unsaved_changes());
    Ok(())
}
