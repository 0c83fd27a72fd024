//! Phyx document model.
//!
//! # Responsibility
//! - Define the document, phyloref and phylogeny shapes the store edits.
//! - Name the nomenclatural codes a document can declare.
//!
//! # Invariants
//! - Every phyloref/phylogeny carries a stable handle for identity lookups.
//! - Record bodies stay opaque JSON.

pub mod document;
pub mod nomen_code;
