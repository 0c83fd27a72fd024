//! Taxon name handling for phyloref specifiers.
//!
//! # Responsibility
//! - Turn taxon-concept specifiers into complete taxon name strings.

pub mod name_resolver;
