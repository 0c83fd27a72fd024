//! Store services.
//!
//! # Responsibility
//! - Own the editable Phyx document and its change-detection baseline.
//! - Notify subscribers about edits and derive Open Tree phylogenies.
//! - Keep UI/bridge layers decoupled from the document representation.

pub mod command;
pub mod events;
pub mod open_tree;
pub mod phyx_store;
