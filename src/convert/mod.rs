//! Conversion between the roster store and the flat CSV table.

pub mod export;
pub mod import;

pub use export::export_table;
pub use import::{import_table, ImportOutcome, MergePolicy};
