//! Type definitions for the roster tool
//!
//! Capability values with their cell codec, and the in-memory roster model.

pub mod capability;
mod roster;

pub use capability::{Capability, RawCell};
pub use roster::*;
