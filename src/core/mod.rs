//! core
//!
//! Core domain types and documents for gitfleet.
//!
//! # Modules
//!
//! - [`types`] - Topology types: Mode, RemoteMap, ObservedProject, etc.
//! - [`manifest`] - Manifest document load/save (JSON)
//!
//! # Design Principles
//!
//! - Map types fix the lexicographic iteration order once, in the types
//! - Per-project query failure is a value, not an exception
//! - URLs are opaque strings compared byte-exact

pub mod manifest;
pub mod types;
