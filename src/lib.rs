//! Hexweave — procedural content for tabletop sessions.
//!
//! Synthesizes reproducible per-hex weather from climate templates and
//! generates CR-balanced random encounters, with both features ranked
//! against a shared narrative context.

pub mod core;
pub mod schema;
