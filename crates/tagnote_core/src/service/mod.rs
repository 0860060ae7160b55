//! Core use-case services.
//!
//! # Responsibility
//! - Compose the note and tag repositories into use-case level APIs.
//! - Enforce cross-collection invariants (tag references, cascading deletes).

pub mod notebook;
