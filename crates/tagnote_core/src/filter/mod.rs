//! Derived, read-only views over notes and tags.
//!
//! # Responsibility
//! - Filter notes by title substring and tag intersection.
//! - Keep a memoized list view in step with store changes.
//!
//! # Invariants
//! - Filtering never mutates notes or tags.
//! - Output is a pure function of (notes, tags, query); input order is kept.

pub mod list_view;
pub mod note_filter;
