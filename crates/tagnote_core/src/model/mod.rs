//! Domain model for notes, tags and list projections.
//!
//! # Responsibility
//! - Define the stored shapes persisted by the note and tag stores.
//! - Define the read-time projection used by list views.
//!
//! # Invariants
//! - Notes reference tags by id only; labels are never copied into notes.
//! - Serialized field names stay compatible with the browser JSON format.

pub mod note;
pub mod tag;
