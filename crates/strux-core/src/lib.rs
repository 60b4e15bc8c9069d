//! Shared position and location primitives used across the `strux` family of
//! crates.
//!
//! [`Position`] is a 1-based line/column coordinate within a source file.
//! [`Location`] pairs a start and end [`Position`] with the two flags the
//! front end needs to track provenance through synthesis and copying:
//! `is_synthetic` (fabricated rather than parsed) and
//! `is_disjoint_from_parent` (exempt from the child-contained-in-parent
//! invariant).

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::broken_intra_doc_links)]

mod located;
mod location;
mod position;

pub use located::Located;
pub use location::Location;
pub use position::Position;
