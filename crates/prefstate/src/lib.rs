#![doc = include_str!("../README.md")]

mod converge;
mod error;
mod path;
mod types;

pub mod v1 {
    //! Versioned public API for prefstate types and the convergence engine.
    //!
    //! # Documents and values
    //!
    //! - [`Document`] — a tree of typed values rooted at a dictionary
    //! - [`Value`] — the closed tagged union of document values
    //! - [`Kind`] — a value's type tag, for error messages and tool output
    //!   parsing
    //!
    //! # Addressing
    //!
    //! - [`EntryPath`] — where in the document a declaration points
    //!   (`"AppleFirstWeekday:gregorian"`)
    //! - [`Segment`] — one dictionary key or array index
    //!
    //! # Convergence
    //!
    //! - [`converge::converge`] — the engine: compare-and-set with
    //!   auto-vivification, pure in-memory
    //! - [`converge::lookup`] — read-only resolution
    //! - [`converge::delete`] — idempotent removal
    //! - [`Outcome`] — whether anything changed, and the prior value
    //! - [`ConvergeError`] / [`Result`] — the structural error taxonomy
    //!
    //! # Example — converge, then converge again
    //!
    //! ```
    //! use prefstate::v1::{Document, EntryPath, Value};
    //!
    //! let mut doc = Document::new();
    //! let path = EntryPath::parse("AppleFirstWeekday:gregorian").unwrap();
    //!
    //! let first = doc.converge(&path, Value::Int(4)).unwrap();
    //! assert!(first.changed);
    //! assert_eq!(first.prior, None);
    //!
    //! // Identical declaration: guaranteed no-op.
    //! let second = doc.converge(&path, Value::Int(4)).unwrap();
    //! assert!(!second.changed);
    //!
    //! // Same number, different type: the type tag is part of the contract.
    //! let third = doc.converge(&path, Value::Real(4.0)).unwrap();
    //! assert!(third.changed);
    //! ```

    /// The convergence engine as free functions over [`Document`].
    ///
    /// [`Document::converge`](super::Document::converge) and friends delegate
    /// here; use these directly when you hold the document and path apart
    /// from each other.
    ///
    /// [`Document`]: super::Document
    pub mod converge {
        pub use crate::converge::{converge, delete, lookup};
    }
    pub use crate::error::{ConvergeError, Result};
    pub use crate::path::{EntryPath, Segment};
    pub use crate::types::{Document, Kind, Outcome, Value};
}
