//! # glyphed core
//!
//! The data model behind the editor shell. Nothing in here draws or talks to
//! a display; it is shared by the dispatcher (`glyphed-ui`) and the platform
//! drivers (`glyphed-platform`).
//!
//! - [`WindowRegistry`] keeps the open [`Window`]s in a dense slot table.
//!   Slot 0 is always the main window, every other slot edits one code point.
//! - [`Tool`] is the modal view of a window; [`next_field`]/[`prev_field`]
//!   walk its focusable fields.
//! - [`InputEditor`] edits the one focused text field, by code point:
//!
//! ```rust
//! use glyphed_core::*;
//!
//! let at = FieldRef { window: 0, field: 4 };
//! let mut ed = InputEditor::new("ab", 4, CommitAction::None, at);
//! assert!(ed.insert("cd"));
//! assert!(!ed.insert("e"));
//! assert_eq!(ed.text(), "abcd");
//! ```
//!
//! - [`Driver`] is what a windowing backend implements. [`HeadlessDriver`]
//!   replays a script of [`Event`]s and records every call, which is how the
//!   dispatcher is tested.
//! - [`FontDocument`], [`DocumentStore`] and [`UnicodeNames`] are the
//!   collaborators the editor edits and consults.

pub mod color;
pub mod document;
pub mod driver;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod input;
pub mod registry;
pub mod surface;
pub mod tests;
pub mod tool;
pub mod window;

pub use color::*;
pub use document::*;
pub use driver::*;
pub use editor::*;
pub use error::{Error, ErrorCode, FatalError};
pub use geometry::*;
pub use input::*;
pub use registry::*;
pub use surface::*;
pub use tool::*;
pub use window::*;
