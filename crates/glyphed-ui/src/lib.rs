//! Event dispatcher, tool handlers and views of the glyph editor.
//!
//! [`Context`] is the whole application state. [`run`] pulls events from the
//! driver and [`dispatch`]es each one to the window it belongs to; from
//! there it goes to the [`ToolHandler`] registered for the window's current
//! tool. Handlers lay out their fields, draw through a [`Painter`] and edit
//! the document in the context.

pub mod context;
pub mod dispatch;
pub mod handler;
pub mod paint;
pub mod progress;
pub mod tests;
pub mod tools;
pub mod view;

pub use context::{Context, Resources, Selection};
pub use dispatch::{dispatch, run};
pub use handler::{HandlerTable, ToolHandler};
pub use paint::{Painter, UiFont};
pub use tools::builtin;
