//! Platform drivers for glyphed (desktop via winit + softbuffer).
//!
//! The headless driver used by tests and script replay lives in
//! `glyphed_core::driver`; this crate only adds backends that need a display.

#[cfg(feature = "desktop")]
mod desktop;

#[cfg(feature = "desktop")]
pub use desktop::{DesktopDriver, Interrupter};
