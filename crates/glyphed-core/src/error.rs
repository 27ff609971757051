use std::fmt;

use thiserror::Error;

use crate::color::PaletteError;
use crate::document::DocumentError;
use crate::driver::DriverError;
use crate::surface::SurfaceError;

/// Message codes for unrecoverable errors. The process exit status is the
/// code plus one, so `0` is never used for a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    OutOfMemory = 0,
    Display = 1,
    Interrupted = 2,
    Io = 3,
}

impl ErrorCode {
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::OutOfMemory => "memory allocation error",
            ErrorCode::Display => "unable to open display",
            ErrorCode::Interrupted => "interrupted",
            ErrorCode::Io => "i/o error",
        }
    }
}

/// An error the editor cannot continue after: reported as
/// `"<program>: <subsystem>: <message>"` and the process exits.
#[derive(Debug, Error)]
pub struct FatalError {
    pub subsystem: &'static str,
    pub code: ErrorCode,
    pub detail: Option<String>,
}

impl FatalError {
    pub fn new(subsystem: &'static str, code: ErrorCode) -> Self {
        Self {
            subsystem,
            code,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn exit_code(&self) -> i32 {
        self.code as i32 + 1
    }

    /// The line written to the diagnostic stream.
    pub fn report(&self, program: &str) -> String {
        format!("{program}: {self}")
    }
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subsystem, self.code.message())?;
        if let Some(d) = &self.detail {
            write!(f, " ({d})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Palette(#[from] PaletteError),
    #[error(transparent)]
    Fatal(#[from] FatalError),
}

impl Error {
    /// Classifies an error for process exit: driver and allocation failures
    /// are fatal, everything else is surfaced to the user.
    pub fn into_fatal(self, subsystem: &'static str) -> FatalError {
        match self {
            Error::Fatal(f) => f,
            Error::Surface(e) => {
                FatalError::new(subsystem, ErrorCode::OutOfMemory).with_detail(e.to_string())
            }
            Error::Driver(DriverError::Interrupted) => {
                FatalError::new(subsystem, ErrorCode::Interrupted)
            }
            Error::Driver(e) => FatalError::new(subsystem, ErrorCode::Display).with_detail(e.to_string()),
            other => FatalError::new(subsystem, ErrorCode::Io).with_detail(other.to_string()),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_report_format_and_exit_code() {
        let e = FatalError::new("openwin", ErrorCode::OutOfMemory);
        assert_eq!(e.report("glyphed"), "glyphed: openwin: memory allocation error");
        assert_eq!(e.exit_code(), 1);
        let e = FatalError::new("x11", ErrorCode::Display);
        assert_eq!(e.exit_code(), 2);
    }

    #[test]
    fn surface_errors_are_out_of_memory() {
        let e: Error = SurfaceError {
            width: 1,
            height: 1,
        }
        .into();
        assert_eq!(e.into_fatal("resize").code, ErrorCode::OutOfMemory);
    }
}
