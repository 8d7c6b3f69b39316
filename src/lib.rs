//! Control which thumbnail handlers are active for the file types the
//! provider suite covers (3D models, images, plain text, documents).
//!
//! Reads go straight to the registry; writes are delegated to elevated
//! `reg.exe` / `regsvr32.exe` invocations so the tool itself can stay
//! unelevated. The resolver and mutator work against small traits
//! (`RegistryView`, `Elevator`) and are exercised off-Windows through
//! in-memory implementations.

use std::path::PathBuf;

use thiserror::Error as ThisError;

pub mod cache;
pub mod catalog;
pub mod config;
#[cfg(windows)]
pub mod elevate;
pub mod mutator;
pub mod registry;
pub mod resolver;
pub mod shell;

pub use catalog::{FormatAssociation, FormatCategory};
pub use config::Config;
pub use mutator::{BulkReport, Disposition, ElevatedCommand, Elevator, Mutator};
pub use registry::{AssocScope, HandlerId, RegistryView};
pub use resolver::ActiveVia;

#[derive(Debug, ThisError)]
pub enum Error {
    /// The elevated tool could not be started at all.
    #[error("failed to launch {tool}: {message}")]
    Launch { tool: &'static str, message: String },

    /// The UAC prompt was dismissed.
    #[error("elevation request was declined")]
    ElevationDeclined,

    /// The tool ran to completion and reported failure.
    #[error("{tool} exited with code {code}")]
    ToolFailed { tool: &'static str, code: u32 },

    /// Checked before anything is spawned; an elevated `regsvr32` error
    /// dialog is no way to learn the path was wrong.
    #[error("handler DLL not found at {}", .path.display())]
    DllNotFound { path: PathBuf },

    #[error("{}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    /// Registry and shell mutations only exist on Windows builds.
    #[error("this operation is only available on Windows")]
    Unsupported,
}
