//! Registry mutations, expressed as elevated `reg.exe` / `regsvr32.exe`
//! invocations.
//!
//! Writes never go through the registry API directly: the process is assumed
//! to run unelevated, so every change is delegated to a stock Windows tool
//! launched with the `runas` verb. `ElevatedCommand` captures the exact
//! command line; `Elevator` is the seam that actually runs it.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::catalog::FormatAssociation;
use crate::registry::{extension_key, AssocScope, HandlerId, RegistryView};
use crate::{resolver, shell, Error};

/// One elevated invocation of a stock Windows tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElevatedCommand {
    /// `reg add "<key>" /d "<value>" /f`: sets the key's default value,
    /// creating intermediate keys as needed.
    RegAdd { key: String, value: String },
    /// `reg delete "<key>" /f`: removes the key and its subtree.
    RegDelete { key: String },
    /// `regsvr32 [/u] /s "<dll>"`: COM (un)registration of the handler DLL.
    RegSvr { dll: PathBuf, unregister: bool },
}

impl ElevatedCommand {
    pub fn tool(&self) -> &'static str {
        match self {
            ElevatedCommand::RegAdd { .. } | ElevatedCommand::RegDelete { .. } => "reg",
            ElevatedCommand::RegSvr { .. } => "regsvr32",
        }
    }

    pub fn arguments(&self) -> String {
        match self {
            ElevatedCommand::RegAdd { key, value } => {
                format!(r#"add "{}" /d "{}" /f"#, key, value)
            }
            ElevatedCommand::RegDelete { key } => format!(r#"delete "{}" /f"#, key),
            ElevatedCommand::RegSvr { dll, unregister } => {
                let flags = if *unregister { "/u /s" } else { "/s" };
                format!(r#"{} "{}""#, flags, dll.display())
            }
        }
    }
}

impl fmt::Display for ElevatedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tool(), self.arguments())
    }
}

/// Runs one elevated command to completion and maps the outcome onto
/// `Error`. Implementations block until the spawned tool exits.
pub trait Elevator {
    fn run(&self, command: &ElevatedCommand) -> Result<(), Error>;
}

/// What a guarded removal actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Removed,
    /// Nothing matched our handler, so nothing was touched.
    Skipped,
}

/// Outcome summary of a bulk enable/disable pass.
#[derive(Debug, Default)]
pub struct BulkReport {
    pub changed: usize,
    pub skipped: usize,
    /// `(extension, reason)` for every item that failed. A failure never
    /// stops the pass; remaining items are still attempted.
    pub failures: Vec<(String, String)>,
}

impl BulkReport {
    pub fn ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Association mutation surface. Holds the read view (to verify and to guard
/// deletions), the elevation seam, and the tier new associations are written
/// to.
pub struct Mutator<'a> {
    view: &'a dyn RegistryView,
    elevator: &'a dyn Elevator,
    scope: AssocScope,
}

impl<'a> Mutator<'a> {
    pub fn new(view: &'a dyn RegistryView, elevator: &'a dyn Elevator, scope: AssocScope) -> Self {
        Self {
            view,
            elevator,
            scope,
        }
    }

    /// Writes `handler` as the provider for `extension` in this mutator's
    /// scope, then broadcasts the association change and re-resolves. The
    /// returned flag is the post-write resolver verdict, not an assumption.
    pub fn enable(&self, extension: &str, handler: &HandlerId) -> Result<bool, Error> {
        let key = extension_key(self.scope, extension);
        log::info!("enable {} -> {} ({} scope)", extension, handler, self.scope);
        self.elevator.run(&ElevatedCommand::RegAdd {
            key,
            value: handler.as_str().to_owned(),
        })?;
        shell::notify_association_changed();
        Ok(resolver::is_active(self.view, extension, handler))
    }

    /// Removes every association key that currently names `handler`. Keys
    /// holding some other provider are left untouched, so disabling our
    /// handler can never break another application's. Tiers are attempted
    /// independently; the first failure is reported after the rest have run.
    pub fn disable(&self, extension: &str, handler: &HandlerId) -> Result<Disposition, Error> {
        let mut removed = false;
        let mut first_error = None;
        for key in resolver::removal_candidates(self.view, extension) {
            let current = match self.view.read_default(&key) {
                Some(value) => value,
                None => continue,
            };
            if !handler.matches(&current) {
                log::debug!("leaving {} alone, held by {}", key, current);
                continue;
            }
            match self.elevator.run(&ElevatedCommand::RegDelete { key: key.clone() }) {
                Ok(()) => {
                    log::info!("removed {}", key);
                    removed = true;
                }
                Err(err) => {
                    log::warn!("could not remove {}: {}", key, err);
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }
        if removed {
            shell::notify_association_changed();
        }
        match first_error {
            Some(err) => Err(err),
            None if removed => Ok(Disposition::Removed),
            None => Ok(Disposition::Skipped),
        }
    }

    /// Enables every item that is not already active. Each item's `active`
    /// flag is recomputed from the registry before and after its own write.
    pub fn enable_all(&self, items: &mut [FormatAssociation]) -> BulkReport {
        let mut report = BulkReport::default();
        for item in items.iter_mut() {
            item.refresh(self.view);
            if item.active {
                report.skipped += 1;
                continue;
            }
            match self.enable(&item.extension, &item.handler) {
                Ok(true) => {
                    item.active = true;
                    report.changed += 1;
                }
                Ok(false) => report.failures.push((
                    item.extension.clone(),
                    "association was written but did not read back as active".to_string(),
                )),
                Err(err) => report.failures.push((item.extension.clone(), err.to_string())),
            }
        }
        report
    }

    /// Disables every item that is currently active. Failures are collected
    /// per item, never aborting the pass.
    pub fn disable_all(&self, items: &mut [FormatAssociation]) -> BulkReport {
        let mut report = BulkReport::default();
        for item in items.iter_mut() {
            item.refresh(self.view);
            if !item.active {
                report.skipped += 1;
                continue;
            }
            let outcome = self.disable(&item.extension, &item.handler);
            item.refresh(self.view);
            match outcome {
                Ok(Disposition::Removed) => report.changed += 1,
                Ok(Disposition::Skipped) => report.skipped += 1,
                Err(err) => report.failures.push((item.extension.clone(), err.to_string())),
            }
        }
        report
    }

    /// Registers the handler DLL with COM. The file must exist before
    /// anything is spawned; `regsvr32` popping its own error dialog from an
    /// elevated process is not a useful failure mode.
    pub fn register_dll(&self, dll: &Path) -> Result<(), Error> {
        self.run_regsvr(dll, false)
    }

    pub fn unregister_dll(&self, dll: &Path) -> Result<(), Error> {
        self.run_regsvr(dll, true)
    }

    fn run_regsvr(&self, dll: &Path, unregister: bool) -> Result<(), Error> {
        if !dll.is_file() {
            return Err(Error::DllNotFound {
                path: dll.to_owned(),
            });
        }
        // No association broadcast here: the DLL's own (un)register entry
        // point is expected to notify the shell.
        self.elevator.run(&ElevatedCommand::RegSvr {
            dll: dll.to_owned(),
            unregister,
        })
    }
}
