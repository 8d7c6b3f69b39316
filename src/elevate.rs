//! Elevated launches of `reg.exe` and `regsvr32.exe` via the shell's `runas`
//! verb. Each launch raises one UAC prompt, runs hidden, and is waited on to
//! completion; the tool's exit code is the source of truth for success.

use std::ffi::OsStr;
use std::iter::once;
use std::mem;
use std::os::windows::ffi::OsStrExt;

use windows::core::PCWSTR;
use windows::Win32::Foundation::{CloseHandle, ERROR_CANCELLED, WAIT_OBJECT_0};
use windows::Win32::System::Threading::{GetExitCodeProcess, WaitForSingleObject, INFINITE};
use windows::Win32::UI::Shell::{ShellExecuteExW, SEE_MASK_NOCLOSEPROCESS, SHELLEXECUTEINFOW};
use windows::Win32::UI::WindowsAndMessaging::SW_HIDE;

use crate::mutator::{ElevatedCommand, Elevator};
use crate::Error;

pub struct ShellElevator;

impl Elevator for ShellElevator {
    fn run(&self, command: &ElevatedCommand) -> Result<(), Error> {
        let tool = command.tool();
        let arguments = command.arguments();
        log::info!("elevating: {} {}", tool, arguments);
        let code = run_elevated(tool, &arguments)?;
        if code != 0 {
            return Err(Error::ToolFailed { tool, code });
        }
        Ok(())
    }
}

/// Spawns `tool` elevated and hidden, blocks until it exits, and returns its
/// exit code. A declined UAC prompt comes back as `ERROR_CANCELLED` from
/// `ShellExecuteExW` and is surfaced as its own error.
fn run_elevated(tool: &'static str, arguments: &str) -> Result<u32, Error> {
    let verb = to_wide("runas");
    let file = to_wide(tool);
    let parameters = to_wide(arguments);

    let mut info = SHELLEXECUTEINFOW {
        cbSize: mem::size_of::<SHELLEXECUTEINFOW>() as u32,
        fMask: SEE_MASK_NOCLOSEPROCESS,
        lpVerb: PCWSTR(verb.as_ptr()),
        lpFile: PCWSTR(file.as_ptr()),
        lpParameters: PCWSTR(parameters.as_ptr()),
        nShow: SW_HIDE.0,
        ..Default::default()
    };

    unsafe { ShellExecuteExW(&mut info) }.map_err(|err| {
        if err.code() == ERROR_CANCELLED.to_hresult() {
            Error::ElevationDeclined
        } else {
            Error::Launch {
                tool,
                message: err.message(),
            }
        }
    })?;

    let process = info.hProcess;
    if process.is_invalid() {
        return Err(Error::Launch {
            tool,
            message: "no process handle returned".to_string(),
        });
    }

    unsafe {
        let wait = WaitForSingleObject(process, INFINITE);
        let mut code = 0u32;
        let result = GetExitCodeProcess(process, &mut code);
        let _ = CloseHandle(process);
        if wait != WAIT_OBJECT_0 {
            return Err(Error::Launch {
                tool,
                message: format!("wait on {} failed ({:?})", tool, wait),
            });
        }
        result.map_err(|err| Error::Launch {
            tool,
            message: err.message(),
        })?;
        log::debug!("{} exited with code {}", tool, code);
        Ok(code)
    }
}

fn to_wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(once(0)).collect()
}
