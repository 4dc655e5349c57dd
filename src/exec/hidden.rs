// src/exec/hidden.rs

//! Hidden-window starts on Windows.
//!
//! `std::process::Command` offers no way to set `STARTUPINFOW::wShowWindow`,
//! and without it GUI programs still open a visible window. Hidden tasks
//! are therefore started with `CreateProcessW` directly, with the three
//! standard handles passed through `STARTF_USESTDHANDLES`.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fs::{File, OpenOptions};
use std::future::Future;
use std::io::Write;
use std::os::windows::ffi::OsStrExt;
use std::os::windows::io::{AsHandle, AsRawHandle, BorrowedHandle, FromRawHandle, OwnedHandle};
use std::path::Path;
use std::pin::Pin;
use std::ptr;

use anyhow::{Context, Result, bail};
use tracing::debug;
use windows_sys::Win32::Foundation::{
    CloseHandle, HANDLE, HANDLE_FLAG_INHERIT, SetHandleInformation, WAIT_FAILED,
};
use windows_sys::Win32::System::Threading::{
    CREATE_NO_WINDOW, CREATE_UNICODE_ENVIRONMENT, CreateProcessW, GetExitCodeProcess, INFINITE,
    PROCESS_INFORMATION, STARTF_USESHOWWINDOW, STARTF_USESTDHANDLES, STARTUPINFOW,
    WaitForSingleObject,
};
use windows_sys::Win32::UI::WindowsAndMessaging::SW_HIDE;

use super::backend::{ProcessHandle, TaskOutcome};
use super::invocation::{Invocation, OutputSink, StdinSource};

/// Start `invocation` with its window hidden.
pub(crate) fn start(invocation: Invocation) -> Result<Box<dyn ProcessHandle>> {
    let Invocation {
        program,
        args,
        command_line,
        env,
        dir,
        stdin,
        stdout,
        stderr,
        ..
    } = invocation;

    let (stdin, literal_input) = stdin_handle(stdin)?;
    let (stdout, stderr) = output_handles(stdout, stderr)?;
    for handle in [&stdin, &stdout, &stderr] {
        make_inheritable(handle)?;
    }

    let application = to_wide(program.as_os_str());
    let mut command = command_line_wide(&program, &args);
    let environment = env.as_deref().map(environment_block);
    let dir = dir.as_deref().map(|d| to_wide(d.as_os_str()));

    // SAFETY: STARTUPINFOW and PROCESS_INFORMATION are plain C structs for
    // which all-zero is a valid value.
    let mut startup: STARTUPINFOW = unsafe { std::mem::zeroed() };
    startup.cb = std::mem::size_of::<STARTUPINFOW>() as u32;
    startup.dwFlags = STARTF_USESHOWWINDOW | STARTF_USESTDHANDLES;
    startup.wShowWindow = SW_HIDE as u16;
    startup.hStdInput = stdin.as_raw_handle() as HANDLE;
    startup.hStdOutput = stdout.as_raw_handle() as HANDLE;
    startup.hStdError = stderr.as_raw_handle() as HANDLE;
    let mut info: PROCESS_INFORMATION = unsafe { std::mem::zeroed() };

    // SAFETY: every pointer refers to a NUL-terminated buffer owned by this
    // frame, and `command` is mutable as CreateProcessW requires.
    let created = unsafe {
        CreateProcessW(
            application.as_ptr(),
            command.as_mut_ptr(),
            ptr::null(),
            ptr::null(),
            1,
            CREATE_NO_WINDOW | CREATE_UNICODE_ENVIRONMENT,
            environment
                .as_ref()
                .map_or(ptr::null(), |block| block.as_ptr().cast()),
            dir.as_ref().map_or(ptr::null(), |d| d.as_ptr()),
            &startup,
            &mut info,
        )
    };
    if created == 0 {
        return Err(std::io::Error::last_os_error())
            .with_context(|| format!("spawning hidden {}", command_line));
    }

    // SAFETY: CreateProcessW succeeded, so both handles are open and owned
    // by us.
    let process = unsafe {
        CloseHandle(info.hThread);
        OwnedHandle::from_raw_handle(info.hProcess as _)
    };

    if let Some((text, mut pipe)) = literal_input {
        tokio::task::spawn_blocking(move || {
            if let Err(e) = pipe.write_all(text.as_bytes()) {
                debug!(error = %e, "child closed stdin before literal input was written");
            }
        });
    }

    Ok(Box::new(HiddenProcess {
        process,
        command_line,
    }))
}

struct HiddenProcess {
    process: OwnedHandle,
    command_line: String,
}

impl ProcessHandle for HiddenProcess {
    fn wait(&mut self) -> Pin<Box<dyn Future<Output = Result<TaskOutcome>> + Send + '_>> {
        Box::pin(async move {
            let process = self
                .process
                .try_clone()
                .with_context(|| format!("duplicating process handle of {}", self.command_line))?;
            let code = tokio::task::spawn_blocking(move || wait_for_exit(&process))
                .await
                .context("joining process wait")?
                .with_context(|| format!("waiting for {}", self.command_line))?;
            if code == 0 {
                Ok(TaskOutcome::Success)
            } else {
                Ok(TaskOutcome::Failed(code as i32))
            }
        })
    }
}

fn wait_for_exit(process: &OwnedHandle) -> std::io::Result<u32> {
    let raw = process.as_raw_handle() as HANDLE;
    let mut code = 0u32;
    // SAFETY: `raw` stays open for the duration of both calls.
    unsafe {
        if WaitForSingleObject(raw, INFINITE) == WAIT_FAILED {
            return Err(std::io::Error::last_os_error());
        }
        if GetExitCodeProcess(raw, &mut code) == 0 {
            return Err(std::io::Error::last_os_error());
        }
    }
    Ok(code)
}

type LiteralInput = Option<(String, std::io::PipeWriter)>;

fn stdin_handle(source: StdinSource) -> Result<(OwnedHandle, LiteralInput)> {
    match source {
        StdinSource::Null => Ok((null_device(false)?, None)),
        StdinSource::Inherit => Ok((duplicate_std(std::io::stdin().as_handle(), false)?, None)),
        StdinSource::File(file) => Ok((OwnedHandle::from(file), None)),
        StdinSource::Literal(text) => {
            let (reader, writer) = std::io::pipe().context("creating stdin pipe")?;
            Ok((OwnedHandle::from(reader), Some((text, writer))))
        }
    }
}

fn output_handles(stdout: OutputSink, stderr: OutputSink) -> Result<(OwnedHandle, OwnedHandle)> {
    let out = match stdout {
        OutputSink::File(file) => OwnedHandle::from(file),
        OutputSink::Inherit | OutputSink::SameAsStdout => {
            duplicate_std(std::io::stdout().as_handle(), true)?
        }
    };
    let err = match stderr {
        OutputSink::SameAsStdout => out
            .try_clone()
            .context("duplicating stdout handle for stderr")?,
        OutputSink::File(file) => OwnedHandle::from(file),
        OutputSink::Inherit => duplicate_std(std::io::stderr().as_handle(), true)?,
    };
    Ok((out, err))
}

/// Duplicate one of the launcher's standard handles. A launcher without a
/// console has null standard handles; the child gets the null device then.
fn duplicate_std(handle: BorrowedHandle<'_>, write: bool) -> Result<OwnedHandle> {
    if handle.as_raw_handle().is_null() {
        return null_device(write);
    }
    handle
        .try_clone_to_owned()
        .context("duplicating launcher standard handle")
}

fn null_device(write: bool) -> Result<OwnedHandle> {
    let file: File = OpenOptions::new()
        .read(!write)
        .write(write)
        .open("NUL")
        .context("opening NUL")?;
    Ok(OwnedHandle::from(file))
}

fn make_inheritable(handle: &OwnedHandle) -> Result<()> {
    // SAFETY: the handle is open for as long as `handle` lives.
    let ok = unsafe {
        SetHandleInformation(
            handle.as_raw_handle() as HANDLE,
            HANDLE_FLAG_INHERIT,
            HANDLE_FLAG_INHERIT,
        )
    };
    if ok == 0 {
        bail!(
            "marking handle inheritable: {}",
            std::io::Error::last_os_error()
        );
    }
    Ok(())
}

fn to_wide(s: &OsStr) -> Vec<u16> {
    s.encode_wide().chain(Some(0)).collect()
}

/// `"program" args`, NUL-terminated. Arguments are passed untouched.
fn command_line_wide(program: &Path, args: &str) -> Vec<u16> {
    let mut line = OsString::from("\"");
    line.push(program.as_os_str());
    line.push("\"");
    if !args.is_empty() {
        line.push(" ");
        line.push(args);
    }
    to_wide(&line)
}

/// Unicode environment block. Keys compare case-insensitively and a later
/// entry replaces an earlier one with the same key.
fn environment_block(env: &[(OsString, OsString)]) -> Vec<u16> {
    let mut vars: BTreeMap<String, (&OsString, &OsString)> = BTreeMap::new();
    for (key, value) in env {
        if key.is_empty() {
            continue;
        }
        vars.insert(key.to_string_lossy().to_uppercase(), (key, value));
    }

    let mut block = Vec::new();
    for (key, value) in vars.values() {
        block.extend(key.encode_wide());
        block.push(u16::from(b'='));
        block.extend(value.encode_wide());
        block.push(0);
    }
    if block.is_empty() {
        block.push(0);
    }
    block.push(0);
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn decode(wide: &[u16]) -> String {
        String::from_utf16_lossy(wide)
    }

    #[test]
    fn command_line_quotes_program_and_keeps_args() {
        let line = command_line_wide(Path::new(r"C:\Windows\notepad.exe"), r"c:\1.txt");
        assert_eq!(decode(&line), "\"C:\\Windows\\notepad.exe\" c:\\1.txt\0");

        let bare = command_line_wide(Path::new(r"C:\tool.exe"), "");
        assert_eq!(decode(&bare), "\"C:\\tool.exe\"\0");
    }

    #[test]
    fn environment_block_keeps_last_duplicate_key() {
        let env = vec![
            (OsString::from("Path"), OsString::from(r"C:\a")),
            (OsString::from("OS"), OsString::from("Windows")),
            (OsString::from("PATH"), OsString::from(r"C:\b")),
            (OsString::from(""), OsString::from("ignored")),
        ];
        let block = decode(&environment_block(&env));
        assert_eq!(block, "OS=Windows\0PATH=C:\\b\0\0");
    }

    #[test]
    fn empty_environment_block_is_double_nul() {
        assert_eq!(environment_block(&[]), vec![0, 0]);
    }

    #[tokio::test]
    async fn hidden_start_reports_exit_code() {
        let cmd = std::env::var_os("ComSpec")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\Windows\System32\cmd.exe"));
        let invocation = Invocation {
            program: cmd.clone(),
            args: "/c exit 3".to_string(),
            command_line: format!("{} /c exit 3", cmd.display()),
            hide: true,
            env: None,
            dir: None,
            stdin: StdinSource::Null,
            stdout: OutputSink::Inherit,
            stderr: OutputSink::SameAsStdout,
        };
        let mut handle = start(invocation).unwrap();
        assert_eq!(handle.wait().await.unwrap(), TaskOutcome::Failed(3));
    }
}
