use crate::command::ExitCode;
use crate::env::Environment;
use crate::error::ShellError;
use crate::lexer::TokenList;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};
use tracing::debug;

/// Arguments handed to a launched program.
///
/// Slot 0 holds the resolved path rather than the name that was typed; the
/// remaining slots are the line's arguments in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgVector {
    args: Vec<OsString>,
}

impl ArgVector {
    pub fn new(resolved: &Path, tokens: &TokenList) -> Self {
        let args = std::iter::once(resolved.as_os_str().to_owned())
            .chain(tokens.iter().skip(1).map(OsString::from))
            .collect();
        Self { args }
    }

    /// Slot 0.
    pub fn program(&self) -> &OsStr {
        &self.args[0]
    }

    /// Slots 1 and up.
    pub fn args(&self) -> &[OsString] {
        &self.args[1..]
    }
}

/// Run `resolved` as a child process and block until it terminates.
///
/// The child inherits the shell's standard streams, gets the session's
/// variables and starts in the session's working directory. If the program
/// image cannot be loaded, the child reports why before it exits, so the
/// failure comes back as [`ShellError::ExecutionReplacementFailed`] instead
/// of a bare status.
pub fn launch(resolved: &Path, tokens: &TokenList, env: &Environment) -> Result<ExitCode, ShellError> {
    let argv = ArgVector::new(resolved, tokens);

    let mut command = Command::new(resolved);
    command
        .args(argv.args())
        .envs(env.vars.iter())
        .current_dir(&env.current_dir);
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.arg0(argv.program());
    }

    let mut child = command
        .spawn()
        .map_err(|source| classify_spawn_error(resolved, source))?;
    debug!(pid = child.id(), program = %resolved.display(), "spawned");

    let status = child.wait().map_err(|source| ShellError::LaunchError {
        path: resolved.to_path_buf(),
        source,
    })?;
    let code = match status.code() {
        Some(x) => x,
        None => terminated_by_signal(status),
    };
    debug!(code, "child exited");
    Ok(code)
}

/// Resource exhaustion means no child was created; anything else means the
/// child existed but could not become the requested program.
fn classify_spawn_error(path: &Path, source: io::Error) -> ShellError {
    let path = path.to_path_buf();
    if is_resource_exhaustion(&source) {
        ShellError::LaunchError { path, source }
    } else {
        ShellError::ExecutionReplacementFailed { path, source }
    }
}

#[cfg(unix)]
fn is_resource_exhaustion(err: &io::Error) -> bool {
    use nix::errno::Errno;
    matches!(err.raw_os_error(), Some(code) if code == Errno::EAGAIN as i32 || code == Errno::ENOMEM as i32)
}

#[cfg(not(unix))]
fn is_resource_exhaustion(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::OutOfMemory
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}
