use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Conditions the shell reports on standard error before carrying on.
///
/// None of these end the session; the loop prints the message and reads the
/// next line.
#[derive(Debug, Error)]
pub enum ShellError {
    /// A builtin was invoked without a token it requires.
    #[error("{command}: missing {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    /// A directory change or query was refused by the OS.
    #[error("{op}: {}: {source}", path.display())]
    OsOperationFailed {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Nothing on the search path matched.
    #[error("{name}: command not found")]
    CommandNotFound { name: String },

    /// A matching file exists but has no execute permission.
    #[error("{}: permission denied", path.display())]
    NotExecutable { path: PathBuf },

    /// The child process could not be created.
    #[error("{}: cannot create process: {source}", path.display())]
    LaunchError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The child was created but the program image could not be loaded.
    #[error("{}: cannot execute: {source}", path.display())]
    ExecutionReplacementFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ShellError {
    /// Exit status a shell conventionally reports for this condition.
    pub fn status(&self) -> i32 {
        match self {
            ShellError::CommandNotFound { .. } => 127,
            ShellError::NotExecutable { .. } | ShellError::ExecutionReplacementFailed { .. } => 126,
            ShellError::OsOperationFailed { source, .. } => source.raw_os_error().unwrap_or(1),
            ShellError::MissingArgument { .. } | ShellError::LaunchError { .. } => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_subject() {
        let err = ShellError::CommandNotFound {
            name: "nonexistentcmd123".into(),
        };
        assert_eq!(err.to_string(), "nonexistentcmd123: command not found");
        assert_eq!(err.status(), 127);

        let err = ShellError::MissingArgument {
            command: "cd",
            what: "working directory",
        };
        assert_eq!(err.to_string(), "cd: missing working directory");
    }

    #[test]
    fn os_failure_carries_os_code() {
        let err = ShellError::OsOperationFailed {
            op: "cd",
            path: PathBuf::from("/nope"),
            source: io::Error::from_raw_os_error(2),
        };
        assert_eq!(err.status(), 2);
        assert!(err.to_string().starts_with("cd: /nope: "));
    }
}
