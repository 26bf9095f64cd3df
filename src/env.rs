use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

use crate::command::ExitCode;

/// Session state of one running shell.
///
/// The working directory lives here rather than being read from the process,
/// so independent sessions can coexist (tests create several).
#[derive(Debug, Clone)]
pub struct Environment {
    /// Variables handed to every child process.
    pub vars: HashMap<String, String>,
    /// Directory builtins report and children start in.
    pub current_dir: PathBuf,
    /// Set by `exit`; the loop stops before reading another line.
    pub should_exit: bool,
    /// Status of the most recent command, builtin or external.
    pub last_status: ExitCode,
}

impl Environment {
    /// Capture the current process state into a new `Environment`.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_dir(stdenv::vars().collect(), current_dir)
    }

    pub fn with_dir(vars: HashMap<String, String>, current_dir: PathBuf) -> Self {
        Self {
            vars,
            current_dir,
            should_exit: false,
            last_status: 0,
        }
    }

    /// Get the value of a variable, falling back to the process environment.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
