use crate::builtin::BuiltinRegistry;
use crate::command::{ExitCode, Invocation};
use crate::config::ShellConfig;
use crate::env::Environment;
use crate::error::ShellError;
use crate::external;
use crate::input::LineSource;
use crate::lexer::{self, TokenList};
use crate::resolve;
use anyhow::Result;
use std::io::{self, Write};
use tracing::{debug, trace};

/// What the loop does after a line has been dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// `exit` was run; stop without reading more input.
    Exit,
}

/// A minimal shell that runs built-in and external commands, one line at a time.
///
/// The interpreter owns the session [`Environment`] and the [`BuiltinRegistry`].
/// Every line is looked up among the builtins first; otherwise the command is
/// resolved on the search path and launched as a child, which is waited for
/// before the line counts as done.
///
/// Example
/// ```
/// use minishell::{Flow, Interpreter};
/// let mut sh = Interpreter::default();
/// let (mut out, mut err) = (Vec::new(), Vec::new());
/// let flow = sh.dispatch_line("?", &mut out, &mut err).unwrap();
/// assert_eq!(flow, Flow::Continue);
/// assert!(String::from_utf8(out).unwrap().starts_with("? - "));
/// ```
pub struct Interpreter {
    env: Environment,
    builtins: BuiltinRegistry,
    search_path: Option<String>,
    line_number: usize,
}

impl Interpreter {
    /// Create an interpreter over an explicit session and builtin table.
    pub fn new(env: Environment, builtins: BuiltinRegistry) -> Self {
        Self {
            env,
            builtins,
            search_path: None,
            line_number: 0,
        }
    }

    /// Create an interpreter for the current process with the default builtins.
    pub fn with_config(config: &ShellConfig) -> Self {
        let mut sh = Self::new(Environment::new(), BuiltinRegistry::default());
        sh.search_path = config.search_path.clone();
        sh
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn builtins(&self) -> &BuiltinRegistry {
        &self.builtins
    }

    /// Use `search_path` instead of the session's `PATH`.
    pub fn set_search_path(&mut self, search_path: impl Into<String>) {
        self.search_path = Some(search_path.into());
    }

    /// The colon-separated directories external commands are looked up in.
    pub fn search_path(&self) -> String {
        self.search_path
            .clone()
            .or_else(|| self.env.get_var("PATH"))
            .unwrap_or_default()
    }

    /// Number of lines read so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Prompt shown before the next line is read.
    pub fn prompt(&self) -> String {
        format!("{}: ", self.line_number)
    }

    /// Split `line` into words and dispatch them.
    pub fn dispatch_line(
        &mut self,
        line: &str,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<Flow> {
        self.dispatch(&lexer::split_into_tokens(line), stdout, stderr)
    }

    /// Run one command line to completion.
    ///
    /// Command failures are reported on `stderr` and recorded in
    /// [`Environment::last_status`]; the returned error is only for failures
    /// writing to `stdout`/`stderr` themselves.
    pub fn dispatch(
        &mut self,
        tokens: &TokenList,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<Flow> {
        let Some(name) = tokens.command() else {
            return Ok(Flow::Continue);
        };

        let status = match self.builtins.lookup(name) {
            Some(index) => {
                debug!(command = name, "builtin");
                self.run_builtin(index, tokens, stdout, stderr)?
            }
            None => {
                trace!(command = name, "not a builtin");
                // Anything we printed must land before the child's output.
                stdout.flush()?;
                match self.run_external(name, tokens) {
                    Ok(code) => code,
                    Err(err) => {
                        debug!(error = %err, "external command failed");
                        writeln!(stderr, "{err}")?;
                        err.status()
                    }
                }
            }
        };

        self.env.last_status = status;
        Ok(if self.env.should_exit {
            Flow::Exit
        } else {
            Flow::Continue
        })
    }

    fn run_builtin(
        &mut self,
        index: usize,
        tokens: &TokenList,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<ExitCode> {
        let Some(entry) = self.builtins.get(index) else {
            return Ok(1);
        };
        let mut io = Invocation {
            stdout,
            stderr,
            env: &mut self.env,
            builtins: &self.builtins,
        };
        entry.handler().invoke(tokens, &mut io)
    }

    fn run_external(&self, name: &str, tokens: &TokenList) -> Result<ExitCode, ShellError> {
        let resolved = resolve::resolve(name, &self.search_path(), &self.env.current_dir)?;
        debug!(command = name, path = %resolved.display(), "resolved");
        external::launch(&resolved, tokens, &self.env)
    }

    /// Read and dispatch lines from `source` until end of input or `exit`,
    /// writing to the process's standard streams.
    pub fn repl(&mut self, source: &mut dyn LineSource) -> Result<()> {
        self.run_loop(source, &mut io::stdout(), &mut io::stderr())
    }

    /// [`Interpreter::repl`] with explicit output streams.
    pub fn run_loop(
        &mut self,
        source: &mut dyn LineSource,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<()> {
        loop {
            let prompt = self.prompt();
            let Some(line) = source.read_line(&prompt)? else {
                debug!(lines = self.line_number, "end of input");
                return Ok(());
            };
            self.line_number += 1;

            if self.dispatch_line(&line, stdout, stderr)? == Flow::Exit {
                debug!("exit requested");
                return Ok(());
            }
        }
    }
}

impl Default for Interpreter {
    /// An interpreter for the current process with the default builtins:
    /// `?`, `exit`, `cd`, `pwd`.
    fn default() -> Self {
        Self::with_config(&ShellConfig::default())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::input::BufferedSource;
    use std::collections::HashMap;
    use std::fs;
    use std::io::Cursor;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn session(dir: &Path, search_path: &str) -> Interpreter {
        let mut sh = Interpreter::new(
            Environment::with_dir(HashMap::new(), dir.to_path_buf()),
            BuiltinRegistry::default(),
        );
        sh.set_search_path(search_path);
        sh
    }

    fn run_script(sh: &mut Interpreter, script: &str) -> (String, String) {
        let mut source = BufferedSource::new(Cursor::new(script.to_string()));
        let (mut out, mut err) = (Vec::new(), Vec::new());
        sh.run_loop(&mut source, &mut out, &mut err).unwrap();
        (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    #[test]
    fn test_empty_line_does_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let mut sh = session(temp.path(), "");
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let flow = sh.dispatch_line("   \n", &mut out, &mut err).unwrap();
        assert_eq!(flow, Flow::Continue);
        assert!(out.is_empty() && err.is_empty());
    }

    #[test]
    fn test_unknown_command_reports_and_continues() {
        let temp = tempfile::tempdir().unwrap();
        let mut sh = session(temp.path(), "/bin:/usr/bin");
        let (out, err) = run_script(&mut sh, "nonexistentcmd123\n?\n");
        assert_eq!(err, "nonexistentcmd123: command not found\n");
        assert!(out.starts_with("? - show this help menu\n"));
        assert_eq!(sh.line_number(), 2);
        assert_eq!(sh.env().last_status, 0);
    }

    #[test]
    fn test_status_of_missing_command_is_recorded() {
        let temp = tempfile::tempdir().unwrap();
        let mut sh = session(temp.path(), "");
        run_script(&mut sh, "nonexistentcmd123\n");
        assert_eq!(sh.env().last_status, 127);
    }

    #[test]
    fn test_exit_stops_reading() {
        let temp = tempfile::tempdir().unwrap();
        let mut sh = session(temp.path(), "");
        let (out, _) = run_script(&mut sh, "exit\npwd\n");
        assert!(out.is_empty());
        assert_eq!(sh.line_number(), 1);
        assert!(sh.env().should_exit);
    }

    #[test]
    fn test_builtins_shadow_search_path() {
        let temp = tempfile::tempdir().unwrap();
        let bin = temp.path().join("bin");
        fs::create_dir(&bin).unwrap();
        let fake = bin.join("pwd");
        fs::write(&fake, b"#!/bin/sh\necho fake\n").unwrap();
        fs::set_permissions(&fake, fs::Permissions::from_mode(0o755)).unwrap();

        let dir = fs::canonicalize(temp.path()).unwrap();
        let mut sh = session(&dir, &bin.display().to_string());
        let (out, _) = run_script(&mut sh, "pwd\n");
        assert_eq!(out, format!("{}\n", dir.display()));
    }

    #[test]
    fn test_external_status_is_recorded() {
        let temp = tempfile::tempdir().unwrap();
        let mut sh = session(temp.path(), "/bin:/usr/bin");
        run_script(&mut sh, "false\n");
        assert_eq!(sh.env().last_status, 1);
        run_script(&mut sh, "true\n");
        assert_eq!(sh.env().last_status, 0);
    }

    #[test]
    fn test_relative_command_follows_cd() {
        let temp = tempfile::tempdir().unwrap();
        let sub = temp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let script = sub.join("mark");
        fs::write(&script, b"#!/bin/sh\ntouch marked\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let mut sh = session(temp.path(), "/bin:/usr/bin");
        let (_, err) = run_script(&mut sh, "cd sub\n./mark\n");
        assert!(err.is_empty(), "{err}");
        assert!(sub.join("marked").exists());
    }

    #[test]
    fn test_prompt_counts_lines() {
        let temp = tempfile::tempdir().unwrap();
        let mut sh = session(temp.path(), "");
        assert_eq!(sh.prompt(), "0: ");
        run_script(&mut sh, "\n\n\n");
        assert_eq!(sh.prompt(), "3: ");
    }
}
