use crate::command::{BuiltinHandler, ExitCode, Invocation};
use crate::error::ShellError;
use crate::lexer::TokenList;
use anyhow::Result;
use argh::{EarlyExit, FromArgs};
use std::fs;
use std::io;
use std::marker::PhantomData;
use tracing::debug;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Exact name the command is looked up by.
    fn name() -> &'static str;

    /// One-line summary shown by `?`.
    fn description() -> &'static str;

    /// Return value follows shell conventions: 0 for success, non-zero for error.
    fn execute(self, io: &mut Invocation<'_>) -> Result<ExitCode>;
}

/// Adapts an argh builtin to the object-safe [`BuiltinHandler`].
struct Factory<T> {
    _phantom: PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T: BuiltinCommand> BuiltinHandler for Factory<T> {
    fn invoke(&self, tokens: &TokenList, io: &mut Invocation<'_>) -> Result<ExitCode> {
        let args: Vec<&str> = tokens.args().iter().map(String::as_str).collect();
        let cmd = match T::from_args(&[T::name()], &args) {
            Ok(cmd) => cmd,
            Err(EarlyExit { output, status }) => {
                return Ok(match status {
                    Ok(()) => {
                        writeln!(io.stdout, "{}", output.trim_end())?;
                        0
                    }
                    Err(()) => {
                        writeln!(io.stderr, "{}", output.trim_end())?;
                        1
                    }
                });
            }
        };

        match cmd.execute(io) {
            Ok(code) => Ok(code),
            Err(e) => match e.downcast::<ShellError>() {
                Ok(shell_err) => {
                    writeln!(io.stderr, "{shell_err}")?;
                    Ok(shell_err.status())
                }
                Err(e) if e.is::<io::Error>() => Err(e),
                Err(e) => {
                    writeln!(io.stderr, "{}: {e:#}", T::name())?;
                    Ok(1)
                }
            },
        }
    }
}

/// One row of the builtin table.
pub struct BuiltinEntry {
    name: &'static str,
    description: &'static str,
    handler: Box<dyn BuiltinHandler>,
}

impl BuiltinEntry {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn handler(&self) -> &dyn BuiltinHandler {
        self.handler.as_ref()
    }
}

/// Name-to-handler table, iterated in registration order.
pub struct BuiltinRegistry {
    entries: Vec<BuiltinEntry>,
}

impl BuiltinRegistry {
    /// A table with no builtins at all.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn register<T: BuiltinCommand + 'static>(&mut self) {
        self.register_handler(
            T::name(),
            T::description(),
            Box::new(Factory::<T>::default()),
        );
    }

    /// Add a handler under `name`. A name that is already taken keeps its
    /// first registration.
    pub fn register_handler(
        &mut self,
        name: &'static str,
        description: &'static str,
        handler: Box<dyn BuiltinHandler>,
    ) {
        if self.lookup(name).is_some() {
            debug!(builtin = name, "builtin already registered, ignoring");
            return;
        }
        self.entries.push(BuiltinEntry {
            name,
            description,
            handler,
        });
    }

    /// Index of the entry registered under exactly `name`.
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name == name)
    }

    pub fn get(&self, index: usize) -> Option<&BuiltinEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> impl Iterator<Item = &BuiltinEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BuiltinRegistry {
    /// The shell's own builtins: `?`, `exit`, `cd`, `pwd`.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register_handler("?", "show this help menu", Box::new(Help));
        registry.register_handler("exit", "exit the command shell", Box::new(Exit));
        registry.register::<Cd>();
        registry.register::<Pwd>();
        registry
    }
}

/// `?`: lists the table. Arguments are ignored.
pub struct Help;

impl BuiltinHandler for Help {
    fn invoke(&self, _tokens: &TokenList, io: &mut Invocation<'_>) -> Result<ExitCode> {
        for entry in io.builtins.entries() {
            writeln!(io.stdout, "{} - {}", entry.name(), entry.description())?;
        }
        Ok(0)
    }
}

/// `exit`: ends the session with status 0 whatever follows it.
pub struct Exit;

impl BuiltinHandler for Exit {
    fn invoke(&self, _tokens: &TokenList, io: &mut Invocation<'_>) -> Result<ExitCode> {
        io.env.should_exit = true;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// change the current working directory.
/// a target starting with `-` must follow `--`, as in `cd -- -dir`.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn description() -> &'static str {
        "change current working directory"
    }

    fn execute(self, io: &mut Invocation<'_>) -> Result<ExitCode> {
        let target = self.target.ok_or(ShellError::MissingArgument {
            command: "cd",
            what: "working directory",
        })?;

        let new_dir = io.env.current_dir.join(&target);
        let os_failed = |source| ShellError::OsOperationFailed {
            op: "cd",
            path: target.clone().into(),
            source,
        };

        let canonical = fs::canonicalize(&new_dir).map_err(os_failed)?;
        if !fs::metadata(&canonical).map_err(os_failed)?.is_dir() {
            return Err(os_failed(io::Error::new(
                io::ErrorKind::NotADirectory,
                "Not a directory",
            ))
            .into());
        }

        debug!(dir = %canonical.display(), "changed directory");
        io.env.current_dir = canonical;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// print the current working directory.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn description() -> &'static str {
        "show current working directory"
    }

    fn execute(self, io: &mut Invocation<'_>) -> Result<ExitCode> {
        // The directory may have been removed since we entered it.
        fs::metadata(&io.env.current_dir).map_err(|source| ShellError::OsOperationFailed {
            op: "pwd",
            path: io.env.current_dir.clone(),
            source,
        })?;
        writeln!(io.stdout, "{}", io.env.current_dir.display())?;
        Ok(0)
    }
}
