use crate::builtin::BuiltinRegistry;
use crate::env::Environment;
use crate::lexer::TokenList;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// Everything a builtin may touch while it runs.
///
/// The registry is borrowed read-only so `?` can list it; the session is the
/// only mutable state.
pub struct Invocation<'a> {
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
    pub env: &'a mut Environment,
    pub builtins: &'a BuiltinRegistry,
}

/// Object-safe capability stored in the builtin table.
///
/// Implemented for every argh-parsed builtin through [`crate::builtin`]'s
/// factory, and open to callers that want to register their own handlers.
pub trait BuiltinHandler {
    /// Run with the full token list of the line (index 0 is the builtin's name).
    ///
    /// Errors are for failures writing the shell's own output; command-level
    /// failures are reported by the handler and folded into the exit code.
    fn invoke(&self, tokens: &TokenList, io: &mut Invocation<'_>) -> Result<ExitCode>;
}

impl<F> BuiltinHandler for F
where
    F: Fn(&TokenList, &mut Invocation<'_>) -> Result<ExitCode>,
{
    fn invoke(&self, tokens: &TokenList, io: &mut Invocation<'_>) -> Result<ExitCode> {
        self(tokens, io)
    }
}
