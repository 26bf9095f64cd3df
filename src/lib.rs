//! A minimal line-oriented command shell.
//!
//! Each input line is split into words, the first word is looked up among the
//! shell's built-in commands, and anything that is not a builtin is located on
//! the search path and run as a child process. The shell waits for the child
//! to finish before it reads the next line.
//!
//! The main entry point is [`Interpreter`], which owns the session state
//! ([`env::Environment`]) and the builtin table, and can either dispatch single
//! lines or drive a whole read/dispatch loop over a [`input::LineSource`].

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
mod external;
pub mod input;
mod interpreter;
pub mod lexer;
pub mod resolve;
#[cfg(unix)]
pub mod terminal;

pub use builtin::{BuiltinEntry, BuiltinRegistry};
pub use config::ShellConfig;
pub use error::ShellError;
pub use external::{ArgVector, launch};
pub use interpreter::{Flow, Interpreter};
