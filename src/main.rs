use anyhow::Result;
use argh::FromArgs;
use minishell::input::{BufferedSource, EditorSource, LineSource};
use minishell::{Interpreter, ShellConfig};
use std::io;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(FromArgs)]
/// a minimal command shell: runs builtins and programs found on the search path.
struct Args {
    #[argh(switch, short = 'v')]
    /// log dispatch decisions at debug level.
    verbose: bool,

    #[argh(option)]
    /// colon-separated directories to search instead of $PATH.
    path: Option<String>,

    #[argh(switch)]
    /// do not take control of the terminal at startup.
    no_job_control: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();
    init_tracing(args.verbose);

    let config = ShellConfig::detect()
        .with_search_path(args.path)
        .with_job_control(!args.no_job_control);

    #[cfg(unix)]
    let terminal = if config.wants_terminal_setup() {
        minishell::terminal::TerminalState::init()
            .inspect_err(|e| tracing::warn!("job control unavailable: {e}"))
            .ok()
    } else {
        None
    };

    let mut source: Box<dyn LineSource> = if config.interactive {
        Box::new(EditorSource::new()?)
    } else {
        Box::new(BufferedSource::new(io::stdin().lock()))
    };

    let mut sh = Interpreter::with_config(&config);
    let result = sh.repl(source.as_mut());

    #[cfg(unix)]
    {
        if let Some(Err(e)) = terminal.as_ref().map(|t| t.restore()) {
            tracing::warn!("could not restore terminal modes: {e}");
        }
    }

    result
}
