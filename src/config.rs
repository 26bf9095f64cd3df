use std::io::IsTerminal;

/// Startup settings for one shell session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Standard input is a terminal: prompts are printed and the line editor is used.
    pub interactive: bool,
    /// Colon-separated directories searched instead of `PATH`, when set.
    pub search_path: Option<String>,
    /// Take the terminal foreground at startup (interactive sessions only).
    pub job_control: bool,
}

impl ShellConfig {
    /// Settings inferred from the process: interactive iff stdin is a terminal.
    pub fn detect() -> Self {
        Self {
            interactive: std::io::stdin().is_terminal(),
            search_path: None,
            job_control: true,
        }
    }

    pub fn with_search_path(mut self, search_path: Option<String>) -> Self {
        self.search_path = search_path;
        self
    }

    pub fn with_job_control(mut self, enabled: bool) -> Self {
        self.job_control = enabled;
        self
    }

    /// Whether terminal initialization should run at all.
    pub fn wants_terminal_setup(&self) -> bool {
        self.interactive && self.job_control
    }
}

impl Default for ShellConfig {
    /// A non-interactive session reading `PATH`.
    fn default() -> Self {
        Self {
            interactive: false,
            search_path: None,
            job_control: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_setup_needs_both_flags() {
        let base = ShellConfig::default();
        assert!(!base.wants_terminal_setup());

        let interactive = ShellConfig {
            interactive: true,
            ..ShellConfig::default()
        };
        assert!(!interactive.clone().wants_terminal_setup());
        assert!(interactive.with_job_control(true).wants_terminal_setup());
    }

    #[test]
    fn test_search_path_override() {
        let config = ShellConfig::default().with_search_path(Some("/a:/b".into()));
        assert_eq!(config.search_path.as_deref(), Some("/a:/b"));
    }
}
