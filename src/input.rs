//! Where command lines come from.

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::BufRead;

/// A source of input lines.
pub trait LineSource {
    /// Read the next line, showing `prompt` if the source is interactive.
    ///
    /// Returns `Ok(None)` at end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Line editor on the controlling terminal, with history.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            // Ctrl-C abandons the line being typed, not the shell.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Plain reader for redirected input. Never prints a prompt.
pub struct BufferedSource<R> {
    reader: R,
}

impl<R: BufRead> BufferedSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for BufferedSource<R> {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        let mut line = Vec::new();
        if self.reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        // Bytes that are not UTF-8 become U+FFFD rather than ending the session.
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_buffered_source_yields_lines_then_eof() {
        let mut source = BufferedSource::new(Cursor::new("pwd\n\ncd /tmp"));
        assert_eq!(source.read_line("0: ").unwrap().as_deref(), Some("pwd\n"));
        assert_eq!(source.read_line("1: ").unwrap().as_deref(), Some("\n"));
        assert_eq!(source.read_line("2: ").unwrap().as_deref(), Some("cd /tmp"));
        assert_eq!(source.read_line("3: ").unwrap(), None);
    }

    #[test]
    fn test_invalid_utf8_line_is_replaced_not_fatal() {
        let mut source = BufferedSource::new(Cursor::new(b"ls \xff\npwd\n".to_vec()));
        assert_eq!(source.read_line("").unwrap().as_deref(), Some("ls \u{fffd}\n"));
        assert_eq!(source.read_line("").unwrap().as_deref(), Some("pwd\n"));
        assert_eq!(source.read_line("").unwrap(), None);
    }
}
