//! Splitting an input line into words.

use std::ops::Index;

/// Ordered words of one input line. Index 0 is the command name, the rest are
/// its arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenList {
    words: Vec<String>,
}

impl TokenList {
    pub fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    /// The word at `index`, if the line has that many words.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The command name, i.e. the first word.
    pub fn command(&self) -> Option<&str> {
        self.get(0)
    }

    /// Everything after the command name.
    pub fn args(&self) -> &[String] {
        self.words.get(1..).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

impl Index<usize> for TokenList {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.words[index]
    }
}

impl<S: Into<String>> FromIterator<S> for TokenList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Split `line` on runs of whitespace. Leading and trailing whitespace,
/// including the line terminator, produce no words.
pub fn split_into_tokens(line: &str) -> TokenList {
    line.split_whitespace().collect()
}
