#![forbid(unsafe_code)]

//! Script input: lines fed to the shell before interactive input.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;

/// Pending script lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    lines: VecDeque<String>,
}

impl Script {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Read a script file. A missing file is an empty script.
    ///
    /// # Errors
    ///
    /// Any read error other than "not found".
    pub fn load(path: &Path) -> io::Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Self::from_lines(text.lines())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Take the next line.
    pub fn next_line(&mut self) -> Option<String> {
        self.lines.pop_front()
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let script = Script::load(Path::new("/definitely/not/here.candela")).unwrap();
        assert!(script.is_exhausted());
    }

    #[test]
    fn loads_lines_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boot.txt");
        fs::write(&path, "sayhello\r\n\nquit\n").unwrap();
        let mut script = Script::load(&path).unwrap();

        assert_eq!(script.remaining(), 3);
        assert_eq!(script.next_line().as_deref(), Some("sayhello"));
        assert_eq!(script.next_line().as_deref(), Some(""));
        assert_eq!(script.next_line().as_deref(), Some("quit"));
        assert_eq!(script.next_line(), None);
    }
}
