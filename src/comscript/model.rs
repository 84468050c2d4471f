//! Command script model
//!
//! IMOD `.com` scripts are line oriented: `$` lines start a program, `#`
//! lines are comments and every other non-empty line is a parameter entry
//! made of a key, a run of whitespace and an optional value.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{
    Result, duplicate_marker_error, file_operation_error, marker_not_found_error,
};

static ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\S+)(\s*)(.*)$").expect("Failed to compile regex pattern for ENTRY_RE")
});

/// One line of a command script
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptLine {
    Blank,
    /// `# ...`
    Comment(String),
    /// `$program ...`
    Directive(String),
    /// `Key<separator>Value`
    Entry {
        key: String,
        separator: String,
        value: String,
    },
}

impl ScriptLine {
    /// Classifies a single line; surrounding whitespace is dropped
    pub fn parse(line: &str) -> ScriptLine {
        let line = line.trim();
        if line.is_empty() {
            return ScriptLine::Blank;
        }
        if line.starts_with('#') {
            return ScriptLine::Comment(line.to_string());
        }
        if line.starts_with('$') {
            return ScriptLine::Directive(line.to_string());
        }

        match ENTRY_RE.captures(line) {
            Some(captures) => ScriptLine::Entry {
                key: captures[1].to_string(),
                separator: captures[2].to_string(),
                value: captures[3].to_string(),
            },
            // Unreachable for a trimmed non-empty line, kept as a comment so nothing is lost
            None => ScriptLine::Comment(line.to_string()),
        }
    }

    /// Builds an entry written as `<label><value>`, the label carrying its own padding
    pub fn labelled(key: &str, label: &str, value: &str) -> ScriptLine {
        ScriptLine::Entry {
            key: key.to_string(),
            separator: label[key.len()..].to_string(),
            value: value.to_string(),
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            ScriptLine::Entry { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            ScriptLine::Entry { value, .. } => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for ScriptLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptLine::Blank => Ok(()),
            ScriptLine::Comment(text) | ScriptLine::Directive(text) => write!(f, "{text}"),
            ScriptLine::Entry {
                key,
                separator,
                value,
            } => write!(f, "{key}{separator}{value}"),
        }
    }
}

/// A parsed command script bound to the file it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ComScript {
    path: PathBuf,
    lines: Vec<ScriptLine>,
}

impl ComScript {
    /// Parses script text; `path` is only used for error reporting and saving
    pub fn parse(path: &Path, content: &str) -> ComScript {
        ComScript {
            path: path.to_path_buf(),
            lines: content.lines().map(ScriptLine::parse).collect(),
        }
    }

    /// Reads and parses a script from disk
    pub fn load(path: &Path) -> Result<ComScript> {
        let content = fs::read_to_string(path)
            .map_err(|e| file_operation_error(e, path.to_path_buf(), "read"))?;
        let script = ComScript::parse(path, &content);
        debug!("Loaded {} lines from {}", script.len(), path.display());
        Ok(script)
    }

    /// Writes every line back to the file it was loaded from
    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, self.to_string())
            .map_err(|e| file_operation_error(e, self.path.clone(), "write"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[ScriptLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the single entry with this key, if any
    pub fn find(&self, key: &str) -> Result<Option<usize>> {
        let mut found = None;
        for (index, line) in self.lines.iter().enumerate() {
            if line.key() == Some(key) {
                if found.is_some() {
                    return Err(duplicate_marker_error(self.path.clone(), key));
                }
                found = Some(index);
            }
        }
        Ok(found)
    }

    /// Value of the entry with this key
    pub fn get(&self, key: &str) -> Result<Option<&str>> {
        Ok(self
            .find(key)?
            .and_then(|index| self.lines[index].value()))
    }

    /// Replaces the entry with this key by `<label><value>`
    ///
    /// # Errors
    /// `MarkerNotFound` when no entry has the key, `DuplicateMarker` when several do.
    pub fn set(&mut self, key: &str, label: &str, value: &str) -> Result<()> {
        let index = self
            .find(key)?
            .ok_or_else(|| marker_not_found_error(self.path.clone(), key))?;
        self.lines[index] = ScriptLine::labelled(key, label, value);
        Ok(())
    }

    /// Replaces the entry with this key, or inserts it before the last line when absent
    pub fn upsert(&mut self, key: &str, label: &str, value: &str) -> Result<()> {
        match self.find(key)? {
            Some(index) => self.lines[index] = ScriptLine::labelled(key, label, value),
            None => self.insert_before_last(ScriptLine::labelled(key, label, value)),
        }
        Ok(())
    }

    /// Inserts a line just before the final one, which in IMOD scripts is the
    /// trailing `$if (-e ./savework)` directive
    pub fn insert_before_last(&mut self, line: ScriptLine) {
        let index = self.lines.len().saturating_sub(1);
        self.lines.insert(index, line);
    }
}

impl fmt::Display for ComScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
