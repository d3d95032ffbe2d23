//! Exclusion ledger: the lnkr-owned block inside a VCS ignore file.
//!
//! The block is delimited by [`LedgerConfig::SECTION_START`] and
//! [`LedgerConfig::SECTION_END`] and is rewritten as a whole. Lines outside
//! the block are preserved as they are.

use crate::atomic::atomic_write;
use crate::config::LedgerConfig;
use crate::error::{LnkrError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An ignore file containing (at most) one lnkr block.
#[derive(Debug, Clone)]
pub struct ExcludeLedger {
    path: PathBuf,
}

/// Parsed ignore file: everything outside the block, and the block body.
#[derive(Debug, Default)]
struct LedgerFile {
    before: Vec<String>,
    block: Vec<String>,
    after: Vec<String>,
}

impl LedgerFile {
    fn parse(content: &str) -> Self {
        let lines: Vec<&str> = content.lines().collect();
        let start = lines
            .iter()
            .position(|l| l.trim() == LedgerConfig::SECTION_START);
        let end = start.and_then(|s| {
            lines[s..]
                .iter()
                .position(|l| l.trim() == LedgerConfig::SECTION_END)
                .map(|offset| s + offset)
        });

        let (Some(start), Some(end)) = (start, end) else {
            // A start marker without an end is dropped; the lines after it
            // stay user content.
            return Self {
                before: lines
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| Some(*i) != start)
                    .map(|(_, l)| l.to_string())
                    .collect(),
                ..Default::default()
            };
        };

        // The blank line written ahead of the block belongs to it.
        let before_end = if start > 0 && lines[start - 1].trim().is_empty() {
            start - 1
        } else {
            start
        };

        Self {
            before: lines[..before_end].iter().map(|l| l.to_string()).collect(),
            block: lines[start + 1..end]
                .iter()
                .map(|l| l.trim_start())
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string)
                .collect(),
            after: lines[end + 1..].iter().map(|l| l.to_string()).collect(),
        }
    }

    fn render(&self) -> String {
        let mut lines: Vec<&str> = self
            .before
            .iter()
            .chain(self.after.iter())
            .map(String::as_str)
            .collect();

        if !self.block.is_empty() {
            if lines.last().is_some_and(|l| !l.trim().is_empty()) {
                lines.push("");
            }
            lines.push(LedgerConfig::SECTION_START);
            lines.extend(self.block.iter().map(String::as_str));
            lines.push(LedgerConfig::SECTION_END);
        }

        let mut text = lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }
}

/// Ignore pattern matching exactly `key` relative to the ignore file's
/// repository root.
///
/// The pattern is anchored with a leading `/` so `config` does not also
/// match `nested/config`. Glob characters, backslashes and a trailing space
/// are escaped; a leading `#` or `!` is literal once behind the anchor.
pub fn exclude_pattern(key: &str) -> String {
    let mut pattern = String::with_capacity(key.len() + 1);
    pattern.push('/');
    for c in key.chars() {
        if matches!(c, '\\' | '*' | '?' | '[') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    if pattern.ends_with(' ') {
        pattern.pop();
        pattern.push_str("\\ ");
    }
    pattern
}

impl ExcludeLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Make sure every registry key is listed in the block as an
    /// [`exclude_pattern`].
    ///
    /// Existing block lines keep their order; new patterns are appended.
    /// Returns `true` if the file changed.
    pub fn ensure(&self, keys: &[String]) -> Result<bool> {
        let content = self.read()?.unwrap_or_default();
        let mut file = LedgerFile::parse(&content);

        for key in keys.iter().filter(|k| !k.is_empty()) {
            let pattern = exclude_pattern(key);
            if !file.block.contains(&pattern) {
                file.block.push(pattern);
            }
        }

        self.write_if_changed(&content, &file)
    }

    /// Remove the patterns for the given registry keys from the block,
    /// dropping the block if it ends up empty. Unanchored lines equal to a
    /// key are removed too. Returns `true` if the file changed.
    pub fn remove(&self, keys: &[String]) -> Result<bool> {
        let Some(content) = self.read()? else {
            return Ok(false);
        };
        let mut file = LedgerFile::parse(&content);
        let patterns: Vec<String> = keys.iter().map(|k| exclude_pattern(k)).collect();
        file.block.retain(|line| {
            !patterns.contains(line) && !keys.iter().any(|k| k == line)
        });
        self.write_if_changed(&content, &file)
    }

    /// Delete the whole block. Returns `true` if the file changed.
    pub fn clear(&self) -> Result<bool> {
        let Some(content) = self.read()? else {
            return Ok(false);
        };
        let mut file = LedgerFile::parse(&content);
        file.block.clear();
        self.write_if_changed(&content, &file)
    }

    /// Patterns currently listed in the block, as written.
    pub fn entries(&self) -> Result<Vec<String>> {
        Ok(self
            .read()?
            .map(|content| LedgerFile::parse(&content).block)
            .unwrap_or_default())
    }

    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LnkrError::io_context(
                e,
                format!("Failed to read {}", self.path.display()),
                &self.path,
            )),
        }
    }

    fn write_if_changed(&self, original: &str, file: &LedgerFile) -> Result<bool> {
        let rendered = file.render();
        if rendered == original {
            debug!("{} already up to date", self.path.display());
            return Ok(false);
        }
        atomic_write(&self.path, rendered.as_bytes())?;
        debug!(
            "Wrote {} ({} ledger entries)",
            self.path.display(),
            file.block.len()
        );
        Ok(true)
    }
}
