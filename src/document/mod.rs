//! Line-indexed text model.
//!
//! A [`LineSequence`] is an ordered list of lines where every line keeps the
//! terminator it was read with. Lines end at `\n`; a `\r` before it stays part
//! of the line, so CRLF content survives a splice byte for byte. A trailing
//! line without a terminator still counts as a line.

use crate::error::{Result, SpliceError};
use ropey::Rope;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Half-open range `[start, end)` of 0-based line indices to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpliceBoundary {
    /// First line removed.
    pub start: usize,
    /// First line kept after the cut.
    pub end: usize,
}

impl SpliceBoundary {
    /// Create a boundary. Nothing is checked until it meets a sequence.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of lines the boundary removes, if it is well ordered.
    pub fn removed(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true when `start <= end <= line_count`.
    pub fn fits(&self, line_count: usize) -> bool {
        self.start <= self.end && self.end <= line_count
    }

    /// Check the boundary against a sequence.
    pub fn validate(&self, lines: &LineSequence) -> Result<()> {
        let line_count = lines.len();
        if self.fits(line_count) {
            return Ok(());
        }
        Err(SpliceError::InvalidBoundary {
            file: lines.source().to_path_buf(),
            start: self.start,
            end: self.end,
            line_count,
        })
    }
}

impl fmt::Display for SpliceBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Ordered, terminator-preserving sequence of lines.
#[derive(Debug, Clone)]
pub struct LineSequence {
    rope: Rope,
    source: PathBuf,
}

impl LineSequence {
    /// Build a sequence from in-memory text.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            source: PathBuf::from("<memory>"),
        }
    }

    /// Build a sequence by concatenating lines as given.
    ///
    /// Each item should carry its own terminator; the items are joined
    /// without inserting anything between them.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for line in lines {
            text.push_str(line.as_ref());
        }
        Self::from_text(&text)
    }

    /// Decode raw bytes read from `path`.
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|source| SpliceError::Encoding {
            file: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            rope: Rope::from_str(text),
            source: path.to_path_buf(),
        })
    }

    /// Read a whole file.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| SpliceError::io(path, e))?;
        Self::from_bytes(path, &bytes)
    }

    /// Path this sequence was read from (`<memory>` for in-memory text).
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        let chars = self.rope.len_chars();
        if chars == 0 {
            return 0;
        }
        // ropey reports an empty line after a trailing terminator
        if self.rope.char(chars - 1) == '\n' {
            self.rope.len_lines() - 1
        } else {
            self.rope.len_lines()
        }
    }

    /// Returns true when the sequence holds no lines.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Size of the content in bytes.
    pub fn byte_len(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Line at `index`, terminator included.
    pub fn line(&self, index: usize) -> Option<String> {
        if index < self.len() {
            Some(self.rope.line(index).to_string())
        } else {
            None
        }
    }

    /// All lines, terminators included.
    pub fn lines(&self) -> Vec<String> {
        (0..self.len())
            .map(|i| self.rope.line(i).to_string())
            .collect()
    }

    /// Text of the lines in `[start, end)`. Indices are clamped to the sequence.
    pub fn text_between(&self, start: usize, end: usize) -> String {
        let start_char = self.line_to_char(start);
        let end_char = self.line_to_char(end).max(start_char);
        self.rope.slice(start_char..end_char).to_string()
    }

    /// Full content.
    pub fn to_text(&self) -> String {
        self.rope.to_string()
    }

    /// Replace the lines inside `boundary` with `replacement`.
    ///
    /// Returns a new sequence; `self` is untouched. The result keeps the
    /// source path of `self`.
    pub fn splice(&self, boundary: SpliceBoundary, replacement: &LineSequence) -> Result<Self> {
        boundary.validate(self)?;

        let start_char = self.line_to_char(boundary.start);
        let end_char = self.line_to_char(boundary.end);

        let mut rope = self.rope.clone();
        rope.remove(start_char..end_char);
        rope.insert(start_char, &replacement.to_text());

        Ok(Self {
            rope,
            source: self.source.clone(),
        })
    }

    fn line_to_char(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            self.rope.len_chars()
        } else {
            self.rope.line_to_char(line)
        }
    }
}

impl PartialEq for LineSequence {
    fn eq(&self, other: &Self) -> bool {
        self.rope == other.rope
    }
}

impl Eq for LineSequence {}
