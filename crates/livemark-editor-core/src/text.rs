//! Text buffer abstraction for editor storage.
//!
//! The decoration engine only ever reads from the document: it slices node
//! spans and scans lines. Offsets handed around the engine are UTF-8 byte
//! offsets, matching the syntax tree.

use smol_str::{SmolStr, ToSmolStr};
use std::ops::Range;

/// A text buffer the engine can read node text from.
///
/// All offsets are in bytes (UTF-8).
pub trait TextBuffer {
    /// Total length in bytes (UTF-8).
    fn len_bytes(&self) -> usize;

    /// Check if empty.
    fn is_empty(&self) -> bool {
        self.len_bytes() == 0
    }

    /// Get a slice as SmolStr. Returns None if the range is out of bounds or
    /// does not fall on char boundaries.
    ///
    /// SmolStr is used for efficiency: strings ≤23 bytes are stored inline
    /// (no heap allocation), longer strings are Arc'd (cheap to clone).
    fn slice(&self, byte_range: Range<usize>) -> Option<SmolStr>;

    /// Convert entire buffer to String.
    fn to_string(&self) -> String;

    /// Byte range of the line containing `byte_offset`, excluding the line break.
    fn line_range(&self, byte_offset: usize) -> Option<Range<usize>>;

    /// Whether the range contains a line break.
    fn spans_line_break(&self, byte_range: Range<usize>) -> bool {
        self.slice(byte_range)
            .map(|s| s.contains('\n'))
            .unwrap_or(false)
    }
}

/// Ropey-backed text buffer.
///
/// Cloning is cheap (the rope shares its chunks), so editor snapshots can
/// each hold one.
#[derive(Clone, Default, Debug)]
pub struct EditorRope {
    rope: ropey::Rope,
}

impl EditorRope {
    /// Create a new empty rope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from string.
    pub fn from_str(s: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(s),
        }
    }

    /// Get a reference to the underlying rope (for advanced operations).
    pub fn rope(&self) -> &ropey::Rope {
        &self.rope
    }

    /// Convert a byte offset to a char index, rejecting offsets inside a char.
    fn char_index(&self, byte_offset: usize) -> Option<usize> {
        if byte_offset > self.rope.len_bytes() {
            return None;
        }
        let char_idx = self.rope.try_byte_to_char(byte_offset).ok()?;
        (self.rope.char_to_byte(char_idx) == byte_offset).then_some(char_idx)
    }

    /// Replace a byte range with text. Returns false (and leaves the buffer
    /// untouched) if the range is invalid.
    pub fn replace(&mut self, byte_range: Range<usize>, text: &str) -> bool {
        if byte_range.start > byte_range.end {
            return false;
        }
        let (Some(start), Some(end)) = (
            self.char_index(byte_range.start),
            self.char_index(byte_range.end),
        ) else {
            return false;
        };
        self.rope.remove(start..end);
        self.rope.insert(start, text);
        true
    }
}

impl TextBuffer for EditorRope {
    fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    fn slice(&self, byte_range: Range<usize>) -> Option<SmolStr> {
        if byte_range.start > byte_range.end {
            return None;
        }
        let start = self.char_index(byte_range.start)?;
        let end = self.char_index(byte_range.end)?;
        Some(self.rope.slice(start..end).to_smolstr())
    }

    fn to_string(&self) -> String {
        self.rope.to_string()
    }

    fn line_range(&self, byte_offset: usize) -> Option<Range<usize>> {
        if byte_offset > self.rope.len_bytes() {
            return None;
        }
        let line_idx = self.rope.byte_to_line(byte_offset);
        let start = self.rope.line_to_byte(line_idx);
        let line = self.rope.line(line_idx);
        let mut len = line.len_bytes();
        // Strip the trailing "\n" or "\r\n".
        if len > 0 && line.byte(len - 1) == b'\n' {
            len -= 1;
            if len > 0 && line.byte(len - 1) == b'\r' {
                len -= 1;
            }
        }
        Some(start..start + len)
    }
}

/// Drop container markup (blockquote `>` and list indentation) from the
/// continuation lines of a block that starts at `column` on its first line.
///
/// At most `column` bytes are removed per line, and only while they are
/// spaces, tabs or `>`; anything else is content.
pub fn strip_container_prefix(text: &str, column: usize) -> String {
    if column == 0 {
        return text.to_owned();
    }
    let mut out = String::with_capacity(text.len());
    for (index, line) in text.split_inclusive('\n').enumerate() {
        if index == 0 {
            out.push_str(line);
            continue;
        }
        let prefix = line
            .bytes()
            .take(column)
            .take_while(|b| matches!(b, b' ' | b'\t' | b'>'))
            .count();
        out.push_str(&line[prefix..]);
    }
    out
}

impl From<&str> for EditorRope {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for EditorRope {
    fn from(s: String) -> Self {
        Self::from_str(&s)
    }
}
