//! Core editor types: selection ranges and the selection set.
//!
//! All offsets are UTF-8 byte offsets into the document.

use std::ops::Range;

/// Text selection with anchor and head positions.
///
/// The anchor is where the selection started, the head is where the cursor is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    /// Where selection started
    pub anchor: usize,
    /// Where cursor is now
    pub head: usize,
}

impl Selection {
    /// Create a new selection.
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (cursor position).
    pub fn collapsed(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    /// Get the start (lower bound) of the selection.
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Get the end (upper bound) of the selection.
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Check if the selection is collapsed (empty, cursor only).
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Get the selection length.
    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    /// Check if empty (same as is_collapsed).
    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    /// Convert to a Range<usize> (ordered).
    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Check if the selection is backwards (head before anchor).
    pub fn is_backwards(&self) -> bool {
        self.head < self.anchor
    }

    /// Clamp both ends to a document length.
    pub fn clamp(self, len: usize) -> Self {
        Self::new(self.anchor.min(len), self.head.min(len))
    }

    /// Map both ends through a replacement of `changed` with `inserted_len` bytes.
    pub fn map_through(self, changed: &Range<usize>, inserted_len: usize) -> Self {
        Self::new(
            map_position(self.anchor, changed, inserted_len),
            map_position(self.head, changed, inserted_len),
        )
    }
}

fn map_position(pos: usize, changed: &Range<usize>, inserted_len: usize) -> usize {
    if pos < changed.start {
        pos
    } else if pos <= changed.end {
        changed.start + inserted_len
    } else {
        pos - changed.len() + inserted_len
    }
}

/// One or more selection ranges, one of which is the main range.
///
/// Only the main range drives decoration decisions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SelectionSet {
    ranges: Vec<Selection>,
    main: usize,
}

impl Default for SelectionSet {
    fn default() -> Self {
        Self::single(Selection::collapsed(0))
    }
}

impl SelectionSet {
    pub fn single(selection: Selection) -> Self {
        Self {
            ranges: vec![selection],
            main: 0,
        }
    }

    pub fn cursor(offset: usize) -> Self {
        Self::single(Selection::collapsed(offset))
    }

    /// Build from several ranges. An empty list yields a cursor at 0 and an
    /// out-of-range `main` index selects the last range.
    pub fn from_ranges(ranges: Vec<Selection>, main: usize) -> Self {
        if ranges.is_empty() {
            return Self::default();
        }
        let main = main.min(ranges.len() - 1);
        Self { ranges, main }
    }

    pub fn main(&self) -> Selection {
        self.ranges[self.main]
    }

    pub fn ranges(&self) -> &[Selection] {
        &self.ranges
    }

    pub fn clamp(&self, len: usize) -> Self {
        Self {
            ranges: self.ranges.iter().map(|s| s.clamp(len)).collect(),
            main: self.main,
        }
    }

    pub fn map_through(&self, changed: &Range<usize>, inserted_len: usize) -> Self {
        Self {
            ranges: self
                .ranges
                .iter()
                .map(|s| s.map_through(changed, inserted_len))
                .collect(),
            main: self.main,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_bounds() {
        // Forward selection
        let sel = Selection::new(5, 10);
        assert_eq!(sel.start(), 5);
        assert_eq!(sel.end(), 10);
        assert!(!sel.is_backwards());

        // Backward selection
        let sel = Selection::new(10, 5);
        assert_eq!(sel.start(), 5);
        assert_eq!(sel.end(), 10);
        assert!(sel.is_backwards());
    }

    #[test]
    fn test_selection_collapsed() {
        let sel = Selection::collapsed(7);
        assert!(sel.is_collapsed());
        assert!(sel.is_empty());
        assert_eq!(sel.len(), 0);
        assert_eq!(sel.to_range(), 7..7);
    }

    #[test]
    fn test_map_through_insert_and_delete() {
        // Insert 3 bytes at 4: positions after shift right.
        let sel = Selection::new(2, 8).map_through(&(4..4), 3);
        assert_eq!(sel, Selection::new(2, 11));

        // Delete 2..6: position inside collapses to the start.
        let sel = Selection::new(3, 9).map_through(&(2..6), 0);
        assert_eq!(sel, Selection::new(2, 5));
    }

    #[test]
    fn test_selection_set_main() {
        let set = SelectionSet::from_ranges(
            vec![Selection::collapsed(1), Selection::new(4, 9)],
            1,
        );
        assert_eq!(set.main(), Selection::new(4, 9));

        let set = SelectionSet::from_ranges(vec![Selection::collapsed(3)], 7);
        assert_eq!(set.main(), Selection::collapsed(3));

        let set = SelectionSet::from_ranges(vec![], 0);
        assert_eq!(set.main(), Selection::collapsed(0));
    }
}
