//! Table widget and the field that places it.

use std::fmt::Write as _;
use std::sync::LazyLock;

use livemark_renderer::{ClassNames, escape_html};
use regex::Regex;
use smol_str::SmolStr;

use crate::classify::CursorOracle;
use crate::decoration::{Decoration, DecorationSet, DecorationSetBuilder, Widget};
use crate::state::{EditorState, ViewUpdate};
use crate::syntax::NodeKind;

pub static SEPARATOR_CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:?-+:?$").unwrap());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    fn from_separator(cell: &str) -> Self {
        match (cell.starts_with(':'), cell.ends_with(':') && cell.len() > 1) {
            (true, true) => Self::Center,
            (true, false) => Self::Left,
            (false, true) => Self::Right,
            (false, false) => Self::None,
        }
    }

    fn as_css(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Left => Some("left"),
            Self::Center => Some("center"),
            Self::Right => Some("right"),
        }
    }
}

/// A parsed markdown table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TableWidget {
    pub header: Vec<SmolStr>,
    /// One entry per separator cell; empty without a separator row.
    pub alignments: Vec<Alignment>,
    pub rows: Vec<Vec<SmolStr>>,
}

fn split_cells(line: &str) -> Vec<SmolStr> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').map(|cell| SmolStr::new(cell.trim())).collect()
}

impl TableWidget {
    /// Parse raw table text. Returns `None` when there are no rows at all.
    pub fn parse(text: &str) -> Option<Self> {
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());
        let header = split_cells(lines.next()?);

        let mut alignments = Vec::new();
        let mut rows = Vec::new();
        if let Some(second) = lines.next() {
            let cells = split_cells(second);
            if cells.iter().all(|cell| SEPARATOR_CELL_RE.is_match(cell)) {
                alignments = cells.iter().map(|c| Alignment::from_separator(c)).collect();
            } else {
                rows.push(cells);
            }
        }
        rows.extend(lines.map(split_cells));

        Some(Self {
            header,
            alignments,
            rows,
        })
    }

    pub fn alignment(&self, column: usize) -> Alignment {
        self.alignments.get(column).copied().unwrap_or_default()
    }

    pub fn to_html(&self, classes: &ClassNames) -> String {
        let mut html = String::new();
        let _ = write!(html, "<table class=\"{}\"><thead><tr>", classes.table_widget());
        for (column, cell) in self.header.iter().enumerate() {
            self.write_cell(&mut html, "th", column, cell);
        }
        html.push_str("</tr></thead><tbody>");
        for row in &self.rows {
            html.push_str("<tr>");
            for (column, cell) in row.iter().enumerate() {
                self.write_cell(&mut html, "td", column, cell);
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
        html
    }

    fn write_cell(&self, html: &mut String, tag: &str, column: usize, cell: &str) {
        match self.alignment(column).as_css() {
            Some(align) => {
                let _ = write!(html, "<{tag} style=\"text-align: {align}\">");
            }
            None => {
                let _ = write!(html, "<{tag}>");
            }
        }
        html.push_str(&escape_html(cell));
        let _ = write!(html, "</{tag}>");
    }
}

/// Table decorations, derived from document, selection and tree.
#[derive(Debug)]
pub struct TableField {
    force_hidden: bool,
    set: DecorationSet,
    builds: u64,
}

impl TableField {
    pub fn new(state: &EditorState, force_hidden: bool) -> Self {
        let mut this = Self {
            force_hidden,
            set: DecorationSet::empty(),
            builds: 0,
        };
        this.rebuild(state);
        this
    }

    pub fn decorations(&self) -> &DecorationSet {
        &self.set
    }

    pub fn builds(&self) -> u64 {
        self.builds
    }

    pub fn update(&mut self, state: &EditorState, update: &ViewUpdate) -> bool {
        if !update.affects_fields() {
            return false;
        }
        self.rebuild(state);
        true
    }

    fn rebuild(&mut self, state: &EditorState) {
        // Focus doesn't apply to derived state; only reading mode hides.
        let oracle = CursorOracle::new(state.selection().main(), self.force_hidden);
        let mut builder = DecorationSetBuilder::block();

        for node in state.tree().nodes() {
            if node.kind() != Some(NodeKind::Table) || oracle.is_inside(node.from, node.to) {
                continue;
            }
            let Some(table) = state
                .block_text(node.from, node.to)
                .and_then(|text| TableWidget::parse(&text))
            else {
                continue;
            };
            builder.push(Decoration::widget(
                node.from,
                node.to,
                Widget::Table(table),
                true,
            ));
        }

        let committed = builder.finish(state.doc());
        self.builds += 1;
        self.set = committed.set;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_separator() {
        let table = TableWidget::parse("| a | b |\n| - | - |\n| 1 | 2 |").unwrap();
        assert_eq!(table.header, vec!["a", "b"]);
        assert_eq!(table.rows, vec![vec!["1", "2"]]);
        assert_eq!(table.alignments, vec![Alignment::None, Alignment::None]);
    }

    #[test]
    fn test_parse_without_separator() {
        let table = TableWidget::parse("a | b\n1 | 2\n3 | 4").unwrap();
        assert_eq!(table.header, vec!["a", "b"]);
        assert_eq!(table.rows.len(), 2);
        assert!(table.alignments.is_empty());
        assert_eq!(TableWidget::parse("\n  \n"), None);
    }

    #[test]
    fn test_alignments() {
        let table = TableWidget::parse("|l|c|r|n|\n|:--|:-:|--:|---|").unwrap();
        assert_eq!(
            table.alignments,
            vec![
                Alignment::Left,
                Alignment::Center,
                Alignment::Right,
                Alignment::None
            ]
        );
        assert_eq!(table.alignment(9), Alignment::None);
    }

    #[test]
    fn test_html() {
        let table = TableWidget::parse("| a | <b> |\n|:-|-|\n| 1 | 2 |").unwrap();
        insta::assert_snapshot!(
            table.to_html(&ClassNames::default()),
            @r#"<table class="lp-table-widget"><thead><tr><th style="text-align: left">a</th><th>&lt;b&gt;</th></tr></thead><tbody><tr><td style="text-align: left">1</td><td>2</td></tr></tbody></table>"#
        );
    }
}
