use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use livemark_editor_core::{
    CodeBlockWidget, EditorState, MarkdownTree, PreviewConfig, PreviewExtensions, Rebuilt,
    Selection, SelectionSet, SyntaxNode, SyntaxTree, TextBuffer, ViewUpdate, Widget, WidgetHost,
};
use livemark_renderer::{ColorMode, HighlightCache, HighlightError, HighlightService, Highlighter};

const SAMPLE: &str =
    "intro **bold** *it* ~~gone~~ `code`\n\n## Title\n\n[site](https://example.com)\n";

fn at(text: &str, cursor: usize) -> EditorState {
    EditorState::new(text).with_selection(SelectionSet::cursor(cursor))
}

fn live(state: &EditorState) -> PreviewExtensions {
    PreviewExtensions::live_preview(state, &PreviewConfig::default())
}

fn visible(state: &EditorState, preview: &PreviewExtensions) -> String {
    preview.compose(state).visible_text()
}

#[derive(Debug)]
struct Fixed(Vec<SyntaxNode>);

impl SyntaxTree for Fixed {
    fn nodes(&self) -> &[SyntaxNode] {
        &self.0
    }
}

#[derive(Default)]
struct Counting {
    calls: Arc<AtomicUsize>,
}

impl Highlighter for Counting {
    fn highlight(
        &self,
        code: &str,
        language: &str,
        _mode: ColorMode,
    ) -> impl Future<Output = Result<String, HighlightError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Ok(format!("<pre data-lang=\"{language}\">{code}</pre>")))
    }
}

#[test]
fn markers_hidden_when_cursor_is_elsewhere() {
    let state = at(SAMPLE, SAMPLE.len());
    let preview = live(&state);
    assert_eq!(
        visible(&state, &preview),
        "intro bold it gone code\n\nTitle\n\nsite\n"
    );
}

#[test]
fn markers_revealed_under_cursor_and_text_untouched() {
    let state = at(SAMPLE, 8);
    let preview = live(&state);
    assert_eq!(
        visible(&state, &preview),
        "intro **bold** it gone code\n\nTitle\n\nsite\n"
    );
    assert_eq!(state.doc().to_string(), SAMPLE);

    // Caret in the heading reveals only the heading.
    let state = at(SAMPLE, 41);
    let preview = live(&state);
    assert_eq!(
        visible(&state, &preview),
        "intro bold it gone code\n\n## Title\n\nsite\n"
    );
}

#[test]
fn cursor_at_either_edge_counts_as_inside() {
    let text = "a **b** c";
    let cases = [
        (1, "a b c"),
        (2, "a **b** c"),
        (4, "a **b** c"),
        (7, "a **b** c"),
        (8, "a b c"),
    ];
    for (cursor, expected) in cases {
        let state = at(text, cursor);
        assert_eq!(visible(&state, &live(&state)), expected, "cursor at {cursor}");
    }
}

#[test]
fn range_selection_touching_a_node_reveals_it() {
    let text = "a **b** c";
    let state =
        EditorState::new(text).with_selection(SelectionSet::single(Selection::new(0, 2)));
    assert_eq!(visible(&state, &live(&state)), "a **b** c");
}

#[test]
fn rebuilds_are_idempotent() {
    let state = at(SAMPLE, 20);
    let first = live(&state);
    let second = live(&state);
    assert_eq!(first.decoration_sets(), second.decoration_sets());

    let mut preview = live(&state);
    let before = preview.decoration_sets().map(|s| s.clone());
    let rebuilt = preview.apply(&state, &ViewUpdate {
        doc_changed: true,
        selection_set: true,
        viewport_changed: true,
        focus_changed: true,
        tree_changed: true,
    });
    assert_eq!(
        rebuilt,
        Rebuilt {
            inline: true,
            tables: true,
            code_blocks: true
        }
    );
    let after = preview.decoration_sets().map(|s| s.clone());
    assert_eq!(before, after);
}

#[test]
fn identical_snapshots_trigger_nothing() {
    let state = at(SAMPLE, 3);
    let mut preview = live(&state);
    assert_eq!(preview.update(&state, &state.clone()), Rebuilt::default());
}

#[test]
fn table_outside_and_inside() {
    let text = "intro\n\n| a | b |\n| - | - |\n| 1 | 2 |\n";
    let state = at(text, 0);
    let preview = live(&state);

    let tables: Vec<_> = preview.tables().decorations().widgets().collect();
    assert_eq!(tables.len(), 1);
    let (range, Widget::Table(table)) = &tables[0] else {
        panic!("expected a table widget");
    };
    assert_eq!(&text[range.clone()], "| a | b |\n| - | - |\n| 1 | 2 |");
    assert_eq!(table.header, vec!["a", "b"]);
    assert_eq!(table.rows, vec![vec!["1", "2"]]);

    for cursor in [7, 15, 20, text.len() - 1] {
        let state = at(text, cursor);
        let preview = live(&state);
        assert!(preview.tables().decorations().is_empty(), "cursor at {cursor}");
        assert_eq!(visible(&state, &preview), text);
    }
}

#[test]
fn tables_ignore_focus() {
    let text = "intro\n\n| a | b |\n| - | - |\n| 1 | 2 |\n";
    let state = at(text, 10).with_focus(false);
    let preview = live(&state);
    assert!(preview.tables().decorations().is_empty());
}

#[test]
fn fenced_block_language_is_normalized() {
    let text = "intro\n\n```ts\nconst x: number = 1;\n```\n";
    let state = at(text, 0);
    let preview = live(&state);

    let widgets: Vec<_> = preview.code_blocks().decorations().widgets().collect();
    assert_eq!(widgets.len(), 1);
    let (range, Widget::CodeBlock(code)) = &widgets[0] else {
        panic!("expected a code block widget");
    };
    assert_eq!(range.start, 7);
    assert_eq!(code.language, "typescript");
    assert_eq!(&*code.code, "const x: number = 1;");
    assert_eq!(code.mode, ColorMode::Light);

    let state = at(text, 12);
    assert!(live(&state).code_blocks().decorations().is_empty());
}

#[test]
fn config_aliases_reach_the_widget() {
    let config =
        PreviewConfig::from_toml_str("[language_aliases]\nhbs = \"handlebars\"\n").unwrap();
    let state = at("x\n\n```hbs\n{{a}}\n```\n", 0);
    let preview = PreviewExtensions::live_preview(&state, &config);
    let (_, widget) = preview.code_blocks().decorations().widgets().next().unwrap();
    let Widget::CodeBlock(code) = widget else {
        panic!("expected a code block widget");
    };
    assert_eq!(code.language, "handlebars");
}

#[tokio::test]
async fn highlighter_runs_once_per_key() {
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = Arc::new(HighlightCache::new());
    let text = "intro\n\n```rs\nfn main() {}\n```\n";
    let state = at(text, 0);
    let preview = live(&state);

    let mut host = WidgetHost::new(HighlightService::new(
        cache.clone(),
        Counting {
            calls: calls.clone(),
        },
    ));
    let report = host.sync(preview.code_blocks().decorations());
    assert_eq!(report.tasks.len(), 1);
    for task in report.tasks {
        task.await;
    }
    assert_eq!(host.apply_ready(), 1);
    let html = preview.render_html(&state, &host);
    assert!(html.contains("<pre data-lang=\"rust\">fn main() {}</pre>"));

    // A second editor on the same cache gets markup synchronously.
    let mut other = WidgetHost::new(HighlightService::new(
        cache,
        Counting {
            calls: calls.clone(),
        },
    ));
    let report = other.sync(preview.code_blocks().decorations());
    assert!(report.tasks.is_empty());
    let widget = CodeBlockWidget::new("rust", "fn main() {}", ColorMode::Light);
    assert!(other.view_for(&widget).is_some_and(|v| v.is_highlighted()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn duplicate_blocks_highlight_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let text = "```rs\nlet a = 1;\n```\n\nmid\n\n```rs\nlet a = 1;\n```\n";
    let state = at(text, 24);
    let preview = live(&state);
    assert_eq!(preview.code_blocks().decorations().len(), 2);

    let mut host = WidgetHost::new(HighlightService::new(
        Arc::new(HighlightCache::new()),
        Counting {
            calls: calls.clone(),
        },
    ));
    let report = host.sync(preview.code_blocks().decorations());
    for task in report.tasks {
        task.await;
    }
    assert_eq!(host.apply_ready(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let html = preview.render_html(&state, &host);
    assert_eq!(html.matches("<pre data-lang=\"rust\">let a = 1;</pre>").count(), 2);
}

#[test]
fn unmounted_code_blocks_render_plain_scaffold() {
    let text = "```py\nprint(1 < 2)\n```";
    let state = at(text, 0).with_focus(false);
    // Fields ignore focus: caret at 0 is inside, so the block stays raw.
    assert!(live(&state).code_blocks().decorations().is_empty());

    let reading = PreviewExtensions::reading(&state, &PreviewConfig::default());
    let html = reading.render_html(&state, &());
    assert!(html.contains("<code>print(1 &lt; 2)</code>"));
    assert!(html.contains("data-language=\"python\""));
}

#[test]
fn malformed_nodes_are_skipped() {
    let text = "bold";
    let tree: Arc<dyn SyntaxTree> = Arc::new(Fixed(vec![
        SyntaxNode::new("StrongEmphasis", 0, 4),
        SyntaxNode::new("Emphasis", 0, 100),
        SyntaxNode::new("ATXHeading9", 0, 4),
    ]));
    let state = EditorState::with_parsed(text, tree).with_selection(SelectionSet::cursor(4));
    let preview = PreviewExtensions::reading(&state, &PreviewConfig::default());
    assert!(preview.decoration_sets().iter().all(|s| s.is_empty()));
    assert_eq!(preview.inline().skipped(), 0);
    assert_eq!(visible(&state, &preview), "bold");
}

#[test]
fn reading_mode_ignores_the_cursor() {
    let state = at(SAMPLE, 8);
    let preview = PreviewExtensions::reading(&state, &PreviewConfig::default());
    assert_eq!(
        visible(&state, &preview),
        "intro bold it gone code\n\nTitle\n\nsite\n"
    );
}

#[test]
fn unfocused_editor_hides_inline_markers() {
    let state = at(SAMPLE, 8).with_focus(false);
    assert_eq!(
        visible(&state, &live(&state)),
        "intro bold it gone code\n\nTitle\n\nsite\n"
    );
}

#[test]
fn focus_and_viewport_only_rebuild_inline() {
    let state = at(SAMPLE, 8);
    let mut preview = live(&state);

    let blurred = state.with_focus(false);
    assert_eq!(
        preview.update(&state, &blurred),
        Rebuilt {
            inline: true,
            tables: false,
            code_blocks: false
        }
    );

    let scrolled = blurred.with_viewport(0..10);
    assert_eq!(
        preview.update(&blurred, &scrolled),
        Rebuilt {
            inline: true,
            tables: false,
            code_blocks: false
        }
    );
    assert_eq!(preview.tables().builds(), 1);
    assert_eq!(preview.code_blocks().builds(), 1);
}

#[test]
fn new_tree_alone_rebuilds_everything() {
    let state = at(SAMPLE, 8);
    let mut preview = live(&state);
    let reparsed = state.with_tree(Arc::new(MarkdownTree::parse(SAMPLE)));
    assert_eq!(
        preview.update(&state, &reparsed),
        Rebuilt {
            inline: true,
            tables: true,
            code_blocks: true
        }
    );
}

#[test]
fn edits_move_decorations() {
    let state = at("a **b** c", 0);
    let mut preview = live(&state);
    let edited = state.apply_change(9..9, " **d**").unwrap();
    preview.update(&state, &edited);
    // Cursor stayed at 0, so both strongs are hidden.
    assert_eq!(visible(&edited, &preview), "a b c d");
}

#[test]
fn color_mode_switch_rebuilds_only_code_blocks() {
    let text = "**a**\n\n```rs\nfn a() {}\n```\n";
    let state = at(text, text.len());
    let mut preview = live(&state);
    let inline_before = preview.inline().decorations().clone();

    preview.set_color_mode(&state, ColorMode::Dark);

    assert_eq!(preview.inline().decorations(), &inline_before);
    assert_eq!(preview.inline().builds(), 1);
    assert_eq!(preview.tables().builds(), 1);
    let (_, widget) = preview.code_blocks().decorations().widgets().next().unwrap();
    let Widget::CodeBlock(code) = widget else {
        panic!("expected a code block widget");
    };
    assert_eq!(code.mode, ColorMode::Dark);
    assert!(preview.theme().to_css().contains("Live preview (dark)"));
}

#[test]
fn blockquote_prefixes_and_rules() {
    let text = "> one\n> two\n\n---\n\nend\n";
    let state = at(text, text.len());
    let preview = live(&state);
    let composed = preview.compose(&state);
    assert_eq!(composed.visible_text(), "one\ntwo\n\n\n\nend\n");
    assert_eq!(composed.widgets().count(), 1);
}

#[test]
fn quoted_code_block_drops_quote_markers() {
    let text = "> ```rs\n> let x = 1;\n> ```\n\nend\n";
    let state = at(text, text.len());
    let preview = live(&state);

    let (range, widget) = preview.code_blocks().decorations().widgets().next().unwrap();
    let Widget::CodeBlock(code) = widget else {
        panic!("expected a code block widget");
    };
    assert_eq!(range, 2..26);
    assert_eq!(code.language, "rust");
    assert_eq!(&*code.code, "let x = 1;");
}

#[test]
fn quoted_table_drops_quote_markers() {
    let text = "> | a | b |\n> | :- | -: |\n> | 1 | 2 |\n\nend\n";
    let state = at(text, text.len());
    let preview = live(&state);

    let (_, widget) = preview.tables().decorations().widgets().next().unwrap();
    let Widget::Table(table) = widget else {
        panic!("expected a table widget");
    };
    assert_eq!(table.header, vec!["a", "b"]);
    assert_eq!(table.rows, vec![vec!["1", "2"]]);
    assert_eq!(table.alignments.len(), 2);
}

#[test]
fn list_nested_code_block_drops_indentation() {
    let text = "- item\n\n  ```py\n  x = 1\n  ```\n";
    let state = at(text, 0);
    let preview = live(&state);

    let (_, widget) = preview.code_blocks().decorations().widgets().next().unwrap();
    let Widget::CodeBlock(code) = widget else {
        panic!("expected a code block widget");
    };
    assert_eq!(code.language, "python");
    assert_eq!(&*code.code, "x = 1");
}

#[test]
fn nested_marks_render_to_html() {
    let text = "# Hi **there**\n";
    let state = at(text, 0).with_focus(false);
    let preview = live(&state);
    assert_eq!(
        preview.render_html(&state, &()),
        "<span class=\"lp-heading-1\">Hi </span>\
         <span class=\"lp-heading-1\"><span class=\"lp-strong\">there</span></span>\n"
    );
}
