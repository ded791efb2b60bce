//! Markdown prose for preambles and problem descriptions.
//!
//! Prose is CommonMark with tables, parsed with `pulldown-cmark` into a small block tree that the
//! builder can typeset: paragraphs, headings, code blocks, lists, block quotes, tables and
//! thematic breaks.  Inline content becomes [`Span`]s carrying strong, emphasis, code and link
//! decorations.
//!
//! Parsing never fails.  Text that is not valid markup, such as a lone `*` in `n * 2` or the
//! brackets in `[1, 10^9]`, is kept literally, and raw HTML is shown as written.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use serde::Deserialize;

use crate::model::RichParagraph;
use crate::richtext::Span;

/// Cells of one table row, each a run of spans.
pub type TableRow = Vec<Vec<Span>>;

/// A block-level element of parsed prose.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkupBlock {
    Paragraph(RichParagraph),
    /// A heading inside the prose, `level` 1 to 6.
    Heading {
        level: u8,
        spans: Vec<Span>,
    },
    /// Preformatted text, printed verbatim.
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    /// A bulleted list (`start == None`) or a numbered list counting from `start`.
    List {
        start: Option<u64>,
        items: Vec<Vec<MarkupBlock>>,
    },
    Quote(Vec<MarkupBlock>),
    /// Every row has as many cells as the header.
    Table {
        header: TableRow,
        rows: Vec<TableRow>,
    },
    Rule,
}

/// A block of prose: the parsed blocks together with the source text.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "String")]
pub struct Markup {
    source: String,
    blocks: Vec<MarkupBlock>,
}

impl Markup {
    /// Parses `source` as Markdown.  Empty or whitespace-only sources yield no blocks.
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let blocks = {
            let mut events = Parser::new_ext(&source, Options::ENABLE_TABLES);
            parse_blocks(&mut events)
        };
        Self { source, blocks }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn blocks(&self) -> &[MarkupBlock] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl From<String> for Markup {
    fn from(source: String) -> Self {
        Self::parse(source)
    }
}

impl From<&str> for Markup {
    fn from(source: &str) -> Self {
        Self::parse(source)
    }
}

fn is_inline_end(end: &TagEnd) -> bool {
    matches!(
        end,
        TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link | TagEnd::Image
    )
}

/// Collects inline events into spans, merging neighbours that share a style.
#[derive(Default)]
struct InlineText {
    spans: Vec<Span>,
    strong: usize,
    emphasis: usize,
    links: Vec<String>,
}

impl InlineText {
    /// Consumes one inline event.  Returns `false` on the end of the enclosing block.
    fn feed(&mut self, event: Event<'_>) -> bool {
        match event {
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                self.push(&text, false)
            }
            Event::Code(text) | Event::InlineMath(text) | Event::DisplayMath(text) => {
                self.push(&text, true)
            }
            Event::SoftBreak => self.push(" ", false),
            Event::HardBreak => self.spans.push(Span::line_break()),
            Event::FootnoteReference(label) => self.push(&format!("[{label}]"), false),
            Event::TaskListMarker(done) => self.push(if done { "[x] " } else { "[ ] " }, false),
            Event::Start(Tag::Strong) => self.strong += 1,
            Event::End(TagEnd::Strong) => self.strong = self.strong.saturating_sub(1),
            Event::Start(Tag::Emphasis) => self.emphasis += 1,
            Event::End(TagEnd::Emphasis) => self.emphasis = self.emphasis.saturating_sub(1),
            Event::Start(Tag::Link { dest_url, .. }) => self.links.push(dest_url.into_string()),
            Event::End(TagEnd::Link) => {
                self.links.pop();
            }
            // Image alt text arrives as plain text events.
            Event::End(end) if !is_inline_end(&end) => return false,
            _ => {}
        }
        true
    }

    fn push(&mut self, text: &str, code: bool) {
        let mut span = Span::new(text);
        if self.strong > 0 {
            span = span.bold();
        }
        if self.emphasis > 0 {
            span = span.italic();
        }
        if code {
            span = span.code();
        }
        if let Some(target) = self.links.last() {
            span = span.linked(target.clone());
        }

        match self.spans.last_mut() {
            Some(last) if last.same_style(&span) => last.push_str(text),
            _ => self.spans.push(span),
        }
    }

    /// Moves collected text into `blocks` as a paragraph, if there is any.
    fn flush_into(&mut self, blocks: &mut Vec<MarkupBlock>) {
        if !self.spans.is_empty() {
            let spans = std::mem::take(&mut self.spans);
            blocks.push(MarkupBlock::Paragraph(RichParagraph::new(spans)));
        }
    }
}

fn parse_inline<'a, I>(events: &mut I) -> Vec<Span>
where
    I: Iterator<Item = Event<'a>>,
{
    let mut text = InlineText::default();
    for event in events.by_ref() {
        if !text.feed(event) {
            break;
        }
    }
    text.spans
}

/// Parses blocks up to the end of the enclosing container (or the end of input).
fn parse_blocks<'a, I>(events: &mut I) -> Vec<MarkupBlock>
where
    I: Iterator<Item = Event<'a>>,
{
    let mut blocks = Vec::new();
    // Tight list items carry their text without a surrounding paragraph.
    let mut loose = InlineText::default();

    while let Some(event) = events.next() {
        let block = match event {
            Event::Start(Tag::Paragraph) => {
                MarkupBlock::Paragraph(RichParagraph::new(parse_inline(events)))
            }
            Event::Start(Tag::Heading { level, .. }) => MarkupBlock::Heading {
                level: level as u8,
                spans: parse_inline(events),
            },
            Event::Start(Tag::CodeBlock(kind)) => MarkupBlock::CodeBlock {
                language: match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_owned),
                    CodeBlockKind::Indented => None,
                },
                code: collect_text(events),
            },
            Event::Start(Tag::HtmlBlock) => MarkupBlock::CodeBlock {
                language: Some("html".to_owned()),
                code: collect_text(events),
            },
            Event::Start(Tag::List(start)) => parse_list(events, start),
            Event::Start(Tag::BlockQuote(_)) => MarkupBlock::Quote(parse_blocks(events)),
            Event::Start(Tag::Table(_)) => parse_table(events),
            Event::Rule => MarkupBlock::Rule,
            Event::End(end) if !is_inline_end(&end) => break,
            other => {
                loose.feed(other);
                continue;
            }
        };
        loose.flush_into(&mut blocks);
        blocks.push(block);
    }

    loose.flush_into(&mut blocks);
    blocks
}

fn collect_text<'a, I>(events: &mut I) -> String
where
    I: Iterator<Item = Event<'a>>,
{
    let mut text = String::new();
    for event in events.by_ref() {
        match event {
            Event::Text(chunk) | Event::Html(chunk) => text.push_str(&chunk),
            Event::End(_) => break,
            _ => {}
        }
    }
    text
}

fn parse_list<'a, I>(events: &mut I, start: Option<u64>) -> MarkupBlock
where
    I: Iterator<Item = Event<'a>>,
{
    let mut items = Vec::new();
    while let Some(event) = events.next() {
        match event {
            Event::Start(Tag::Item) => items.push(parse_blocks(events)),
            Event::End(_) => break,
            _ => {}
        }
    }
    MarkupBlock::List { start, items }
}

fn parse_table<'a, I>(events: &mut I) -> MarkupBlock
where
    I: Iterator<Item = Event<'a>>,
{
    let mut header = Vec::new();
    let mut rows = Vec::new();
    let mut row = Vec::new();

    while let Some(event) = events.next() {
        match event {
            Event::Start(Tag::TableCell) => row.push(parse_inline(events)),
            Event::End(TagEnd::TableHead) => header = std::mem::take(&mut row),
            Event::End(TagEnd::TableRow) => rows.push(std::mem::take(&mut row)),
            Event::End(TagEnd::Table) => break,
            _ => {}
        }
    }

    for row in &mut rows {
        row.resize_with(header.len(), Vec::new);
    }
    MarkupBlock::Table { header, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph_texts(markup: &Markup) -> Vec<String> {
        markup
            .blocks()
            .iter()
            .filter_map(|block| match block {
                MarkupBlock::Paragraph(paragraph) => Some(paragraph.plain_text()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn blank_lines_separate_paragraphs() {
        let markup = Markup::parse("first line\nsecond line\n\nnext paragraph");
        assert_eq!(
            paragraph_texts(&markup),
            vec!["first line second line", "next paragraph"]
        );
    }

    #[test]
    fn unmatched_markup_characters_stay_literal() {
        for text in [
            "Output n * 2 for each n.",
            "All values lie in [1, 10^9].",
            "Print the set {1, 2, 3}.",
        ] {
            let markup = Markup::parse(text);
            assert_eq!(paragraph_texts(&markup), vec![text], "{text}");
        }
    }

    #[test]
    fn emphasis_and_code_become_spans() {
        let markup = Markup::parse("Read **two** *integers* `a` and `b`.");
        let MarkupBlock::Paragraph(paragraph) = &markup.blocks()[0] else {
            panic!("expected a paragraph");
        };
        assert_eq!(
            paragraph.spans(),
            &[
                Span::new("Read "),
                Span::new("two").bold(),
                Span::new(" "),
                Span::new("integers").italic(),
                Span::new(" "),
                Span::new("a").code(),
                Span::new(" and "),
                Span::new("b").code(),
                Span::new("."),
            ]
        );
    }

    #[test]
    fn hard_breaks_are_kept() {
        let markup = Markup::parse("first  \nsecond");
        let MarkupBlock::Paragraph(paragraph) = &markup.blocks()[0] else {
            panic!("expected a paragraph");
        };
        assert!(paragraph.spans().iter().any(Span::is_line_break));
    }

    #[test]
    fn links_keep_their_target() {
        let markup = Markup::parse("See [the rules](https://example.com/rules).");
        let MarkupBlock::Paragraph(paragraph) = &markup.blocks()[0] else {
            panic!("expected a paragraph");
        };
        assert_eq!(
            paragraph.spans()[1],
            Span::new("the rules").linked("https://example.com/rules")
        );
    }

    #[test]
    fn code_blocks_are_verbatim() {
        let markup = Markup::parse("```cpp\nint main() {\n    return 0;\n}\n```\n\n    indented  x");
        assert_eq!(
            markup.blocks(),
            &[
                MarkupBlock::CodeBlock {
                    language: Some("cpp".into()),
                    code: "int main() {\n    return 0;\n}\n".into(),
                },
                MarkupBlock::CodeBlock {
                    language: None,
                    code: "indented  x\n".into(),
                },
            ]
        );
    }

    #[test]
    fn lists_keep_start_numbers_and_items() {
        let markup = Markup::parse("3. three\n4. four\n\n- a\n- b *c*");
        let blocks = markup.blocks();
        assert_eq!(blocks.len(), 2);

        match &blocks[0] {
            MarkupBlock::List { start, items } => {
                assert_eq!(*start, Some(3));
                assert_eq!(items.len(), 2);
                assert_eq!(
                    items[0],
                    vec![MarkupBlock::Paragraph(RichParagraph::new(vec![Span::new(
                        "three"
                    )]))]
                );
            }
            other => panic!("expected an ordered list, got {other:?}"),
        }
        match &blocks[1] {
            MarkupBlock::List { start, items } => {
                assert_eq!(*start, None);
                assert_eq!(
                    items[1],
                    vec![MarkupBlock::Paragraph(RichParagraph::new(vec![
                        Span::new("b "),
                        Span::new("c").italic(),
                    ]))]
                );
            }
            other => panic!("expected a bullet list, got {other:?}"),
        }
    }

    #[test]
    fn headings_quotes_and_rules() {
        let markup = Markup::parse("## Input\n\n> Note well.\n\n---");
        let blocks = markup.blocks();
        assert_eq!(
            blocks[0],
            MarkupBlock::Heading {
                level: 2,
                spans: vec![Span::new("Input")],
            }
        );
        assert_eq!(
            blocks[1],
            MarkupBlock::Quote(vec![MarkupBlock::Paragraph(RichParagraph::new(vec![
                Span::new("Note well.")
            ]))])
        );
        assert_eq!(blocks[2], MarkupBlock::Rule);
    }

    #[test]
    fn tables_are_padded_to_the_header() {
        let markup = Markup::parse("| n | answer |\n|---|---|\n| 1 | **yes** |\n| 2 |");
        match &markup.blocks()[0] {
            MarkupBlock::Table { header, rows } => {
                assert_eq!(header, &vec![vec![Span::new("n")], vec![Span::new("answer")]]);
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0][1], vec![Span::new("yes").bold()]);
                assert_eq!(rows[1].len(), 2);
            }
            other => panic!("expected a table, got {other:?}"),
        }
    }

    #[test]
    fn empty_source_has_no_blocks() {
        assert!(Markup::parse("").is_empty());
        assert!(Markup::parse("  \n\n ").is_empty());
    }
}
