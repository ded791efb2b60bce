//! Data structures describing a laid-out packet.
//!
//! The layout rules in [`crate::layout`] produce a [`PacketDocument`]: a flat list of
//! [`Block`]s plus the page-level policies (running header, page numbering).  The types here do
//! not reference the rendering crate so the tree can be inspected and compared in tests; the
//! [`crate::builder`] module maps them onto [`genpdf::elements`].

use crate::layout::header::RunningHeader;
use crate::markdown::Markup;
use crate::richtext::Span;

/// Horizontal alignment of headings and paragraphs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Rich text paragraph carrying inline styling information.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RichParagraph {
    spans: Vec<Span>,
    alignment: HorizontalAlignment,
}

impl RichParagraph {
    /// Creates a left-aligned paragraph from the provided spans.
    pub fn new(spans: impl Into<Vec<Span>>) -> Self {
        Self {
            spans: spans.into(),
            ..Self::default()
        }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// The text of all spans without styling; line breaks become newlines.
    pub fn plain_text(&self) -> String {
        self.spans
            .iter()
            .map(|span| if span.is_line_break() { "\n" } else { span.text() })
            .collect()
    }
}

/// The role of a heading, which decides its typographic treatment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeadingLevel {
    /// The packet title on the title page.
    Title,
    /// A problem section heading.
    Problem,
    /// A "Test case N" sub-heading.
    TestCase,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Heading {
    level: HeadingLevel,
    text: String,
    alignment: HorizontalAlignment,
}

impl Heading {
    pub fn new(level: HeadingLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            alignment: HorizontalAlignment::Left,
        }
    }

    pub fn level(&self) -> HeadingLevel {
        self.level
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// Line weight of a rule or cell border, in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub weight_pt: f64,
}

impl Stroke {
    pub const fn new(weight_pt: f64) -> Self {
        Self { weight_pt }
    }
}

/// A full-width horizontal divider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rule {
    pub stroke: Stroke,
    /// Vertical space inserted before the line is drawn.
    pub gap_above_mm: f64,
}

impl Rule {
    pub const fn new(stroke: Stroke) -> Self {
        Self {
            stroke,
            gap_above_mm: 0.0,
        }
    }

    pub const fn with_gap_above_mm(mut self, gap_above_mm: f64) -> Self {
        self.gap_above_mm = gap_above_mm;
        self
    }
}

/// Label printed above the input column of an example table.
pub const INPUT_LABEL: &str = "Input";
/// Label printed above the output column of an example table.
pub const OUTPUT_LABEL: &str = "Output";

/// One column of an example table: its label and verbatim content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExampleColumn<'a> {
    pub label: &'static str,
    pub content: &'a str,
}

/// Shape of the table showing one test case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExampleLayout {
    /// Single column holding only the expected output.
    OutputOnly { output: String },
    /// Input and output side by side.
    InputOutput { input: String, output: String },
}

impl ExampleLayout {
    /// Columns in display order.
    pub fn columns(&self) -> Vec<ExampleColumn<'_>> {
        match self {
            Self::OutputOnly { output } => vec![ExampleColumn {
                label: OUTPUT_LABEL,
                content: output,
            }],
            Self::InputOutput { input, output } => vec![
                ExampleColumn {
                    label: INPUT_LABEL,
                    content: input,
                },
                ExampleColumn {
                    label: OUTPUT_LABEL,
                    content: output,
                },
            ],
        }
    }
}

/// Individual content blocks in document order.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Heading(Heading),
    /// Prose from the preamble or a problem description.
    Markup(Markup),
    Rule(Rule),
    /// Explicit page break request.
    PageBreak,
    Example(ExampleLayout),
}

impl Block {
    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        Self::Heading(Heading::new(level, text))
    }

    pub fn page_break() -> Self {
        Self::PageBreak
    }
}

/// Page numbering scheme installed for the whole document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageNumbering {
    /// Arabic numerals counting from `start`.
    Decimal { start: usize },
}

impl PageNumbering {
    /// Formats the label of the `page`-th physical page (1-based).
    pub fn label(&self, page: usize) -> String {
        match self {
            Self::Decimal { start } => (start + page.saturating_sub(1)).to_string(),
        }
    }
}

/// A packet laid out into blocks, ready to be typeset.
#[derive(Clone, Debug, PartialEq)]
pub struct PacketDocument {
    title: String,
    blocks: Vec<Block>,
    header: RunningHeader,
    numbering: PageNumbering,
}

impl PacketDocument {
    pub fn new(
        title: impl Into<String>,
        blocks: Vec<Block>,
        header: RunningHeader,
        numbering: PageNumbering,
    ) -> Self {
        Self {
            title: title.into(),
            blocks,
            header,
            numbering,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn header(&self) -> &RunningHeader {
        &self.header
    }

    pub fn numbering(&self) -> PageNumbering {
        self.numbering
    }

    /// Titles of the problem sections in document order.
    pub fn problem_titles(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Heading(heading) if heading.level() == HeadingLevel::Problem => {
                Some(heading.text())
            }
            _ => None,
        })
    }
}
