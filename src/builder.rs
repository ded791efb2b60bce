//! Typesetting of laid-out packets with `genpdf`.
//!
//! [`PdfBuilder`] maps every [`Block`] of a [`PacketDocument`] onto `genpdf` elements and installs
//! a page decorator that asks the document's [`RunningHeader`] for each page's header as the page
//! is started.  Line weights are applied to the finished document by
//! [`strokes::apply_stroke_weights`].

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::elements::{
    FrameCellDecorator, LinearLayout, OrderedList, PageBreak, Paragraph, TableLayout,
    UnorderedList,
};
use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{Font, FontFamily};
use genpdf::style::{self, Color, Style};
use genpdf::{Alignment, Element, Margins, Mm, PageDecorator, Position, Size};
use log::info;

#[cfg(feature = "hyphenation")]
use hyphenation::Standard;

use crate::elements::{
    mm_from_f64, AnchorPages, DynElement, ExampleCellDecorator, HorizontalRule, PageAnchor,
    PageCounter, VerbatimBlock,
};
use crate::fonts;
use crate::layout::{HeaderContent, RunningHeader};
use crate::markdown::{Markup, MarkupBlock, TableRow};
use crate::model::{
    Block, ExampleLayout, Heading, HeadingLevel, HorizontalAlignment, PacketDocument,
    PageNumbering, RichParagraph, Stroke,
};
use crate::richtext::{styled_lines, Span};
use crate::strokes;
use crate::theme::Theme;

#[cfg(feature = "bookmarks")]
use crate::bookmarks::{self, BookmarkError, ProblemBookmark};

/// Weight of thematic breaks inside prose.
const PROSE_RULE: Stroke = Stroke::new(0.5);

/// Errors that can occur while producing the PDF.
#[derive(Debug)]
pub enum PdfBuildError {
    /// The required fonts could not be found or loaded.
    FontLoad(Error),
    /// `genpdf` failed while laying out or writing the document.
    Layout(Error),
    /// The rendered document could not be reopened to set line weights.
    Strokes(lopdf::Error),
    /// Writing the output file failed.
    Io(io::Error),
    /// The outline could not be added to the rendered document.
    #[cfg(feature = "bookmarks")]
    Bookmarks(BookmarkError),
}

impl fmt::Display for PdfBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FontLoad(_) => write!(f, "Failed to load fonts"),
            Self::Layout(_) => write!(f, "Failed to typeset the packet"),
            Self::Strokes(_) => write!(f, "Failed to apply line weights"),
            Self::Io(_) => write!(f, "Failed to write the PDF"),
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(_) => write!(f, "Failed to add problem bookmarks"),
        }
    }
}

impl std::error::Error for PdfBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FontLoad(err) | Self::Layout(err) => Some(err),
            Self::Strokes(err) => Some(err),
            Self::Io(err) => Some(err),
            #[cfg(feature = "bookmarks")]
            Self::Bookmarks(err) => Some(err),
        }
    }
}

/// Output of a successful render.
#[derive(Clone, Debug)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    /// Total number of pages.
    pub page_count: usize,
    /// Start page of each problem, in packet order.  `None` for problems that were never placed.
    pub problem_pages: Vec<Option<usize>>,
}

/// Builds a PDF from a [`PacketDocument`].
pub struct PdfBuilder {
    document: PacketDocument,
    theme: Theme,
    paper_size: Size,
    fonts_dir: Option<PathBuf>,
    #[cfg(feature = "hyphenation")]
    hyphenator: Option<Standard>,
}

impl PdfBuilder {
    /// Creates a builder using the default theme on A4 paper.
    pub fn new(document: PacketDocument) -> Self {
        Self {
            document,
            theme: Theme::default(),
            paper_size: genpdf::PaperSize::A4.into(),
            fonts_dir: None,
            #[cfg(feature = "hyphenation")]
            hyphenator: None,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_paper_size(mut self, paper_size: impl Into<Size>) -> Self {
        self.paper_size = paper_size.into();
        self
    }

    /// Searches `dir` for fonts before the default locations.
    pub fn with_fonts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fonts_dir = Some(dir.into());
        self
    }

    /// Enables hyphenation of preamble and description paragraphs.
    #[cfg(feature = "hyphenation")]
    pub fn with_hyphenator(mut self, hyphenator: Standard) -> Self {
        self.hyphenator = Some(hyphenator);
        self
    }

    /// Typesets the packet and returns the PDF bytes.
    pub fn render(self) -> Result<RenderedPdf, PdfBuildError> {
        let font_set =
            fonts::load_fonts(self.fonts_dir.as_deref()).map_err(PdfBuildError::FontLoad)?;

        let mut document = genpdf::Document::new(font_set.body);
        let mono = font_set.mono.map(|family| document.add_font_family(family));

        document.set_title(self.document.title());
        document.set_minimal_conformance();
        document.set_paper_size(self.paper_size);
        document.set_font_size(self.theme.body_font_size);
        document.set_line_spacing(self.theme.line_spacing);

        #[cfg(feature = "hyphenation")]
        if let Some(hyphenator) = self.hyphenator {
            document.set_hyphenator(hyphenator);
        }

        let counter = PageCounter::new();
        let problem_count = self.document.problem_titles().count();
        let anchors = AnchorPages::with_slots(problem_count);

        document.set_page_decorator(PacketPageDecorator::new(
            counter.clone(),
            &self.theme,
            self.document.header().clone(),
            self.document.numbering(),
        ));

        let mut writer = BlockWriter {
            theme: &self.theme,
            mono,
            counter: counter.clone(),
            anchors: anchors.clone(),
            next_problem: 0,
        };
        for block in self.document.blocks() {
            let element = writer.element(block).map_err(PdfBuildError::Layout)?;
            document.push(DynElement(element));
        }

        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(PdfBuildError::Layout)?;
        let bytes = strokes::apply_stroke_weights(&bytes).map_err(PdfBuildError::Strokes)?;

        let rendered = RenderedPdf {
            bytes,
            page_count: counter.current(),
            problem_pages: anchors.snapshot(),
        };
        info!(
            "rendered '{}': {} problems on {} pages ({} bytes)",
            self.document.title(),
            problem_count,
            rendered.page_count,
            rendered.bytes.len()
        );
        Ok(rendered)
    }

    /// Renders and writes the PDF to `path`.
    pub fn render_to_file(self, path: impl AsRef<Path>) -> Result<RenderedPdf, PdfBuildError> {
        let rendered = self.render()?;
        std::fs::write(path.as_ref(), &rendered.bytes).map_err(PdfBuildError::Io)?;
        Ok(rendered)
    }

    /// Renders the PDF and adds an outline entry for every problem.
    #[cfg(feature = "bookmarks")]
    pub fn render_with_bookmarks(self) -> Result<RenderedPdf, PdfBuildError> {
        let titles: Vec<String> = self
            .document
            .problem_titles()
            .map(str::to_owned)
            .collect();
        let mut rendered = self.render()?;
        let marks =
            ProblemBookmark::collect(titles.iter().map(String::as_str), &rendered.problem_pages);
        rendered.bytes = bookmarks::apply_problem_bookmarks(&rendered.bytes, &marks)
            .map_err(PdfBuildError::Bookmarks)?;
        Ok(rendered)
    }
}

fn alignment(alignment: HorizontalAlignment) -> Alignment {
    match alignment {
        HorizontalAlignment::Left => Alignment::Left,
        HorizontalAlignment::Center => Alignment::Center,
        HorizontalAlignment::Right => Alignment::Right,
    }
}

/// Font size of a level 1 to 6 heading inside prose set at `body` size.
fn prose_heading_size(body: u8, level: u8) -> u8 {
    let extra = match level {
        1 => 6,
        2 => 4,
        3 => 2,
        _ => 0,
    };
    body.saturating_add(extra)
}

/// Converts blocks into elements, numbering problem anchors as it goes.
struct BlockWriter<'t> {
    theme: &'t Theme,
    mono: Option<FontFamily<Font>>,
    counter: PageCounter,
    anchors: AnchorPages,
    next_problem: usize,
}

impl BlockWriter<'_> {
    fn gap(&self) -> Mm {
        mm_from_f64(self.theme.block_gap_mm)
    }

    fn below(&self) -> Margins {
        Margins::trbl(0, 0, self.gap(), 0)
    }

    fn mono_style(&self, size: u8) -> Style {
        let style = Style::new().with_font_size(size);
        match self.mono {
            Some(mono) => style.with_font_family(mono),
            None => style,
        }
    }

    fn element(&mut self, block: &Block) -> Result<Box<dyn Element>, Error> {
        Ok(match block {
            Block::Heading(heading) => self.heading(heading),
            Block::Markup(markup) => Box::new(self.markup(markup)?),
            Block::Rule(rule) => Box::new(
                HorizontalRule::new(rule.stroke)
                    .with_gap_above(mm_from_f64(rule.gap_above_mm))
                    .with_gap_below(self.gap()),
            ),
            Block::PageBreak => Box::new(PageBreak::new()),
            Block::Example(layout) => Box::new(self.example(layout)?.padded(self.below())),
        })
    }

    fn heading(&mut self, heading: &Heading) -> Box<dyn Element> {
        let size = match heading.level() {
            HeadingLevel::Title => self.theme.title_font_size,
            HeadingLevel::Problem => self.theme.problem_font_size,
            HeadingLevel::TestCase => self.theme.test_case_font_size,
        };
        let style = Style::new().bold().with_font_size(size);
        let element = Paragraph::new(heading.text())
            .aligned(alignment(heading.alignment()))
            .styled(style)
            .padded(self.below());

        if heading.level() == HeadingLevel::Problem {
            let slot = self.next_problem;
            self.next_problem += 1;
            Box::new(PageAnchor::new(
                element,
                self.counter.clone(),
                self.anchors.clone(),
                slot,
            ))
        } else {
            Box::new(element)
        }
    }

    fn markup(&self, markup: &Markup) -> Result<LinearLayout, Error> {
        self.markup_blocks(markup.blocks())
    }

    fn markup_blocks(&self, blocks: &[MarkupBlock]) -> Result<LinearLayout, Error> {
        let mut layout = LinearLayout::vertical();
        for block in blocks {
            layout.push(DynElement(self.markup_block(block)?));
        }
        Ok(layout)
    }

    fn markup_block(&self, block: &MarkupBlock) -> Result<Box<dyn Element>, Error> {
        Ok(match block {
            MarkupBlock::Paragraph(paragraph) => {
                Box::new(self.paragraph(paragraph).padded(self.below()))
            }
            MarkupBlock::Heading { level, spans } => {
                let size = prose_heading_size(self.theme.body_font_size, *level);
                Box::new(
                    self.spans(spans)
                        .styled(Style::new().bold().with_font_size(size))
                        .padded(self.below()),
                )
            }
            MarkupBlock::CodeBlock { code, .. } => Box::new(
                VerbatimBlock::new(code, mm_from_f64(self.theme.example_padding_mm))
                    .with_fill(Color::Greyscale(self.theme.example_fill))
                    .styled(self.mono_style(self.theme.example_font_size))
                    .padded(self.below()),
            ),
            MarkupBlock::List { start, items } => match start {
                Some(start) => {
                    let mut list = OrderedList::with_start(usize::try_from(*start).unwrap_or(1));
                    for item in items {
                        list.push(self.markup_blocks(item)?);
                    }
                    Box::new(list)
                }
                None => {
                    let mut list = UnorderedList::new();
                    for item in items {
                        list.push(self.markup_blocks(item)?);
                    }
                    Box::new(list)
                }
            },
            MarkupBlock::Quote(blocks) => Box::new(
                self.markup_blocks(blocks)?
                    .styled(Style::new().italic())
                    .padded(Margins::trbl(0, 0, 0, self.gap() * 3.0)),
            ),
            MarkupBlock::Table { header, rows } => {
                Box::new(self.markup_table(header, rows)?.padded(self.below()))
            }
            MarkupBlock::Rule => Box::new(
                HorizontalRule::new(PROSE_RULE)
                    .with_gap_above(self.gap())
                    .with_gap_below(self.gap() * 2.0),
            ),
        })
    }

    fn paragraph(&self, paragraph: &RichParagraph) -> LinearLayout {
        let mut layout = LinearLayout::vertical();
        for line in styled_lines(paragraph.spans()) {
            let mut element = Paragraph::default();
            for span in line {
                let mut string = span.string;
                if span.code {
                    if let Some(mono) = self.mono {
                        string.style = string.style.with_font_family(mono);
                    }
                }
                element.push(string);
            }
            element.set_alignment(alignment(paragraph.alignment()));
            layout.push(element);
        }
        layout
    }

    fn spans(&self, spans: &[Span]) -> LinearLayout {
        self.paragraph(&RichParagraph::new(spans.to_vec()))
    }

    fn markup_table(&self, header: &TableRow, rows: &[TableRow]) -> Result<TableLayout, Error> {
        let padding = Margins::all(mm_from_f64(self.theme.example_padding_mm));
        let cells = |row: &TableRow, style: Style| -> Vec<Box<dyn Element>> {
            row.iter()
                .map(|spans| {
                    Box::new(self.spans(spans).styled(style).padded(padding)) as Box<dyn Element>
                })
                .collect()
        };

        let mut table = TableLayout::new(vec![1; header.len()]);
        table.set_cell_decorator(FrameCellDecorator::new(true, true, false));
        table.push_row(cells(header, Style::new().bold()))?;
        for row in rows {
            table.push_row(cells(row, Style::new()))?;
        }
        Ok(table)
    }

    fn example(&self, layout: &ExampleLayout) -> Result<TableLayout, Error> {
        let columns = layout.columns();
        let padding = mm_from_f64(self.theme.example_padding_mm);
        let fill = Color::Greyscale(self.theme.example_fill);
        let content_style = self.mono_style(self.theme.example_font_size);

        let mut table = TableLayout::new(vec![1; columns.len()]);
        table.set_cell_decorator(ExampleCellDecorator);

        columns
            .iter()
            .fold(table.row(), |row, column| {
                row.element(
                    Paragraph::new(column.label)
                        .styled(Style::new().bold())
                        .padded(Margins::trbl(0, padding, padding, padding)),
                )
            })
            .push()?;
        columns
            .iter()
            .fold(table.row(), |row, column| {
                row.element(
                    VerbatimBlock::new(column.content, padding)
                        .with_fill(fill)
                        .styled(content_style),
                )
            })
            .push()?;

        Ok(table)
    }
}

/// Header, page number and page label decided for one page.
#[derive(Clone, Debug, PartialEq)]
struct PageFurniture {
    page: usize,
    header: Option<HeaderContent>,
    footer: String,
}

/// Page decorator applying margins, the running header and the page number footer.
///
/// The header and footer are decided in [`PacketPageDecorator::start_page`] from the number of
/// the page being started, so page-dependent content is chosen while pages are filled.
struct PacketPageDecorator {
    counter: PageCounter,
    margins: Margins,
    header: RunningHeader,
    numbering: PageNumbering,
    header_size: u8,
    footer_size: u8,
    gap: Mm,
    footer_height: Mm,
}

impl PacketPageDecorator {
    fn new(
        counter: PageCounter,
        theme: &Theme,
        header: RunningHeader,
        numbering: PageNumbering,
    ) -> Self {
        Self {
            counter,
            margins: Margins::all(mm_from_f64(theme.margins_mm)),
            header,
            numbering,
            header_size: theme.header_font_size,
            footer_size: theme.footer_font_size,
            gap: mm_from_f64(theme.block_gap_mm),
            footer_height: mm_from_f64(theme.margins_mm / 2.0),
        }
    }

    /// Advances to the next page and decides what goes on it.
    fn start_page(&mut self) -> PageFurniture {
        let page = self.counter.advance();
        PageFurniture {
            page,
            header: self.header.for_page(page),
            footer: self.numbering.label(page),
        }
    }

    fn header_element(&self, content: &HeaderContent) -> LinearLayout {
        let mut layout = LinearLayout::vertical();
        layout.push(
            Paragraph::new(content.title.as_str())
                .styled(Style::new().italic().with_font_size(self.header_size)),
        );
        layout.push(
            HorizontalRule::new(content.rule.stroke)
                .with_gap_above(mm_from_f64(content.rule.gap_above_mm))
                .with_gap_below(self.gap * 2.0),
        );
        layout
    }
}

impl PageDecorator for PacketPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        let furniture = self.start_page();
        area.add_margins(self.margins);

        if let Some(content) = &furniture.header {
            let result = self
                .header_element(content)
                .render(context, area.clone(), style)?;
            area.add_offset(Position::new(0, result.size.height));
        }

        let available = area.size().height;
        if self.footer_height > available {
            return Err(Error::new(
                "Footer height exceeds available space",
                ErrorKind::InvalidData,
            ));
        }

        let mut footer_area = area.clone();
        footer_area.add_offset(Position::new(0, available - self.footer_height));
        let result = Paragraph::new(furniture.footer)
            .aligned(Alignment::Center)
            .styled(Style::new().with_font_size(self.footer_size))
            .render(context, footer_area, style)?;
        if result.has_more {
            return Err(Error::new(
                "Page number does not fit into the reserved footer space",
                ErrorKind::PageSizeExceeded,
            ));
        }
        area.set_height(available - self.footer_height);

        Ok(area)
    }
}
