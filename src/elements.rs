//! Element implementations built on top of `genpdf` primitives.
//!
//! The upstream crate has no horizontal rules, no shaded boxes and no way to learn which page an
//! element landed on.  The elements here fill those gaps for packet rendering.  Lines that need a
//! weight other than 1pt are drawn with [`marker_color`] and get their width in
//! [`crate::strokes::apply_stroke_weights`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use genpdf::elements::CellDecorator;
use genpdf::error::Error;
use genpdf::style::{Color, Style};
use genpdf::{render, Element, Mm, Position, RenderResult, Size};

use crate::layout::cell_borders;
use crate::model::Stroke;
use crate::strokes::marker_color;

const TAB_WIDTH: usize = 4;

/// Width of an unweighted line (1pt) in millimeters.
const DEFAULT_LINE_MM: f64 = 25.4 / 72.0;
/// Distance between the lines that make up a shaded background.
const SHADING_STEP_MM: f64 = 0.3;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Converts a stroke weight in points to a line thickness.
pub fn stroke_thickness(stroke: Stroke) -> Mm {
    Mm::from(printpdf::Mm::from(printpdf::Pt(stroke.weight_pt)))
}

fn stroke_style(stroke: Stroke) -> Style {
    Style::new().with_color(marker_color(stroke))
}

/// A boxed element that can be pushed wherever `genpdf` expects a concrete element type.
pub struct DynElement(pub Box<dyn Element>);

impl Element for DynElement {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        self.0.render(context, area, style)
    }
}

/// Vertical positions of the 1pt lines that cover a band of `height` without gaps.
pub fn shading_offsets(height: Mm) -> Vec<Mm> {
    let height = mm_to_f64(height);
    let half = DEFAULT_LINE_MM / 2.0;
    if height <= 0.0 {
        return Vec::new();
    }
    if height <= DEFAULT_LINE_MM {
        return vec![mm_from_f64(height / 2.0)];
    }

    let last = height - half;
    let mut offsets = Vec::new();
    let mut y = half;
    while y < last {
        offsets.push(mm_from_f64(y));
        y += SHADING_STEP_MM;
    }
    offsets.push(mm_from_f64(last));
    offsets
}

/// Fills the rectangle from the area's origin to `size` with `color`.
fn shade(area: &render::Area<'_>, size: Size, color: Color) {
    let style = Style::new().with_color(color);
    for y in shading_offsets(size.height) {
        area.draw_line(
            vec![Position::new(0, y), Position::new(size.width, y)],
            style,
        );
    }
}

/// Page number shared between the page decorator, which advances it, and the elements that want
/// to know where they were placed.
#[derive(Clone, Debug, Default)]
pub struct PageCounter(Rc<Cell<usize>>);

impl PageCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of the page currently being filled, starting at 1.
    pub fn current(&self) -> usize {
        self.0.get()
    }

    /// Moves to the next page and returns its number.
    pub fn advance(&self) -> usize {
        let next = self.0.get() + 1;
        self.0.set(next);
        next
    }
}

/// A full-width horizontal line with optional space above and below.
pub struct HorizontalRule {
    stroke: Stroke,
    gap_above: Mm,
    gap_below: Mm,
}

impl HorizontalRule {
    pub fn new(stroke: Stroke) -> Self {
        Self {
            stroke,
            gap_above: Mm::default(),
            gap_below: Mm::default(),
        }
    }

    pub fn with_gap_above(mut self, gap: Mm) -> Self {
        self.gap_above = gap;
        self
    }

    pub fn with_gap_below(mut self, gap: Mm) -> Self {
        self.gap_below = gap;
        self
    }

    /// Vertical space taken by the rule including its gaps.
    pub fn height(&self) -> Mm {
        self.gap_above + stroke_thickness(self.stroke) + self.gap_below
    }
}

impl Element for HorizontalRule {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        let height = self.height();

        let mut result = RenderResult::default();
        if height > area.size().height {
            result.has_more = true;
            return Ok(result);
        }

        let width = area.size().width;
        let y = self.gap_above + stroke_thickness(self.stroke) / 2.0;
        area.draw_line(
            vec![Position::new(0, y), Position::new(width, y)],
            stroke_style(self.stroke),
        );

        result.size = Size::new(width, height);
        Ok(result)
    }
}

/// Literal text, optionally on a shaded background, as used for examples and code blocks.
///
/// Lines are printed exactly as given (tabs are expanded to spaces) and never wrapped.  When the
/// box does not fit on the current page the remaining lines continue on the next one, each part
/// with its own background.
pub struct VerbatimBlock {
    lines: Vec<String>,
    fill: Option<Color>,
    padding: Mm,
    next_line: usize,
}

impl VerbatimBlock {
    pub fn new(content: &str, padding: Mm) -> Self {
        let mut lines: Vec<String> = content
            .lines()
            .map(|line| line.replace('\t', &" ".repeat(TAB_WIDTH)))
            .collect();
        if lines.is_empty() {
            // Keep one blank line so an empty box is still drawn.
            lines.push(String::new());
        }

        Self {
            lines,
            fill: None,
            padding,
            next_line: 0,
        }
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Element for VerbatimBlock {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        let line_height = style.line_height(&context.font_cache);
        let size = area.size();

        let usable = mm_to_f64(size.height) - 2.0 * mm_to_f64(self.padding);
        let fitting = (usable / mm_to_f64(line_height)).floor().max(0.0) as usize;
        let remaining = self.lines.len() - self.next_line;
        let count = remaining.min(fitting);
        if count == 0 {
            result.has_more = true;
            return Ok(result);
        }

        let height = self.padding * 2.0 + line_height * count as f64;
        if let Some(fill) = self.fill {
            shade(&area, Size::new(size.width, height), fill);
        }

        for (offset, line) in self.lines[self.next_line..self.next_line + count]
            .iter()
            .enumerate()
        {
            if line.is_empty() {
                continue;
            }
            let position = Position::new(self.padding, self.padding + line_height * offset as f64);
            area.print_str(&context.font_cache, position, style, line)?;
        }

        self.next_line += count;
        result.size = Size::new(size.width, height);
        result.has_more = self.next_line < self.lines.len();
        Ok(result)
    }
}

/// Draws the borders of example tables as given by [`cell_borders`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ExampleCellDecorator;

impl CellDecorator for ExampleCellDecorator {
    fn decorate_cell(
        &mut self,
        column: usize,
        row: usize,
        _has_more: bool,
        area: render::Area<'_>,
        _style: Style,
    ) {
        let borders = cell_borders(column, row);
        let size = area.size();

        if let Some(stroke) = borders.top {
            area.draw_line(
                vec![Position::new(0, 0), Position::new(size.width, 0)],
                stroke_style(stroke),
            );
        }
        if let Some(stroke) = borders.bottom {
            area.draw_line(
                vec![
                    Position::new(0, size.height),
                    Position::new(size.width, size.height),
                ],
                stroke_style(stroke),
            );
        }
        if let Some(stroke) = borders.left {
            area.draw_line(
                vec![Position::new(0, 0), Position::new(0, size.height)],
                stroke_style(stroke),
            );
        }
    }
}

/// Pages on which anchored elements were first placed, indexed by anchor slot.
#[derive(Clone, Debug, Default)]
pub struct AnchorPages(Rc<RefCell<Vec<Option<usize>>>>);

impl AnchorPages {
    pub fn with_slots(slots: usize) -> Self {
        Self(Rc::new(RefCell::new(vec![None; slots])))
    }

    fn record(&self, slot: usize, page: usize) {
        if let Some(entry) = self.0.borrow_mut().get_mut(slot) {
            entry.get_or_insert(page);
        }
    }

    pub fn snapshot(&self) -> Vec<Option<usize>> {
        self.0.borrow().clone()
    }
}

/// Wraps an element and records the page on which it first produced output.
pub struct PageAnchor<E: Element> {
    inner: E,
    counter: PageCounter,
    pages: AnchorPages,
    slot: usize,
}

impl<E: Element> PageAnchor<E> {
    pub fn new(inner: E, counter: PageCounter, pages: AnchorPages, slot: usize) -> Self {
        Self {
            inner,
            counter,
            pages,
            slot,
        }
    }
}

impl<E: Element> Element for PageAnchor<E> {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let result = self.inner.render(context, area, style)?;
        if result.size.height > Mm::default() {
            self.pages.record(self.slot, self.counter.current());
        }
        Ok(result)
    }
}
