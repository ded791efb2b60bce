//! Styled text fragments.
//!
//! A [`Span`] is a run of text with the inline decorations that prose in a packet can carry:
//! strong and emphasized text, inline code and link text.  Spans stay independent of loaded fonts;
//! the builder resolves the monospace family for code when it converts them into [`genpdf`]
//! strings.

use genpdf::style::{Color, Style, StyledString};

/// Color used for the text of links.  The target itself cannot be followed in print.
pub const LINK_COLOR: Color = Color::Rgb(0x1f, 0x4e, 0x9c);

/// A slice of text together with inline style attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    italic: bool,
    code: bool,
    link: Option<String>,
    line_break: bool,
}

impl Span {
    /// Creates a new span with the provided text and no styles applied.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A forced line break inside a paragraph.
    pub fn line_break() -> Self {
        Self {
            line_break: true,
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    pub fn is_italic(&self) -> bool {
        self.italic
    }

    /// Returns whether the span is an inline code fragment.
    pub fn is_code(&self) -> bool {
        self.code
    }

    /// Target of the link this span is the text of, if any.
    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn is_line_break(&self) -> bool {
        self.line_break
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn code(mut self) -> Self {
        self.code = true;
        self
    }

    pub fn linked(mut self, target: impl Into<String>) -> Self {
        self.link = Some(target.into());
        self
    }

    /// Whether `other` carries exactly the same decorations, so both can share one span.
    pub fn same_style(&self, other: &Span) -> bool {
        self.bold == other.bold
            && self.italic == other.italic
            && self.code == other.code
            && self.link == other.link
            && !self.line_break
            && !other.line_break
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn to_style(&self) -> Style {
        let mut style = Style::new();
        if self.link.is_some() {
            style.set_color(LINK_COLOR);
        }
        if self.bold {
            style.set_bold();
        }
        if self.italic {
            style.set_italic();
        }
        style
    }

    /// Converts the span to a [`StyledString`].
    ///
    /// The code flag is not represented here because it needs a loaded font family; see
    /// [`StyledSpan`].
    pub fn to_styled_string(&self) -> StyledString {
        StyledString::new(self.text.clone(), self.to_style())
    }
}

impl From<&Span> for StyledString {
    fn from(span: &Span) -> Self {
        span.to_styled_string()
    }
}

/// A styled string together with the code flag that still has to be resolved to a font family.
#[derive(Clone, Debug)]
pub struct StyledSpan {
    pub string: StyledString,
    pub code: bool,
}

impl From<&Span> for StyledSpan {
    fn from(span: &Span) -> Self {
        Self {
            string: span.to_styled_string(),
            code: span.code,
        }
    }
}

/// Splits `spans` at forced line breaks and converts every line into styled strings.
///
/// A paragraph without breaks yields exactly one line.
pub fn styled_lines(spans: &[Span]) -> Vec<Vec<StyledSpan>> {
    spans
        .split(Span::is_line_break)
        .map(|line| line.iter().map(StyledSpan::from).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_to_style_reflects_flags() {
        let styled = Span::new("Hello").bold().italic().to_styled_string();
        assert_eq!(styled.s, "Hello");
        assert!(styled.style.is_bold());
        assert!(styled.style.is_italic());
        assert_eq!(styled.style.color(), None);
    }

    #[test]
    fn links_are_colored() {
        let styled = Span::new("docs").linked("https://example.com").to_styled_string();
        assert_eq!(styled.style.color(), Some(LINK_COLOR));
    }

    #[test]
    fn code_flag_survives_conversion() {
        let spans = [Span::new("call "), Span::new("main()").code()];
        let lines = styled_lines(&spans);
        assert_eq!(lines.len(), 1);
        assert!(!lines[0][0].code);
        assert!(lines[0][1].code);
    }

    #[test]
    fn line_breaks_split_lines() {
        let spans = [Span::new("a"), Span::line_break(), Span::new("b")];
        let lines = styled_lines(&spans);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1][0].string.s, "b");
    }

    #[test]
    fn line_breaks_never_merge() {
        assert!(!Span::line_break().same_style(&Span::new("")));
        assert!(Span::new("a").bold().same_style(&Span::new("b").bold()));
    }
}
