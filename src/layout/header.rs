//! Running header shown at the top of every page after the title page.

use crate::model::{Rule, Stroke};

/// Weight of the rule under the running header.
pub const HEADER_RULE: Stroke = Stroke::new(0.5);
/// Space between the header title and its rule.
pub const HEADER_RULE_GAP_MM: f64 = 1.5;

/// What the header of a single page shows.
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderContent {
    /// Packet title, set in italics.
    pub title: String,
    pub rule: Rule,
}

/// Per-page header policy.
///
/// The page number is only known while the layout engine fills pages, so the policy is queried
/// for each page as it is decorated instead of being resolved up front.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunningHeader {
    title: String,
}

impl RunningHeader {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Header for the 1-based `page`, or `None` on the title page.
    pub fn for_page(&self, page: usize) -> Option<HeaderContent> {
        if page <= 1 {
            return None;
        }

        Some(HeaderContent {
            title: self.title.clone(),
            rule: Rule::new(HEADER_RULE).with_gap_above_mm(HEADER_RULE_GAP_MM),
        })
    }
}
