//! Line weights for rules and table borders.
//!
//! `genpdf` draws every line with the default width of 1pt; its drawing API only carries a color.
//! Elements that need another weight draw with a marker outline color that encodes the weight
//! ([`marker_color`]).  After rendering, [`apply_stroke_weights`] rewrites each page's content
//! stream: every marker color becomes a black stroke preceded by the matching `w` (line width)
//! operator, and the width is reset to 1pt when the next stroke color is chosen.

use genpdf::style::Color;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object};

use crate::model::Stroke;

const MARKER_RED: u8 = 1;
const MARKER_GREEN: u8 = 2;
/// Marker units per point: weights are encoded in steps of 0.05pt.
const STEPS_PER_PT: f64 = 20.0;

const DEFAULT_WIDTH_PT: f32 = 1.0;
const STROKE_COLOR_OPERATORS: [&str; 5] = ["RG", "G", "K", "SC", "SCN"];

/// Outline color that marks a line to be drawn with the weight of `stroke`.
pub fn marker_color(stroke: Stroke) -> Color {
    let code = (stroke.weight_pt * STEPS_PER_PT).round().clamp(1.0, 255.0) as u8;
    Color::Rgb(MARKER_RED, MARKER_GREEN, code)
}

fn channel(object: &Object) -> Option<u8> {
    let value = object.as_float().ok()?;
    Some((value * 255.0).round().clamp(0.0, 255.0) as u8)
}

/// Decodes the weight in points from the operands of an `RG` operator, if they form a marker.
fn marker_weight(operands: &[Object]) -> Option<f32> {
    match operands {
        [r, g, b] => match (channel(r)?, channel(g)?, channel(b)?) {
            (MARKER_RED, MARKER_GREEN, code) if code > 0 => {
                Some(f32::from(code) / STEPS_PER_PT as f32)
            }
            _ => None,
        },
        _ => None,
    }
}

/// Rewrites one page's operations.  Returns `None` when the page has no markers.
fn rewrite_operations(operations: &[Operation]) -> Option<Vec<Operation>> {
    let mut rewritten = Vec::with_capacity(operations.len());
    let mut found = false;
    let mut widened = false;

    for operation in operations {
        let is_stroke_color = STROKE_COLOR_OPERATORS.contains(&operation.operator.as_str());
        let weight = if operation.operator == "RG" {
            marker_weight(&operation.operands)
        } else {
            None
        };

        match weight {
            Some(weight) => {
                found = true;
                widened = true;
                rewritten.push(Operation::new("w", vec![Object::Real(weight)]));
                rewritten.push(Operation::new("RG", vec![0.into(), 0.into(), 0.into()]));
            }
            None => {
                if is_stroke_color && widened {
                    rewritten.push(Operation::new("w", vec![Object::Real(DEFAULT_WIDTH_PT)]));
                    widened = false;
                }
                rewritten.push(operation.clone());
            }
        }
    }

    found.then_some(rewritten)
}

/// Applies the weights encoded by [`marker_color`] to every page of `pdf`.
///
/// Documents without markers are returned unchanged.
pub fn apply_stroke_weights(pdf: &[u8]) -> Result<Vec<u8>, lopdf::Error> {
    let mut document = Document::load_mem(pdf)?;
    let mut changed = false;

    for page_id in document.get_pages().into_values() {
        let content = Content::decode(&document.get_page_content(page_id)?)?;
        if let Some(operations) = rewrite_operations(&content.operations) {
            let encoded = Content { operations }.encode()?;
            document.change_page_content(page_id, encoded)?;
            changed = true;
        }
    }

    if !changed {
        return Ok(pdf.to_vec());
    }

    let mut bytes = Vec::new();
    document.save_to(&mut bytes)?;
    Ok(bytes)
}
