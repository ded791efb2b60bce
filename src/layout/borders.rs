//! Border strokes for the cells of an example table.

use crate::model::Stroke;

/// Rule under the label row.
pub const THICK: Stroke = Stroke::new(0.7);
/// Rule between content cells.
pub const HAIRLINE: Stroke = Stroke::new(0.1);

/// Strokes to draw around one cell.  Right edges are never drawn; the left edge of the next
/// column provides the separator.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellBorders {
    pub top: Option<Stroke>,
    pub bottom: Option<Stroke>,
    pub left: Option<Stroke>,
}

/// Returns the borders of the cell at zero-based `column` and `row`.
///
/// The label row only gets a thick bottom rule.  Content rows get a hairline underneath and a
/// hairline on the left, except in the first column which sits against the table edge.
pub fn cell_borders(column: usize, row: usize) -> CellBorders {
    if row == 0 {
        return CellBorders {
            bottom: Some(THICK),
            ..CellBorders::default()
        };
    }

    CellBorders {
        top: None,
        bottom: Some(HAIRLINE),
        left: (column != 0).then_some(HAIRLINE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_row_only_has_a_thick_bottom_rule() {
        for column in 0..4 {
            let borders = cell_borders(column, 0);
            assert_eq!(borders.bottom, Some(THICK));
            assert_eq!(borders.top, None);
            assert_eq!(borders.left, None);
        }
    }

    #[test]
    fn first_content_column_has_no_left_edge() {
        let borders = cell_borders(0, 1);
        assert_eq!(borders.bottom, Some(HAIRLINE));
        assert_eq!(borders.left, None);
        assert_eq!(borders.top, None);
    }

    #[test]
    fn later_content_columns_get_hairline_separators() {
        let borders = cell_borders(1, 3);
        assert_eq!(borders.bottom, Some(HAIRLINE));
        assert_eq!(borders.left, Some(HAIRLINE));
    }

    #[test]
    fn large_indices_are_accepted() {
        let borders = cell_borders(usize::MAX, usize::MAX);
        assert_eq!(borders.left, Some(HAIRLINE));
    }
}
