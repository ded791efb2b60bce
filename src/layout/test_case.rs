//! Chooses the table shape for a single test case.

use crate::model::ExampleLayout;
use crate::packet::TestCase;

/// Lays out one test case.
///
/// A case with no input but some output only shows the output column.  Every other case,
/// including one where both sides are empty, gets the input and output columns so the two boxes
/// stay symmetric.  Text is copied verbatim.
pub fn lay_out_test_case(test: &TestCase) -> ExampleLayout {
    let has_input = !test.input.is_empty();
    let has_output = !test.output.is_empty();

    if !has_input && has_output {
        ExampleLayout::OutputOnly {
            output: test.output.clone(),
        }
    } else {
        ExampleLayout::InputOutput {
            input: test.input.clone(),
            output: test.output.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{INPUT_LABEL, OUTPUT_LABEL};

    fn labels(layout: &ExampleLayout) -> Vec<&'static str> {
        layout.columns().iter().map(|column| column.label).collect()
    }

    #[test]
    fn output_only_cases_drop_the_input_column() {
        let layout = lay_out_test_case(&TestCase::new("", "hello", true));
        assert_eq!(labels(&layout), vec![OUTPUT_LABEL]);
        assert_eq!(layout.columns()[0].content, "hello");
    }

    #[test]
    fn cases_with_input_use_two_columns() {
        for output in ["3", ""] {
            let layout = lay_out_test_case(&TestCase::new("1 2", output, true));
            assert_eq!(labels(&layout), vec![INPUT_LABEL, OUTPUT_LABEL]);
            assert_eq!(layout.columns()[1].content, output);
        }
    }

    #[test]
    fn fully_empty_cases_keep_two_empty_columns() {
        let layout = lay_out_test_case(&TestCase::new("", "", true));
        let columns = layout.columns();
        assert_eq!(columns.len(), 2);
        assert!(columns.iter().all(|column| column.content.is_empty()));
    }

    #[test]
    fn content_is_copied_verbatim() {
        let input = "  3\n1 2 3\n\n\ttrailing  ";
        let layout = lay_out_test_case(&TestCase::new(input, "6\n", true));
        assert_eq!(
            layout,
            ExampleLayout::InputOutput {
                input: input.to_owned(),
                output: "6\n".to_owned(),
            }
        );
    }

    #[test]
    fn whitespace_input_counts_as_input() {
        let layout = lay_out_test_case(&TestCase::new(" ", "x", true));
        assert!(matches!(layout, ExampleLayout::InputOutput { .. }));
    }
}
