//! Lays out one problem section.

use log::debug;

use crate::model::{Block, HeadingLevel};
use crate::packet::{Problem, TestCase};

use super::test_case::lay_out_test_case;

/// Iterates the tests of `problem` that are printed, in packet order.
pub fn visible_tests(problem: &Problem) -> impl Iterator<Item = &TestCase> {
    problem.tests.iter().filter(|test| test.visible)
}

/// Heading text of the `number`-th visible test case.
pub fn test_case_heading(number: usize) -> String {
    format!("Test case {number}")
}

/// Produces the blocks of a problem section: its heading, the description when one is given, and
/// a numbered example table for each visible test.
///
/// Numbers count visible tests only and restart at 1 for every problem, so hidden tests never
/// leave gaps.
pub fn render_problem(problem: &Problem) -> Vec<Block> {
    let mut blocks = vec![Block::heading(HeadingLevel::Problem, problem.title.clone())];

    if let Some(description) = &problem.description {
        blocks.push(Block::Markup(description.clone()));
    }

    let mut shown = 0;
    for (index, test) in visible_tests(problem).enumerate() {
        blocks.push(Block::heading(
            HeadingLevel::TestCase,
            test_case_heading(index + 1),
        ));
        blocks.push(Block::Example(lay_out_test_case(test)));
        shown += 1;
    }

    debug!(
        "laid out problem '{}' with {} of {} tests visible",
        problem.title,
        shown,
        problem.tests.len()
    );

    blocks
}
