//! Top-level layout of a packet.

use log::debug;

use crate::model::{
    Block, Heading, HeadingLevel, HorizontalAlignment, PacketDocument, PageNumbering, Rule, Stroke,
};
use crate::packet::Packet;

use super::header::RunningHeader;
use super::problem::render_problem;

/// Weight of the divider under the title on the title page.
pub const TITLE_RULE: Stroke = Stroke::new(1.0);

/// Lays out a whole packet.
///
/// The title page carries the centered title, a divider and the preamble.  Every problem then
/// starts on a fresh page, in packet order.  Later pages get the running header; the title page
/// does not.
pub fn assemble(packet: &Packet) -> PacketDocument {
    let mut blocks = vec![
        Block::Heading(
            Heading::new(HeadingLevel::Title, packet.title.clone())
                .with_alignment(HorizontalAlignment::Center),
        ),
        Block::Rule(Rule::new(TITLE_RULE)),
    ];

    if let Some(preamble) = &packet.preamble {
        blocks.push(Block::Markup(preamble.clone()));
    }

    for problem in &packet.problems {
        blocks.push(Block::page_break());
        blocks.extend(render_problem(problem));
    }

    debug!(
        "assembled packet '{}' with {} problems into {} blocks",
        packet.title,
        packet.problems.len(),
        blocks.len()
    );

    PacketDocument::new(
        packet.title.clone(),
        blocks,
        RunningHeader::new(packet.title.clone()),
        PageNumbering::Decimal { start: 1 },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{Problem, TestCase};
    use crate::markdown::Markup;

    fn sample_packet() -> Packet {
        Packet::new("Spring Invitational")
            .with_preamble(Markup::parse("Good **luck**."))
            .with_problem(Problem::new("Add").with_test(TestCase::new("1 2", "3", true)))
            .with_problem(
                Problem::new("Echo")
                    .with_test(TestCase::new("", "hello", true))
                    .with_test(TestCase::new("x", "x", false)),
            )
            .with_problem(Problem::new("Empty"))
    }

    fn page_breaks(document: &PacketDocument) -> usize {
        document
            .blocks()
            .iter()
            .filter(|block| matches!(block, Block::PageBreak))
            .count()
    }

    #[test]
    fn title_page_comes_first() {
        let document = assemble(&sample_packet());
        let blocks = document.blocks();

        match &blocks[0] {
            Block::Heading(heading) => {
                assert_eq!(heading.level(), HeadingLevel::Title);
                assert_eq!(heading.text(), "Spring Invitational");
                assert_eq!(heading.alignment(), HorizontalAlignment::Center);
            }
            other => panic!("expected title heading, got {other:?}"),
        }
        assert_eq!(blocks[1], Block::Rule(Rule::new(TITLE_RULE)));
        assert!(matches!(blocks[2], Block::Markup(_)));
        assert_eq!(blocks[3], Block::PageBreak);
    }

    #[test]
    fn every_problem_is_preceded_by_a_page_break() {
        let document = assemble(&sample_packet());
        let blocks = document.blocks();
        assert_eq!(page_breaks(&document), 3);

        for (index, block) in blocks.iter().enumerate() {
            if let Block::Heading(heading) = block {
                if heading.level() == HeadingLevel::Problem {
                    assert_eq!(blocks[index - 1], Block::PageBreak);
                }
            }
        }
        assert_eq!(
            document.problem_titles().collect::<Vec<_>>(),
            vec!["Add", "Echo", "Empty"]
        );
    }

    #[test]
    fn numbering_restarts_for_each_problem() {
        let packet = Packet::new("P")
            .with_problem(Problem::new("A").with_test(TestCase::new("1", "1", true)))
            .with_problem(Problem::new("B").with_test(TestCase::new("2", "2", true)));
        let headings: Vec<_> = assemble(&packet)
            .blocks()
            .iter()
            .filter_map(|block| match block {
                Block::Heading(heading) if heading.level() == HeadingLevel::TestCase => {
                    Some(heading.text().to_owned())
                }
                _ => None,
            })
            .collect();
        assert_eq!(headings, vec!["Test case 1", "Test case 1"]);
    }

    #[test]
    fn empty_packet_is_title_page_only() {
        let packet =
            Packet::new("Nothing").with_preamble(Markup::parse("Just the rules."));
        let document = assemble(&packet);
        assert_eq!(page_breaks(&document), 0);
        assert_eq!(document.blocks().len(), 3);
    }

    #[test]
    fn header_and_numbering_are_installed() {
        let document = assemble(&sample_packet());
        assert_eq!(document.header().title(), "Spring Invitational");
        assert_eq!(document.header().for_page(1), None);
        assert!(document.header().for_page(2).is_some());
        assert_eq!(document.numbering(), PageNumbering::Decimal { start: 1 });
    }

    #[test]
    fn layout_is_deterministic() {
        let packet = sample_packet();
        assert_eq!(assemble(&packet), assemble(&packet));
    }
}
