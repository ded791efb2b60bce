//! Layout rules that turn a [`Packet`](crate::packet::Packet) into a
//! [`PacketDocument`](crate::model::PacketDocument).
//!
//! Everything in this module is pure: no I/O, no fonts, no page geometry.  Page-dependent
//! decisions are expressed as policies ([`header::RunningHeader`]) that the builder evaluates once
//! the layout engine knows the page number.

pub mod assembler;
pub mod borders;
pub mod header;
pub mod problem;
pub mod test_case;

pub use assembler::assemble;
pub use borders::{cell_borders, CellBorders};
pub use header::{HeaderContent, RunningHeader};
pub use problem::{render_problem, visible_tests};
pub use test_case::lay_out_test_case;
