//! Core entry point for the packet_pdf crate.
//!
//! A [`Packet`] is laid out by [`layout::assemble`] into a [`model::PacketDocument`], which
//! [`builder::PdfBuilder`] then typesets with `genpdf`.

pub mod builder;
pub mod elements;
pub mod fonts;
pub mod layout;
pub mod markdown;
pub mod model;
pub mod packet;
pub mod richtext;
pub mod strokes;
pub mod theme;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use builder::{PdfBuildError, PdfBuilder, RenderedPdf};
pub use packet::{Packet, PacketError, Problem, TestCase};
pub use theme::Theme;
