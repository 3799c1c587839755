//! PPTX (Office Open XML) reader for slide extraction.
//!
//! Parses .pptx files, which are ZIP archives of XML parts, into per-slide
//! shape lists: text frames with their runs, tables, charts with their
//! data, and pictures. Placeholders without a position of their own take
//! the one from their slide layout or master.
//!
//! [`write_highlighted`] writes a copy of a deck with every extracted
//! entity outlined.

pub mod chart;
pub mod highlight;
pub mod layout;
pub mod package;
pub mod parser;
pub mod shapes;
pub mod xml;

pub use chart::{ChartData, Series};
pub use highlight::write_highlighted;
pub use layout::PlaceholderBoxes;
pub use parser::{PptxFile, PptxParser};
pub use shapes::{Placeholder, Shape, ShapeKind, SlideContent, TextFrame};
