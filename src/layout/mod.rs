//! Line breaking and paragraph flow.
//!
//! Wrapping works on any [GlyphMetrics](crate::GlyphMetrics) so it can be tested
//! without a real font; [Paragraph] ties it to a [Canvas](crate::Canvas).

mod flow;
mod margins;
mod wrap;

pub use flow::*;
pub use margins::*;
pub use wrap::*;
