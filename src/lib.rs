//! Pixel-exact width measurement for styled text trees.
//!
//! `pixelwrap` measures how wide a tree of styled text renders when every glyph
//! comes from a bitmap font with known per-codepoint advances. The layout crate
//! (`pixelwrap-layout`) builds line wrapping and alignment on top of it.
//!
//! # Usage
//!
//! ```rust
//! use pixelwrap::{Diagnostics, FontId, FontMetrics, FontMetricsStore, NodeMeasurer, StyledNode};
//!
//! let store = FontMetricsStore::builder()
//!     .default_width(5.0)
//!     .font(FontId::default_font(), FontMetrics::new().with_width('i', 1.0))
//!     .build();
//! let diagnostics = Diagnostics::silent();
//! let measurer = NodeMeasurer::new(&store, &diagnostics);
//!
//! // 'H' falls back to the pack default (5), 'i' is 1, plus 1px spacing each.
//! assert_eq!(measurer.measure(&StyledNode::text("Hi")), 8.0);
//! ```

#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented
    )
)]

extern crate alloc;

pub mod diagnostics;
pub mod error;
pub mod font_metrics;
pub mod measure;
pub mod styled_tree;
pub mod tokenize;

pub use diagnostics::{
    DiagnosticCallback, DiagnosticConfig, DiagnosticKind, Diagnostics, LayoutDiagnostic,
};
pub use error::{LayoutError, LayoutErrorContext, LayoutErrorKind};
pub use font_metrics::{
    FontId, FontMetrics, FontMetricsStore, FontMetricsStoreBuilder, MetricsHandle, WidthLookup,
    DEFAULT_CHAR_WIDTH,
};
pub use measure::{NodeClass, NodeMeasurer, BOLD_EXTRA_PX, LETTER_SPACING_PX, SPRITE_WIDTH_PX};
pub use styled_tree::{AtomicKind, NodeContent, Style, StyledNode, Template, PLACEHOLDER};
pub use tokenize::{HyphenTokenizer, TextTokenizer, Token, Tokens, WhitespaceTokenizer};
