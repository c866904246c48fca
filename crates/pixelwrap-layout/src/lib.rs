//! Line wrapping, alignment and padding for `pixelwrap` styled trees.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

mod layout_builder;
mod layout_context;
mod segmenter;

pub use layout_builder::{
    compose_lines, ActorContext, Alignment, LayoutBuilder, LayoutOptions, NodeResolver,
    PreciseSpacer, SpacerRenderer, DEFAULT_LAYOUT_WIDTH,
};
pub use layout_context::{LayoutContext, LayoutContextBuilder, MAX_SEPARATOR_COPIES};
pub use segmenter::{Fragment, Line, SegmentationResult, Segmenter};
