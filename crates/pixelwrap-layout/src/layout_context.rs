//! Shared services for layout requests.

use std::fmt;
use std::sync::Arc;

use pixelwrap::{
    Diagnostics, FontMetricsStore, LayoutError, MetricsHandle, NodeMeasurer, StyledNode,
    TextTokenizer, WhitespaceTokenizer,
};

use crate::layout_builder::{
    ActorContext, Alignment, LayoutBuilder, NodeResolver, PreciseSpacer, SpacerRenderer,
};
use crate::segmenter::{SegmentationResult, Segmenter};

/// Upper bound on how often [`LayoutContext::separator`] repeats its node.
pub const MAX_SEPARATOR_COPIES: usize = 1024;

/// Metrics, tokenizer, diagnostics, resolver and spacer used by layouts.
///
/// Every operation takes one metrics snapshot when it starts and uses it to
/// completion; a concurrent reload only affects later operations.
#[derive(Clone)]
pub struct LayoutContext {
    metrics: Arc<MetricsHandle>,
    tokenizer: Arc<dyn TextTokenizer>,
    diagnostics: Diagnostics,
    resolver: Option<Arc<dyn NodeResolver>>,
    spacer: Arc<dyn SpacerRenderer>,
}

impl fmt::Debug for LayoutContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutContext")
            .field("generation", &self.metrics.generation())
            .field("diagnostics", &self.diagnostics)
            .field("has_resolver", &self.resolver.is_some())
            .finish_non_exhaustive()
    }
}

impl LayoutContext {
    /// Context over a fixed store.
    pub fn builder(store: FontMetricsStore) -> LayoutContextBuilder {
        Self::with_handle(Arc::new(MetricsHandle::new(store)))
    }

    /// Context that follows whatever store `handle` publishes.
    pub fn with_handle(handle: Arc<MetricsHandle>) -> LayoutContextBuilder {
        LayoutContextBuilder {
            metrics: handle,
            tokenizer: Arc::new(WhitespaceTokenizer),
            diagnostics: Diagnostics::default(),
            resolver: None,
            spacer: Arc::new(PreciseSpacer),
        }
    }

    pub fn metrics(&self) -> &Arc<MetricsHandle> {
        &self.metrics
    }

    /// Current metrics snapshot.
    pub fn snapshot(&self) -> Arc<FontMetricsStore> {
        self.metrics.snapshot()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn tokenizer(&self) -> &dyn TextTokenizer {
        self.tokenizer.as_ref()
    }

    pub fn spacer(&self) -> &dyn SpacerRenderer {
        self.spacer.as_ref()
    }

    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }

    /// Resolve server- and locale-dependent nodes for `actor`.
    pub fn resolve(&self, node: &StyledNode, actor: &ActorContext) -> Result<StyledNode, LayoutError> {
        let resolver = self.resolver.as_ref().ok_or_else(LayoutError::resolver_missing)?;
        Ok(resolver.resolve(node, actor))
    }

    /// Width of the whole tree.
    pub fn measure(&self, node: &StyledNode) -> f64 {
        let store = self.snapshot();
        NodeMeasurer::new(&store, &self.diagnostics).measure(node)
    }

    pub fn resolve_and_measure(
        &self,
        node: &StyledNode,
        actor: &ActorContext,
    ) -> Result<f64, LayoutError> {
        Ok(self.measure(&self.resolve(node, actor)?))
    }

    /// Wrap the tree into lines no wider than `max_width`, forced overflow aside.
    pub fn segment(&self, node: &StyledNode, max_width: f64) -> SegmentationResult {
        let store = self.snapshot();
        let measurer = NodeMeasurer::new(&store, &self.diagnostics);
        Segmenter::new(measurer, self.tokenizer.as_ref(), max_width).segment(node)
    }

    /// Start a layout request for `node`.
    pub fn layout<'a>(&'a self, node: &'a StyledNode) -> LayoutBuilder<'a> {
        LayoutBuilder::new(self, node)
    }

    pub fn center(&self, node: &StyledNode, width: f64) -> Result<StyledNode, LayoutError> {
        self.layout(node).width(width).align(Alignment::Center).build()
    }

    pub fn align_left(
        &self,
        node: &StyledNode,
        width: f64,
        left_padding: f64,
    ) -> Result<StyledNode, LayoutError> {
        self.layout(node)
            .width(width)
            .align(Alignment::Left)
            .padding(left_padding, 0.0)
            .build()
    }

    pub fn align_right(
        &self,
        node: &StyledNode,
        width: f64,
        right_padding: f64,
    ) -> Result<StyledNode, LayoutError> {
        self.layout(node)
            .width(width)
            .align(Alignment::Right)
            .padding(0.0, right_padding)
            .build()
    }

    /// Centered separator line.
    ///
    /// With `repeat_to_fill` the node is repeated as many whole times as fit in
    /// `width` (at least once, at most [`MAX_SEPARATOR_COPIES`]) and the line
    /// is filled to the full width.
    pub fn separator(
        &self,
        node: &StyledNode,
        width: f64,
        repeat_to_fill: bool,
    ) -> Result<StyledNode, LayoutError> {
        if !repeat_to_fill {
            return self.center(node, width);
        }
        let node_width = self.measure(node);
        let copies = if node_width > 0.0 && width.is_finite() {
            ((width / node_width).floor() as usize).clamp(1, MAX_SEPARATOR_COPIES)
        } else {
            1
        };
        let repeated = StyledNode::empty().with_children(core::iter::repeat(node.clone()).take(copies));
        self.layout(&repeated)
            .width(width)
            .align(Alignment::Center)
            .fill_lines(true)
            .build()
    }
}

/// Builder for [`LayoutContext`].
pub struct LayoutContextBuilder {
    metrics: Arc<MetricsHandle>,
    tokenizer: Arc<dyn TextTokenizer>,
    diagnostics: Diagnostics,
    resolver: Option<Arc<dyn NodeResolver>>,
    spacer: Arc<dyn SpacerRenderer>,
}

impl fmt::Debug for LayoutContextBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutContextBuilder")
            .field("diagnostics", &self.diagnostics)
            .field("has_resolver", &self.resolver.is_some())
            .finish_non_exhaustive()
    }
}

impl LayoutContextBuilder {
    pub fn tokenizer(mut self, tokenizer: impl TextTokenizer + 'static) -> Self {
        self.tokenizer = Arc::new(tokenizer);
        self
    }

    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn resolver(mut self, resolver: impl NodeResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn spacer(mut self, spacer: impl SpacerRenderer + 'static) -> Self {
        self.spacer = Arc::new(spacer);
        self
    }

    pub fn build(self) -> LayoutContext {
        LayoutContext {
            metrics: self.metrics,
            tokenizer: self.tokenizer,
            diagnostics: self.diagnostics,
            resolver: self.resolver,
            spacer: self.spacer,
        }
    }
}
