//! Greedy line segmentation over styled trees.

use pixelwrap::{NodeClass, NodeContent, NodeMeasurer, Style, StyledNode, TextTokenizer, Token};
use smallvec::{smallvec, SmallVec};

/// One placed piece of a line with its fully resolved style.
#[derive(Clone, Debug, PartialEq)]
pub struct Fragment {
    /// Content only; no style and no children.
    pub node: StyledNode,
    pub style: Style,
    pub width: f64,
}

impl Fragment {
    /// The fragment as a standalone node carrying its resolved style.
    pub fn to_node(&self) -> StyledNode {
        self.node.clone().with_style(self.style.clone())
    }

    pub fn text(&self) -> Option<&str> {
        match &self.node.content {
            NodeContent::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A finalized line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Line {
    fragments: Vec<Fragment>,
    width: f64,
}

impl Line {
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// The line as an unstyled container of its fragments.
    pub fn to_node(&self) -> StyledNode {
        StyledNode::empty().with_children(self.fragments.iter().map(Fragment::to_node))
    }

    pub fn plain_text(&self) -> String {
        self.fragments
            .iter()
            .filter_map(Fragment::text)
            .collect()
    }
}

/// Ordered lines produced by [`Segmenter::segment`]. Never empty.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentationResult {
    lines: Vec<Line>,
}

impl SegmentationResult {
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<Line> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn widths(&self) -> impl Iterator<Item = f64> + '_ {
        self.lines.iter().map(Line::width)
    }

    /// Widest line.
    pub fn max_line_width(&self) -> f64 {
        self.widths().fold(0.0, f64::max)
    }

    /// All lines joined with newline nodes.
    pub fn joined(&self) -> StyledNode {
        let mut root = StyledNode::empty();
        for (idx, line) in self.lines.iter().enumerate() {
            if idx > 0 {
                root.children.push(StyledNode::newline());
            }
            root.children.push(line.to_node());
        }
        root
    }
}

#[derive(Debug)]
struct PendingText {
    text: String,
    style: Style,
    width: f64,
}

/// Mutable state of one segmentation pass.
#[derive(Debug)]
struct SegmentationState {
    styles: SmallVec<[Style; 8]>,
    lines: Vec<Line>,
    fragments: Vec<Fragment>,
    /// Width of `fragments` plus `pending`.
    width: f64,
    pending: Option<PendingText>,
}

impl SegmentationState {
    fn new() -> Self {
        Self {
            styles: smallvec![Style::default()],
            lines: Vec::new(),
            fragments: Vec::new(),
            width: 0.0,
            pending: None,
        }
    }

    fn push_style(&mut self, style: &Style) -> Style {
        let merged = match self.styles.last() {
            Some(parent) => style.merge(parent),
            None => style.clone(),
        };
        self.styles.push(merged.clone());
        merged
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    fn line_is_empty(&self) -> bool {
        self.fragments.is_empty() && self.pending.is_none()
    }

    fn push_text(&mut self, text: &str, style: &Style, width: f64) {
        self.width += width;
        if let Some(pending) = self.pending.as_mut() {
            if pending.style == *style {
                pending.text.push_str(text);
                pending.width += width;
                return;
            }
        }
        self.flush_pending();
        self.pending = Some(PendingText {
            text: text.to_owned(),
            style: style.clone(),
            width,
        });
    }

    fn push_fragment(&mut self, fragment: Fragment) {
        self.flush_pending();
        self.width += fragment.width;
        self.fragments.push(fragment);
    }

    fn flush_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.fragments.push(Fragment {
                node: StyledNode::text(pending.text),
                style: pending.style,
                width: pending.width,
            });
        }
    }

    /// Drop spaces at the end of the line, across fragment boundaries.
    fn trim_trailing_whitespace(&mut self, measurer: &NodeMeasurer<'_>) {
        self.flush_pending();
        while let Some(last) = self.fragments.last_mut() {
            let NodeContent::Text(text) = &mut last.node.content else {
                break;
            };
            let kept = text.trim_end_matches(' ').len();
            let removed = text.len() - kept;
            if removed == 0 {
                break;
            }
            text.truncate(kept);
            let emptied = text.is_empty();
            let delta = measurer.measure_text(" ", &last.style) * removed as f64;
            last.width -= delta;
            self.width -= delta;
            if !emptied {
                break;
            }
            self.fragments.pop();
        }
    }

    fn new_line(&mut self) {
        self.flush_pending();
        self.lines.push(Line {
            fragments: core::mem::take(&mut self.fragments),
            width: self.width,
        });
        self.width = 0.0;
    }

    /// Close the current line at a wrap point or explicit newline.
    fn wrap(&mut self, measurer: &NodeMeasurer<'_>) {
        self.trim_trailing_whitespace(measurer);
        self.new_line();
    }

    /// Flush the last line unless it is empty and an earlier line exists.
    fn finish(mut self) -> Vec<Line> {
        self.flush_pending();
        if !self.line_is_empty() || self.lines.is_empty() {
            self.new_line();
        }
        self.lines
    }
}

/// Greedy segmenter for one maximum line width.
///
/// Lines never exceed `max_width` except when a single atomic node or a
/// single glyph is wider than the whole line; such an item is placed alone.
#[derive(Clone, Copy)]
pub struct Segmenter<'a> {
    measurer: NodeMeasurer<'a>,
    tokenizer: &'a dyn TextTokenizer,
    max_width: f64,
}

impl<'a> Segmenter<'a> {
    pub fn new(measurer: NodeMeasurer<'a>, tokenizer: &'a dyn TextTokenizer, max_width: f64) -> Self {
        Self {
            measurer,
            tokenizer,
            max_width,
        }
    }

    pub fn max_width(&self) -> f64 {
        self.max_width
    }

    pub fn segment(&self, root: &StyledNode) -> SegmentationResult {
        let mut state = SegmentationState::new();
        self.traverse(root, &mut state);
        let lines = state.finish();
        log::debug!(
            "segmented tree into {} line(s) at max_width={}",
            lines.len(),
            self.max_width
        );
        SegmentationResult { lines }
    }

    fn traverse(&self, node: &StyledNode, state: &mut SegmentationState) {
        let style = state.push_style(&node.style);
        match self.measurer.classify(node, &style) {
            NodeClass::Atomic => {
                let width = self.measurer.measure_root(node, &style);
                self.place_atomic(
                    Fragment {
                        node: StyledNode::new(node.content.clone()),
                        style: style.clone(),
                        width,
                    },
                    state,
                );
                for child in &node.children {
                    self.traverse(child, state);
                }
            }
            NodeClass::Splittable { text, children } => {
                if !text.is_empty() {
                    self.place_text(&text, &style, state);
                }
                for child in children.iter() {
                    self.traverse(child, state);
                }
            }
        }
        state.pop_style();
    }

    fn place_atomic(&self, fragment: Fragment, state: &mut SegmentationState) {
        if state.width + fragment.width > self.max_width && !state.line_is_empty() {
            state.wrap(&self.measurer);
        }
        state.push_fragment(fragment);
    }

    fn place_text(&self, text: &str, style: &Style, state: &mut SegmentationState) {
        for token in self.tokenizer.tokenize(text) {
            let piece = match token {
                Token::Newline => {
                    state.wrap(&self.measurer);
                    continue;
                }
                Token::Word(piece) | Token::Whitespace(piece) => piece,
            };
            let width = self.measurer.measure_text(piece, style);
            if state.width + width <= self.max_width {
                state.push_text(piece, style, width);
                continue;
            }

            if !state.line_is_empty() {
                state.wrap(&self.measurer);
            }
            // A wrapped line never begins with a blank.
            if token.is_whitespace() {
                continue;
            }
            if width > self.max_width {
                self.split_glyphs(piece, style, state);
            } else {
                state.push_text(piece, style, width);
            }
        }
    }

    fn split_glyphs(&self, word: &str, style: &Style, state: &mut SegmentationState) {
        for (idx, ch) in word.char_indices() {
            let glyph = &word[idx..idx + ch.len_utf8()];
            let width = self.measurer.measure_text(glyph, style);
            if state.width + width > self.max_width && !state.line_is_empty() {
                state.wrap(&self.measurer);
            }
            state.push_text(glyph, style, width);
        }
    }
}

impl core::fmt::Debug for Segmenter<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Segmenter")
            .field("max_width", &self.max_width)
            .finish_non_exhaustive()
    }
}
