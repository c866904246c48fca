//! Alignment, padding and line filling of segmented text.

use std::borrow::Cow;

use pixelwrap::{LayoutError, StyledNode};
use serde::{Deserialize, Serialize};

use crate::layout_context::LayoutContext;
use crate::segmenter::SegmentationResult;

/// Default target width: a standard dialog body.
pub const DEFAULT_LAYOUT_WIDTH: f64 = 150.0;

/// Horizontal placement of each line within the content width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Space placed before a line of `line_width` in `content_width`.
    ///
    /// Negative when the line overflows and the alignment is not `Left`.
    pub fn spacing(self, content_width: f64, line_width: f64) -> f64 {
        match self {
            Self::Left => 0.0,
            Self::Center => (content_width - line_width) / 2.0,
            Self::Right => content_width - line_width,
        }
    }
}

/// Target geometry of a layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Outer width in pixels, padding included.
    pub width: f64,
    pub alignment: Alignment,
    pub padding_left: f64,
    pub padding_right: f64,
    /// Pad every line on the right up to the full width.
    pub fill_lines: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_LAYOUT_WIDTH,
            alignment: Alignment::Left,
            padding_left: 0.0,
            padding_right: 0.0,
            fill_lines: false,
        }
    }
}

impl LayoutOptions {
    /// Width available to line content once padding is removed.
    ///
    /// Padding may be negative; only the resulting content width is checked.
    pub fn content_width(&self) -> Result<f64, LayoutError> {
        let content_width = self.width - self.padding_left - self.padding_right;
        if !content_width.is_finite() || content_width <= 0.0 {
            return Err(LayoutError::content_width(
                self.width,
                self.padding_left,
                self.padding_right,
            ));
        }
        Ok(content_width)
    }
}

/// Produces nodes that render as an exact pixel width.
pub trait SpacerRenderer: Send + Sync {
    fn spacer(&self, width: f64) -> StyledNode;
}

/// Emits [`pixelwrap::AtomicKind::Spacer`] nodes.
#[derive(Clone, Copy, Debug, Default)]
pub struct PreciseSpacer;

impl SpacerRenderer for PreciseSpacer {
    fn spacer(&self, width: f64) -> StyledNode {
        StyledNode::spacer(width)
    }
}

/// Who a tree is being resolved for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActorContext {
    /// Source of selectors and relative lookups.
    pub sender: String,
    /// Scoreboard subject, when scores are involved.
    pub subject: Option<String>,
    /// Locale used for translatable text.
    pub locale: Option<String>,
}

impl ActorContext {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            subject: None,
            locale: None,
        }
    }

    /// Same entity as sender and scoreboard subject.
    pub fn for_entity(entity: impl Into<String>) -> Self {
        let entity = entity.into();
        Self {
            subject: Some(entity.clone()),
            sender: entity,
            locale: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// Replaces server- and locale-dependent nodes with concrete content.
pub trait NodeResolver: Send + Sync {
    fn resolve(&self, node: &StyledNode, actor: &ActorContext) -> StyledNode;
}

/// Align, pad and join segmented lines.
///
/// Each line becomes `[left spacer] line [right spacer]`; the left spacer is
/// omitted when its width is exactly zero and the right spacer is only emitted
/// with `fill_lines` and a positive width. Lines are separated by newline nodes.
pub fn compose_lines(
    result: &SegmentationResult,
    options: &LayoutOptions,
    spacer: &dyn SpacerRenderer,
) -> Result<StyledNode, LayoutError> {
    let content_width = options.content_width()?;
    let mut root = StyledNode::empty();
    for (idx, line) in result.lines().iter().enumerate() {
        if idx > 0 {
            root.children.push(StyledNode::newline());
        }
        let align = options.alignment.spacing(content_width, line.width());

        let left = options.padding_left + align;
        if left != 0.0 {
            root.children.push(spacer.spacer(left));
        }
        root.children.push(line.to_node());

        if options.fill_lines {
            let right = content_width - align - line.width() + options.padding_right;
            if right > 0.0 {
                root.children.push(spacer.spacer(right));
            }
        }
    }
    Ok(root)
}

/// Fluent layout request bound to a [`LayoutContext`].
#[derive(Debug)]
pub struct LayoutBuilder<'a> {
    context: &'a LayoutContext,
    root: &'a StyledNode,
    options: LayoutOptions,
    actor: Option<ActorContext>,
}

impl<'a> LayoutBuilder<'a> {
    pub(crate) fn new(context: &'a LayoutContext, root: &'a StyledNode) -> Self {
        Self {
            context,
            root,
            options: LayoutOptions::default(),
            actor: None,
        }
    }

    /// Outer width, padding included.
    pub fn width(mut self, width: f64) -> Self {
        self.options.width = width;
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.options.alignment = alignment;
        self
    }

    pub fn padding(mut self, left: f64, right: f64) -> Self {
        self.options.padding_left = left;
        self.options.padding_right = right;
        self
    }

    pub fn uniform_padding(self, padding: f64) -> Self {
        self.padding(padding, padding)
    }

    pub fn fill_lines(mut self, fill: bool) -> Self {
        self.options.fill_lines = fill;
        self
    }

    /// Replace every option at once.
    pub fn options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve server- and locale-dependent nodes for `actor` before wrapping.
    pub fn resolve(mut self, actor: ActorContext) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn current_options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn build(self) -> Result<StyledNode, LayoutError> {
        let content_width = self.options.content_width()?;
        let tree = match &self.actor {
            Some(actor) => Cow::Owned(self.context.resolve(self.root, actor)?),
            None => Cow::Borrowed(self.root),
        };
        let result = self.context.segment(&tree, content_width);
        compose_lines(&result, &self.options, self.context.spacer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_spacing() {
        assert_eq!(Alignment::Left.spacing(100.0, 40.0), 0.0);
        assert_eq!(Alignment::Center.spacing(100.0, 40.0), 30.0);
        assert_eq!(Alignment::Right.spacing(100.0, 40.0), 60.0);
        assert_eq!(Alignment::Center.spacing(10.0, 20.0), -5.0);
    }

    #[test]
    fn content_width_rejects_exhausted_width() {
        let options = LayoutOptions {
            width: 20.0,
            padding_left: 10.0,
            padding_right: 10.0,
            ..LayoutOptions::default()
        };
        let err = options.content_width().expect_err("zero content width");
        assert_eq!(err.code, "CONTENT_WIDTH_NON_POSITIVE");
    }

    #[test]
    fn negative_padding_widens_content() {
        let options = LayoutOptions {
            width: 100.0,
            padding_left: -10.0,
            ..LayoutOptions::default()
        };
        assert_eq!(options.content_width().expect("valid"), 110.0);
    }

    #[test]
    fn content_width_rejects_non_finite_padding() {
        for padding in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let options = LayoutOptions {
                padding_right: padding,
                ..LayoutOptions::default()
            };
            let err = options.content_width().expect_err("non-finite padding");
            assert_eq!(err.code, "CONTENT_WIDTH_NON_POSITIVE");
        }
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: LayoutOptions =
            serde_json::from_str(r#"{"alignment":"center","padding_left":4}"#)
                .expect("parse options");
        assert_eq!(options.width, DEFAULT_LAYOUT_WIDTH);
        assert_eq!(options.alignment, Alignment::Center);
        assert_eq!(options.content_width().expect("valid"), 146.0);
    }

    #[test]
    fn actor_for_entity_sets_sender_and_subject() {
        let actor = ActorContext::for_entity("Steve").with_locale("en_us");
        assert_eq!(actor.sender, "Steve");
        assert_eq!(actor.subject.as_deref(), Some("Steve"));
        assert_eq!(actor.locale.as_deref(), Some("en_us"));
    }
}
