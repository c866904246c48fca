//! Pixel widths of styled nodes.
//!
//! Width of a glyph is its resolved font advance, plus [`BOLD_EXTRA_PX`] when
//! bold, plus [`LETTER_SPACING_PX`] always. Newlines are free.

use alloc::borrow::Cow;

use crate::diagnostics::{DiagnosticKind, Diagnostics, LayoutDiagnostic};
use crate::font_metrics::FontMetricsStore;
use crate::styled_tree::{AtomicKind, NodeContent, Style, StyledNode, Template};

/// Extra advance of a bold glyph.
pub const BOLD_EXTRA_PX: f64 = 1.0;
/// Spacing added after every glyph.
pub const LETTER_SPACING_PX: f64 = 1.0;
/// Width of an inline sprite.
pub const SPRITE_WIDTH_PX: f64 = 8.0;

/// How a node takes part in line breaking.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeClass<'a> {
    /// Placed as one unit; children follow separately.
    Atomic,
    /// Text that may break between tokens, followed by nodes laid out in order
    /// (for templates, the substituted arguments and pattern pieces come before
    /// the node's own children).
    Splittable {
        text: Cow<'a, str>,
        children: Cow<'a, [StyledNode]>,
    },
}

/// Measures nodes against one metrics snapshot.
#[derive(Clone, Copy, Debug)]
pub struct NodeMeasurer<'a> {
    store: &'a FontMetricsStore,
    diagnostics: &'a Diagnostics,
}

impl<'a> NodeMeasurer<'a> {
    pub fn new(store: &'a FontMetricsStore, diagnostics: &'a Diagnostics) -> Self {
        Self { store, diagnostics }
    }

    pub fn store(&self) -> &'a FontMetricsStore {
        self.store
    }

    pub fn diagnostics(&self) -> &'a Diagnostics {
        self.diagnostics
    }

    /// Width of the whole tree rooted at `node`.
    pub fn measure(&self, node: &StyledNode) -> f64 {
        self.measure_with(node, &Style::default())
    }

    /// Width of the whole tree rooted at `node` under an inherited style.
    pub fn measure_with(&self, node: &StyledNode, parent_style: &Style) -> f64 {
        let style = node.style.merge(parent_style);
        let own = self.measure_root(node, &style);
        node.children
            .iter()
            .fold(own, |total, child| total + self.measure_with(child, &style))
    }

    /// Width of `node`'s own content, excluding children.
    ///
    /// `style` is the node's effective style, already merged with its ancestors.
    pub fn measure_root(&self, node: &StyledNode, style: &Style) -> f64 {
        match &node.content {
            NodeContent::Text(text) => self.measure_text(text, style),
            NodeContent::Atomic(kind) => self.atomic_width(kind, style),
            NodeContent::Keybind(identifier) => {
                let width = self.measure_text(identifier, style);
                self.report_unforced("keybind", identifier, width);
                width
            }
            NodeContent::Template(template) => {
                let width = self.template_width(template, style);
                self.report_unforced("translatable", &template.key, width);
                width
            }
        }
    }

    /// Width of a text run in `style`.
    pub fn measure_text(&self, text: &str, style: &Style) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        let font = style.effective_font();
        let per_glyph = if style.is_bold() {
            BOLD_EXTRA_PX + LETTER_SPACING_PX
        } else {
            LETTER_SPACING_PX
        };
        text.chars()
            .filter(|&ch| ch != '\n')
            .map(|ch| self.store.width_of(&font, ch, self.diagnostics) + per_glyph)
            .sum()
    }

    /// Width of an atomic node. Bold and letter spacing do not apply.
    pub fn atomic_width(&self, kind: &AtomicKind, _style: &Style) -> f64 {
        match kind {
            AtomicKind::Sprite(_) => SPRITE_WIDTH_PX,
            AtomicKind::Spacer(width) => *width,
            AtomicKind::Score { .. }
            | AtomicKind::Selector(_)
            | AtomicKind::EntityNbt(_)
            | AtomicKind::BlockNbt(_)
            | AtomicKind::StorageNbt(_) => {
                self.diagnostics
                    .report(DiagnosticKind::UnresolvedServerNode, || {
                        LayoutDiagnostic::UnresolvedServerNode {
                            kind: kind.name(),
                            detail: kind.detail(),
                        }
                    });
                0.0
            }
        }
    }

    /// Classify `node` for line breaking, expanding templates.
    ///
    /// Client-dependent nodes are reported here, once per classification, so
    /// the segmenter does not need to measure them separately.
    pub fn classify<'n>(&self, node: &'n StyledNode, style: &Style) -> NodeClass<'n> {
        match &node.content {
            NodeContent::Atomic(_) => NodeClass::Atomic,
            NodeContent::Text(text) => NodeClass::Splittable {
                text: Cow::Borrowed(text),
                children: Cow::Borrowed(&node.children),
            },
            NodeContent::Keybind(identifier) => {
                self.report_unforced_with("keybind", identifier, || {
                    self.silent_measure(|m| m.measure_text(identifier, style))
                });
                NodeClass::Splittable {
                    text: Cow::Borrowed(identifier),
                    children: Cow::Borrowed(&node.children),
                }
            }
            NodeContent::Template(template) => {
                self.report_unforced_with("translatable", &template.key, || {
                    self.silent_measure(|m| m.template_width(template, style))
                });
                let (head, mut nodes) = template.expand();
                if nodes.is_empty() {
                    return NodeClass::Splittable {
                        text: Cow::Borrowed(head),
                        children: Cow::Borrowed(&node.children),
                    };
                }
                nodes.extend(node.children.iter().cloned());
                NodeClass::Splittable {
                    text: Cow::Borrowed(head),
                    children: Cow::Owned(nodes),
                }
            }
        }
    }

    fn template_width(&self, template: &Template, style: &Style) -> f64 {
        let pattern = self.measure_text(&template.stripped_pattern(), style);
        (0..template.placeholder_count()).fold(pattern, |total, index| {
            total + self.measure_with(&template.substitution(index), style)
        })
    }

    fn silent_measure<F>(&self, f: F) -> f64
    where
        F: FnOnce(&NodeMeasurer<'_>) -> f64,
    {
        let silent = Diagnostics::silent();
        f(&NodeMeasurer::new(self.store, &silent))
    }

    fn report_unforced(&self, kind: &'static str, detail: &str, width: f64) {
        self.report_unforced_with(kind, detail, || width);
    }

    fn report_unforced_with<F>(&self, kind: &'static str, detail: &str, width: F)
    where
        F: FnOnce() -> f64,
    {
        self.diagnostics
            .report(DiagnosticKind::UnforcedClientNode, || {
                LayoutDiagnostic::UnforcedClientNode {
                    kind,
                    detail: detail.into(),
                    fallback_width: width(),
                }
            });
    }
}
