//! Styled text tree: the input model for measurement and layout.

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::font_metrics::FontId;

/// Placeholder token recognized in template fallback patterns.
pub const PLACEHOLDER: &str = "%s";

/// Inheritable text style. `None` fields inherit from the parent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub font: Option<FontId>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underlined: Option<bool>,
    pub strikethrough: Option<bool>,
    pub obfuscated: Option<bool>,
    /// Color name or `#rrggbb`; carried through layout, never measured.
    pub color: Option<String>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, font: FontId) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// This style with every unset field taken from `parent`.
    pub fn merge(&self, parent: &Style) -> Style {
        Style {
            font: self.font.clone().or_else(|| parent.font.clone()),
            bold: self.bold.or(parent.bold),
            italic: self.italic.or(parent.italic),
            underlined: self.underlined.or(parent.underlined),
            strikethrough: self.strikethrough.or(parent.strikethrough),
            obfuscated: self.obfuscated.or(parent.obfuscated),
            color: self.color.clone().or_else(|| parent.color.clone()),
        }
    }

    /// Font used for measurement, defaulting to `minecraft:default`.
    pub fn effective_font(&self) -> Cow<'_, FontId> {
        match &self.font {
            Some(font) => Cow::Borrowed(font),
            None => Cow::Owned(FontId::default_font()),
        }
    }

    pub fn is_bold(&self) -> bool {
        self.bold.unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        *self == Style::default()
    }
}

/// Kinds of nodes that are measured and placed as one unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AtomicKind {
    /// Inline sprite glyph, fixed 8 px.
    Sprite(String),
    /// Scoreboard value, resolved server-side.
    Score { name: String, objective: String },
    /// Entity selector, resolved server-side.
    Selector(String),
    /// Entity NBT path, resolved server-side.
    EntityNbt(String),
    /// Block entity NBT path, resolved server-side.
    BlockNbt(String),
    /// Command storage NBT path, resolved server-side.
    StorageNbt(String),
    /// Precise spacer of an exact pixel width.
    Spacer(f64),
}

impl AtomicKind {
    /// Stable kind name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sprite(_) => "sprite",
            Self::Score { .. } => "score",
            Self::Selector(_) => "selector",
            Self::EntityNbt(_) => "entity_nbt",
            Self::BlockNbt(_) => "block_nbt",
            Self::StorageNbt(_) => "storage_nbt",
            Self::Spacer(_) => "spacer",
        }
    }

    /// Whether only the server can turn this node into text.
    pub fn is_server_resolved(&self) -> bool {
        matches!(
            self,
            Self::Score { .. }
                | Self::Selector(_)
                | Self::EntityNbt(_)
                | Self::BlockNbt(_)
                | Self::StorageNbt(_)
        )
    }

    /// Short description of the node's payload.
    pub fn detail(&self) -> String {
        match self {
            Self::Sprite(id) => id.clone(),
            Self::Score { name, objective } => alloc::format!("{}/{}", name, objective),
            Self::Selector(pattern) => pattern.clone(),
            Self::EntityNbt(path) | Self::BlockNbt(path) | Self::StorageNbt(path) => path.clone(),
            Self::Spacer(width) => alloc::format!("{}px", width),
        }
    }
}

/// Translatable text with a fallback pattern and ordered arguments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub key: String,
    pub arguments: Vec<StyledNode>,
    /// Pattern containing `%s` placeholders, used when no translation applies.
    pub fallback_pattern: String,
}

impl Template {
    pub fn new(key: impl Into<String>, fallback_pattern: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            arguments: Vec::new(),
            fallback_pattern: fallback_pattern.into(),
        }
    }

    pub fn with_argument(mut self, argument: StyledNode) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Number of `%s` placeholders in the fallback pattern.
    pub fn placeholder_count(&self) -> usize {
        self.fallback_pattern.matches(PLACEHOLDER).count()
    }

    /// Whether the supplied arguments are used for substitution.
    ///
    /// With fewer arguments than placeholders none of them are trusted and every
    /// placeholder renders as the literal `%s`.
    pub fn arguments_trusted(&self) -> bool {
        self.arguments.len() >= self.placeholder_count()
    }

    /// The fallback pattern with every placeholder removed.
    pub fn stripped_pattern(&self) -> String {
        self.fallback_pattern.replace(PLACEHOLDER, "")
    }

    /// Node substituted for placeholder `index`.
    pub fn substitution(&self, index: usize) -> Cow<'_, StyledNode> {
        match self.arguments.get(index) {
            Some(argument) if self.arguments_trusted() => Cow::Borrowed(argument),
            _ => Cow::Owned(StyledNode::text(PLACEHOLDER)),
        }
    }

    /// Expand into leading text plus an ordered node list.
    ///
    /// Pattern text between placeholders becomes plain text nodes interleaved
    /// with the substituted arguments; empty pattern pieces are omitted.
    pub fn expand(&self) -> (&str, Vec<StyledNode>) {
        let mut parts = self.fallback_pattern.split(PLACEHOLDER);
        let head = parts.next().unwrap_or("");
        let mut nodes = Vec::new();
        for (index, part) in parts.enumerate() {
            nodes.push(self.substitution(index).into_owned());
            if !part.is_empty() {
                nodes.push(StyledNode::text(part));
            }
        }
        (head, nodes)
    }
}

/// What a node renders before its children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NodeContent {
    /// Literal text; may contain `\n`.
    Text(String),
    /// Indivisible node.
    Atomic(AtomicKind),
    /// Translatable text with arguments.
    Template(Template),
    /// Key binding rendered by the client, measured as its identifier.
    Keybind(String),
}

/// A styled node with ordered children rendered after its own content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StyledNode {
    pub content: NodeContent,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub children: Vec<StyledNode>,
}

impl StyledNode {
    pub fn new(content: NodeContent) -> Self {
        Self {
            content,
            style: Style::default(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeContent::Text(text.into()))
    }

    /// Empty text node, typically a container for children.
    pub fn empty() -> Self {
        Self::text("")
    }

    pub fn newline() -> Self {
        Self::text("\n")
    }

    pub fn atomic(kind: AtomicKind) -> Self {
        Self::new(NodeContent::Atomic(kind))
    }

    pub fn sprite(id: impl Into<String>) -> Self {
        Self::atomic(AtomicKind::Sprite(id.into()))
    }

    pub fn score(name: impl Into<String>, objective: impl Into<String>) -> Self {
        Self::atomic(AtomicKind::Score {
            name: name.into(),
            objective: objective.into(),
        })
    }

    pub fn selector(pattern: impl Into<String>) -> Self {
        Self::atomic(AtomicKind::Selector(pattern.into()))
    }

    pub fn entity_nbt(path: impl Into<String>) -> Self {
        Self::atomic(AtomicKind::EntityNbt(path.into()))
    }

    pub fn block_nbt(path: impl Into<String>) -> Self {
        Self::atomic(AtomicKind::BlockNbt(path.into()))
    }

    pub fn storage_nbt(path: impl Into<String>) -> Self {
        Self::atomic(AtomicKind::StorageNbt(path.into()))
    }

    pub fn spacer(width: f64) -> Self {
        Self::atomic(AtomicKind::Spacer(width))
    }

    pub fn keybind(identifier: impl Into<String>) -> Self {
        Self::new(NodeContent::Keybind(identifier.into()))
    }

    pub fn template(template: Template) -> Self {
        Self::new(NodeContent::Template(template))
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.style.bold = Some(bold);
        self
    }

    pub fn font(mut self, font: FontId) -> Self {
        self.style.font = Some(font);
        self
    }

    /// Append a child rendered after this node's content and earlier children.
    pub fn append(mut self, child: StyledNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = StyledNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// The node's content without its children.
    pub fn shallow(&self) -> StyledNode {
        Self {
            content: self.content.clone(),
            style: self.style.clone(),
            children: Vec::new(),
        }
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self.content, NodeContent::Atomic(_))
    }

    /// Flattened text of the whole tree.
    ///
    /// Templates contribute their expanded fallback, keybinds their identifier
    /// and atomic nodes nothing.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.push_plain_text(&mut out);
        out
    }

    fn push_plain_text(&self, out: &mut String) {
        match &self.content {
            NodeContent::Text(text) | NodeContent::Keybind(text) => out.push_str(text),
            NodeContent::Atomic(_) => {}
            NodeContent::Template(template) => {
                let (head, nodes) = template.expand();
                out.push_str(head);
                for node in &nodes {
                    node.push_plain_text(out);
                }
            }
        }
        for child in &self.children {
            child.push_plain_text(out);
        }
    }
}

impl From<&str> for StyledNode {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for StyledNode {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}
