//! Per-codepoint glyph widths and font reference chains.
//!
//! A [`FontMetricsStore`] is an immutable snapshot. Reloading metrics builds a
//! new store and publishes it through a [`MetricsHandle`]; layouts already
//! running keep the snapshot they started with.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::{PoisonError, RwLock};

use crate::diagnostics::{DiagnosticKind, Diagnostics, LayoutDiagnostic};

/// Advance used for any glyph no font can supply.
pub const DEFAULT_CHAR_WIDTH: f64 = 5.0;

/// Namespace assumed when a font identifier has none.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

const DEFAULT_FONT_PATH: &str = "default";

/// Interned `namespace:path` font identifier.
///
/// Cloning shares the underlying string; equality and hashing are by value.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FontId(Arc<str>);

impl FontId {
    /// Build from an explicit namespace and path.
    pub fn new(namespace: &str, path: &str) -> Self {
        Self(Arc::from(alloc::format!("{}:{}", namespace, path)))
    }

    /// Parse `namespace:path`, defaulting the namespace to `minecraft`.
    pub fn parse(value: &str) -> Self {
        match value.split_once(':') {
            Some(_) => Self(Arc::from(value)),
            None => Self::new(DEFAULT_NAMESPACE, value),
        }
    }

    /// The font used when no style in the tree names one.
    pub fn default_font() -> Self {
        Self::new(DEFAULT_NAMESPACE, DEFAULT_FONT_PATH)
    }

    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map(|(ns, _)| ns).unwrap_or(DEFAULT_NAMESPACE)
    }

    pub fn path(&self) -> &str {
        self.0.split_once(':').map(|(_, path)| path).unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FontId {
    fn default() -> Self {
        Self::default_font()
    }
}

impl From<String> for FontId {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for FontId {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<FontId> for String {
    fn from(value: FontId) -> Self {
        String::from(&*value.0)
    }
}

impl fmt::Debug for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FontId({})", self.0)
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Glyph widths and fallback chain of one font.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontMetrics {
    /// Width the font declares for glyphs it does not list.
    ///
    /// Informational: lookups that miss fall back to the pack-wide default.
    pub default_width: f64,
    /// Codepoint to advance width. Negative and zero widths are valid.
    pub widths: BTreeMap<u32, f64>,
    /// Fonts consulted in order when a codepoint is missing here.
    pub references: Vec<FontId>,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            default_width: DEFAULT_CHAR_WIDTH,
            widths: BTreeMap::new(),
            references: Vec::new(),
        }
    }
}

impl FontMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the width of `ch`.
    pub fn with_width(mut self, ch: char, width: f64) -> Self {
        self.widths.insert(ch as u32, width);
        self
    }

    /// Set the same width for every character of `chars`.
    pub fn with_uniform_width(mut self, chars: &str, width: f64) -> Self {
        for ch in chars.chars() {
            self.widths.insert(ch as u32, width);
        }
        self
    }

    /// Append `font` to the reference chain; duplicates are ignored.
    pub fn with_reference(mut self, font: FontId) -> Self {
        if !self.references.contains(&font) {
            self.references.push(font);
        }
        self
    }

    /// Width listed by this font only, without following references.
    pub fn direct_width(&self, ch: char) -> Option<f64> {
        self.widths.get(&(ch as u32)).copied()
    }

    pub fn has_references(&self) -> bool {
        !self.references.is_empty()
    }
}

/// Outcome of a width lookup through a reference chain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WidthLookup {
    /// A font on the chain lists the codepoint.
    Found(f64),
    /// The requested font is not in the store.
    MissingFont,
    /// No font on the chain lists the codepoint.
    MissingWidth,
    /// The font is already on the current lookup path.
    CircularReference,
}

impl WidthLookup {
    pub fn width(self) -> Option<f64> {
        match self {
            Self::Found(width) => Some(width),
            _ => None,
        }
    }
}

type VisitedFonts = SmallVec<[FontId; 8]>;

/// Immutable snapshot of every font's metrics plus the pack default width.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontMetricsStore {
    default_width: f64,
    fonts: BTreeMap<FontId, FontMetrics>,
}

impl Default for FontMetricsStore {
    fn default() -> Self {
        Self {
            default_width: DEFAULT_CHAR_WIDTH,
            fonts: BTreeMap::new(),
        }
    }
}

impl FontMetricsStore {
    pub fn builder() -> FontMetricsStoreBuilder {
        FontMetricsStoreBuilder::default()
    }

    /// Pack-wide fallback width.
    pub fn default_width(&self) -> f64 {
        self.default_width
    }

    pub fn font(&self, font: &FontId) -> Option<&FontMetrics> {
        self.fonts.get(font)
    }

    pub fn fonts(&self) -> impl Iterator<Item = (&FontId, &FontMetrics)> {
        self.fonts.iter()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Look up the width of `ch` in `font`, following references depth-first.
    ///
    /// A width listed directly by a font wins over its references, whatever its
    /// value. References are tried in declared order and references already on
    /// the lookup path are skipped, so cyclic chains terminate.
    pub fn resolve(&self, font: &FontId, ch: char) -> WidthLookup {
        let mut visited = VisitedFonts::new();
        self.resolve_in(font, ch, &mut visited, &mut |_: &FontId, _: &FontId| {})
    }

    /// Width of `ch` in `font`, or the pack default when the lookup fails.
    ///
    /// Failed lookups are reported to `diagnostics` by kind; the returned
    /// value does not depend on which diagnostics are enabled.
    pub fn width_of(&self, font: &FontId, ch: char, diagnostics: &Diagnostics) -> f64 {
        let mut visited = VisitedFonts::new();
        let lookup = self.resolve_in(font, ch, &mut visited, &mut |from: &FontId, to: &FontId| {
            diagnostics.report(DiagnosticKind::CircularReference, || {
                LayoutDiagnostic::CircularReference {
                    font: from.clone(),
                    reference: to.clone(),
                }
            });
        });
        match lookup {
            WidthLookup::Found(width) => return width,
            WidthLookup::MissingFont => {
                diagnostics.report(DiagnosticKind::MissingFont, || {
                    LayoutDiagnostic::MissingFont { font: font.clone() }
                });
            }
            WidthLookup::MissingWidth => {
                diagnostics.report(DiagnosticKind::MissingWidth, || {
                    LayoutDiagnostic::MissingWidth {
                        font: font.clone(),
                        codepoint: ch,
                    }
                });
            }
            WidthLookup::CircularReference => {
                diagnostics.report(DiagnosticKind::CircularReference, || {
                    LayoutDiagnostic::CircularReference {
                        font: font.clone(),
                        reference: font.clone(),
                    }
                });
            }
        }
        self.default_width
    }

    fn resolve_in(
        &self,
        font: &FontId,
        ch: char,
        visited: &mut VisitedFonts,
        on_cycle: &mut dyn FnMut(&FontId, &FontId),
    ) -> WidthLookup {
        let Some(metrics) = self.fonts.get(font) else {
            return WidthLookup::MissingFont;
        };
        if visited.contains(font) {
            return WidthLookup::CircularReference;
        }
        if let Some(width) = metrics.direct_width(ch) {
            return WidthLookup::Found(width);
        }

        visited.push(font.clone());
        let mut found = None;
        for reference in &metrics.references {
            if visited.contains(reference) {
                on_cycle(font, reference);
                continue;
            }
            if let WidthLookup::Found(width) = self.resolve_in(reference, ch, visited, on_cycle) {
                found = Some(width);
                break;
            }
        }
        visited.pop();

        match found {
            Some(width) => WidthLookup::Found(width),
            None => WidthLookup::MissingWidth,
        }
    }
}

/// Builder for [`FontMetricsStore`].
#[derive(Clone, Debug)]
pub struct FontMetricsStoreBuilder {
    store: FontMetricsStore,
}

impl Default for FontMetricsStoreBuilder {
    fn default() -> Self {
        Self {
            store: FontMetricsStore::default(),
        }
    }
}

impl FontMetricsStoreBuilder {
    pub fn default_width(mut self, width: f64) -> Self {
        self.store.default_width = width;
        self
    }

    /// Register `metrics` under `font`, replacing any earlier entry.
    pub fn font(mut self, font: FontId, metrics: FontMetrics) -> Self {
        self.store.fonts.insert(font, metrics);
        self
    }

    pub fn build(self) -> FontMetricsStore {
        self.store
    }
}

#[derive(Debug)]
struct Published {
    store: Arc<FontMetricsStore>,
    generation: u64,
}

/// Shared pointer to the current store snapshot.
///
/// Readers clone the `Arc` and keep using it; a reload swaps in a fully built
/// store in one step, so no reader observes a partially updated snapshot.
#[derive(Debug)]
pub struct MetricsHandle {
    current: RwLock<Published>,
}

impl MetricsHandle {
    pub fn new(store: FontMetricsStore) -> Self {
        Self {
            current: RwLock::new(Published {
                store: Arc::new(store),
                generation: 0,
            }),
        }
    }

    /// The currently published store.
    pub fn snapshot(&self) -> Arc<FontMetricsStore> {
        let published = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&published.store)
    }

    /// The currently published store with its generation number.
    pub fn snapshot_with_generation(&self) -> (Arc<FontMetricsStore>, u64) {
        let published = self.current.read().unwrap_or_else(PoisonError::into_inner);
        (Arc::clone(&published.store), published.generation)
    }

    pub fn generation(&self) -> u64 {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// Replace the published store; returns the new generation.
    pub fn publish(&self, store: FontMetricsStore) -> u64 {
        let store = Arc::new(store);
        let mut published = self.current.write().unwrap_or_else(PoisonError::into_inner);
        published.store = store;
        published.generation = published.generation.wrapping_add(1);
        log::debug!(
            "published font metrics generation {} ({} fonts)",
            published.generation,
            published.store.len()
        );
        published.generation
    }

    /// Build a store with `load` and publish it if loading succeeds.
    ///
    /// `load` runs before the handle is touched; on error the previous store
    /// stays published.
    pub fn reload_with<E, F>(&self, load: F) -> Result<u64, E>
    where
        F: FnOnce() -> Result<FontMetricsStore, E>,
    {
        let store = load()?;
        Ok(self.publish(store))
    }
}

impl Default for MetricsHandle {
    fn default() -> Self {
        Self::new(FontMetricsStore::default())
    }
}
