//! Classified, individually toggleable warnings emitted during measurement.
//!
//! None of these conditions abort layout. Each has a fallback value and the
//! emitted diagnostic never changes that value.

use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::font_metrics::FontId;

/// Diagnostic category, one toggle each in [`DiagnosticConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    MissingFont,
    MissingWidth,
    CircularReference,
    UnresolvedServerNode,
    UnforcedClientNode,
}

/// A single fallback event observed while measuring.
#[derive(Clone, Debug, PartialEq)]
pub enum LayoutDiagnostic {
    /// The requested font is not in the metrics store.
    MissingFont { font: FontId },
    /// Neither the font nor its reference chain has a width for `codepoint`.
    MissingWidth { font: FontId, codepoint: char },
    /// A reference back to a font already on the lookup path was skipped.
    CircularReference { font: FontId, reference: FontId },
    /// A node that only the server can resolve was measured as empty.
    UnresolvedServerNode { kind: &'static str, detail: String },
    /// A node whose rendering depends on client settings was measured with a
    /// fallback text.
    UnforcedClientNode {
        kind: &'static str,
        detail: String,
        fallback_width: f64,
    },
}

impl LayoutDiagnostic {
    /// Category of this diagnostic.
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::MissingFont { .. } => DiagnosticKind::MissingFont,
            Self::MissingWidth { .. } => DiagnosticKind::MissingWidth,
            Self::CircularReference { .. } => DiagnosticKind::CircularReference,
            Self::UnresolvedServerNode { .. } => DiagnosticKind::UnresolvedServerNode,
            Self::UnforcedClientNode { .. } => DiagnosticKind::UnforcedClientNode,
        }
    }
}

impl fmt::Display for LayoutDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFont { font } => {
                write!(f, "font '{}' not found, using the pack default width", font)
            }
            Self::MissingWidth { font, codepoint } => write!(
                f,
                "character {:?} (U+{:04X}) not found in font '{}' or its references, using the pack default width",
                codepoint, *codepoint as u32, font
            ),
            Self::CircularReference { font, reference } => write!(
                f,
                "skipping circular reference from font '{}' to '{}'",
                font, reference
            ),
            Self::UnresolvedServerNode { kind, detail } => write!(
                f,
                "unresolved {} node '{}' measured as empty; resolve it server-side before layout",
                kind, detail
            ),
            Self::UnforcedClientNode {
                kind,
                detail,
                fallback_width,
            } => write!(
                f,
                "unforced {} node '{}' measured from its fallback text ({:.1}px); the client may render it differently",
                kind, detail, fallback_width
            ),
        }
    }
}

/// Per-kind toggles for diagnostic emission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticConfig {
    pub warn_on_missing_fonts: bool,
    pub warn_on_missing_widths: bool,
    /// Verbose: report every skipped reference cycle.
    pub report_circular_references: bool,
    pub warn_on_unresolved_server_nodes: bool,
    pub warn_on_unforced_client_nodes: bool,
}

impl DiagnosticConfig {
    /// Every kind disabled.
    pub fn silent() -> Self {
        Self {
            warn_on_missing_fonts: false,
            warn_on_missing_widths: false,
            report_circular_references: false,
            warn_on_unresolved_server_nodes: false,
            warn_on_unforced_client_nodes: false,
        }
    }

    /// Every kind enabled, including circular reference reports.
    pub fn verbose() -> Self {
        Self {
            report_circular_references: true,
            ..Self::default()
        }
    }

    /// Whether `kind` is emitted under this config.
    pub fn enables(&self, kind: DiagnosticKind) -> bool {
        match kind {
            DiagnosticKind::MissingFont => self.warn_on_missing_fonts,
            DiagnosticKind::MissingWidth => self.warn_on_missing_widths,
            DiagnosticKind::CircularReference => self.report_circular_references,
            DiagnosticKind::UnresolvedServerNode => self.warn_on_unresolved_server_nodes,
            DiagnosticKind::UnforcedClientNode => self.warn_on_unforced_client_nodes,
        }
    }
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            warn_on_missing_fonts: true,
            warn_on_missing_widths: true,
            report_circular_references: false,
            warn_on_unresolved_server_nodes: true,
            warn_on_unforced_client_nodes: true,
        }
    }
}

/// Callback receiving every enabled diagnostic.
pub type DiagnosticCallback = Arc<dyn Fn(&LayoutDiagnostic) + Send + Sync + 'static>;

/// Diagnostic router: toggles, `log` output and an optional callback sink.
#[derive(Clone)]
pub struct Diagnostics {
    config: DiagnosticConfig,
    log_enabled: bool,
    sink: Option<DiagnosticCallback>,
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("config", &self.config)
            .field("log_enabled", &self.log_enabled)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(DiagnosticConfig::default())
    }
}

impl Diagnostics {
    /// Route diagnostics enabled by `config` to the `log` facade.
    pub fn new(config: DiagnosticConfig) -> Self {
        Self {
            config,
            log_enabled: true,
            sink: None,
        }
    }

    /// Emit nothing.
    pub fn silent() -> Self {
        Self::new(DiagnosticConfig::silent())
    }

    /// Also deliver enabled diagnostics to `sink`.
    pub fn with_sink(mut self, sink: DiagnosticCallback) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Turn `log` output on or off without touching the sink.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.log_enabled = enabled;
        self
    }

    /// Active toggles.
    pub fn config(&self) -> DiagnosticConfig {
        self.config
    }

    /// Whether `kind` would be emitted.
    pub fn enabled(&self, kind: DiagnosticKind) -> bool {
        self.config.enables(kind) && (self.log_enabled || self.sink.is_some())
    }

    /// Emit the diagnostic built by `build` if `kind` is enabled.
    ///
    /// `build` is not called for disabled kinds.
    pub fn report<F>(&self, kind: DiagnosticKind, build: F)
    where
        F: FnOnce() -> LayoutDiagnostic,
    {
        if !self.enabled(kind) {
            return;
        }
        let diagnostic = build();
        if self.log_enabled {
            match kind {
                DiagnosticKind::CircularReference => log::debug!("{}", diagnostic),
                _ => log::warn!("{}", diagnostic),
            }
        }
        if let Some(sink) = &self.sink {
            sink(&diagnostic);
        }
    }
}
