//! Caller-contract errors for layout operations.
//!
//! Measurement and segmentation never fail: every missing font, glyph or
//! unresolved node has a defined fallback (see [`crate::diagnostics`]). Only
//! a misconfigured layout request is reported as an error.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

/// Error category for layout requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutErrorKind {
    /// Target width minus padding leaves no room for content.
    InvalidContentWidth,
    /// Resolution was requested but no node resolver is installed.
    ResolverMissing,
}

impl fmt::Display for LayoutErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidContentWidth => "content_width",
            Self::ResolverMissing => "resolver",
        };
        f.write_str(name)
    }
}

/// Structured error for layout requests.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutError {
    /// Error category.
    pub kind: LayoutErrorKind,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: Box<str>,
    /// Optional geometry context of the rejected request.
    pub context: Option<Box<LayoutErrorContext>>,
}

/// Geometry of the layout request that was rejected.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutErrorContext {
    /// Requested outer width in pixels.
    pub width: f64,
    /// Requested left padding in pixels.
    pub padding_left: f64,
    /// Requested right padding in pixels.
    pub padding_right: f64,
}

impl LayoutError {
    /// Create an error with a kind, stable code and message.
    pub fn new(kind: LayoutErrorKind, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into().into_boxed_str(),
            context: None,
        }
    }

    /// Attach the request geometry.
    pub fn with_geometry(mut self, width: f64, padding_left: f64, padding_right: f64) -> Self {
        self.context = Some(Box::new(LayoutErrorContext {
            width,
            padding_left,
            padding_right,
        }));
        self
    }

    /// Content width (`width - padding_left - padding_right`) is not a
    /// positive finite number.
    pub fn content_width(width: f64, padding_left: f64, padding_right: f64) -> Self {
        let content_width = width - padding_left - padding_right;
        Self::new(
            LayoutErrorKind::InvalidContentWidth,
            "CONTENT_WIDTH_NON_POSITIVE",
            alloc::format!(
                "Content width must be positive after applying padding (got {})",
                content_width
            ),
        )
        .with_geometry(width, padding_left, padding_right)
    }

    /// Resolution requested without a resolver.
    pub fn resolver_missing() -> Self {
        Self::new(
            LayoutErrorKind::ResolverMissing,
            "RESOLVER_MISSING",
            "An actor context was supplied but the layout context has no node resolver",
        )
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.kind, self.code, self.message)?;
        if let Some(ctx) = self.context.as_deref() {
            write!(
                f,
                " [width={} padding_left={} padding_right={}]",
                ctx.width, ctx.padding_left, ctx.padding_right
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for LayoutError {}
