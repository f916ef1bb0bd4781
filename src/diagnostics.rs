//! Diagnostics channel: non-fatal warnings and per-declaration hard errors.
//!
//! Flattening never fails a call for a style-shape problem; it reports on
//! this side channel and keeps going. Only a sheet backend rejection fails
//! a call (see [`crate::engine::InjectError`]).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A diagnostic raised while flattening a style tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Shorthand group and longhand forms of the same property co-occur at
    /// one selector context. Recoverable: last-key-wins merge proceeds.
    AmbiguousShorthand {
        /// The shared root property, hyphenated (`border`).
        root: String,
        /// The selector context the mix occurred at.
        context: String,
    },
    /// One property was given irreconcilable shapes (a scalar shorthand
    /// next to longhands of the same root). The scalar declaration is
    /// dropped; the rest of the call proceeds.
    ShapeConflict {
        /// The conflicting root property, hyphenated.
        root: String,
        /// The selector context the conflict occurred at.
        context: String,
    },
    /// A media block nested inside another media block. The inner block is
    /// skipped.
    NestedMedia {
        /// The already-active media query.
        outer: String,
        /// The skipped inner query.
        inner: String,
    },
    /// A value kind that cannot appear at this position (a pseudo or media
    /// block inside a keyframes waypoint, a keyframes block inside a
    /// font-face descriptor, ..). The entry is skipped.
    InvalidValue {
        /// The offending key.
        key: String,
    },
}

impl Diagnostic {
    /// Returns `true` for hard (per-declaration) errors, `false` for
    /// warnings.
    pub fn is_error(&self) -> bool {
        matches!(self, Diagnostic::ShapeConflict { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::AmbiguousShorthand { root, context } => write!(
                f,
                "shorthand and longhand forms of `{root}` mix at `{context}`; the last key wins"
            ),
            Diagnostic::ShapeConflict { root, context } => write!(
                f,
                "`{root}` is given both a scalar shorthand and longhand values at `{context}`; \
                 the scalar is dropped"
            ),
            Diagnostic::NestedMedia { outer, inner } => write!(
                f,
                "`@media {inner}` nested inside `@media {outer}`; the inner block is skipped"
            ),
            Diagnostic::InvalidValue { key } => {
                write!(f, "`{key}` holds a value kind that is invalid here; skipped")
            }
        }
    }
}

/// A sink receiving diagnostics as they are raised.
pub trait DiagnosticSink {
    /// Report one diagnostic.
    fn report(&mut self, diagnostic: &Diagnostic);
}

/// The default sink: warnings go to `log::warn!`, hard errors to
/// `log::error!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: &Diagnostic) {
        if diagnostic.is_error() {
            log::error!("{diagnostic}");
        } else {
            log::warn!("{diagnostic}");
        }
    }
}

/// A sink that records diagnostics for inspection, sharable with the code
/// under test through cheap clones. Single-threaded by design, like the
/// engine itself.
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    inner: Rc<RefCell<Vec<Diagnostic>>>,
}

impl BufferSink {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn collected(&self) -> Vec<Diagnostic> {
        self.inner.borrow().clone()
    }

    /// Count of reported warnings (non-errors).
    pub fn warning_count(&self) -> usize {
        self.inner.borrow().iter().filter(|d| !d.is_error()).count()
    }

    /// Count of reported hard errors.
    pub fn error_count(&self) -> usize {
        self.inner.borrow().iter().filter(|d| d.is_error()).count()
    }
}

impl DiagnosticSink for BufferSink {
    fn report(&mut self, diagnostic: &Diagnostic) {
        self.inner.borrow_mut().push(diagnostic.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_conflict_is_an_error() {
        let conflict = Diagnostic::ShapeConflict {
            root: "border".into(),
            context: "".into(),
        };
        assert!(conflict.is_error());
        let ambiguous = Diagnostic::AmbiguousShorthand {
            root: "border".into(),
            context: "".into(),
        };
        assert!(!ambiguous.is_error());
    }

    #[test]
    fn buffer_sink_counts_by_severity() {
        let sink = BufferSink::new();
        let mut handle = sink.clone();
        handle.report(&Diagnostic::AmbiguousShorthand {
            root: "padding".into(),
            context: ":hover".into(),
        });
        handle.report(&Diagnostic::ShapeConflict {
            root: "border".into(),
            context: "".into(),
        });
        assert_eq!(sink.warning_count(), 1);
        assert_eq!(sink.error_count(), 1);
        assert_eq!(sink.collected().len(), 2);
    }

    #[test]
    fn display_names_the_root() {
        let d = Diagnostic::AmbiguousShorthand {
            root: "border".into(),
            context: ":hover".into(),
        };
        let text = d.to_string();
        assert!(text.contains("border"));
        assert!(text.contains(":hover"));
    }
}
