//! # restyle
//!
//! An atomic CSS style-injection engine: nested, declarative style trees
//! in, deduplicated CSS rules and short reusable class names out.
//!
//! restyle decomposes a style tree (plain declarations, pseudo-selector
//! nesting, media-query nesting, keyframes and font-face blocks) into
//! minimal rule fragments, caches every fragment so it is injected exactly
//! once, and keeps server-rendered identifiers stable on the client
//! through hydration.
//!
//! ## Core Systems
//!
//! - **[`style`]** — The nested style tree model and deep merge
//! - **[`selector`]** — Selector contexts (media + ordered pseudo chain)
//! - **[`flatten`]** — Recursive-descent normalizer with shorthand
//!   expansion and the shorthand/longhand conflict policy
//! - **[`ident`]** — Dense `a..z, aa..` identifier enumeration
//! - **[`injector`]** — Per-sheet rule caches and single-point emission
//! - **[`router`]** — Sheet slots and the media document-ordering policy
//! - **[`sheet`]** — The backing sheet contract and in-memory backend
//! - **[`hydrate`]** — Cache re-seeding from pre-existing rule text
//! - **[`diagnostics`]** — Warning/error side channel
//! - **[`engine`]** — The [`Engine`] tying everything together
//!
//! ## Example
//!
//! ```
//! use restyle::{Engine, EngineOptions, Style};
//!
//! let mut engine = Engine::new(EngineOptions::new());
//! let classes = engine
//!     .inject_style(
//!         &Style::new()
//!             .set("color", "red")
//!             .set(":hover", Style::new().set("color", "green")),
//!     )
//!     .unwrap();
//! assert_eq!(classes, "a b");
//! // The same tree never injects twice.
//! let again = engine
//!     .inject_style(
//!         &Style::new()
//!             .set("color", "red")
//!             .set(":hover", Style::new().set("color", "green")),
//!     )
//!     .unwrap();
//! assert_eq!(again, "a b");
//! ```

// Input model
pub mod selector;
pub mod style;

// Normalization
pub mod flatten;

// Caching and emission
pub mod ident;
pub mod injector;
pub mod router;
pub mod sheet;

// Reconciliation
pub mod hydrate;

// Side channel
pub mod diagnostics;

// Entry point
pub mod engine;

pub use diagnostics::{BufferSink, Diagnostic, DiagnosticSink, LogSink};
pub use engine::{Engine, EngineOptions, InjectError, Transformer};
pub use flatten::PropertyBag;
pub use router::MediaComparator;
pub use sheet::{BackendError, MemorySheet, SheetBackend};
pub use style::{FontFace, FontSource, Keyframes, Scalar, Style, StyleValue};

// Proc macros (feature-gated)
#[cfg(feature = "macros")]
pub use restyle_macros::style;
