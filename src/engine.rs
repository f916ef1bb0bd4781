//! Engine: construction-time configuration and the style submission entry
//! point.
//!
//! An [`Engine`] owns every piece of shared mutable state — the rule
//! caches, the identifier counters, the sheet slots — for exactly its own
//! lifetime. It is single-threaded and synchronous: one submission runs
//! normalize → transform → cache lookup → emission to completion before
//! returning. Callers construct and hold the engine explicitly; there is
//! no global instance.

use std::collections::HashMap;

use crate::diagnostics::{DiagnosticSink, LogSink};
use crate::flatten::{flatten, flatten_bag, FlatGroup, FlatValue, PropertyBag};
use crate::hydrate::hydrate_chunk;
use crate::ident::IdentSequence;
use crate::router::{MediaComparator, SheetRouter, SheetSlot};
use crate::selector::SelectorContext;
use crate::sheet::{BackendError, SheetBackend};
use crate::style::{FontSource, Keyframes, Style};

// ---------------------------------------------------------------------------
// EngineOptions
// ---------------------------------------------------------------------------

/// The transformer hook: receives the flat property bag of one selector
/// context after shorthand expansion and before caching, and returns the
/// bag that gets cached and emitted. Enables vendor prefixing and derived
/// properties.
pub type Transformer = Box<dyn Fn(PropertyBag) -> PropertyBag>;

/// Construction-time configuration.
pub struct EngineOptions {
    /// Atomic mode: one rule per declaration, maximizing cross-call reuse.
    /// Non-atomic mode: one combined rule per selector context. Defaults
    /// to atomic.
    pub atomic: bool,
    /// Optional property-bag transformer hook.
    pub transformer: Option<Transformer>,
    /// Optional comparator for the document order of media-scoped sheets.
    /// Without one, media sheets keep first-seen order.
    pub media_order: Option<MediaComparator>,
    /// Optional diagnostics sink; defaults to the `log`-based
    /// [`LogSink`].
    pub diagnostics: Option<Box<dyn DiagnosticSink>>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            transformer: None,
            media_order: None,
            diagnostics: None,
        }
    }
}

impl EngineOptions {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select atomic or non-atomic caching mode (builder).
    pub fn with_atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    /// Set the transformer hook (builder).
    pub fn with_transformer(
        mut self,
        transformer: impl Fn(PropertyBag) -> PropertyBag + 'static,
    ) -> Self {
        self.transformer = Some(Box::new(transformer));
        self
    }

    /// Set the media order comparator (builder).
    pub fn with_media_order(
        mut self,
        compare: impl Fn(&str, &str) -> std::cmp::Ordering + 'static,
    ) -> Self {
        self.media_order = Some(Box::new(compare));
        self
    }

    /// Set the diagnostics sink (builder).
    pub fn with_diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.diagnostics = Some(Box::new(sink));
        self
    }
}

// ---------------------------------------------------------------------------
// InjectError
// ---------------------------------------------------------------------------

/// A failed style submission.
///
/// Only a backend append rejection fails a call; shape problems are
/// reported on the diagnostics channel instead. Identifiers emitted
/// earlier in the same call remain valid and cached — they are carried in
/// `committed`.
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    /// The sheet backend rejected an append.
    #[error("sheet backend rejected a rule")]
    Backend {
        /// Space-joined identifiers already emitted by this call.
        committed: String,
        /// The backend's reason.
        #[source]
        source: BackendError,
    },
}

impl InjectError {
    /// Identifiers that were already emitted (and stay valid) when the
    /// call failed.
    pub fn committed(&self) -> &str {
        match self {
            InjectError::Backend { committed, .. } => committed,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The style-injection engine.
pub struct Engine {
    atomic: bool,
    transformer: Option<Transformer>,
    sink: Box<dyn DiagnosticSink>,
    router: SheetRouter,
    classes: IdentSequence,
    keyframe_names: IdentSequence,
    font_family_names: IdentSequence,
    /// Memo from (context, resolved pre-transform bag) to the identifiers
    /// it produced, so a repeated bag short-circuits before the
    /// transformer runs.
    group_memo: HashMap<String, Vec<String>>,
}

impl Engine {
    /// Create an engine that creates its own [`MemorySheet`]-backed slots
    /// on demand, plain sheet first.
    ///
    /// [`MemorySheet`]: crate::sheet::MemorySheet
    pub fn new(options: EngineOptions) -> Self {
        Self::with_sheets(Vec::new(), options)
    }

    /// Create an engine over pre-existing backing sheets, in document
    /// order. Each sheet is hydrated before any injection: existing rules
    /// seed the caches and bump the identifier counters, so identical
    /// declarations reuse their server-rendered identifiers.
    pub fn with_sheets(sheets: Vec<Box<dyn SheetBackend>>, options: EngineOptions) -> Self {
        let mut router = SheetRouter::new(options.media_order);
        let mut classes = IdentSequence::new();
        let mut keyframe_names = IdentSequence::new();
        let mut font_family_names = IdentSequence::new();

        for backend in sheets {
            let key = router.adopt(backend);
            let slot = router.slot_mut(key);
            for chunk in slot.backend.rules() {
                hydrate_chunk(
                    &chunk,
                    &mut slot.injector,
                    &mut classes,
                    &mut keyframe_names,
                    &mut font_family_names,
                );
            }
        }

        Self {
            atomic: options.atomic,
            transformer: options.transformer,
            sink: options
                .diagnostics
                .unwrap_or_else(|| Box::new(LogSink)),
            router,
            classes,
            keyframe_names,
            font_family_names,
            group_memo: HashMap::new(),
        }
    }

    /// Submit one style tree. Returns the space-joined identifiers in
    /// first-encounter order of the underlying declarations (duplicates
    /// collapse to their first occurrence).
    pub fn inject_style(&mut self, style: &Style) -> Result<String, InjectError> {
        let groups = flatten(style, self.sink.as_mut());
        let mut emitted: Vec<String> = Vec::new();
        for group in &groups {
            if let Err(source) = self.process_group(group, &mut emitted) {
                return Err(InjectError::Backend {
                    committed: emitted.join(" "),
                    source,
                });
            }
        }
        Ok(emitted.join(" "))
    }

    /// Submit an ordered sequence of style trees, deep-merged left to
    /// right (later entries override earlier ones at the same selector
    /// context) before injection.
    pub fn inject_styles(&mut self, styles: &[Style]) -> Result<String, InjectError> {
        let merged = styles
            .iter()
            .fold(Style::new(), |merged, style| merged.merge(style));
        self.inject_style(&merged)
    }

    /// The per-slot CSS text in document order: `(media, css)` pairs, the
    /// plain slot first once it exists.
    pub fn css_texts(&self) -> Vec<(Option<String>, String)> {
        self.router
            .iter_in_order()
            .map(|slot| (slot.media.clone(), slot.backend.rules().concat()))
            .collect()
    }

    /// Render every slot as a `<style>` tag for server-side markup. The
    /// attribute order and `data-restyle` marker let a client engine find
    /// and hydrate the same sheets.
    pub fn markup(&self) -> String {
        let mut out = String::new();
        for (media, css) in self.css_texts() {
            match media {
                Some(media) => {
                    out.push_str(&format!(
                        "<style data-restyle media=\"{media}\">{css}</style>"
                    ));
                }
                None => out.push_str(&format!("<style data-restyle>{css}</style>")),
            }
        }
        out
    }

    /// Resolve pending named blocks, consult the memo, transform, and
    /// emit one context group. Successfully emitted identifiers are
    /// pushed into `emitted` as they happen, so a mid-group backend
    /// failure keeps the earlier ones committed.
    fn process_group(
        &mut self,
        group: &FlatGroup,
        emitted: &mut Vec<String>,
    ) -> Result<(), BackendError> {
        let mut resolved = PropertyBag::new();
        for (property, value) in &group.bag {
            match value {
                FlatValue::Text(text) => {
                    resolved.insert(property.clone(), text.clone());
                }
                FlatValue::Keyframes(keyframes) => {
                    let name = self.resolve_keyframes(keyframes)?;
                    resolved.insert(property.clone(), name);
                }
                FlatValue::FontStack(stack) => {
                    let family = self.resolve_font_stack(stack)?;
                    resolved.insert(property.clone(), family);
                }
            }
        }
        if resolved.is_empty() {
            return Ok(());
        }

        let memo_key = memo_key(&group.context, &resolved);
        if let Some(ids) = self.group_memo.get(&memo_key) {
            for id in ids {
                push_unique(emitted, id);
            }
            return Ok(());
        }

        let resolved = match &self.transformer {
            Some(transform) => transform(resolved),
            None => resolved,
        };
        if resolved.is_empty() {
            return Ok(());
        }

        let pseudo = group.context.pseudo_suffix();
        let key = self.router.route(group.context.media());
        let SheetSlot {
            injector, backend, ..
        } = self.router.slot_mut(key);

        let mut ids = Vec::new();
        if self.atomic {
            for (property, value) in &resolved {
                let declaration = format!("{property}:{value}");
                let id = injector.inject_class(
                    &pseudo,
                    &declaration,
                    &mut self.classes,
                    backend.as_mut(),
                )?;
                push_unique(emitted, &id);
                ids.push(id);
            }
        } else {
            let block = join_bag(&resolved);
            let id =
                injector.inject_class(&pseudo, &block, &mut self.classes, backend.as_mut())?;
            push_unique(emitted, &id);
            ids.push(id);
        }

        self.group_memo.insert(memo_key, ids);
        Ok(())
    }

    /// Emit (or reuse) a keyframes block and return its name. The block
    /// always lives in the plain slot.
    fn resolve_keyframes(&mut self, keyframes: &Keyframes) -> Result<String, BackendError> {
        let mut body = String::new();
        for (offset, bag) in keyframes.iter() {
            let flat = flatten_bag(bag, self.sink.as_mut());
            let flat = match &self.transformer {
                Some(transform) => transform(flat),
                None => flat,
            };
            body.push_str(offset);
            body.push('{');
            body.push_str(&join_bag(&flat));
            body.push('}');
        }

        let key = self.router.plain_key();
        let SheetSlot {
            injector, backend, ..
        } = self.router.slot_mut(key);
        injector.inject_keyframes(&body, &mut self.keyframe_names, backend.as_mut())
    }

    /// Emit (or reuse) the font faces of a fallback stack and return the
    /// comma-joined `font-family` value in original order.
    fn resolve_font_stack(&mut self, stack: &[FontSource]) -> Result<String, BackendError> {
        let mut families = Vec::new();
        for source in stack {
            match source {
                FontSource::Family(name) => families.push(name.clone()),
                FontSource::Face(face) => {
                    let mut flat = flatten_bag(face.descriptors(), self.sink.as_mut());
                    if let Some(transform) = &self.transformer {
                        flat = transform(flat);
                    }
                    // The family name is engine-assigned; a caller-supplied
                    // one would make the fingerprint unstable.
                    flat.shift_remove("font-family");
                    let descriptors = join_bag(&flat);

                    let key = self.router.plain_key();
                    let SheetSlot {
                        injector, backend, ..
                    } = self.router.slot_mut(key);
                    let name = injector.inject_font_face(
                        &descriptors,
                        &mut self.font_family_names,
                        backend.as_mut(),
                    )?;
                    families.push(name);
                }
            }
        }
        Ok(families.join(","))
    }
}

fn join_bag(bag: &PropertyBag) -> String {
    bag.iter()
        .map(|(property, value)| format!("{property}:{value}"))
        .collect::<Vec<_>>()
        .join(";")
}

fn memo_key(context: &SelectorContext, bag: &PropertyBag) -> String {
    let mut key = String::new();
    if let Some(media) = context.media() {
        key.push_str(media);
    }
    key.push('\u{1}');
    key.push_str(&context.pseudo_suffix());
    key.push('\u{1}');
    for (property, value) in bag {
        key.push_str(property);
        key.push(':');
        key.push_str(value);
        key.push(';');
    }
    key
}

fn push_unique(emitted: &mut Vec<String>, id: &str) {
    if !emitted.iter().any(|existing| existing == id) {
        emitted.push(id.to_string());
    }
}
