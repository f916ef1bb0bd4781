//! Style tree normalizer: recursive descent flattening.
//!
//! Walks a nested [`Style`] and produces one flat property bag per selector
//! context, in encounter order: the plain bag of a level first, then nested
//! pseudo/media blocks depth-first. Shorthand group objects expand into
//! longhands (`padding: { left: v }` → `padding-left`), with the axis keys
//! `x`/`y` expanding to `left`+`right` / `top`+`bottom`. Keyframes blocks
//! and font-face stacks stay pending in the bag until the engine resolves
//! their generated names.

use indexmap::IndexMap;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::selector::SelectorContext;
use crate::style::{FontSource, Keyframes, Style, StyleValue};

/// Shorthand-capable roots. A scalar value for a root mixed with longhands
/// of the same root is a shape conflict; a group object mixed with
/// longhands is an ambiguity warning.
const GROUP_ROOTS: &[&str] = &[
    "animation",
    "background",
    "border",
    "border-bottom",
    "border-left",
    "border-right",
    "border-top",
    "column-rule",
    "flex",
    "font",
    "grid",
    "inset",
    "list-style",
    "margin",
    "mask",
    "offset",
    "outline",
    "overflow",
    "padding",
    "scroll-margin",
    "scroll-padding",
    "text-decoration",
    "transition",
];

/// A flattened value: final CSS text, or a block still awaiting a generated
/// name.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatValue {
    /// Final CSS value text.
    Text(String),
    /// A keyframes block; resolves to an `animation-name` value.
    Keyframes(Keyframes),
    /// A font fallback stack; resolves to a `font-family` value.
    FontStack(Vec<FontSource>),
}

/// The flat property bag of one selector context. Keys are hyphenated
/// property names; insertion order is emission order, and re-inserting a
/// key replaces its value in place (last key wins, first position kept).
pub type FlatBag = IndexMap<String, FlatValue>;

/// A flat property bag whose values are final CSS text. This is the shape
/// the transformer hook receives and returns.
pub type PropertyBag = IndexMap<String, String>;

/// One selector context worth of flattened declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatGroup {
    /// The context the bag applies under.
    pub context: SelectorContext,
    /// The flat property bag.
    pub bag: FlatBag,
}

/// Flatten a style tree into per-context groups in encounter order.
pub fn flatten(style: &Style, sink: &mut dyn DiagnosticSink) -> Vec<FlatGroup> {
    let mut out = Vec::new();
    walk(style, &SelectorContext::root(), &mut out, sink);
    out
}

/// Flatten a declaration-only bag (a keyframes waypoint or a font-face
/// descriptor block). Pseudo/media nesting and named blocks are invalid
/// here and are skipped with a diagnostic.
pub fn flatten_bag(style: &Style, sink: &mut dyn DiagnosticSink) -> PropertyBag {
    let mut bag = FlatBag::new();
    for (key, value) in style.iter() {
        if key.starts_with(':') || key.starts_with('@') {
            sink.report(&Diagnostic::InvalidValue { key: key.to_string() });
            continue;
        }
        expand_value(key.to_string(), value, &mut bag, sink);
    }
    let mut text = PropertyBag::new();
    for (property, value) in bag {
        match value {
            FlatValue::Text(t) => {
                text.insert(property, t);
            }
            FlatValue::Keyframes(_) | FlatValue::FontStack(_) => {
                sink.report(&Diagnostic::InvalidValue { key: property });
            }
        }
    }
    text
}

/// Convert a camelCase property key to its hyphenated CSS name. A leading
/// uppercase letter marks a vendor property and yields a leading dash
/// (`MozAppearance` → `-moz-appearance`).
pub fn hyphenate(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Which shapes a root property was given at one context.
#[derive(Debug, Default, Clone, Copy)]
struct RootForms {
    scalar: bool,
    object: bool,
    longhand: bool,
}

fn walk(
    style: &Style,
    context: &SelectorContext,
    out: &mut Vec<FlatGroup>,
    sink: &mut dyn DiagnosticSink,
) {
    let mut bag = FlatBag::new();
    let mut forms: IndexMap<String, RootForms> = IndexMap::new();
    let mut nested: Vec<(SelectorContext, Style)> = Vec::new();

    for (key, value) in style.iter() {
        if key.starts_with(':') {
            match value {
                StyleValue::Block(inner) => {
                    nested.push((context.with_pseudo(key), inner.clone()));
                }
                _ => sink.report(&Diagnostic::InvalidValue { key: key.to_string() }),
            }
        } else if let Some(rest) = key.strip_prefix("@media") {
            let query = rest.trim();
            if query.is_empty() {
                sink.report(&Diagnostic::InvalidValue { key: key.to_string() });
            } else if let Some(outer) = context.media() {
                sink.report(&Diagnostic::NestedMedia {
                    outer: outer.to_string(),
                    inner: query.to_string(),
                });
            } else {
                match value {
                    StyleValue::Block(inner) => {
                        nested.push((context.with_media(query), inner.clone()));
                    }
                    _ => sink.report(&Diagnostic::InvalidValue { key: key.to_string() }),
                }
            }
        } else if key == "@keyframes" {
            match value {
                StyleValue::Keyframes(kf) => {
                    bag.insert("animation-name".to_string(), FlatValue::Keyframes(kf.clone()));
                }
                _ => sink.report(&Diagnostic::InvalidValue { key: key.to_string() }),
            }
        } else if key == "@font-face" {
            match value {
                StyleValue::FontFaces(stack) => {
                    bag.insert("font-family".to_string(), FlatValue::FontStack(stack.clone()));
                }
                _ => sink.report(&Diagnostic::InvalidValue { key: key.to_string() }),
            }
        } else if key.starts_with('@') {
            // No other at-rules are expressible in a style tree.
            sink.report(&Diagnostic::InvalidValue { key: key.to_string() });
        } else {
            register_forms(key, value, &mut forms);
            expand_value(key.to_string(), value, &mut bag, sink);
        }
    }

    resolve_conflicts(&mut bag, &forms, context, sink);

    if !bag.is_empty() {
        out.push(FlatGroup {
            context: context.clone(),
            bag,
        });
    }
    for (inner_context, inner) in nested {
        walk(&inner, &inner_context, out, sink);
    }
}

/// Record which shape a top-level property key contributes: its own name
/// as scalar or group object, plus a longhand mark for every group root it
/// extends (`borderWidth` is a longhand of `border`).
fn register_forms(key: &str, value: &StyleValue, forms: &mut IndexMap<String, RootForms>) {
    let name = hyphenate(key);
    match value {
        StyleValue::Block(_) => forms.entry(name.clone()).or_default().object = true,
        _ => forms.entry(name.clone()).or_default().scalar = true,
    }
    for root in GROUP_ROOTS {
        if name.len() > root.len() && name.starts_with(root) && name.as_bytes()[root.len()] == b'-'
        {
            forms.entry(root.to_string()).or_default().longhand = true;
        }
    }
}

/// Apply the conflict policy over one finished context bag.
fn resolve_conflicts(
    bag: &mut FlatBag,
    forms: &IndexMap<String, RootForms>,
    context: &SelectorContext,
    sink: &mut dyn DiagnosticSink,
) {
    let context_text = context_label(context);
    for (root, shape) in forms {
        if shape.scalar && (shape.object || shape.longhand) {
            sink.report(&Diagnostic::ShapeConflict {
                root: root.clone(),
                context: context_text.clone(),
            });
            bag.shift_remove(root);
        } else if shape.object && shape.longhand {
            sink.report(&Diagnostic::AmbiguousShorthand {
                root: root.clone(),
                context: context_text.clone(),
            });
        }
    }
}

fn context_label(context: &SelectorContext) -> String {
    match context.media() {
        Some(media) => format!("@media {media} {}", context.pseudo_suffix()),
        None => context.pseudo_suffix(),
    }
}

/// Expand one (camelCase key path, value) pair into the bag. Group objects
/// recurse, joining sub-keys in camelCase so hyphenation happens once at
/// the leaf (`padding` + `left` → `paddingLeft` → `padding-left`).
fn expand_value(key: String, value: &StyleValue, bag: &mut FlatBag, sink: &mut dyn DiagnosticSink) {
    match value {
        StyleValue::Scalar(scalar) => {
            bag.insert(hyphenate(&key), FlatValue::Text(scalar.to_css()));
        }
        StyleValue::Keyframes(kf) => {
            bag.insert(hyphenate(&key), FlatValue::Keyframes(kf.clone()));
        }
        StyleValue::FontFaces(stack) => {
            bag.insert(hyphenate(&key), FlatValue::FontStack(stack.clone()));
        }
        StyleValue::Block(inner) => {
            for (sub, sub_value) in inner.iter() {
                if sub.starts_with(':') || sub.starts_with('@') {
                    sink.report(&Diagnostic::InvalidValue {
                        key: format!("{key}.{sub}"),
                    });
                    continue;
                }
                match sub {
                    "x" => {
                        expand_value(join_camel(&key, "left"), sub_value, bag, sink);
                        expand_value(join_camel(&key, "right"), sub_value, bag, sink);
                    }
                    "y" => {
                        expand_value(join_camel(&key, "top"), sub_value, bag, sink);
                        expand_value(join_camel(&key, "bottom"), sub_value, bag, sink);
                    }
                    _ => expand_value(join_camel(&key, sub), sub_value, bag, sink),
                }
            }
        }
    }
}

/// Join a camelCase path segment: `padding` + `left` → `paddingLeft`.
fn join_camel(root: &str, sub: &str) -> String {
    let mut out = String::with_capacity(root.len() + sub.len());
    out.push_str(root);
    let mut chars = sub.chars();
    if let Some(first) = chars.next() {
        out.push(first.to_ascii_uppercase());
        out.extend(chars);
    }
    out
}
