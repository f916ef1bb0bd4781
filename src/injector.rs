//! Per-sheet rule cache and emission.
//!
//! An [`Injector`] owns the fingerprint caches for one sheet slot. A cache
//! key is the canonical CSS fragment itself — the declaration block for
//! class rules, the body for keyframes, the descriptor list for font
//! faces — so the hydration scanner reconstructs keys byte-for-byte from
//! rule text. Lookup is side-effect-free on hit; a miss is the single
//! point where an identifier is minted, the cache entry created, and the
//! rule appended. An append rejected by the backend mints nothing and
//! caches nothing.

use std::collections::HashMap;

use crate::ident::IdentSequence;
use crate::sheet::{BackendError, SheetBackend};

/// The rule caches of one sheet slot.
#[derive(Debug, Default)]
pub struct Injector {
    class_index: HashMap<String, String>,
    keyframes_index: HashMap<String, String>,
    font_face_index: HashMap<String, String>,
}

impl Injector {
    /// Create an empty injector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up or create the class rule `.<name><pseudo>{<block>}`.
    ///
    /// `block` is a canonical declaration list (`color:red` or
    /// `color:red;background:green`); atomic mode passes single-declaration
    /// blocks, non-atomic mode passes the whole context block.
    pub fn inject_class(
        &mut self,
        pseudo: &str,
        block: &str,
        classes: &mut IdentSequence,
        sheet: &mut dyn SheetBackend,
    ) -> Result<String, BackendError> {
        let key = class_key(pseudo, block);
        if let Some(existing) = self.class_index.get(&key) {
            return Ok(existing.clone());
        }
        let name = classes.peek();
        sheet.append(&format!(".{name}{pseudo}{{{block}}}"))?;
        classes.advance();
        self.class_index.insert(key, name.clone());
        Ok(name)
    }

    /// Look up or create the rule `@keyframes <name>{<body>}`. The body is
    /// the canonical waypoint list (`from{color:red}to{color:green}`).
    pub fn inject_keyframes(
        &mut self,
        body: &str,
        names: &mut IdentSequence,
        sheet: &mut dyn SheetBackend,
    ) -> Result<String, BackendError> {
        if let Some(existing) = self.keyframes_index.get(body) {
            return Ok(existing.clone());
        }
        let name = names.peek();
        sheet.append(&format!("@keyframes {name}{{{body}}}"))?;
        names.advance();
        self.keyframes_index.insert(body.to_string(), name.clone());
        Ok(name)
    }

    /// Look up or create the rule
    /// `@font-face {<descriptors>;font-family:<name>}`. The descriptor
    /// list excludes `font-family`, which this call assigns.
    pub fn inject_font_face(
        &mut self,
        descriptors: &str,
        names: &mut IdentSequence,
        sheet: &mut dyn SheetBackend,
    ) -> Result<String, BackendError> {
        if let Some(existing) = self.font_face_index.get(descriptors) {
            return Ok(existing.clone());
        }
        let name = names.peek();
        sheet.append(&format!("@font-face {{{descriptors};font-family:{name}}}"))?;
        names.advance();
        self.font_face_index
            .insert(descriptors.to_string(), name.clone());
        Ok(name)
    }

    // ── Hydration seeding ────────────────────────────────────────────
    // Insert cache entries for rules already present in the backing sheet
    // without re-emitting them.

    /// Seed a class rule found during hydration.
    pub fn seed_class(&mut self, pseudo: &str, block: &str, name: &str) {
        self.class_index
            .entry(class_key(pseudo, block))
            .or_insert_with(|| name.to_string());
    }

    /// Seed a keyframes rule found during hydration.
    pub fn seed_keyframes(&mut self, body: &str, name: &str) {
        self.keyframes_index
            .entry(body.to_string())
            .or_insert_with(|| name.to_string());
    }

    /// Seed a font-face rule found during hydration.
    pub fn seed_font_face(&mut self, descriptors: &str, name: &str) {
        self.font_face_index
            .entry(descriptors.to_string())
            .or_insert_with(|| name.to_string());
    }
}

fn class_key(pseudo: &str, block: &str) -> String {
    format!("{pseudo}\u{1}{block}")
}
