//! Selector context: the (media, pseudo-chain) pair a declaration applies
//! under.
//!
//! Pseudo order is significant and preserved from the source tree:
//! `:first-child:hover` and `:hover:first-child` are distinct contexts.
//! Flattening carries a context as an immutable accumulator — extending it
//! produces a new value.

/// The selector context of a flattened declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SelectorContext {
    media: Option<String>,
    pseudos: Vec<String>,
}

impl SelectorContext {
    /// The root context: no media query, no pseudo selectors.
    pub fn root() -> Self {
        Self::default()
    }

    /// The media query string, if any.
    pub fn media(&self) -> Option<&str> {
        self.media.as_deref()
    }

    /// Returns `true` if a pseudo chain is present.
    pub fn has_pseudos(&self) -> bool {
        !self.pseudos.is_empty()
    }

    /// A new context with `pseudo` appended to the chain.
    pub fn with_pseudo(&self, pseudo: &str) -> Self {
        let mut next = self.clone();
        next.pseudos.push(pseudo.to_string());
        next
    }

    /// A new context scoped to a media query. The flattener guarantees a
    /// media context never nests inside another one.
    pub fn with_media(&self, query: &str) -> Self {
        let mut next = self.clone();
        next.media = Some(query.to_string());
        next
    }

    /// The selector suffix appended after a class name: the concatenated
    /// pseudo chain (empty for a bare declaration).
    pub fn pseudo_suffix(&self) -> String {
        self.pseudos.concat()
    }
}
