//! Backing sheet backend contract and the in-memory implementation.
//!
//! The engine never removes or mutates a rule once appended; a backend is
//! an ordered, append-only container of rule text. [`MemorySheet`] backs
//! server-side rendering and tests; a DOM-bound host supplies its own
//! implementation over a real `CSSStyleSheet`.

/// Errors from a sheet backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend refused the rule text (malformed rule, full sheet, ..).
    #[error("sheet rejected rule: {0}")]
    Rejected(String),
    /// An I/O failure from a backend writing through to an external store.
    #[error("sheet backend i/o failure")]
    Io(#[from] std::io::Error),
}

/// An ordered container of CSS rule text, plain or media-scoped.
pub trait SheetBackend {
    /// Append a rule at the end of the sheet. Returns the rule's position.
    fn append(&mut self, rule_text: &str) -> Result<usize, BackendError>;

    /// Enumerate existing rule text chunks in order. A chunk may contain
    /// one rule or a whole pre-rendered sheet; the hydration scanner
    /// handles both.
    fn rules(&self) -> Vec<String>;

    /// The media query this sheet is scoped to, or `None` for the plain
    /// sheet.
    fn media(&self) -> Option<&str>;
}

/// The built-in in-memory backend.
#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    media: Option<String>,
    rules: Vec<String>,
}

impl MemorySheet {
    /// Create an empty plain sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty media-scoped sheet.
    pub fn with_media(query: impl Into<String>) -> Self {
        Self {
            media: Some(query.into()),
            rules: Vec::new(),
        }
    }

    /// Create a sheet pre-populated with rendered CSS, as found after a
    /// server render. `media` is `None` for the plain sheet.
    pub fn with_css(media: Option<&str>, css: impl Into<String>) -> Self {
        Self {
            media: media.map(str::to_string),
            rules: vec![css.into()],
        }
    }

    /// The concatenated CSS text of the sheet.
    pub fn css_text(&self) -> String {
        self.rules.concat()
    }

    /// Number of stored chunks.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl SheetBackend for MemorySheet {
    fn append(&mut self, rule_text: &str) -> Result<usize, BackendError> {
        self.rules.push(rule_text.to_string());
        Ok(self.rules.len() - 1)
    }

    fn rules(&self) -> Vec<String> {
        self.rules.clone()
    }

    fn media(&self) -> Option<&str> {
        self.media.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_returns_positions_in_order() {
        let mut sheet = MemorySheet::new();
        assert_eq!(sheet.append(".a{color:red}").unwrap(), 0);
        assert_eq!(sheet.append(".b{color:green}").unwrap(), 1);
        assert_eq!(sheet.rules(), vec![".a{color:red}", ".b{color:green}"]);
    }

    #[test]
    fn media_attribute_round_trips() {
        let plain = MemorySheet::new();
        assert_eq!(plain.media(), None);
        let media = MemorySheet::with_media("(min-width: 768px)");
        assert_eq!(media.media(), Some("(min-width: 768px)"));
    }

    #[test]
    fn with_css_exposes_the_seed_chunk() {
        let sheet = MemorySheet::with_css(None, ".a{color:red}.b{color:green}");
        assert_eq!(sheet.rules(), vec![".a{color:red}.b{color:green}"]);
        assert_eq!(sheet.css_text(), ".a{color:red}.b{color:green}");
    }
}
