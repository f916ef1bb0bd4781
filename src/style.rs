//! Style tree model: the nested, declarative input structure.
//!
//! A [`Style`] is an ordered mapping from key to [`StyleValue`]. Keys are
//! either camelCase property names (`color`, `borderColor`), shorthand group
//! names holding a nested block (`padding`, `border`), pseudo selectors
//! (`:hover`), media queries (`@media (min-width: 768px)`), or the
//! `@keyframes` / `@font-face` markers and their `animationName` /
//! `fontFamily` aliases. Insertion order is significant: flattening walks
//! entries in order and merging is last-key-wins.

/// A primitive declaration value: a string or a bare number.
///
/// Numbers render verbatim (`400` stays `400`); unit handling is left to
/// the caller or a transformer hook.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// A string value like `"red"` or `"1px solid"`.
    Str(String),
    /// A numeric value like `400` or `1.5`.
    Num(f64),
}

impl Scalar {
    /// Render the value as CSS text.
    pub fn to_css(&self) -> String {
        match self {
            Scalar::Str(s) => s.clone(),
            Scalar::Num(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Num(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Num(value as f64)
    }
}

/// An `@keyframes` block: an ordered list of waypoints, each mapping an
/// offset (`from`, `to`, `50%`) to a property bag.
///
/// The whole block is fingerprinted as a unit and assigned one name from
/// the keyframe enumeration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Keyframes {
    waypoints: Vec<(String, Style)>,
}

impl Keyframes {
    /// Create an empty keyframes block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a waypoint (builder).
    pub fn at(mut self, offset: impl Into<String>, bag: Style) -> Self {
        self.waypoints.push((offset.into(), bag));
        self
    }

    /// Iterate waypoints in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Style)> {
        self.waypoints.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns `true` if the block has no waypoints.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

/// A single `@font-face` descriptor block (`fontStyle`, `fontWeight`,
/// `src`, ..). The engine assigns the `font-family` name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FontFace {
    descriptors: Style,
}

impl FontFace {
    /// Create an empty descriptor block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a descriptor (builder).
    pub fn descriptor(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.descriptors = self.descriptors.set(key, StyleValue::Scalar(value.into()));
        self
    }

    /// The descriptor bag.
    pub fn descriptors(&self) -> &Style {
        &self.descriptors
    }
}

/// One element of a `font-family` fallback stack: either a descriptor
/// block that will receive a generated family name, or a literal family
/// name passed through as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum FontSource {
    /// A `@font-face` descriptor block.
    Face(FontFace),
    /// A literal family name like `"sans-serif"`.
    Family(String),
}

/// A value in a style tree.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    /// A plain declaration value.
    Scalar(Scalar),
    /// A nested tree: a shorthand group under a property key, or the body
    /// of a pseudo/media key.
    Block(Style),
    /// A keyframes block (`@keyframes`, `animationName`, `animation.name`).
    Keyframes(Keyframes),
    /// A font-face fallback stack (`@font-face`, `fontFamily`,
    /// `font.family`).
    FontFaces(Vec<FontSource>),
}

impl From<Scalar> for StyleValue {
    fn from(value: Scalar) -> Self {
        StyleValue::Scalar(value)
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Scalar(value.into())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Scalar(value.into())
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Scalar(value.into())
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        StyleValue::Scalar(value.into())
    }
}

impl From<Style> for StyleValue {
    fn from(value: Style) -> Self {
        StyleValue::Block(value)
    }
}

impl From<Keyframes> for StyleValue {
    fn from(value: Keyframes) -> Self {
        StyleValue::Keyframes(value)
    }
}

impl From<FontFace> for StyleValue {
    fn from(value: FontFace) -> Self {
        StyleValue::FontFaces(vec![FontSource::Face(value)])
    }
}

impl From<Vec<FontSource>> for StyleValue {
    fn from(value: Vec<FontSource>) -> Self {
        StyleValue::FontFaces(value)
    }
}

/// A nested declarative style tree.
///
/// Built with [`Style::set`] (replaces an existing key in place, appends
/// otherwise) and composed with [`Style::merge`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    entries: Vec<(String, StyleValue)>,
}

impl Style {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key (builder). An existing key is replaced in place so its
    /// original position is kept; a new key is appended.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&StyleValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deep merge with left-to-right precedence: entries of `other`
    /// override entries of `self` at the same key. Two nested blocks merge
    /// recursively; every other value kind replaces wholesale. Overridden
    /// keys keep their original position; new keys append.
    pub fn merge(&self, other: &Style) -> Style {
        let mut out = self.clone();
        for (key, value) in &other.entries {
            match out.entries.iter_mut().find(|(k, _)| k == key) {
                Some((_, slot)) => {
                    if let (StyleValue::Block(base), StyleValue::Block(incoming)) =
                        (&*slot, value)
                    {
                        let merged = base.merge(incoming);
                        *slot = StyleValue::Block(merged);
                    } else {
                        *slot = value.clone();
                    }
                }
                None => out.entries.push((key.clone(), value.clone())),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Scalar rendering ─────────────────────────────────────────────

    #[test]
    fn scalar_renders_strings_verbatim() {
        assert_eq!(Scalar::from("1px solid red").to_css(), "1px solid red");
    }

    #[test]
    fn scalar_renders_integral_numbers_without_fraction() {
        assert_eq!(Scalar::from(400).to_css(), "400");
        assert_eq!(Scalar::from(0).to_css(), "0");
        assert_eq!(Scalar::from(-5).to_css(), "-5");
    }

    #[test]
    fn scalar_renders_fractional_numbers() {
        assert_eq!(Scalar::from(1.5).to_css(), "1.5");
        assert_eq!(Scalar::from(0.25).to_css(), "0.25");
    }

    // ── Builder ──────────────────────────────────────────────────────

    #[test]
    fn set_appends_new_keys_in_order() {
        let style = Style::new().set("color", "red").set("borderColor", "blue");
        let keys: Vec<&str> = style.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["color", "borderColor"]);
    }

    #[test]
    fn set_replaces_existing_key_in_place() {
        let style = Style::new()
            .set("color", "red")
            .set("background", "black")
            .set("color", "green");
        let keys: Vec<&str> = style.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["color", "background"]);
        assert_eq!(
            style.get("color"),
            Some(&StyleValue::Scalar(Scalar::Str("green".into())))
        );
    }

    // ── Merge ────────────────────────────────────────────────────────

    #[test]
    fn merge_later_entry_wins_at_same_key() {
        let a = Style::new().set("color", "green");
        let b = Style::new().set("color", "red");
        let merged = a.merge(&b);
        assert_eq!(
            merged.get("color"),
            Some(&StyleValue::Scalar(Scalar::Str("red".into())))
        );
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn merge_recurses_into_blocks() {
        let a = Style::new().set(
            ":hover",
            Style::new().set("color", "green").set("background", "black"),
        );
        let b = Style::new().set(":hover", Style::new().set("color", "red"));
        let merged = a.merge(&b);
        let Some(StyleValue::Block(hover)) = merged.get(":hover") else {
            panic!("expected block");
        };
        assert_eq!(
            hover.get("color"),
            Some(&StyleValue::Scalar(Scalar::Str("red".into())))
        );
        assert_eq!(
            hover.get("background"),
            Some(&StyleValue::Scalar(Scalar::Str("black".into())))
        );
    }

    #[test]
    fn merge_replaces_keyframes_wholesale() {
        let a = Style::new().set(
            "@keyframes",
            Keyframes::new().at("from", Style::new().set("color", "red")),
        );
        let b = Style::new().set(
            "@keyframes",
            Keyframes::new().at("from", Style::new().set("color", "blue")),
        );
        let merged = a.merge(&b);
        let Some(StyleValue::Keyframes(kf)) = merged.get("@keyframes") else {
            panic!("expected keyframes");
        };
        let (_, bag) = kf.iter().next().expect("one waypoint");
        assert_eq!(
            bag.get("color"),
            Some(&StyleValue::Scalar(Scalar::Str("blue".into())))
        );
    }

    #[test]
    fn merge_appends_unrelated_keys() {
        let a = Style::new().set("color", "red");
        let b = Style::new().set("background", "blue");
        let merged = a.merge(&b);
        let keys: Vec<&str> = merged.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["color", "background"]);
    }

    // ── Keyframes / font faces ───────────────────────────────────────

    #[test]
    fn keyframes_preserve_waypoint_order() {
        let kf = Keyframes::new()
            .at("from", Style::new().set("color", "red"))
            .at("50%", Style::new().set("color", "yellow"))
            .at("to", Style::new().set("color", "green"));
        let offsets: Vec<&str> = kf.iter().map(|(k, _)| k).collect();
        assert_eq!(offsets, vec!["from", "50%", "to"]);
    }

    #[test]
    fn font_face_converts_into_single_entry_stack() {
        let face = FontFace::new().descriptor("fontWeight", 400);
        let value: StyleValue = face.clone().into();
        assert_eq!(value, StyleValue::FontFaces(vec![FontSource::Face(face)]));
    }
}
