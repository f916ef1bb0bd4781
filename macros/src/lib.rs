//! Proc macros for restyle: the `style!` style-tree literal.
//!
//! This crate is not meant to be used directly — enable the `macros`
//! feature on `restyle`.

use proc_macro::TokenStream;

mod style_macro;

/// Style-tree literal macro.
///
/// Builds a `restyle::Style` from declaration syntax, expanding to
/// builder calls at compile time.
///
/// # Syntax
///
/// - `key: value;` — a declaration; `key` is a camelCase or kebab-case
///   identifier, `value` any expression convertible into a style value
/// - `key { .. }` — a shorthand group block
/// - `:hover { .. }` / `::before { .. }` — a pseudo-selector block
/// - `"@media (min-width: 768px)" { .. }` — a media block (string keys
///   work for any block)
///
/// # Example
///
/// ```ignore
/// let style = style! {
///     color: "red";
///     fontWeight: 400;
///     margin { x: "10px"; }
///     :hover { color: "green"; }
///     "@media (min-width: 768px)" { color: "blue"; }
/// };
/// ```
#[proc_macro]
pub fn style(input: TokenStream) -> TokenStream {
    style_macro::style_impl(input.into())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
