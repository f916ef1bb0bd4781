//! style! macro: parse style-tree literals at compile time and generate
//! `restyle::Style` builder code.

use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{braced, Expr, Ident, LitStr, Result, Token};

// ---------------------------------------------------------------------------
// AST types
// ---------------------------------------------------------------------------

/// One parsed entry of a style block.
#[derive(Debug)]
pub(crate) enum StyleEntry {
    /// `key: value;`
    Declaration { key: String, value: Expr },
    /// `key { .. }`, `:pseudo { .. }`, or `"string key" { .. }`
    Block { key: String, entries: Vec<StyleEntry> },
}

/// The top-level input to the style! macro.
#[derive(Debug)]
pub(crate) struct StyleInput {
    pub(crate) entries: Vec<StyleEntry>,
}

impl Parse for StyleInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut entries = Vec::new();
        while !input.is_empty() {
            entries.push(parse_entry(input)?);
        }
        Ok(Self { entries })
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a hyphen-joined identifier chain: `first-child` → `"first-child"`.
fn parse_ident_chain(input: ParseStream) -> Result<String> {
    let first: Ident = input.parse()?;
    let mut chain = first.to_string();
    while input.peek(Token![-]) && input.peek2(Ident) {
        input.parse::<Token![-]>()?;
        let next: Ident = input.parse()?;
        chain.push('-');
        chain.push_str(&next.to_string());
    }
    Ok(chain)
}

/// Parse an entry key: a string literal, a pseudo selector (`:hover`,
/// `::before`), or a plain identifier chain.
fn parse_key(input: ParseStream) -> Result<String> {
    if input.peek(LitStr) {
        let lit: LitStr = input.parse()?;
        return Ok(lit.value());
    }
    if input.peek(Token![::]) {
        input.parse::<Token![::]>()?;
        return Ok(format!("::{}", parse_ident_chain(input)?));
    }
    if input.peek(Token![:]) {
        input.parse::<Token![:]>()?;
        return Ok(format!(":{}", parse_ident_chain(input)?));
    }
    parse_ident_chain(input)
}

fn parse_entry(input: ParseStream) -> Result<StyleEntry> {
    let key = parse_key(input)?;
    if input.peek(syn::token::Brace) {
        let content;
        braced!(content in input);
        let mut entries = Vec::new();
        while !content.is_empty() {
            entries.push(parse_entry(&content)?);
        }
        // Optional trailing semicolon after a block.
        if input.peek(Token![;]) {
            input.parse::<Token![;]>()?;
        }
        Ok(StyleEntry::Block { key, entries })
    } else {
        input.parse::<Token![:]>()?;
        let value: Expr = input.parse()?;
        input.parse::<Token![;]>()?;
        Ok(StyleEntry::Declaration { key, value })
    }
}

// ---------------------------------------------------------------------------
// Code generation
// ---------------------------------------------------------------------------

fn entry_tokens(entry: &StyleEntry) -> TokenStream {
    match entry {
        StyleEntry::Declaration { key, value } => quote! { .set(#key, #value) },
        StyleEntry::Block { key, entries } => {
            let inner = entries.iter().map(entry_tokens);
            quote! { .set(#key, ::restyle::Style::new() #(#inner)*) }
        }
    }
}

pub(crate) fn style_impl(input: TokenStream) -> Result<TokenStream> {
    let parsed: StyleInput = syn::parse2(input)?;
    let entries = parsed.entries.iter().map(entry_tokens);
    Ok(quote! { ::restyle::Style::new() #(#entries)* })
}
