//! Hydration: re-seed caches from rule text already present in a sheet.
//!
//! Runs once per slot at construction, before any injection. The scanner
//! tokenizes existing CSS with logos and walks it with a cursor, slicing
//! declaration values out of the raw source by byte span so characters the
//! lexer has no token for (hex colors, parentheses) survive intact.
//!
//! Token disambiguation relies on logos longest-match:
//! - `@keyframes` matches [`Token::Keyframes`], not the at-keyword fallback
//! - `:hover` (and the fused `:red` of minified `color:red`) matches
//!   [`Token::Pseudo`], not `Colon` + `Ident` — declaration parsing
//!   re-splits the fused form by span
//!
//! A rule that cannot be mapped back to a fingerprint is skipped: the only
//! cost is a duplicate identifier if the same declaration is injected
//! later.

use logos::Logos;

use crate::ident::IdentSequence;
use crate::injector::Injector;

/// CSS token produced by the hydration lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    /// `@keyframes`
    #[token("@keyframes")]
    Keyframes,

    /// `@font-face`
    #[token("@font-face")]
    FontFace,

    /// Any other at-keyword; its rule is skipped.
    #[regex(r"@[a-zA-Z-]+")]
    AtKeyword,

    /// Class selector: `.a`, `.btn-primary`.
    #[regex(r"\.[a-zA-Z][a-zA-Z0-9_-]*")]
    ClassSelector,

    /// Pseudo selector (`:hover`, `::before`, `:nth-child(2n)`) — or a
    /// colon fused with the start of a minified declaration value.
    #[regex(r"::?[a-zA-Z][a-zA-Z0-9-]*(\([^)]*\))?")]
    Pseudo,

    /// Quoted string literal.
    #[regex(r#""[^"]*"|'[^']*'"#)]
    Str,

    /// `url(..)` with its full argument.
    #[regex(r"url\([^)]*\)")]
    Url,

    /// Identifier: property names, keyframe offsets, value words. A
    /// leading dash covers vendor properties, a double dash custom ones.
    #[regex(r"-?-?[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    /// Number, optionally negative or percent-suffixed.
    #[regex(r"-?[0-9]+(\.[0-9]+)?%?")]
    Number,

    /// `{`
    #[token("{")]
    BraceOpen,

    /// `}`
    #[token("}")]
    BraceClose,

    /// `:`
    #[token(":")]
    Colon,

    /// `;`
    #[token(";")]
    Semicolon,

    /// `,`
    #[token(",")]
    Comma,
}

/// A token with its byte span in the source.
#[derive(Debug, Clone, Copy)]
struct PTok {
    token: Token,
    start: usize,
    end: usize,
}

/// Scan a chunk of pre-existing CSS and seed the given injector and
/// identifier sequences. Unrecognized rules are skipped.
pub fn hydrate_chunk(
    css: &str,
    injector: &mut Injector,
    classes: &mut IdentSequence,
    keyframe_names: &mut IdentSequence,
    font_family_names: &mut IdentSequence,
) {
    let mut scanner = Scanner::new(css);
    while let Some(tok) = scanner.peek() {
        let parsed = match tok.token {
            Token::ClassSelector => scanner.class_rule(injector, classes),
            Token::Keyframes => scanner.keyframes_rule(injector, keyframe_names),
            Token::FontFace => scanner.font_face_rule(injector, font_family_names),
            _ => None,
        };
        if parsed.is_none() {
            scanner.skip_rule();
        }
    }
}

/// Cursor over the token stream of one CSS chunk.
struct Scanner<'a> {
    source: &'a str,
    tokens: Vec<PTok>,
    cursor: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        let tokens = Token::lexer(source)
            .spanned()
            .filter_map(|(result, span)| {
                result.ok().map(|token| PTok {
                    token,
                    start: span.start,
                    end: span.end,
                })
            })
            .collect();
        Self {
            source,
            tokens,
            cursor: 0,
        }
    }

    fn peek(&self) -> Option<PTok> {
        self.tokens.get(self.cursor).copied()
    }

    fn bump(&mut self) {
        self.cursor += 1;
    }

    fn expect(&mut self, token: Token) -> Option<PTok> {
        let tok = self.peek()?;
        if tok.token == token {
            self.bump();
            Some(tok)
        } else {
            None
        }
    }

    fn text(&self, tok: PTok) -> &'a str {
        &self.source[tok.start..tok.end]
    }

    /// `.name[:pseudo..]{declarations}` — seed a class rule.
    fn class_rule(&mut self, injector: &mut Injector, classes: &mut IdentSequence) -> Option<()> {
        let class_tok = self.expect(Token::ClassSelector)?;
        let name = &self.text(class_tok)[1..];
        let mut pseudo = String::new();
        loop {
            let tok = self.peek()?;
            match tok.token {
                Token::Pseudo => {
                    pseudo.push_str(self.text(tok));
                    self.bump();
                }
                Token::BraceOpen => break,
                // Compound or grouped selectors are not ours to hydrate.
                _ => return None,
            }
        }
        self.bump();
        let block = self.declaration_block()?;
        injector.seed_class(&pseudo, &block, name);
        classes.reserve(name);
        Some(())
    }

    /// `@keyframes name{offset{..}..}` — seed a keyframes rule.
    fn keyframes_rule(
        &mut self,
        injector: &mut Injector,
        names: &mut IdentSequence,
    ) -> Option<()> {
        self.expect(Token::Keyframes)?;
        let name_tok = self.expect(Token::Ident)?;
        let name = self.text(name_tok).to_string();
        self.expect(Token::BraceOpen)?;

        let mut body = String::new();
        loop {
            let tok = self.peek()?;
            if tok.token == Token::BraceClose {
                self.bump();
                break;
            }
            // Offset: raw slice up to the waypoint's opening brace.
            let offset_start = tok.start;
            let offset_end;
            loop {
                let t = self.peek()?;
                match t.token {
                    Token::BraceOpen => {
                        offset_end = t.start;
                        self.bump();
                        break;
                    }
                    Token::BraceClose | Token::Semicolon => return None,
                    _ => self.bump(),
                }
            }
            let offset = self.source[offset_start..offset_end].trim();
            let block = self.declaration_block()?;
            body.push_str(offset);
            body.push('{');
            body.push_str(&block);
            body.push('}');
        }

        injector.seed_keyframes(&body, &name);
        names.reserve(&name);
        Some(())
    }

    /// `@font-face {..;font-family:name}` — seed a font-face rule. The
    /// declared `font-family` value is the assigned name; the remaining
    /// descriptors form the fingerprint.
    fn font_face_rule(
        &mut self,
        injector: &mut Injector,
        names: &mut IdentSequence,
    ) -> Option<()> {
        self.expect(Token::FontFace)?;
        self.expect(Token::BraceOpen)?;
        let pairs = self.declaration_pairs()?;

        let mut family = None;
        let mut descriptors = Vec::new();
        for (property, value) in pairs {
            if property == "font-family" {
                family = Some(value);
            } else {
                descriptors.push(format!("{property}:{value}"));
            }
        }
        let name = family?;

        injector.seed_font_face(&descriptors.join(";"), &name);
        names.reserve(&name);
        Some(())
    }

    /// Parse declarations up to and including the closing brace, joined
    /// canonically as `prop:value;prop:value`.
    fn declaration_block(&mut self) -> Option<String> {
        let pairs = self.declaration_pairs()?;
        Some(
            pairs
                .iter()
                .map(|(p, v)| format!("{p}:{v}"))
                .collect::<Vec<_>>()
                .join(";"),
        )
    }

    /// Parse `(property, value)` pairs up to and including the closing
    /// brace.
    fn declaration_pairs(&mut self) -> Option<Vec<(String, String)>> {
        let mut pairs = Vec::new();
        loop {
            let tok = self.peek()?;
            match tok.token {
                Token::BraceClose => {
                    self.bump();
                    break;
                }
                Token::Semicolon => {
                    self.bump();
                }
                Token::Ident => {
                    let property = self.text(tok).to_string();
                    self.bump();
                    let value = self.value_text()?;
                    pairs.push((property, value));
                }
                _ => return None,
            }
        }
        Some(pairs)
    }

    /// Capture a declaration value as a raw source slice: from the colon
    /// (which may be fused into a [`Token::Pseudo`] by minification) up to
    /// the next `;` or `}` token. Quoted strings keep `;`/`}` inert.
    fn value_text(&mut self) -> Option<String> {
        let tok = self.peek()?;
        let start = match tok.token {
            Token::Colon => {
                self.bump();
                tok.end
            }
            Token::Pseudo => {
                self.bump();
                tok.start + 1
            }
            _ => return None,
        };
        let end;
        loop {
            let next = self.peek()?;
            match next.token {
                Token::Semicolon => {
                    end = next.start;
                    self.bump();
                    break;
                }
                Token::BraceClose => {
                    end = next.start;
                    break;
                }
                _ => self.bump(),
            }
        }
        Some(self.source[start..end].trim().to_string())
    }

    /// Recovery: advance past the current rule. Consumes the failing token,
    /// then everything up to the close of the next balanced brace group —
    /// stopping early at a token that can only start a new rule.
    fn skip_rule(&mut self) {
        let mut depth = 0usize;
        let mut seen_open = false;
        if let Some(tok) = self.peek() {
            self.bump();
            match tok.token {
                Token::BraceOpen => {
                    depth = 1;
                    seen_open = true;
                }
                Token::BraceClose => return,
                _ => {}
            }
        }
        while let Some(tok) = self.peek() {
            let rule_start = matches!(
                tok.token,
                Token::ClassSelector | Token::Keyframes | Token::FontFace | Token::AtKeyword
            );
            if !seen_open && rule_start {
                return;
            }
            self.bump();
            match tok.token {
                Token::BraceOpen => {
                    depth += 1;
                    seen_open = true;
                }
                Token::BraceClose => {
                    // Either closes this rule's block or the block the
                    // failure happened inside of.
                    if depth <= 1 {
                        return;
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
    }
}
