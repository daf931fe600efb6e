//! Selector parsing.
//!
//! Strict by design of the callers: anything outside the supported subset is
//! reported as an error instead of being silently reinterpreted, so a typo in
//! a section selector shows up in the logs rather than as odd focus moves.

use super::{Combinator, ComplexSelector, CompoundSelector, SelectorList, SimpleSelector};
use anyhow::{Result, anyhow, bail};
use core::mem::take;

/// Tokenizer output.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Tok {
    /// `>`, `+` or `~`.
    Combinator(Combinator),
    /// A run of whitespace; becomes a descendant combinator between compounds.
    Whitespace,
    /// `,` between complex selectors.
    Comma,
    /// A simple selector.
    Simple(SimpleSelector),
}

/// Byte cursor over a selector string.
struct SelectorTokenizer<'src> {
    /// Selector source.
    source: &'src str,
    /// Current byte offset into `source`.
    index: usize,
}

#[inline]
const fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || byte >= 0x80
}

impl<'src> SelectorTokenizer<'src> {
    #[inline]
    const fn new(source: &'src str) -> Self {
        Self { source, index: 0 }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.index).copied()
    }

    #[inline]
    fn bump(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    /// Next token, `Ok(None)` at end of input.
    fn next_token(&mut self) -> Result<Option<Tok>> {
        let Some(current) = self.peek() else {
            return Ok(None);
        };
        let token = match current {
            byte if byte.is_ascii_whitespace() => {
                while self.peek().is_some_and(|next| next.is_ascii_whitespace()) {
                    self.bump();
                }
                Tok::Whitespace
            }
            b',' => {
                self.bump();
                Tok::Comma
            }
            b'>' | b'+' | b'~' => {
                self.bump();
                Tok::Combinator(match current {
                    b'>' => Combinator::Child,
                    b'+' => Combinator::AdjacentSibling,
                    _ => Combinator::GeneralSibling,
                })
            }
            b'*' => {
                self.bump();
                Tok::Simple(SimpleSelector::Universal)
            }
            b'.' => {
                self.bump();
                Tok::Simple(SimpleSelector::Class(self.consume_ident("class")?.to_owned()))
            }
            b'#' => {
                self.bump();
                Tok::Simple(SimpleSelector::Id(self.consume_ident("id")?.to_owned()))
            }
            b'[' => {
                self.bump();
                Tok::Simple(self.consume_attr()?)
            }
            byte if is_ident_byte(byte) => Tok::Simple(SimpleSelector::Type(
                self.consume_ident("type")?.to_ascii_lowercase(),
            )),
            other => bail!(
                "unsupported selector syntax {:?} at byte {} in {:?}",
                char::from(other),
                self.index,
                self.source
            ),
        };
        Ok(Some(token))
    }

    /// Consume a non-empty identifier.
    fn consume_ident(&mut self, what: &str) -> Result<&'src str> {
        let start = self.index;
        while self.peek().is_some_and(is_ident_byte) {
            self.bump();
        }
        let ident = self
            .source
            .get(start..self.index)
            .ok_or_else(|| anyhow!("selector {:?} is not valid UTF-8 here", self.source))?;
        if ident.is_empty() {
            bail!(
                "expected {what} name at byte {start} in {:?}",
                self.source
            );
        }
        Ok(ident)
    }

    /// `[name]` or `[name=value]`, the opening bracket already consumed.
    fn consume_attr(&mut self) -> Result<SimpleSelector> {
        self.skip_spaces();
        let name = self.consume_ident("attribute")?.to_ascii_lowercase();
        self.skip_spaces();
        let selector = match self.peek() {
            Some(b']') => SimpleSelector::AttrExists(name),
            Some(b'=') => {
                self.bump();
                self.skip_spaces();
                let value = match self.peek() {
                    Some(quote @ (b'"' | b'\'')) => {
                        self.bump();
                        self.consume_quoted(quote)?
                    }
                    _ => self.consume_ident("attribute value")?.to_owned(),
                };
                self.skip_spaces();
                SimpleSelector::AttrEquals { name, value }
            }
            _ => bail!(
                "unsupported attribute matcher at byte {} in {:?}",
                self.index,
                self.source
            ),
        };
        if self.peek() != Some(b']') {
            bail!("unterminated attribute selector in {:?}", self.source);
        }
        self.bump();
        Ok(selector)
    }

    /// Value up to the matching `quote`, which is consumed.
    fn consume_quoted(&mut self, quote: u8) -> Result<String> {
        let start = self.index;
        while self.peek().is_some_and(|byte| byte != quote) {
            self.bump();
        }
        if self.peek().is_none() {
            bail!("unterminated string in {:?}", self.source);
        }
        let value = self.source.get(start..self.index).unwrap_or_default().to_owned();
        self.bump();
        Ok(value)
    }

    #[inline]
    fn skip_spaces(&mut self) {
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.bump();
        }
    }
}

/// Accumulates one complex selector while tokens stream in.
#[derive(Default)]
struct ComplexBuilder {
    compounds: Vec<CompoundSelector>,
    combinators: Vec<Combinator>,
    current: CompoundSelector,
    saw_whitespace: bool,
}

impl ComplexBuilder {
    fn push_simple(&mut self, simple: SimpleSelector) {
        if self.saw_whitespace && !self.current.simples.is_empty() {
            self.compounds.push(take(&mut self.current));
            self.combinators.push(Combinator::Descendant);
        }
        self.saw_whitespace = false;
        self.current.simples.push(simple);
    }

    fn push_combinator(&mut self, combinator: Combinator, source: &str) -> Result<()> {
        if !self.current.simples.is_empty() {
            self.compounds.push(take(&mut self.current));
        }
        if self.compounds.len() != self.combinators.len().saturating_add(1) {
            bail!("combinator without a left-hand selector in {source:?}");
        }
        self.combinators.push(combinator);
        self.saw_whitespace = false;
        Ok(())
    }

    fn finish(mut self, source: &str) -> Result<ComplexSelector> {
        if !self.current.simples.is_empty() {
            self.compounds.push(take(&mut self.current));
        }
        if self.compounds.is_empty() {
            bail!("empty selector in list {source:?}");
        }
        if self.compounds.len() != self.combinators.len().saturating_add(1) {
            bail!("dangling combinator in {source:?}");
        }
        Ok(ComplexSelector {
            compounds: self.compounds,
            combinators: self.combinators,
        })
    }
}

/// Parse a comma separated selector list.
///
/// # Errors
/// Returns an error for syntax outside the supported subset, empty list
/// entries and dangling combinators.
pub fn parse_selector_list(input: &str) -> Result<SelectorList> {
    let mut tokens = SelectorTokenizer::new(input.trim());
    let mut list = SelectorList::default();
    let mut builder = ComplexBuilder::default();

    while let Some(token) = tokens.next_token()? {
        match token {
            Tok::Whitespace => builder.saw_whitespace = true,
            Tok::Comma => list.selectors.push(take(&mut builder).finish(input)?),
            Tok::Combinator(combinator) => builder.push_combinator(combinator, input)?,
            Tok::Simple(simple) => builder.push_simple(simple),
        }
    }
    list.selectors.push(builder.finish(input)?);
    Ok(list)
}
