//! Element selectors: a CSS subset plus explicit element handles.
//!
//! Supported CSS: type, universal, `.class`, `#id`, `[attr]`, `[attr=value]`,
//! the four combinators (descendant, `>`, `+`, `~`) and comma lists.

mod matcher;
mod parser;

pub use matcher::{matches_complex, matches_compound, matches_selector_list};
pub use parser::parse_selector_list;

use crate::dom::Document;
use log::{debug, warn};

/// Simple selectors.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SimpleSelector {
    /// Tag name, lowercase.
    Type(String),
    Universal,
    Class(String),
    Id(String),
    /// `[name]`, name lowercase.
    AttrExists(String),
    /// `[name=value]`, name lowercase, value verbatim.
    AttrEquals { name: String, value: String },
}

/// A sequence of simple selectors with no combinator between them.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

/// Combinators between compounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

/// Compounds joined by combinators: `combinators[i]` sits between
/// `compounds[i]` and `compounds[i + 1]`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

/// A comma separated group of complex selectors.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

/// Selector source text together with its parse outcome.
///
/// An empty source is valid and matches nothing. A parse failure is logged
/// once here and again whenever the selector is used; it never matches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CssSelector {
    source: String,
    parsed: Result<SelectorList, String>,
}

impl CssSelector {
    pub fn new(source: &str) -> Self {
        let parsed = if source.trim().is_empty() {
            Ok(SelectorList::default())
        } else {
            parse_selector_list(source).map_err(|err| {
                warn!("invalid selector {source:?}: {err}");
                err.to_string()
            })
        };
        Self {
            source: source.to_owned(),
            parsed,
        }
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parsed list, or `None` when the source failed to parse.
    pub fn list(&self) -> Option<&SelectorList> {
        match &self.parsed {
            Ok(list) => Some(list),
            Err(err) => {
                debug!("skipping invalid selector {:?}: {err}", self.source);
                None
            }
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.parsed.is_ok()
    }
}

/// What a section option can point at: a CSS selector, a fixed list of
/// elements, or a single element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementSelector<E> {
    Css(CssSelector),
    Elements(Vec<E>),
    Element(E),
}

impl<E> ElementSelector<E> {
    /// Selector from CSS source text.
    #[inline]
    pub fn css(source: &str) -> Self {
        Self::Css(CssSelector::new(source))
    }

    /// True for an empty CSS source or an empty element list.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Css(css) => css.source().trim().is_empty(),
            Self::Elements(elements) => elements.is_empty(),
            Self::Element(_) => false,
        }
    }
}

impl<E: Copy + Eq> ElementSelector<E> {
    /// All elements the selector designates, in document order for CSS and
    /// in list order otherwise.
    pub fn resolve<D: Document<Element = E>>(&self, doc: &D) -> Vec<E> {
        match self {
            Self::Css(css) => css.list().map_or_else(Vec::new, |list| {
                doc.elements()
                    .into_iter()
                    .filter(|element| matches_selector_list(doc, *element, list))
                    .collect()
            }),
            Self::Elements(elements) => elements.clone(),
            Self::Element(element) => vec![*element],
        }
    }

    /// Whether `element` is designated by the selector.
    pub fn matches<D: Document<Element = E>>(&self, doc: &D, element: E) -> bool {
        match self {
            Self::Css(css) => css
                .list()
                .is_some_and(|list| matches_selector_list(doc, element, list)),
            Self::Elements(elements) => elements.contains(&element),
            Self::Element(single) => *single == element,
        }
    }
}

impl<E> From<&str> for ElementSelector<E> {
    #[inline]
    fn from(source: &str) -> Self {
        Self::css(source)
    }
}
