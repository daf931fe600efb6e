//! Selector matching against a [`Document`], right to left.

use super::{Combinator, ComplexSelector, CompoundSelector, SelectorList, SimpleSelector};
use crate::dom::Document;

/// Match a selector list against an element.
pub fn matches_selector_list<D: Document>(doc: &D, element: D::Element, list: &SelectorList) -> bool {
    list.selectors
        .iter()
        .any(|complex| matches_complex(doc, element, complex))
}

/// Match a complex selector against an element.
pub fn matches_complex<D: Document>(doc: &D, element: D::Element, complex: &ComplexSelector) -> bool {
    complex
        .compounds
        .len()
        .checked_sub(1)
        .is_some_and(|last| matches_from(doc, element, complex, last))
}

/// Match compounds `0..=index` with `element` standing for compound `index`.
fn matches_from<D: Document>(
    doc: &D,
    element: D::Element,
    complex: &ComplexSelector,
    index: usize,
) -> bool {
    let Some(compound) = complex.compounds.get(index) else {
        return false;
    };
    if !matches_compound(doc, element, compound) {
        return false;
    }
    let Some(left) = index.checked_sub(1) else {
        return true;
    };
    let Some(combinator) = complex.combinators.get(left) else {
        return false;
    };
    match combinator {
        Combinator::Child => doc
            .parent_element(element)
            .is_some_and(|parent| matches_from(doc, parent, complex, left)),
        Combinator::Descendant => {
            let mut ancestor = doc.parent_element(element);
            while let Some(candidate) = ancestor {
                if matches_from(doc, candidate, complex, left) {
                    return true;
                }
                ancestor = doc.parent_element(candidate);
            }
            false
        }
        Combinator::AdjacentSibling => doc
            .previous_sibling_element(element)
            .is_some_and(|sibling| matches_from(doc, sibling, complex, left)),
        Combinator::GeneralSibling => {
            let mut sibling = doc.previous_sibling_element(element);
            while let Some(candidate) = sibling {
                if matches_from(doc, candidate, complex, left) {
                    return true;
                }
                sibling = doc.previous_sibling_element(candidate);
            }
            false
        }
    }
}

/// Match a compound selector against a single element.
pub fn matches_compound<D: Document>(
    doc: &D,
    element: D::Element,
    compound: &CompoundSelector,
) -> bool {
    compound.simples.iter().all(|simple| match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(tag) => doc.tag_name(element) == tag.as_str(),
        SimpleSelector::Class(class) => doc
            .attribute(element, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|token| token == class)),
        SimpleSelector::Id(id) => doc.attribute(element, "id") == Some(id.as_str()),
        SimpleSelector::AttrExists(name) => doc.attribute(element, name).is_some(),
        SimpleSelector::AttrEquals { name, value } => {
            doc.attribute(element, name) == Some(value.as_str())
        }
    })
}
