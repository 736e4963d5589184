//! Small DOM traversal helpers shared by the MWB and Watchtower
//! extractors: cursor-style traversal against an arena-backed DOM,
//! no back-pointers required.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static RT_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<rt\b[^>]*>.*?</rt\s*>").unwrap());

/// Strip ruby-text annotations before parsing: done
/// as a string pass rather than a DOM mutation, avoiding tree surgery.
pub fn strip_rt(html: &str) -> String {
    RT_TAG_RE.replace_all(html, "").into_owned()
}

pub fn parse_stripped(html: &str) -> Html {
    Html::parse_document(&strip_rt(html))
}

pub fn selector(sel: &str) -> Selector {
    Selector::parse(sel).unwrap_or_else(|e| panic!("invalid static selector {sel:?}: {e:?}"))
}

pub fn text_of(el: &ElementRef) -> String {
    crate::lang::normalize_text(&el.text().collect::<Vec<_>>().join(" "))
}

pub fn count_matches(doc: &Html, sel: &Selector) -> usize {
    doc.select(sel).count()
}

pub fn has_class(el: &ElementRef, class: &str) -> bool {
    el.value()
        .attr("class")
        .map(|c| c.split_whitespace().any(|cls| cls == class))
        .unwrap_or(false)
}

/// True if `el` itself, or any of its descendants, carries `class`.
pub fn has_self_or_descendant_class(el: &ElementRef, class: &str) -> bool {
    el.descendants()
        .filter_map(ElementRef::wrap)
        .any(|e| has_class(&e, class))
}

pub fn next_sibling_element<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    let mut cur = el.next_sibling();
    while let Some(n) = cur {
        if let Some(wrapped) = ElementRef::wrap(n) {
            return Some(wrapped);
        }
        cur = n.next_sibling();
    }
    None
}

pub fn parent_element<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.parent().and_then(ElementRef::wrap)
}

pub fn first_descendant<'a>(el: &ElementRef<'a>, sel: &Selector) -> Option<ElementRef<'a>> {
    el.select(sel).next()
}

/// First direct child element with the given tag name, as distinct
/// from `first_descendant` which searches the whole subtree — the
/// pGroup path needs the first `<p>` *child*, not just any descendant.
pub fn first_child_by_tag<'a>(el: &ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == tag)
}

pub fn first_p_text(el: &ElementRef) -> Option<String> {
    static P: Lazy<Selector> = Lazy::new(|| selector("p"));
    first_descendant(el, &P).map(|p| text_of(&p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_ruby_text_annotations() {
        let html = "<p>foo<rt>bar</rt>baz</p>";
        assert_eq!(strip_rt(html), "<p>foobaz</p>");
    }

    #[test]
    fn next_sibling_element_skips_text_nodes() {
        let doc = Html::parse_fragment("<div><h3 id=\"a\">A</h3>  <p id=\"b\">B</p></div>");
        let h3_sel = selector("#a");
        let h3 = doc.select(&h3_sel).next().unwrap();
        let sib = next_sibling_element(&h3).unwrap();
        assert_eq!(sib.value().attr("id"), Some("b"));
    }
}
