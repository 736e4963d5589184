//! EPUB Document Extractor.
//!
//! Filters ZIP entries by extension, parses each as HTML/XHTML, and
//! classifies the result as a valid MWB week document or the single
//! Watchtower TOC. Study article bodies are resolved on demand from the
//! same archive by href basename.

use once_cell::sync::Lazy;
use scraper::Selector;

use crate::archive::RawArchive;
use crate::error::{CoreError, CoreResult};
use crate::html::dom;

static H1: Lazy<Selector> = Lazy::new(|| dom::selector("h1"));
static H2: Lazy<Selector> = Lazy::new(|| dom::selector("h2"));
static H3: Lazy<Selector> = Lazy::new(|| dom::selector("h3"));
static PGROUP: Lazy<Selector> = Lazy::new(|| dom::selector(".pGroup"));

fn is_html_path(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".html") || lower.ends_with(".xhtml") || lower.ends_with(".htm")
}

/// At least one `h1`, one `h2`, and at least one of `.pGroup` element
/// or `h3` element.
fn is_mwb_valid(html: &str) -> bool {
    let doc = dom::parse_stripped(html);
    doc.select(&H1).next().is_some()
        && doc.select(&H2).next().is_some()
        && (doc.select(&PGROUP).next().is_some() || doc.select(&H3).next().is_some())
}

/// At least one `h3`.
fn is_w_valid(html: &str) -> bool {
    let doc = dom::parse_stripped(html);
    doc.select(&H3).next().is_some()
}

/// Every MWB-valid HTML document in the archive, in iteration order —
/// one per week.
pub fn mwb_week_documents(archive: &RawArchive) -> CoreResult<Vec<String>> {
    let mut names: Vec<&str> = archive.names().filter(|n| is_html_path(n)).collect();
    names.sort();

    let mut docs = Vec::new();
    for name in names {
        let bytes = archive.get(name).expect("name came from archive.names()");
        let Ok(html) = std::str::from_utf8(bytes) else {
            continue;
        };
        if is_mwb_valid(html) {
            docs.push(html.to_string());
        }
    }
    Ok(docs)
}

/// The single Watchtower TOC document. More than one
/// W-valid document is `MALFORMED_CONTENT`.
pub fn w_toc_document(archive: &RawArchive) -> CoreResult<Option<String>> {
    let mut names: Vec<&str> = archive.names().filter(|n| is_html_path(n)).collect();
    names.sort();

    let mut found: Option<String> = None;
    for name in names {
        let bytes = archive.get(name).expect("name came from archive.names()");
        let Ok(html) = std::str::from_utf8(bytes) else {
            continue;
        };
        if is_w_valid(html) {
            if found.is_some() {
                return Err(CoreError::MalformedContent(
                    "more than one Watchtower TOC candidate found in EPUB".to_string(),
                ));
            }
            found = Some(html.to_string());
        }
    }
    Ok(found)
}

/// Resolve a Watchtower study article body by the TOC link's href
/// basename: an EPUB has no document-id table, so the captured token
/// from `crate::html::watchtower`'s `.+:(\w+)/$` pattern is used
/// directly as the archive entry's stem rather than parsed as an
/// integer — it is not always numeric (e.g. `article042`).
pub fn resolve_article_by_href(archive: &RawArchive, href: &str) -> Option<&str> {
    let basename = href.trim_end_matches('/').rsplit('/').next()?;
    let name = archive.find_by_stem(basename)?;
    std::str::from_utf8(archive.get(name)?).ok()
}
