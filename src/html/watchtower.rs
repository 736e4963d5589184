//! Watchtower TOC + article extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::config::ParserConfig;
use crate::html::dom::{self, first_descendant, next_sibling_element, text_of};
use crate::lang;
use crate::models::WStudy;

static H3: Lazy<Selector> = Lazy::new(|| dom::selector("h3"));
static DESC: Lazy<Selector> = Lazy::new(|| dom::selector(".desc"));
static A: Lazy<Selector> = Lazy::new(|| dom::selector("a"));
static H2: Lazy<Selector> = Lazy::new(|| dom::selector("h2"));
static PUBREFS: Lazy<Selector> = Lazy::new(|| dom::selector(".pubRefs"));
static BLOCK_TEACH: Lazy<Selector> = Lazy::new(|| dom::selector(".blockTeach"));

static HREF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.+:(\w+)/$").unwrap());

/// Extract every study from a Watchtower TOC document. `resolve_article`
/// looks up an article body's HTML given the link's captured id token and
/// raw href (a JWPUB resolver parses the token as the numeric
/// `MepsDocumentId`, an EPUB resolver uses the href's basename; see
/// `crate::epub`). The captured token is not assumed numeric here — it is
/// only `\w+`, and EPUB basenames are not always digits. A TOC row with
/// no matching link, unparsable href, or unresolvable article is skipped
/// silently — a per-document failure is locally recovered rather than
/// aborting the whole issue.
pub fn extract_studies(
    toc_html: &str,
    language: &str,
    config: &ParserConfig,
    resolve_article: impl Fn(&str, &str) -> Option<String>,
) -> Vec<WStudy> {
    let doc = dom::parse_stripped(toc_html);
    doc.select(&H3)
        .filter_map(|h3| extract_one(&h3, language, config, &resolve_article))
        .collect()
}

fn extract_one(
    h3: &ElementRef,
    language: &str,
    config: &ParserConfig,
    resolve_article: &impl Fn(&str, &str) -> Option<String>,
) -> Option<WStudy> {
    let study_date_raw = first_descendant(h3, &DESC)
        .map(|el| text_of(&el))
        .unwrap_or_else(|| text_of(h3));

    let sibling = next_sibling_element(h3)?;
    let link = first_descendant(&sibling, &A)?;
    let href = link.value().attr("href")?;
    let doc_id = HREF_RE.captures(href)?.get(1)?.as_str().to_string();

    let article_html = resolve_article(&doc_id, href)?;
    let article_doc = dom::parse_stripped(&article_html);

    let study_title = article_doc
        .select(&H2)
        .next()
        .map(|el| text_of(&el))
        .or_else(|| first_descendant(&sibling, &A).map(|a| text_of(&a)));

    let refs: Vec<_> = article_doc.select(&PUBREFS).collect();
    let (opening_song, concluding_song) = if refs.is_empty() {
        (None, None)
    } else {
        let opening = lang::song_number(&text_of(&refs[0]));
        let concluding = if refs.len() == 2 {
            match article_doc.select(&BLOCK_TEACH).next() {
                Some(block_teach) => next_sibling_element(&block_teach)
                    .map(|el| text_of(&el))
                    .and_then(|t| lang::song_number(&t)),
                None => lang::song_number(&text_of(refs.last().unwrap())),
            }
        } else {
            lang::song_number(&text_of(refs.last().unwrap()))
        };
        (opening, concluding)
    };

    let study_date = if config.enable_enhanced_parsing {
        lang::normalize_w_study_date(language, &study_date_raw)
            .unwrap_or_else(|| study_date_raw.clone())
    } else {
        study_date_raw.clone()
    };

    Some(WStudy {
        study_date: Some(study_date),
        study_date_locale: Some(study_date_raw),
        study_title,
        opening_song,
        concluding_song,
    })
}
