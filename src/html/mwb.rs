//! MWB week extraction.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::config::ParserConfig;
use crate::html::dom::{
    self, first_child_by_tag, first_p_text, has_class, has_self_or_descendant_class,
    next_sibling_element, parent_element, text_of,
};
use crate::lang::{self, Decomposed};
use crate::models::{EnhancedPart, MWBWeek};

static H1: Lazy<Selector> = Lazy::new(|| dom::selector("h1"));
static H2: Lazy<Selector> = Lazy::new(|| dom::selector("h2"));
static H3: Lazy<Selector> = Lazy::new(|| dom::selector("h3"));
static SECTION3: Lazy<Selector> = Lazy::new(|| dom::selector("#section3"));
static SECTION4: Lazy<Selector> = Lazy::new(|| dom::selector("#section4"));
static LI: Lazy<Selector> = Lazy::new(|| dom::selector("li"));
static GOLD: Lazy<Selector> = Lazy::new(|| dom::selector(".du-color--gold-700"));
static MAROON: Lazy<Selector> =
    Lazy::new(|| dom::selector(".du-color--maroon-600.du-margin-top--8.du-margin-bottom--0"));
static PGROUP: Lazy<Selector> = Lazy::new(|| dom::selector(".pGroup"));

/// Extract one `MWBWeek` from a single valid MWB week document.
/// `language` is the issue's filename language letter; `year` is the
/// issue year used to anchor the formatted `weekDate`.
pub fn extract(html: &str, language: &str, year: u16, config: &ParserConfig) -> MWBWeek {
    let doc = dom::parse_stripped(html);
    let mut week = MWBWeek::default();

    let week_date_locale = doc
        .select(&H1)
        .next()
        .map(|el| text_of(&el))
        .unwrap_or_default();
    week.week_date = Some(if config.enable_enhanced_parsing {
        lang::normalize_mwb_date(language, year, &week_date_locale)
            .unwrap_or_else(|| week_date_locale.clone())
    } else {
        week_date_locale.clone()
    });
    week.week_date_locale = Some(week_date_locale);

    week.weekly_bible_reading = doc.select(&H2).next().map(|el| text_of(&el));

    let ayf_count = compute_ayf_count(&doc);
    let lc_count = compute_lc_count(&doc);
    week.ayf_count = Some(ayf_count);
    week.lc_count = Some(lc_count);

    let segments = build_segments(&doc);
    apply_field_mapping(
        &mut week,
        &segments,
        ayf_count,
        lc_count,
        language,
        config.enable_enhanced_parsing,
    );

    week
}

fn max1(count: usize) -> u8 {
    count.saturating_sub(1).max(1) as u8
}

fn compute_ayf_count(doc: &Html) -> u8 {
    if let Some(section) = doc.select(&SECTION3).next() {
        section.select(&LI).count() as u8
    } else {
        max1(dom::count_matches(doc, &GOLD))
    }
}

fn compute_lc_count(doc: &Html) -> u8 {
    if let Some(section) = doc.select(&SECTION4).next() {
        if section.select(&LI).count() == 6 {
            2
        } else {
            1
        }
    } else {
        max1(dom::count_matches(doc, &MAROON))
    }
}

fn build_segments(doc: &Html) -> Vec<String> {
    let pgroup_buffer = build_pgroup_buffer(doc);
    let buffer = if !pgroup_buffer.is_empty() {
        pgroup_buffer
    } else {
        build_h3_fallback_buffer(doc)
    };
    buffer.split('@').map(|s| s.to_string()).collect()
}

/// Preferred source-sequence strategy: every `<li>` inside every
/// `.pGroup` contributes `"@" + <text of its first <p> child>`.
fn build_pgroup_buffer(doc: &Html) -> String {
    let mut buffer = String::new();
    for pgroup in doc.select(&PGROUP) {
        for li in pgroup.select(&LI) {
            buffer.push('@');
            if let Some(p) = first_child_by_tag(&li, "p") {
                buffer.push_str(&text_of(&p));
            }
        }
    }
    buffer
}

fn is_song(h3: &ElementRef) -> bool {
    has_class(h3, "dc-icon--music") || has_self_or_descendant_class(h3, "dc-icon--music")
}

fn is_part(h3: &ElementRef) -> bool {
    match parent_element(h3) {
        Some(parent) => !has_class(&parent, "boxContent"),
        None => true,
    }
}

/// Fallback source-sequence strategy, exercised when no `.pGroup`
/// produced any tokens. Deliberately preserves the `@junk@junk`
/// insertion bug-for-bug — the original publication HTML layout never
/// has five segments without a pGroup, so this reserves two imaginary
/// slots rather than fixing an offset that would otherwise shift every
/// downstream field.
fn build_h3_fallback_buffer(doc: &Html) -> String {
    let mut buffer = String::new();
    let mut song_ordinal = 0u32;

    for h3 in doc.select(&H3) {
        if is_song(&h3) {
            song_ordinal += 1;
            buffer.push('@');
            buffer.push_str(&text_of(&h3).replace('|', "@"));

            if song_ordinal == 2 {
                if let Some(sibling) = next_sibling_element(&h3) {
                    if sibling.value().name() == "div" {
                        let sibling_next = next_sibling_element(&sibling);
                        let next_is_h3 = sibling_next
                            .as_ref()
                            .map(|n| n.value().name() == "h3")
                            .unwrap_or(false);
                        if !next_is_h3 {
                            if let Some(div_p) = first_p_text(&sibling) {
                                buffer.push_str(&div_p);
                            }
                            if let Some(next_sib) = &sibling_next {
                                if let Some(next_p) = first_p_text(next_sib) {
                                    buffer.push(' ');
                                    buffer.push_str(&next_p);
                                }
                            }
                        }
                    }
                }
            }
        } else if is_part(&h3) {
            buffer.push('@');
            buffer.push_str(&text_of(&h3));
            if let Some(sibling) = next_sibling_element(&h3) {
                if let Some(p_text) = first_p_text(&sibling) {
                    buffer.push_str(&p_text);
                }
            }
        }
    }

    insert_junk_before_5th_at(&mut buffer);
    buffer
}

fn insert_junk_before_5th_at(buffer: &mut String) {
    if let Some((pos, _)) = buffer.match_indices('@').nth(4) {
        buffer.insert_str(pos, "@junk@junk");
    }
}

fn apply_field_mapping(
    week: &mut MWBWeek,
    segments: &[String],
    ayf_count: u8,
    lc_count: u8,
    language: &str,
    enhanced: bool,
) {
    let get = |i: usize| -> Option<&str> { segments.get(i).map(|s| s.as_str()) };
    let decompose_at = |i: usize| -> Option<Decomposed> {
        get(i).map(|raw| lang::decompose(raw, language, enhanced))
    };

    if let Some(raw) = get(1) {
        week.song_first = lang::song_number(raw);
    }

    if let Some(d) = decompose_at(3) {
        week.tgw_talk = Some(d.kind.clone().unwrap_or_else(|| d.full_title.clone()));
        week.tgw_talk_title = Some(d.full_title);
    }

    if let Some(raw) = get(4) {
        week.tgw_gems_title = Some(lang::normalize_text(raw));
    }

    if let Some(d) = decompose_at(7) {
        week.tgw_bread = Some(d.src);
        week.tgw_bread_title = Some(d.full_title);
    }

    let ayf_base = 8usize;
    for n in 1u8..=4 {
        if ayf_count >= n {
            if let Some(d) = decompose_at(ayf_base + (n as usize - 1)) {
                week.set_ayf_part(
                    n,
                    EnhancedPart {
                        time: d.time,
                        kind: d.kind,
                        title: Some(d.full_title),
                    },
                );
            }
        }
    }

    let song_middle_idx = ayf_base + ayf_count as usize + 1;
    if let Some(raw) = get(song_middle_idx) {
        week.song_middle = lang::song_number(raw);
    }

    let lc_part1_idx = ayf_base + ayf_count as usize + 2;
    if let Some(d) = decompose_at(lc_part1_idx) {
        week.set_lc_part(
            1,
            EnhancedPart {
                time: d.time,
                kind: d.kind,
                title: Some(d.full_title),
            },
        );
    }

    if lc_count == 2 {
        let lc_part2_idx = ayf_base + ayf_count as usize + 3;
        if let Some(d) = decompose_at(lc_part2_idx) {
            week.set_lc_part(
                2,
                EnhancedPart {
                    time: d.time,
                    kind: d.kind,
                    title: Some(d.full_title),
                },
            );
        }
    }

    let lc_cbs_idx = ayf_base + ayf_count as usize + lc_count as usize + 2;
    if let Some(d) = decompose_at(lc_cbs_idx) {
        week.lc_cbs = Some(d.src);
        week.lc_cbs_title = Some(d.full_title);
    }

    let song_conclude_idx = ayf_base + ayf_count as usize + lc_count as usize + 4;
    if let Some(raw) = get(song_conclude_idx) {
        week.song_conclude = lang::song_number(raw);
    }
}
