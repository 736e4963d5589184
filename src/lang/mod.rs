//! Language Profile.
//!
//! Per-language month tables and regular expressions driving enhanced
//! date normalization, duration extraction, and the song-number rule.
//! Unsupported languages fall back gracefully: raw text is kept
//! verbatim and enhanced decomposition is skipped entirely.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::FieldValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    English,
    Ukrainian,
    Polish,
}

impl Lang {
    /// Resolve a filename language tag to a profile. The underlying
    /// month-name table is keyed `"K"` for Ukrainian, but filenames in
    /// the wild use `"U"` — both resolve to the same profile so
    /// Ukrainian issues are never silently dropped.
    pub fn from_code(code: &str) -> Option<Lang> {
        match code.to_ascii_uppercase().as_str() {
            "E" => Some(Lang::English),
            "K" | "U" => Some(Lang::Ukrainian),
            "P" => Some(Lang::Polish),
            _ => None,
        }
    }

    fn months(self) -> &'static [(&'static str, u8)] {
        match self {
            Lang::English => &[
                ("january", 1),
                ("february", 2),
                ("march", 3),
                ("april", 4),
                ("may", 5),
                ("june", 6),
                ("july", 7),
                ("august", 8),
                ("september", 9),
                ("october", 10),
                ("november", 11),
                ("december", 12),
            ],
            // Genitive forms, as they appear in "<day> <month-genitive>".
            Lang::Ukrainian => &[
                ("січня", 1),
                ("лютого", 2),
                ("березня", 3),
                ("квітня", 4),
                ("травня", 5),
                ("червня", 6),
                ("липня", 7),
                ("серпня", 8),
                ("вересня", 9),
                ("жовтня", 10),
                ("листопада", 11),
                ("грудня", 12),
            ],
            Lang::Polish => &[
                ("stycznia", 1),
                ("lutego", 2),
                ("marca", 3),
                ("kwietnia", 4),
                ("maja", 5),
                ("czerwca", 6),
                ("lipca", 7),
                ("sierpnia", 8),
                ("września", 9),
                ("października", 10),
                ("listopada", 11),
                ("grudnia", 12),
            ],
        }
    }

    fn month_number(self, name: &str) -> Option<u8> {
        let key = name.trim().to_lowercase();
        self.months()
            .iter()
            .find(|(month_name, _)| *month_name == key)
            .map(|(_, n)| *n)
    }

    /// English captures `(month-name, day)`; Ukrainian/Polish capture
    /// `(day, [endDay], month-name)`.
    fn mwb_date_re(self) -> &'static Regex {
        static EN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)([A-Za-z]+)\s+(\d{1,2})").unwrap());
        static OTHER: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"(\d{1,2})(?:[-–](\d{1,2}))?\s+(\D+)").unwrap());
        match self {
            Lang::English => &EN,
            Lang::Ukrainian | Lang::Polish => &OTHER,
        }
    }

    /// English captures `(month-name, day, [endDay], year)`; Ukrainian/
    /// Polish capture `(day, [endDay], month-name, year)`. The leading
    /// "Study Article N:" ordinal is not captured here: it plays no
    /// role in date assembly, and anchoring on its literal prefix text
    /// would reproduce a formatting quirk rather than the intended
    /// behavior (see DESIGN.md Open Question decisions).
    fn w_date_re(self) -> &'static Regex {
        static EN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?i)([A-Za-z]+)\s+(\d{1,2})(?:[-–](\d{1,2}))?,?\s*(\d{4})").unwrap()
        });
        static OTHER: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(\d{1,2})(?:[-–](\d{1,2}))?\s+(\D+?),?\s*(\d{4})").unwrap()
        });
        match self {
            Lang::English => &EN,
            Lang::Ukrainian | Lang::Polish => &OTHER,
        }
    }

    /// Per-language duration marker, anchored on the language's minutes
    /// word (English/Polish `min.`, Ukrainian `хв.`).
    fn minutes_re(self) -> &'static Regex {
        static MIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d+)\s*min\.").unwrap());
        static KHV: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*хв\.").unwrap());
        match self {
            Lang::English | Lang::Polish => &MIN,
            Lang::Ukrainian => &KHV,
        }
    }
}

/// Trim and fold non-breaking spaces to regular spaces, the minimal
/// normalization applied to extracted heading text.
pub fn normalize_text(raw: &str) -> String {
    raw.replace('\u{00A0}', " ").trim().to_string()
}

/// MWB week-date normalization. Returns `Some(weekDate)` on
/// a successful match, `None` when there is no profile for `lang_code`
/// or the pattern does not match — in both cases the caller should fall
/// back to the locale text.
pub fn normalize_mwb_date(lang_code: &str, year: u16, raw_locale: &str) -> Option<String> {
    let lang = Lang::from_code(lang_code)?;
    let caps = lang.mwb_date_re().captures(raw_locale)?;

    let (month_str, day_str) = match lang {
        Lang::English => (caps.get(1)?.as_str(), caps.get(2)?.as_str()),
        Lang::Ukrainian | Lang::Polish => (caps.get(3)?.as_str(), caps.get(1)?.as_str()),
    };

    let month = lang.month_number(month_str)?;
    let day: u8 = day_str.parse().ok()?;
    Some(format!("{year:04}/{month:02}/{day:02}"))
}

/// Watchtower study-date normalization. The year is read
/// from the matched text itself, not the issue metadata.
pub fn normalize_w_study_date(lang_code: &str, raw_locale: &str) -> Option<String> {
    let lang = Lang::from_code(lang_code)?;
    let caps = lang.w_date_re().captures(raw_locale)?;

    let (month_str, day_str, year_str) = match lang {
        Lang::English => (caps.get(1)?.as_str(), caps.get(2)?.as_str(), caps.get(4)?.as_str()),
        Lang::Ukrainian | Lang::Polish => {
            (caps.get(3)?.as_str(), caps.get(1)?.as_str(), caps.get(4)?.as_str())
        }
    };

    let month = lang.month_number(month_str)?;
    let day: u8 = day_str.parse().ok()?;
    let year: u16 = year_str.parse().ok()?;
    Some(format!("{year:04}/{month:02}/{day:02}"))
}

/// Song-number rule: the first integer in `1..=162` becomes
/// a numeric field value; otherwise the original text is kept; empty
/// input yields `None`.
pub fn song_number(raw: &str) -> Option<FieldValue> {
    static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(m) = DIGITS.find(trimmed) {
        if let Ok(n) = m.as_str().parse::<u32>() {
            if (1..=162).contains(&n) {
                return Some(FieldValue::Num(n));
            }
        }
    }
    Some(FieldValue::Text(trimmed.to_string()))
}

/// One AYF/LC/TGW enhanced source decomposition of a raw `@`-segment.
/// `kind`/`full_title` come from the numbered-prefix regex; `src` is
/// the parenthetical substring; `time` is the duration in minutes.
/// When there is no language profile, decomposition is skipped
/// entirely and `full_title`/`src` both carry the raw trimmed text,
/// with `enhanced = false` so callers know not to populate the
/// type/content/time sub-fields.
pub struct Decomposed {
    pub enhanced: bool,
    pub time: Option<u32>,
    pub kind: Option<String>,
    pub full_title: String,
    pub src: String,
}

static TYPE_TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.\s*(.+?)(?:\s*\(|$)").unwrap());

pub fn decompose(raw: &str, lang_code: &str, enhanced_parsing_enabled: bool) -> Decomposed {
    let text = normalize_text(raw);

    let lang = if enhanced_parsing_enabled {
        Lang::from_code(lang_code)
    } else {
        None
    };

    let Some(lang) = lang else {
        return Decomposed {
            enhanced: false,
            time: None,
            kind: None,
            full_title: text.clone(),
            src: text,
        };
    };

    let time = lang
        .minutes_re()
        .captures(&text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());

    let (kind, full_title) = match TYPE_TITLE_RE.captures(&text) {
        Some(caps) => {
            let num = &caps[1];
            let title = caps[2].trim();
            (Some(title.to_string()), format!("{num}. {title}"))
        }
        None => (None, text.clone()),
    };

    let src = extract_parenthetical(&text);

    Decomposed {
        enhanced: true,
        time,
        kind,
        full_title,
        src,
    }
}

/// The substring between the first `(` and the last `)`, trimmed; the
/// whole (trimmed) text if there are no parentheses.
fn extract_parenthetical(text: &str) -> String {
    let open = text.find('(');
    let close = text.rfind(')');
    match (open, close) {
        (Some(o), Some(c)) if o < c => text[o + 1..c].trim().to_string(),
        _ => text.trim().to_string(),
    }
}
