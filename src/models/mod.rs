//! Data model for extracted publication schedules.
//!
//! Field names on `MWBWeek` and `WStudy` are the wire contract: the
//! `#[serde(rename = ...)]` keys are the `mwb_*` / `w_*` keys external
//! serializers depend on and must never change without a schema version
//! bump.

use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublicationType {
    #[serde(rename = "MWB")]
    Mwb,
    #[serde(rename = "WATCHTOWER")]
    W,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Container {
    #[default]
    Jwpub,
    Epub,
}

/// Identity of one recognized publication issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueKey {
    pub publication_type: PublicationType,
    pub language: String,
    pub year: u16,
    pub month: u8,
    pub container: Container,
}

impl IssueKey {
    /// `year*100 + month` floor below which the publication is not
    /// supported.
    pub fn min_year_month(pt: PublicationType) -> u32 {
        match pt {
            PublicationType::Mwb => 202207,
            PublicationType::W => 202304,
        }
    }

    pub fn is_supported(&self) -> bool {
        let ym = self.year as u32 * 100 + self.month as u32;
        ym >= Self::min_year_month(self.publication_type)
    }
}

/// Number-or-text field: a tagged sum rather than a dynamic value, so
/// serializers can inspect the tag instead of sniffing a
/// `serde_json::Value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Num(u32),
    Text(String),
}

/// One AYF/LC/TGW enhanced decomposition: duration in minutes, a
/// classified type/content label, and the full title text.
#[derive(Debug, Clone, Default)]
pub struct EnhancedPart {
    pub time: Option<u32>,
    pub kind: Option<String>,
    pub title: Option<String>,
}

/// One midweek-meeting week, extracted from a single MWB week document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MWBWeek {
    #[serde(rename = "mwb_week_date", skip_serializing_if = "Option::is_none")]
    pub week_date: Option<String>,
    #[serde(rename = "mwb_week_date_locale", skip_serializing_if = "Option::is_none")]
    pub week_date_locale: Option<String>,
    #[serde(rename = "mwb_weekly_bible_reading", skip_serializing_if = "Option::is_none")]
    pub weekly_bible_reading: Option<String>,

    #[serde(rename = "mwb_song_first", skip_serializing_if = "Option::is_none")]
    pub song_first: Option<FieldValue>,

    #[serde(rename = "mwb_tgw_talk", skip_serializing_if = "Option::is_none")]
    pub tgw_talk: Option<String>,
    #[serde(rename = "mwb_tgw_talk_title", skip_serializing_if = "Option::is_none")]
    pub tgw_talk_title: Option<String>,

    #[serde(rename = "mwb_tgw_gems_title", skip_serializing_if = "Option::is_none")]
    pub tgw_gems_title: Option<String>,

    #[serde(rename = "mwb_tgw_bread", skip_serializing_if = "Option::is_none")]
    pub tgw_bread: Option<String>,
    #[serde(rename = "mwb_tgw_bread_title", skip_serializing_if = "Option::is_none")]
    pub tgw_bread_title: Option<String>,

    #[serde(rename = "mwb_ayf_count", skip_serializing_if = "Option::is_none")]
    pub ayf_count: Option<u8>,

    #[serde(rename = "mwb_ayf_part1_time", skip_serializing_if = "Option::is_none")]
    pub ayf_part1_time: Option<u32>,
    #[serde(rename = "mwb_ayf_part1_type", skip_serializing_if = "Option::is_none")]
    pub ayf_part1_type: Option<String>,
    #[serde(rename = "mwb_ayf_part1_title", skip_serializing_if = "Option::is_none")]
    pub ayf_part1_title: Option<String>,

    #[serde(rename = "mwb_ayf_part2_time", skip_serializing_if = "Option::is_none")]
    pub ayf_part2_time: Option<u32>,
    #[serde(rename = "mwb_ayf_part2_type", skip_serializing_if = "Option::is_none")]
    pub ayf_part2_type: Option<String>,
    #[serde(rename = "mwb_ayf_part2_title", skip_serializing_if = "Option::is_none")]
    pub ayf_part2_title: Option<String>,

    #[serde(rename = "mwb_ayf_part3_time", skip_serializing_if = "Option::is_none")]
    pub ayf_part3_time: Option<u32>,
    #[serde(rename = "mwb_ayf_part3_type", skip_serializing_if = "Option::is_none")]
    pub ayf_part3_type: Option<String>,
    #[serde(rename = "mwb_ayf_part3_title", skip_serializing_if = "Option::is_none")]
    pub ayf_part3_title: Option<String>,

    #[serde(rename = "mwb_ayf_part4_time", skip_serializing_if = "Option::is_none")]
    pub ayf_part4_time: Option<u32>,
    #[serde(rename = "mwb_ayf_part4_type", skip_serializing_if = "Option::is_none")]
    pub ayf_part4_type: Option<String>,
    #[serde(rename = "mwb_ayf_part4_title", skip_serializing_if = "Option::is_none")]
    pub ayf_part4_title: Option<String>,

    #[serde(rename = "mwb_song_middle", skip_serializing_if = "Option::is_none")]
    pub song_middle: Option<FieldValue>,

    #[serde(rename = "mwb_lc_count", skip_serializing_if = "Option::is_none")]
    pub lc_count: Option<u8>,

    #[serde(rename = "mwb_lc_part1_time", skip_serializing_if = "Option::is_none")]
    pub lc_part1_time: Option<u32>,
    #[serde(rename = "mwb_lc_part1_content", skip_serializing_if = "Option::is_none")]
    pub lc_part1_content: Option<String>,
    #[serde(rename = "mwb_lc_part1_title", skip_serializing_if = "Option::is_none")]
    pub lc_part1_title: Option<String>,

    #[serde(rename = "mwb_lc_part2_time", skip_serializing_if = "Option::is_none")]
    pub lc_part2_time: Option<u32>,
    #[serde(rename = "mwb_lc_part2_content", skip_serializing_if = "Option::is_none")]
    pub lc_part2_content: Option<String>,
    #[serde(rename = "mwb_lc_part2_title", skip_serializing_if = "Option::is_none")]
    pub lc_part2_title: Option<String>,

    #[serde(rename = "mwb_lc_cbs", skip_serializing_if = "Option::is_none")]
    pub lc_cbs: Option<String>,
    #[serde(rename = "mwb_lc_cbs_title", skip_serializing_if = "Option::is_none")]
    pub lc_cbs_title: Option<String>,

    #[serde(rename = "mwb_song_conclude", skip_serializing_if = "Option::is_none")]
    pub song_conclude: Option<FieldValue>,
}

impl MWBWeek {
    pub fn set_ayf_part(&mut self, n: u8, part: EnhancedPart) {
        match n {
            1 => {
                self.ayf_part1_time = part.time;
                self.ayf_part1_type = part.kind;
                self.ayf_part1_title = part.title;
            }
            2 => {
                self.ayf_part2_time = part.time;
                self.ayf_part2_type = part.kind;
                self.ayf_part2_title = part.title;
            }
            3 => {
                self.ayf_part3_time = part.time;
                self.ayf_part3_type = part.kind;
                self.ayf_part3_title = part.title;
            }
            4 => {
                self.ayf_part4_time = part.time;
                self.ayf_part4_type = part.kind;
                self.ayf_part4_title = part.title;
            }
            _ => {}
        }
    }

    pub fn set_lc_part(&mut self, n: u8, part: EnhancedPart) {
        match n {
            1 => {
                self.lc_part1_time = part.time;
                self.lc_part1_content = part.kind;
                self.lc_part1_title = part.title;
            }
            2 => {
                self.lc_part2_time = part.time;
                self.lc_part2_content = part.kind;
                self.lc_part2_title = part.title;
            }
            _ => {}
        }
    }
}

/// One Watchtower study article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WStudy {
    #[serde(rename = "w_study_date", skip_serializing_if = "Option::is_none")]
    pub study_date: Option<String>,
    #[serde(rename = "w_study_date_locale", skip_serializing_if = "Option::is_none")]
    pub study_date_locale: Option<String>,
    #[serde(rename = "w_study_title", skip_serializing_if = "Option::is_none")]
    pub study_title: Option<String>,
    #[serde(rename = "w_study_opening_song", skip_serializing_if = "Option::is_none")]
    pub opening_song: Option<FieldValue>,
    #[serde(
        rename = "w_study_concluding_song",
        skip_serializing_if = "Option::is_none"
    )]
    pub concluding_song: Option<FieldValue>,
}

/// The result of parsing one issue. Exactly one of `mwb_schedules` /
/// `w_schedules` is populated, matching `publication_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedIssue {
    #[serde(rename = "schemaVersion")]
    pub schema_version: String,
    #[serde(rename = "publicationType")]
    pub publication_type: PublicationType,
    pub language: String,
    pub year: u16,
    pub month: u8,
    /// Not part of the wire contract — kept for callers that need
    /// to know which container the bytes came from.
    #[serde(skip)]
    pub container: Container,
    #[serde(rename = "mwbSchedules", skip_serializing_if = "Option::is_none")]
    pub mwb_schedules: Option<Vec<MWBWeek>>,
    #[serde(rename = "wSchedules", skip_serializing_if = "Option::is_none")]
    pub w_schedules: Option<Vec<WStudy>>,
}

impl ParsedIssue {
    pub fn new(issue: IssueKey) -> Self {
        let (mwb, w) = match issue.publication_type {
            PublicationType::Mwb => (Some(Vec::new()), None),
            PublicationType::W => (None, Some(Vec::new())),
        };
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            publication_type: issue.publication_type,
            language: issue.language,
            year: issue.year,
            month: issue.month,
            container: issue.container,
            mwb_schedules: mwb,
            w_schedules: w,
        }
    }
}
