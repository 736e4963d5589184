//! Wire-contract tests: the `mwb_*`/`w_*` JSON keys are a contract with
//! external serializers and must be emitted verbatim; round-tripping a
//! `ParsedIssue` through JSON must be field-equal.

use jw_parser::models::{
    Container, FieldValue, IssueKey, MWBWeek, ParsedIssue, PublicationType, WStudy,
};

fn sample_issue() -> IssueKey {
    IssueKey {
        publication_type: PublicationType::Mwb,
        language: "E".to_string(),
        year: 2024,
        month: 1,
        container: Container::Jwpub,
    }
}

#[test]
fn mwb_week_uses_documented_wire_keys_and_omits_absent_fields() {
    let mut week = MWBWeek::default();
    week.week_date = Some("2024/01/01".to_string());
    week.song_first = Some(FieldValue::Num(1));
    week.ayf_count = Some(1);
    week.ayf_part1_time = Some(5);

    let json = serde_json::to_value(&week).unwrap();
    let obj = json.as_object().unwrap();

    assert_eq!(obj.get("mwb_week_date").unwrap(), "2024/01/01");
    assert_eq!(obj.get("mwb_song_first").unwrap(), 1);
    assert_eq!(obj.get("mwb_ayf_count").unwrap(), 1);
    assert_eq!(obj.get("mwb_ayf_part1_time").unwrap(), 5);

    // Fields that were never set must be omitted, not emitted as null.
    assert!(!obj.contains_key("mwb_week_date_locale"));
    assert!(!obj.contains_key("mwb_song_middle"));
    assert!(!obj.contains_key("mwb_lc_count"));
}

#[test]
fn field_value_serializes_as_an_untagged_number_or_string() {
    assert_eq!(serde_json::to_value(FieldValue::Num(7)).unwrap(), 7);
    assert_eq!(
        serde_json::to_value(FieldValue::Text("Song 200".to_string())).unwrap(),
        "Song 200"
    );
}

#[test]
fn w_study_uses_documented_wire_keys() {
    let study = WStudy {
        study_date: Some("2024/04/01".to_string()),
        study_date_locale: Some("April 1-7, 2024".to_string()),
        study_title: Some("Example Title".to_string()),
        opening_song: Some(FieldValue::Num(10)),
        concluding_song: Some(FieldValue::Text("Song 999".to_string())),
    };

    let json = serde_json::to_value(&study).unwrap();
    let obj = json.as_object().unwrap();
    assert_eq!(obj.get("w_study_date").unwrap(), "2024/04/01");
    assert_eq!(obj.get("w_study_opening_song").unwrap(), 10);
    assert_eq!(obj.get("w_study_concluding_song").unwrap(), "Song 999");
}

#[test]
fn parsed_issue_top_level_shape_matches_spec_6() {
    let mut issue = ParsedIssue::new(sample_issue());
    issue.mwb_schedules = Some(vec![MWBWeek::default()]);

    let json = serde_json::to_value(&issue).unwrap();
    let obj = json.as_object().unwrap();

    assert_eq!(obj.get("schemaVersion").unwrap(), "1.0.0");
    assert_eq!(obj.get("publicationType").unwrap(), "MWB");
    assert_eq!(obj.get("language").unwrap(), "E");
    assert_eq!(obj.get("year").unwrap(), 2024);
    assert_eq!(obj.get("month").unwrap(), 1);
    assert!(obj.contains_key("mwbSchedules"));
    assert!(!obj.contains_key("wSchedules"));
}

#[test]
fn parsed_issue_round_trips_through_json_field_equal() {
    let mut issue = ParsedIssue::new(IssueKey {
        publication_type: PublicationType::W,
        language: "K".to_string(),
        year: 2024,
        month: 4,
        container: Container::Epub,
    });
    issue.w_schedules = Some(vec![WStudy {
        study_date: Some("2024/04/01".to_string()),
        study_date_locale: Some("1-7 квітня".to_string()),
        study_title: Some("Example".to_string()),
        opening_song: Some(FieldValue::Num(3)),
        concluding_song: None,
    }]);

    let json = serde_json::to_string(&issue).unwrap();
    let reparsed: ParsedIssue = serde_json::from_str(&json).unwrap();

    assert_eq!(reparsed.schema_version, issue.schema_version);
    assert_eq!(reparsed.publication_type, issue.publication_type);
    assert_eq!(reparsed.language, issue.language);
    assert_eq!(reparsed.year, issue.year);
    assert_eq!(reparsed.month, issue.month);
    assert_eq!(reparsed.w_schedules, issue.w_schedules);
    assert_eq!(reparsed.mwb_schedules, issue.mwb_schedules);
}
