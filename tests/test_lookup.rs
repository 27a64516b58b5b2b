//! Tests for classifying new customers and the interactive entry loop

use persona::cli::{Field, LookupSession};
use persona::pipeline::{
    build_segment_table, Classifier, CustomerQuery, ErrorKind, RawEntry, Segment, SegmentError,
    SegmentTable, Sex, Source, Weighting,
};

#[path = "common/mod.rs"]
mod common;

use common::ScriptedPrompter;

fn fixture_table() -> SegmentTable {
    build_segment_table(&common::create_persona_dataframe(), Weighting::MeanOfMeans).unwrap()
}

fn entry(country: &str, source: &str, sex: &str, age: &str) -> RawEntry {
    RawEntry {
        country: country.to_string(),
        source: source.to_string(),
        sex: sex.to_string(),
        age: age.to_string(),
    }
}

#[test]
fn test_ages_in_one_bucket_share_a_row() {
    let table = fixture_table();
    let classifier = Classifier::new(&table);

    let young = classifier
        .classify(&CustomerQuery::new("bra", Source::Android, Sex::Male, 0))
        .unwrap();
    let older = classifier
        .classify(&CustomerQuery::new("bra", Source::Android, Sex::Male, 16))
        .unwrap();

    assert_eq!(young.key, older.key);
    assert_eq!(young.row, older.row);
    let row = young.row.unwrap();
    assert_eq!(row.mean_price, 10.0);
    assert_eq!(row.segment, Segment::Low);
}

#[test]
fn test_bucket_boundary_changes_key() {
    let table = fixture_table();
    let classifier = Classifier::new(&table);

    let at_sixteen = classifier
        .customer_key(&CustomerQuery::new("usa", Source::Ios, Sex::Female, 16))
        .unwrap();
    let at_seventeen = classifier
        .customer_key(&CustomerQuery::new("usa", Source::Ios, Sex::Female, 17))
        .unwrap();

    assert_eq!(at_sixteen.as_str(), "USA_IOS_FEMALE_0_16");
    assert_eq!(at_seventeen.as_str(), "USA_IOS_FEMALE_17_22");
}

#[test]
fn test_unknown_country_yields_no_row() {
    let table = fixture_table();
    let classifier = Classifier::new(&table);

    let outcome = classifier
        .classify(&CustomerQuery::new("fra", Source::Ios, Sex::Female, 30))
        .unwrap();

    assert_eq!(outcome.key.as_str(), "FRA_IOS_FEMALE_23_30");
    assert!(outcome.row.is_none());
}

#[test]
fn test_age_outside_table_range() {
    let table = fixture_table();
    let classifier = Classifier::new(&table);

    for age in [-1, 67, 120] {
        let err = classifier
            .classify(&CustomerQuery::new("bra", Source::Ios, Sex::Male, age))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation, "age {}", age);
    }

    let top = classifier
        .classify(&CustomerQuery::new("bra", Source::Ios, Sex::Male, 66))
        .unwrap();
    assert_eq!(top.key.as_str(), "BRA_IOS_MALE_41_66");
    assert!(top.row.is_some());
}

#[test]
fn test_parse_entry_normalizes_case_and_whitespace() {
    let table = fixture_table();
    let classifier = Classifier::new(&table);

    let query = classifier
        .parse_entry(&entry(" TUR ", "IOS", "Female", " 45 "))
        .unwrap();

    assert_eq!(query, CustomerQuery::new("tur", Source::Ios, Sex::Female, 45));
}

#[test]
fn test_parse_entry_rejections() {
    let table = fixture_table();
    let classifier = Classifier::new(&table);

    let cases = [
        entry("bra", "windows", "male", "30"),
        entry("bra", "ios", "other", "30"),
        entry("", "ios", "male", "30"),
        entry("bra", "ios", "male", "thirty"),
        entry("bra", "ios", "male", "30.5"),
        entry("bra", "ios", "male", "-4"),
    ];

    for case in cases {
        let err = classifier.parse_entry(&case).unwrap_err();
        assert!(err.is_input_validation(), "{:?} -> {:?}", case, err);
    }
}

#[test]
fn test_session_discards_invalid_entry_and_continues() {
    let table = fixture_table();
    let prompter = ScriptedPrompter::new(&[
        "y", "bra", "android", "male", "70", // rejected
        "y", "bra", "android", "male", "16", // accepted
        "n",
    ]);
    let mut session = LookupSession::new(Classifier::new(&table), prompter);

    let mut reported = Vec::new();
    let outcomes = session
        .run(|outcome| reported.push(outcome.key.to_string()))
        .unwrap();
    let prompter = session.into_prompter();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(reported, vec!["BRA_ANDROID_MALE_0_16"]);
    assert_eq!(prompter.rejections.len(), 1);
    assert!(matches!(
        prompter.rejections[0],
        SegmentError::AgeOutOfRange { ceiling: 66, .. }
    ));
    // The rejected entry is asked in full again rather than just its age
    assert_eq!(prompter.asked.len(), 8);
    assert_eq!(prompter.asked[4], Field::Country);
    assert_eq!(prompter.remaining(), 0);
}

#[test]
fn test_session_reports_misses() {
    let table = fixture_table();
    let prompter = ScriptedPrompter::new(&["y", "fra", "ios", "female", "30", "n"]);
    let mut session = LookupSession::new(Classifier::new(&table), prompter);

    let outcomes = session.run(|_| {}).unwrap();

    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].row.is_none());
}

#[test]
fn test_session_stops_on_decline() {
    let table = fixture_table();
    let prompter = ScriptedPrompter::new(&["n"]);
    let mut session = LookupSession::new(Classifier::new(&table), prompter);

    assert!(session.next_query().unwrap().is_none());
    assert!(session.into_prompter().asked.is_empty());
}

#[test]
fn test_session_propagates_prompt_failure() {
    let table = fixture_table();
    let prompter = ScriptedPrompter::new(&["y", "bra"]);
    let mut session = LookupSession::new(Classifier::new(&table), prompter);

    assert!(session.run(|_| {}).is_err());
}
