//! Integration tests for building covers from data files.

use std::io::Write;
use tempfile::NamedTempFile;

use blocklink::input::{RecordOptions, TrainingData};
use blocklink::predicates::{IndexPredicate, PrecomputedIndex, SimplePredicate};
use blocklink::{
    BlockingError, ComparisonCover, Cover, CoverConfig, DataModel, IdentifiedRecord, IndexKind,
    IndexService, ModelConfig, Parser, Predicate, PredicateFunction, RecordReader,
    VariableDefinition, VariableType,
};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

const PEOPLE: &str = "id,name,tags,city\n\
                      1,donald duck,cartoon;duck,duckburg\n\
                      2,donald trump,politics,new york\n\
                      3,daisy duck,cartoon;duck,duckburg\n\
                      4,goofy,cartoon;dog,\n\
                      5,mickey mouse,cartoon;mouse,\n";

fn people_model() -> DataModel {
    DataModel::builder()
        .config(ModelConfig::default().without_index_predicates())
        .definitions([
            VariableDefinition::field(1, VariableType::String).with_variable_name("name"),
            VariableDefinition::field(2, VariableType::Set).with_variable_name("tags"),
            VariableDefinition::field(3, VariableType::Exact)
                .with_variable_name("city")
                .with_missing(true),
        ])
        .build()
        .expect("model should build")
}

fn load_people(model: &DataModel) -> Vec<IdentifiedRecord> {
    let file = create_test_file(PEOPLE);
    let (table, source) = Parser::new().parse_file(file.path()).expect("parse failed");
    assert_eq!(source.row_count, 5);
    assert_eq!(source.format, "csv");
    assert!(source.hash.starts_with("sha256:"));
    let missing: Vec<&str> = source.columns_with_missing().map(|c| c.name.as_str()).collect();
    assert_eq!(missing, vec!["city"]);
    assert_eq!(source.columns[2].distinct, 4);

    RecordReader::with_options(
        model,
        RecordOptions {
            id_column: Some("id".to_string()),
        },
    )
    .read(&table)
    .expect("records should convert")
}

// =============================================================================
// Record Cover
// =============================================================================

#[test]
fn test_cover_from_csv() {
    let model = people_model();
    let records = load_people(&model);
    let cover = Cover::build(&model.predicates(), &records, None).expect("cover failed");

    let first_token: Predicate = SimplePredicate::new(PredicateFunction::FirstToken, 1).into();
    let covered: Vec<u64> = cover.get(&first_token).unwrap().iter().copied().collect();
    assert_eq!(covered, vec![1, 2]);

    let element: Predicate = SimplePredicate::new(PredicateFunction::CommonSetElement, 2).into();
    let covered: Vec<u64> = cover.get(&element).unwrap().iter().copied().collect();
    assert_eq!(covered, vec![1, 3, 4, 5]);

    let city: Predicate = SimplePredicate::new(PredicateFunction::WholeField, 3).into();
    let covered: Vec<u64> = cover.get(&city).unwrap().iter().copied().collect();
    assert_eq!(covered, vec![1, 3]);
}

#[test]
fn test_exists_predicate_covers_present_values() {
    let model = people_model();
    let records = load_people(&model);
    let exists = model
        .predicates()
        .into_iter()
        .find(|p| matches!(p, Predicate::Exists(_)))
        .expect("city has missing values");

    let cover = Cover::build(&[exists.clone()], &records, None).unwrap();
    let covered: Vec<u64> = cover.get(&exists).unwrap().iter().copied().collect();
    assert_eq!(covered, vec![1, 2, 3]);
}

#[test]
fn test_cover_is_shard_independent() {
    let model = people_model();
    let records = load_people(&model);
    let predicates = model.predicates();

    let reference = Cover::build_with_config(&predicates, &records, None, &CoverConfig {
        shard_size: 1,
    })
    .unwrap();
    let single = Cover::build_with_config(&predicates, &records, None, &CoverConfig {
        shard_size: 100,
    })
    .unwrap();
    assert_eq!(reference, single);
}

#[test]
fn test_ranked_report_serializes() {
    let model = people_model();
    let records = load_people(&model);
    let cover = Cover::build(&model.predicates(), &records, None).unwrap();

    let ranked = cover.ranked();
    assert!(!ranked.is_empty());
    assert!(ranked.windows(2).all(|w| w[0].size >= w[1].size));

    let json = serde_json::to_string(&ranked).unwrap();
    assert!(json.contains("\"fingerprint\":\"sha256:"));
}

// =============================================================================
// Index Predicates
// =============================================================================

#[test]
fn test_index_predicates_need_a_service() {
    let model = DataModel::new(&[VariableDefinition::field(1, VariableType::Text)]).unwrap();
    let records = vec![IdentifiedRecord::new(0, vec!["x".into(), "donald".into()])];

    let result = Cover::build(&model.predicates(), &records, None);
    assert!(matches!(result, Err(BlockingError::IndexUnavailable(_))));
}

#[test]
fn test_index_predicates_with_precomputed_index() {
    let canopy = IndexPredicate::new(IndexKind::TfidfTextCanopy, 0.8, 0);
    let mut index = PrecomputedIndex::new();
    index.insert(IndexKind::TfidfTextCanopy, 0.8, 0, &"donald duck".into(), ["7"]);
    index.insert(IndexKind::TfidfTextCanopy, 0.8, 0, &"donald  duck".into(), ["7"]);

    let records = vec![
        IdentifiedRecord::new(1, vec!["donald duck".into()]),
        IdentifiedRecord::new(2, vec!["donald  duck".into()]),
        IdentifiedRecord::new(3, vec!["goofy".into()]),
    ];
    let predicate: Predicate = canopy.into();
    let service: &dyn IndexService = &index;
    let cover = Cover::build(&[predicate.clone()], &records, Some(service)).unwrap();
    let covered: Vec<u64> = cover.get(&predicate).unwrap().iter().copied().collect();
    assert_eq!(covered, vec![1, 2]);
}

// =============================================================================
// Comparison Cover
// =============================================================================

#[test]
fn test_comparison_cover_from_training_file() {
    let file = create_test_file(
        r#"{
            "match": [
                [{"id": 1, "fields": ["donald duck"]}, {"id": 2, "fields": ["donald d"]}],
                [{"id": 3, "fields": ["goofy"]}, {"id": 4, "fields": ["goofy dog"]}]
            ],
            "distinct": [
                [{"id": 1, "fields": ["donald duck"]}, {"id": 5, "fields": ["mickey"]}]
            ]
        }"#,
    );
    let training = TrainingData::load(file.path()).expect("training data should load");
    assert_eq!(training.len(), 3);

    let first_token: Predicate = SimplePredicate::new(PredicateFunction::FirstToken, 0).into();
    let cover = ComparisonCover::build(&[first_token.clone()], &training.matches, None).unwrap();
    let covered = cover.get(&first_token).unwrap();
    assert_eq!(covered.len(), 2);
    assert!(covered.contains(&(1, 2)) && covered.contains(&(3, 4)));

    let cover = ComparisonCover::build(&[first_token.clone()], &training.distinct, None).unwrap();
    assert!(cover.get(&first_token).is_none());
}
