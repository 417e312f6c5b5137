//! Integration tests for forest training and evaluation on patient records

use stateforest::evaluate::{accuracy, relative_importance, ConfusionMatrix};
use stateforest::model::{MaxFeatures, ModelError, RandomForestConfig};
use stateforest::pipeline::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

/// Cleaned, encoded and scaled fixture split into train/test
struct Prepared {
    names: Vec<String>,
    train_x: Vec<Vec<f64>>,
    train_y: Vec<u32>,
    test_x: Vec<Vec<f64>>,
    test_y: Vec<u32>,
}

fn prepare(rows: usize, seed: u64) -> Prepared {
    let schema = ColumnSchema::default();
    let df = create_patient_dataframe(rows);
    let mapping = OutcomeMapping::new(schema.outcome_labels.clone()).unwrap();
    let labels = mapping
        .map_column(&df, &schema.outcome_column)
        .unwrap()
        .require_all_mapped()
        .unwrap();

    let split = train_test_split(rows, 0.2, seed).unwrap();
    let (cleaned, _) = clean_records(
        &df,
        &schema,
        &CleaningOptions {
            reference_year: 2024,
            impute_scope: ImputeScope::Rows(split.train.clone()),
        },
    )
    .unwrap();
    let features = one_hot_encode(&cleaned, &schema.feature_columns).unwrap();
    let train = features.select_rows(&split.train);
    let test = features.select_rows(&split.test);
    let scaler = StandardScaler::fit(&train.rows).unwrap();

    Prepared {
        names: features.names.clone(),
        train_x: scaler.transform(&train.rows).unwrap(),
        train_y: split.train.iter().map(|&i| labels[i]).collect(),
        test_x: scaler.transform(&test.rows).unwrap(),
        test_y: split.test.iter().map(|&i| labels[i]).collect(),
    }
}

#[test]
fn test_forest_is_deterministic_for_a_seed() {
    let data = prepare(80, 3);
    let config = RandomForestConfig::new(15).unwrap().with_seed(9);

    let a = config.fit(&data.train_x, &data.train_y, &data.names).unwrap();
    let b = config.fit(&data.train_x, &data.train_y, &data.names).unwrap();

    assert_eq!(
        a.predict_batch(&data.test_x).unwrap(),
        b.predict_batch(&data.test_x).unwrap()
    );
    assert_eq!(a.feature_importances(), b.feature_importances());
}

#[test]
fn test_forest_learns_age_driven_outcome() {
    let data = prepare(120, 1);
    let forest = RandomForestConfig::new(40)
        .unwrap()
        .with_max_features(MaxFeatures::Sqrt)
        .fit(&data.train_x, &data.train_y, &data.names)
        .unwrap();

    assert_eq!(forest.classes(), &[1, 2, 3]);
    let predictions = forest.predict_batch(&data.test_x).unwrap();
    let score = accuracy(&data.test_y, &predictions).unwrap();
    assert!(score > 0.5, "Accuracy {} should beat chance on a learnable outcome", score);
}

#[test]
fn test_importances_sum_to_one() {
    let data = prepare(80, 2);
    let forest = RandomForestConfig::new(10)
        .unwrap()
        .fit(&data.train_x, &data.train_y, &data.names)
        .unwrap();

    let importances = forest.feature_importances();
    assert_eq!(importances.len(), data.names.len());
    assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    assert!(importances.iter().all(|&v| v >= 0.0));

    let ranked = relative_importance(&importances, &data.names, 30);
    assert!(ranked.len() <= 30);
    assert_eq!(ranked[0].rank, 1);
    assert!((ranked[0].relative - 100.0).abs() < 1e-9);
    assert!(ranked.windows(2).all(|w| w[0].importance >= w[1].importance));
}

#[test]
fn test_confusion_matrix_matches_test_labels() {
    let data = prepare(80, 4);
    let forest = RandomForestConfig::new(10)
        .unwrap()
        .fit(&data.train_x, &data.train_y, &data.names)
        .unwrap();
    let predictions = forest.predict_batch(&data.test_x).unwrap();
    let matrix = ConfusionMatrix::from_labels(&data.test_y, &predictions).unwrap();

    // Row sums are the true counts per class
    for (class, row) in matrix.classes().iter().zip(matrix.counts()) {
        let expected = data.test_y.iter().filter(|&&y| y == *class).count();
        assert_eq!(row.iter().sum::<usize>(), expected);
    }
    assert_eq!(matrix.total(), data.test_y.len());

    for row in matrix.normalized() {
        let sum: f64 = row.iter().sum();
        assert!(sum == 0.0 || (sum - 1.0).abs() < 1e-9);
    }
    assert!((matrix.accuracy() - accuracy(&data.test_y, &predictions).unwrap()).abs() < 1e-12);
}

#[test]
fn test_tree_export_has_one_line_per_node() {
    let data = prepare(60, 5);
    let forest = RandomForestConfig::new(6)
        .unwrap()
        .with_max_depth(Some(4))
        .with_min_samples_leaf(2)
        .fit(&data.train_x, &data.train_y, &data.names)
        .unwrap();

    let tree = forest.tree(5).unwrap();
    assert!(tree.depth() <= 4);
    let class_names = vec!["released".to_string(), "isolated".to_string(), "deceased".to_string()];
    let dot = tree.to_dot(&data.names, &class_names);

    let node_lines = dot.lines().filter(|l| l.contains("[label=")).count();
    let edge_lines = dot.lines().filter(|l| l.contains("->")).count();
    assert_eq!(node_lines, tree.n_nodes());
    assert_eq!(edge_lines, tree.n_nodes() - 1);
    assert!(dot.trim_end().ends_with('}'));

    assert!(matches!(
        forest.tree(6),
        Err(ModelError::TreeIndexOutOfRange { index: 6, n_trees: 6 })
    ));
}

#[test]
fn test_prediction_rejects_wrong_width() {
    let data = prepare(40, 6);
    let forest = RandomForestConfig::new(3)
        .unwrap()
        .fit(&data.train_x, &data.train_y, &data.names)
        .unwrap();

    let short = vec![0.0; data.names.len() - 1];
    assert!(matches!(
        forest.predict(&short),
        Err(ModelError::PredictionFeatureMismatch { .. })
    ));
}

#[test]
fn test_forest_fits_adjacent_float_values() {
    let x = f64::from_bits(1.0f64.to_bits() + 1);
    let y = f64::from_bits(x.to_bits() + 1);
    let features = vec![vec![x], vec![y], vec![x], vec![y]];
    let labels = vec![1, 2, 1, 2];

    let forest = RandomForestConfig::new(1)
        .unwrap()
        .with_max_features(MaxFeatures::All)
        .fit(&features, &labels, &["x".to_string()])
        .unwrap();

    let tree = forest.tree(0).unwrap();
    assert!(tree.n_nodes() <= 3);
    for (row, &label) in features.iter().zip(&labels) {
        let proba = forest.predict_proba(row).unwrap();
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        if tree.n_nodes() == 3 {
            assert_eq!(forest.predict(row).unwrap(), label);
        }
    }
}
