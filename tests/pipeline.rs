//! End-to-end conversion through the file boundary.
//!
//! Mirrors the production flow: a flat parameter dictionary is nested and
//! normalized, repacked, and written next to the input; a failed validation
//! leaves no output behind.

use std::fs;

use tempfile::tempdir;

use texpack::{nest_document, repack_document, ChannelGrouping, DEFAULT_DELIMITER};

fn conv_weight(features: usize, channels: usize) -> serde_json::Value {
    // (features, channels, 1, 1) filled with distinct values
    let tensor: Vec<Vec<Vec<Vec<f64>>>> = (0..features)
        .map(|f| {
            (0..channels)
                .map(|c| vec![vec![(f * channels + c) as f64]])
                .collect()
        })
        .collect();
    serde_json::json!(tensor)
}

#[test]
fn flat_dictionary_to_packed_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("model.json");

    let flat = serde_json::json!({
        "model.0.weight": conv_weight(2, 8),
        "model.0.bias": [0.0, 0.0],
        "model.1.weight": conv_weight(4, 4),
    });
    fs::write(&input, serde_json::to_string(&flat).unwrap()).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&input).unwrap()).unwrap();
    let nested = nest_document(&parsed, DEFAULT_DELIMITER).unwrap();
    let (packed, report) = repack_document(&nested, &ChannelGrouping::default()).unwrap();

    let output = dir.path().join("formatted_model.json");
    fs::write(&output, serde_json::to_string(&packed).unwrap()).unwrap();

    assert_eq!(report.repacked.len(), 2);
    assert_eq!(report.skipped, 1);

    // reparse the written file and check the packed shapes
    let reread: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let first = &reread["model"][0]["weight"];

    // (2, 8, 1, 1) → (2, 2, 1, 1, 4)
    assert_eq!(first.as_array().unwrap().len(), 2);
    assert_eq!(first[0].as_array().unwrap().len(), 2);
    assert_eq!(first[0][0][0][0].as_array().unwrap().len(), 4);

    // channels of feature 0 were 0..8, texel 0 holds the first four
    assert_eq!(first[0][0][0][0], serde_json::json!([0, 1, 2, 3]));
    assert_eq!(first[0][1][0][0], serde_json::json!([4, 5, 6, 7]));

    // the bias survived untouched (integral floats serialize as integers)
    assert_eq!(reread["model"][0]["bias"], serde_json::json!([0, 0]));
}

#[test]
fn failed_validation_writes_nothing() {
    let dir = tempdir().unwrap();

    // 5 input channels: post-permute trailing axis is not a multiple of 4
    let nested = serde_json::json!({
        "model": [{"weight": conv_weight(2, 5)}]
    });

    let result = repack_document(&nested, &ChannelGrouping::default());
    assert!(result.is_err());

    // the conversion aborted before anything was produced to write
    let output = dir.path().join("formatted_model.json");
    assert!(!output.exists());
}

#[test]
fn unflatten_digit_modules_become_arrays() {
    let flat = serde_json::json!({
        "layers.0.weight": [1, 2],
        "layers.2.weight": [3, 4],
        "epsilon": 0.001,
    });

    let nested = nest_document(&flat, DEFAULT_DELIMITER).unwrap();
    // sparse digit keys compact in numeric order
    assert_eq!(
        nested,
        serde_json::json!({
            "layers": [{"weight": [1, 2]}, {"weight": [3, 4]}],
            "epsilon": 0.001,
        })
    );
}
