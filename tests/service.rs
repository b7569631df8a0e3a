mod common;

use burn::backend::{Autodiff, NdArray};
use burn_highlighter::{
    datasets::DatasetError,
    pipelines::tagging::{run, AccuracyEvaluator, ArtifactStore},
    service::{protocol::handle_line, HighlightService, ServiceError},
};
use pretty_assertions::assert_eq;

#[test]
fn serves_a_trained_fold() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path(), "served");

    run::<Autodiff<NdArray>, _, _>(
        &common::config(2, 1),
        &common::folds(10, 2),
        &store,
        &AccuracyEvaluator::default(),
        &Default::default(),
    )
    .unwrap();

    let mut service = HighlightService::<NdArray>::new(dir.path(), Default::default());

    assert!(matches!(
        service.eval_model(&[1]),
        Err(ServiceError::ModelNotLoaded)
    ));

    service.load_model("served", 1).unwrap();
    assert_eq!(service.loaded_model(), Some(("served", 1)));

    for raw in [vec![-1], vec![3, -1, 7, 14], (0..15).collect::<Vec<i64>>()] {
        let response = service.eval_model(&raw).unwrap();

        assert_eq!(response.ps.len(), raw.len());
        assert!(response.ps.iter().all(|&class| class < 12));
    }

    assert!(service.eval_model(&[]).unwrap().ps.is_empty());

    assert!(matches!(
        service.eval_model(&[common::VOCAB_SIZE as i64]),
        Err(ServiceError::Dataset(DatasetError::OutOfVocabulary { .. }))
    ));

    assert!(matches!(
        service.load_model("served", 7),
        Err(ServiceError::Load(_))
    ));
    assert_eq!(service.loaded_model(), Some(("served", 1)));
}

#[test]
fn speaks_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path(), "lines");

    run::<Autodiff<NdArray>, _, _>(
        &common::config(2, 1),
        &common::folds(10, 2),
        &store,
        &AccuracyEvaluator::default(),
        &Default::default(),
    )
    .unwrap();

    let mut service = HighlightService::<NdArray>::new(dir.path(), Default::default());

    let loaded = handle_line(&mut service, r#"{"op": "load_model", "log_name": "lines", "index": 0}"#);
    assert_eq!(loaded, r#"{"loaded":"lines/0"}"#);

    let response = handle_line(&mut service, r#"{"op": "eval_model", "ids": [2, 0, 6]}"#);
    let json: serde_json::Value = serde_json::from_str(&response).unwrap();

    assert!(json["ns"].is_u64());
    assert_eq!(json["ps"].as_array().unwrap().len(), 3);
}
