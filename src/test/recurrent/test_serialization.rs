// External imports
use burn::tensor::Tensor;
use tempfile::tempdir;

// Internal imports
use super::{random_tensor, TestBackend};
use crate::recurrent::step_4_masked_gru_arch::MaskedGruConfig;
use crate::recurrent::step_6_model_serialization::{load_model, save_model, ModelMetadata};
use crate::util::tensor_utils::max_abs_diff;

#[test]
fn test_save_and_load_round_trip() {
    let device = Default::default();
    let dir = tempdir().unwrap();
    let model = MaskedGruConfig::new(3, 5)
        .with_num_layers(2)
        .with_dropout(0.25)
        .init::<TestBackend>(&device)
        .unwrap();

    let model_path = save_model(&model, &dir.path().join("encoder")).unwrap();
    assert_eq!(model_path, dir.path().join("encoder.bin"));
    assert!(model_path.exists(), "Weight record should be written");
    assert!(dir.path().join("encoder_meta.json").exists(), "Metadata should be written");

    let (loaded, metadata) = load_model::<TestBackend>(&dir.path().join("encoder"), &device).unwrap();
    assert_eq!(metadata.input_dim, 3);
    assert_eq!(metadata.hidden_dim, 5);
    assert_eq!(metadata.num_layers, 2);
    assert_eq!(metadata.dropout, 0.25);
    assert_eq!(metadata.crate_version, env!("CARGO_PKG_VERSION"));
    assert_eq!(loaded.dropout(), 0.25);

    // Same weights: identical outputs for the same inputs
    let x = random_tensor([4, 2, 3]);
    let h = random_tensor([2, 2, 5]);
    let masks = Tensor::<TestBackend, 2>::ones([4, 2], &device);

    let (expected, expected_last) = model.encode(x.clone(), h.clone(), masks.clone()).unwrap();
    let (actual, actual_last) = loaded.encode(x, h, masks).unwrap();
    assert!(max_abs_diff(&expected, &actual) < 1e-7);
    assert!(max_abs_diff(&expected_last, &actual_last) < 1e-7);
}

#[test]
fn test_load_without_metadata_fails() {
    let dir = tempdir().unwrap();
    let result = load_model::<TestBackend>(&dir.path().join("missing"), &Default::default());

    let message = format!("{:#}", result.err().expect("loading should fail"));
    assert!(message.contains("Failed to read metadata"), "Unexpected error: {}", message);
}

#[test]
fn test_metadata_config_round_trip() {
    let config = MaskedGruConfig::new(7, 9)
        .with_num_layers(3)
        .with_dropout(0.1)
        .with_layer_norm_epsilon(1e-6);
    let metadata = ModelMetadata::from_config(&config);

    let json = serde_json::to_string(&metadata).unwrap();
    let parsed: ModelMetadata = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, metadata);

    let rebuilt = parsed.to_config();
    assert_eq!(rebuilt.input_dim, 7);
    assert_eq!(rebuilt.hidden_dim, 9);
    assert_eq!(rebuilt.num_layers, 3);
    assert_eq!(rebuilt.dropout, 0.1);
    assert_eq!(rebuilt.layer_norm_epsilon, 1e-6);
}
