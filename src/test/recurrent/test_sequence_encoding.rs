// Internal imports
use super::{random_tensor, TestBackend};
use crate::error::EncoderError;
use crate::recurrent::step_4_masked_gru_arch::MaskedGruConfig;
use crate::recurrent::step_5_sequence_encoding::{
    encode_stepwise, episode_start_mask, masks_from_dones,
};
use crate::util::tensor_utils::{max_abs_diff, to_host};

#[test]
fn test_episode_start_mask_values() {
    let mask = episode_start_mask::<TestBackend>(&[true, false, false, true], &Default::default());

    assert_eq!(mask.dims(), [4]);
    assert_eq!(to_host(&mask), vec![0.0, 1.0, 1.0, 0.0]);
}

#[test]
fn test_masks_from_dones_shift_by_one_step() {
    let dones = vec![
        vec![false, true],
        vec![false, false],
        vec![true, false],
    ];
    let masks = masks_from_dones::<TestBackend>(&[true, false], &dones, &Default::default()).unwrap();

    assert_eq!(masks.dims(), [3, 2]);
    #[rustfmt::skip]
    let expected = vec![
        0.0, 1.0, // first step: column 0 starts fresh
        1.0, 0.0, // column 1 finished at t = 0
        1.0, 1.0, // column 0 finishes at t = 2, which only affects the next call
    ];
    assert_eq!(to_host(&masks), expected);
}

#[test]
fn test_masks_from_dones_rejects_ragged_rows() {
    let dones = vec![vec![false, true], vec![false]];
    let result = masks_from_dones::<TestBackend>(&[true, true], &dones, &Default::default());

    assert!(matches!(
        result,
        Err(EncoderError::ShapeMismatch { tensor: "dones", dimension: "batch", expected: 2, actual: 1 })
    ));
}

#[test]
fn test_rollout_then_replay() {
    let device = Default::default();
    let model = MaskedGruConfig::new(3, 5)
        .with_num_layers(2)
        .init::<TestBackend>(&device)
        .unwrap();

    let observations = random_tensor([6, 2, 3]);
    #[rustfmt::skip]
    let dones = vec![
        vec![false, false],
        vec![true, false],
        vec![false, false],
        vec![false, true],
        vec![false, false],
        vec![false, false],
    ];

    // Rollout loop: one step at a time with per-step episode-start flags
    let initial = model.init_hidden(2, &device);
    let mut hidden = initial.clone();
    let mut starts = vec![true, true];
    let mut outputs = Vec::new();
    for (t, done_row) in dones.iter().enumerate() {
        let obs = observations.clone().narrow(0, t, 1).reshape([2, 3]);
        let mask = episode_start_mask::<TestBackend>(&starts, &device);
        let (y, next) = model.step(obs, hidden, mask).unwrap();
        outputs.push(y.reshape([1, 2, 5]));
        hidden = next;
        starts.clone_from(done_row);
    }
    let rollout = burn::tensor::Tensor::cat(outputs, 0);

    // Replay the recorded trajectory through both sequence paths
    let masks = masks_from_dones::<TestBackend>(&[true, true], &dones, &device).unwrap();
    assert_eq!(model.chunk_plan(&masks).unwrap(), vec![0..2, 2..4, 4..6]);

    let (chunked, chunked_last) = model
        .encode(observations.clone(), initial.clone(), masks.clone())
        .unwrap();
    let (stepwise, stepwise_last) = encode_stepwise(&model, observations, initial, masks).unwrap();

    assert!(max_abs_diff(&rollout, &chunked) < 1e-5);
    assert!(max_abs_diff(&rollout, &stepwise) < 1e-5);
    assert!(max_abs_diff(&hidden, &chunked_last) < 1e-5);
    assert!(max_abs_diff(&hidden, &stepwise_last) < 1e-5);
}

#[test]
fn test_encode_stepwise_validates_mask() {
    let device = Default::default();
    let model = MaskedGruConfig::new(3, 4).init::<TestBackend>(&device).unwrap();

    let x = random_tensor([4, 2, 3]);
    let h = model.init_hidden(2, &device);
    let masks = burn::tensor::Tensor::<TestBackend, 2>::ones([3, 2], &device);

    assert!(matches!(
        encode_stepwise(&model, x, h, masks),
        Err(EncoderError::ShapeMismatch { tensor: "mask", dimension: "time", expected: 4, actual: 3 })
    ));
}
