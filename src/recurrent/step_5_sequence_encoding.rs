// External imports
use burn::tensor::{backend::Backend, Tensor, TensorData};

// Internal imports
use super::step_4_masked_gru_arch::MaskedGru;
use crate::error::{check_dim, check_non_empty, Result};

/// # Step-by-step Encoding
///
/// Runs `MaskedGru::step` once per time step, threading the hidden state and
/// masking it by each mask row in turn. This is the sequential form that
/// `MaskedGru::encode` reproduces with fewer recurrence calls.
///
/// # Arguments
///
/// * `model` - The encoder
/// * `x` - Input sequence of shape [seq_len, batch_size, input_dim]
/// * `h` - Hidden state of shape [num_layers, batch_size, hidden_dim]
/// * `masks` - Shape [seq_len, batch_size]
///
/// # Returns
///
/// The stacked per-step outputs [seq_len, batch_size, hidden_dim] and the
/// hidden state after the final step
pub fn encode_stepwise<B: Backend>(
    model: &MaskedGru<B>,
    x: Tensor<B, 3>,
    h: Tensor<B, 3>,
    masks: Tensor<B, 2>,
) -> Result<(Tensor<B, 3>, Tensor<B, 3>)> {
    let [seq_len, batch_size, input_dim] = x.dims();
    check_non_empty("input", "time", seq_len)?;
    let [mask_len, mask_batch] = masks.dims();
    check_dim("mask", "time", seq_len, mask_len)?;
    check_dim("mask", "batch", batch_size, mask_batch)?;

    let mut state = h;
    let mut outputs = Vec::with_capacity(seq_len);
    for t in 0..seq_len {
        let x_t = x.clone().narrow(0, t, 1).reshape([batch_size, input_dim]);
        let mask_t = masks.clone().narrow(0, t, 1).reshape([batch_size]);

        let (output, next) = model.step(x_t, state, mask_t)?;
        outputs.push(output.reshape([1, batch_size, model.hidden_dim()]));
        state = next;
    }

    Ok((Tensor::cat(outputs, 0), state))
}

/// Build a `[batch]` step mask from per-column episode-start flags.
///
/// Columns flagged `true` get `0.0`, so their carried state is dropped before
/// the next step; all others get `1.0`.
pub fn episode_start_mask<B: Backend>(episode_starts: &[bool], device: &B::Device) -> Tensor<B, 1> {
    let values: Vec<f32> = episode_starts
        .iter()
        .map(|&starts| if starts { 0.0 } else { 1.0 })
        .collect();
    let len = values.len();

    Tensor::from_data(TensorData::new(values, [len]), device)
}

/// Build a `[seq_len, batch]` mask from `done` flags recorded during a rollout.
///
/// `dones[t][b]` marks that column `b` finished an episode at step `t`, so
/// step `t + 1` starts fresh. Row 0 is taken from `first_step_starts`, which
/// says whether each column begins a new episode at the very first step.
pub fn masks_from_dones<B: Backend>(
    first_step_starts: &[bool],
    dones: &[Vec<bool>],
    device: &B::Device,
) -> Result<Tensor<B, 2>> {
    let batch_size = first_step_starts.len();
    check_non_empty("mask", "batch", batch_size)?;
    check_non_empty("mask", "time", dones.len())?;

    for row in dones {
        check_dim("dones", "batch", batch_size, row.len())?;
    }

    // The last row of dones only affects whatever comes after this window
    let seq_len = dones.len();
    let mut values = Vec::with_capacity(seq_len * batch_size);
    values.extend(first_step_starts.iter().map(|&s| if s { 0.0f32 } else { 1.0 }));
    for row in &dones[..seq_len - 1] {
        values.extend(row.iter().map(|&done| if done { 0.0f32 } else { 1.0 }));
    }

    Ok(Tensor::from_data(
        TensorData::new(values, [seq_len, batch_size]),
        device,
    ))
}
