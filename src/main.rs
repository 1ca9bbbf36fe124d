// External crates
use burn::backend::NdArray;
use burn::tensor::backend::Backend as BurnBackendTrait;
use burn::tensor::{Distribution, Tensor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::env;

// Local modules
use masked_gru::constants::EQUIVALENCE_TOLERANCE;
use masked_gru::recurrent::step_5_sequence_encoding::{episode_start_mask, masks_from_dones};
use masked_gru::util::tensor_utils::max_abs_diff;
use masked_gru::MaskedGruConfig;

type Backend = NdArray<f32>;

/// Rolls out random trajectories one step at a time, then re-encodes the whole
/// batch with the chunked path and reports how far the two disagree.
fn main() -> anyhow::Result<()> {
    // Accept sequence length, batch size and episode-end probability as arguments
    let args: Vec<String> = env::args().collect();
    let seq_len: usize = args.get(1).map(|s| s.parse()).transpose()?.unwrap_or(32);
    let batch_size: usize = args.get(2).map(|s| s.parse()).transpose()?.unwrap_or(4);
    let done_probability: f64 = args.get(3).map(|s| s.parse()).transpose()?.unwrap_or(0.1);
    if !(0.0..=1.0).contains(&done_probability) {
        anyhow::bail!("done probability must be in [0, 1], got {}", done_probability);
    }
    println!(
        "Rollout: {} steps | {} columns | done probability {}",
        seq_len, batch_size, done_probability
    );

    let device = <Backend as BurnBackendTrait>::Device::default();
    let input_dim = 8;
    let config = MaskedGruConfig::new(input_dim, 16)
        .with_num_layers(2)
        .with_dropout(0.1);
    let model = config.init::<Backend>(&device)?;

    let observations = Tensor::<Backend, 3>::random(
        [seq_len, batch_size, input_dim],
        Distribution::Normal(0.0, 1.0),
        &device,
    );

    let mut rng = StdRng::seed_from_u64(7);
    let dones: Vec<Vec<bool>> = (0..seq_len)
        .map(|_| (0..batch_size).map(|_| rng.random_bool(done_probability)).collect())
        .collect();

    // Rollout: one step at a time, resetting columns whose episode just ended
    let initial = model.init_hidden(batch_size, &device);
    let mut hidden = initial.clone();
    let mut starts = vec![true; batch_size];
    let mut rollout_outputs = Vec::with_capacity(seq_len);
    for (t, done_row) in dones.iter().enumerate() {
        let obs = observations
            .clone()
            .narrow(0, t, 1)
            .reshape([batch_size, input_dim]);
        let mask = episode_start_mask::<Backend>(&starts, &device);

        let (output, next) = model.step(obs, hidden, mask)?;
        rollout_outputs.push(output.reshape([1, batch_size, model.hidden_dim()]));
        hidden = next;
        starts.clone_from(done_row);
    }
    let rollout_outputs = Tensor::cat(rollout_outputs, 0);

    // Training-style replay of the same trajectories in one call
    let masks = masks_from_dones::<Backend>(&vec![true; batch_size], &dones, &device)?;
    let chunks = model.chunk_plan(&masks)?;
    let (encoded, final_hidden) = model.encode(observations, initial, masks)?;

    let output_diff = max_abs_diff(&rollout_outputs, &encoded);
    let hidden_diff = max_abs_diff(&hidden, &final_hidden);
    println!("Chunks: {}", chunks.len());
    println!("Max output difference: {:e}", output_diff);
    println!("Max hidden state difference: {:e}", hidden_diff);

    if output_diff.max(hidden_diff) > EQUIVALENCE_TOLERANCE {
        anyhow::bail!("chunked encoding diverged from the step-by-step rollout");
    }
    println!("Chunked encoding matches the step-by-step rollout.");

    Ok(())
}
