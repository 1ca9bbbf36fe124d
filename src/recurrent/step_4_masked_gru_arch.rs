// External imports
use burn::config::Config;
use burn::module::Module;
use burn::nn::{LayerNorm, LayerNormConfig};
use burn::tensor::{backend::Backend, Tensor};
use log::debug;
use std::ops::Range;

// Internal imports
use super::step_2_gru_cell::StackedGru;
use super::step_3_mask_chunking::{chunk_boundaries, chunk_ranges};
use crate::constants::{
    DEFAULT_DROPOUT, DEFAULT_NUM_LAYERS, LAYER_NORM_EPSILON, ORTHOGONAL_GAIN,
};
use crate::error::{self, check_dim, check_non_empty, check_output_shape, EncoderError};

/// Configuration for the MaskedGru encoder
#[derive(Config, Debug)]
pub struct MaskedGruConfig {
    /// Number of input features per time step
    pub input_dim: usize,
    /// Size of every layer's hidden state and of the encoder output
    pub hidden_dim: usize,
    /// Number of stacked GRU layers
    #[config(default = "DEFAULT_NUM_LAYERS")]
    pub num_layers: usize,
    /// Inter-layer dropout, forced to zero for a single layer
    #[config(default = "DEFAULT_DROPOUT")]
    pub dropout: f64,
    /// Epsilon of the output layer normalization
    #[config(default = "LAYER_NORM_EPSILON")]
    pub layer_norm_epsilon: f64,
}

impl MaskedGruConfig {
    /// Check the configuration without allocating anything
    pub fn validate(&self) -> error::Result<()> {
        if self.input_dim == 0 {
            return Err(EncoderError::InvalidConfig("input_dim must be positive".into()));
        }
        if self.hidden_dim == 0 {
            return Err(EncoderError::InvalidConfig("hidden_dim must be positive".into()));
        }
        if self.num_layers == 0 {
            return Err(EncoderError::InvalidConfig("num_layers must be positive".into()));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(EncoderError::InvalidConfig(format!(
                "dropout must be in [0, 1), got {}",
                self.dropout
            )));
        }
        if self.layer_norm_epsilon <= 0.0 {
            return Err(EncoderError::InvalidConfig(format!(
                "layer_norm_epsilon must be positive, got {}",
                self.layer_norm_epsilon
            )));
        }
        Ok(())
    }

    /// Dropout actually applied between layers
    pub fn effective_dropout(&self) -> f64 {
        if self.num_layers > 1 {
            self.dropout
        } else {
            0.0
        }
    }

    /// Initialize an encoder from this configuration
    ///
    /// Recurrent weights are orthogonal at `ORTHOGONAL_GAIN`, recurrent biases
    /// are zero, and the layer norm starts with unit scale and zero shift.
    pub fn init<B: Backend>(&self, device: &B::Device) -> error::Result<MaskedGru<B>> {
        self.validate()?;

        let gru = StackedGru::new(
            self.input_dim,
            self.hidden_dim,
            self.num_layers,
            self.effective_dropout(),
            ORTHOGONAL_GAIN,
            device,
        );
        let layer_norm = LayerNormConfig::new(self.hidden_dim)
            .with_epsilon(self.layer_norm_epsilon)
            .init(device);

        Ok(MaskedGru {
            input_dim: self.input_dim,
            hidden_dim: self.hidden_dim,
            num_layers: self.num_layers,
            layer_norm_epsilon: self.layer_norm_epsilon,
            gru,
            layer_norm,
        })
    }
}

/// # MaskedGru
///
/// A stacked GRU followed by layer normalization that resets hidden state at
/// episode boundaries inside a batch of time-major trajectories.
///
/// The state is threaded by the caller: every call is a pure function of
/// `(x, h, mask)`. A mask value of `0.0` at `(t, b)` zeroes the carried state
/// of column `b` before step `t` is computed; `1.0` carries it through.
///
/// `encode` splits the time axis at every step where any column resets and
/// runs the recurrence once per chunk. The result equals calling `step` once
/// per time step.
#[derive(Module, Debug)]
pub struct MaskedGru<B: Backend> {
    input_dim: usize,
    hidden_dim: usize,
    num_layers: usize,
    layer_norm_epsilon: f64,

    gru: StackedGru<B>,
    layer_norm: LayerNorm<B>,
}

impl<B: Backend> MaskedGru<B> {
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    pub fn num_layers(&self) -> usize {
        self.num_layers
    }

    /// Effective inter-layer dropout probability
    pub fn dropout(&self) -> f64 {
        self.gru.dropout_rate()
    }

    /// Configuration that rebuilds an encoder of the same architecture
    pub fn config(&self) -> MaskedGruConfig {
        MaskedGruConfig::new(self.input_dim, self.hidden_dim)
            .with_num_layers(self.num_layers)
            .with_dropout(self.dropout())
            .with_layer_norm_epsilon(self.layer_norm_epsilon)
    }

    /// The underlying recurrence
    pub fn gru(&self) -> &StackedGru<B> {
        &self.gru
    }

    /// The output normalization
    pub fn layer_norm(&self) -> &LayerNorm<B> {
        &self.layer_norm
    }

    /// Zero hidden state of shape [num_layers, batch_size, hidden_dim]
    pub fn init_hidden(&self, batch_size: usize, device: &B::Device) -> Tensor<B, 3> {
        Tensor::zeros([self.num_layers, batch_size, self.hidden_dim], device)
    }

    /// Process a single time step, as in a rollout loop
    ///
    /// # Arguments
    ///
    /// * `x` - Observation features of shape [batch_size, input_dim]
    /// * `h` - Hidden state of shape [num_layers, batch_size, hidden_dim]
    /// * `mask` - Shape [batch_size]; 0.0 where an episode starts at this step
    ///
    /// # Returns
    ///
    /// The normalized output [batch_size, hidden_dim] and the new hidden state
    pub fn step(
        &self,
        x: Tensor<B, 2>,
        h: Tensor<B, 3>,
        mask: Tensor<B, 1>,
    ) -> error::Result<(Tensor<B, 2>, Tensor<B, 3>)> {
        let [batch_size, input_dim] = x.dims();
        check_non_empty("input", "batch", batch_size)?;
        check_dim("input", "input_dim", self.input_dim, input_dim)?;
        self.check_hidden(&h, batch_size)?;
        check_dim("mask", "batch", batch_size, mask.dims()[0])?;

        let sequence = x.reshape([1, batch_size, input_dim]);
        let (output, next) = self.masked_chunk(sequence, h, mask);

        let output = self
            .layer_norm
            .forward(output.reshape([batch_size, self.hidden_dim]));

        check_output_shape("output", [batch_size, self.hidden_dim], output.dims())?;
        check_output_shape(
            "hidden state",
            [self.num_layers, batch_size, self.hidden_dim],
            next.dims(),
        )?;

        Ok((output, next))
    }

    /// Encode a time-major sequence that may span several episodes per column
    ///
    /// # Arguments
    ///
    /// * `x` - Input sequence of shape [seq_len, batch_size, input_dim]
    /// * `h` - Hidden state of shape [num_layers, batch_size, hidden_dim]
    /// * `masks` - Shape [seq_len, batch_size]; 0.0 where an episode starts
    ///
    /// # Returns
    ///
    /// The normalized output sequence [seq_len, batch_size, hidden_dim] and
    /// the hidden state after the final step
    pub fn encode(
        &self,
        x: Tensor<B, 3>,
        h: Tensor<B, 3>,
        masks: Tensor<B, 2>,
    ) -> error::Result<(Tensor<B, 3>, Tensor<B, 3>)> {
        let [seq_len, batch_size, input_dim] = x.dims();
        check_non_empty("input", "time", seq_len)?;
        check_non_empty("input", "batch", batch_size)?;
        check_dim("input", "input_dim", self.input_dim, input_dim)?;
        self.check_hidden(&h, batch_size)?;
        let [mask_len, mask_batch] = masks.dims();
        check_dim("mask", "time", seq_len, mask_len)?;
        check_dim("mask", "batch", batch_size, mask_batch)?;

        if seq_len == 1 {
            let (output, next) = self.step(
                x.reshape([batch_size, input_dim]),
                h,
                masks.reshape([batch_size]),
            )?;
            return Ok((output.reshape([1, batch_size, self.hidden_dim]), next));
        }

        let chunks = self.chunk_plan(&masks)?;
        debug!(
            "encoding {} steps x {} columns in {} chunk(s)",
            seq_len,
            batch_size,
            chunks.len()
        );

        let mut state = h;
        let mut outputs = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let inputs = x.clone().narrow(0, chunk.start, chunk.len());
            let reset = masks
                .clone()
                .narrow(0, chunk.start, 1)
                .reshape([batch_size]);

            let (output, next) = self.masked_chunk(inputs, state, reset);
            outputs.push(output);
            state = next;
        }

        // Normalization runs once over the reassembled sequence
        let output = self.layer_norm.forward(Tensor::cat(outputs, 0));

        check_output_shape(
            "output",
            [seq_len, batch_size, self.hidden_dim],
            output.dims(),
        )?;
        check_output_shape(
            "hidden state",
            [self.num_layers, batch_size, self.hidden_dim],
            state.dims(),
        )?;

        Ok((output, state))
    }

    /// Time ranges `encode` runs the recurrence over for the given masks
    pub fn chunk_plan(&self, masks: &Tensor<B, 2>) -> error::Result<Vec<Range<usize>>> {
        let [seq_len, batch_size] = masks.dims();
        let data = masks.to_data();
        let values: Vec<f32> = data.iter::<f32>().collect();

        let boundaries = chunk_boundaries(&values, seq_len, batch_size)?;
        Ok(chunk_ranges(&boundaries))
    }

    /// Mask the carried state by one mask row, then run the recurrence over
    /// the whole sub-sequence starting from it
    fn masked_chunk(
        &self,
        x: Tensor<B, 3>,
        h: Tensor<B, 3>,
        mask_row: Tensor<B, 1>,
    ) -> (Tensor<B, 3>, Tensor<B, 3>) {
        let batch_size = h.dims()[1];
        // Broadcast over layers and hidden features
        let keep = mask_row.reshape([1, batch_size, 1]);

        self.gru.forward(x, h * keep)
    }

    fn check_hidden(&self, h: &Tensor<B, 3>, batch_size: usize) -> error::Result<()> {
        let [num_layers, hidden_batch, hidden_dim] = h.dims();
        check_dim("hidden state", "num_layers", self.num_layers, num_layers)?;
        check_dim("hidden state", "hidden_dim", self.hidden_dim, hidden_dim)?;
        check_dim("hidden state", "batch", batch_size, hidden_batch)
    }
}
