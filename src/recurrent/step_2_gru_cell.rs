// External imports
use burn::module::Module;
use burn::nn::{Dropout, DropoutConfig, Linear};
use burn::tensor::{activation, backend::Backend, Tensor};

// Internal imports
use super::step_1_weight_init::orthogonal_linear;
use crate::constants::GATE_COUNT;

/// # GRU Layer
///
/// A single gated recurrent layer. The input and the previous hidden state are
/// each projected once into `3 * hidden_size` gate pre-activations, which are
/// split into the reset, update and candidate parts.
///
/// ## Mathematical Representation
///
/// For input x_t at time t and previous hidden state h_(t-1):
///
/// 1. Reset gate: r_t = σ(W_r · x_t + b_ir + U_r · h_(t-1) + b_hr)
/// 2. Update gate: z_t = σ(W_z · x_t + b_iz + U_z · h_(t-1) + b_hz)
/// 3. Candidate state: n_t = tanh(W_n · x_t + b_in + r_t ∘ (U_n · h_(t-1) + b_hn))
/// 4. New hidden state: h_t = (1 - z_t) ∘ n_t + z_t ∘ h_(t-1)
///
/// Where σ is the sigmoid function and ∘ denotes element-wise multiplication.
#[derive(Module, Debug)]
pub struct GruLayer<B: Backend> {
    input_size: usize,
    hidden_size: usize,

    // Gate projections, laid out as [reset | update | new]
    input_weights: Linear<B>,
    hidden_weights: Linear<B>,
}

impl<B: Backend> GruLayer<B> {
    /// Create a new GRU layer with orthogonal weights at `gain` and zero biases
    pub fn new(input_size: usize, hidden_size: usize, gain: f64, device: &B::Device) -> Self {
        let gate_size = GATE_COUNT * hidden_size;

        let input_weights = orthogonal_linear(input_size, gate_size, gain, device);
        let hidden_weights = orthogonal_linear(hidden_size, gate_size, gain, device);

        Self {
            input_size,
            hidden_size,
            input_weights,
            hidden_weights,
        }
    }

    /// Build a layer from existing gate projections laid out as [reset | update | new]
    ///
    /// `input_weights` maps `input_size -> 3 * hidden_size` and `hidden_weights`
    /// maps `hidden_size -> 3 * hidden_size`.
    pub fn from_projections(input_weights: Linear<B>, hidden_weights: Linear<B>) -> Self {
        let [input_size, gate_size] = input_weights.weight.val().dims();
        let hidden_size = gate_size / GATE_COUNT;

        Self {
            input_size,
            hidden_size,
            input_weights,
            hidden_weights,
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Input-to-gates projection `[input_size, 3 * hidden_size]`
    pub fn input_weights(&self) -> &Linear<B> {
        &self.input_weights
    }

    /// Hidden-to-gates projection `[hidden_size, 3 * hidden_size]`
    pub fn hidden_weights(&self) -> &Linear<B> {
        &self.hidden_weights
    }

    /// Advance the recurrence by one time step
    ///
    /// # Arguments
    ///
    /// * `x_t` - Input at the current step, shape [batch_size, input_size]
    /// * `h` - Previous hidden state, shape [batch_size, hidden_size]
    ///
    /// # Returns
    ///
    /// The new hidden state, shape [batch_size, hidden_size]
    pub fn forward_step(&self, x_t: Tensor<B, 2>, h: Tensor<B, 2>) -> Tensor<B, 2> {
        let hs = self.hidden_size;

        let input_gates = self.input_weights.forward(x_t);
        let hidden_gates = self.hidden_weights.forward(h.clone());

        let r = activation::sigmoid(
            input_gates.clone().narrow(1, 0, hs) + hidden_gates.clone().narrow(1, 0, hs),
        );
        let z = activation::sigmoid(
            input_gates.clone().narrow(1, hs, hs) + hidden_gates.clone().narrow(1, hs, hs),
        );

        // The reset gate scales the hidden projection, bias included
        let n = activation::tanh(
            input_gates.narrow(1, 2 * hs, hs) + r * hidden_gates.narrow(1, 2 * hs, hs),
        );

        (Tensor::ones_like(&z) - z.clone()) * n + z * h
    }

    /// Run the layer over a time-major sequence
    ///
    /// # Arguments
    ///
    /// * `x` - Input sequence of shape [seq_len, batch_size, input_size]
    /// * `h0` - Initial hidden state of shape [batch_size, hidden_size]
    ///
    /// # Returns
    ///
    /// The hidden state at every step, shape [seq_len, batch_size, hidden_size],
    /// and the hidden state after the last step
    pub fn forward(&self, x: Tensor<B, 3>, h0: Tensor<B, 2>) -> (Tensor<B, 3>, Tensor<B, 2>) {
        let [seq_len, batch_size, _] = x.dims();

        let mut h = h0;
        let mut outputs = Vec::with_capacity(seq_len);

        for t in 0..seq_len {
            let x_t = x
                .clone()
                .narrow(0, t, 1)
                .reshape([batch_size, self.input_size]);

            h = self.forward_step(x_t, h);
            outputs.push(h.clone().reshape([1, batch_size, self.hidden_size]));
        }

        (Tensor::cat(outputs, 0), h)
    }
}

/// # Stacked GRU
///
/// `num_layers` GRU layers where layer 0 consumes the input features and every
/// deeper layer consumes the hidden sequence of the layer below. Dropout sits
/// between layers only, never after the last one, and is only active on
/// autodiff backends.
#[derive(Module, Debug)]
pub struct StackedGru<B: Backend> {
    input_size: usize,
    hidden_size: usize,
    num_layers: usize,
    dropout_rate: f64,

    layers: Vec<GruLayer<B>>,
    dropout: Dropout,
}

impl<B: Backend> StackedGru<B> {
    /// Create a stacked GRU
    ///
    /// # Arguments
    ///
    /// * `input_size` - Number of input features
    /// * `hidden_size` - Size of every layer's hidden state
    /// * `num_layers` - Number of stacked layers
    /// * `dropout_rate` - Inter-layer dropout, ignored for a single layer
    /// * `gain` - Orthogonal initialization gain for all weight matrices
    /// * `device` - Device to place tensors on
    pub fn new(
        input_size: usize,
        hidden_size: usize,
        num_layers: usize,
        dropout_rate: f64,
        gain: f64,
        device: &B::Device,
    ) -> Self {
        let dropout_rate = if num_layers > 1 { dropout_rate } else { 0.0 };

        let layers = (0..num_layers)
            .map(|index| {
                let layer_input = if index == 0 { input_size } else { hidden_size };
                GruLayer::new(layer_input, hidden_size, gain, device)
            })
            .collect();

        Self {
            input_size,
            hidden_size,
            num_layers,
            dropout_rate,
            layers,
            dropout: DropoutConfig::new(dropout_rate).init(),
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn num_layers(&self) -> usize {
        self.num_layers
    }

    /// Effective inter-layer dropout probability
    pub fn dropout_rate(&self) -> f64 {
        self.dropout_rate
    }

    pub fn layers(&self) -> &[GruLayer<B>] {
        &self.layers
    }

    /// Run every layer over the sequence
    ///
    /// # Arguments
    ///
    /// * `x` - Input sequence of shape [seq_len, batch_size, input_size]
    /// * `h0` - Initial state of shape [num_layers, batch_size, hidden_size]
    ///
    /// # Returns
    ///
    /// The top layer's hidden sequence [seq_len, batch_size, hidden_size] and
    /// the final state of every layer [num_layers, batch_size, hidden_size]
    pub fn forward(&self, x: Tensor<B, 3>, h0: Tensor<B, 3>) -> (Tensor<B, 3>, Tensor<B, 3>) {
        let batch_size = x.dims()[1];

        let mut layer_input = x;
        let mut final_states = Vec::with_capacity(self.num_layers);

        for (index, layer) in self.layers.iter().enumerate() {
            let initial = h0
                .clone()
                .narrow(0, index, 1)
                .reshape([batch_size, self.hidden_size]);

            let (output, last) = layer.forward(layer_input, initial);
            final_states.push(last.reshape([1, batch_size, self.hidden_size]));

            layer_input = if index + 1 < self.num_layers {
                self.dropout.forward(output)
            } else {
                output
            };
        }

        (layer_input, Tensor::cat(final_states, 0))
    }
}
