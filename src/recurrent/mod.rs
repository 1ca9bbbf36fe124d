/// # Masked Recurrent Encoder Module
///
/// This module implements a stacked Gated Recurrent Unit (GRU) sequence encoder for
/// recurrent reinforcement-learning policies. Trajectory batches are time-major and a
/// single batch column may contain several concatenated episodes; a per-step mask marks
/// where each new episode begins so that the hidden state is reset there.
///
/// ## Module Structure:
///
/// 1. **step_1_weight_init**: Orthogonal weight initialization with zero biases
/// 2. **step_2_gru_cell**: GRU layer and stacked GRU recurrence with inter-layer dropout
/// 3. **step_3_mask_chunking**: Splitting the time axis at episode boundaries
/// 4. **step_4_masked_gru_arch**: The masked encoder with single-step and chunked paths
/// 5. **step_5_sequence_encoding**: Step-by-step encoding and rollout mask helpers
/// 6. **step_6_model_serialization**: Model saving and loading functionality
///
pub mod step_1_weight_init;
pub mod step_2_gru_cell;
pub mod step_3_mask_chunking;
pub mod step_4_masked_gru_arch;
pub mod step_5_sequence_encoding;
pub mod step_6_model_serialization;
