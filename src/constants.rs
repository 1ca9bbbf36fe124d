// Weight initialization
pub const ORTHOGONAL_GAIN: f64 = 1.4; // Gain for every recurrent weight matrix

// Model parameters
pub const DEFAULT_NUM_LAYERS: usize = 1;
pub const DEFAULT_DROPOUT: f64 = 0.0;
pub const LAYER_NORM_EPSILON: f64 = 1e-5;

// GRU gates per layer: reset, update, new
pub const GATE_COUNT: usize = 3;

// Numerical comparison between the chunked and step-by-step paths
pub const EQUIVALENCE_TOLERANCE: f32 = 1e-5;

// Serialization
pub const MODEL_FILE_EXTENSION: &str = "bin";
pub const METADATA_FILE_SUFFIX: &str = "_meta.json";
