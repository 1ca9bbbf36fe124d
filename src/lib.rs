pub mod constants;
pub mod error;
pub mod recurrent;
pub mod util {
    pub mod tensor_utils;
}

/// Build-time package information generated by `built`
pub mod build_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub use error::{EncoderError, Result};
pub use recurrent::step_4_masked_gru_arch::{MaskedGru, MaskedGruConfig};
