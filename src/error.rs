use thiserror::Error;

/// Contract violations raised before any numeric work is done.
///
/// Failures inside the tensor runtime itself are not represented here; they
/// surface from `burn` unchanged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncoderError {
    #[error("{tensor}: expected {dimension} = {expected}, got {actual}")]
    ShapeMismatch {
        tensor: &'static str,
        dimension: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{tensor}: {dimension} must be non-zero")]
    EmptyDimension {
        tensor: &'static str,
        dimension: &'static str,
    },

    #[error("{tensor}: expected output shape {expected:?}, got {actual:?}")]
    OutputShape {
        tensor: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("mask holds {actual} values, expected {expected} (time * batch)")]
    MaskLength { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EncoderError>;

/// Compare one dimension of an input tensor against what the encoder expects.
pub(crate) fn check_dim(
    tensor: &'static str,
    dimension: &'static str,
    expected: usize,
    actual: usize,
) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(EncoderError::ShapeMismatch {
            tensor,
            dimension,
            expected,
            actual,
        })
    }
}

pub(crate) fn check_non_empty(
    tensor: &'static str,
    dimension: &'static str,
    size: usize,
) -> Result<()> {
    if size == 0 {
        Err(EncoderError::EmptyDimension { tensor, dimension })
    } else {
        Ok(())
    }
}

pub(crate) fn check_output_shape<const D: usize>(
    tensor: &'static str,
    expected: [usize; D],
    actual: [usize; D],
) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(EncoderError::OutputShape {
            tensor,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        })
    }
}
