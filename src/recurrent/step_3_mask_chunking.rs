// External imports
use std::ops::Range;

// Internal imports
use crate::error::{EncoderError, Result};

/// # Chunk Boundaries
///
/// Splits the time axis of a `(time, batch)` mask wherever any column starts a
/// new episode. A zero in row `t` means step `t` must begin from a reset
/// state, so `t` becomes the first index of a new chunk.
///
/// Row 0 never splits: the caller's incoming state already applies at t = 0
/// and is masked by row 0 when the first chunk starts.
///
/// # Arguments
///
/// * `mask` - Row-major mask values, `time * batch` of them
/// * `time` - Sequence length
/// * `batch` - Number of columns
///
/// # Returns
///
/// `[0, s_1, ..., s_k, time]` in strictly increasing order
pub fn chunk_boundaries(mask: &[f32], time: usize, batch: usize) -> Result<Vec<usize>> {
    if time == 0 {
        return Err(EncoderError::EmptyDimension {
            tensor: "mask",
            dimension: "time",
        });
    }
    if mask.len() != time * batch {
        return Err(EncoderError::MaskLength {
            expected: time * batch,
            actual: mask.len(),
        });
    }

    let mut boundaries = vec![0];
    for t in 1..time {
        let row = &mask[t * batch..(t + 1) * batch];
        if row.iter().any(|&value| value == 0.0) {
            boundaries.push(t);
        }
    }
    boundaries.push(time);

    Ok(boundaries)
}

/// Half-open ranges between adjacent boundaries.
pub fn chunk_ranges(boundaries: &[usize]) -> Vec<Range<usize>> {
    boundaries
        .windows(2)
        .map(|pair| pair[0]..pair[1])
        .collect()
}
