// Internal imports
use crate::error::EncoderError;
use crate::recurrent::step_3_mask_chunking::{chunk_boundaries, chunk_ranges};

#[test]
fn test_all_ones_is_a_single_chunk() {
    let mask = vec![1.0; 5 * 2];
    let boundaries = chunk_boundaries(&mask, 5, 2).unwrap();

    assert_eq!(boundaries, vec![0, 5]);
    assert_eq!(chunk_ranges(&boundaries), vec![0..5]);
}

#[test]
fn test_zero_in_first_row_never_splits() {
    #[rustfmt::skip]
    let mask = vec![
        0.0, 0.0,
        1.0, 1.0,
        1.0, 1.0,
    ];
    assert_eq!(chunk_boundaries(&mask, 3, 2).unwrap(), vec![0, 3]);
}

#[test]
fn test_any_column_zero_splits_at_that_step() {
    #[rustfmt::skip]
    let mask = vec![
        1.0, 1.0, 1.0,
        1.0, 1.0, 1.0,
        1.0, 0.0, 1.0, // column 1 starts a new episode at t = 2
        1.0, 1.0, 1.0,
        0.0, 1.0, 0.0, // columns 0 and 2 restart at t = 4
        1.0, 1.0, 1.0,
    ];
    let boundaries = chunk_boundaries(&mask, 6, 3).unwrap();

    assert_eq!(boundaries, vec![0, 2, 4, 6]);
    assert_eq!(chunk_ranges(&boundaries), vec![0..2, 2..4, 4..6]);
}

#[test]
fn test_reset_at_every_step_gives_unit_chunks() {
    let mask = vec![0.0; 5 * 2];
    let boundaries = chunk_boundaries(&mask, 5, 2).unwrap();

    assert_eq!(boundaries, vec![0, 1, 2, 3, 4, 5]);
    assert!(chunk_ranges(&boundaries).iter().all(|range| range.len() == 1));
}

#[test]
fn test_reset_at_last_step_gives_trailing_unit_chunk() {
    let mask = vec![1.0, 1.0, 1.0, 0.0];
    assert_eq!(chunk_ranges(&chunk_boundaries(&mask, 4, 1).unwrap()), vec![0..3, 3..4]);
}

#[test]
fn test_single_step_sequence() {
    assert_eq!(chunk_boundaries(&[0.0, 1.0], 1, 2).unwrap(), vec![0, 1]);
}

#[test]
fn test_chunks_cover_sequence_exactly_once() {
    let time = 9;
    let batch = 2;
    let mask: Vec<f32> = (0..time * batch)
        .map(|i| if i % 7 == 3 { 0.0 } else { 1.0 })
        .collect();

    let ranges = chunk_ranges(&chunk_boundaries(&mask, time, batch).unwrap());
    let covered: Vec<usize> = ranges.iter().flat_map(|range| range.clone()).collect();

    assert_eq!(covered, (0..time).collect::<Vec<_>>());
    assert!(ranges.iter().all(|range| !range.is_empty()));
}

#[test]
fn test_mask_length_mismatch_is_rejected() {
    let result = chunk_boundaries(&[1.0; 5], 3, 2);
    assert_eq!(
        result,
        Err(EncoderError::MaskLength {
            expected: 6,
            actual: 5
        })
    );
}

#[test]
fn test_empty_sequence_is_rejected() {
    assert!(matches!(
        chunk_boundaries(&[], 0, 2),
        Err(EncoderError::EmptyDimension { dimension: "time", .. })
    ));
}
