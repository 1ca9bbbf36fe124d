// External imports
use burn::module::Param;
use burn::nn::{Initializer, Linear, LinearConfig};
use burn::tensor::{backend::Backend, Distribution, Tensor, TensorData};
use ndarray::Array2;

/// # Orthogonal Initialization
///
/// Fills a `[rows, cols]` matrix with a scaled orthogonal matrix.
///
/// A standard normal matrix is sampled from the backend RNG (so `B::seed`
/// makes it reproducible), its columns along the longer axis are
/// orthonormalized with modified Gram-Schmidt, and the result is scaled by
/// `gain`. Gram-Schmidt produces the Q factor of a QR decomposition whose R
/// has a positive diagonal, which is the same canonical form obtained by
/// sign-correcting a Householder QR.
///
/// When `rows <= cols` the rows are orthonormal (times `gain`), otherwise
/// the columns are.
///
/// # Arguments
///
/// * `rows` - Number of rows in the produced matrix
/// * `cols` - Number of columns in the produced matrix
/// * `gain` - Scaling factor applied after orthonormalization
/// * `device` - Device to allocate the tensor on
pub fn orthogonal_tensor<B: Backend>(
    rows: usize,
    cols: usize,
    gain: f64,
    device: &B::Device,
) -> Tensor<B, 2> {
    let tall = rows >= cols;
    let (long, short) = if tall { (rows, cols) } else { (cols, rows) };

    let sample = Tensor::<B, 2>::random([long, short], Distribution::Normal(0.0, 1.0), device);
    let data = sample.into_data();
    let values: Vec<f64> = data.iter::<f32>().map(f64::from).collect();

    let mut basis = Array2::from_shape_fn((long, short), |(i, j)| values[i * short + j]);
    orthonormalize_columns(&mut basis);

    let oriented = if tall { basis } else { basis.reversed_axes() };
    // ndarray iterates in logical (row-major) order regardless of memory layout
    let scaled: Vec<f32> = oriented.iter().map(|v| (v * gain) as f32).collect();

    Tensor::from_data(TensorData::new(scaled, [rows, cols]), device)
}

/// Modified Gram-Schmidt over the columns of a tall matrix, in place.
fn orthonormalize_columns(matrix: &mut Array2<f64>) {
    for j in 0..matrix.ncols() {
        for k in 0..j {
            let projection = matrix.column(k).dot(&matrix.column(j));
            let direction = matrix.column(k).to_owned();
            matrix.column_mut(j).scaled_add(-projection, &direction);
        }

        let norm = matrix.column(j).dot(&matrix.column(j)).sqrt().max(f64::EPSILON);
        matrix.column_mut(j).mapv_inplace(|v| v / norm);
    }
}

/// Create a `Linear` layer with an orthogonal weight and a zero bias.
///
/// Burn stores linear weights as `[d_input, d_output]`. The orthogonal matrix
/// is drawn in `[d_output, d_input]` layout and transposed so the gate-major
/// orientation matches the usual recurrent weight convention.
pub fn orthogonal_linear<B: Backend>(
    d_input: usize,
    d_output: usize,
    gain: f64,
    device: &B::Device,
) -> Linear<B> {
    let mut linear = LinearConfig::new(d_input, d_output)
        .with_bias(true)
        .with_initializer(Initializer::Zeros)
        .init(device);

    let weight = orthogonal_tensor::<B>(d_output, d_input, gain, device).transpose();
    linear.weight = Param::from_tensor(weight);

    linear
}
