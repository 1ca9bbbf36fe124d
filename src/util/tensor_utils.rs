// External imports
use burn::tensor::{backend::Backend, Tensor};

/// Copy a tensor's values to the host in row-major order
pub fn to_host<B: Backend, const D: usize>(tensor: &Tensor<B, D>) -> Vec<f32> {
    let data = tensor.to_data();
    data.iter::<f32>().collect()
}

/// Largest absolute element-wise difference between two same-shaped tensors
pub fn max_abs_diff<B: Backend, const D: usize>(a: &Tensor<B, D>, b: &Tensor<B, D>) -> f32 {
    let diff = (a.clone() - b.clone()).abs().max();
    to_host(&diff).into_iter().fold(0.0, f32::max)
}
