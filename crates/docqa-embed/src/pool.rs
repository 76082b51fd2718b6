use anyhow::Result;
use candle_core::{DType, Tensor};

/// Mean of the unmasked token states: `[B,T,H]` x `[B,T]` -> `[B,H]`.
pub fn masked_mean(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let dims = hidden.dims();
    anyhow::ensure!(dims.len() == 3, "hidden shape must be [B,T,H], got {:?}", dims);
    let (batch, hidden_dim) = (dims[0], dims[2]);

    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let mask_3d = mask.unsqueeze(2)?.broadcast_as(hidden.shape())?;
    let sum = (hidden * &mask_3d)?.sum(1)?;
    let lengths = mask.sum_keepdim(1)?.clamp(1e-9, f64::MAX)?;
    let mean = sum.broadcast_div(&lengths)?;
    anyhow::ensure!(mean.dims() == [batch, hidden_dim], "pooled shape {:?}", mean.dims());
    Ok(mean)
}

/// Row-wise L2 normalization of a `[B,H]` tensor.
pub fn l2_normalize(t: &Tensor) -> Result<Tensor> {
    let eps_val = match t.dtype() { DType::F16 => 1e-6f64, _ => 1e-12f64 };
    let norm = t.sqr()?.sum_keepdim(1)?.sqrt()?.affine(1.0, eps_val)?;
    Ok(t.broadcast_div(&norm)?)
}

pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    l2_normalize(&masked_mean(hidden, attention_mask)?)
}
