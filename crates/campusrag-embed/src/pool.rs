use anyhow::Result;
use candle_core::{DType, Tensor};

/// Mean-pool token embeddings over the attention mask, then L2-normalize.
///
/// `hidden` is `[B, T, H]`, `attention_mask` is `[B, T]`; the result is
/// `[B, H]` with unit norm per row.
pub fn masked_mean_normalize(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    anyhow::ensure!(hidden.dims().len() == 3, "hidden shape must be [B,T,H]");

    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let mask_broadcast = mask.unsqueeze(2)?.broadcast_as(hidden.shape())?;
    let summed = (hidden * &mask_broadcast)?.sum(1)?;
    let lengths = mask.sum(1)?.unsqueeze(1)?.to_dtype(summed.dtype())?;
    let mean = summed.broadcast_div(&lengths)?;

    let eps_val = match hidden.dtype() {
        DType::F16 => 1e-6f32,
        _ => 1e-12f32,
    };
    let eps = Tensor::new(&[eps_val], hidden.device())?
        .to_dtype(hidden.dtype())?
        .unsqueeze(0)?;
    let norm = mean.sqr()?.sum_keepdim(1)?.sqrt()?.broadcast_add(&eps)?;
    Ok(mean.broadcast_div(&norm)?)
}
