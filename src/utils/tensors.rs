use burn::tensor::{backend::Backend, Data, Shape, Tensor};
use candle_core::DType;

/// Copy a tensor read by `candle` into a Burn float tensor of the same shape
pub fn from_candle<B: Backend, const D: usize>(
    tensor: &candle_core::Tensor,
    device: &B::Device,
) -> candle_core::Result<Tensor<B, D>> {
    let dims: [usize; D] = tensor.dims().try_into().map_err(|_| {
        candle_core::Error::Msg(format!(
            "expected a {D}-dimensional tensor, found shape {:?}",
            tensor.dims()
        ))
    })?;

    let values = tensor.to_dtype(DType::F32)?.flatten_all()?.to_vec1::<f32>()?;

    Ok(Tensor::from_data(
        Data::new(values, Shape::new(dims)).convert::<B::FloatElem>(),
        device,
    ))
}

#[cfg(test)]
mod tests {
    use burn::backend::{ndarray::NdArrayDevice, NdArray};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn keeps_shape_and_values() {
        let source = candle_core::Tensor::new(
            &[[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]],
            &candle_core::Device::Cpu,
        )
        .unwrap();

        let tensor: Tensor<NdArray, 2> = from_candle(&source, &NdArrayDevice::Cpu).unwrap();

        assert_eq!(tensor.dims(), [2, 3]);
        assert_eq!(
            tensor.into_data().convert::<f32>().value,
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
    }

    #[test]
    fn rejects_rank_mismatches() {
        let source =
            candle_core::Tensor::new(&[1.0f32, 2.0], &candle_core::Device::Cpu).unwrap();

        let result = from_candle::<NdArray, 2>(&source, &NdArrayDevice::Cpu);

        assert!(result.is_err());
    }
}
