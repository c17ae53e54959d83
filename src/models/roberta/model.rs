use std::{collections::HashMap, path::Path};

use bert_burn::{
    data::BertInferenceBatch,
    model::{BertModel, BertModelOutput},
};
use burn::{
    module::{Module, Param},
    nn::{Dropout, DropoutConfig, Linear},
    tensor::{activation::softmax, backend::Backend, Tensor},
};

use crate::{models::ModelError, utils::tensors::from_candle};

use super::Config;

/// The RoBERTa sequence classification head: a tanh-activated projection of the `<s>` token
/// followed by the output projection
#[derive(Module, Debug)]
pub struct ClassificationHead<B: Backend> {
    /// Hidden projection
    pub dense: Linear<B>,

    /// Dropout applied before each projection
    pub dropout: Dropout,

    /// Projection onto the class logits
    pub out_proj: Linear<B>,
}

impl<B: Backend> ClassificationHead<B> {
    /// Map `[batch_size, hidden_size]` features to `[batch_size, n_classes]` logits
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.dropout.forward(features);
        let x = self.dense.forward(x).tanh();
        let x = self.dropout.forward(x);

        self.out_proj.forward(x)
    }

    /// Load the head from the `classifier.*` tensors of a Hugging Face checkpoint
    pub fn from_safetensors(
        model_file: &Path,
        device: &B::Device,
        dropout_prob: f64,
    ) -> Result<Self, ModelError> {
        let tensors = candle_core::safetensors::load(model_file, &candle_core::Device::Cpu)?;

        Ok(Self {
            dense: load_linear(&tensors, "classifier.dense", device)?,
            dropout: DropoutConfig::new(dropout_prob).init(),
            out_proj: load_linear(&tensors, "classifier.out_proj", device)?,
        })
    }
}

/// XLM-RoBERTa for sequence classification
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    /// The base encoder
    pub model: BertModel<B>,

    /// Classification head over the first token
    pub classifier: ClassificationHead<B>,

    /// Total number of classes
    pub n_classes: usize,
}

/// Define model behavior
impl<B: Backend> Model<B> {
    /// Load the encoder and the classification head from a safetensors checkpoint
    pub fn from_safetensors(
        device: &B::Device,
        model_file: &Path,
        config: &Config,
    ) -> Result<Self, ModelError> {
        let n_classes = config.n_classes();
        if n_classes == 0 {
            return Err(ModelError::NoClasses);
        }

        let record = BertModel::<B>::from_safetensors(
            model_file.to_path_buf(),
            device,
            config.model.clone(),
        );

        let model = config.model.init::<B>(device).load_record(record);

        let classifier = ClassificationHead::from_safetensors(
            model_file,
            device,
            config.model.hidden_dropout_prob,
        )?;

        Ok(Self {
            model,
            classifier,
            n_classes,
        })
    }

    /// Defines forward pass for inference, returning class probabilities
    pub fn infer(&self, input: BertInferenceBatch<B>) -> Tensor<B, 2> {
        let [batch_size, _seq_length] = input.tokens.dims();

        let BertModelOutput { hidden_states, .. } = self.model.forward(input);

        let [_, _, hidden_size] = hidden_states.dims();

        let features = hidden_states
            .slice([0..batch_size, 0..1])
            .reshape([batch_size, hidden_size]);

        softmax(self.classifier.forward(features), 1)
    }
}

/// Hugging Face stores linear weights as `[d_output, d_input]`, Burn as `[d_input, d_output]`
fn load_linear<B: Backend>(
    tensors: &HashMap<String, candle_core::Tensor>,
    prefix: &str,
    device: &B::Device,
) -> Result<Linear<B>, ModelError> {
    let weight = get_tensor(tensors, &format!("{prefix}.weight"))?;
    let bias = get_tensor(tensors, &format!("{prefix}.bias"))?;

    let weight: Tensor<B, 2> = from_candle(weight, device)?;
    let bias: Tensor<B, 1> = from_candle(bias, device)?;

    Ok(Linear {
        weight: Param::from(weight.transpose()),
        bias: Some(Param::from(bias)),
    })
}

fn get_tensor<'a>(
    tensors: &'a HashMap<String, candle_core::Tensor>,
    name: &str,
) -> Result<&'a candle_core::Tensor, ModelError> {
    tensors
        .get(name)
        .ok_or_else(|| ModelError::MissingTensor(name.to_string()))
}
