use bert_burn::data::BertInferenceBatch;
use burn::{data::dataloader, nn::attention::generate_padding_mask, tensor::backend::Backend};
use tokenizers::Tokenizer;

use crate::{models::roberta, pipelines::PipelineError};

/// Struct for batching text classification inputs
#[derive(Clone)]
pub struct Batcher<B: Backend> {
    /// Tokenizer for converting text to token IDs
    pub tokenizer: Tokenizer,

    /// Maximum sequence length for tokenized text
    pub max_seq_length: usize,

    /// ID of the padding token
    pub pad_token_id: usize,

    /// Device on which to perform computation (e.g., CPU or CUDA device)
    pub device: B::Device,
}

impl<B: Backend> Batcher<B> {
    /// Creates a new batcher
    pub fn new(tokenizer: Tokenizer, config: &roberta::Config, device: B::Device) -> Self {
        Self {
            tokenizer,
            max_seq_length: config.max_seq_len(),
            pad_token_id: config.model.pad_token_id,
            device,
        }
    }

    /// Tokenize text, adding the model's special tokens
    pub fn encode(&self, items: Vec<String>) -> Result<Vec<Vec<usize>>, PipelineError> {
        items
            .into_iter()
            .map(|input| {
                let encoding = self
                    .tokenizer
                    .encode(input, true)
                    .map_err(|e| PipelineError::Tokenizer(e.to_string()))?;

                Ok(encoding.get_ids().iter().map(|t| *t as usize).collect())
            })
            .collect()
    }
}

/// Implement Batcher trait for Batcher struct for inference
impl<B: Backend> dataloader::batcher::Batcher<Vec<usize>, BertInferenceBatch<B>> for Batcher<B> {
    /// Pads token id sequences into an inference batch, truncating to the max sequence length
    fn batch(&self, items: Vec<Vec<usize>>) -> BertInferenceBatch<B> {
        let padding = generate_padding_mask(
            self.pad_token_id,
            items,
            Some(self.max_seq_length),
            &self.device,
        );

        BertInferenceBatch {
            tokens: padding.tensor,
            mask_pad: padding.mask,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::str::FromStr;

    use burn::{
        backend::{ndarray::NdArrayDevice, NdArray},
        data::dataloader::batcher::Batcher as _,
    };
    use pretty_assertions::assert_eq;

    use crate::models::roberta::config::tests::{write_config, XLM_CONFIG};

    use super::*;

    /// A whitespace word-level tokenizer with a four-word vocabulary
    pub(crate) fn test_tokenizer() -> Tokenizer {
        Tokenizer::from_str(
            r#"{
                "version": "1.0",
                "truncation": null,
                "padding": null,
                "added_tokens": [],
                "normalizer": null,
                "pre_tokenizer": { "type": "Whitespace" },
                "post_processor": null,
                "decoder": null,
                "model": {
                    "type": "WordLevel",
                    "vocab": { "<unk>": 0, "<pad>": 1, "hola": 2, "mundo": 3 },
                    "unk_token": "<unk>"
                }
            }"#,
        )
        .unwrap()
    }

    fn batcher(name: &str) -> Batcher<NdArray> {
        let config = roberta::Config::load_pretrained(&write_config(name, XLM_CONFIG)).unwrap();

        Batcher::new(test_tokenizer(), &config, NdArrayDevice::Cpu)
    }

    #[test]
    fn encodes_known_and_unknown_words() {
        let batcher = batcher("encode");

        let ids = batcher
            .encode(vec!["hola mundo".to_string(), "adiós".to_string()])
            .unwrap();

        assert_eq!(ids, vec![vec![2, 3], vec![0]]);
    }

    #[test]
    fn pads_to_the_longest_sequence() {
        let batcher = batcher("pad");

        let batch = batcher.batch(vec![vec![2, 3], vec![0]]);

        assert_eq!(batch.tokens.dims(), [2, 2]);
        assert_eq!(
            batch.tokens.into_data().convert::<i64>().value,
            vec![2, 3, 0, 1]
        );
        assert_eq!(
            batch.mask_pad.into_data().value,
            vec![false, false, false, true]
        );
    }

    #[test]
    fn truncates_to_the_max_sequence_length() {
        let batcher = batcher("truncate");

        let batch = batcher.batch(vec![vec![2; 40]]);

        assert_eq!(batch.tokens.dims(), [1, 18]);
    }
}
