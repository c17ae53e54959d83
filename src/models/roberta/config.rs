use std::{collections::BTreeMap, path::Path};

use bert_burn::model::BertModelConfig;
use burn::{
    config::Config as _,
    nn::{DropoutConfig, LinearConfig},
    tensor::backend::Backend,
};
use serde::Deserialize;

use crate::models::ModelError;

use super::{
    model::{ClassificationHead, Model},
    MODEL_TYPE, XLM_MODEL_TYPE,
};

/// The Model Configuration
#[derive(burn::config::Config)]
pub struct Config {
    /// The base encoder config
    pub model: BertModelConfig,

    /// A map from class ids to class name labels
    pub id2label: BTreeMap<usize, String>,
}

/// The label table of a Hugging Face `config.json`
#[derive(Deserialize)]
struct Labels {
    #[serde(default)]
    id2label: BTreeMap<usize, String>,
}

impl Config {
    /// Load a pretrained model configuration from a Hugging Face `config.json`
    pub fn load_pretrained(config_file: &Path) -> Result<Self, ModelError> {
        let mut model = BertModelConfig::load(config_file)
            .map_err(|e| ModelError::Config(e.to_string()))?;

        // XLM-RoBERTa shares the RoBERTa architecture and weight layout
        if model.model_type == XLM_MODEL_TYPE {
            model.model_type = MODEL_TYPE.to_string();
        }

        // Sequence classification checkpoints carry no pooler
        model.with_pooling_layer = Some(false);

        let raw = std::fs::read_to_string(config_file)
            .map_err(|e| ModelError::Config(e.to_string()))?;

        let Labels { id2label } =
            serde_json::from_str(&raw).map_err(|e| ModelError::Config(e.to_string()))?;

        if id2label.is_empty() {
            return Err(ModelError::NoClasses);
        }

        Ok(Config::new(model, id2label))
    }

    /// The longest token sequence the encoder accepts
    pub fn max_seq_len(&self) -> usize {
        self.model.max_seq_len.unwrap_or_else(|| {
            if self.model.model_type == MODEL_TYPE {
                // RoBERTa position ids start after the padding index
                self.model
                    .max_position_embeddings
                    .saturating_sub(self.model.pad_token_id + 1)
            } else {
                self.model.max_position_embeddings
            }
        })
    }

    /// The number of classes the head predicts
    pub fn n_classes(&self) -> usize {
        self.id2label.len()
    }

    /// Initializes a model with default weights
    pub fn init<B: Backend>(&self, device: &B::Device) -> Model<B> {
        let hidden_size = self.model.hidden_size;
        let n_classes = self.n_classes();

        Model {
            model: self.model.init(device),
            classifier: ClassificationHead {
                dense: LinearConfig::new(hidden_size, hidden_size).init(device),
                dropout: DropoutConfig::new(self.model.hidden_dropout_prob).init(),
                out_proj: LinearConfig::new(hidden_size, n_classes).init(device),
            },
            n_classes,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;

    /// A trimmed-down XLM-RoBERTa `config.json`
    pub(crate) const XLM_CONFIG: &str = r#"{
        "architectures": ["XLMRobertaForSequenceClassification"],
        "attention_probs_dropout_prob": 0.1,
        "bos_token_id": 0,
        "eos_token_id": 2,
        "hidden_act": "gelu",
        "hidden_dropout_prob": 0.1,
        "hidden_size": 8,
        "id2label": {
            "0": "others",
            "1": "joy",
            "2": "sadness",
            "3": "anger",
            "4": "surprise",
            "5": "disgust",
            "6": "fear"
        },
        "initializer_range": 0.02,
        "intermediate_size": 16,
        "layer_norm_eps": 1e-05,
        "max_position_embeddings": 20,
        "model_type": "xlm-roberta",
        "num_attention_heads": 2,
        "num_hidden_layers": 1,
        "pad_token_id": 1,
        "type_vocab_size": 1,
        "vocab_size": 32
    }"#;

    pub(crate) fn write_config(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("emociones-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join("config.json");
        std::fs::write(&path, contents).unwrap();

        path
    }

    #[test]
    fn loads_labels_from_hugging_face_config() {
        let path = write_config("labels", XLM_CONFIG);

        let config = Config::load_pretrained(&path).unwrap();

        assert_eq!(config.n_classes(), 7);
        assert_eq!(config.id2label[&0], "others");
        assert_eq!(config.id2label[&6], "fear");
    }

    #[test]
    fn maps_xlm_roberta_onto_the_roberta_encoder() {
        let path = write_config("model-type", XLM_CONFIG);

        let config = Config::load_pretrained(&path).unwrap();

        assert_eq!(config.model.model_type, "roberta");
        assert_eq!(config.model.with_pooling_layer, Some(false));
        // 20 positions, minus the padding offset
        assert_eq!(config.max_seq_len(), 18);
    }

    #[test]
    fn rejects_configs_without_labels() {
        let without_labels = XLM_CONFIG.replace("\"id2label\"", "\"unused\"");
        let path = write_config("no-labels", &without_labels);

        let result = Config::load_pretrained(&path);

        assert!(matches!(result, Err(ModelError::NoClasses)));
    }
}
