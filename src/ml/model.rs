// ============================================================
// Layer 5 — BERT Sequence Classifier (Burn)
// ============================================================
// The `bert-base-uncased` encoder re-expressed with Burn
// modules, plus the usual classification head:
//
//   input_ids ─► word + position + token-type embeddings
//                 └─► LayerNorm ─► dropout
//   ×N encoder layers:
//       self-attention (additive padding mask) ─► dense ─► +res ─► LayerNorm
//       dense ─► GELU ─► dense ─► +res ─► LayerNorm
//   [CLS] vector ─► pooler dense ─► tanh ─► dropout ─► classifier
//
// Parameter names mirror the HuggingFace layout closely enough
// that ml::weights can copy a pretrained checkpoint in 1:1.

use anyhow::{bail, Result};
use burn::{
    module::Param,
    nn::{
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::{gelu, softmax},
};

/// Added to attention scores at padding positions. Large enough
/// that softmax assigns them (numerically) zero weight.
const MASKED_SCORE: f64 = -10_000.0;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct BertClassifierConfig {
    pub vocab_size: usize,
    #[config(default = 768)]
    pub hidden_size: usize,
    #[config(default = 12)]
    pub num_hidden_layers: usize,
    #[config(default = 12)]
    pub num_attention_heads: usize,
    #[config(default = 3072)]
    pub intermediate_size: usize,
    #[config(default = 512)]
    pub max_position_embeddings: usize,
    #[config(default = 2)]
    pub type_vocab_size: usize,
    #[config(default = 1e-12)]
    pub layer_norm_eps: f64,
    #[config(default = 0.1)]
    pub hidden_dropout_prob: f64,
    #[config(default = 0.1)]
    pub attention_probs_dropout_prob: f64,
    #[config(default = 2)]
    pub num_labels: usize,
}

impl BertClassifierConfig {
    pub fn head_dim(&self) -> usize {
        self.hidden_size / self.num_attention_heads
    }

    /// Reject shapes the attention split can't handle.
    pub fn validate(&self) -> Result<()> {
        if self.num_attention_heads == 0 || self.hidden_size % self.num_attention_heads != 0 {
            bail!(
                "hidden_size ({}) must be a multiple of num_attention_heads ({})",
                self.hidden_size,
                self.num_attention_heads
            );
        }
        if self.num_labels < 2 {
            bail!("num_labels must be at least 2, got {}", self.num_labels);
        }
        Ok(())
    }

    /// Build a randomly initialised model. Pretrained weights are
    /// copied in afterwards by `ml::weights::load_pretrained`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> BertClassifier<B> {
        let embeddings = BertEmbeddings {
            word_embeddings:       EmbeddingConfig::new(self.vocab_size, self.hidden_size).init(device),
            position_embeddings:   EmbeddingConfig::new(self.max_position_embeddings, self.hidden_size).init(device),
            token_type_embeddings: EmbeddingConfig::new(self.type_vocab_size, self.hidden_size).init(device),
            layer_norm:            BertLayerNorm::new(self.hidden_size, self.layer_norm_eps, device),
            dropout:               DropoutConfig::new(self.hidden_dropout_prob).init(),
        };
        let layers = (0..self.num_hidden_layers)
            .map(|_| self.init_layer(device))
            .collect();

        BertClassifier {
            embeddings,
            layers,
            pooler:     LinearConfig::new(self.hidden_size, self.hidden_size).init(device),
            dropout:    DropoutConfig::new(self.hidden_dropout_prob).init(),
            classifier: LinearConfig::new(self.hidden_size, self.num_labels).init(device),
        }
    }

    fn init_layer<B: Backend>(&self, device: &B::Device) -> BertLayer<B> {
        let h = self.hidden_size;
        BertLayer {
            attention: BertSelfAttention {
                query:     LinearConfig::new(h, h).init(device),
                key:       LinearConfig::new(h, h).init(device),
                value:     LinearConfig::new(h, h).init(device),
                dropout:   DropoutConfig::new(self.attention_probs_dropout_prob).init(),
                num_heads: self.num_attention_heads,
                head_dim:  self.head_dim(),
            },
            attention_output: LinearConfig::new(h, h).init(device),
            attention_norm:   BertLayerNorm::new(h, self.layer_norm_eps, device),
            intermediate:     LinearConfig::new(h, self.intermediate_size).init(device),
            output:           LinearConfig::new(self.intermediate_size, h).init(device),
            output_norm:      BertLayerNorm::new(h, self.layer_norm_eps, device),
            dropout:          DropoutConfig::new(self.hidden_dropout_prob).init(),
        }
    }
}

// ─── LayerNorm ────────────────────────────────────────────────────────────────
/// LayerNorm over the last dimension with BERT's naming
/// (`weight` / `bias`) and its tiny epsilon.
#[derive(Module, Debug)]
pub struct BertLayerNorm<B: Backend> {
    pub weight:  Param<Tensor<B, 1>>,
    pub bias:    Param<Tensor<B, 1>>,
    pub epsilon: f64,
}

impl<B: Backend> BertLayerNorm<B> {
    pub fn new(size: usize, epsilon: f64, device: &B::Device) -> Self {
        Self {
            weight: Param::from_tensor(Tensor::ones([size], device)),
            bias:   Param::from_tensor(Tensor::zeros([size], device)),
            epsilon,
        }
    }

    pub fn forward<const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        let (var, mean) = x.clone().var_mean_bias(D - 1);
        let x = x.sub(mean).div(var.add_scalar(self.epsilon).sqrt());
        x.mul(self.weight.val().unsqueeze()).add(self.bias.val().unsqueeze())
    }
}

// ─── Embeddings ───────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct BertEmbeddings<B: Backend> {
    pub word_embeddings:       Embedding<B>,
    pub position_embeddings:   Embedding<B>,
    pub token_type_embeddings: Embedding<B>,
    pub layer_norm:            BertLayerNorm<B>,
    pub dropout:               Dropout,
}

impl<B: Backend> BertEmbeddings<B> {
    /// input_ids: [batch, seq_len] → [batch, seq_len, hidden]
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let [batch_size, seq_len] = input_ids.dims();
        let device = input_ids.device();

        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        // Single-segment input: every token is segment 0
        let token_types = Tensor::<B, 2, Int>::zeros([batch_size, seq_len], &device);

        let x = self.word_embeddings.forward(input_ids)
            + self.position_embeddings.forward(positions)
            + self.token_type_embeddings.forward(token_types);

        self.dropout.forward(self.layer_norm.forward(x))
    }
}

// ─── Self-attention ───────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct BertSelfAttention<B: Backend> {
    pub query:     Linear<B>,
    pub key:       Linear<B>,
    pub value:     Linear<B>,
    pub dropout:   Dropout,
    pub num_heads: usize,
    pub head_dim:  usize,
}

impl<B: Backend> BertSelfAttention<B> {
    /// x: [batch, seq, hidden], mask: additive [batch, 1, 1, seq]
    pub fn forward(&self, x: Tensor<B, 3>, mask: Tensor<B, 4>) -> Tensor<B, 3> {
        let [batch_size, seq_len, hidden] = x.dims();

        // [batch, seq, hidden] → [batch, heads, seq, head_dim]
        let heads = |t: Tensor<B, 3>| {
            t.reshape([batch_size, seq_len, self.num_heads, self.head_dim])
                .swap_dims(1, 2)
        };
        let q = heads(self.query.forward(x.clone()));
        let k = heads(self.key.forward(x.clone()));
        let v = heads(self.value.forward(x));

        let scores = q
            .matmul(k.swap_dims(2, 3))
            .div_scalar((self.head_dim as f64).sqrt())
            + mask;
        let probs = self.dropout.forward(softmax(scores, 3));

        probs
            .matmul(v)
            .swap_dims(1, 2)
            .reshape([batch_size, seq_len, hidden])
    }
}

// ─── Encoder layer ────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct BertLayer<B: Backend> {
    pub attention:        BertSelfAttention<B>,
    pub attention_output: Linear<B>,
    pub attention_norm:   BertLayerNorm<B>,
    pub intermediate:     Linear<B>,
    pub output:           Linear<B>,
    pub output_norm:      BertLayerNorm<B>,
    pub dropout:          Dropout,
}

impl<B: Backend> BertLayer<B> {
    pub fn forward(&self, x: Tensor<B, 3>, mask: Tensor<B, 4>) -> Tensor<B, 3> {
        let attn = self.attention.forward(x.clone(), mask);
        let attn = self.dropout.forward(self.attention_output.forward(attn));
        let x = self.attention_norm.forward(attn + x);

        let ffn = self.output.forward(gelu(self.intermediate.forward(x.clone())));
        self.output_norm.forward(self.dropout.forward(ffn) + x)
    }
}

// ─── Full classifier ──────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct BertClassifier<B: Backend> {
    pub embeddings: BertEmbeddings<B>,
    pub layers:     Vec<BertLayer<B>>,
    pub pooler:     Linear<B>,
    pub dropout:    Dropout,
    pub classifier: Linear<B>,
}

pub struct ClassificationOutput<B: Backend> {
    /// Mean cross-entropy over the batch — shape: [1]
    pub loss:   Tensor<B, 1>,
    /// Raw class scores — shape: [batch, num_labels]
    pub logits: Tensor<B, 2>,
}

impl<B: Backend> BertClassifier<B> {
    /// input_ids, attention_mask: [batch, seq_len] → logits: [batch, num_labels]
    pub fn forward(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 2> {
        let mask = additive_mask(attention_mask);

        let mut x = self.embeddings.forward(input_ids);
        for layer in &self.layers {
            x = layer.forward(x, mask.clone());
        }

        // Pool the [CLS] position
        let [batch_size, _, hidden] = x.dims();
        let cls = x.slice([0..batch_size, 0..1, 0..hidden]).reshape([batch_size, hidden]);
        let pooled = self.pooler.forward(cls).tanh();

        self.classifier.forward(self.dropout.forward(pooled))
    }

    pub fn forward_classification(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
        labels:         Tensor<B, 1, Int>,
    ) -> ClassificationOutput<B> {
        let logits = self.forward(input_ids, attention_mask);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), labels);

        ClassificationOutput { loss, logits }
    }
}

/// Turn a 1/0 attention mask into scores to add before softmax:
/// 0 for real tokens, MASKED_SCORE for padding.
fn additive_mask<B: Backend>(attention_mask: Tensor<B, 2, Int>) -> Tensor<B, 4> {
    let [batch_size, seq_len] = attention_mask.dims();
    attention_mask
        .float()
        .neg()
        .add_scalar(1.0)
        .mul_scalar(MASKED_SCORE)
        .reshape([batch_size, 1, 1, seq_len])
}
