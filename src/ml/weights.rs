// ============================================================
// Layer 5 — Pretrained Weight Loader
// ============================================================
// Copies a HuggingFace BERT checkpoint (model.safetensors) into
// a freshly initialised BertClassifier.
//
// Checkpoints come in a few flavours:
//   - keys with or without the "bert." prefix
//   - LayerNorm as weight/bias or as the legacy gamma/beta
// Both are accepted. Everything is validated (presence, dtype,
// shape) before a single parameter is replaced, so a bad file
// fails with one complete report instead of a panic mid-copy.
//
// PyTorch stores linear weights as [out, in]; Burn's Linear
// expects [in, out], hence the transpose on every dense layer.
//
// The classification head is NOT in the checkpoint and keeps its
// random initialisation.

use anyhow::{anyhow, bail, Context, Result};
use burn::{module::Param, nn::Linear, prelude::*};
use safetensors::{Dtype, SafeTensors};
use std::path::Path;

use crate::ml::model::{BertClassifier, BertClassifierConfig, BertLayerNorm};

/// Every tensor the encoder needs, under its canonical
/// (unprefixed, weight/bias) name, with the PyTorch shape.
pub fn pretrained_tensor_shapes(cfg: &BertClassifierConfig) -> Vec<(String, Vec<usize>)> {
    let h = cfg.hidden_size;
    let i = cfg.intermediate_size;

    let mut shapes = vec![
        ("embeddings.word_embeddings.weight".to_string(),       vec![cfg.vocab_size, h]),
        ("embeddings.position_embeddings.weight".to_string(),   vec![cfg.max_position_embeddings, h]),
        ("embeddings.token_type_embeddings.weight".to_string(), vec![cfg.type_vocab_size, h]),
    ];
    push_layer_norm(&mut shapes, "embeddings.LayerNorm", h);

    for layer in 0..cfg.num_hidden_layers {
        let p = format!("encoder.layer.{layer}");
        for proj in ["query", "key", "value"] {
            push_linear(&mut shapes, &format!("{p}.attention.self.{proj}"), h, h);
        }
        push_linear(&mut shapes, &format!("{p}.attention.output.dense"), h, h);
        push_layer_norm(&mut shapes, &format!("{p}.attention.output.LayerNorm"), h);
        push_linear(&mut shapes, &format!("{p}.intermediate.dense"), h, i);
        push_linear(&mut shapes, &format!("{p}.output.dense"), i, h);
        push_layer_norm(&mut shapes, &format!("{p}.output.LayerNorm"), h);
    }
    push_linear(&mut shapes, "pooler.dense", h, h);

    shapes
}

fn push_linear(shapes: &mut Vec<(String, Vec<usize>)>, name: &str, d_in: usize, d_out: usize) {
    shapes.push((format!("{name}.weight"), vec![d_out, d_in]));
    shapes.push((format!("{name}.bias"), vec![d_out]));
}

fn push_layer_norm(shapes: &mut Vec<(String, Vec<usize>)>, name: &str, size: usize) {
    shapes.push((format!("{name}.weight"), vec![size]));
    shapes.push((format!("{name}.bias"), vec![size]));
}

/// Read `path` and copy its encoder weights into `model`.
pub fn load_pretrained<B: Backend>(
    model:  BertClassifier<B>,
    cfg:    &BertClassifierConfig,
    path:   &Path,
    device: &B::Device,
) -> Result<BertClassifier<B>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Cannot read pretrained weights '{}'", path.display()))?;
    let model = load_pretrained_bytes(model, cfg, &bytes, device)
        .with_context(|| format!("Cannot load pretrained weights from '{}'", path.display()))?;

    tracing::info!("Loaded pretrained encoder weights from '{}'", path.display());
    Ok(model)
}

/// Same as `load_pretrained`, from an in-memory safetensors buffer.
pub fn load_pretrained_bytes<B: Backend>(
    mut model: BertClassifier<B>,
    cfg:       &BertClassifierConfig,
    bytes:     &[u8],
    device:    &B::Device,
) -> Result<BertClassifier<B>> {
    let st = SafeTensors::deserialize(bytes)
        .map_err(|e| anyhow!("Invalid safetensors data: {e:?}"))?;
    let src = WeightSource::new(st);
    src.verify(cfg)?;

    let emb = &mut model.embeddings;
    emb.word_embeddings.weight       = Param::from_tensor(src.tensor("embeddings.word_embeddings.weight", device)?);
    emb.position_embeddings.weight   = Param::from_tensor(src.tensor("embeddings.position_embeddings.weight", device)?);
    emb.token_type_embeddings.weight = Param::from_tensor(src.tensor("embeddings.token_type_embeddings.weight", device)?);
    src.copy_layer_norm("embeddings.LayerNorm", &mut emb.layer_norm, device)?;

    for (i, layer) in model.layers.iter_mut().enumerate() {
        let p = format!("encoder.layer.{i}");
        src.copy_linear(&format!("{p}.attention.self.query"), &mut layer.attention.query, device)?;
        src.copy_linear(&format!("{p}.attention.self.key"), &mut layer.attention.key, device)?;
        src.copy_linear(&format!("{p}.attention.self.value"), &mut layer.attention.value, device)?;
        src.copy_linear(&format!("{p}.attention.output.dense"), &mut layer.attention_output, device)?;
        src.copy_layer_norm(&format!("{p}.attention.output.LayerNorm"), &mut layer.attention_norm, device)?;
        src.copy_linear(&format!("{p}.intermediate.dense"), &mut layer.intermediate, device)?;
        src.copy_linear(&format!("{p}.output.dense"), &mut layer.output, device)?;
        src.copy_layer_norm(&format!("{p}.output.LayerNorm"), &mut layer.output_norm, device)?;
    }
    src.copy_linear("pooler.dense", &mut model.pooler, device)?;

    Ok(model)
}

/// Resolves canonical names to the keys a checkpoint actually uses.
struct WeightSource<'a> {
    st:     SafeTensors<'a>,
    prefix: &'static str,
}

impl<'a> WeightSource<'a> {
    fn new(st: SafeTensors<'a>) -> Self {
        let prefixed = st.tensor("bert.embeddings.word_embeddings.weight").is_ok();
        Self { st, prefix: if prefixed { "bert." } else { "" } }
    }

    /// Actual key for a canonical name, if present
    fn key(&self, name: &str) -> Option<String> {
        let direct = format!("{}{name}", self.prefix);
        if self.st.tensor(&direct).is_ok() {
            return Some(direct);
        }
        let legacy = if let Some(stem) = name.strip_suffix("LayerNorm.weight") {
            format!("{}{stem}LayerNorm.gamma", self.prefix)
        } else if let Some(stem) = name.strip_suffix("LayerNorm.bias") {
            format!("{}{stem}LayerNorm.beta", self.prefix)
        } else {
            return None;
        };
        self.st.tensor(&legacy).is_ok().then_some(legacy)
    }

    fn verify(&self, cfg: &BertClassifierConfig) -> Result<()> {
        let mut missing  = Vec::new();
        let mut problems = Vec::new();

        for (name, shape) in pretrained_tensor_shapes(cfg) {
            let Some(key) = self.key(&name) else {
                missing.push(name);
                continue;
            };
            let view = self
                .st
                .tensor(&key)
                .map_err(|e| anyhow!("Cannot read tensor '{key}': {e:?}"))?;
            if view.dtype() != Dtype::F32 {
                problems.push(format!("{key}: dtype {:?}, expected F32", view.dtype()));
            } else if view.shape() != shape.as_slice() {
                problems.push(format!("{key}: shape {:?}, expected {:?}", view.shape(), shape));
            }
        }

        if !missing.is_empty() {
            bail!("Checkpoint is missing {} tensors: {}", missing.len(), missing.join(", "));
        }
        if !problems.is_empty() {
            bail!("Checkpoint does not match the model config: {}", problems.join("; "));
        }
        Ok(())
    }

    fn tensor<B: Backend, const D: usize>(&self, name: &str, device: &B::Device) -> Result<Tensor<B, D>> {
        let key = self
            .key(name)
            .ok_or_else(|| anyhow!("Tensor '{name}' not found"))?;
        let view = self
            .st
            .tensor(&key)
            .map_err(|e| anyhow!("Cannot read tensor '{key}': {e:?}"))?;

        let shape: [usize; D] = view
            .shape()
            .try_into()
            .map_err(|_| anyhow!("Tensor '{key}' has rank {}, expected {D}", view.shape().len()))?;
        let data: Vec<f32> = view
            .data()
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        Ok(Tensor::<B, 1>::from_floats(data.as_slice(), device).reshape(shape))
    }

    fn copy_linear<B: Backend>(&self, name: &str, linear: &mut Linear<B>, device: &B::Device) -> Result<()> {
        let weight: Tensor<B, 2> = self.tensor(&format!("{name}.weight"), device)?;
        let bias:   Tensor<B, 1> = self.tensor(&format!("{name}.bias"), device)?;
        linear.weight = Param::from_tensor(weight.transpose());
        linear.bias   = Some(Param::from_tensor(bias));
        Ok(())
    }

    fn copy_layer_norm<B: Backend>(&self, name: &str, norm: &mut BertLayerNorm<B>, device: &B::Device) -> Result<()> {
        norm.weight = Param::from_tensor(self.tensor(&format!("{name}.weight"), device)?);
        norm.bias   = Param::from_tensor(self.tensor(&format!("{name}.bias"), device)?);
        Ok(())
    }
}
