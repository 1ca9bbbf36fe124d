// External imports
use anyhow::{Context, Result};
use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use burn::tensor::backend::Backend;
use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// Internal imports
use super::step_4_masked_gru_arch::{MaskedGru, MaskedGruConfig};
use crate::build_info;
use crate::constants::{METADATA_FILE_SUFFIX, MODEL_FILE_EXTENSION};

/// # Encoder Metadata
///
/// Architecture of a saved encoder, written next to the weight record so
/// the module can be rebuilt before its record is loaded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ModelMetadata {
    /// Number of input features per time step
    pub input_dim: usize,

    /// Size of every layer's hidden state
    pub hidden_dim: usize,

    /// Number of stacked GRU layers
    pub num_layers: usize,

    /// Effective inter-layer dropout
    pub dropout: f64,

    /// Epsilon of the output layer normalization
    pub layer_norm_epsilon: f64,

    /// Version of this crate that wrote the files
    pub crate_version: String,

    /// RFC 3339 UTC time the model was saved
    pub saved_at: String,
}

impl ModelMetadata {
    pub fn from_config(config: &MaskedGruConfig) -> Self {
        Self {
            input_dim: config.input_dim,
            hidden_dim: config.hidden_dim,
            num_layers: config.num_layers,
            dropout: config.dropout,
            layer_norm_epsilon: config.layer_norm_epsilon,
            crate_version: build_info::PKG_VERSION.to_string(),
            saved_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn to_config(&self) -> MaskedGruConfig {
        MaskedGruConfig::new(self.input_dim, self.hidden_dim)
            .with_num_layers(self.num_layers)
            .with_dropout(self.dropout)
            .with_layer_norm_epsilon(self.layer_norm_epsilon)
    }
}

/// `(model file, metadata file)` for a target path; only its stem is used.
fn artifact_paths(path: &Path) -> (PathBuf, PathBuf) {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("masked_gru");
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    (
        parent.join(format!("{}.{}", stem, MODEL_FILE_EXTENSION)),
        parent.join(format!("{}{}", stem, METADATA_FILE_SUFFIX)),
    )
}

/// # Save Encoder
///
/// Writes the weight record as `{stem}.bin` and the architecture as
/// `{stem}_meta.json` next to it.
///
/// # Returns
///
/// The path of the weight record
pub fn save_model<B: Backend>(model: &MaskedGru<B>, path: &Path) -> Result<PathBuf> {
    let (model_path, metadata_path) = artifact_paths(path);

    if let Some(parent) = model_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let metadata = ModelMetadata::from_config(&model.config());
    let metadata_json = serde_json::to_string_pretty(&metadata)?;
    fs::write(&metadata_path, metadata_json)
        .with_context(|| format!("Failed to write metadata to {}", metadata_path.display()))?;

    model
        .clone()
        .save_file(
            model_path.clone(),
            &BinFileRecorder::<FullPrecisionSettings>::default(),
        )
        .map_err(|e| anyhow::anyhow!("Failed to save encoder to {}: {:?}", model_path.display(), e))?;

    info!(
        "Saved encoder to {} with metadata at {}",
        model_path.display(),
        metadata_path.display()
    );

    Ok(model_path)
}

/// # Load Encoder
///
/// Reads `{stem}_meta.json`, rebuilds the encoder from it and loads the
/// `{stem}.bin` weight record into it.
pub fn load_model<B: Backend>(
    path: &Path,
    device: &B::Device,
) -> Result<(MaskedGru<B>, ModelMetadata)> {
    let (model_path, metadata_path) = artifact_paths(path);

    let metadata_json = fs::read_to_string(&metadata_path)
        .with_context(|| format!("Failed to read metadata from {}", metadata_path.display()))?;
    let metadata: ModelMetadata = serde_json::from_str(&metadata_json)
        .with_context(|| format!("Invalid metadata in {}", metadata_path.display()))?;

    let model = metadata
        .to_config()
        .init::<B>(device)
        .context("Saved metadata describes an invalid encoder")?
        .load_file(
            model_path.clone(),
            &BinFileRecorder::<FullPrecisionSettings>::default(),
            device,
        )
        .map_err(|e| anyhow::anyhow!("Failed to load encoder from {}: {:?}", model_path.display(), e))?;

    info!("Loaded encoder from {}", model_path.display());

    Ok((model, metadata))
}
