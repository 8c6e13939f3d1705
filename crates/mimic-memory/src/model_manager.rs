// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model download manager for first-run ONNX embedding model setup.
//!
//! Fetches the ONNX graph and tokenizer for a known sentence-transformer
//! from HuggingFace on first run and caches them under the data directory.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::sync::OnceCell;
use tracing::info;

use mimic_core::MimicError;

/// A sentence-transformer we know how to fetch and run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnnxModel {
    pub name: &'static str,
    pub model_url: &'static str,
    pub tokenizer_url: &'static str,
    pub dimensions: usize,
    /// BERT-style graphs take `token_type_ids`; XLM-R graphs do not.
    pub token_type_ids: bool,
}

/// Models resolvable by `embedding.model_name`.
pub const KNOWN_MODELS: &[OnnxModel] = &[
    OnnxModel {
        name: "paraphrase-multilingual-MiniLM-L12-v2",
        model_url: "https://huggingface.co/sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2/resolve/main/onnx/model.onnx",
        tokenizer_url: "https://huggingface.co/sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2/resolve/main/tokenizer.json",
        dimensions: 384,
        token_type_ids: false,
    },
    OnnxModel {
        name: "all-MiniLM-L6-v2",
        model_url: "https://huggingface.co/onnx-community/all-MiniLM-L6-v2-ONNX/resolve/main/onnx/model_quantized.onnx",
        tokenizer_url: "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/tokenizer.json",
        dimensions: 384,
        token_type_ids: true,
    },
];

impl OnnxModel {
    /// Looks up a model by name.
    pub fn lookup(name: &str) -> Result<&'static OnnxModel, MimicError> {
        KNOWN_MODELS.iter().find(|m| m.name == name).ok_or_else(|| {
            let known: Vec<&str> = KNOWN_MODELS.iter().map(|m| m.name).collect();
            MimicError::Config(format!(
                "unknown ONNX embedding model '{name}' (known: {})",
                known.join(", ")
            ))
        })
    }
}

/// Manages ONNX model download and path resolution.
pub struct ModelManager {
    data_dir: PathBuf,
    model: &'static OnnxModel,
    /// Ensures the download runs once even with concurrent callers.
    init: OnceCell<PathBuf>,
}

impl ModelManager {
    pub fn new(data_dir: PathBuf, model: &'static OnnxModel) -> Self {
        Self {
            data_dir,
            model,
            init: OnceCell::new(),
        }
    }

    pub fn model(&self) -> &'static OnnxModel {
        self.model
    }

    /// Returns the directory where model files are stored.
    pub fn model_dir(&self) -> PathBuf {
        self.data_dir.join("models").join(self.model.name)
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_dir().join("model.onnx")
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.model_dir().join("tokenizer.json")
    }

    /// Returns true if both model and tokenizer files exist.
    pub fn is_model_available(&self) -> bool {
        self.model_path().exists() && self.tokenizer_path().exists()
    }

    /// Downloads missing files and returns the model path.
    pub async fn ensure_model(&self) -> Result<PathBuf, MimicError> {
        self.init
            .get_or_try_init(|| async {
                if self.is_model_available() {
                    return Ok(self.model_path());
                }
                info!(model = self.model.name, "embedding model not found, downloading");

                let model_dir = self.model_dir();
                tokio::fs::create_dir_all(&model_dir).await.map_err(|e| {
                    MimicError::Internal(format!("failed to create model directory: {e}"))
                })?;

                let files = [
                    ("model.onnx", self.model.model_url),
                    ("tokenizer.json", self.model.tokenizer_url),
                ];
                for (filename, url) in files {
                    let dest = model_dir.join(filename);
                    if dest.exists() {
                        continue;
                    }
                    let size = download_file(url, &dest).await?;
                    info!(file = filename, bytes = size, "downloaded");
                }

                info!(dir = %model_dir.display(), "embedding model ready");
                Ok(self.model_path())
            })
            .await
            .cloned()
    }
}

/// Streams `url` into `dest`, writing to a `.part` file first so an
/// interrupted download never leaves a truncated model behind.
pub(crate) async fn download_file(url: &str, dest: &Path) -> Result<u64, MimicError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| MimicError::Internal(format!("failed to download {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(MimicError::Internal(format!(
            "download failed with status {}: {url}",
            response.status()
        )));
    }

    let part = dest.with_extension("part");
    let write_err =
        |e: std::io::Error| MimicError::Internal(format!("failed to write {}: {e}", part.display()));

    let mut file = tokio::fs::File::create(&part).await.map_err(write_err)?;
    let mut stream = response.bytes_stream();
    let mut size = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                let _ = tokio::fs::remove_file(&part).await;
                return Err(MimicError::Internal(format!(
                    "failed to read response body from {url}: {e}"
                )));
            }
        };
        file.write_all(&chunk).await.map_err(write_err)?;
        size += chunk.len() as u64;
    }
    file.flush().await.map_err(write_err)?;
    drop(file);

    tokio::fs::rename(&part, dest).await.map_err(write_err)?;
    Ok(size)
}
