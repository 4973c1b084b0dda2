//! Artifact resolution
//!
//! Locates the persisted pipeline on disk by walking an ordered list of
//! candidate files and, for each existing file, an ordered list of formats.
//! The first (file, format) pair that decodes wins. The outcome, success or
//! failure, is cached for the life of the resolver.
//!
//! # Initialize-once semantics
//!
//! [`ArtifactResolver::resolve`] is backed by `once_cell::sync::OnceCell`.
//! When several threads race on the first call, exactly one runs the load;
//! the others block until it finishes and then observe the same result.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{AttemptOutcome, FormatFailure, ModelUnavailable, ResolveAttempt};
use crate::pipeline::{Pipeline, PipelineError, PredictionPipeline};

/// Artifact file names tried when none are configured, highest priority first
pub const DEFAULT_CANDIDATES: &[&str] = &[
    "SkyFare-Predictor.bin",
    "flight_fare_model.bin",
    "flight_fare_model_small.bin",
    "SkyFare-Predictor.json",
];

/// Why a format rejected an artifact
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error(transparent)]
    Bincode(#[from] bincode::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("decoded pipeline is invalid: {0}")]
    Invalid(#[from] PipelineError),
}

/// One deserialization strategy
pub trait ArtifactFormat: Send + Sync {
    /// Short name used in logs and diagnostics
    fn name(&self) -> &'static str;

    fn decode(&self, bytes: &[u8]) -> Result<Arc<dyn PredictionPipeline>, DecodeError>;
}

/// Compact binary encoding
#[derive(Debug, Default, Clone, Copy)]
pub struct BincodeFormat;

impl ArtifactFormat for BincodeFormat {
    fn name(&self) -> &'static str {
        "bincode"
    }

    fn decode(&self, bytes: &[u8]) -> Result<Arc<dyn PredictionPipeline>, DecodeError> {
        let pipeline: Pipeline = bincode::deserialize(bytes)?;
        pipeline.validate()?;
        Ok(Arc::new(pipeline))
    }
}

/// Plain JSON encoding
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormat;

impl ArtifactFormat for JsonFormat {
    fn name(&self) -> &'static str {
        "json"
    }

    fn decode(&self, bytes: &[u8]) -> Result<Arc<dyn PredictionPipeline>, DecodeError> {
        let pipeline: Pipeline = serde_json::from_slice(bytes)?;
        pipeline.validate()?;
        Ok(Arc::new(pipeline))
    }
}

/// Formats tried against every existing candidate, in order
pub fn default_formats() -> Vec<Box<dyn ArtifactFormat>> {
    vec![Box::new(BincodeFormat), Box::new(JsonFormat)]
}

/// Where the model artifact lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub model_dir: PathBuf,
    pub candidates: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("."),
            candidates: DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ResolverConfig {
    /// Candidate paths in resolution order
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        self.candidates.iter().map(|c| self.model_dir.join(c)).collect()
    }
}

/// A successfully loaded pipeline and where it came from
pub struct ResolvedArtifact {
    pub pipeline: Arc<dyn PredictionPipeline>,
    pub path: PathBuf,
    pub format: &'static str,
}

impl std::fmt::Debug for ResolvedArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedArtifact")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("summary", &self.pipeline.summary())
            .finish()
    }
}

/// Walk candidates × formats once, without caching
pub fn load_first(
    candidates: &[PathBuf],
    formats: &[Box<dyn ArtifactFormat>],
) -> Result<ResolvedArtifact, ModelUnavailable> {
    let mut attempts = Vec::with_capacity(candidates.len());

    for path in candidates {
        if !path.exists() {
            debug!("Model candidate not found: {}", path.display());
            attempts.push(ResolveAttempt {
                path: path.clone(),
                outcome: AttemptOutcome::Missing,
            });
            continue;
        }

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to read model candidate {}: {}", path.display(), e);
                attempts.push(ResolveAttempt {
                    path: path.clone(),
                    outcome: AttemptOutcome::ReadFailed(e.to_string()),
                });
                continue;
            }
        };

        match decode_with(path, &bytes, formats) {
            Ok(artifact) => return Ok(artifact),
            Err(failures) => attempts.push(ResolveAttempt {
                path: path.clone(),
                outcome: AttemptOutcome::Rejected(failures),
            }),
        }
    }

    Err(ModelUnavailable { attempts })
}

fn decode_with(
    path: &Path,
    bytes: &[u8],
    formats: &[Box<dyn ArtifactFormat>],
) -> Result<ResolvedArtifact, Vec<FormatFailure>> {
    let mut failures = Vec::with_capacity(formats.len());

    for format in formats {
        match format.decode(bytes) {
            Ok(pipeline) => {
                info!(
                    "Loaded model artifact {} ({} format)",
                    path.display(),
                    format.name()
                );
                return Ok(ResolvedArtifact {
                    pipeline,
                    path: path.to_path_buf(),
                    format: format.name(),
                });
            }
            Err(e) => {
                debug!("{} rejected {}: {}", format.name(), path.display(), e);
                failures.push(FormatFailure {
                    format: format.name().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    Err(failures)
}

/// Lazily resolves and caches the pipeline artifact
pub struct ArtifactResolver {
    candidates: Vec<PathBuf>,
    formats: Vec<Box<dyn ArtifactFormat>>,
    cached: OnceCell<Result<Arc<ResolvedArtifact>, ModelUnavailable>>,
}

impl ArtifactResolver {
    /// Resolver over the configured candidates using the default formats
    pub fn new(config: &ResolverConfig) -> Self {
        Self::with_formats(config.candidate_paths(), default_formats())
    }

    pub fn with_formats(candidates: Vec<PathBuf>, formats: Vec<Box<dyn ArtifactFormat>>) -> Self {
        Self {
            candidates,
            formats,
            cached: OnceCell::new(),
        }
    }

    /// Resolve the artifact, loading it on first call only
    pub fn resolve(&self) -> Result<Arc<ResolvedArtifact>, ModelUnavailable> {
        self.cached
            .get_or_init(|| load_first(&self.candidates, &self.formats).map(Arc::new))
            .clone()
    }

    /// Whether a resolution attempt has already completed
    pub fn is_resolved(&self) -> bool {
        self.cached.get().is_some()
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }
}
