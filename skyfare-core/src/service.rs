//! Fare prediction service
//!
//! Entry point for the presentation layer. Holds the two process-lifetime
//! singletons, the resolved artifact and the derived vocabulary, each
//! initialized lazily and exactly once.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::artifact::{ArtifactResolver, ResolvedArtifact, ResolverConfig};
use crate::error::{ModelUnavailable, PredictError};
use crate::predict::{self, PredictionResult};
use crate::query::FlightQuery;
use crate::schema::{self, VocabularySource};

pub struct FareService {
    resolver: ArtifactResolver,
    vocabulary: OnceCell<Result<VocabularySource, ModelUnavailable>>,
}

impl FareService {
    pub fn new(config: &ResolverConfig) -> Self {
        Self::with_resolver(ArtifactResolver::new(config))
    }

    pub fn with_resolver(resolver: ArtifactResolver) -> Self {
        Self {
            resolver,
            vocabulary: OnceCell::new(),
        }
    }

    /// Resolve the pipeline artifact (cached after the first call)
    pub fn resolve_pipeline(&self) -> Result<Arc<ResolvedArtifact>, ModelUnavailable> {
        self.resolver.resolve()
    }

    /// Vocabulary derived from the pipeline (cached after the first call)
    ///
    /// Only fails when the pipeline itself is unavailable; introspection
    /// problems yield [`VocabularySource::Partial`] or
    /// [`VocabularySource::Fallback`].
    pub fn get_vocabulary(&self) -> Result<&VocabularySource, ModelUnavailable> {
        self.vocabulary
            .get_or_init(|| {
                self.resolve_pipeline()
                    .map(|artifact| schema::introspect(artifact.pipeline.as_ref()))
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Predict the fare for one query
    ///
    /// The query is validated before the pipeline is resolved, so an invalid
    /// query never triggers a load.
    pub fn predict(&self, query: &FlightQuery) -> PredictionResult {
        predict::validate(query)?;
        let artifact = self.resolve_pipeline().map_err(PredictError::from)?;
        predict::invoke(artifact.pipeline.as_ref(), query)
    }

    pub fn resolver(&self) -> &ArtifactResolver {
        &self.resolver
    }
}
