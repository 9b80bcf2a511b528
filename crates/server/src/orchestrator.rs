//! # Hybrid Orchestrator
//!
//! This module coordinates the recommendation pipeline for one user:
//! 1. Build the user context
//! 2. Generate candidates (content-based + collaborative in parallel)
//! 3. Merge into one hybrid ranking
//! 4. Persist the ranking as JSON
//! 5. Return the top N items
//!
//! Collaborative estimates come from the in-process baseline model unless a
//! remote rating service is attached, in which case they are fetched over gRPC
//! before the collaborative source runs.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, instrument};

use data_loader::{DataIndex, UserId};
use ml_client::MLScorerClient;
use pipeline::EvaluationReport;
use sources::{
    CollaborativeSource, ContentBasedSource, PrecomputedRatings, RatingPredictor, ScoredItem, UserContext,
};

/// Outcome of one hybrid recommendation run
#[derive(Debug, Clone)]
pub struct HybridReport {
    pub user_id: UserId,
    /// Merged ranking, best first, truncated to the requested limit
    pub items: Vec<ScoredItem>,
    /// Size of the merged ranking before truncation
    pub total_candidates: usize,
    /// Identity keys of the whole merged ranking, best first
    pub ranking_ids: Vec<String>,
    /// Where the full ranking was written, if persistence is enabled
    pub output_path: Option<PathBuf>,
}

impl HybridReport {
    /// Score the whole merged ranking against a held-out relevance set.
    ///
    /// Independent of the `limit` the report was built with.
    pub fn evaluate(&self, relevant: &HashSet<String>, k: usize) -> Result<EvaluationReport> {
        EvaluationReport::evaluate(&self.ranking_ids, relevant, k).context("Failed to evaluate recommendations")
    }
}

/// Coordinates both providers, the merger and persistence
#[derive(Clone)]
pub struct HybridOrchestrator {
    data_index: Arc<DataIndex>,
    content: ContentBasedSource,
    collaborative: CollaborativeSource,
    ml_client: Option<MLScorerClient>,
    output_dir: Option<PathBuf>,
}

impl HybridOrchestrator {
    /// Create an orchestrator with the in-process collaborative baseline.
    ///
    /// Output is written to [`pipeline::DEFAULT_OUTPUT_DIR`] unless changed
    /// with [`with_output_dir`](Self::with_output_dir).
    pub fn new(data_index: Arc<DataIndex>) -> Self {
        Self {
            content: ContentBasedSource::new(data_index.clone()),
            collaborative: CollaborativeSource::with_baseline(data_index.clone()),
            data_index,
            ml_client: None,
            output_dir: Some(PathBuf::from(pipeline::DEFAULT_OUTPUT_DIR)),
        }
    }

    /// Replace the content-based source
    pub fn with_content_source(mut self, content: ContentBasedSource) -> Self {
        self.content = content;
        self
    }

    /// Use a different in-process rating model for collaborative scoring
    pub fn with_predictor(mut self, predictor: Arc<dyn RatingPredictor>) -> Self {
        self.collaborative = CollaborativeSource::new(self.data_index.clone(), predictor);
        self
    }

    /// Fetch collaborative estimates from a remote rating service
    pub fn with_ml_client(mut self, client: MLScorerClient) -> Self {
        self.ml_client = Some(client);
        self
    }

    /// Connect to a remote rating service and use it for collaborative scoring
    pub async fn connect_ml(self, addr: impl Into<String>) -> Result<Self> {
        let client = MLScorerClient::connect(addr).await?;
        Ok(self.with_ml_client(client))
    }

    /// Directory for the persisted rankings; `None` disables persistence
    pub fn with_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.output_dir = dir;
        self
    }

    pub fn data_index(&self) -> &Arc<DataIndex> {
        &self.data_index
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Main entry point: hybrid recommendations for a user
    ///
    /// # Arguments
    /// * `user_id` - The user to generate recommendations for
    /// * `limit` - Number of items to return; `None` returns the whole ranking
    ///
    /// The persisted file always holds the whole ranking.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn recommend(&self, user_id: &str, limit: Option<usize>) -> Result<HybridReport> {
        let start_time = Instant::now();

        let context = self.build_user_context(user_id)?;
        info!(
            "Built user context: {} rated, {} favourites",
            context.rated_places.len(),
            context.favourite_restaurants.len()
        );

        let collaborative = self.collaborative_source(&context).await?;
        let (content_items, collaborative_items) = self.generate_candidates_parallel(&context, collaborative).await?;
        info!(
            "Generated {} content-based and {} collaborative candidates",
            content_items.len(),
            collaborative_items.len()
        );

        let merged = pipeline::merge(content_items, collaborative_items).context("Failed to merge candidates")?;
        info!("Merged into {} hybrid recommendations", merged.len());

        let output_path = match &self.output_dir {
            Some(dir) => {
                let path = pipeline::save_hybrid_recommendations(dir, user_id, &merged)
                    .context("Failed to save hybrid recommendations")?;
                info!("Saved hybrid recommendations to {}", path.display());
                Some(path)
            }
            None => None,
        };

        let total_candidates = merged.len();
        let ranking_ids = ranked_ids(&merged);
        let mut items = merged;
        if let Some(limit) = limit {
            items.truncate(limit);
        }

        info!(
            "Total time to get recommendations for user {}: {:.2?}",
            user_id,
            start_time.elapsed()
        );

        Ok(HybridReport {
            user_id: user_id.to_string(),
            items,
            total_candidates,
            ranking_ids,
            output_path,
        })
    }

    fn build_user_context(&self, user_id: &str) -> Result<UserContext> {
        sources::user_context::build_user_context(&self.data_index, user_id).context("Failed to build user context")
    }

    /// The collaborative source for this request.
    ///
    /// With a remote model attached, estimates for every candidate place are
    /// fetched in one call and served from memory.
    async fn collaborative_source(&self, context: &UserContext) -> Result<CollaborativeSource> {
        let Some(client) = &self.ml_client else {
            return Ok(self.collaborative.clone());
        };

        let place_ids = self.collaborative.candidate_place_ids(context);
        let mut client = client.clone();
        let estimates = client
            .predict_ratings(&context.user_id, place_ids.clone())
            .await
            .context("Failed to fetch collaborative estimates")?;
        info!(
            "Fetched {} estimates from {}",
            estimates.len(),
            client.service_address()
        );

        let predictor = PrecomputedRatings::new(context.user_id.clone(), place_ids.into_iter().zip(estimates));
        Ok(CollaborativeSource::new(self.data_index.clone(), Arc::new(predictor)))
    }

    /// Run both providers on blocking tasks and wait for both
    async fn generate_candidates_parallel(
        &self,
        context: &UserContext,
        collaborative: CollaborativeSource,
    ) -> Result<(Vec<ScoredItem>, Vec<ScoredItem>)> {
        let (content_result, collaborative_result) = tokio::join!(
            tokio::task::spawn_blocking({
                let content = self.content.clone();
                let context = context.clone();
                move || content.get_candidates(&context, usize::MAX)
            }),
            tokio::task::spawn_blocking({
                let context = context.clone();
                move || collaborative.get_candidates(&context, usize::MAX)
            })
        );

        let content_items = content_result.context("Content-based task panicked")?;
        let collaborative_items = collaborative_result.context("Collaborative task panicked")?;
        Ok((content_items, collaborative_items))
    }
}

/// Identity keys in rank order
fn ranked_ids(items: &[ScoredItem]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item.identity_key().map(str::to_string))
        .collect()
}
