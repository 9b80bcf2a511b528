//! gRPC client for an out-of-process collaborative rating model.
//!
//! The model itself is a black box: given a user and a list of place ids it
//! returns one estimated rating (1-5 scale) per place. This crate handles:
//! - Connection management to the model service
//! - Building the protobuf request
//! - Validating that the response lines up with the request

use anyhow::{Context, Result};
use thiserror::Error;
use tonic::transport::Channel;
use tracing::{debug, error, info};

// Include the generated protobuf code
pub mod ratings {
    tonic::include_proto!("ratings");
}

use ratings::{rating_model_client::RatingModelClient, PredictRequest};

/// Errors that can occur when interacting with the rating service
#[derive(Error, Debug)]
pub enum MLClientError {
    #[error("Failed to connect to rating service: {0}")]
    ConnectionError(String),

    #[error("Failed to predict ratings: {0}")]
    PredictionError(String),

    #[error("Invalid response from rating service: {0}")]
    InvalidResponse(String),
}

/// Client for the rating model service.
///
/// Cloning is cheap: clones share the underlying channel, so each caller can
/// hold its own handle for the `&mut` gRPC calls.
#[derive(Debug, Clone)]
pub struct MLScorerClient {
    client: RatingModelClient<Channel>,
    service_addr: String,
}

impl MLScorerClient {
    /// Connect to the rating service.
    ///
    /// # Arguments
    /// * `addr` - Address of the gRPC service (e.g., "http://localhost:50051")
    pub async fn connect(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();
        info!("Connecting to rating service at {}", addr);

        let channel = Channel::from_shared(addr.clone())
            .map_err(|e| MLClientError::ConnectionError(e.to_string()))
            .context("Creating channel from address")?
            .connect()
            .await
            .context("Connecting to rating service")?;

        Ok(MLScorerClient {
            client: RatingModelClient::new(channel),
            service_addr: addr,
        })
    }

    /// Estimate ratings for `place_ids`.
    ///
    /// # Returns
    /// One estimate per place id, in the same order as the input
    pub async fn predict_ratings(
        &mut self,
        user_id: &str,
        place_ids: Vec<String>,
    ) -> Result<Vec<f32>, MLClientError> {
        let expected_len = place_ids.len();
        if expected_len == 0 {
            return Ok(Vec::new());
        }
        debug!("Predicting {} ratings for user {}", expected_len, user_id);

        let request = tonic::Request::new(PredictRequest {
            user_id: user_id.to_string(),
            place_ids,
        });

        let response = self.client.predict_ratings(request).await.map_err(|e| {
            error!("gRPC error while predicting ratings: {}", e);
            MLClientError::PredictionError(e.to_string())
        })?;

        let estimates = response.into_inner().estimates;
        if estimates.len() != expected_len {
            error!(
                "Mismatch in number of estimates returned: expected {}, got {}",
                expected_len,
                estimates.len()
            );
            return Err(MLClientError::InvalidResponse(format!(
                "expected {} estimates, got {}",
                expected_len,
                estimates.len()
            )));
        }
        Ok(estimates)
    }

    /// Get the address of the rating service this client is connected to.
    pub fn service_address(&self) -> &str {
        &self.service_addr
    }
}
