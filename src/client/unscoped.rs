use log::debug;
use reqwest::Method;

use super::{private, API_RECOMMENDATIONS_PATH};
use crate::{
    error::Result,
    model::track::{Recommendations, RecommendationsRequest},
};

/// Spotify endpoints that don't depend on which user is authenticated. Every user client implements this trait.
#[async_trait::async_trait]
pub trait UnscopedClient: private::BuildHttpRequest + Sync {
    /// Get track recommendations based on the seeds and tunable attributes in the request.
    async fn recommendations(&self, request: &RecommendationsRequest) -> Result<Recommendations> {
        let recommendations: Recommendations = self
            .send_http_request(Method::GET, self.api_url(&[API_RECOMMENDATIONS_PATH]))
            .query(request.query_pairs())
            .send_json()
            .await?;

        debug!("Got {} recommended tracks", recommendations.tracks.len());
        Ok(recommendations)
    }
}
