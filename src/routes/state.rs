use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    db::{Cache, CatalogStore},
    services::{CatalogService, CompletionClient, RecommendationService},
};

/// Shared application state
///
/// Every collaborator is injected so tests can run against the in-memory
/// store and a fake completion client.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
    pub recommendations: RecommendationService,
    /// Fallback location of `<movie id>.mp4` files
    pub video_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        completion: Arc<dyn CompletionClient>,
        cache: Option<Cache>,
        video_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            catalog: CatalogService::new(store.clone(), cache),
            recommendations: RecommendationService::new(store, completion),
            video_dir: Arc::new(video_dir.into()),
        }
    }
}
