pub mod catalog;
pub mod completion;
pub mod heuristic;
pub mod model_recommender;
pub mod preferences;
pub mod recommendations;

pub use catalog::{CatalogService, MovieQuery};
pub use completion::{CompletionClient, OpenAiClient};
pub use model_recommender::ModelRecommender;
pub use preferences::{summarize, PreferenceProfile};
pub use recommendations::{RecommendationService, RecommendationSource, MAX_RECOMMENDATIONS};
