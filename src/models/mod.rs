pub mod completion;
pub mod movie;
pub mod review;

pub use completion::{ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
pub use movie::{CreateMovieRequest, Movie, MovieFilter, MoviePage, UpdateMovieRequest};
pub use review::{average_rating, CreateReviewRequest, Review, MAX_RATING, MIN_RATING};
