mod client;
mod types;

pub use client::{ApiClient, ApiError};
pub use types::{AuthResponse, AuthUser, Movie, NewsArticle, NewsSource, PreferencesEnvelope};
