//! Gemini-backed [`dinnerbot_core::Recommender`].

mod client;
mod error;
mod prompt;

pub use client::GeminiRecommender;
pub use error::GeminiError;
