//! Capabilities the orchestrator consumes but does not implement.
//!
//! Implementations live in their own crates (`dinnerbot-gemini`,
//! `dinnerbot-telegram`); tests substitute in-memory fakes.

use std::future::Future;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::recommendation::Recommendation;

/// Produces dinner recommendations.
pub trait Recommender: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Generate the regular daily recommendation, with no ingredient constraints.
    fn generate(&self) -> impl Future<Output = Result<Recommendation, Self::Error>> + Send;

    /// Generate a recommendation built around on-hand ingredients.
    ///
    /// `ingredients` is passed through as free text (typically comma separated).
    fn generate_from_ingredients(
        &self,
        ingredients: &str,
    ) -> impl Future<Output = Result<Recommendation, Self::Error>> + Send;
}

/// Delivers messages to an outbound channel.
///
/// Send operations report delivery as a boolean; implementations log their
/// own failures instead of returning them.
pub trait Notifier: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Open the outbound channel. Calling it twice is harmless.
    fn start(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Release the outbound channel. A no-op when never started.
    fn close(&self) -> impl Future<Output = ()> + Send;

    fn send_message(&self, text: &str) -> impl Future<Output = bool> + Send;

    fn send_recommendation(
        &self,
        recommendation: &Recommendation,
    ) -> impl Future<Output = bool> + Send;

    /// Current time in the channel's configured timezone.
    fn now(&self) -> DateTime<Tz>;
}
