use thiserror::Error;

/// Errors returned by the Gemini recommender.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// `GEMINI_API_KEY` is empty; no request was sent.
    #[error("Gemini API key is not configured")]
    MissingApiKey,

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from Gemini: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response carried no candidate text (e.g. blocked by safety filters).
    #[error("Gemini returned no candidate text")]
    EmptyResponse,

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Gemini recommendation contained no dishes")]
    NoDishes,
}
