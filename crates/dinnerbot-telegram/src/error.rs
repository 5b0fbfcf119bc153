use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("{0} is not configured")]
    MissingCredential(&'static str),

    #[error("notifier has not been started")]
    NotStarted,

    #[error("message text is empty")]
    EmptyMessage,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Bot API answered with `"ok": false` or a non-2xx status.
    #[error("Telegram API error (HTTP {status}): {description}")]
    Api { status: u16, description: String },
}
