//! Telegram Bot API [`dinnerbot_core::Notifier`].

mod error;
mod notifier;
mod render;

pub use error::TelegramError;
pub use notifier::TelegramNotifier;
pub use render::{render_recommendation, split_message, MESSAGE_LENGTH_LIMIT};
