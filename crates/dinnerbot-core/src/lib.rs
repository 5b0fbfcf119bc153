mod app_config;
mod capability;
mod config;
mod error;
mod recommendation;
mod trigger;

pub use app_config::AppConfig;
pub use capability::{Notifier, Recommender};
pub use config::{load_app_config, load_app_config_from_env, log_level_directive, resolve_port};
pub use error::{ConfigError, TriggerError};
pub use recommendation::{Dish, Recommendation};
pub use trigger::{TriggerSpec, MISFIRE_GRACE_SECS};
