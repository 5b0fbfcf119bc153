use crate::app_config::AppConfig;
use crate::error::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a numeric setting is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a numeric setting is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so a bare environment always yields a config.
/// Credentials left empty surface later as generation or delivery failures.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u16 = |var: &str, default: &str| -> Result<u16, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let telegram_bot_token = or_default("TELEGRAM_BOT_TOKEN", "");
    let telegram_chat_id = or_default("TELEGRAM_CHAT_ID", "");
    let telegram_api_base = or_default("TELEGRAM_API_BASE", "https://api.telegram.org");

    let gemini_api_key = or_default("GEMINI_API_KEY", "");
    let gemini_model = or_default("GEMINI_MODEL", "gemini-1.5-pro");
    let gemini_api_base = or_default(
        "GEMINI_API_BASE",
        "https://generativelanguage.googleapis.com",
    );

    let meal_send_hour = parse_u32("MEAL_SEND_HOUR", "17")?;
    let meal_send_minute = parse_u32("MEAL_SEND_MINUTE", "30")?;
    let timezone = or_default("TIMEZONE", "Asia/Seoul");

    let port = parse_u16("SERVER_PORT", "8080")?;
    let log_level = or_default("LOG_LEVEL", "info");
    let leftover_ingredients = or_default("LEFTOVER_INGREDIENTS", "");
    let http_timeout_secs = parse_u64("HTTP_TIMEOUT_SECS", "60")?;

    Ok(AppConfig {
        telegram_bot_token,
        telegram_chat_id,
        telegram_api_base,
        gemini_api_key,
        gemini_model,
        gemini_api_base,
        meal_send_hour,
        meal_send_minute,
        timezone,
        port,
        log_level,
        leftover_ingredients,
        http_timeout_secs,
    })
}

/// Resolve the listen port, letting a platform-injected `PORT` override the
/// configured value. Unparseable overrides are ignored.
#[must_use]
pub fn resolve_port(config: &AppConfig, port_override: Option<&str>) -> u16 {
    port_override
        .and_then(|raw| raw.trim().parse::<u16>().ok())
        .unwrap_or(config.port)
}

/// Map a `LOG_LEVEL` word to a `tracing` level directive.
///
/// Accepts the tracing level names plus the `WARNING`, `SUCCESS` and
/// `CRITICAL` spellings found in older `.env` files. Returns `None` for
/// anything else; the caller picks the fallback.
#[must_use]
pub fn log_level_directive(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" | "success" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" | "critical" => Some("error"),
        "off" => Some("off"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn build_app_config_succeeds_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let result = build_app_config(lookup_from_map(&map));
        assert!(result.is_ok(), "expected Ok, got: {result:?}");
        let cfg = result.unwrap();
        assert_eq!(cfg.telegram_bot_token, "");
        assert_eq!(cfg.telegram_chat_id, "");
        assert_eq!(cfg.telegram_api_base, "https://api.telegram.org");
        assert_eq!(cfg.gemini_api_key, "");
        assert_eq!(cfg.gemini_model, "gemini-1.5-pro");
        assert_eq!(cfg.meal_send_hour, 17);
        assert_eq!(cfg.meal_send_minute, 30);
        assert_eq!(cfg.timezone, "Asia/Seoul");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.leftover_ingredients, "");
        assert_eq!(cfg.http_timeout_secs, 60);
    }

    #[test]
    fn build_app_config_reads_overrides() {
        let mut map = HashMap::new();
        map.insert("TELEGRAM_BOT_TOKEN", "123:abc");
        map.insert("TELEGRAM_CHAT_ID", "-1001");
        map.insert("GEMINI_MODEL", "gemini-2.0-flash");
        map.insert("MEAL_SEND_HOUR", "7");
        map.insert("MEAL_SEND_MINUTE", "5");
        map.insert("TIMEZONE", "Europe/Berlin");
        map.insert("SERVER_PORT", "9000");
        map.insert("LEFTOVER_INGREDIENTS", "양파, 두부");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.telegram_bot_token, "123:abc");
        assert_eq!(cfg.telegram_chat_id, "-1001");
        assert_eq!(cfg.gemini_model, "gemini-2.0-flash");
        assert_eq!(cfg.meal_send_hour, 7);
        assert_eq!(cfg.meal_send_minute, 5);
        assert_eq!(cfg.timezone, "Europe/Berlin");
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.leftover_ingredients, "양파, 두부");
        assert_eq!(cfg.send_time_label(), "7:05");
    }

    #[test]
    fn build_app_config_rejects_non_numeric_hour() {
        let mut map = HashMap::new();
        map.insert("MEAL_SEND_HOUR", "five");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "MEAL_SEND_HOUR"),
            "expected InvalidEnvVar(MEAL_SEND_HOUR), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_port_out_of_range() {
        let mut map = HashMap::new();
        map.insert("SERVER_PORT", "70000");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SERVER_PORT"),
            "expected InvalidEnvVar(SERVER_PORT), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_keeps_out_of_range_hour_for_trigger_validation() {
        let mut map = HashMap::new();
        map.insert("MEAL_SEND_HOUR", "25");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.meal_send_hour, 25);
    }

    #[test]
    fn debug_redacts_credentials() {
        let mut map = HashMap::new();
        map.insert("TELEGRAM_BOT_TOKEN", "secret-token");
        map.insert("GEMINI_API_KEY", "secret-key");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("[redacted]"));
    }

    #[test]
    fn resolve_port_prefers_valid_override() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(resolve_port(&cfg, Some("3000")), 3000);
        assert_eq!(resolve_port(&cfg, Some("not-a-port")), 8080);
        assert_eq!(resolve_port(&cfg, None), 8080);
    }

    #[test]
    fn log_level_directive_maps_legacy_level_names() {
        assert_eq!(log_level_directive("WARNING"), Some("warn"));
        assert_eq!(log_level_directive("success"), Some("info"));
        assert_eq!(log_level_directive("CRITICAL"), Some("error"));
        assert_eq!(log_level_directive(" Debug "), Some("debug"));
        assert_eq!(log_level_directive("INFO"), Some("info"));
    }

    #[test]
    fn log_level_directive_rejects_unknown_words() {
        assert_eq!(log_level_directive("verbose"), None);
        assert_eq!(log_level_directive(""), None);
        assert_eq!(log_level_directive("dinnerbot=debug"), None);
    }
}
