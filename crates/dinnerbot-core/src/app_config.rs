/// Process-wide settings, read once at startup and passed by value or
/// `Arc` into everything that needs them.
#[derive(Clone)]
pub struct AppConfig {
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub telegram_api_base: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub meal_send_hour: u32,
    pub meal_send_minute: u32,
    pub timezone: String,
    pub port: u16,
    pub log_level: String,
    pub leftover_ingredients: String,
    pub http_timeout_secs: u64,
}

impl AppConfig {
    /// `HH:MM` rendering of the daily send time, as shown to users.
    #[must_use]
    pub fn send_time_label(&self) -> String {
        format!("{}:{:02}", self.meal_send_hour, self.meal_send_minute)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |s: &str| if s.is_empty() { "[unset]" } else { "[redacted]" };
        f.debug_struct("AppConfig")
            .field("telegram_bot_token", &redact(&self.telegram_bot_token))
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("telegram_api_base", &self.telegram_api_base)
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("gemini_model", &self.gemini_model)
            .field("gemini_api_base", &self.gemini_api_base)
            .field("meal_send_hour", &self.meal_send_hour)
            .field("meal_send_minute", &self.meal_send_minute)
            .field("timezone", &self.timezone)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("leftover_ingredients", &self.leftover_ingredients)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}
