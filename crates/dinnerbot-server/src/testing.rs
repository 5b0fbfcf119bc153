//! In-memory recommender and notifier with call counters.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use dinnerbot_core::{AppConfig, Dish, Notifier, Recommendation, Recommender};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("injected failure")]
pub struct FakeError;

pub fn test_config() -> AppConfig {
    AppConfig {
        telegram_bot_token: "token".to_string(),
        telegram_chat_id: "chat".to_string(),
        telegram_api_base: "http://127.0.0.1:9".to_string(),
        gemini_api_key: "key".to_string(),
        gemini_model: "gemini-test".to_string(),
        gemini_api_base: "http://127.0.0.1:9".to_string(),
        meal_send_hour: 17,
        meal_send_minute: 30,
        timezone: "Asia/Seoul".to_string(),
        port: 8080,
        log_level: "info".to_string(),
        leftover_ingredients: String::new(),
        http_timeout_secs: 5,
    }
}

fn sample_recommendation() -> Recommendation {
    Recommendation {
        title: "테스트 저녁".to_string(),
        dishes: vec![Dish {
            name: "두부조림".to_string(),
            description: "간단한 단백질 반찬".to_string(),
            ingredients: vec!["두부".to_string()],
            cooking_minutes: Some(15),
        }],
        tip: None,
    }
}

pub struct FakeRecommender {
    fail: bool,
    delay: Option<Duration>,
    pub generate_calls: AtomicUsize,
    ingredient_calls: Mutex<Vec<String>>,
}

impl FakeRecommender {
    pub fn ok() -> Self {
        Self {
            fail: false,
            delay: None,
            generate_calls: AtomicUsize::new(0),
            ingredient_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::ok()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn ingredient_calls(&self) -> Vec<String> {
        self.ingredient_calls.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst) + self.ingredient_calls().len()
    }

    async fn respond(&self) -> Result<Recommendation, FakeError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            Err(FakeError)
        } else {
            Ok(sample_recommendation())
        }
    }
}

impl Recommender for FakeRecommender {
    type Error = FakeError;

    async fn generate(&self) -> Result<Recommendation, FakeError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.respond().await
    }

    async fn generate_from_ingredients(
        &self,
        ingredients: &str,
    ) -> Result<Recommendation, FakeError> {
        self.ingredient_calls
            .lock()
            .unwrap()
            .push(ingredients.to_string());
        self.respond().await
    }
}

pub struct FakeNotifier {
    deliver: bool,
    openable: bool,
    open: AtomicBool,
    pub start_calls: AtomicUsize,
    pub close_calls: AtomicUsize,
    recommendations: AtomicUsize,
    messages: Mutex<Vec<String>>,
}

impl FakeNotifier {
    pub fn delivering() -> Self {
        Self {
            deliver: true,
            openable: true,
            open: AtomicBool::new(false),
            start_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
            recommendations: AtomicUsize::new(0),
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            deliver: false,
            ..Self::delivering()
        }
    }

    pub fn unopenable() -> Self {
        Self {
            openable: false,
            ..Self::delivering()
        }
    }

    pub fn recommendations_sent(&self) -> usize {
        self.recommendations.load(Ordering::SeqCst)
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

impl Notifier for FakeNotifier {
    type Error = FakeError;

    async fn start(&self) -> Result<(), FakeError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if !self.openable {
            return Err(FakeError);
        }
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.open.store(false, Ordering::SeqCst);
    }

    async fn send_message(&self, text: &str) -> bool {
        self.messages.lock().unwrap().push(text.to_string());
        self.deliver
    }

    async fn send_recommendation(&self, _recommendation: &Recommendation) -> bool {
        self.recommendations.fetch_add(1, Ordering::SeqCst);
        self.deliver
    }

    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&chrono_tz::Asia::Seoul)
    }
}
