#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cardcraft_server::config::AppConfig;
use cardcraft_server::db::AppState;
use cardcraft_server::document::{Card, Document};
use cardcraft_server::messages::FallbackChain;
use cardcraft_server::payment::{PaymentError, PaymentGateway, PaymentIntent, PaymentStatus};
use cardcraft_server::render::{PageFormat, RenderError, Renderer};

pub const FAKE_PDF: &[u8] = b"%PDF-1.7\n% test document\n%%EOF";

/// Renderer that fails a fixed number of times, then returns a stub PDF.
pub struct MockRenderer {
    failures: usize,
    pub calls: AtomicUsize,
    pub last_card_count: AtomicUsize,
}

impl MockRenderer {
    pub fn new() -> Arc<Self> {
        Self::failing(0)
    }

    pub fn failing(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            failures,
            calls: AtomicUsize::new(0),
            last_card_count: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    async fn render(&self, document: &Document, _format: PageFormat) -> Result<Vec<u8>, RenderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_card_count
            .store(document.card_count(), Ordering::SeqCst);
        if call < self.failures {
            return Err(RenderError::EngineFailed {
                code: 1,
                stderr: "crashed".to_string(),
            });
        }
        Ok(FAKE_PDF.to_vec())
    }
}

/// In-memory payment gateway. Intents start as `requires_payment_method`
/// until the test marks them paid.
pub struct MockGateway {
    intents: Mutex<HashMap<String, PaymentIntent>>,
    counter: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            intents: Mutex::new(HashMap::new()),
            counter: AtomicUsize::new(0),
        })
    }

    pub fn mark_paid(&self, id: &str) {
        if let Some(intent) = self.intents.lock().unwrap().get_mut(id) {
            intent.status = PaymentStatus::Succeeded;
        }
    }

    pub fn intent(&self, id: &str) -> Option<PaymentIntent> {
        self.intents.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_intent(
        &self,
        amount_cents: i64,
        metadata: &HashMap<String, String>,
    ) -> Result<PaymentIntent, PaymentError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let intent = PaymentIntent {
            id: format!("pi_test_{}", n),
            client_secret: Some(format!("pi_test_{}_secret", n)),
            status: PaymentStatus::RequiresPaymentMethod,
            amount: amount_cents,
            metadata: metadata.clone(),
        };
        self.intents
            .lock()
            .unwrap()
            .insert(intent.id.clone(), intent.clone());
        Ok(intent)
    }

    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError> {
        self.intent(id).ok_or_else(|| PaymentError::Rejected {
            status: 404,
            message: format!("No such payment_intent: '{}'", id),
        })
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::for_tests();
    config.pdf_dir = std::env::temp_dir().join(format!("cardcraft-test-{}", uuid::Uuid::new_v4()));
    config
}

/// State with a lazy pool: handlers that never reach the database work.
pub fn test_state(renderer: Arc<MockRenderer>, gateway: Arc<MockGateway>) -> AppState {
    let config = test_config();
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .expect("lazy pool");
    AppState::with_parts(pool, config, renderer, gateway, FallbackChain::local_only())
}

pub fn cards(names: &[&str]) -> Vec<Card> {
    names
        .iter()
        .map(|name| Card::new(*name, Some("Vase"), format!("Thank you, {}!", name)))
        .collect()
}
