//! Shared helpers for unit tests: config, stub HTTP servers, fake clients.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use serde_json::Value;

use crate::config::Config;
use crate::llm_client::{CompletionBackend, LlmError};
use crate::servicenow::{RecordKind, RecordSource, ServiceNowError, VendorRecord};

pub fn test_config() -> Config {
    Config {
        sn_instance: "https://acme.service-now.com".to_string(),
        sn_username: "bridge".to_string(),
        sn_password: "secret".to_string(),
        openai_api_key: "sk-test".to_string(),
        openai_model: "gpt-4o-mini".to_string(),
        openai_base_url: "https://api.openai.com/v1".to_string(),
        port: 0,
        rust_log: "debug".to_string(),
    }
}

/// Serves `router` on an ephemeral localhost port and returns its base URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// What [`FakeRecords`] answers to every lookup.
pub enum Lookup {
    Found(Value),
    Empty,
    Status(u16),
}

/// In-memory [`RecordSource`] that counts lookups.
pub struct FakeRecords {
    lookup: Lookup,
    calls: AtomicUsize,
}

impl FakeRecords {
    pub fn new(lookup: Lookup) -> Self {
        Self {
            lookup,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSource for FakeRecords {
    async fn fetch_record(
        &self,
        kind: RecordKind,
        number: &str,
    ) -> Result<VendorRecord, ServiceNowError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.lookup {
            Lookup::Found(v) => Ok(VendorRecord::from(v.clone())),
            Lookup::Empty => Err(ServiceNowError::NotFound {
                kind,
                number: number.to_string(),
            }),
            Lookup::Status(status) => Err(ServiceNowError::Api {
                status: *status,
                body: "{\"error\":\"down\"}".to_string(),
            }),
        }
    }
}

/// [`CompletionBackend`] with a canned reply that records every prompt it receives.
pub struct FakeLlm {
    reply: Result<String, u16>,
    prompts: Mutex<Vec<String>>,
}

impl FakeLlm {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionBackend for FakeLlm {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(LlmError::Api {
                status: *status,
                body: "rate limited".to_string(),
            }),
        }
    }
}
