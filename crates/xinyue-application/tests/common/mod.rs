#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use xinyue_application::{Gateways, SearchEngine};
use xinyue_core::backend::Backend;
use xinyue_core::credential::{CredentialError, CredentialGateway};
use xinyue_core::entitlement::EntitlementGate;
use xinyue_core::error::{Result, XinyueError};
use xinyue_core::search::{SearchGateway, SearchOutcome, SearchRequest};
use xinyue_core::transfer::{TransferError, TransferGateway, TransferReceipt, TransferRequest};
use xinyue_core::EngineConfig;

pub fn json_body(value: Value) -> SearchOutcome {
    SearchOutcome::Body {
        content_type: "application/json".to_string(),
        body: value.to_string(),
    }
}

pub fn sse_body(body: &str) -> SearchOutcome {
    SearchOutcome::Body {
        content_type: "text/event-stream; charset=utf-8".to_string(),
        body: body.to_string(),
    }
}

/// `{"data": [...]}` with `n` Quark records titled "Item 1".."Item n".
pub fn records_body(n: usize) -> SearchOutcome {
    let items: Vec<Value> = (1..=n)
        .map(|i| json!({"title": format!("Item {}", i), "url": format!("https://pan.quark.cn/s/{}", i)}))
        .collect();
    json_body(json!({ "data": items }))
}

/// Replays scripted outcomes in order, then repeats `fallback`.
pub struct MockSearchGateway {
    script: Mutex<VecDeque<SearchOutcome>>,
    fallback: SearchOutcome,
    local: SearchOutcome,
    pub requests: Mutex<Vec<SearchRequest>>,
    pub local_requests: Mutex<Vec<String>>,
}

impl MockSearchGateway {
    pub fn always(outcome: SearchOutcome) -> Self {
        Self::scripted(Vec::new(), outcome)
    }

    pub fn scripted(outcomes: Vec<SearchOutcome>, fallback: SearchOutcome) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            fallback,
            local: SearchOutcome::NotFound,
            requests: Mutex::new(Vec::new()),
            local_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_local(mut self, outcome: SearchOutcome) -> Self {
        self.local = outcome;
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchGateway for MockSearchGateway {
    async fn search(&self, request: &SearchRequest) -> SearchOutcome {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }

    async fn local_search(&self, keyword: &str) -> SearchOutcome {
        self.local_requests.lock().unwrap().push(keyword.to_string());
        self.local.clone()
    }
}

/// Issues `"{backend}-token"` after an optional simulated latency.
#[derive(Default)]
pub struct MockCredentialGateway {
    pub probes: Mutex<usize>,
    pub fetches: Mutex<usize>,
    pub latency: Duration,
}

impl MockCredentialGateway {
    pub fn slow(latency: Duration) -> Self {
        Self {
            latency,
            ..Default::default()
        }
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock().unwrap()
    }
}

#[async_trait]
impl CredentialGateway for MockCredentialGateway {
    async fn probe(&self, _backend: Backend) -> std::result::Result<(), CredentialError> {
        *self.probes.lock().unwrap() += 1;
        Ok(())
    }

    async fn fetch(&self, backend: Backend) -> std::result::Result<String, CredentialError> {
        tokio::time::sleep(self.latency).await;
        *self.fetches.lock().unwrap() += 1;
        Ok(format!("{}-token", backend))
    }
}

/// Rejects URLs containing "fail"; otherwise re-shares under `/new`.
#[derive(Default)]
pub struct MockTransferGateway {
    pub requests: Mutex<Vec<TransferRequest>>,
}

#[async_trait]
impl TransferGateway for MockTransferGateway {
    async fn transfer(
        &self,
        request: &TransferRequest,
    ) -> std::result::Result<TransferReceipt, TransferError> {
        self.requests.lock().unwrap().push(request.clone());
        if request.url.contains("fail") {
            return Err(TransferError::Rejected("resource removed".to_string()));
        }
        let id = request.url.rsplit('/').next().unwrap_or_default();
        Ok(TransferReceipt {
            title: format!("Saved {}", id),
            share_url: format!("https://pan.quark.cn/s/new-{}", id),
        })
    }
}

pub struct FixedEntitlement(pub bool);

impl EntitlementGate for FixedEntitlement {
    fn check(&self) -> Result<()> {
        if self.0 {
            Ok(())
        } else {
            Err(XinyueError::Entitlement("denied in test".to_string()))
        }
    }
}

pub struct Harness {
    pub engine: SearchEngine,
    pub search: Arc<MockSearchGateway>,
    pub credentials: Arc<MockCredentialGateway>,
    pub transfers: Arc<MockTransferGateway>,
}

pub fn harness(config: EngineConfig, search: MockSearchGateway) -> Harness {
    harness_with(config, search, true)
}

pub fn harness_with(config: EngineConfig, search: MockSearchGateway, entitled: bool) -> Harness {
    let search = Arc::new(search);
    let credentials = Arc::new(MockCredentialGateway::default());
    let transfers = Arc::new(MockTransferGateway::default());

    let engine = SearchEngine::new(
        config,
        Gateways {
            search: search.clone(),
            credentials: credentials.clone(),
            transfer: transfers.clone(),
            entitlement: Arc::new(FixedEntitlement(entitled)),
        },
    );

    Harness {
        engine,
        search,
        credentials,
        transfers,
    }
}

/// Defaults with transfers switched off (no API key).
pub fn plain_config() -> EngineConfig {
    EngineConfig::default()
}

/// Defaults with transfers active.
pub fn transfer_config() -> EngineConfig {
    EngineConfig {
        api_key: "test-key".to_string(),
        ..EngineConfig::default()
    }
}
