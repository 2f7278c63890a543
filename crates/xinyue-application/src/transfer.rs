//! Concurrent transfer of a result page, and single-resource transfer.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use xinyue_core::backend::Backend;
use xinyue_core::messages::{MessageKey, MessageTable};
use xinyue_core::search::ResultRecord;
use xinyue_core::transfer::{TransferError, TransferGateway, TransferReceipt, TransferRequest};

use crate::credential_cache::CredentialCache;

/// Renders result lines, re-hosting every resource through the transfer
/// service when transfers are active.
///
/// Cheap to clone; spawned per-record tasks each hold a clone.
#[derive(Clone)]
pub struct TransferOrchestrator {
    credentials: Arc<CredentialCache>,
    gateway: Arc<dyn TransferGateway>,
    messages: Arc<MessageTable>,
    timeout: Duration,
    delay: Duration,
    enabled: bool,
}

enum PendingLine {
    Ready(String),
    Spawned {
        number: usize,
        title: String,
        handle: JoinHandle<String>,
    },
}

impl TransferOrchestrator {
    pub fn new(
        credentials: Arc<CredentialCache>,
        gateway: Arc<dyn TransferGateway>,
        messages: Arc<MessageTable>,
        timeout: Duration,
        delay: Duration,
        enabled: bool,
    ) -> Self {
        Self {
            credentials,
            gateway,
            messages,
            timeout,
            delay,
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn title<'a>(&'a self, record: &'a ResultRecord) -> &'a str {
        record.title_or(self.messages.get(MessageKey::DefaultTitle))
    }

    /// Lines for `records`, numbered from `start_index + 1`.
    ///
    /// With transfers active, every record with a URL is transferred in its
    /// own task. Output order always matches input order, and one failing
    /// record never affects the lines of the others.
    pub async fn render_page(&self, records: &[ResultRecord], start_index: usize) -> Vec<String> {
        if !self.enabled {
            return records
                .iter()
                .enumerate()
                .map(|(offset, record)| self.plain_line(start_index + offset + 1, record))
                .collect();
        }

        let backends: BTreeSet<Backend> = records
            .iter()
            .filter_map(|record| record.url.as_deref())
            .map(Backend::identify)
            .collect();
        self.credentials.prefetch(&backends).await;

        let pending: Vec<PendingLine> = records
            .iter()
            .enumerate()
            .map(|(offset, record)| {
                let number = start_index + offset + 1;
                let title = self.title(record).to_string();
                match record.url.clone() {
                    None => PendingLine::Ready(
                        self.messages
                            .render(MessageKey::ResultTitleLine, &[&number, &title]),
                    ),
                    Some(url) => {
                        let this = self.clone();
                        let request = TransferRequest {
                            backend: Backend::identify(&url),
                            code: record.share_code().unwrap_or_default(),
                            url,
                        };
                        let task_title = title.clone();
                        let handle = tokio::spawn(async move {
                            this.transferred_line(number, &task_title, &request).await
                        });
                        PendingLine::Spawned {
                            number,
                            title,
                            handle,
                        }
                    }
                }
            })
            .collect();

        join_all(pending.into_iter().map(|line| self.resolve(line))).await
    }

    async fn resolve(&self, line: PendingLine) -> String {
        match line {
            PendingLine::Ready(text) => text,
            PendingLine::Spawned {
                number,
                title,
                handle,
            } => match handle.await {
                Ok(text) => text,
                Err(err) => {
                    tracing::error!("Transfer task for result {} aborted: {}", number, err);
                    format!(
                        "{}. {}\n{}",
                        number,
                        title,
                        self.messages.get(MessageKey::ProcessingFailed)
                    )
                }
            },
        }
    }

    fn plain_line(&self, number: usize, record: &ResultRecord) -> String {
        let title = self.title(record);
        match record.url.as_deref() {
            Some(url) => self
                .messages
                .render(MessageKey::ResultLine, &[&number, &title, &url]),
            None => self
                .messages
                .render(MessageKey::ResultTitleLine, &[&number, &title]),
        }
    }

    async fn transferred_line(&self, number: usize, title: &str, request: &TransferRequest) -> String {
        match self.transfer(request).await {
            Ok(receipt) => self.messages.render(
                MessageKey::TransferredLine,
                &[&number, &receipt.title, &receipt.share_url],
            ),
            Err(err) => {
                tracing::warn!("Transfer of result {} failed: {}", number, err);
                self.messages
                    .render(MessageKey::TransferFailedLine, &[&number, &title])
            }
        }
    }

    /// Fetches the backend credential, then transfers within the timeout.
    ///
    /// The token only gates the call; the transfer service authenticates
    /// with the configured API key.
    pub async fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, TransferError> {
        self.credentials.get(request.backend).await?;

        match tokio::time::timeout(self.timeout, self.gateway.transfer(request)).await {
            Ok(result) => result,
            Err(_) => Err(TransferError::Timeout),
        }
    }

    /// Transfers one chosen resource and reports progress and outcome.
    ///
    /// Waits the configured delay between the progress notice and the call.
    pub async fn transfer_resource(&self, record: &ResultRecord) -> Vec<String> {
        let Some(url) = record.url.as_deref() else {
            return vec![self.messages.get(MessageKey::NoValidLink).to_string()];
        };
        let Some(backend) = Backend::match_url(url) else {
            return vec![self.messages.get(MessageKey::UnsupportedBackend).to_string()];
        };

        let title = self.title(record);
        let notice = self.messages.render(MessageKey::Transferring, &[&title]);
        tokio::time::sleep(self.delay).await;

        let request = TransferRequest {
            url: url.to_string(),
            code: record.share_code().unwrap_or_default(),
            backend,
        };

        let outcome = match self.transfer(&request).await {
            Ok(receipt) => {
                tracing::info!("Transferred '{}' from {}", title, backend);
                self.messages.render(
                    MessageKey::TransferSucceeded,
                    &[&receipt.title, &receipt.share_url],
                )
            }
            Err(err) => {
                tracing::warn!("Transfer of '{}' failed: {}", title, err);
                let reason = self.failure_reason(&err);
                self.messages.render(MessageKey::TransferFailed, &[&reason])
            }
        };

        vec![notice, outcome]
    }

    fn failure_reason(&self, err: &TransferError) -> String {
        match err {
            TransferError::Rejected(message) => message.clone(),
            TransferError::Status(status) => self
                .messages
                .render(MessageKey::TransferServiceError, &[status]),
            TransferError::Timeout => self.messages.get(MessageKey::TransferTimeout).to_string(),
            TransferError::Credential(_) => {
                self.messages.get(MessageKey::CredentialUnavailable).to_string()
            }
            TransferError::Transport(_) | TransferError::Malformed(_) => err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use xinyue_core::credential::{CredentialError, CredentialGateway};

    struct StaticCredentials;

    #[async_trait]
    impl CredentialGateway for StaticCredentials {
        async fn probe(&self, _backend: Backend) -> Result<(), CredentialError> {
            Ok(())
        }

        async fn fetch(&self, backend: Backend) -> Result<String, CredentialError> {
            Ok(format!("{}-token", backend))
        }
    }

    /// Fails any URL containing "broken", times out on "slow".
    #[derive(Default)]
    struct ScriptedTransfers {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TransferGateway for ScriptedTransfers {
        async fn transfer(&self, request: &TransferRequest) -> Result<TransferReceipt, TransferError> {
            self.calls.lock().unwrap().push(request.url.clone());
            if request.url.contains("slow") {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if request.url.contains("broken") {
                return Err(TransferError::Rejected("link expired".to_string()));
            }
            Ok(TransferReceipt {
                title: "saved".to_string(),
                share_url: format!("{}-new", request.url),
            })
        }
    }

    fn orchestrator(gateway: Arc<ScriptedTransfers>, enabled: bool) -> TransferOrchestrator {
        let credentials = Arc::new(CredentialCache::new(
            Arc::new(StaticCredentials),
            Duration::from_secs(300),
            Duration::from_secs(10),
        ));
        TransferOrchestrator::new(
            credentials,
            gateway,
            Arc::new(MessageTable::default()),
            Duration::from_secs(30),
            Duration::from_secs(1),
            enabled,
        )
    }

    #[tokio::test]
    async fn test_disabled_renders_plain_lines() {
        let gateway = Arc::new(ScriptedTransfers::default());
        let records = vec![
            ResultRecord::new("Movie", "https://pan.quark.cn/s/1"),
            ResultRecord::from_value(serde_json::json!({"title": "No link"})).unwrap(),
        ];

        let lines = orchestrator(gateway.clone(), false).render_page(&records, 5).await;
        assert_eq!(
            lines,
            vec![
                "6. Movie\nLink: https://pan.quark.cn/s/1".to_string(),
                "7. No link".to_string()
            ]
        );
        assert!(gateway.calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_and_timeouts_stay_in_place() {
        let gateway = Arc::new(ScriptedTransfers::default());
        let records = vec![
            ResultRecord::new("A", "https://pan.quark.cn/s/a"),
            ResultRecord::new("B", "https://pan.baidu.com/s/broken"),
            ResultRecord::new("C", "https://pan.xunlei.com/s/slow"),
            ResultRecord::new("D", "https://drive.uc.cn/s/d"),
        ];

        let lines = orchestrator(gateway, true).render_page(&records, 0).await;
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "1. saved\nLink: https://pan.quark.cn/s/a-new");
        assert_eq!(lines[1], "2. B\nTransfer failed, try searching another drive");
        assert_eq!(lines[2], "3. C\nTransfer failed, try searching another drive");
        assert_eq!(lines[3], "4. saved\nLink: https://drive.uc.cn/s/d-new");
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_transfer_reports_notice_and_receipt() {
        let gateway = Arc::new(ScriptedTransfers::default());
        let record = ResultRecord::new("Show", "https://pan.quark.cn/s/q?pwd=ab12");

        let started = tokio::time::Instant::now();
        let replies = orchestrator(gateway, true).transfer_resource(&record).await;

        assert!(started.elapsed() >= Duration::from_secs(1));
        assert_eq!(replies[0], "Transferring \"Show\", please wait...");
        assert_eq!(
            replies[1],
            "Transfer succeeded\nTitle: saved\nShare link: https://pan.quark.cn/s/q?pwd=ab12-new"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_transfer_rejections() {
        let gateway = Arc::new(ScriptedTransfers::default());
        let orchestrator = orchestrator(gateway, true);

        let unknown = ResultRecord::new("X", "https://example.com/file");
        assert_eq!(
            orchestrator.transfer_resource(&unknown).await,
            vec!["Transfer is not supported for this drive".to_string()]
        );

        let broken = ResultRecord::new("Y", "https://pan.baidu.com/s/broken");
        let replies = orchestrator.transfer_resource(&broken).await;
        assert_eq!(replies[1], "Transfer failed: link expired");
    }
}
