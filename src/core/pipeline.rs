use crate::core::classify;
use crate::core::{CardEntry, CardResult, CheckOutcome, ConfigProvider, Pipeline, Storage};
use crate::domain::model::TransactionStatus;
use crate::utils::error::Result;
use crate::utils::progress::ProgressTracker;
use regex::Regex;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// The portal rejects requests without a browser-looking User-Agent.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.1 Safari/537.36";

pub struct PortalPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> PortalPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs()))
            .build()?;

        Ok(Self {
            storage,
            config,
            client,
        })
    }
}

/// Fetches one card's portal page and classifies it. Any network or HTTP
/// failure degrades this card to Unknown without touching the batch.
async fn check_card(
    client: &Client,
    url: &str,
    card_no: String,
    head_name: String,
    month: &str,
    commodity: &Regex,
    watch_list: &[(String, Regex)],
) -> CardResult {
    let html = match fetch_portal_page(client, url).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("Portal request for {} failed: {}", card_no, e);
            return CardResult {
                card_no,
                head_name,
                transaction_status: TransactionStatus::Unknown,
                commodities: None,
            };
        }
    };

    let table_text = classify::month_table_text(&html, month);
    let transaction_status = classify::classify_table(table_text.as_deref(), commodity);
    let commodities = (!watch_list.is_empty())
        .then(|| classify::commodity_presence(table_text.as_deref(), watch_list));

    CardResult {
        card_no,
        head_name,
        transaction_status,
        commodities,
    }
}

async fn fetch_portal_page(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.text().await?)
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for PortalPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<CardEntry>> {
        tracing::debug!("Fetching registry list from: {}", self.config.registry_url());
        let response = self
            .client
            .get(self.config.registry_url())
            .send()
            .await?
            .error_for_status()?;

        let entries: Vec<CardEntry> = response.json().await?;
        tracing::debug!("Registry returned {} entries", entries.len());
        Ok(entries)
    }

    async fn transform(&self, entries: Vec<CardEntry>) -> Result<CheckOutcome> {
        let month = self
            .config
            .month()
            .map(|m| m.to_lowercase())
            .unwrap_or_else(classify::current_month);
        let commodity = classify::commodity_regex(self.config.commodity())?;
        let watch_list: Arc<Vec<(String, Regex)>> = Arc::new(
            self.config
                .commodities()
                .iter()
                .map(|name| Ok((name.clone(), classify::commodity_regex(name)?)))
                .collect::<Result<_>>()?,
        );

        tracing::info!(
            "Checking {} cards for '{}' in {} ({} concurrent requests)",
            entries.len(),
            self.config.commodity(),
            month,
            self.config.concurrent_requests()
        );

        let mut outcome = CheckOutcome::default();
        let tracker = Arc::new(ProgressTracker::new(entries.len()));
        let semaphore = Arc::new(Semaphore::new(self.config.concurrent_requests()));
        let mut tasks = JoinSet::new();

        for entry in entries {
            let Some(card_no) = entry.card_no().map(str::to_string) else {
                tracing::warn!("Skipping registry entry without CARDNO ({})", entry.head_name);
                outcome.skipped += 1;
                continue;
            };

            let client = self.client.clone();
            let url = format!("{}?rcno={}", self.config.portal_url(), card_no);
            let head_name = entry.head_name.clone();
            let month = month.clone();
            let commodity = commodity.clone();
            let watch_list = watch_list.clone();
            let tracker = tracker.clone();
            let semaphore = semaphore.clone();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let result = check_card(
                    &client,
                    &url,
                    card_no,
                    head_name,
                    &month,
                    &commodity,
                    &watch_list,
                )
                .await;
                tracker.record(&result.card_no, result.transaction_status);
                result
            });
        }

        // Collected in completion order; tasks are independent.
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => outcome.push(result),
                Err(e) => tracing::warn!("Portal worker task failed: {}", e),
            }
        }

        tracing::debug!("All portal queries finished in {:?}", tracker.elapsed());
        Ok(outcome)
    }

    async fn load(&self, outcome: CheckOutcome) -> Result<String> {
        tracing::info!(
            "Summary: {} Done, {} Not Done, {} Unknown, {} skipped",
            outcome.done,
            outcome.not_done,
            outcome.unknown,
            outcome.skipped
        );

        let json = serde_json::to_string_pretty(&outcome.results)?;
        self.storage
            .write_file(self.config.output_file(), json.as_bytes())
            .await?;

        let output_path = format!(
            "{}/{}",
            self.config.output_path(),
            self.config.output_file()
        );
        tracing::debug!("Results written to {}", output_path);
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::CheckError;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                CheckError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        registry_url: String,
        portal_url: String,
        commodities: Vec<String>,
    }

    impl MockConfig {
        fn new(registry_url: String, portal_url: String) -> Self {
            Self {
                registry_url,
                portal_url,
                commodities: vec![],
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn registry_url(&self) -> &str {
            &self.registry_url
        }

        fn portal_url(&self) -> &str {
            &self.portal_url
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn output_file(&self) -> &str {
            "transactions.json"
        }

        fn concurrent_requests(&self) -> usize {
            5
        }

        fn month(&self) -> Option<&str> {
            Some("october")
        }

        fn commodity(&self) -> &str {
            "FRice"
        }

        fn commodities(&self) -> &[String] {
            &self.commodities
        }

        fn timeout_secs(&self) -> u64 {
            10
        }
    }

    fn portal_html(rows: &str) -> String {
        format!(
            "<html><body><table><tr><th>Transaction Details for OCTOBER 2025</th></tr>{}</table></body></html>",
            rows
        )
    }

    fn pipeline_for(
        server: &MockServer,
        storage: MockStorage,
    ) -> PortalPipeline<MockStorage, MockConfig> {
        let config = MockConfig::new(server.url("/sa.json"), server.url("/Qcodesearch.jsp"));
        PortalPipeline::new(storage, config).unwrap()
    }

    #[tokio::test]
    async fn test_extract_parses_registry_entries() {
        let server = MockServer::start();
        let registry_mock = server.mock(|when, then| {
            when.method(GET).path("/sa.json");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"CARDNO": "2821000001", "HEAD OF THE FAMILY": "A", "FPSNO": "12"},
                    {"CARDNO": "2821000002", "HEAD OF THE FAMILY": "B"}
                ]));
        });

        let pipeline = pipeline_for(&server, MockStorage::new());
        let entries = pipeline.extract().await.unwrap();

        registry_mock.assert();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].card_no(), Some("2821000001"));
        assert_eq!(entries[1].head_name, "B");
    }

    #[tokio::test]
    async fn test_extract_registry_failure_is_fatal() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/sa.json");
            then.status(500);
        });

        let pipeline = pipeline_for(&server, MockStorage::new());
        let result = pipeline.extract().await;

        assert!(matches!(result, Err(CheckError::HttpError(_))));
    }

    #[tokio::test]
    async fn test_transform_classifies_each_card_independently() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(GET)
                .path("/Qcodesearch.jsp")
                .query_param("rcno", "DONE1");
            then.status(200)
                .body(portal_html("<tr><td>FRice (KG)</td><td>25.0</td></tr>"));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/Qcodesearch.jsp")
                .query_param("rcno", "NOTDONE1");
            then.status(200)
                .body(portal_html("<tr><td>Sugar (KG)</td><td>0.5</td></tr>"));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/Qcodesearch.jsp")
                .query_param("rcno", "BROKEN1");
            then.status(500);
        });

        let pipeline = pipeline_for(&server, MockStorage::new());
        let entries: Vec<CardEntry> = serde_json::from_value(serde_json::json!([
            {"CARDNO": "DONE1", "HEAD OF THE FAMILY": "A"},
            {"CARDNO": "NOTDONE1", "HEAD OF THE FAMILY": "B"},
            {"CARDNO": "BROKEN1", "HEAD OF THE FAMILY": "C"}
        ]))
        .unwrap();

        let outcome = pipeline.transform(entries).await.unwrap();

        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.done, 1);
        assert_eq!(outcome.not_done, 1);
        assert_eq!(outcome.unknown, 1);

        let by_card = |card: &str| {
            outcome
                .results
                .iter()
                .find(|r| r.card_no == card)
                .unwrap()
                .transaction_status
        };
        assert_eq!(by_card("DONE1"), TransactionStatus::Done);
        assert_eq!(by_card("NOTDONE1"), TransactionStatus::NotDone);
        assert_eq!(by_card("BROKEN1"), TransactionStatus::Unknown);
    }

    #[tokio::test]
    async fn test_transform_skips_entries_without_card_no() {
        let server = MockServer::start();
        let pipeline = pipeline_for(&server, MockStorage::new());

        let entries: Vec<CardEntry> = serde_json::from_value(serde_json::json!([
            {"HEAD OF THE FAMILY": "No Card"},
            {"CARDNO": "", "HEAD OF THE FAMILY": "Blank Card"}
        ]))
        .unwrap();

        let outcome = pipeline.transform(entries).await.unwrap();

        assert_eq!(outcome.results.len(), 0);
        assert_eq!(outcome.skipped, 2);
    }

    #[tokio::test]
    async fn test_transform_unreachable_portal_degrades_to_unknown() {
        let server = MockServer::start();
        // Portal path never mocked: every request 404s.
        let pipeline = pipeline_for(&server, MockStorage::new());

        let entries: Vec<CardEntry> =
            serde_json::from_value(serde_json::json!([{"CARDNO": "X1", "HEAD OF THE FAMILY": "A"}]))
                .unwrap();

        let outcome = pipeline.transform(entries).await.unwrap();

        assert_eq!(outcome.unknown, 1);
        assert_eq!(
            outcome.results[0].transaction_status,
            TransactionStatus::Unknown
        );
        assert!(outcome.results[0].commodities.is_none());
    }

    #[tokio::test]
    async fn test_transform_commodity_watch_list() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/Qcodesearch.jsp")
                .query_param("rcno", "W1");
            then.status(200).body(portal_html(
                "<tr><td>FRice (KG)</td></tr><tr><td>Sugar (KG)</td></tr>",
            ));
        });

        let mut config = MockConfig::new(server.url("/sa.json"), server.url("/Qcodesearch.jsp"));
        config.commodities = vec!["FRice".to_string(), "RGDal".to_string()];
        let pipeline = PortalPipeline::new(MockStorage::new(), config).unwrap();

        let entries: Vec<CardEntry> =
            serde_json::from_value(serde_json::json!([{"CARDNO": "W1", "HEAD OF THE FAMILY": "A"}]))
                .unwrap();

        let outcome = pipeline.transform(entries).await.unwrap();

        let commodities = outcome.results[0].commodities.as_ref().unwrap();
        assert_eq!(commodities.get("FRice"), Some(&true));
        assert_eq!(commodities.get("RGDal"), Some(&false));
    }

    #[tokio::test]
    async fn test_load_writes_result_json() {
        let server = MockServer::start();
        let storage = MockStorage::new();
        let pipeline = pipeline_for(&server, storage.clone());

        let mut outcome = CheckOutcome::default();
        outcome.push(CardResult {
            card_no: "2821000001".to_string(),
            head_name: "A".to_string(),
            transaction_status: TransactionStatus::Done,
            commodities: None,
        });

        let output_path = pipeline.load(outcome).await.unwrap();
        assert_eq!(output_path, "test_output/transactions.json");

        let bytes = storage.get_file("transactions.json").await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed[0]["CARDNO"], "2821000001");
        assert_eq!(parsed[0]["transaction_status"], "Done");
        assert!(parsed[0].get("commodities").is_none());
    }
}
