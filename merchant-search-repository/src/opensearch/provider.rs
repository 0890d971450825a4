//! OpenSearch provider implementation.
//!
//! This module provides the hosted `IndexProvider` using the OpenSearch Rust
//! crate. Every write is a single request; failures are logged here and
//! reported to the caller as `Ok(false)`.

use async_trait::async_trait;
use merchant_search_shared::{IndexableRecord, RecordId};
use opensearch::{
    auth::Credentials,
    http::{
        request::JsonBody,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
    BulkParts, DeleteParts, IndexParts, OpenSearch,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::{BatchIndexProvider, IndexProvider, SettingsCapable};
use crate::opensearch::index_config::{IndexConfig, OBJECT_ID_FIELD};
use crate::types::{
    BatchOperationResult, BatchOperationSummary, FieldKind, HelpLink, ProviderDescription,
    ProviderSettings, SettingsField,
};

/// Slug under which the provider is registered.
pub const OPENSEARCH_PROVIDER_SLUG: &str = "opensearch";

const URL_SETTING: &str = "url";
const INDEX_PREFIX_SETTING: &str = "index_prefix";
const USERNAME_SETTING: &str = "username";
const PASSWORD_SETTING: &str = "password";

/// Bulk action applied to every line of a `_bulk` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BulkAction {
    Index,
    Delete,
}

impl BulkAction {
    fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Index => "index",
            BulkAction::Delete => "delete",
        }
    }
}

/// OpenSearch provider implementation.
///
/// Built from persisted settings. A missing `url` leaves the provider
/// constructed but not ready; a malformed one fails construction.
///
/// # Example
///
/// ```ignore
/// let mut settings = ProviderSettings::new();
/// settings.insert("url".to_string(), "http://localhost:9200".to_string());
/// let provider = OpenSearchProvider::from_settings(&settings)?;
///
/// let record = IndexableRecord::new(42u64).with("name", "Blue mug");
/// provider.update_item(&record, &RecordId::from(42), "products").await?;
/// ```
pub struct OpenSearchProvider {
    client: Option<OpenSearch>,
    index_config: IndexConfig,
    settings: ProviderSettings,
}

impl OpenSearchProvider {
    /// Create a provider from its persisted settings.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance (possibly not ready)
    /// * `Err(SearchIndexError)` - If the url is malformed or the transport cannot be built
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, SearchIndexError> {
        let url = settings
            .get(URL_SETTING)
            .map(|u| u.trim())
            .filter(|u| !u.is_empty());

        let client = match url {
            Some(url) => Some(Self::build_client(url, settings)?),
            None => None,
        };

        let index_config = IndexConfig::new(
            settings
                .get(INDEX_PREFIX_SETTING)
                .map(|p| p.trim().to_string())
                .unwrap_or_default(),
        );

        if let Some(url) = url {
            info!(
                url = %url,
                prefix = %index_config.prefix,
                "Created OpenSearch provider"
            );
        }

        Ok(Self {
            client,
            index_config,
            settings: settings.clone(),
        })
    }

    fn build_client(url: &str, settings: &ProviderSettings) -> Result<OpenSearch, SearchIndexError> {
        let parsed_url = Url::parse(url).map_err(|e| SearchIndexError::construction(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();

        let username = settings.get(USERNAME_SETTING).filter(|u| !u.is_empty());
        if let Some(username) = username {
            let password = settings.get(PASSWORD_SETTING).cloned().unwrap_or_default();
            builder = builder.auth(Credentials::Basic(username.clone(), password));
        }

        let transport = builder
            .build()
            .map_err(|e| SearchIndexError::construction(e.to_string()))?;

        Ok(OpenSearch::new(transport))
    }

    fn client(&self) -> Result<&OpenSearch, SearchIndexError> {
        self.client
            .as_ref()
            .ok_or_else(|| SearchIndexError::connection("OpenSearch url is not configured"))
    }

    /// Stored document: the record plus `object_id`. Single and bulk writes
    /// send the same shape.
    fn document(record: &IndexableRecord, id: &RecordId) -> Value {
        let mut fields = record.fields().clone();
        fields.insert(OBJECT_ID_FIELD.to_string(), id.to_value());
        Value::Object(fields)
    }

    /// Build the NDJSON lines of a bulk index request.
    ///
    /// Records without a resolvable id are skipped and returned separately.
    fn bulk_index_lines(records: &[IndexableRecord]) -> (Vec<Value>, usize) {
        let mut lines = Vec::with_capacity(records.len() * 2);
        let mut skipped = 0;

        for record in records {
            match record.resolvable_id() {
                Some(id) => {
                    lines.push(json!({ "index": { "_id": id.to_string() } }));
                    lines.push(Self::document(record, &id));
                }
                None => skipped += 1,
            }
        }

        (lines, skipped)
    }

    /// Build the NDJSON lines of a bulk delete request.
    fn bulk_delete_lines(ids: &[RecordId]) -> (Vec<Value>, usize) {
        let mut lines = Vec::with_capacity(ids.len());
        let mut skipped = 0;

        for id in ids {
            if id.is_resolvable() {
                lines.push(json!({ "delete": { "_id": id.to_string() } }));
            } else {
                skipped += 1;
            }
        }

        (lines, skipped)
    }

    /// Reduce a `_bulk` response body to per-record results.
    ///
    /// A `404` on a delete line means the document was already gone and
    /// counts as success.
    fn parse_bulk_response(
        body: &Value,
        action: BulkAction,
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let items = body
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| SearchIndexError::parse("Bulk response has no items"))?;

        let mut summary = BatchOperationSummary::default();
        for item in items {
            let line = item
                .get(action.as_str())
                .ok_or_else(|| SearchIndexError::parse("Bulk response item has unexpected action"))?;

            let id = line
                .get("_id")
                .and_then(RecordId::from_value)
                .unwrap_or_else(|| RecordId::from(""));
            let status = line.get("status").and_then(Value::as_u64).unwrap_or(0);
            let not_found = action == BulkAction::Delete && status == 404;

            let error = match line.get("error") {
                Some(err) if !not_found => Some(SearchIndexError::bulk_index(err.to_string())),
                _ if !not_found && !(200..300).contains(&status) => Some(SearchIndexError::bulk_index(
                    format!("Bulk item failed with status {}", status),
                )),
                _ => None,
            };

            summary.push(BatchOperationResult {
                id,
                success: error.is_none(),
                error,
            });
        }

        Ok(summary)
    }

    async fn try_index(
        &self,
        record: &IndexableRecord,
        id: &RecordId,
        collection: &str,
    ) -> Result<(), SearchIndexError> {
        if !id.is_resolvable() {
            return Err(SearchIndexError::validation("Record has no resolvable id"));
        }

        let index = self.index_config.index_name(collection);
        let doc_id = id.to_string();

        let response = self
            .client()?
            .index(IndexParts::IndexId(&index, &doc_id))
            .body(Self::document(record, id))
            .send()
            .await
            .map_err(|e| SearchIndexError::index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SearchIndexError::index(format!(
                "Index failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %index, doc_id = %doc_id, "Document indexed");
        Ok(())
    }

    async fn try_delete(&self, id: &RecordId, collection: &str) -> Result<(), SearchIndexError> {
        if !id.is_resolvable() {
            return Err(SearchIndexError::validation("Record has no resolvable id"));
        }

        let index = self.index_config.index_name(collection);
        let doc_id = id.to_string();

        let response = self
            .client()?
            .delete(DeleteParts::IndexId(&index, &doc_id))
            .send()
            .await
            .map_err(|e| SearchIndexError::delete(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - document may not exist
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SearchIndexError::delete(format!(
                "Delete failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %index, doc_id = %doc_id, "Document deleted");
        Ok(())
    }

    async fn try_bulk(
        &self,
        lines: Vec<Value>,
        action: BulkAction,
        collection: &str,
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let index = self.index_config.index_name(collection);
        let body: Vec<JsonBody<Value>> = lines.into_iter().map(JsonBody::new).collect();

        let response = self
            .client()?
            .bulk(BulkParts::Index(&index))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::bulk_index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SearchIndexError::bulk_index(format!(
                "Bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        Self::parse_bulk_response(&body, action)
    }

    /// Run a bulk request and absorb every failure into `false`.
    async fn run_bulk(
        &self,
        lines: Vec<Value>,
        skipped: usize,
        action: BulkAction,
        collection: &str,
    ) -> bool {
        if skipped > 0 {
            warn!(
                collection,
                skipped,
                "Skipping records without a resolvable id"
            );
        }

        if lines.is_empty() {
            return true;
        }

        match self.try_bulk(lines, action, collection).await {
            Ok(summary) if summary.is_success() => {
                debug!(
                    collection,
                    total = summary.total,
                    action = action.as_str(),
                    "Bulk request completed"
                );
                true
            }
            Ok(summary) => {
                error!(
                    collection,
                    failed = summary.failed,
                    total = summary.total,
                    failed_ids = ?summary.failed_ids(),
                    "Bulk request had item failures"
                );
                false
            }
            Err(e) => {
                error!(collection, error = %e, "Bulk request failed");
                false
            }
        }
    }
}

#[async_trait]
impl IndexProvider for OpenSearchProvider {
    fn slug(&self) -> &str {
        OPENSEARCH_PROVIDER_SLUG
    }

    fn label(&self) -> &str {
        "OpenSearch"
    }

    fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn create_item(
        &self,
        record: &IndexableRecord,
        id: &RecordId,
        collection: &str,
    ) -> Result<bool, SearchIndexError> {
        match self.try_index(record, id, collection).await {
            Ok(()) => Ok(true),
            Err(e) => {
                error!(collection, id = %id, error = %e, "OpenSearch create failed");
                Ok(false)
            }
        }
    }

    async fn update_item(
        &self,
        record: &IndexableRecord,
        id: &RecordId,
        collection: &str,
    ) -> Result<bool, SearchIndexError> {
        match self.try_index(record, id, collection).await {
            Ok(()) => Ok(true),
            Err(e) => {
                error!(collection, id = %id, error = %e, "OpenSearch update failed");
                Ok(false)
            }
        }
    }

    async fn delete_item(&self, id: &RecordId, collection: &str) -> Result<bool, SearchIndexError> {
        match self.try_delete(id, collection).await {
            Ok(()) => Ok(true),
            Err(e) => {
                error!(collection, id = %id, error = %e, "OpenSearch delete failed");
                Ok(false)
            }
        }
    }

    fn as_batch(&self) -> Option<&dyn BatchIndexProvider> {
        Some(self)
    }

    fn as_settings(&self) -> Option<&dyn SettingsCapable> {
        Some(self)
    }
}

#[async_trait]
impl BatchIndexProvider for OpenSearchProvider {
    async fn batch_create_items(
        &self,
        records: &[IndexableRecord],
        collection: &str,
    ) -> Result<bool, SearchIndexError> {
        let (lines, skipped) = Self::bulk_index_lines(records);
        Ok(self.run_bulk(lines, skipped, BulkAction::Index, collection).await)
    }

    /// Same request as create: `index` lines replace whole documents.
    async fn batch_update_items(
        &self,
        records: &[IndexableRecord],
        collection: &str,
    ) -> Result<bool, SearchIndexError> {
        let (lines, skipped) = Self::bulk_index_lines(records);
        Ok(self.run_bulk(lines, skipped, BulkAction::Index, collection).await)
    }

    async fn batch_delete_items(
        &self,
        ids: &[RecordId],
        collection: &str,
    ) -> Result<bool, SearchIndexError> {
        let (lines, skipped) = Self::bulk_delete_lines(ids);
        Ok(self.run_bulk(lines, skipped, BulkAction::Delete, collection).await)
    }
}

impl SettingsCapable for OpenSearchProvider {
    fn settings_slug(&self) -> &str {
        OPENSEARCH_PROVIDER_SLUG
    }

    fn settings_fields(&self) -> Vec<SettingsField> {
        vec![
            SettingsField::new(URL_SETTING, "Cluster URL", FieldKind::Text)
                .with_description("Base URL of the OpenSearch cluster, e.g. https://search.example.com:9200")
                .public(),
            SettingsField::new(INDEX_PREFIX_SETTING, "Index prefix", FieldKind::Text)
                .with_description("Prepended to every index name")
                .public()
                .with_default(""),
            SettingsField::new(USERNAME_SETTING, "Username", FieldKind::Text)
                .with_description("Basic auth user"),
            SettingsField::new(PASSWORD_SETTING, "Password", FieldKind::Password)
                .with_description("Basic auth password"),
        ]
    }

    fn settings_description(&self) -> ProviderDescription {
        ProviderDescription {
            text: "Index orders, products and customers in an OpenSearch cluster.".to_string(),
            link: Some(HelpLink {
                label: "OpenSearch documentation".to_string(),
                url: "https://docs.opensearch.org/latest/".to_string(),
            }),
        }
    }

    fn settings(&self) -> &ProviderSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> ProviderSettings {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_missing_url_is_not_ready() {
        let provider = OpenSearchProvider::from_settings(&ProviderSettings::new()).unwrap();
        assert!(!provider.is_ready());

        let provider = OpenSearchProvider::from_settings(&settings(&[("url", "   ")])).unwrap();
        assert!(!provider.is_ready());
    }

    #[test]
    fn test_malformed_url_fails_construction() {
        let result = OpenSearchProvider::from_settings(&settings(&[("url", "not a url")]));
        assert!(matches!(
            result,
            Err(SearchIndexError::ConstructionError(_))
        ));
    }

    #[test]
    fn test_valid_url_is_ready() {
        let provider = OpenSearchProvider::from_settings(&settings(&[
            ("url", "http://localhost:9200"),
            ("username", "admin"),
            ("password", "secret"),
        ]))
        .unwrap();
        assert!(provider.is_ready());
        assert!(provider.as_batch().is_some());
    }

    #[test]
    fn test_bulk_index_lines_add_object_id_and_skip_missing_ids() {
        let records = vec![
            IndexableRecord::new(3u64).with("name", "Mug"),
            IndexableRecord::empty().with("name", "No id"),
            IndexableRecord::new(0u64).with("name", "Zero id"),
            IndexableRecord::new(4u64).with("name", "Plate"),
        ];

        let (lines, skipped) = OpenSearchProvider::bulk_index_lines(&records);

        assert_eq!(skipped, 2);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], json!({ "index": { "_id": "3" } }));
        assert_eq!(lines[1]["object_id"], json!(3));
        assert_eq!(lines[1]["name"], "Mug");
        assert_eq!(lines[2], json!({ "index": { "_id": "4" } }));
    }

    #[test]
    fn test_bulk_delete_lines() {
        let ids = vec![RecordId::from(1), RecordId::from(0), RecordId::from("sku-9")];
        let (lines, skipped) = OpenSearchProvider::bulk_delete_lines(&ids);

        assert_eq!(skipped, 1);
        assert_eq!(
            lines,
            vec![
                json!({ "delete": { "_id": "1" } }),
                json!({ "delete": { "_id": "sku-9" } }),
            ]
        );
    }

    #[test]
    fn test_parse_bulk_response_with_item_error() {
        let body = json!({
            "took": 3,
            "errors": true,
            "items": [
                { "index": { "_id": "1", "status": 201 } },
                { "index": { "_id": "2", "status": 400, "error": { "type": "mapper_parsing_exception" } } }
            ]
        });

        let summary = OpenSearchProvider::parse_bulk_response(&body, BulkAction::Index).unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failed_ids(), vec!["2".to_string()]);
    }

    #[test]
    fn test_parse_bulk_response_delete_not_found_is_success() {
        let body = json!({
            "errors": false,
            "items": [
                { "delete": { "_id": "1", "status": 200, "result": "deleted" } },
                { "delete": { "_id": "2", "status": 404, "result": "not_found" } }
            ]
        });

        let summary = OpenSearchProvider::parse_bulk_response(&body, BulkAction::Delete).unwrap();
        assert!(summary.is_success());
    }

    #[test]
    fn test_parse_bulk_response_without_items() {
        let result = OpenSearchProvider::parse_bulk_response(&json!({}), BulkAction::Index);
        assert!(matches!(result, Err(SearchIndexError::ParseError(_))));
    }

    #[test]
    fn test_public_settings_exclude_credentials() {
        let provider = OpenSearchProvider::from_settings(&settings(&[
            ("url", "http://localhost:9200"),
            ("username", "admin"),
            ("password", "secret"),
        ]))
        .unwrap();

        let public = provider.public_settings();
        assert_eq!(public.get("url").map(String::as_str), Some("http://localhost:9200"));
        assert_eq!(public.get("index_prefix").map(String::as_str), Some(""));
        assert!(!public.contains_key("username"));
        assert!(!public.contains_key("password"));
        assert_eq!(
            provider.option_name(),
            "merchant_buddy_opensearch_provider_settings"
        );
    }

    #[tokio::test]
    async fn test_unreachable_cluster_returns_false() {
        let provider =
            OpenSearchProvider::from_settings(&settings(&[("url", "http://127.0.0.1:9")])).unwrap();
        let record = IndexableRecord::new(5u64).with("name", "Mug");
        let id = RecordId::from(5);

        assert!(!provider.update_item(&record, &id, "products").await.unwrap());
        assert!(!provider.delete_item(&id, "products").await.unwrap());
        assert!(!provider
            .batch_update_items(&[record], "products")
            .await
            .unwrap());
    }

    /// Answer one HTTP request with `response` and return the request body.
    async fn serve_one_request(listener: tokio::net::TcpListener, response: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let (head_end, content_length) = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .map(|value| value.trim().parse::<usize>().unwrap())
                    .unwrap_or(0);
                break (pos + 4, length);
            }
        };

        while buf.len() < head_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let reply = format!(
            "HTTP/1.1 201 Created\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            response.len(),
            response
        );
        socket.write_all(reply.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;

        String::from_utf8_lossy(&buf[head_end..]).to_string()
    }

    #[tokio::test]
    async fn test_single_write_sends_object_id() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(serve_one_request(
            listener,
            r#"{"_id":"5","result":"created"}"#,
        ));

        let provider = OpenSearchProvider::from_settings(&settings(&[("url", url.as_str())])).unwrap();
        let record = IndexableRecord::new(5u64).with("name", "Mug");
        assert!(provider
            .create_item(&record, &RecordId::from(5), "products")
            .await
            .unwrap());

        let body: Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(body, json!({ "id": 5, "name": "Mug", "object_id": 5 }));
    }

    #[tokio::test]
    async fn test_unconfigured_provider_returns_false() {
        let provider = OpenSearchProvider::from_settings(&ProviderSettings::new()).unwrap();
        let record = IndexableRecord::new(5u64);

        assert!(!provider
            .create_item(&record, &RecordId::from(5), "orders")
            .await
            .unwrap());
    }
}
