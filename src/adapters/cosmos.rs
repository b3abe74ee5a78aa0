use crate::config::env::{CosmosConfig, ProcessEnv, VarSource, COSMOS_ENDPOINT, COSMOS_KEY};
use crate::core::{ExtractionOutput, InvoicePersister, PersistedEnvelope};
use crate::utils::error::{InvoiceError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use url::Url;

const COSMOS_API_VERSION: &str = "2018-12-31";

type HmacSha256 = Hmac<Sha256>;

/// Master-key authorization token for one request.
///
/// Signs `"{verb}\n{resource type}\n{resource link}\n{date}\n\n"` with the
/// decoded account key and returns the URL-encoded header value.
pub fn master_key_signature(
    key: &[u8],
    verb: &Method,
    resource_type: &str,
    resource_link: &str,
    date: &str,
) -> Result<String> {
    let payload = format!(
        "{}\n{}\n{}\n{}\n\n",
        verb.as_str().to_lowercase(),
        resource_type.to_lowercase(),
        resource_link,
        date.to_lowercase()
    );

    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| InvoiceError::persistence(format!("cannot sign request: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    let token = format!("type=master&ver=1.0&sig={}", signature);
    Ok(url::form_urlencoded::byte_serialize(token.as_bytes()).collect())
}

/// Minimal Cosmos DB (SQL API) REST client.
pub struct CosmosClient {
    endpoint: Url,
    key: Vec<u8>,
    client: Client,
}

impl CosmosClient {
    pub fn new(endpoint: impl Into<String>, master_key: &str) -> Result<Self> {
        let key = STANDARD
            .decode(master_key.trim())
            .map_err(|e| InvoiceError::InvalidConfigValueError {
                field: COSMOS_KEY.to_string(),
                value: "***".to_string(),
                reason: format!("account key is not valid base64: {}", e),
            })?;

        let endpoint = endpoint.into();
        let endpoint = Url::parse(&endpoint)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| InvoiceError::InvalidConfigValueError {
                field: COSMOS_ENDPOINT.to_string(),
                value: endpoint.clone(),
                reason: "not an absolute URL".to_string(),
            })?;

        Ok(Self {
            endpoint,
            key,
            client: Client::new(),
        })
    }

    pub fn from_config(config: &CosmosConfig) -> Result<Self> {
        Self::new(config.endpoint.clone(), &config.key)
    }

    pub fn container(&self, database: &str, container: &str) -> ContainerClient<'_> {
        ContainerClient {
            cosmos: self,
            database: database.to_string(),
            container: container.to_string(),
            link: format!("dbs/{}/colls/{}", database, container),
        }
    }

    /// Request URL for the given path segments, each percent-encoded.
    /// The signed resource link keeps the raw names.
    fn resource_url(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
        resource_type: &str,
        resource_link: &str,
    ) -> Result<RequestBuilder> {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let authorization =
            master_key_signature(&self.key, &method, resource_type, resource_link, &date)?;

        Ok(self
            .client
            .request(method, self.resource_url(segments))
            .header("authorization", authorization)
            .header("x-ms-date", date)
            .header("x-ms-version", COSMOS_API_VERSION))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContainerProperties {
    #[serde(default)]
    partition_key: Option<PartitionKeyDefinition>,
}

#[derive(Debug, Deserialize)]
struct PartitionKeyDefinition {
    #[serde(default)]
    paths: Vec<String>,
}

/// Handle on `dbs/{database}/colls/{container}`.
pub struct ContainerClient<'a> {
    cosmos: &'a CosmosClient,
    database: String,
    container: String,
    link: String,
}

impl ContainerClient<'_> {
    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn url(&self) -> Url {
        self.cosmos.resource_url(&self.segments())
    }

    fn segments(&self) -> [&str; 4] {
        ["dbs", self.database.as_str(), "colls", self.container.as_str()]
    }

    /// Partition key paths of the container, e.g. `["/invoiceId"]`.
    /// Hierarchical keys list one path per level.
    pub async fn partition_key_paths(&self) -> Result<Option<Vec<String>>> {
        let response = self
            .cosmos
            .request(Method::GET, &self.segments(), "colls", &self.link)?
            .send()
            .await
            .map_err(|e| InvoiceError::persistence(e.to_string()))?;

        let response = ensure_success(response).await?;
        let properties: ContainerProperties = response
            .json()
            .await
            .map_err(|e| InvoiceError::persistence(e.to_string()))?;

        Ok(properties.partition_key.map(|pk| pk.paths))
    }

    pub async fn create_item(&self, item: &Value) -> Result<Value> {
        let paths = self.partition_key_paths().await?.unwrap_or_default();
        let partition_key = partition_key_header(item, &paths);
        tracing::debug!("Creating item in {} (partition key {})", self.link, partition_key);

        let response = self
            .cosmos
            .request(
                Method::POST,
                &["dbs", self.database.as_str(), "colls", self.container.as_str(), "docs"],
                "docs",
                &self.link,
            )?
            .header("x-ms-documentdb-partitionkey", partition_key)
            .json(item)
            .send()
            .await
            .map_err(|e| InvoiceError::persistence(e.to_string()))?;

        let response = ensure_success(response).await?;
        response
            .json()
            .await
            .map_err(|e| InvoiceError::persistence(e.to_string()))
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(InvoiceError::persistence(format!("{} {}", status, body)))
}

/// JSON array with the item's value at each key path, `{}` where undefined.
fn partition_key_header(item: &Value, paths: &[String]) -> String {
    let values = paths
        .iter()
        .map(|path| {
            path.split('/')
                .filter(|segment| !segment.is_empty())
                .try_fold(item, |current, segment| current.get(segment))
                .cloned()
                .unwrap_or_else(|| Value::Object(Default::default()))
        })
        .collect();

    Value::Array(values).to_string()
}

/// Persists extractions to the container named by the `COSMOS_*` variables,
/// read from `source` on every call.
pub struct CosmosPersister<V: VarSource = ProcessEnv> {
    source: V,
}

impl CosmosPersister<ProcessEnv> {
    pub fn from_env() -> Self {
        Self::with_source(ProcessEnv)
    }
}

impl<V: VarSource> CosmosPersister<V> {
    pub fn with_source(source: V) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<V: VarSource> InvoicePersister for CosmosPersister<V> {
    async fn persist(&self, output: &ExtractionOutput, source_file: &str) -> Result<String> {
        let config = CosmosConfig::from_source(&self.source)?;
        let cosmos = CosmosClient::from_config(&config)?;
        let container = cosmos.container(&config.database, &config.container);

        let envelope = PersistedEnvelope::new(output.clone(), source_file);
        let item = serde_json::to_value(&envelope)?;

        tracing::info!(
            "Saving invoice {} to {}/{}",
            envelope.invoice_id,
            config.database,
            config.container
        );
        container.create_item(&item).await?;

        Ok(envelope.id)
    }
}
