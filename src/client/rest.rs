use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Url;
use serde::de::DeserializeOwned;

use super::{CatalogSource, FetchError};
use crate::model::{Category, Training};

const REST_PREFIX: &str = "rest/v1";

#[derive(Clone, Debug)]
pub struct RestOptions {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: usize,
    pub proxy: Option<String>,
}

impl Default for RestOptions {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            timeout_seconds: 10,
            proxy: None,
        }
    }
}

/// Client for the hosted PostgREST-style data API.
#[derive(Clone, Debug)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
}

impl RestClient {
    pub fn new(options: RestOptions) -> Result<Self, FetchError> {
        let base_url = options.base_url.trim().trim_end_matches('/').to_string();
        if Url::parse(&base_url).is_err() {
            return Err(FetchError::InvalidBaseUrl {
                url: options.base_url,
            });
        }

        let client = build_client(
            options.api_key.as_deref(),
            options.proxy.as_deref(),
            options.timeout_seconds,
        )?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str, params: &[(&str, String)]) -> Result<Url, FetchError> {
        let raw = format!("{}/{REST_PREFIX}/{table}", self.base_url);
        Url::parse_with_params(&raw, params).map_err(|_| FetchError::InvalidBaseUrl { url: raw })
    }

    async fn get_rows<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, FetchError> {
        let shown = url.to_string();
        tracing::debug!(url = %shown, "GET");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: shown.clone(),
                source: e,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(url = %shown, status = status.as_u16(), "request rejected");
            return Err(FetchError::Status {
                url: shown,
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        resp.json::<Vec<T>>()
            .await
            .map_err(|e| FetchError::Decode {
                url: shown,
                source: e,
            })
    }
}

impl CatalogSource for RestClient {
    async fn fetch_category(&self, id: &str) -> Result<Category, FetchError> {
        let url = self.table_url(
            "categories",
            &[("select", "*".to_string()), ("id", format!("eq.{id}"))],
        )?;
        let rows: Vec<Category> = self.get_rows(url).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| FetchError::NotFound { id: id.to_string() })
    }

    async fn fetch_trainings(&self, category_id: &str) -> Result<Vec<Training>, FetchError> {
        let url = self.table_url(
            "trainings",
            &[
                ("select", "*".to_string()),
                ("category_id", format!("eq.{category_id}")),
                ("order", "month_index.asc".to_string()),
            ],
        )?;
        self.get_rows(url).await
    }
}

fn build_client(
    api_key: Option<&str>,
    proxy: Option<&str>,
    timeout_seconds: usize,
) -> Result<reqwest::Client, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("edutrain/", env!("CARGO_PKG_VERSION"))),
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
        // Keys that are not valid header values are skipped; the backend then
        // answers with a status error that names the problem.
        if let Ok(value) = HeaderValue::from_str(key) {
            headers.insert("apikey", value);
        }
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {key}")) {
            headers.insert(AUTHORIZATION, value);
        }
    }

    let timeout = Duration::from_secs(timeout_seconds.try_into().unwrap_or(10));
    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout);

    if let Some(proxy) = proxy.filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| FetchError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| FetchError::HttpClientBuild { source: e })
}
