//! HTTP implementation of [`ProductApi`] on top of `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{NewProduct, Page, Product, ProductId},
    protocol::{PageResponse, PageShape},
};
use tracing::debug;
use url::Url;

use crate::{ClientError, ClientResult, ProductApi};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/products";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Option<Duration>,
    pub page_shape: PageShape,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(10)),
            page_shape: PageShape::Auto,
        }
    }
}

pub struct HttpProductClient {
    http: Client,
    base_url: String,
    page_shape: PageShape,
}

impl HttpProductClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_options(base_url, ClientOptions::default())
    }

    pub fn with_options(base_url: &str, options: ClientOptions) -> ClientResult<Self> {
        let base_url = normalize_base_url(base_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self {
            http,
            base_url,
            page_shape: options.page_shape,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn item_url(&self, id: ProductId) -> String {
        format!("{}/{}", self.base_url, id.0)
    }
}

fn normalize_base_url(raw: &str) -> ClientResult<String> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|err| ClientError::InvalidBaseUrl {
        url: trimmed.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::InvalidBaseUrl {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ClientError::InvalidBaseUrl {
            url: trimmed.to_string(),
            reason: "base url must not carry a query or fragment".to_string(),
        });
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

async fn ensure_success(res: Response, resource: &str) -> ClientResult<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(ClientError::from_status(status, resource, &body))
}

async fn read_json<T: DeserializeOwned>(res: Response, resource: &str) -> ClientResult<T> {
    let res = ensure_success(res, resource).await?;
    Ok(res.json::<T>().await?)
}

#[async_trait]
impl ProductApi for HttpProductClient {
    async fn list_paged(&self, page_index: u32, page_size: u32) -> ClientResult<Page> {
        debug!(page_index, page_size, "GET /paged");
        let res = self
            .http
            .get(format!("{}/paged", self.base_url))
            .query(&[("page", page_index), ("size", page_size)])
            .send()
            .await?;
        let body: PageResponse = read_json(res, "product page").await?;
        Ok(body.into_page(page_index, page_size, self.page_shape)?)
    }

    async fn get_all(&self) -> ClientResult<Vec<Product>> {
        debug!("GET /");
        let res = self.http.get(&self.base_url).send().await?;
        read_json(res, "product list").await
    }

    async fn get_by_id(&self, id: ProductId) -> ClientResult<Product> {
        debug!(%id, "GET /{{id}}");
        let res = self.http.get(self.item_url(id)).send().await?;
        read_json(res, &format!("product {id}")).await
    }

    async fn get_by_price(&self, price: f64) -> ClientResult<Vec<Product>> {
        debug!(price, "GET /price/{{price}}");
        let res = self
            .http
            .get(format!("{}/price/{price}", self.base_url))
            .send()
            .await?;
        read_json(res, &format!("products priced {price}")).await
    }

    async fn create(&self, draft: &NewProduct) -> ClientResult<Product> {
        debug!(name = %draft.name, "POST /");
        let res = self.http.post(&self.base_url).json(draft).send().await?;
        read_json(res, "product").await
    }

    async fn update(&self, id: ProductId, product: &Product) -> ClientResult<Product> {
        debug!(%id, "PUT /{{id}}");
        let res = self.http.put(self.item_url(id)).json(product).send().await?;
        read_json(res, &format!("product {id}")).await
    }

    async fn delete(&self, id: ProductId) -> ClientResult<()> {
        debug!(%id, "DELETE /{{id}}");
        let res = self.http.delete(self.item_url(id)).send().await?;
        ensure_success(res, &format!("product {id}")).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
