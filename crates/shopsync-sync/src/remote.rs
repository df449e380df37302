//! # Remote
//!
//! The remote boundary: one list call per page of a resource collection.
//!
//! ## Request Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  {base_url}/sites/{site_id}/{namespace}/{path}?{query}                  │
//! │                                                                         │
//! │  SitePlugin  ──►  /sites/7/wp/v2/plugins                (unpaged)      │
//! │  Product     ──►  /sites/7/wc/v3/products?page=1&per_page=25&...       │
//! │  Coupon      ──►  /sites/7/wc/v3/coupons?page=1&per_page=25            │
//! │                                                                         │
//! │  2xx + JSON array  ──►  Ok(Vec<R>)   (every record stamped with site)  │
//! │  non-2xx           ──►  RemoteError::Http { status, body }             │
//! │  bad JSON          ──►  RemoteError::Decoding                          │
//! │  I/O, timeout      ──►  RemoteError::Network / Timeout                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The synchronizer is generic over [`ResourceRemote`], so tests substitute a
//! scripted in-memory remote for [`HttpRemote`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use shopsync_core::{Coupon, ListQuery, Product, SiteId, SitePlugin, SiteResource};

use crate::config::ApiSettings;
use crate::error::{RemoteError, SyncResult};
use crate::wire::{CouponDto, PluginDto, ProductDto};

// =============================================================================
// Remote Trait
// =============================================================================

/// Fetches one page (or the whole collection, when unpaged) of a resource.
pub trait ResourceRemote<R: SiteResource>: Send + Sync + 'static {
    /// Lists the records of `site_id` matching `query`.
    ///
    /// Every returned record must carry `site_id`.
    fn list(
        &self,
        site_id: SiteId,
        query: &ListQuery,
    ) -> impl Future<Output = Result<Vec<R>, RemoteError>> + Send;
}

impl<R: SiteResource, T: ResourceRemote<R>> ResourceRemote<R> for Arc<T> {
    fn list(
        &self,
        site_id: SiteId,
        query: &ListQuery,
    ) -> impl Future<Output = Result<Vec<R>, RemoteError>> + Send {
        (**self).list(site_id, query)
    }
}

// =============================================================================
// HTTP Remote
// =============================================================================

const WOOCOMMERCE_NAMESPACE: &str = "wc/v3";
const WORDPRESS_NAMESPACE: &str = "wp/v2";

/// REST client for the store API.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    base_url: Url,
}

impl HttpRemote {
    /// Creates a client rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> SyncResult<Self> {
        let base_url = Url::parse(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(RemoteError::from)?;

        Ok(HttpRemote { client, base_url })
    }

    /// Creates a client from the API settings.
    pub fn from_config(settings: &ApiSettings) -> SyncResult<Self> {
        Self::new(&settings.base_url, settings.timeout(), &settings.user_agent)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the URL of a site-scoped collection.
    pub fn endpoint(&self, site_id: SiteId, namespace: &str, path: &str, query: &ListQuery) -> Url {
        let mut url = self.base_url.clone();
        let site = site_id.to_string();

        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["sites", site.as_str()])
                .extend(namespace.split('/'))
                .push(path);
        }

        let pairs = query.to_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, RemoteError> {
        debug!(url = %url, "GET");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            warn!(url = %url, status = status.as_u16(), "Remote returned an error status");
            return Err(RemoteError::Http {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| RemoteError::Decoding(e.to_string()))
    }
}

impl ResourceRemote<SitePlugin> for HttpRemote {
    async fn list(&self, site_id: SiteId, query: &ListQuery) -> Result<Vec<SitePlugin>, RemoteError> {
        let url = self.endpoint(site_id, WORDPRESS_NAMESPACE, "plugins", query);
        let dtos: Vec<PluginDto> = self.get_json(url).await?;
        Ok(dtos.into_iter().map(|dto| dto.into_record(site_id)).collect())
    }
}

impl ResourceRemote<Product> for HttpRemote {
    async fn list(&self, site_id: SiteId, query: &ListQuery) -> Result<Vec<Product>, RemoteError> {
        let url = self.endpoint(site_id, WOOCOMMERCE_NAMESPACE, "products", query);
        let dtos: Vec<ProductDto> = self.get_json(url).await?;
        Ok(dtos.into_iter().map(|dto| dto.into_record(site_id)).collect())
    }
}

impl ResourceRemote<Coupon> for HttpRemote {
    async fn list(&self, site_id: SiteId, query: &ListQuery) -> Result<Vec<Coupon>, RemoteError> {
        let url = self.endpoint(site_id, WOOCOMMERCE_NAMESPACE, "coupons", query);
        let dtos: Vec<CouponDto> = self.get_json(url).await?;
        Ok(dtos.into_iter().map(|dto| dto.into_record(site_id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopsync_core::{Page, ProductFilter, ProductSortOrder, StockStatus};

    fn remote(base: &str) -> HttpRemote {
        HttpRemote::new(base, Duration::from_secs(5), "shopsync-test").unwrap()
    }

    #[test]
    fn test_unpaged_endpoint() {
        let url = remote("https://public-api.wordpress.com").endpoint(
            SiteId::new(7),
            WORDPRESS_NAMESPACE,
            "plugins",
            &ListQuery::unpaged(),
        );
        assert_eq!(url.as_str(), "https://public-api.wordpress.com/sites/7/wp/v2/plugins");
    }

    #[test]
    fn test_paged_endpoint_keeps_base_path() {
        let filter = ProductFilter {
            stock_status: Some(StockStatus::OutOfStock),
            ..ProductFilter::default()
        };
        let query = ListQuery::paged(Page::first(25))
            .with_params(ProductSortOrder::DateDescending.params())
            .with_params(filter.params());

        let url = remote("http://localhost:8080/wp-json/").endpoint(
            SiteId::new(12),
            WOOCOMMERCE_NAMESPACE,
            "products",
            &query,
        );
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/wp-json/sites/12/wc/v3/products\
             ?page=1&per_page=25&orderby=date&order=desc&stock_status=outofstock"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpRemote::new("not a url", Duration::from_secs(1), "x").unwrap_err();
        assert!(err.is_config_error());
    }
}
