//! Canonical product URL generation.

use tracing::debug;

use crate::catalog::UrlRewriteGenerator;
use crate::types::{Product, RewriteMap, UrlRewrite};
use crate::{Error, Result};

/// Target path every product request path resolves to.
#[must_use]
pub fn product_target_path(product: &Product) -> String {
    format!("catalog/product/view/id/{}", product.id)
}

/// Generates one canonical rewrite per product: `<url_key><suffix>` pointing at
/// the product view route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalUrlGenerator {
    url_suffix: String,
}

impl CanonicalUrlGenerator {
    /// Create a generator appending `url_suffix` (e.g. `.html`, or empty).
    #[must_use]
    pub fn new(url_suffix: impl Into<String>) -> Self {
        Self {
            url_suffix: url_suffix.into(),
        }
    }
}

impl Default for CanonicalUrlGenerator {
    fn default() -> Self {
        Self::new(".html")
    }
}

impl UrlRewriteGenerator for CanonicalUrlGenerator {
    fn generate(&self, product: &Product) -> Result<RewriteMap> {
        let mut rewrites = RewriteMap::new();

        let Some(url_key) = product.url_key.as_deref().map(str::trim) else {
            debug!(product_id = product.id, "No url key, nothing to generate");
            return Ok(rewrites);
        };
        if url_key.is_empty() {
            debug!(product_id = product.id, "Empty url key, nothing to generate");
            return Ok(rewrites);
        }
        if url_key.contains(char::is_whitespace) || url_key.starts_with('/') {
            return Err(Error::Generation {
                product_id: product.id,
                reason: format!("invalid url key '{url_key}'"),
            });
        }

        let request_path = format!("{url_key}{}", self.url_suffix);
        rewrites.insert(
            request_path.clone(),
            UrlRewrite::product(
                product.id,
                product.store_id,
                &request_path,
                &product_target_path(product),
            ),
        );
        Ok(rewrites)
    }
}
