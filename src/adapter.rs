//! Boundary between catalog sources and the SKU accessor.
//!
//! A source hands back raw [`ResourceSku`] records, either one page at a time
//! ([`ResourceProviderClient`]), as a lazily drained stream
//! ([`ResourceClient`]), or as a complete list ([`CatalogClient`]). Each layer
//! is blanket-implemented on top of the previous one, so a source only has to
//! provide paging. [`wrap`] turns the raw records into [`Sku`] values without
//! inspecting them; malformed entries surface later, when queried.

use crate::sku::{ResourceSku, Sku};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One page of a SKU listing, shaped like the provider's list response.
pub struct ResourceSkuPage {
    #[serde(default)]
    pub value: Vec<ResourceSku>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

/// Paged access to a SKU catalog.
///
/// `filter` is passed through verbatim (e.g. `location eq 'eastus'`);
/// `include_extended_locations` asks the source to keep extended-location
/// data in the records.
pub trait ResourceProviderClient: Send + Sync {
    fn list(&self, filter: &str, include_extended_locations: bool) -> Result<ResourceSkuPage>;

    /// Fetch the page a previous response pointed at.
    fn list_next(&self, next_link: &str) -> Result<ResourceSkuPage>;
}

/// Streaming access to a SKU catalog.
pub trait ResourceClient: Send + Sync {
    fn list_complete(&self, filter: &str, include_extended_locations: bool)
    -> Result<SkuIterator<'_>>;
}

/// Fully drained access to a SKU catalog.
pub trait CatalogClient {
    fn list_all(&self, filter: &str, include_extended_locations: bool) -> Result<Vec<ResourceSku>>;
}

impl<T: ResourceProviderClient> ResourceClient for T {
    fn list_complete(
        &self,
        filter: &str,
        include_extended_locations: bool,
    ) -> Result<SkuIterator<'_>> {
        let first = self
            .list(filter, include_extended_locations)
            .with_context(|| format!("listing resource skus (filter '{filter}')"))?;
        Ok(SkuIterator::new(self, first))
    }
}

impl<T: ResourceClient + ?Sized> CatalogClient for T {
    fn list_all(&self, filter: &str, include_extended_locations: bool) -> Result<Vec<ResourceSku>> {
        self.list_complete(filter, include_extended_locations)?
            .collect()
    }
}

/// Yields records page by page, requesting the next page only when the
/// current one is exhausted. Stops after the first failed page request.
pub struct SkuIterator<'a> {
    client: &'a dyn ResourceProviderClient,
    current: std::vec::IntoIter<ResourceSku>,
    next_link: Option<String>,
    pages: usize,
}

impl<'a> SkuIterator<'a> {
    pub fn new(client: &'a dyn ResourceProviderClient, first: ResourceSkuPage) -> Self {
        Self {
            client,
            current: first.value.into_iter(),
            next_link: continuation(first.next_link),
            pages: 1,
        }
    }

    /// Pages fetched so far, the first one included.
    pub fn pages(&self) -> usize {
        self.pages
    }
}

impl Iterator for SkuIterator<'_> {
    type Item = Result<ResourceSku>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.current.next() {
                return Some(Ok(record));
            }
            let link = self.next_link.take()?;
            match self.client.list_next(&link) {
                Ok(page) => {
                    self.pages += 1;
                    debug!(
                        page = self.pages,
                        records = page.value.len(),
                        "fetched resource sku page"
                    );
                    self.current = page.value.into_iter();
                    self.next_link = continuation(page.next_link);
                }
                Err(err) => {
                    return Some(Err(
                        err.context(format!("fetching resource sku page {}", self.pages + 1))
                    ));
                }
            }
        }
    }
}

// Providers signal the last page with a missing or empty link.
fn continuation(link: Option<String>) -> Option<String> {
    link.filter(|link| !link.trim().is_empty())
}

/// Wrap raw records into [`Sku`] values, one-to-one and in order.
pub fn wrap(records: Vec<ResourceSku>) -> Vec<Sku> {
    debug!(count = records.len(), "wrapping resource skus");
    records.into_iter().map(Sku::from).collect()
}

/// List every record matching `filter` and wrap the result.
pub fn fetch_skus<C: CatalogClient + ?Sized>(
    client: &C,
    filter: &str,
    include_extended_locations: bool,
) -> Result<Vec<Sku>> {
    let records = client.list_all(filter, include_extended_locations)?;
    Ok(wrap(records))
}
