//! Query layer over a cloud resource SKU catalog.
//!
//! The crate wraps raw catalog records ([`ResourceSku`]) as [`Sku`] values and
//! answers the questions callers filter catalogs by: capability support and
//! quantities, availability and restrictions per location, and unrestricted
//! availability zones. Fetching is left to a catalog source implementing the
//! traits in [`adapter`]; [`StaticCatalog`] serves a captured listing for
//! offline use and tests.

use anyhow::{Context, Result, bail};
use serde_json::Value;

pub mod adapter;
pub mod repository;
pub mod sku;

pub use adapter::{
    CatalogClient, ResourceClient, ResourceProviderClient, ResourceSkuPage, SkuIterator,
    fetch_skus, wrap,
};
pub use repository::{SkuFilter, StaticCatalog};
pub use sku::{
    NumberParseError, ResourceSku, ResourceSkuCapability, ResourceSkuLocationInfo,
    ResourceSkuRestriction, ResourceSkuRestrictionInfo, ResourceSkuZoneDetails, RestrictionType,
    Sku, SkuError, SkuResult, names_match, normalize,
};

/// Parse a SKU listing, accepting a JSON array, a single record, a
/// `{"value": [...]}` page, or NDJSON.
///
/// Empty input is an error. NDJSON is parsed line by line so the failing line
/// is reported.
pub fn parse_sku_stream(input: &str) -> Result<Vec<ResourceSku>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        bail!("empty SKU listing");
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return match value {
            Value::Array(items) => items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<_>, _>>()
                .context("SKU listing array holds an invalid record"),
            Value::Object(ref map) if map.get("value").is_some_and(Value::is_array) => {
                serde_json::from_value::<ResourceSkuPage>(value)
                    .map(|page| page.value)
                    .context("malformed SKU listing page")
            }
            Value::Object(_) => serde_json::from_value(value)
                .map(|record| vec![record])
                .context("malformed SKU record"),
            _ => bail!("SKU listing must be a JSON object or array"),
        };
    }

    let mut records = Vec::new();
    for (idx, line) in trimmed.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: ResourceSku = serde_json::from_str(line)
            .with_context(|| format!("malformed SKU record on line {}", idx + 1))?;
        records.push(record);
    }

    if records.is_empty() {
        bail!("SKU listing contains no records");
    }

    Ok(records)
}
