//! In-memory catalog source backed by a captured SKU listing.
//!
//! `StaticCatalog` serves a fixed list of raw records through the paging
//! contract in [`adapter`](crate::adapter), so the query layer can run against
//! a dump on disk exactly as it would against a live source. It understands
//! the one filter the provider supports for SKU listings,
//! `location eq '<location>'`, and hands out opaque continuation links.

use crate::adapter::{ResourceProviderClient, ResourceSkuPage};
use crate::parse_sku_stream;
use crate::sku::{ResourceSku, names_match};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

const DEFAULT_PAGE_SIZE: usize = 100;

// Location info entries of this type describe edge sites rather than regions.
const EXTENDED_LOCATION_TYPE: &str = "EdgeZone";

#[derive(Clone, Debug)]
/// Fixed set of raw SKU records served page by page.
pub struct StaticCatalog {
    records: Vec<ResourceSku>,
    page_size: usize,
}

/// Parsed form of a listing filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkuFilter {
    All,
    Location(String),
}

// State carried between pages inside the continuation link.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Cursor {
    filter: String,
    include_extended_locations: bool,
    offset: usize,
}

impl StaticCatalog {
    pub fn from_records(records: Vec<ResourceSku>) -> Self {
        Self {
            records,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Load a dump from disk: a JSON array, a `{"value": [...]}` page, or NDJSON.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading sku catalog {}", path.display()))?;
        let records = parse_sku_stream(&data)
            .with_context(|| format!("parsing sku catalog {}", path.display()))?;
        debug!(path = %path.display(), records = records.len(), "loaded sku catalog");
        Ok(Self::from_records(records))
    }

    /// Number of records per page; values below one are raised to one.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn records(&self) -> &[ResourceSku] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn page(&self, cursor: &Cursor) -> Result<ResourceSkuPage> {
        let filter = SkuFilter::parse(&cursor.filter)?;
        let matching: Vec<&ResourceSku> = self
            .records
            .iter()
            .filter(|record| filter.matches(record))
            .collect();
        if cursor.offset > matching.len() {
            bail!(
                "continuation offset {} is past the {} matching records",
                cursor.offset,
                matching.len()
            );
        }

        let value = matching
            .iter()
            .skip(cursor.offset)
            .take(self.page_size)
            .map(|record| prepare(record, cursor.include_extended_locations))
            .collect();

        let next_link = match cursor.offset.checked_add(self.page_size) {
            Some(next_offset) if next_offset < matching.len() => {
                let next = Cursor {
                    filter: cursor.filter.clone(),
                    include_extended_locations: cursor.include_extended_locations,
                    offset: next_offset,
                };
                Some(serde_json::to_string(&next)?)
            }
            _ => None,
        };

        Ok(ResourceSkuPage { value, next_link })
    }
}

impl ResourceProviderClient for StaticCatalog {
    fn list(&self, filter: &str, include_extended_locations: bool) -> Result<ResourceSkuPage> {
        self.page(&Cursor {
            filter: filter.to_string(),
            include_extended_locations,
            offset: 0,
        })
    }

    fn list_next(&self, next_link: &str) -> Result<ResourceSkuPage> {
        let cursor: Cursor = serde_json::from_str(next_link)
            .with_context(|| format!("invalid continuation link '{next_link}'"))?;
        self.page(&cursor)
    }
}

impl SkuFilter {
    /// Parse an empty filter or `location eq '<location>'`.
    pub fn parse(filter: &str) -> Result<Self> {
        let trimmed = filter.trim();
        if trimmed.is_empty() {
            return Ok(SkuFilter::All);
        }

        let mut parts = trimmed.splitn(3, char::is_whitespace);
        let (Some(field), Some(op), Some(value)) = (parts.next(), parts.next(), parts.next())
        else {
            bail!("unsupported filter '{filter}'; expected location eq '<location>'");
        };
        if !field.eq_ignore_ascii_case("location") || !op.eq_ignore_ascii_case("eq") {
            bail!("unsupported filter '{filter}'; expected location eq '<location>'");
        }

        let value = value.trim();
        let Some(location) = value
            .strip_prefix('\'')
            .and_then(|rest| rest.strip_suffix('\''))
        else {
            bail!("filter value {value} must be single-quoted");
        };
        if location.trim().is_empty() {
            bail!("filter location must not be empty");
        }
        Ok(SkuFilter::Location(location.to_string()))
    }

    pub fn matches(&self, record: &ResourceSku) -> bool {
        match self {
            SkuFilter::All => true,
            SkuFilter::Location(location) => record
                .locations
                .iter()
                .flatten()
                .any(|candidate| names_match(candidate, location)),
        }
    }
}

fn prepare(record: &ResourceSku, include_extended_locations: bool) -> ResourceSku {
    let mut record = record.clone();
    if include_extended_locations {
        return record;
    }
    if let Some(infos) = record.location_info.as_mut() {
        infos.retain(|info| info.location_type.as_deref() != Some(EXTENDED_LOCATION_TYPE));
        for info in infos.iter_mut() {
            info.extended_locations = None;
        }
    }
    record
}
