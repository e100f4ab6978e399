//! Filter a captured SKU listing with the accessor predicates.
//!
//! Reads a catalog dump (JSON array, listing page, or NDJSON) from `--input`,
//! the `SKULENS_CATALOG` environment variable, or stdin, keeps the SKUs that
//! satisfy every requested predicate, and prints one JSON object per match.
//! Logging goes to stderr and is controlled with `RUST_LOG`.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value, json};
use skulens::{Sku, StaticCatalog, fetch_skus, parse_sku_stream};
use std::env;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const CATALOG_ENV: &str = "SKULENS_CATALOG";

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<()> {
    let args = CliArgs::parse()?;
    let catalog = args.source.load()?;
    let filter = args
        .location
        .as_ref()
        .map(|location| format!("location eq '{location}'"))
        .unwrap_or_default();
    let skus = fetch_skus(&catalog, &filter, true)?;
    debug!(candidates = skus.len(), "applying predicates");

    let mut matched = 0usize;
    for sku in &skus {
        if !args.accepts(sku) {
            continue;
        }
        matched += 1;
        println!("{}", serde_json::to_string(&args.render(sku))?);
    }
    debug!(matched, "done");
    Ok(())
}

struct CliArgs {
    source: InputSource,
    location: Option<String>,
    resource_type: Option<String>,
    capabilities: Vec<String>,
    zonal_capabilities: Vec<String>,
    minimums: Vec<(String, i64)>,
    contains: Vec<(String, String)>,
    zones: bool,
}

enum InputSource {
    File(PathBuf),
    Stdin,
}

impl InputSource {
    fn load(&self) -> Result<StaticCatalog> {
        match self {
            InputSource::File(path) => StaticCatalog::from_path(path),
            InputSource::Stdin => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read stdin")?;
                let records = parse_sku_stream(&buf).context("parsing SKU listing from stdin")?;
                Ok(StaticCatalog::from_records(records))
            }
        }
    }
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut input: Option<PathBuf> = None;
        let mut config = CliArgs {
            source: InputSource::Stdin,
            location: None,
            resource_type: None,
            capabilities: Vec::new(),
            zonal_capabilities: Vec::new(),
            minimums: Vec::new(),
            contains: Vec::new(),
            zones: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--input" => input = Some(PathBuf::from(next_value(&mut args, "--input")?)),
                "--location" => config.location = Some(next_value(&mut args, "--location")?),
                "--resource-type" => {
                    config.resource_type = Some(next_value(&mut args, "--resource-type")?)
                }
                "--capability" => config
                    .capabilities
                    .push(next_value(&mut args, "--capability")?),
                "--zonal-capability" => config
                    .zonal_capabilities
                    .push(next_value(&mut args, "--zonal-capability")?),
                "--min" => {
                    let raw = next_value(&mut args, "--min")?;
                    let (name, threshold) = split_pair(&raw, "--min")?;
                    let threshold = threshold
                        .parse::<i64>()
                        .with_context(|| format!("--min threshold '{threshold}' is not an integer"))?;
                    config.minimums.push((name, threshold));
                }
                "--contains" => {
                    let raw = next_value(&mut args, "--contains")?;
                    let (name, substring) = split_pair(&raw, "--contains")?;
                    config.contains.push((name, substring));
                }
                "--zones" => config.zones = true,
                "--help" | "-h" => usage(0),
                other => bail!("unknown argument: {other}"),
            }
        }

        if config.zones && config.location.is_none() {
            bail!("--zones requires --location");
        }

        config.source = match input.or_else(|| env::var_os(CATALOG_ENV).map(PathBuf::from)) {
            Some(path) => InputSource::File(path),
            None => InputSource::Stdin,
        };
        Ok(config)
    }

    fn accepts(&self, sku: &Sku) -> bool {
        if let Some(resource_type) = &self.resource_type {
            if !sku.is_resource_type(resource_type) {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !sku.is_available(location) {
                return false;
            }
        }
        if !self.capabilities.iter().all(|name| sku.has_capability(name)) {
            return false;
        }
        if !self
            .zonal_capabilities
            .iter()
            .all(|name| sku.has_zonal_capability(name))
        {
            return false;
        }
        if !self
            .contains
            .iter()
            .all(|(name, substring)| sku.has_capability_with_separator(name, substring))
        {
            return false;
        }
        for (name, threshold) in &self.minimums {
            match sku.has_capability_with_capacity(name, *threshold) {
                Ok(true) => {}
                Ok(false) => return false,
                Err(err) => {
                    warn!(sku = sku.name(), error = %err, "skipping sku with malformed capability");
                    return false;
                }
            }
        }
        true
    }

    fn render(&self, sku: &Sku) -> Value {
        let mut out = Map::new();
        out.insert("name".to_string(), json!(sku.name()));
        out.insert("resourceType".to_string(), json!(sku.resource_type()));
        out.insert(
            "location".to_string(),
            sku.location().map_or(Value::Null, |location| json!(location)),
        );
        if self.zones {
            if let Some(location) = &self.location {
                let zones = sku
                    .availability_zones(location)
                    .map(|zones| zones.into_iter().collect::<Vec<_>>())
                    .unwrap_or_default();
                out.insert("zones".to_string(), json!(zones));
            }
        }
        Value::Object(out)
    }
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .with_context(|| format!("{flag} requires a value"))
}

fn split_pair(raw: &str, flag: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => bail!("{flag} expects NAME=VALUE, got '{raw}'"),
    }
}

fn usage(code: i32) -> ! {
    eprintln!(
        "Usage: sku-filter [--input PATH] [--location LOC] [--resource-type TYPE]\n                  [--capability NAME]... [--zonal-capability NAME]...\n                  [--min NAME=N]... [--contains NAME=SUBSTR]... [--zones]\n\nInput defaults to ${CATALOG_ENV}, then stdin. Prints one JSON object per matching SKU.\n\nExamples:\n  sku-filter --input skus.json --location eastus --resource-type virtualMachines --min vCPUs=4\n  sku-filter --location westus2 --capability EncryptionAtHostSupported --zones < skus.json"
    );
    std::process::exit(code);
}
