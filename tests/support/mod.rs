use anyhow::{Context, Result, bail};
use serde_json::Value;
use skulens::{ResourceSku, Sku, parse_sku_stream, wrap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::NamedTempFile;

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/skus.json")
}

pub fn fixture_records() -> Vec<ResourceSku> {
    let data = fs::read_to_string(fixture_path()).expect("fixture catalog readable");
    parse_sku_stream(&data).expect("fixture catalog parses")
}

pub fn fixture_skus() -> Vec<Sku> {
    wrap(fixture_records())
}

/// Find a fixture SKU by name and location.
pub fn fixture_sku(name: &str, location: &str) -> Sku {
    fixture_skus()
        .into_iter()
        .find(|sku| sku.name() == name && sku.location().ok() == Some(location))
        .unwrap_or_else(|| panic!("fixture {name} in {location} missing"))
}

pub fn sku_filter_binary() -> &'static Path {
    Path::new(env!("CARGO_BIN_EXE_sku-filter"))
}

pub fn write_catalog(contents: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new().context("failed to allocate catalog file")?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Run sku-filter to completion and parse its NDJSON stdout.
///
/// A non-zero exit is an error carrying the captured stderr.
pub fn sku_filter_rows(mut cmd: Command) -> Result<Vec<Value>> {
    let output = cmd.output().context("sku-filter did not start")?;
    if !output.status.success() {
        bail!(
            "sku-filter exited with {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    ndjson(&output)
}

fn ndjson(output: &Output) -> Result<Vec<Value>> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).with_context(|| format!("stdout line {line:?}")))
        .collect()
}
