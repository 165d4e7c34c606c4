use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::matcher::QueryLookup;
use crate::model::{InventoryPage, StrategyTopic};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Yaml,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => bail!(
                "unsupported input format for {} (expected .json, .yaml or .yml)",
                path.display()
            ),
        }
    }
}

/// One search-console export row: a single query observed for a page.
#[derive(Debug, Deserialize)]
struct QueryRow {
    #[serde(alias = "page")]
    url: String,
    query: String,
}

/// Inventory records, either a bare array or an object with a `pages` array.
pub fn load_inventory(path: &Path) -> Result<Vec<InventoryPage>> {
    let pages: Vec<InventoryPage> = load_records(path, "pages")?;
    debug!(path = %path.display(), pages = pages.len(), "loaded inventory");
    Ok(pages)
}

/// Topic records, either a bare array or an object with a `topics` array.
pub fn load_topics(path: &Path) -> Result<Vec<StrategyTopic>> {
    let topics: Vec<StrategyTopic> = load_records(path, "topics")?;
    debug!(path = %path.display(), topics = topics.len(), "loaded topics");
    Ok(topics)
}

/// Query data as either a `{ url: [queries] }` object (optionally nested under
/// `queries`) or an array of `{ url | page, query }` rows.
pub fn load_query_lookup(path: &Path) -> Result<QueryLookup> {
    let mut value = read_value(path)?;
    if let Value::Object(map) = &mut value
        && map.len() == 1
        && let Some(inner) = map.remove("queries")
    {
        value = inner;
    }

    let lookup = match value {
        Value::Array(_) => {
            let rows: Vec<QueryRow> = serde_json::from_value(value)
                .with_context(|| format!("failed to decode query rows in {}", path.display()))?;
            let mut lookup = QueryLookup::new();
            for row in rows {
                lookup.entry(row.url).or_default().push(row.query);
            }
            lookup
        }
        Value::Object(_) => serde_json::from_value(value)
            .with_context(|| format!("failed to decode query lookup in {}", path.display()))?,
        _ => bail!(
            "{} must contain an object or an array of query rows",
            path.display()
        ),
    };
    debug!(path = %path.display(), urls = lookup.len(), "loaded query lookup");
    Ok(lookup)
}

fn load_records<T: DeserializeOwned>(path: &Path, key: &str) -> Result<Vec<T>> {
    let value = read_value(path)?;
    let records = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => map
            .remove(key)
            .with_context(|| format!("{} has no `{key}` array", path.display()))?,
        _ => bail!(
            "{} must contain an array or an object with a `{key}` array",
            path.display()
        ),
    };
    serde_json::from_value(records)
        .with_context(|| format!("failed to decode {key} in {}", path.display()))
}

fn read_value(path: &Path) -> Result<Value> {
    let format = InputFormat::from_path(path)?;
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    match format {
        InputFormat::Json => serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display())),
        InputFormat::Yaml => serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display())),
    }
}
