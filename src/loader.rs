//! Dataset loading from a local CSV file or a static `http(s)` resource.
//!
//! The header row must name the grouping and label columns (`State` and
//! `District` by default). Every other column becomes a value column; cells
//! are trimmed and parsed as `f64`, and anything that does not parse is kept
//! as a missing value so the render policy can decide what to do with it.

use crate::error::{Error, Result};
use crate::models::{Dataset, Record, RecordId};
use csv::{ReaderBuilder, Trim};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Where the dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl FromStr for DataSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let t = s.trim();
        let lower = t.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(DataSource::Url(t.to_string()))
        } else {
            Ok(DataSource::File(PathBuf::from(t)))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(p) => write!(f, "{}", p.display()),
            DataSource::Url(u) => f.write_str(u),
        }
    }
}

/// Names of the two non-numeric columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub group_column: String,
    pub label_column: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            group_column: "State".into(),
            label_column: "District".into(),
        }
    }
}

/// Load a dataset from any source.
pub fn load(source: &DataSource, opts: &LoadOptions) -> Result<Dataset> {
    let data = match source {
        DataSource::File(path) => {
            let file = std::fs::File::open(path)?;
            load_from_reader(file, opts)?
        }
        DataSource::Url(url) => {
            let body = fetch_text(url)?;
            load_from_reader(body.as_bytes(), opts)?
        }
    };
    log::info!(
        "loaded {} records with {} value columns from {}",
        data.len(),
        data.columns.len(),
        source
    );
    Ok(data)
}

fn fetch_text(url: &str) -> Result<String> {
    let http = HttpClient::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(5))
        .user_agent(concat!("census-scatter/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let resp = http.get(url).send()?.error_for_status()?;
    Ok(resp.text()?)
}

/// Parse CSV text. The record id is the zero-based data row position.
pub fn load_from_reader<R: Read>(reader: R, opts: &LoadOptions) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let find = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::MissingColumn {
                column: name.to_string(),
            })
    };
    let group_idx = find(&opts.group_column)?;
    let label_idx = find(&opts.label_column)?;

    let value_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != group_idx && *i != label_idx)
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let mut records = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let rec = result?;
        let mut values = BTreeMap::new();
        for (i, name) in &value_cols {
            values.insert(name.clone(), parse_number(rec.get(*i).unwrap_or("")));
        }
        records.push(Record {
            id: RecordId(row),
            state: rec.get(group_idx).unwrap_or("").to_string(),
            district: rec.get(label_idx).unwrap_or("").to_string(),
            values,
        });
    }

    Ok(Dataset {
        columns: value_cols.into_iter().map(|(_, h)| h).collect(),
        records,
    })
}

fn parse_number(cell: &str) -> Option<f64> {
    let t = cell.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<f64>().ok().filter(|v| v.is_finite())
}
