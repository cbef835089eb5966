//! Runtime configuration read from the environment.
//!
//! `.env` is loaded by the binary before this runs. Every variable is
//! optional:
//!
//! | Variable                  | Default                                      |
//! |---------------------------|----------------------------------------------|
//! | `CONGESTION_DATA_PATH`    | `서울교통공사_지하철혼잡도정보_20250930.csv` |
//! | `CONGESTION_ENCODINGS`    | `cp949,euc-kr,utf-8-sig,utf-8`               |
//! | `CONGESTION_TOP_N`        | `20`                                         |
//! | `CONGESTION_HEATMAP_ROWS` | `20`                                         |
//! | `HOST`                    | `0.0.0.0`                                    |
//! | `PORT`                    | `8080`                                       |

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::analysis::RowLimit;
use crate::loader::SourceEncoding;

pub const DEFAULT_DATA_PATH: &str = "서울교통공사_지하철혼잡도정보_20250930.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub encodings: Vec<SourceEncoding>,
    pub default_top_n: RowLimit,
    pub default_heatmap_rows: RowLimit,
    pub host: String,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            encodings: SourceEncoding::DEFAULT_ORDER.to_vec(),
            default_top_n: RowLimit::default(),
            default_heatmap_rows: RowLimit::default(),
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl DashboardConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get("CONGESTION_DATA_PATH") {
            config.data_path = PathBuf::from(path);
        }

        if let Some(list) = get("CONGESTION_ENCODINGS") {
            config.encodings = list
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(str::parse)
                .collect::<Result<Vec<SourceEncoding>>>()
                .context("invalid CONGESTION_ENCODINGS")?;
            if config.encodings.is_empty() {
                anyhow::bail!("CONGESTION_ENCODINGS lists no encodings");
            }
        }

        if let Some(n) = get("CONGESTION_TOP_N") {
            let n: usize = n.trim().parse().context("invalid CONGESTION_TOP_N")?;
            config.default_top_n = RowLimit::clamped(n);
        }

        if let Some(n) = get("CONGESTION_HEATMAP_ROWS") {
            let n: usize = n.trim().parse().context("invalid CONGESTION_HEATMAP_ROWS")?;
            config.default_heatmap_rows = RowLimit::clamped(n);
        }

        if let Some(host) = get("HOST") {
            config.host = host;
        }

        if let Some(port) = get("PORT") {
            config.port = port.trim().parse().context("invalid PORT")?;
        }

        Ok(config)
    }
}
