#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bootstrap system that turns external station data and rules into a [`World`].
//!
//! Optional station metadata is defaulted here, once, so the engine only
//! ever sees fully-typed [`Station`] records. Any integrity failure aborts the
//! load with a single [`DatasetError`].

use std::{
    fs,
    path::{Path, PathBuf},
};

use metro_core::{
    DistrictId, GridCoord, LineConfig, RiverBank, RuleConfig, Station, StationId, Symbol,
};
use metro_world::{World, WorldError};
use serde::Deserialize;
use thiserror::Error;

/// Rules file format understood by this loader.
pub const SUPPORTED_RULES_VERSION: u32 = 1;

/// Fatal failures while loading the station dataset or rules.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A file could not be read.
    #[error("failed to read {}", .path.display())]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The station dataset is not valid JSON.
    #[error("station dataset is not valid JSON")]
    Json(#[from] serde_json::Error),
    /// The rules file is not valid TOML.
    #[error("rules file is not valid TOML")]
    Toml(#[from] toml::de::Error),
    /// The rules file declares an unsupported version.
    #[error("unsupported rules version {found}; expected {expected}")]
    UnsupportedRulesVersion {
        /// Version found in the file.
        found: u32,
        /// Version this loader understands.
        expected: u32,
    },
    /// A station record lacks a required field.
    #[error("station record {index} is missing `{field}`")]
    MissingField {
        /// Position of the record within the dataset.
        index: usize,
        /// Name of the missing field.
        field: &'static str,
    },
    /// A station record uses an unknown symbol.
    #[error("station {id} has unknown symbol `{value}`")]
    InvalidSymbol {
        /// Station carrying the symbol.
        id: u32,
        /// Symbol text found in the dataset.
        value: String,
    },
    /// A station record uses an unknown river bank label.
    #[error("station {id} has unknown river side `{value}`")]
    InvalidRiverSide {
        /// Station carrying the label.
        id: u32,
        /// Label found in the dataset.
        value: String,
    },
    /// The records are individually valid but inconsistent as a whole.
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Station record as it appears in the external dataset.
#[derive(Debug, Deserialize)]
struct StationRecord {
    id: Option<u32>,
    x: Option<u32>,
    y: Option<u32>,
    #[serde(rename = "type")]
    symbol: Option<String>,
    train: Option<bool>,
    side: Option<String>,
    district: Option<u32>,
}

impl StationRecord {
    fn into_station(self, index: usize) -> Result<Station, DatasetError> {
        let missing = |field| DatasetError::MissingField { index, field };
        let id = self.id.ok_or_else(|| missing("id"))?;
        let x = self.x.ok_or_else(|| missing("x"))?;
        let y = self.y.ok_or_else(|| missing("y"))?;
        let symbol_text = self.symbol.ok_or_else(|| missing("type"))?;

        let symbol =
            parse_symbol(&symbol_text).ok_or_else(|| DatasetError::InvalidSymbol {
                id,
                value: symbol_text.clone(),
            })?;
        let river_bank = match self.side.as_deref() {
            None | Some("") => None,
            Some(label) => Some(parse_river_bank(label).ok_or_else(|| {
                DatasetError::InvalidRiverSide {
                    id,
                    value: label.to_owned(),
                }
            })?),
        };

        Ok(Station {
            id: StationId::new(id),
            position: GridCoord::new(x, y),
            symbol,
            train_hub: self.train.unwrap_or(false),
            river_bank,
            district: self.district.map(DistrictId::new),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RulesManifest {
    version: u32,
    #[serde(default = "default_draw_limit")]
    draw_limit: u32,
    #[serde(default = "default_platform_limit")]
    platform_limit: u32,
    transfer_station: StationId,
    lines: Vec<LineConfig>,
}

fn default_draw_limit() -> u32 {
    RuleConfig::default().draw_limit
}

fn default_platform_limit() -> u32 {
    RuleConfig::default().platform_limit
}

fn parse_symbol(text: &str) -> Option<Symbol> {
    let mut chars = text.trim().chars();
    let symbol = chars.next().and_then(Symbol::from_char)?;
    chars.next().is_none().then_some(symbol)
}

fn parse_river_bank(label: &str) -> Option<RiverBank> {
    match label.trim().to_ascii_lowercase().as_str() {
        "north" | "n" => Some(RiverBank::North),
        "south" | "s" => Some(RiverBank::South),
        _ => None,
    }
}

fn read(path: &Path) -> Result<String, DatasetError> {
    fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Prepares the world from external inputs.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Parses the JSON station dataset into typed stations.
    pub fn parse_stations(&self, json: &str) -> Result<Vec<Station>, DatasetError> {
        let records: Vec<StationRecord> = serde_json::from_str(json)?;
        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| record.into_station(index))
            .collect()
    }

    /// Parses a TOML rules file.
    pub fn parse_rules(&self, contents: &str) -> Result<RuleConfig, DatasetError> {
        let manifest: RulesManifest = toml::from_str(contents)?;
        if manifest.version != SUPPORTED_RULES_VERSION {
            return Err(DatasetError::UnsupportedRulesVersion {
                found: manifest.version,
                expected: SUPPORTED_RULES_VERSION,
            });
        }
        Ok(RuleConfig {
            draw_limit: manifest.draw_limit,
            platform_limit: manifest.platform_limit,
            transfer_station: manifest.transfer_station,
            lines: manifest.lines,
        })
    }

    /// Builds a world from in-memory dataset and rules text.
    pub fn world_from_str(
        &self,
        stations_json: &str,
        rules_toml: Option<&str>,
    ) -> Result<World, DatasetError> {
        let stations = self.parse_stations(stations_json)?;
        let rules = match rules_toml {
            Some(contents) => self.parse_rules(contents)?,
            None => RuleConfig::default(),
        };
        Ok(World::new(stations, rules)?)
    }

    /// Loads the dataset and optional rules file from disk and builds a world.
    pub fn load_world(
        &self,
        stations_path: &Path,
        rules_path: Option<&Path>,
    ) -> Result<World, DatasetError> {
        let stations = read(stations_path)?;
        let rules = rules_path.map(read).transpose()?;
        self.world_from_str(&stations, rules.as_deref())
    }
}
