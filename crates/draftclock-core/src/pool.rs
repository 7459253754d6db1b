// Player pool loading from CSV (Name,Team,Positions).

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::config::DataPaths;

/// One draftable player as read from the pool file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolPlayer {
    pub name: String,
    pub team: String,
    /// Eligible positions, e.g. `["RB", "WR"]`.
    pub positions: Vec<String>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV row
// ---------------------------------------------------------------------------

/// Positions are `/`-separated (`RB/WR`). Extra columns are ignored.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawPoolRow {
    Name: String,
    #[serde(default)]
    Team: String,
    #[serde(alias = "Position", alias = "POS")]
    Positions: String,
}

fn split_positions(raw: &str) -> Vec<String> {
    raw.split('/')
        .map(|p| p.trim().to_ascii_uppercase())
        .filter(|p| !p.is_empty())
        .collect()
}

fn load_pool_from_reader<R: Read>(rdr: R) -> Result<Vec<PoolPlayer>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut players = Vec::new();
    for result in reader.deserialize::<RawPoolRow>() {
        match result {
            Ok(raw) => {
                let name = raw.Name.trim();
                let positions = split_positions(&raw.Positions);
                if name.is_empty() || positions.is_empty() {
                    warn!("skipping pool row with missing name or positions: {:?}", raw);
                    continue;
                }
                players.push(PoolPlayer {
                    name: name.to_string(),
                    team: raw.Team.trim().to_string(),
                    positions,
                });
            }
            Err(e) => {
                warn!("skipping malformed pool row: {}", e);
            }
        }
    }
    Ok(players)
}

/// Load the player pool from a CSV file.
pub fn load_pool(path: &Path) -> Result<Vec<PoolPlayer>, PoolError> {
    let file = std::fs::File::open(path).map_err(|e| PoolError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let players = load_pool_from_reader(file).map_err(|e| PoolError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;

    if players.is_empty() {
        return Err(PoolError::Validation(format!(
            "{} produced zero valid players",
            path.display()
        )));
    }
    Ok(players)
}

/// Load the pool from the configured data paths.
pub fn load_from_paths(paths: &DataPaths) -> Result<Vec<PoolPlayer>, PoolError> {
    load_pool(Path::new(&paths.players))
}
