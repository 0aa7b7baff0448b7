//! Loading and holding the normalized tile dataset.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    filter::{category_rank, generation_rank},
    tile::{self, Tile},
};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON array or object of tiles, found {0}")]
    Shape(&'static str),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read dataset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse dataset {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// Normalizes a dataset document into tiles in dataset order.
///
/// Accepts either an array of records or an object mapping tile names to
/// records. Keyed records without a `name` take their key.
pub fn parse_tiles(text: &str) -> Result<Vec<Tile>, ParseError> {
    let document: Value = serde_json::from_str(text)?;
    match document {
        Value::Array(records) => Ok(records.into_iter().map(tile::normalize).collect()),
        Value::Object(records) => Ok(records
            .into_iter()
            .map(|(key, mut record)| {
                if let Value::Object(fields) = &mut record {
                    fields.entry("name").or_insert(Value::String(key));
                }
                tile::normalize(record)
            })
            .collect()),
        Value::Null => Err(ParseError::Shape("null")),
        Value::Bool(_) => Err(ParseError::Shape("a boolean")),
        Value::Number(_) => Err(ParseError::Shape("a number")),
        Value::String(_) => Err(ParseError::Shape("a string")),
    }
}

/// Immutable snapshot of the loaded dataset.
#[derive(Debug, Clone, Default)]
pub struct TileCatalog {
    tiles: Vec<Tile>,
    source: Option<PathBuf>,
    loaded_at: Option<DateTime<Utc>>,
}

impl TileCatalog {
    pub fn from_tiles(tiles: Vec<Tile>) -> Self {
        Self {
            tiles,
            source: None,
            loaded_at: Some(Utc::now()),
        }
    }

    /// Empty catalog standing in for a dataset that failed to load.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref().to_path_buf();
        let text = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;
        let tiles = parse_tiles(&text).map_err(|source| CatalogError::Parse {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), tiles = tiles.len(), "tile dataset loaded");
        Ok(Self {
            tiles,
            source: Some(path),
            loaded_at: Some(Utc::now()),
        })
    }

    /// Loads the dataset, logging and falling back to an unavailable
    /// catalog on failure. Nothing from a failed load is kept.
    pub fn load_or_unavailable(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(catalog) => catalog,
            Err(err) => {
                error!(error = %err, "tile dataset unavailable");
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.loaded_at.is_some()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    /// Distinct type categories, composite types split on " & ".
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for category in self.tiles.iter().flat_map(Tile::categories) {
            if !types.contains(&category) {
                types.push(category);
            }
        }
        types.sort_by_key(|category| category_rank(category));
        types
    }

    pub fn generations(&self) -> Vec<&str> {
        let mut generations: Vec<&str> = Vec::new();
        for tile in &self.tiles {
            if !tile.generation.is_empty() && !generations.contains(&tile.generation.as_str()) {
                generations.push(&tile.generation);
            }
        }
        generations.sort_by_key(|generation| generation_rank(generation));
        generations
    }
}
