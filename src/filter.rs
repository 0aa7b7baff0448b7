use serde::{Deserialize, Serialize};

use crate::{chains::ResourceChains, tile::Tile};

pub const UNRANKED: u8 = 99;

const CATEGORY_ORDER: [&str; 5] = ["Resource", "Industrial", "Residential", "Commercial", "Public"];
const GENERATION_ORDER: [&str; 4] = ["I", "II", "III", "C"];

pub fn category_rank(category: &str) -> u8 {
    rank_in(&CATEGORY_ORDER, category)
}

pub fn generation_rank(generation: &str) -> u8 {
    rank_in(&GENERATION_ORDER, generation)
}

fn rank_in(order: &[&str], value: &str) -> u8 {
    order
        .iter()
        .position(|candidate| *candidate == value)
        .map_or(UNRANKED, |index| index as u8)
}

/// Active filters; every set field must match. Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub generation: Option<String>,
    pub chain: Option<String>,
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl FilterCriteria {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn generation(mut self, generation: impl Into<String>) -> Self {
        self.generation = Some(generation.into());
        self
    }

    pub fn chain(mut self, chain: impl Into<String>) -> Self {
        self.chain = Some(chain.into());
        self
    }

    pub fn matches(&self, tile: &Tile, chains: &ResourceChains) -> bool {
        if let Some(search) = active(&self.search) {
            if !tile.name.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        // Containment, so "Commercial" also selects "Residential & Commercial".
        if let Some(kind) = active(&self.kind) {
            if !tile.kind.contains(kind) {
                return false;
            }
        }
        if let Some(generation) = active(&self.generation) {
            if tile.generation != generation {
                return false;
            }
        }
        if let Some(chain) = active(&self.chain) {
            if !chains.contains_tile(chain, tile) {
                return false;
            }
        }
        true
    }

    /// Returns the matching tiles in dataset order, or grouped by category
    /// and generation when a known resource chain is selected.
    pub fn apply<'a>(&self, tiles: &'a [Tile], chains: &ResourceChains) -> Vec<&'a Tile> {
        let mut visible: Vec<&Tile> = tiles
            .iter()
            .filter(|tile| self.matches(tile, chains))
            .collect();

        if active(&self.chain).is_some_and(|chain| chains.contains_key(chain)) {
            visible.sort_by_key(|tile| {
                (
                    category_rank(tile.primary_category()),
                    generation_rank(&tile.generation),
                )
            });
        }
        visible
    }
}
