use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    config::{ConfigError, ConfigLoader},
    tile::Tile,
};

const EMBEDDED_CHAINS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/data/resource_chains.yaml"
));

/// Static table of production chains, keyed by chain identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceChains {
    chains: BTreeMap<String, Vec<String>>,
}

impl ResourceChains {
    /// The table shipped with the crate.
    pub fn embedded() -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(EMBEDDED_CHAINS)
    }

    pub fn load(loader: &ConfigLoader, file: impl AsRef<Path>) -> Result<Self, ConfigError> {
        loader.load_yaml(file)
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.chains.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.chains.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.chains.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// True when the tile produces or consumes any good of the chain.
    ///
    /// Unknown keys match every tile.
    pub fn contains_tile(&self, key: &str, tile: &Tile) -> bool {
        match self.get(key) {
            Some(goods) => goods
                .iter()
                .any(|good| tile.produces.contains(good) || tile.requires_goods.contains(good)),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(requires_goods: &[&str], produces: &[&str]) -> Tile {
        Tile {
            name: "Test".into(),
            kind: "Industrial".into(),
            generation: "I".into(),
            description: String::new(),
            requires_goods: requires_goods.iter().map(|s| s.to_string()).collect(),
            requires_other: vec!["Stone".into()],
            produces: produces.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn embedded_table_parses() {
        let chains = ResourceChains::embedded().unwrap();
        assert!(chains.contains_key("stone"));
        assert!(chains.contains_key("electronics"));
        assert_eq!(
            chains.get("stone").unwrap(),
            ["Stone", "Concrete", "Glass", "Jewelry"]
        );
    }

    #[test]
    fn membership_checks_produces_and_required_goods() {
        let chains = ResourceChains::embedded().unwrap();

        assert!(chains.contains_tile("stone", &tile(&[], &["Glass"])));
        assert!(chains.contains_tile("stone", &tile(&["Concrete"], &[])));
        assert!(!chains.contains_tile("stone", &tile(&["Wheat"], &["Bread"])));
    }

    #[test]
    fn other_requirements_do_not_count() {
        let chains = ResourceChains::embedded().unwrap();
        assert!(!chains.contains_tile("stone", &tile(&[], &[])));
    }

    #[test]
    fn membership_is_case_sensitive() {
        let chains = ResourceChains::embedded().unwrap();
        assert!(!chains.contains_tile("stone", &tile(&[], &["glass"])));
    }

    #[test]
    fn unknown_key_matches_everything() {
        let chains = ResourceChains::embedded().unwrap();
        assert!(chains.contains_tile("plutonium", &tile(&[], &[])));
    }

    #[test]
    fn table_can_be_replaced_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("chains.yaml"),
            "chains:\n  spice: [Pepper, Curry]\n",
        )
        .unwrap();

        let chains = ResourceChains::load(&ConfigLoader::new(dir.path()), "chains.yaml").unwrap();
        assert_eq!(chains.keys().collect::<Vec<_>>(), vec!["spice"]);
        assert!(!chains.contains_key("stone"));
    }
}
