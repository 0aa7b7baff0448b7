use serde::{Deserialize, Serialize};
use serde_json::Value;

const CURRENCY_SYMBOLS: [char; 4] = ['£', '$', '€', '¥'];
const NO_REQUIREMENTS: &str = "none";

/// Canonical tile record consumed by the filter engine and the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub generation: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requires_goods: Vec<String>,
    #[serde(default)]
    pub requires_other: Vec<String>,
    #[serde(default)]
    pub produces: Vec<String>,
}

impl Tile {
    /// First segment of a composite type such as "Residential & Commercial".
    pub fn primary_category(&self) -> &str {
        self.kind
            .split(" & ")
            .next()
            .map(str::trim)
            .unwrap_or_default()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.kind
            .split(" & ")
            .map(str::trim)
            .filter(|category| !category.is_empty())
    }
}

/// A dataset record as found on disk, before normalization.
///
/// Every field is read leniently: a null or wrongly-typed field falls back
/// to its default without affecting the rest of the record.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTile {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "lenient::text")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub generation: String,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub shape: TileShape,
}

/// The requirement/production layouts seen across dataset revisions.
///
/// Variants are tried in declaration order, so the catch-all `Unrecognized`
/// must stay last.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TileShape {
    Categorized {
        requires: CategorizedRequires,
        #[serde(default, deserialize_with = "lenient::categories")]
        produces: GoodsByCategory,
    },
    Delimited {
        requires: String,
        #[serde(default, deserialize_with = "lenient::optional_text")]
        produces: Option<String>,
    },
    Normalized {
        #[serde(rename = "requiresGoods", deserialize_with = "lenient::list")]
        requires_goods: Vec<String>,
        #[serde(rename = "requiresOther", default, deserialize_with = "lenient::list")]
        requires_other: Vec<String>,
        #[serde(default, deserialize_with = "lenient::list")]
        produces: Vec<String>,
    },
    Unrecognized {},
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GoodsByCategory {
    #[serde(default, deserialize_with = "lenient::list")]
    pub raw: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub processed: Vec<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub luxury: Vec<String>,
}

impl GoodsByCategory {
    fn flatten(self) -> Vec<String> {
        let mut goods = self.raw;
        goods.extend(self.processed);
        goods.extend(self.luxury);
        goods
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CategorizedRequires {
    #[serde(flatten)]
    pub goods: GoodsByCategory,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub money: f64,
    #[serde(default, deserialize_with = "lenient::list")]
    pub tiles: Vec<String>,
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::{split_tokens, GoodsByCategory};

    pub(super) fn text_of(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(optional_text(deserializer)?.unwrap_or_default())
    }

    pub fn optional_text<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(text_of(&Value::deserialize(deserializer)?))
    }

    /// Keeps the string entries of an array; anything else is empty.
    pub fn list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        })
    }

    pub fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64().unwrap_or_default(),
            Value::String(s) => s.trim().parse().unwrap_or_default(),
            _ => 0.0,
        })
    }

    /// A bare comma-separated string is read as raw goods.
    pub fn categories<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<GoodsByCategory, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            value @ Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            Value::String(s) => GoodsByCategory {
                raw: split_tokens(&s),
                ..GoodsByCategory::default()
            },
            _ => GoodsByCategory::default(),
        })
    }
}

/// The three canonical sequences produced from any [`TileShape`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    pub requires_goods: Vec<String>,
    pub requires_other: Vec<String>,
    pub produces: Vec<String>,
}

impl TileShape {
    pub fn normalize(self) -> Requirements {
        match self {
            TileShape::Categorized { requires, produces } => {
                normalize_categorized(requires, produces)
            }
            TileShape::Delimited { requires, produces } => {
                normalize_delimited(&requires, produces.as_deref())
            }
            TileShape::Normalized {
                requires_goods,
                requires_other,
                produces,
            } => Requirements {
                requires_goods,
                requires_other,
                produces,
            },
            TileShape::Unrecognized {} => Requirements::default(),
        }
    }
}

fn normalize_categorized(requires: CategorizedRequires, produces: GoodsByCategory) -> Requirements {
    let mut requires_other = Vec::with_capacity(requires.tiles.len() + 1);
    if requires.money > 0.0 {
        requires_other.push(format_money(requires.money));
    }
    requires_other.extend(requires.tiles);

    Requirements {
        requires_goods: requires.goods.flatten(),
        requires_other,
        produces: produces.flatten(),
    }
}

fn normalize_delimited(requires: &str, produces: Option<&str>) -> Requirements {
    let (requires_other, requires_goods): (Vec<String>, Vec<String>) = split_tokens(requires)
        .into_iter()
        .partition(|token| is_other_requirement(token));

    Requirements {
        requires_goods,
        requires_other,
        produces: produces.map(split_tokens).unwrap_or_default(),
    }
}

fn split_tokens(list: &str) -> Vec<String> {
    if list.trim().eq_ignore_ascii_case(NO_REQUIREMENTS) {
        return Vec::new();
    }
    list.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Currency amounts and bare counts are requirements, not goods.
pub fn is_other_requirement(token: &str) -> bool {
    token.starts_with(&CURRENCY_SYMBOLS[..])
        || (!token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()))
}

// f64 Display never switches to exponent notation, so huge amounts print every digit.
pub fn format_money(amount: f64) -> String {
    format!("£{amount}")
}

impl From<RawTile> for Tile {
    fn from(raw: RawTile) -> Self {
        let Requirements {
            requires_goods,
            requires_other,
            produces,
        } = raw.shape.normalize();
        Tile {
            name: raw.name,
            kind: raw.kind,
            generation: raw.generation,
            description: raw.description.unwrap_or_default(),
            requires_goods,
            requires_other,
            produces,
        }
    }
}

impl RawTile {
    /// Parses one dataset record, never failing.
    ///
    /// Only a record that is not a JSON object at all loses its
    /// requirement data; field-level problems are absorbed while parsing.
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value::<RawTile>(value.clone()) {
            Ok(raw) => raw,
            Err(err) => {
                let raw = RawTile::degraded(&value);
                tracing::warn!(tile = %raw.name, error = %err, "tile record degraded");
                raw
            }
        }
    }

    fn degraded(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(lenient::text_of);
        RawTile {
            name: text("name").unwrap_or_default(),
            kind: text("type").unwrap_or_default(),
            generation: text("generation").unwrap_or_default(),
            description: text("description"),
            shape: TileShape::Unrecognized {},
        }
    }
}

pub fn normalize(value: Value) -> Tile {
    Tile::from(RawTile::from_value(value))
}
