use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail, ensure};
use serde::Deserialize;
use serde_yaml::Value;
use tracing::{debug, warn};

use super::credits::Credits;
use super::model::{Commodity, CommodityId, Modifier, compare_for_display};

const EMBEDDED_COMMODITIES: &str = include_str!("../../../config/commodities.yaml");
const ROOT_KEY: &str = "Commodities";
const DEFAULT_GFX: &str = "_default";

/// Append-only commodity list plus the dense index of priced commodities.
#[derive(Debug, Clone, Default)]
pub struct CommodityCatalog {
    commodities: Vec<Commodity>,
    priced: Vec<CommodityId>,
    by_name: HashMap<String, CommodityId>,
}

impl CommodityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let document: Value =
            serde_yaml::from_str(content).context("商品定義 YAML の解析に失敗しました")?;
        let root = document
            .as_mapping()
            .ok_or_else(|| anyhow!("商品定義のルート要素 {} がありません", ROOT_KEY))?;

        for key in root.keys() {
            if key.as_str() != Some(ROOT_KEY) {
                warn!(key = ?key, "商品定義に未知のルート要素があります");
            }
        }

        let list = root
            .get(ROOT_KEY)
            .ok_or_else(|| anyhow!("商品定義のルート要素 {} がありません", ROOT_KEY))?
            .as_sequence()
            .ok_or_else(|| anyhow!("{} は商品のリストである必要があります", ROOT_KEY))?;
        ensure!(!list.is_empty(), "商品定義が空です");

        let mut catalog = Self::new();
        for (position, entry) in list.iter().enumerate() {
            let record: CommodityRecord = serde_yaml::from_value(entry.clone())
                .with_context(|| format!("商品定義 {} 番目の解析に失敗しました", position + 1))?;
            if let Some(commodity) = record.into_commodity(position) {
                catalog.insert(commodity)?;
            }
        }
        ensure!(!catalog.is_empty(), "有効な商品定義がありません");
        debug!(
            commodities = catalog.len(),
            priced = catalog.priced.len(),
            "商品カタログを読み込みました"
        );
        Ok(catalog)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("商品定義ファイルを開けません: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("商品定義ファイルが不正です: {}", path.display()))
    }

    pub fn from_embedded() -> Result<Self> {
        Self::from_yaml_str(EMBEDDED_COMMODITIES).context("組み込み商品定義の解析に失敗しました")
    }

    pub fn insert(&mut self, commodity: Commodity) -> Result<CommodityId> {
        ensure!(!commodity.name.trim().is_empty(), "商品名が空です");
        if self.by_name.contains_key(&commodity.name) {
            bail!("商品定義が重複しています: {}", commodity.name);
        }
        let id = CommodityId(self.commodities.len());
        if commodity.is_priced() {
            self.priced.push(id);
        }
        self.by_name.insert(commodity.name.clone(), id);
        self.commodities.push(commodity);
        Ok(id)
    }

    /// Lookup that reports a miss.
    pub fn get(&self, name: &str) -> Option<&Commodity> {
        let found = self.find(name);
        if found.is_none() {
            warn!(commodity = name, "商品がカタログに存在しません");
        }
        found
    }

    pub fn find(&self, name: &str) -> Option<&Commodity> {
        self.id_of(name).map(|id| &self.commodities[id.index()])
    }

    pub fn id_of(&self, name: &str) -> Option<CommodityId> {
        self.by_name.get(name).copied()
    }

    pub fn commodity(&self, id: CommodityId) -> Option<&Commodity> {
        self.commodities.get(id.index())
    }

    pub fn commodities(&self) -> &[Commodity] {
        &self.commodities
    }

    pub fn priced(&self) -> &[CommodityId] {
        &self.priced
    }

    /// Position of `id` in the priced index.
    pub fn priced_slot(&self, id: CommodityId) -> Option<usize> {
        self.priced.iter().position(|priced| *priced == id)
    }

    pub fn sorted_for_display(&self) -> Vec<&Commodity> {
        let mut list: Vec<&Commodity> = self.commodities.iter().collect();
        list.sort_by(|a, b| compare_for_display(a, b));
        list
    }

    /// Drops the modifier tables once pricing no longer needs them.
    pub fn release_modifiers(&mut self) {
        for commodity in &mut self.commodities {
            commodity.planet_modifiers.clear();
            commodity.faction_modifiers.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.commodities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commodities.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CommodityRecord {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    price: Credits,
    #[serde(default)]
    gfx_space: Option<String>,
    #[serde(default)]
    gfx_store: Option<String>,
    #[serde(default)]
    population_modifier: f64,
    #[serde(default = "CommodityRecord::default_period")]
    period: f64,
    #[serde(default)]
    planet_modifiers: Vec<Modifier>,
    #[serde(default)]
    faction_modifiers: Vec<Modifier>,
    #[serde(flatten)]
    unknown: BTreeMap<String, Value>,
}

impl CommodityRecord {
    const fn default_period() -> f64 {
        Commodity::DEFAULT_PERIOD
    }

    fn into_commodity(self, position: usize) -> Option<Commodity> {
        let Some(name) = self.name.filter(|name| !name.trim().is_empty()) else {
            warn!(position = position + 1, "名前のない商品定義を読み飛ばします");
            return None;
        };
        for key in self.unknown.keys() {
            warn!(commodity = %name, key = %key, "商品定義に未知の項目があります");
        }

        let mut commodity = Commodity::new(name, self.price);
        commodity.description = self.description;
        commodity.population_modifier = self.population_modifier;
        commodity.period = self.period;
        commodity.planet_modifiers = self.planet_modifiers.into();
        commodity.faction_modifiers = self.faction_modifiers.into();
        commodity.gfx_space = self.gfx_space;
        commodity.gfx_store = self.gfx_store;
        if commodity.is_priced() {
            if commodity.gfx_store.is_none() {
                warn!(
                    commodity = %commodity.name,
                    "gfx_store がないため既定の画像を使用します"
                );
                commodity.gfx_store = Some(DEFAULT_GFX.to_string());
            }
            if commodity.gfx_space.is_none() {
                commodity.gfx_space = Some(DEFAULT_GFX.to_string());
            }
        }
        Some(commodity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
Commodities:
  - name: Food
    price: 120
    gfx_store: food
    population_modifier: 0.4
    planet_modifiers:
      - { type: M, value: 0.8 }
      - { type: M, value: 0.6 }
    faction_modifiers:
      - { type: Empire, value: 1.1 }
  - name: Ore
    price: 200
    period: 150
    colour: grey
  - description: nameless
    price: 10
  - name: Space Debris
"#;

    #[test]
    fn catalog_parses_records() {
        let catalog = CommodityCatalog::from_yaml_str(SAMPLE).expect("catalog");
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.priced().len(), 2);

        let food = catalog.find("Food").expect("food");
        assert_eq!(food.period, Commodity::DEFAULT_PERIOD);
        assert_eq!(food.planet_modifiers.lookup("M"), Some(0.6));
        assert_eq!(food.gfx_space.as_deref(), Some("_default"));

        let ore = catalog.find("Ore").expect("ore");
        assert_eq!(ore.period, 150.0);
        assert_eq!(ore.gfx_store.as_deref(), Some("_default"));

        let debris = catalog.find("Space Debris").expect("debris");
        assert!(!debris.is_priced());
        assert!(debris.gfx_store.is_none());
        assert_eq!(catalog.priced_slot(CommodityId(2)), None);
    }

    #[test]
    fn missing_root_or_empty_list_is_fatal() {
        assert!(CommodityCatalog::from_yaml_str("Goods: []\n").is_err());
        assert!(CommodityCatalog::from_yaml_str("Commodities: []\n").is_err());
        assert!(CommodityCatalog::from_yaml_str("- name: Food\n").is_err());
        assert!(CommodityCatalog::from_yaml_str("Commodities: [").is_err());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let yaml = "Commodities:\n  - name: Food\n    price: 1\n  - name: Food\n    price: 2\n";
        assert!(CommodityCatalog::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn lookups_and_display_order() {
        let catalog = CommodityCatalog::from_embedded().expect("embedded catalog");
        assert!(catalog.get("Unobtainium").is_none());
        assert!(catalog.find("Food").is_some());
        let sorted = catalog.sorted_for_display();
        assert!(sorted.windows(2).all(|pair| pair[0].price >= pair[1].price));
    }

    #[test]
    fn release_drops_modifier_tables() {
        let mut catalog = CommodityCatalog::from_yaml_str(SAMPLE).expect("catalog");
        catalog.release_modifiers();
        assert!(catalog.commodities().iter().all(|c| c.planet_modifiers.is_empty()
            && c.faction_modifiers.is_empty()));
    }
}
