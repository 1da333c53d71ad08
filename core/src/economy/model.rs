use std::cmp::Ordering;
use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use super::constants::{INITIAL_PLANET_VARIATION, INITIAL_SYS_VARIATION};
use super::credits::Credits;

/// Dense position of a commodity in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommodityId(pub usize);

impl CommodityId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    #[serde(rename = "type")]
    pub key: String,
    pub value: f64,
}

/// Ordered modifier list. Later declarations shadow earlier ones with the
/// same key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifierTable {
    entries: Vec<Modifier>,
}

impl ModifierTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<K: Into<String>>(&mut self, key: K, value: f64) {
        self.entries.push(Modifier {
            key: key.into(),
            value,
        });
    }

    pub fn lookup(&self, key: &str) -> Option<f64> {
        self.entries
            .iter()
            .rev()
            .find(|modifier| modifier.key == key)
            .map(|modifier| modifier.value)
    }

    /// Multiplier for `key`, 1 when absent.
    pub fn multiplier(&self, key: Option<&str>) -> f64 {
        key.and_then(|key| self.lookup(key)).unwrap_or(1.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.entries.shrink_to_fit();
    }
}

impl From<Vec<Modifier>> for ModifierTable {
    fn from(entries: Vec<Modifier>) -> Self {
        Self { entries }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Commodity {
    pub name: String,
    pub description: Option<String>,
    pub price: Credits,
    pub gfx_store: Option<String>,
    pub gfx_space: Option<String>,
    pub population_modifier: f64,
    pub period: f64,
    pub planet_modifiers: ModifierTable,
    pub faction_modifiers: ModifierTable,
}

impl Commodity {
    pub const DEFAULT_PERIOD: f64 = 200.0;

    pub fn new<N: Into<String>>(name: N, price: Credits) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            gfx_store: None,
            gfx_space: None,
            population_modifier: 0.0,
            period: Self::DEFAULT_PERIOD,
            planet_modifiers: ModifierTable::new(),
            faction_modifiers: ModifierTable::new(),
        }
    }

    /// Only priced commodities take part in the nodal network.
    pub fn is_priced(&self) -> bool {
        self.price > 0
    }
}

/// Descending base price, then ascending name.
pub fn compare_for_display(a: &Commodity, b: &Commodity) -> Ordering {
    b.price.cmp(&a.price).then_with(|| a.name.cmp(&b.name))
}

/// Sinusoidal price parameters of one commodity on one planet.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CommodityPrice {
    pub price: f64,
    pub planet_variation: f64,
    pub sys_variation: f64,
    pub planet_period: f64,
    pub sys_period: f64,
}

impl CommodityPrice {
    pub fn seeded(base_price: Credits) -> Self {
        Self {
            price: base_price as f64,
            planet_variation: INITIAL_PLANET_VARIATION,
            sys_variation: INITIAL_SYS_VARIATION,
            planet_period: 0.0,
            sys_period: 0.0,
        }
    }

    /// Largest possible distance from `price`.
    pub fn amplitude(&self) -> f64 {
        self.planet_variation.abs() + self.sys_variation.abs()
    }

    /// Price at `t` standard time periods. A degenerate period contributes
    /// no oscillation.
    pub fn evaluate(&self, t_stp: f64) -> f64 {
        self.price
            + oscillation(self.planet_variation, self.planet_period, t_stp)
            + oscillation(self.sys_variation, self.sys_period, t_stp)
    }
}

fn oscillation(amplitude: f64, period: f64, t: f64) -> f64 {
    if !period.is_finite() || period <= 0.0 {
        return 0.0;
    }
    amplitude * (TAU * t / period).sin()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceEntry {
    pub commodity: CommodityId,
    pub value: CommodityPrice,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlanetPrices {
    pub planet: String,
    pub entries: Vec<PriceEntry>,
}

impl PlanetPrices {
    pub fn new<N: Into<String>>(planet: N) -> Self {
        Self {
            planet: planet.into(),
            entries: Vec::new(),
        }
    }

    pub fn get(&self, commodity: CommodityId) -> Option<&CommodityPrice> {
        self.entries
            .iter()
            .find(|entry| entry.commodity == commodity)
            .map(|entry| &entry.value)
    }

    pub fn sells(&self, commodity: CommodityId) -> bool {
        self.get(commodity).is_some()
    }
}

/// Per system, per planet price lists, in galaxy order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceTable {
    systems: Vec<Vec<PlanetPrices>>,
}

impl PriceTable {
    pub fn new(systems: Vec<Vec<PlanetPrices>>) -> Self {
        Self { systems }
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    pub fn system(&self, index: usize) -> &[PlanetPrices] {
        self.systems.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn systems(&self) -> &[Vec<PlanetPrices>] {
        &self.systems
    }

    pub fn planet(&self, system: usize, planet: &str) -> Option<&PlanetPrices> {
        self.system(system)
            .iter()
            .find(|prices| prices.planet.eq_ignore_ascii_case(planet))
    }

    pub fn entry_count(&self) -> usize {
        self.systems
            .iter()
            .flatten()
            .map(|planet| planet.entries.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_modifier_shadows_older() {
        let mut table = ModifierTable::new();
        table.push("M", 0.8);
        table.push("O", 1.1);
        table.push("M", 1.4);
        assert_eq!(table.lookup("M"), Some(1.4));
        assert_eq!(table.multiplier(Some("O")), 1.1);
        assert_eq!(table.multiplier(Some("X")), 1.0);
        assert_eq!(table.multiplier(None), 1.0);
    }

    #[test]
    fn display_order_is_price_then_name() {
        let mut list = vec![
            Commodity::new("Ore", 200),
            Commodity::new("Food", 120),
            Commodity::new("Alloy", 200),
        ];
        list.sort_by(compare_for_display);
        let names: Vec<_> = list.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Alloy", "Ore", "Food"]);
    }

    #[test]
    fn degenerate_period_does_not_oscillate() {
        let price = CommodityPrice {
            price: 100.0,
            planet_variation: 5.0,
            sys_variation: 3.0,
            planet_period: 0.0,
            sys_period: f64::NAN,
        };
        assert_eq!(price.evaluate(12.3), 100.0);
        assert_eq!(price.amplitude(), 8.0);
    }
}
