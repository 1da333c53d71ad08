//! Attribute driven initial prices.
//!
//! Every planet-commodity pair starts from the commodity's base price and is
//! shaped by the planet's attributes, then by the attributes of its system.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::catalog::CommodityCatalog;
use super::constants::*;
use super::model::{Commodity, CommodityPrice, PlanetPrices, PriceEntry, PriceTable};
use crate::galaxy::{Galaxy, Planet, StarSystem};

pub fn apply_planet_class(price: &mut CommodityPrice, commodity: &Commodity, class: &str) {
    price.price *= commodity.planet_modifiers.multiplier(Some(class));
    price.planet_variation = INITIAL_PLANET_VARIATION;
    price.sys_variation = INITIAL_SYS_VARIATION;
}

/// Period seeded from the first two bytes of the space sprite name. Missing
/// bytes count as zero.
pub fn apply_sprite_period(price: &mut CommodityPrice, commodity: &Commodity, gfx_space: &str) {
    let mut bytes = gfx_space.bytes().map(u32::from);
    let first = bytes.next().unwrap_or(0) % SPRITE_BYTE_MODULUS;
    let second = bytes.next().unwrap_or(0) % SPRITE_BYTE_MODULUS;
    let seed = SPRITE_BYTE_MODULUS * first + second;
    price.planet_period = commodity.period + PERIOD_BASE + f64::from(seed);
}

pub fn apply_surface_scale(price: &mut CommodityPrice, gfx_exterior: &str) {
    let offset = gfx_exterior.len() as i64 - SURFACE_NAME_PIVOT;
    price.planet_period *= 1.0 + offset as f64 / SURFACE_SCALE_DIVISOR;
}

/// Smooth step from -1 (empty) towards 1 (very large), centred on 1e8.
pub fn population_factor(population: u64) -> f64 {
    if population == 0 {
        return -1.0;
    }
    (((population as f64).ln() - POPULATION_PIVOT.ln()) / 2.0).tanh()
}

pub fn apply_population(price: &mut CommodityPrice, commodity: &Commodity, population: u64) {
    let factor = population_factor(population);
    price.price *= 1.0 + factor * commodity.population_modifier;
    price.planet_variation *= 0.5 - factor * 0.25;
    price.planet_period *= 1.0 + factor * 0.5;
}

pub fn apply_faction(price: &mut CommodityPrice, commodity: &Commodity, faction: Option<&str>) {
    price.price *= commodity.faction_modifiers.multiplier(faction);
}

pub fn apply_presence_range(price: &mut CommodityPrice, range: i32) {
    if !(0..=MAX_PRESENCE_RANGE).contains(&range) {
        warn!(range, max = MAX_PRESENCE_RANGE, "勢力圏の範囲が想定外です");
    }
    let scale = 1.0 - f64::from(range) / PRESENCE_RANGE_DIVISOR;
    price.price *= scale;
    price.planet_period /= scale;
}

pub fn apply_system_radius(price: &mut CommodityPrice, radius: f64) {
    price.price *= 1.0 + radius / RADIUS_PRICE_DIVISOR;
    price.planet_period /= 1.0 - radius / RADIUS_PRICE_DIVISOR;
    price.planet_variation /= 1.0 - radius / RADIUS_VARIATION_DIVISOR;
}

pub fn apply_system_volatility(price: &mut CommodityPrice, volatility: f64, interference: f64) {
    price.price *= 1.0 + volatility / VOLATILITY_PRICE_DIVISOR;
    price.price *= 1.0 + interference / INTERFERENCE_PRICE_DIVISOR;
}

pub fn apply_system_jumps(price: &mut CommodityPrice, jumps: usize) {
    price.sys_period = SYSTEM_PERIOD_BASE / (jumps as f64 + 1.0);
}

/// Planet stages, in order.
pub fn planet_commodity_price(
    commodity: &Commodity,
    planet: &Planet,
    faction: Option<&str>,
) -> CommodityPrice {
    let mut price = CommodityPrice::seeded(commodity.price);
    apply_planet_class(&mut price, commodity, &planet.class);
    apply_sprite_period(&mut price, commodity, &planet.gfx_space);
    apply_surface_scale(&mut price, &planet.gfx_exterior);
    apply_population(&mut price, commodity, planet.population);
    apply_faction(&mut price, commodity, faction);
    apply_presence_range(&mut price, planet.presence_range);
    price
}

/// System stages, in order.
pub fn system_adjusted(mut price: CommodityPrice, system: &StarSystem) -> CommodityPrice {
    apply_system_radius(&mut price, system.radius);
    apply_system_volatility(&mut price, system.nebula.volatility, system.interference);
    apply_system_jumps(&mut price, system.jump_count());
    price
}

/// Prices every commodity listed by every planet, before smoothing.
pub fn initialise_prices(catalog: &CommodityCatalog, galaxy: &Galaxy) -> PriceTable {
    let mut systems = Vec::with_capacity(galaxy.system_count());
    for system in galaxy.systems() {
        let mut planets = Vec::with_capacity(system.planets.len());
        for planet in &system.planets {
            let faction = galaxy.faction_name(planet.faction);
            let mut prices = PlanetPrices::new(planet.name.clone());
            let mut seen = HashSet::new();
            for name in &planet.commodities {
                let Some(id) = catalog.id_of(name) else {
                    warn!(
                        planet = %planet.name,
                        commodity = %name,
                        "惑星が未知の商品を扱っています"
                    );
                    continue;
                };
                if !seen.insert(id) {
                    warn!(
                        planet = %planet.name,
                        commodity = %name,
                        "惑星の商品リストが重複しています"
                    );
                    continue;
                }
                let Some(commodity) = catalog.commodity(id) else {
                    continue;
                };
                let value = planet_commodity_price(commodity, planet, faction);
                prices.entries.push(PriceEntry {
                    commodity: id,
                    value: system_adjusted(value, system),
                });
            }
            planets.push(prices);
        }
        systems.push(planets);
    }
    let table = PriceTable::new(systems);
    debug!(entries = table.entry_count(), "惑星の初期価格を設定しました");
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::SystemId;

    fn ore() -> Commodity {
        let mut ore = Commodity::new("Ore", 200);
        ore.planet_modifiers.push("D", 0.75);
        ore.faction_modifiers.push("Dvaered", 0.9);
        ore.population_modifier = 0.2;
        ore
    }

    #[test]
    fn class_stage_without_modifier_keeps_base_price() {
        let mut price = CommodityPrice::seeded(200);
        price.planet_variation = 7.0;
        price.sys_variation = 3.0;
        apply_planet_class(&mut price, &ore(), "M");
        assert_eq!(price.price, 200.0);
        assert_eq!(price.planet_variation, 0.5);
        assert_eq!(price.sys_variation, 0.0);

        let mut desert = CommodityPrice::seeded(200);
        apply_planet_class(&mut desert, &ore(), "D");
        assert_eq!(desert.price, 150.0);
    }

    #[test]
    fn sprite_period_uses_first_two_bytes() {
        let commodity = ore();
        let mut price = CommodityPrice::seeded(200);
        apply_sprite_period(&mut price, &commodity, "A01");
        // 'A' = 65, '0' = 48
        assert_eq!(price.planet_period, 200.0 + 100.0 + 32.0 * 1.0 + 16.0);

        apply_sprite_period(&mut price, &commodity, "");
        assert_eq!(price.planet_period, 300.0);
        apply_sprite_period(&mut price, &commodity, "b");
        assert_eq!(price.planet_period, 300.0 + 32.0 * 2.0);
    }

    #[test]
    fn short_surface_name_shrinks_period() {
        let mut price = CommodityPrice {
            planet_period: 100.0,
            ..CommodityPrice::default()
        };
        apply_surface_scale(&mut price, "city.png");
        assert!((price.planet_period - 89.0).abs() < 1e-9);
    }

    #[test]
    fn population_factor_bounds() {
        assert_eq!(population_factor(0), -1.0);
        assert!(population_factor(100_000_000).abs() < 1e-12);
        assert!(population_factor(10_000_000_000) > 0.9);
        assert!(population_factor(1) < -0.99);
    }

    #[test]
    fn presence_range_scales_price_and_period() {
        let base = CommodityPrice {
            price: 300.0,
            planet_period: 100.0,
            ..CommodityPrice::default()
        };
        let mut wide = base;
        apply_presence_range(&mut wide, 5);
        assert!((wide.price - 250.0).abs() < 1e-9);
        assert!((wide.planet_period - 120.0).abs() < 1e-9);

        let mut beyond = base;
        apply_presence_range(&mut beyond, 15);
        assert!((beyond.price - 150.0).abs() < 1e-9);
        assert!((beyond.planet_period - 200.0).abs() < 1e-9);

        let mut negative = base;
        apply_presence_range(&mut negative, -3);
        assert!((negative.price - 330.0).abs() < 1e-9);
    }

    #[test]
    fn unowned_planet_ignores_faction_table() {
        let commodity = ore();
        let mut price = CommodityPrice::seeded(200);
        apply_faction(&mut price, &commodity, None);
        assert_eq!(price.price, 200.0);
        apply_faction(&mut price, &commodity, Some("Dvaered"));
        assert!((price.price - 180.0).abs() < 1e-9);
    }

    #[test]
    fn system_stages_set_sys_period_from_jumps() {
        let mut galaxy = Galaxy::new();
        let a = galaxy.add_system("A").expect("a");
        let b = galaxy.add_system("B").expect("b");
        let c = galaxy.add_system("C").expect("c");
        galaxy.link(a, b).expect("ab");
        galaxy.link(a, c).expect("ac");
        galaxy.system_mut(a).expect("a").interference = 1_000.0;
        let system = galaxy.system(SystemId(0)).expect("system");
        let price = system_adjusted(CommodityPrice::seeded(100), system);
        assert!((price.sys_period - 2000.0 / 3.0).abs() < 1e-9);
        assert!((price.price - 110.0).abs() < 1e-9);
    }

    #[test]
    fn initialise_skips_unknown_and_duplicate_commodities() {
        let mut catalog = CommodityCatalog::new();
        catalog.insert(ore()).expect("ore");
        let mut galaxy = Galaxy::new();
        let id = galaxy.add_system("A").expect("a");
        let mut planet = Planet::new("Rock", "D");
        planet.commodities = vec!["Ore".into(), "Spice".into(), "Ore".into()];
        galaxy.add_planet(id, planet).expect("planet");

        let table = initialise_prices(&catalog, &galaxy);
        let prices = table.planet(0, "rock").expect("rock");
        assert_eq!(prices.entries.len(), 1);
    }
}
