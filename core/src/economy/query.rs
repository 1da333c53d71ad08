use tracing::warn;

use super::catalog::CommodityCatalog;
use super::credits::{Credits, clamp_credits};
use super::model::PriceTable;
use crate::galaxy::SystemId;
use crate::time::SimTime;

/// Price of `commodity` on `planet` at `now`, rounded to whole credits.
///
/// Returns 0 with a warning when the commodity is unpriced or the planet does
/// not trade it.
pub fn price_at(
    catalog: &CommodityCatalog,
    prices: &PriceTable,
    commodity: &str,
    system: SystemId,
    planet: &str,
    now: SimTime,
) -> Credits {
    let Some(id) = catalog.id_of(commodity) else {
        warn!(commodity, "価格が不明な商品です");
        return 0;
    };
    if catalog.priced_slot(id).is_none() {
        warn!(commodity, "価格が不明な商品です");
        return 0;
    }
    let Some(value) = prices
        .planet(system.index(), planet)
        .and_then(|planet_prices| planet_prices.get(id))
    else {
        warn!(commodity, planet, "この惑星では商品の価格が不明です");
        return 0;
    };
    clamp_credits(value.evaluate(now.as_stp()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::model::{Commodity, CommodityPrice, PlanetPrices, PriceEntry};

    fn fixture() -> (CommodityCatalog, PriceTable) {
        let mut catalog = CommodityCatalog::new();
        let ore = catalog.insert(Commodity::new("Ore", 200)).expect("ore");
        let debris = catalog
            .insert(Commodity::new("Space Debris", 0))
            .expect("debris");
        let value = CommodityPrice {
            price: 210.0,
            planet_variation: 10.0,
            sys_variation: 4.0,
            planet_period: 400.0,
            sys_period: 1000.0,
        };
        let table = PriceTable::new(vec![vec![PlanetPrices {
            planet: "Alteris II".to_string(),
            entries: vec![
                PriceEntry {
                    commodity: ore,
                    value,
                },
                PriceEntry {
                    commodity: debris,
                    value,
                },
            ],
        }]]);
        (catalog, table)
    }

    #[test]
    fn price_at_start_is_rounded_base() {
        let (catalog, table) = fixture();
        let price = price_at(&catalog, &table, "Ore", SystemId(0), "Alteris II", SimTime::ZERO);
        assert_eq!(price, 210);
    }

    #[test]
    fn price_stays_within_amplitude() {
        let (catalog, table) = fixture();
        for stp in [0.0, 13.7, 100.0, 250.5, 1_234.5, 99_999.0] {
            let now = SimTime::from_stp(stp);
            let first = price_at(&catalog, &table, "Ore", SystemId(0), "Alteris II", now);
            let second = price_at(&catalog, &table, "Ore", SystemId(0), "Alteris II", now);
            assert_eq!(first, second);
            assert!((196..=224).contains(&first), "{first} at {stp}");
        }
    }

    #[test]
    fn quarter_period_peaks() {
        let (catalog, table) = fixture();
        let now = SimTime::from_stp(100.0);
        let price = price_at(&catalog, &table, "Ore", SystemId(0), "Alteris II", now);
        let expected = 210.0 + 10.0 + 4.0 * (std::f64::consts::TAU * 0.1).sin();
        assert_eq!(price, expected.round() as Credits);
    }

    #[test]
    fn misses_return_zero() {
        let (catalog, table) = fixture();
        let now = SimTime::ZERO;
        assert_eq!(price_at(&catalog, &table, "Space Debris", SystemId(0), "Alteris II", now), 0);
        assert_eq!(price_at(&catalog, &table, "Spice", SystemId(0), "Alteris II", now), 0);
        assert_eq!(price_at(&catalog, &table, "Ore", SystemId(0), "Nowhere", now), 0);
        assert_eq!(price_at(&catalog, &table, "Ore", SystemId(3), "Alteris II", now), 0);
    }
}
