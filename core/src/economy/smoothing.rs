//! Cross-system smoothing of the initial prices.
//!
//! Three galaxy-wide sweeps, each finishing for every system before the next
//! starts: in-system averaging, neighbour means, then blending.

use super::constants::{
    AVERAGE_PRICE_WEIGHT, OWN_PRICE_WEIGHT, PLANET_VARIATION_SHARE, SYS_VARIATION_SHARE,
};
use super::model::{CommodityId, PlanetPrices, PriceTable};
use crate::galaxy::Galaxy;

/// Mean of one commodity over the planets of one system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemAverage {
    pub commodity: CommodityId,
    pub count: usize,
    pub price: f64,
    pub planet_variation: f64,
    pub sys_variation: f64,
    pub planet_period: f64,
    pub sys_period: f64,
}

/// Averages per system, in order of first appearance.
pub type SystemAverages = Vec<Vec<SystemAverage>>;

fn find_average(averages: &[SystemAverage], commodity: CommodityId) -> Option<&SystemAverage> {
    averages.iter().find(|average| average.commodity == commodity)
}

fn collect_averages(planets: &[PlanetPrices]) -> Vec<SystemAverage> {
    let mut averages: Vec<SystemAverage> = Vec::new();
    for entry in planets.iter().flat_map(|planet| &planet.entries) {
        let value = &entry.value;
        match averages
            .iter_mut()
            .find(|average| average.commodity == entry.commodity)
        {
            Some(average) => {
                average.count += 1;
                average.price += value.price;
                average.planet_variation += value.planet_variation;
                average.sys_variation += value.sys_variation;
                average.planet_period += value.planet_period;
                average.sys_period += value.sys_period;
            }
            None => averages.push(SystemAverage {
                commodity: entry.commodity,
                count: 1,
                price: value.price,
                planet_variation: value.planet_variation,
                sys_variation: value.sys_variation,
                planet_period: value.planet_period,
                sys_period: value.sys_period,
            }),
        }
    }
    for average in &mut averages {
        let count = average.count as f64;
        average.price /= count;
        average.planet_variation /= count;
        average.sys_variation /= count;
        average.planet_period /= count;
        average.sys_period /= count;
    }
    averages
}

/// Sweep 1: pulls every planet price towards its system mean.
pub fn average_within_systems(table: &PriceTable) -> (PriceTable, SystemAverages) {
    let mut systems = table.systems().to_vec();
    let mut all = Vec::with_capacity(systems.len());
    for planets in &mut systems {
        let averages = collect_averages(planets);
        for entry in planets.iter_mut().flat_map(|planet| &mut planet.entries) {
            if let Some(average) = find_average(&averages, entry.commodity) {
                entry.value.price =
                    OWN_PRICE_WEIGHT * entry.value.price + AVERAGE_PRICE_WEIGHT * average.price;
                entry.value.sys_variation = SYS_VARIATION_SHARE * average.planet_variation;
            }
        }
        all.push(averages);
    }
    (PriceTable::new(systems), all)
}

/// Sweep 2: mean of the neighbouring systems' average price for each of a
/// system's commodities, or its own average when no neighbour trades it.
pub fn neighbour_means(galaxy: &Galaxy, averages: &SystemAverages) -> Vec<Vec<f64>> {
    averages
        .iter()
        .enumerate()
        .map(|(index, own)| {
            let neighbours = galaxy
                .systems()
                .get(index)
                .map(|system| system.jumps())
                .unwrap_or(&[]);
            own.iter()
                .map(|average| {
                    let (sum, n) = neighbours
                        .iter()
                        .filter_map(|target| averages.get(target.index()))
                        .filter_map(|theirs| find_average(theirs, average.commodity))
                        .fold((0.0, 0usize), |(sum, n), theirs| (sum + theirs.price, n + 1));
                    if n == 0 { average.price } else { sum / n as f64 }
                })
                .collect()
        })
        .collect()
}

/// Sweep 3: blends system averages with their neighbour means and scales the
/// variations into credits.
pub fn blend_with_neighbours(
    table: &PriceTable,
    averages: &SystemAverages,
    means: &[Vec<f64>],
) -> PriceTable {
    let mut systems = table.systems().to_vec();
    for (index, planets) in systems.iter_mut().enumerate() {
        let Some(own) = averages.get(index) else {
            continue;
        };
        let blended: Vec<SystemAverage> = own
            .iter()
            .enumerate()
            .map(|(position, average)| {
                let mean = means
                    .get(index)
                    .and_then(|row| row.get(position))
                    .copied()
                    .unwrap_or(average.price);
                SystemAverage {
                    price: 0.5 * (average.price + mean),
                    ..*average
                }
            })
            .collect();
        for entry in planets.iter_mut().flat_map(|planet| &mut planet.entries) {
            let Some(average) = find_average(&blended, entry.commodity) else {
                continue;
            };
            let value = &mut entry.value;
            value.price = OWN_PRICE_WEIGHT * value.price + AVERAGE_PRICE_WEIGHT * average.price;
            value.planet_variation = PLANET_VARIATION_SHARE
                * (0.5 * average.planet_variation + 0.5 * value.planet_variation);
            value.planet_variation *= value.price;
            value.sys_variation *= value.price;
        }
    }
    PriceTable::new(systems)
}

/// Runs the three sweeps. The averages are dropped on return.
pub fn smooth(galaxy: &Galaxy, table: &PriceTable) -> PriceTable {
    let (averaged, averages) = average_within_systems(table);
    let means = neighbour_means(galaxy, &averages);
    blend_with_neighbours(&averaged, &averages, &means)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::model::{CommodityPrice, PriceEntry};

    const ORE: CommodityId = CommodityId(0);
    const FOOD: CommodityId = CommodityId(1);

    fn entry(commodity: CommodityId, price: f64, planet_variation: f64) -> PriceEntry {
        PriceEntry {
            commodity,
            value: CommodityPrice {
                price,
                planet_variation,
                sys_variation: 0.0,
                planet_period: 300.0,
                sys_period: 1000.0,
            },
        }
    }

    fn planet(name: &str, entries: Vec<PriceEntry>) -> PlanetPrices {
        PlanetPrices {
            planet: name.to_string(),
            entries,
        }
    }

    #[test]
    fn sweep_one_pulls_towards_system_mean() {
        let table = PriceTable::new(vec![vec![
            planet("a", vec![entry(ORE, 100.0, 0.2)]),
            planet("b", vec![entry(ORE, 300.0, 0.4), entry(FOOD, 50.0, 0.5)]),
        ]]);
        let (averaged, averages) = average_within_systems(&table);
        assert_eq!(averages[0].len(), 2);
        assert_eq!(averages[0][0].count, 2);
        assert!((averages[0][0].price - 200.0).abs() < 1e-12);

        let a = averaged.planet(0, "a").expect("a").get(ORE).expect("ore");
        assert!((a.price - 175.0).abs() < 1e-12);
        assert!((a.sys_variation - 0.06).abs() < 1e-12);
        let food = averaged.planet(0, "b").expect("b").get(FOOD).expect("food");
        assert!((food.price - 50.0).abs() < 1e-12);
        assert_eq!(table.planet(0, "a").expect("a").get(ORE).expect("ore").price, 100.0);
    }

    #[test]
    fn neighbour_mean_falls_back_to_own_price() {
        let mut galaxy = Galaxy::new();
        let a = galaxy.add_system("A").expect("a");
        let b = galaxy.add_system("B").expect("b");
        galaxy.add_system("C").expect("c");
        galaxy.link(a, b).expect("link");

        let table = PriceTable::new(vec![
            vec![planet("a", vec![entry(ORE, 100.0, 0.5)])],
            vec![planet("b", vec![entry(ORE, 300.0, 0.5), entry(FOOD, 80.0, 0.5)])],
            vec![planet("c", vec![entry(ORE, 900.0, 0.5)])],
        ]);
        let (_, averages) = average_within_systems(&table);
        let means = neighbour_means(&galaxy, &averages);
        assert_eq!(means[0], vec![300.0]);
        assert_eq!(means[1], vec![100.0, 80.0]);
        assert_eq!(means[2], vec![900.0]);
    }

    #[test]
    fn full_pass_scales_variations_into_credits() {
        let mut galaxy = Galaxy::new();
        let a = galaxy.add_system("A").expect("a");
        let b = galaxy.add_system("B").expect("b");
        galaxy.link(a, b).expect("link");
        let table = PriceTable::new(vec![
            vec![planet("a", vec![entry(ORE, 100.0, 0.5)])],
            vec![planet("b", vec![entry(ORE, 300.0, 0.5)])],
        ]);
        let smoothed = smooth(&galaxy, &table);
        let a = smoothed.planet(0, "a").expect("a").get(ORE).expect("ore");
        // sweep 3: avg = 0.5 * (100 + 300) = 200, price = 0.25 * 100 + 0.75 * 200
        assert!((a.price - 175.0).abs() < 1e-12);
        assert!((a.planet_variation - 0.05 * 175.0).abs() < 1e-12);
        assert!((a.sys_variation - 0.1 * 175.0).abs() < 1e-12);
        assert_eq!(a.planet_period, 300.0);
        assert_eq!(a.sys_period, 1000.0);
    }
}
