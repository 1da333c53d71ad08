use galaxy_economy_core::{
    Commodity, CommodityCatalog, CommodityPrice, EconomyBuilder, EconomyConfig, Galaxy,
    IntensitySource, Nebula, Planet, SimTime, Simulation, SystemId, apply_planet_class,
    credits_to_string,
};

#[derive(Debug)]
struct ConstantIntensity(f64);

impl IntensitySource for ConstantIntensity {
    fn intensity(&self, _galaxy: &Galaxy, _system: SystemId, _slot: usize) -> f64 {
        self.0
    }
}

fn catalog() -> CommodityCatalog {
    let mut catalog = CommodityCatalog::new();
    catalog.insert(Commodity::new("Food", 120)).expect("food");
    catalog.insert(Commodity::new("Ore", 200)).expect("ore");
    catalog
        .insert(Commodity::new("Space Debris", 0))
        .expect("debris");
    catalog
}

fn line_galaxy() -> Galaxy {
    let mut galaxy = Galaxy::new();
    let nebula = Nebula {
        density: 120.0,
        volatility: 15.0,
    };
    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        let id = galaxy.add_system(name).expect("system");
        galaxy.set_nebula(id, nebula).expect("nebula");
        let mut planet = Planet::new(format!("{name} Prime"), "M");
        planet.population = 5_000_000;
        planet.gfx_space = "M03.png".to_string();
        planet.gfx_exterior = "paradise_city.png".to_string();
        planet.commodities = vec!["Food".to_string(), "Ore".to_string()];
        galaxy.add_planet(id, planet).expect("planet");
        ids.push(id);
    }
    galaxy.link(ids[0], ids[1]).expect("ab");
    galaxy.link(ids[1], ids[2]).expect("bc");
    galaxy
}

fn line_simulation(intensity: Box<dyn IntensitySource>) -> Simulation {
    let galaxy = line_galaxy();
    let economy = EconomyBuilder::new(catalog())
        .with_intensity(intensity)
        .build(&galaxy)
        .expect("economy");
    Simulation::from_parts(galaxy, economy).expect("simulation")
}

fn assert_uniform(sim: &Simulation, expected: f64) {
    let rows = sim.economy().solver().multipliers();
    assert_eq!(rows.len(), 3);
    for row in rows {
        assert_eq!(row.len(), 2);
        for value in row {
            assert!((value - expected).abs() < 1e-9, "{value} != {expected}");
        }
    }
}

#[test]
fn line_without_current_is_uniform() {
    let sim = line_simulation(Box::new(ConstantIntensity(0.0)));
    assert_uniform(&sim, 1.0);
}

#[test]
fn line_with_equal_current_is_uniform() {
    // Every row of G sums to the self conductance, so x = I * SELF_RES.
    let sim = line_simulation(Box::new(ConstantIntensity(0.5)));
    assert_uniform(&sim, 2.5);
}

#[test]
fn isolated_system_still_solves() {
    let mut galaxy = line_galaxy();
    galaxy.add_system("Far Away").expect("isolated");
    let economy = EconomyBuilder::new(catalog())
        .with_intensity(Box::new(ConstantIntensity(1.0)))
        .build(&galaxy)
        .expect("economy");
    let sim = Simulation::from_parts(galaxy, economy).expect("simulation");
    let isolated = sim.economy().solver().multipliers()[3].clone();
    assert!(isolated.iter().all(|m| (m - 4.0).abs() < 1e-9));
}

#[test]
fn refresh_is_idempotent() {
    let mut sim = line_simulation(Box::new(ConstantIntensity(0.25)));
    sim.refresh().expect("first");
    let first = sim.economy().solver().multipliers().to_vec();
    sim.refresh().expect("second");
    assert_eq!(first, sim.economy().solver().multipliers());
}

#[test]
fn dirty_markings_coalesce_into_one_rebuild() {
    let mut sim = line_simulation(Box::new(ConstantIntensity(0.0)));
    let galaxy = sim.galaxy().clone();
    let before = sim.economy().solver().rebuild_count();
    for _ in 0..5 {
        sim.economy_mut().mark_dirty();
    }
    assert!(sim.economy_mut().exec_queued(&galaxy).expect("exec"));
    assert!(!sim.economy_mut().exec_queued(&galaxy).expect("exec again"));
    assert_eq!(sim.economy().solver().rebuild_count(), before + 1);
}

#[test]
fn unlinking_marks_dirty_and_rebuilds_on_advance() {
    let mut sim = line_simulation(Box::new(ConstantIntensity(0.0)));
    let before = sim.economy().solver().rebuild_count();
    assert!(sim.unlink(SystemId(0), SystemId(1)).expect("unlink"));
    assert!(sim.economy().is_dirty());
    sim.advance(10_000_000).expect("advance");
    assert_eq!(sim.economy().solver().rebuild_count(), before + 1);
    let network = sim.economy().solver().network().expect("network");
    assert_eq!(network.entry(0, 1), 0.0);
    assert_uniform(&sim, 1.0);
}

#[test]
fn non_finite_intensity_keeps_previous_multipliers() {
    let mut sim = line_simulation(Box::new(ConstantIntensity(f64::NAN)));
    let report = sim.advance(1_000).expect("advance");
    assert_eq!(report.solved, 0);
    assert_eq!(report.failed, 2);
    assert!(
        sim.economy()
            .solver()
            .multipliers()
            .iter()
            .flatten()
            .all(|m| *m == 0.0)
    );
}

#[test]
fn price_query_is_pure_and_bounded() {
    let sim = Simulation::from_embedded().expect("simulation");
    let economy = sim.economy();
    for system in sim.galaxy().systems() {
        for planet in &system.planets {
            let prices = economy
                .planet_prices(system.id, &planet.name)
                .expect("planet prices");
            for entry in &prices.entries {
                let commodity = economy.catalog().commodity(entry.commodity).expect("commodity");
                if !commodity.is_priced() {
                    continue;
                }
                let low = (entry.value.price - entry.value.amplitude()).floor() as i64;
                let high = (entry.value.price + entry.value.amplitude()).ceil() as i64;
                for stp in [0.0, 1.0, 7.25, 333.0, 4_096.5] {
                    let now = SimTime::from_stp(stp);
                    let first = sim.price_at(&commodity.name, system.id, &planet.name, now);
                    let second = sim.price_at(&commodity.name, system.id, &planet.name, now);
                    assert_eq!(first, second);
                    assert!(
                        (low..=high).contains(&first),
                        "{} on {}: {first} outside {low}..={high}",
                        commodity.name,
                        planet.name
                    );
                }
            }
        }
    }
}

#[test]
fn unknown_or_unsold_commodity_prices_at_zero() {
    let sim = Simulation::from_embedded().expect("simulation");
    let system = sim.galaxy().systems()[0].id;
    let planet = sim.galaxy().systems()[0].planets[0].name.clone();
    assert_eq!(sim.price("Unobtainium", system, &planet), 0);
    assert_eq!(sim.price("Space Debris", system, &planet), 0);
}

#[test]
fn class_stage_scenario() {
    let mut commodity = Commodity::new("Ore", 100);
    commodity.planet_modifiers.push("X", 2.0);
    let mut price = CommodityPrice::seeded(100);
    apply_planet_class(&mut price, &commodity, "X");
    assert_eq!(price.price, 200.0);
    assert_eq!(price.planet_variation, 0.5);
    assert_eq!(price.sys_variation, 0.0);
}

#[test]
fn credit_strings() {
    assert_eq!(credits_to_string(999, 2), "999");
    assert_eq!(credits_to_string(1_500_000, 1), "1.5M");
    assert_eq!(credits_to_string(1_500_000_000_000, -1), "1500000000000");
}

#[test]
fn embedded_config_round_trips_through_simulation() {
    let config = EconomyConfig::from_embedded().expect("config");
    let galaxy = Galaxy::from_embedded().expect("galaxy");
    let catalog = CommodityCatalog::from_embedded().expect("catalog");
    let priced = catalog.priced().len();
    let sim = Simulation::new(galaxy, catalog, config).expect("simulation");
    assert_eq!(sim.economy().solver().priced_count(), priced);
    assert!(sim.economy().is_initialised());
}
