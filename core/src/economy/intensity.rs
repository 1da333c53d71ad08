use std::f64::consts::TAU;
use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::constants::PRODUCTION_SIGMA_CLIP;
use crate::config::{EconomyConfig, IntensityMode, ProductionParams};
use crate::galaxy::{Galaxy, SystemId};
use crate::time::SimTime;

/// Current injected into each node of the price network.
pub trait IntensitySource: fmt::Debug {
    /// Called once per solver update before any commodity is solved.
    fn prepare(&mut self, _dt: i64, _galaxy: &Galaxy) {}

    /// Intensity of `system` for the priced commodity at `slot`.
    fn intensity(&self, galaxy: &Galaxy, system: SystemId, slot: usize) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroIntensity;

impl IntensitySource for ZeroIntensity {
    fn intensity(&self, _galaxy: &Galaxy, _system: SystemId, _slot: usize) -> f64 {
        0.0
    }
}

/// Planet production factors drifting around 1, weighted by the square root
/// of population.
#[derive(Debug)]
pub struct ProductionIntensity {
    params: ProductionParams,
    rng: StdRng,
    factors: Vec<Vec<f64>>,
}

impl ProductionIntensity {
    pub fn new(params: ProductionParams) -> Self {
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            params,
            rng,
            factors: Vec::new(),
        }
    }

    pub fn factor(&self, system: SystemId, planet: usize) -> f64 {
        self.factors
            .get(system.index())
            .and_then(|planets| planets.get(planet))
            .copied()
            .unwrap_or(1.0)
    }

    fn sync_shape(&mut self, galaxy: &Galaxy) {
        self.factors.resize_with(galaxy.system_count(), Vec::new);
        for (factors, system) in self.factors.iter_mut().zip(galaxy.systems()) {
            factors.resize(system.planets.len(), 1.0);
        }
    }

    fn gaussian(&mut self) -> f64 {
        let u1: f64 = self.rng.gen_range(f64::EPSILON..1.0);
        let u2: f64 = self.rng.gen_range(0.0..1.0);
        let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
        z.clamp(-PRODUCTION_SIGMA_CLIP, PRODUCTION_SIGMA_CLIP)
    }
}

impl IntensitySource for ProductionIntensity {
    fn prepare(&mut self, dt: i64, galaxy: &Galaxy) {
        self.sync_shape(galaxy);
        if dt <= 0 {
            return;
        }
        let ddt = SimTime::from_ntime(dt).as_stp();
        let variability = self.params.variability;
        for system in galaxy.systems() {
            for (index, planet) in system.planets.iter().enumerate() {
                if !planet.is_inhabited() {
                    continue;
                }
                let noise = self.gaussian();
                let factor = &mut self.factors[system.id.index()][index];
                let mut next = *factor + variability * noise * ddt;
                next -= variability * (next - 1.0) * ddt;
                *factor = next;
            }
        }
    }

    fn intensity(&self, galaxy: &Galaxy, system: SystemId, _slot: usize) -> f64 {
        let Some(star) = galaxy.system(system) else {
            return 0.0;
        };
        let production: f64 = star
            .planets
            .iter()
            .enumerate()
            .filter(|(_, planet)| planet.is_inhabited())
            .map(|(index, planet)| self.factor(system, index) * (planet.population as f64).sqrt())
            .sum();
        production / self.params.modifier
    }
}

pub fn intensity_from_config(config: &EconomyConfig) -> Box<dyn IntensitySource> {
    match config.intensity {
        IntensityMode::Zero => Box::new(ZeroIntensity),
        IntensityMode::Production => Box::new(ProductionIntensity::new(config.production.clone())),
    }
}
