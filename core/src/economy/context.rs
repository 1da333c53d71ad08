use anyhow::{Context, Result, ensure};
use tracing::info;

use super::catalog::CommodityCatalog;
use super::credits::Credits;
use super::intensity::{IntensitySource, intensity_from_config};
use super::model::{CommodityId, PlanetPrices, PriceTable};
use super::pricing::initialise_prices;
use super::query::price_at;
use super::smoothing::smooth;
use super::solver::{NodalSolver, SolveReport};
use crate::config::EconomyConfig;
use crate::galaxy::{Galaxy, SystemId};
use crate::time::SimTime;

/// Prices the galaxy once and wires up the nodal solver.
pub struct EconomyBuilder {
    catalog: CommodityCatalog,
    config: EconomyConfig,
    intensity: Option<Box<dyn IntensitySource>>,
}

impl EconomyBuilder {
    pub fn new(catalog: CommodityCatalog) -> Self {
        Self {
            catalog,
            config: EconomyConfig::default(),
            intensity: None,
        }
    }

    pub fn with_config(mut self, config: EconomyConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the source chosen by the config's intensity mode.
    pub fn with_intensity(mut self, intensity: Box<dyn IntensitySource>) -> Self {
        self.intensity = Some(intensity);
        self
    }

    pub fn build(self, galaxy: &Galaxy) -> Result<Economy> {
        let EconomyBuilder {
            mut catalog,
            config,
            intensity,
        } = self;
        ensure!(!catalog.is_empty(), "商品カタログが空です");
        config.validate().context("経済設定が不正です")?;

        let initial = initialise_prices(&catalog, galaxy);
        let prices = smooth(galaxy, &initial);
        catalog.release_modifiers();

        let intensity = intensity.unwrap_or_else(|| intensity_from_config(&config));
        let solver = NodalSolver::new(config.clone(), catalog.priced().len(), intensity);
        info!(
            systems = galaxy.system_count(),
            commodities = catalog.len(),
            priced = catalog.priced().len(),
            "経済を構築しました"
        );
        Ok(Economy {
            config,
            catalog,
            prices,
            solver,
        })
    }
}

/// Owns every piece of economy state: catalog, smoothed planet prices and
/// the nodal solver.
#[derive(Debug)]
pub struct Economy {
    config: EconomyConfig,
    catalog: CommodityCatalog,
    prices: PriceTable,
    solver: NodalSolver,
}

impl Economy {
    pub fn initialise(&mut self, galaxy: &Galaxy) -> Result<()> {
        self.solver
            .initialize(galaxy)
            .context("経済の初期化に失敗しました")
    }

    pub fn is_initialised(&self) -> bool {
        self.solver.is_initialized()
    }

    pub fn mark_dirty(&mut self) {
        self.solver.mark_dirty();
    }

    pub fn is_dirty(&self) -> bool {
        self.solver.is_dirty()
    }

    pub fn exec_queued(&mut self, galaxy: &Galaxy) -> Result<bool> {
        self.solver.exec_queued(galaxy)
    }

    pub fn refresh(&mut self, galaxy: &Galaxy) -> Result<()> {
        self.solver.refresh(galaxy)
    }

    pub fn update(&mut self, dt: i64, galaxy: &Galaxy) -> Result<SolveReport> {
        self.solver.update(dt, galaxy)
    }

    pub fn destroy(&mut self) {
        self.solver.destroy();
    }

    pub fn price(&self, commodity: &str, system: SystemId, planet: &str, now: SimTime) -> Credits {
        price_at(&self.catalog, &self.prices, commodity, system, planet, now)
    }

    pub fn planet_prices(&self, system: SystemId, planet: &str) -> Option<&PlanetPrices> {
        self.prices.planet(system.index(), planet)
    }

    /// Nodal multiplier of a priced commodity in a system.
    pub fn multiplier(&self, commodity: CommodityId, system: SystemId) -> Option<f64> {
        let slot = self.catalog.priced_slot(commodity)?;
        self.solver.multiplier(system, slot)
    }

    pub fn catalog(&self) -> &CommodityCatalog {
        &self.catalog
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    pub fn solver(&self) -> &NodalSolver {
        &self.solver
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn solver_mut(&mut self) -> &mut NodalSolver {
        &mut self.solver
    }
}
