use anyhow::{Result, ensure};
use tracing::{debug, warn};

use crate::config::EconomyConfig;
use crate::economy::{CommodityCatalog, Credits, Economy, EconomyBuilder, SolveReport};
use crate::galaxy::{FactionId, Galaxy, Nebula, SystemId};
use crate::time::{GalaxyClock, SimTime};

/// Galaxy, economy and clock advanced together.
#[derive(Debug)]
pub struct Simulation {
    galaxy: Galaxy,
    economy: Economy,
    clock: GalaxyClock,
}

impl Simulation {
    pub fn new(galaxy: Galaxy, catalog: CommodityCatalog, config: EconomyConfig) -> Result<Self> {
        let economy = EconomyBuilder::new(catalog)
            .with_config(config)
            .build(&galaxy)?;
        Self::from_parts(galaxy, economy)
    }

    pub fn from_parts(galaxy: Galaxy, mut economy: Economy) -> Result<Self> {
        economy.initialise(&galaxy)?;
        Ok(Self {
            galaxy,
            economy,
            clock: GalaxyClock::new(),
        })
    }

    pub fn from_embedded() -> Result<Self> {
        Self::new(
            Galaxy::from_embedded()?,
            CommodityCatalog::from_embedded()?,
            EconomyConfig::from_embedded()?,
        )
    }

    /// Applies pending topology changes, then steps the solver by `dt` ntime.
    ///
    /// A failed rebuild leaves the previous network in service and stays
    /// queued; time still advances.
    pub fn advance(&mut self, dt: i64) -> Result<SolveReport> {
        ensure!(dt >= 0, "経過時間に負数は指定できません: {}", dt);
        if let Err(err) = self.economy.exec_queued(&self.galaxy) {
            warn!(error = %format!("{err:#}"), "再構築に失敗したため旧ネットワークで継続します");
        }
        let report = self.economy.update(dt, &self.galaxy)?;
        let now = self.clock.advance(dt)?;
        debug!(%now, solved = report.solved, failed = report.failed, "時間を進めました");
        Ok(report)
    }

    pub fn refresh(&mut self) -> Result<()> {
        self.economy.refresh(&self.galaxy)
    }

    pub fn link(&mut self, a: SystemId, b: SystemId) -> Result<()> {
        self.galaxy.link(a, b)?;
        self.economy.mark_dirty();
        Ok(())
    }

    pub fn unlink(&mut self, a: SystemId, b: SystemId) -> Result<bool> {
        let removed = self.galaxy.unlink(a, b)?;
        if removed {
            self.economy.mark_dirty();
        }
        Ok(removed)
    }

    pub fn set_nebula(&mut self, system: SystemId, nebula: Nebula) -> Result<()> {
        self.galaxy.set_nebula(system, nebula)?;
        self.economy.mark_dirty();
        Ok(())
    }

    pub fn set_system_faction(
        &mut self,
        system: SystemId,
        faction: Option<FactionId>,
    ) -> Result<()> {
        self.galaxy.set_system_faction(system, faction)?;
        self.economy.mark_dirty();
        Ok(())
    }

    /// Current price on a planet.
    pub fn price(&self, commodity: &str, system: SystemId, planet: &str) -> Credits {
        self.price_at(commodity, system, planet, self.clock.now())
    }

    pub fn price_at(
        &self,
        commodity: &str,
        system: SystemId,
        planet: &str,
        now: SimTime,
    ) -> Credits {
        self.economy.price(commodity, system, planet, now)
    }

    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn galaxy(&self) -> &Galaxy {
        &self.galaxy
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn economy_mut(&mut self) -> &mut Economy {
        &mut self.economy
    }

    pub fn destroy(&mut self) {
        self.economy.destroy();
    }
}
