use anyhow::{Context, Result, anyhow, ensure};
use tracing::{debug, warn};

use super::constants::{SOLUTION_OFFSET, SOLUTION_SCALE};
use super::intensity::IntensitySource;
use super::network::AdmittanceMatrix;
use crate::config::EconomyConfig;
use crate::galaxy::{Galaxy, SystemId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveReport {
    pub solved: usize,
    pub failed: usize,
}

impl SolveReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Nodal analysis of the jump network, one solve per priced commodity.
///
/// Results are kept as `multipliers[system][slot]`, where `slot` indexes the
/// catalog's priced list.
#[derive(Debug)]
pub struct NodalSolver {
    config: EconomyConfig,
    intensity: Box<dyn IntensitySource>,
    network: Option<AdmittanceMatrix>,
    multipliers: Vec<Vec<f64>>,
    priced: usize,
    initialized: bool,
    dirty: bool,
    rebuilds: usize,
}

impl NodalSolver {
    pub fn new(config: EconomyConfig, priced: usize, intensity: Box<dyn IntensitySource>) -> Self {
        Self {
            config,
            intensity,
            network: None,
            multipliers: Vec::new(),
            priced,
            initialized: false,
            dirty: false,
            rebuilds: 0,
        }
    }

    /// Allocates the result arrays and runs the first refresh. Repeated calls
    /// do nothing.
    pub fn initialize(&mut self, galaxy: &Galaxy) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.multipliers = vec![vec![0.0; self.priced]; galaxy.system_count()];
        self.initialized = true;
        if let Err(err) = self.refresh(galaxy) {
            self.network = None;
            self.multipliers = Vec::new();
            self.initialized = false;
            return Err(err);
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Runs one refresh if a rebuild was requested. Returns whether it ran.
    pub fn exec_queued(&mut self, galaxy: &Galaxy) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.rebuild(galaxy)
    }

    pub fn refresh(&mut self, galaxy: &Galaxy) -> Result<()> {
        self.rebuild(galaxy).map(|_| ())
    }

    fn rebuild(&mut self, galaxy: &Galaxy) -> Result<bool> {
        if !self.initialized {
            return Ok(false);
        }
        let network = match AdmittanceMatrix::build(galaxy, &self.config) {
            Ok(network) => network,
            Err(err) => {
                warn!(error = %err, "アドミタンス行列の再構築に失敗したため旧行列を維持します");
                return Err(err).context("経済ネットワークの再構築に失敗しました");
            }
        };
        self.network = Some(network);
        self.rebuilds += 1;
        debug!(rebuilds = self.rebuilds, "経済ネットワークを再構築しました");
        self.update(0, galaxy)?;
        self.dirty = false;
        Ok(true)
    }

    /// Advances the network by `dt` ntime. A commodity whose solve fails keeps
    /// its previous multipliers.
    pub fn update(&mut self, dt: i64, galaxy: &Galaxy) -> Result<SolveReport> {
        if !self.initialized {
            return Ok(SolveReport::default());
        }
        let network = self
            .network
            .as_ref()
            .ok_or_else(|| anyhow!("経済ネットワークが構築されていません"))?;
        let n = galaxy.system_count();
        ensure!(
            network.dimension() == n,
            "経済ネットワークの次元 {} が星系数 {} と一致しません",
            network.dimension(),
            n
        );

        let priced = self.priced;
        self.multipliers.resize_with(n, || vec![0.0; priced]);
        self.intensity.prepare(dt, galaxy);

        let mut report = SolveReport::default();
        let mut rhs = vec![0.0; n];
        for slot in 0..priced {
            for (index, value) in rhs.iter_mut().enumerate() {
                *value = self.intensity.intensity(galaxy, SystemId(index), slot);
            }
            match network.solve(&rhs) {
                Ok(solution) if solution.iter().all(|x| x.is_finite()) => {
                    for (row, x) in self.multipliers.iter_mut().zip(solution) {
                        row[slot] = x * SOLUTION_SCALE + SOLUTION_OFFSET;
                    }
                    report.solved += 1;
                }
                Ok(_) => {
                    warn!(slot, "経済方程式の解が有限値ではありません");
                    report.failed += 1;
                }
                Err(err) => {
                    warn!(slot, error = %err, "経済方程式を解けませんでした");
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    /// Releases the network and result arrays.
    pub fn destroy(&mut self) {
        if !self.initialized {
            return;
        }
        self.network = None;
        self.multipliers = Vec::new();
        self.initialized = false;
    }

    pub fn multiplier(&self, system: SystemId, slot: usize) -> Option<f64> {
        self.multipliers
            .get(system.index())
            .and_then(|row| row.get(slot))
            .copied()
    }

    pub fn multipliers(&self) -> &[Vec<f64>] {
        &self.multipliers
    }

    pub fn network(&self) -> Option<&AdmittanceMatrix> {
        self.network.as_ref()
    }

    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }

    pub fn priced_count(&self) -> usize {
        self.priced
    }

    #[cfg(test)]
    pub(crate) fn config_mut(&mut self) -> &mut EconomyConfig {
        &mut self.config
    }
}
