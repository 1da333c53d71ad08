use std::collections::BTreeSet;
use std::fmt;

use nalgebra::DMatrix;
use nalgebra_sparse::factorization::CscCholesky;
use nalgebra_sparse::{CooMatrix, CscMatrix};
use thiserror::Error;
use tracing::debug;

use crate::config::EconomyConfig;
use crate::galaxy::{Galaxy, Stance, StarSystem};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NetworkError {
    #[error("ジャンプ抵抗が不正です: {from} -> {to} ({value})")]
    InvalidResistance { from: usize, to: usize, value: f64 },
    #[error("ジャンプ先の星系が存在しません: {from} -> {to}")]
    UnknownJumpTarget { from: usize, to: usize },
    #[error("アドミタンス行列のセルを設定できません: {0}")]
    CellInsertion(String),
    #[error("アドミタンス行列の分解に失敗しました: {0}")]
    Factorization(String),
    #[error("右辺ベクトルの次元が一致しません: 期待値 {expected}, 実際 {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Resistance of the route between two systems. Symmetric in its arguments.
///
/// The result never drops below `min_resistance`; NaN inputs stay NaN so
/// the caller can reject them.
pub fn jump_resistance(
    config: &EconomyConfig,
    galaxy: &Galaxy,
    a: &StarSystem,
    b: &StarSystem,
) -> f64 {
    let mut resistance = config.base_resistance;
    resistance += (a.nebula.density + b.nebula.density) * config.density_weight;
    resistance += (a.nebula.volatility + b.nebula.volatility) * config.volatility_weight;

    if let (Some(fa), Some(fb)) = (a.faction, b.faction) {
        let shift = config.faction_modifier * config.base_resistance;
        match galaxy.stance(fa, fb) {
            Stance::Hostile => resistance += shift,
            Stance::Allied => resistance -= shift,
            Stance::Neutral => {}
        }
    }

    if resistance.is_nan() {
        resistance
    } else {
        resistance.max(config.min_resistance)
    }
}

/// Symmetric positive definite conductance matrix of the jump network,
/// factored once per build.
pub struct AdmittanceMatrix {
    matrix: CscMatrix<f64>,
    factor: Option<CscCholesky<f64>>,
    self_conductance: f64,
}

impl AdmittanceMatrix {
    pub fn build(galaxy: &Galaxy, config: &EconomyConfig) -> Result<Self, NetworkError> {
        let n = galaxy.system_count();
        let self_conductance = config.self_conductance();

        let mut routes = BTreeSet::new();
        for system in galaxy.systems() {
            let from = system.id.index();
            for target in system.jumps() {
                let to = target.index();
                if to >= n {
                    return Err(NetworkError::UnknownJumpTarget { from, to });
                }
                if from != to {
                    routes.insert((from.min(to), from.max(to)));
                }
            }
        }

        let capacity = n + routes.len() * 4;
        let mut rows = Vec::with_capacity(capacity);
        let mut cols = Vec::with_capacity(capacity);
        let mut values = Vec::with_capacity(capacity);
        for i in 0..n {
            rows.push(i);
            cols.push(i);
            values.push(self_conductance);
        }

        let systems = galaxy.systems();
        for &(i, j) in &routes {
            let resistance = jump_resistance(config, galaxy, &systems[i], &systems[j]);
            if resistance == f64::INFINITY {
                debug!(from = i, to = j, "抵抗が無限大のため航路を遮断として扱います");
                continue;
            }
            if resistance.is_nan() || resistance <= 0.0 {
                return Err(NetworkError::InvalidResistance {
                    from: i,
                    to: j,
                    value: resistance,
                });
            }
            let conductance = 1.0 / resistance;
            for (r, c, v) in [
                (i, j, -conductance),
                (j, i, -conductance),
                (i, i, conductance),
                (j, j, conductance),
            ] {
                rows.push(r);
                cols.push(c);
                values.push(v);
            }
        }

        let coo = CooMatrix::try_from_triplets(n, n, rows, cols, values)
            .map_err(|err| NetworkError::CellInsertion(format!("{err:?}")))?;
        let matrix = CscMatrix::from(&coo);
        let factor = if n == 0 {
            None
        } else {
            Some(
                CscCholesky::factor(&matrix)
                    .map_err(|err| NetworkError::Factorization(format!("{err:?}")))?,
            )
        };

        debug!(
            systems = n,
            routes = routes.len(),
            nnz = matrix.nnz(),
            "アドミタンス行列を構築しました"
        );
        Ok(Self {
            matrix,
            factor,
            self_conductance,
        })
    }

    pub fn dimension(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn matrix(&self) -> &CscMatrix<f64> {
        &self.matrix
    }

    pub fn self_conductance(&self) -> f64 {
        self.self_conductance
    }

    /// Value stored at (row, col), 0 for structural zeros.
    pub fn entry(&self, row: usize, col: usize) -> f64 {
        self.matrix
            .triplet_iter()
            .filter(|(r, c, _)| *r == row && *c == col)
            .map(|(_, _, v)| *v)
            .sum()
    }

    /// Solves `G x = rhs`.
    pub fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>, NetworkError> {
        let n = self.dimension();
        if rhs.len() != n {
            return Err(NetworkError::DimensionMismatch {
                expected: n,
                actual: rhs.len(),
            });
        }
        let Some(factor) = &self.factor else {
            return Ok(Vec::new());
        };
        let b = DMatrix::from_column_slice(n, 1, rhs);
        let x = factor.solve(&b);
        Ok(x.column(0).iter().copied().collect())
    }
}

impl fmt::Debug for AdmittanceMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmittanceMatrix")
            .field("dimension", &self.dimension())
            .field("nnz", &self.matrix.nnz())
            .field("factored", &self.factor.is_some())
            .field("self_conductance", &self.self_conductance)
            .finish()
    }
}
