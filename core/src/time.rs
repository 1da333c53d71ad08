use std::fmt;

use anyhow::{Result, ensure};

/// ntime units in one Standard Time Unit.
pub const NTIME_PER_STU: i64 = 1_000;
/// STU in one Standard Time Period. Taking off and landing takes about one STP.
pub const STU_PER_STP: i64 = 10_000;
/// STP in one Standard Cycle Unit.
pub const STP_PER_SCU: i64 = 5_000;

const NTIME_PER_STP: i64 = NTIME_PER_STU * STU_PER_STP;
const NTIME_PER_SCU: i64 = NTIME_PER_STP * STP_PER_SCU;

/// Opaque simulated time, counted in ntime units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimTime(i64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    pub const fn from_ntime(ntime: i64) -> Self {
        Self(ntime)
    }

    pub fn from_stp(stp: f64) -> Self {
        Self((stp * NTIME_PER_STP as f64).round() as i64)
    }

    pub const fn ntime(self) -> i64 {
        self.0
    }

    pub fn as_stu(self) -> f64 {
        self.0 as f64 / NTIME_PER_STU as f64
    }

    pub fn as_stp(self) -> f64 {
        self.as_stu() / STU_PER_STP as f64
    }

    pub fn saturating_add(self, ntime: i64) -> Self {
        Self(self.0.saturating_add(ntime))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scu = self.0.div_euclid(NTIME_PER_SCU);
        let stp = self.0.rem_euclid(NTIME_PER_SCU) / NTIME_PER_STP;
        let stu = self.0.rem_euclid(NTIME_PER_STP) / NTIME_PER_STU;
        write!(f, "UST {}:{:04}.{:04}", scu, stp, stu)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GalaxyClock {
    now: SimTime,
}

impl GalaxyClock {
    pub fn new() -> Self {
        Self { now: SimTime::ZERO }
    }

    pub fn starting_at(now: SimTime) -> Self {
        Self { now }
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn advance(&mut self, ntime: i64) -> Result<SimTime> {
        ensure!(ntime >= 0, "経過時間に負数は指定できません: {}", ntime);
        self.now = self.now.saturating_add(ntime);
        Ok(self.now)
    }
}

impl Default for GalaxyClock {
    fn default() -> Self {
        Self::new()
    }
}
