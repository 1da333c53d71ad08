use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

const EMBEDDED_ECONOMY: &str = include_str!("../../config/economy.yaml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntensityMode {
    #[default]
    Zero,
    Production,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionParams {
    #[serde(default = "ProductionParams::default_modifier")]
    pub modifier: f64,
    #[serde(default = "ProductionParams::default_variability")]
    pub variability: f64,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ProductionParams {
    const fn default_modifier() -> f64 {
        500_000.0
    }

    const fn default_variability() -> f64 {
        0.01
    }
}

impl Default for ProductionParams {
    fn default() -> Self {
        Self {
            modifier: Self::default_modifier(),
            variability: Self::default_variability(),
            seed: None,
        }
    }
}

/// Parameters of the nodal price network.
///
/// Every field falls back to its default, so a partial file only overrides
/// what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub base_resistance: f64,
    pub self_resistance: f64,
    pub faction_modifier: f64,
    pub density_weight: f64,
    pub volatility_weight: f64,
    pub min_resistance: f64,
    pub intensity: IntensityMode,
    pub production: ProductionParams,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            base_resistance: 30.0,
            self_resistance: 3.0,
            faction_modifier: 0.1,
            density_weight: 1.0 / 1000.0,
            volatility_weight: 1.0 / 100.0,
            min_resistance: 1e-6,
            intensity: IntensityMode::Zero,
            production: ProductionParams::default(),
        }
    }
}

impl EconomyConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: EconomyConfig =
            serde_yaml::from_str(content).context("経済設定 YAML の解析に失敗しました")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("経済設定ファイルを開けません: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("経済設定ファイルが不正です: {}", path.display()))
    }

    pub fn from_embedded() -> Result<Self> {
        Self::from_yaml_str(EMBEDDED_ECONOMY).context("組み込み経済設定の解析に失敗しました")
    }

    pub fn self_conductance(&self) -> f64 {
        1.0 / self.self_resistance
    }

    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(
            self.base_resistance.is_finite() && self.base_resistance > 0.0,
            "base_resistance は正の有限値で指定してください"
        );
        ensure!(
            self.self_resistance.is_finite() && self.self_resistance > 0.0,
            "self_resistance は正の有限値で指定してください"
        );
        ensure!(
            self.min_resistance.is_finite() && self.min_resistance > 0.0,
            "min_resistance は正の有限値で指定してください"
        );
        ensure!(
            (0.0..1.0).contains(&self.faction_modifier),
            "faction_modifier は 0 以上 1 未満で指定してください"
        );
        ensure!(
            self.density_weight.is_finite() && self.volatility_weight.is_finite(),
            "星雲の重みが不正です"
        );
        ensure!(
            self.production.modifier.is_finite() && self.production.modifier > 0.0,
            "production.modifier は正の有限値で指定してください"
        );
        ensure!(
            self.production.variability.is_finite() && self.production.variability >= 0.0,
            "production.variability は 0 以上で指定してください"
        );
        Ok(())
    }
}
