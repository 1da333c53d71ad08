use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use super::model::{FactionId, Galaxy, Nebula, Planet, Stance};

const EMBEDDED_GALAXY: &str = include_str!("../../../config/galaxy.yaml");

impl Galaxy {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: GalaxyFile =
            serde_yaml::from_str(content).context("星系定義 YAML の解析に失敗しました")?;
        build_galaxy(file)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("星系定義ファイルを開けません: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("星系定義ファイルが不正です: {}", path.display()))
    }

    pub fn from_embedded() -> Result<Self> {
        Self::from_yaml_str(EMBEDDED_GALAXY).context("組み込み星系定義の解析に失敗しました")
    }
}

fn build_galaxy(file: GalaxyFile) -> Result<Galaxy> {
    let mut galaxy = Galaxy::new();
    for faction in &file.factions {
        galaxy.add_faction(faction.name.clone())?;
    }
    for faction in &file.factions {
        let id = resolve_faction(&galaxy, &faction.name)?;
        for ally in &faction.allies {
            let other = resolve_faction(&galaxy, ally)?;
            galaxy.set_stance(id, other, Stance::Allied)?;
        }
        for enemy in &faction.enemies {
            let other = resolve_faction(&galaxy, enemy)?;
            galaxy.set_stance(id, other, Stance::Hostile)?;
        }
    }

    for record in &file.systems {
        galaxy.add_system(record.name.clone())?;
    }

    for record in file.systems {
        let id = galaxy
            .find_system(&record.name)
            .ok_or_else(|| anyhow!("星系が存在しません: {}", record.name))?;
        let faction = record
            .faction
            .as_deref()
            .map(|name| resolve_faction(&galaxy, name))
            .transpose()?;
        let mut planets = Vec::with_capacity(record.planets.len());
        for planet in record.planets {
            planets.push(planet.into_planet(&galaxy)?);
        }
        {
            let system = galaxy.system_mut(id)?;
            system.faction = faction;
            system.radius = record.radius;
            system.interference = record.interference;
            system.nebula = Nebula {
                density: record.nebula.density,
                volatility: record.nebula.volatility,
            };
        }
        for planet in planets {
            galaxy
                .add_planet(id, planet)
                .with_context(|| format!("惑星の登録に失敗しました: {}", record.name))?;
        }
        for target in &record.jumps {
            let target_id = galaxy.find_system(target).ok_or_else(|| {
                anyhow!(
                    "ジャンプ先の星系が存在しません: {} -> {}",
                    record.name,
                    target
                )
            })?;
            galaxy.add_jump(id, target_id)?;
        }
    }
    Ok(galaxy)
}

fn resolve_faction(galaxy: &Galaxy, name: &str) -> Result<FactionId> {
    galaxy
        .find_faction(name)
        .ok_or_else(|| anyhow!("未知の勢力です: {}", name))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GalaxyFile {
    #[serde(default)]
    factions: Vec<FactionRecord>,
    #[serde(default)]
    systems: Vec<SystemRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FactionRecord {
    name: String,
    #[serde(default)]
    allies: Vec<String>,
    #[serde(default)]
    enemies: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct NebulaRecord {
    #[serde(default)]
    density: f64,
    #[serde(default)]
    volatility: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SystemRecord {
    name: String,
    #[serde(default)]
    faction: Option<String>,
    #[serde(default)]
    radius: f64,
    #[serde(default)]
    interference: f64,
    #[serde(default)]
    nebula: NebulaRecord,
    #[serde(default)]
    jumps: Vec<String>,
    #[serde(default)]
    planets: Vec<PlanetRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PlanetRecord {
    name: String,
    class: String,
    #[serde(default)]
    faction: Option<String>,
    #[serde(default)]
    population: u64,
    #[serde(default)]
    presence_range: i32,
    #[serde(default)]
    gfx_space: String,
    #[serde(default)]
    gfx_exterior: String,
    #[serde(default)]
    commodities: Vec<String>,
}

impl PlanetRecord {
    fn into_planet(self, galaxy: &Galaxy) -> Result<Planet> {
        let faction = self
            .faction
            .as_deref()
            .map(|name| resolve_faction(galaxy, name))
            .transpose()?;
        Ok(Planet {
            name: self.name,
            class: self.class,
            faction,
            population: self.population,
            presence_range: self.presence_range,
            gfx_space: self.gfx_space,
            gfx_exterior: self.gfx_exterior,
            commodities: self.commodities,
        })
    }
}
