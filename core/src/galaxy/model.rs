use std::fmt;

use anyhow::{Result, anyhow, bail, ensure};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(pub usize);

impl SystemId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactionId(pub usize);

impl FactionId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stance {
    Hostile,
    Allied,
    Neutral,
}

#[derive(Debug, Clone)]
pub struct Faction {
    pub name: String,
    allies: Vec<FactionId>,
    enemies: Vec<FactionId>,
}

impl Faction {
    fn new(name: String) -> Self {
        Self {
            name,
            allies: Vec::new(),
            enemies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Nebula {
    pub density: f64,
    pub volatility: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Planet {
    pub name: String,
    pub class: String,
    pub faction: Option<FactionId>,
    pub population: u64,
    pub presence_range: i32,
    pub gfx_space: String,
    pub gfx_exterior: String,
    pub commodities: Vec<String>,
}

impl Planet {
    pub fn new<N: Into<String>, C: Into<String>>(name: N, class: C) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            ..Self::default()
        }
    }

    pub fn is_inhabited(&self) -> bool {
        self.population > 0
    }

    pub fn sells(&self, commodity: &str) -> bool {
        self.commodities.iter().any(|name| name == commodity)
    }
}

#[derive(Debug, Clone)]
pub struct StarSystem {
    pub id: SystemId,
    pub name: String,
    pub nebula: Nebula,
    pub interference: f64,
    pub radius: f64,
    pub faction: Option<FactionId>,
    pub planets: Vec<Planet>,
    jumps: Vec<SystemId>,
}

impl StarSystem {
    fn new(id: SystemId, name: String) -> Self {
        Self {
            id,
            name,
            nebula: Nebula::default(),
            interference: 0.0,
            radius: 0.0,
            faction: None,
            planets: Vec::new(),
            jumps: Vec::new(),
        }
    }

    pub fn jumps(&self) -> &[SystemId] {
        &self.jumps
    }

    pub fn jump_count(&self) -> usize {
        self.jumps.len()
    }

    pub fn find_planet(&self, name: &str) -> Option<&Planet> {
        self.planets
            .iter()
            .find(|planet| planet.name.eq_ignore_ascii_case(name))
    }
}

/// Read-only world graph consumed by the economy.
#[derive(Debug, Clone, Default)]
pub struct Galaxy {
    factions: Vec<Faction>,
    systems: Vec<StarSystem>,
}

impl Galaxy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_faction<N: Into<String>>(&mut self, name: N) -> Result<FactionId> {
        let name = name.into();
        ensure!(!name.trim().is_empty(), "勢力名が空です");
        ensure!(
            self.find_faction(&name).is_none(),
            "勢力定義が重複しています: {}",
            name
        );
        let id = FactionId(self.factions.len());
        self.factions.push(Faction::new(name));
        Ok(id)
    }

    /// Records a symmetric relation between two factions, replacing any previous one.
    pub fn set_stance(&mut self, a: FactionId, b: FactionId, stance: Stance) -> Result<()> {
        ensure!(a != b, "同じ勢力同士の関係は変更できません");
        self.faction(a)
            .ok_or_else(|| anyhow!("勢力が存在しません: {}", a.index()))?;
        self.faction(b)
            .ok_or_else(|| anyhow!("勢力が存在しません: {}", b.index()))?;
        for (from, to) in [(a, b), (b, a)] {
            let faction = &mut self.factions[from.index()];
            faction.allies.retain(|id| *id != to);
            faction.enemies.retain(|id| *id != to);
            match stance {
                Stance::Allied => faction.allies.push(to),
                Stance::Hostile => faction.enemies.push(to),
                Stance::Neutral => {}
            }
        }
        Ok(())
    }

    /// A faction is always allied with itself.
    pub fn stance(&self, a: FactionId, b: FactionId) -> Stance {
        if a == b {
            return Stance::Allied;
        }
        let Some(faction) = self.faction(a) else {
            return Stance::Neutral;
        };
        if faction.enemies.contains(&b) {
            Stance::Hostile
        } else if faction.allies.contains(&b) {
            Stance::Allied
        } else {
            Stance::Neutral
        }
    }

    pub fn faction(&self, id: FactionId) -> Option<&Faction> {
        self.factions.get(id.index())
    }

    pub fn factions(&self) -> &[Faction] {
        &self.factions
    }

    pub fn find_faction(&self, name: &str) -> Option<FactionId> {
        self.factions
            .iter()
            .position(|faction| faction.name.eq_ignore_ascii_case(name.trim()))
            .map(FactionId)
    }

    pub fn faction_name(&self, id: Option<FactionId>) -> Option<&str> {
        id.and_then(|id| self.faction(id))
            .map(|faction| faction.name.as_str())
    }

    pub fn add_system<N: Into<String>>(&mut self, name: N) -> Result<SystemId> {
        let name = name.into();
        ensure!(!name.trim().is_empty(), "星系名が空です");
        ensure!(
            self.find_system(&name).is_none(),
            "星系定義が重複しています: {}",
            name
        );
        let id = SystemId(self.systems.len());
        self.systems.push(StarSystem::new(id, name));
        Ok(id)
    }

    pub fn system(&self, id: SystemId) -> Option<&StarSystem> {
        self.systems.get(id.index())
    }

    pub fn system_mut(&mut self, id: SystemId) -> Result<&mut StarSystem> {
        self.systems
            .get_mut(id.index())
            .ok_or_else(|| anyhow!("星系が存在しません: {}", id))
    }

    pub fn systems(&self) -> &[StarSystem] {
        &self.systems
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    pub fn find_system(&self, name: &str) -> Option<SystemId> {
        self.systems
            .iter()
            .position(|system| system.name.eq_ignore_ascii_case(name.trim()))
            .map(SystemId)
    }

    pub fn add_planet(&mut self, system: SystemId, planet: Planet) -> Result<()> {
        let target = self.system_mut(system)?;
        ensure!(
            target.find_planet(&planet.name).is_none(),
            "惑星定義が重複しています: {} ({})",
            planet.name,
            target.name
        );
        target.planets.push(planet);
        Ok(())
    }

    /// Adds a one-way jump. Returns `false` when the jump already exists.
    pub fn add_jump(&mut self, from: SystemId, to: SystemId) -> Result<bool> {
        ensure!(from != to, "同じ星系へのジャンプは登録できません: {}", from);
        self.system(to)
            .ok_or_else(|| anyhow!("ジャンプ先の星系が存在しません: {}", to))?;
        let source = self.system_mut(from)?;
        if source.jumps.contains(&to) {
            return Ok(false);
        }
        source.jumps.push(to);
        Ok(true)
    }

    pub fn link(&mut self, a: SystemId, b: SystemId) -> Result<()> {
        let forward = self.add_jump(a, b)?;
        let backward = self.add_jump(b, a)?;
        if !forward && !backward {
            bail!("星系はすでに接続されています: {} <-> {}", a, b);
        }
        Ok(())
    }

    pub fn unlink(&mut self, a: SystemId, b: SystemId) -> Result<bool> {
        let mut removed = false;
        for (from, to) in [(a, b), (b, a)] {
            let system = self.system_mut(from)?;
            let before = system.jumps.len();
            system.jumps.retain(|id| *id != to);
            removed |= system.jumps.len() != before;
        }
        Ok(removed)
    }

    pub fn set_nebula(&mut self, id: SystemId, nebula: Nebula) -> Result<()> {
        ensure!(
            nebula.density.is_finite() && nebula.volatility.is_finite(),
            "星雲の値が不正です"
        );
        self.system_mut(id)?.nebula = nebula;
        Ok(())
    }

    pub fn set_system_faction(&mut self, id: SystemId, faction: Option<FactionId>) -> Result<()> {
        if let Some(faction) = faction {
            self.faction(faction)
                .ok_or_else(|| anyhow!("勢力が存在しません: {}", faction.index()))?;
        }
        self.system_mut(id)?.faction = faction;
        Ok(())
    }

    pub fn are_connected(&self, a: SystemId, b: SystemId) -> bool {
        self.system(a).is_some_and(|system| system.jumps.contains(&b))
            || self.system(b).is_some_and(|system| system.jumps.contains(&a))
    }
}
