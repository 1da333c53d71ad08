mod loader;
mod model;

pub use model::{Faction, FactionId, Galaxy, Nebula, Planet, Stance, StarSystem, SystemId};
