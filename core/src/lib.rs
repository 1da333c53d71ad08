mod config;
mod economy;
mod galaxy;
mod simulation;
mod time;

pub use config::{EconomyConfig, IntensityMode, ProductionParams};
pub use economy::{
    AdmittanceMatrix, CREDITS_MAX, CREDITS_MIN, Commodity, CommodityCatalog, CommodityId,
    CommodityPrice, Credits, Economy, EconomyBuilder, IntensitySource, Modifier, ModifierTable,
    NetworkError, NodalSolver, PlanetPrices, PriceEntry, PriceTable, PriceText,
    ProductionIntensity, SolveReport, SystemAverage, SystemAverages, ZeroIntensity,
    apply_faction, apply_planet_class, apply_population, apply_presence_range,
    apply_sprite_period, apply_surface_scale, apply_system_jumps, apply_system_radius,
    apply_system_volatility, average_within_systems, blend_with_neighbours, clamp_credits,
    compare_for_display, credits_to_string, initialise_prices, intensity_from_config,
    jump_resistance, neighbour_means, planet_commodity_price, population_factor, price_at,
    price_to_string, smooth, system_adjusted,
};
pub use galaxy::{Faction, FactionId, Galaxy, Nebula, Planet, Stance, StarSystem, SystemId};
pub use simulation::Simulation;
pub use time::{GalaxyClock, NTIME_PER_STU, STP_PER_SCU, STU_PER_STP, SimTime};
