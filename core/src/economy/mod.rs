mod catalog;
mod constants;
mod context;
mod credits;
mod intensity;
mod model;
mod network;
mod pricing;
mod query;
mod smoothing;
mod solver;

pub use catalog::CommodityCatalog;
pub use context::{Economy, EconomyBuilder};
pub use credits::{
    CREDITS_MAX, CREDITS_MIN, Credits, PriceText, clamp_credits, credits_to_string,
    price_to_string,
};
pub use intensity::{IntensitySource, ProductionIntensity, ZeroIntensity, intensity_from_config};
pub use model::{
    Commodity, CommodityId, CommodityPrice, Modifier, ModifierTable, PlanetPrices, PriceEntry,
    PriceTable, compare_for_display,
};
pub use network::{AdmittanceMatrix, NetworkError, jump_resistance};
pub use pricing::{
    apply_faction, apply_planet_class, apply_population, apply_presence_range,
    apply_sprite_period, apply_surface_scale, apply_system_jumps, apply_system_radius,
    apply_system_volatility, initialise_prices, planet_commodity_price, population_factor,
    system_adjusted,
};
pub use query::price_at;
pub use smoothing::{
    SystemAverage, SystemAverages, average_within_systems, blend_with_neighbours,
    neighbour_means, smooth,
};
pub use solver::{NodalSolver, SolveReport};
