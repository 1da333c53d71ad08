// Planet attribute pricing.
pub(crate) const INITIAL_PLANET_VARIATION: f64 = 0.5;
pub(crate) const INITIAL_SYS_VARIATION: f64 = 0.0;
pub(crate) const PERIOD_BASE: f64 = 100.0;
pub(crate) const SPRITE_BYTE_MODULUS: u32 = 32;
pub(crate) const SURFACE_NAME_PIVOT: i64 = 19;
pub(crate) const SURFACE_SCALE_DIVISOR: f64 = 100.0;
pub(crate) const POPULATION_PIVOT: f64 = 1e8;
pub(crate) const MAX_PRESENCE_RANGE: i32 = 5;
pub(crate) const PRESENCE_RANGE_DIVISOR: f64 = 30.0;

// System attribute pricing.
pub(crate) const RADIUS_PRICE_DIVISOR: f64 = 200_000.0;
pub(crate) const RADIUS_VARIATION_DIVISOR: f64 = 300_000.0;
pub(crate) const VOLATILITY_PRICE_DIVISOR: f64 = 6_000.0;
pub(crate) const INTERFERENCE_PRICE_DIVISOR: f64 = 10_000.0;
pub(crate) const SYSTEM_PERIOD_BASE: f64 = 2_000.0;

// Smoothing weights.
pub(crate) const OWN_PRICE_WEIGHT: f64 = 0.25;
pub(crate) const AVERAGE_PRICE_WEIGHT: f64 = 0.75;
pub(crate) const SYS_VARIATION_SHARE: f64 = 0.2;
pub(crate) const PLANET_VARIATION_SHARE: f64 = 0.1;

// Nodal solver output mapping.
pub(crate) const SOLUTION_SCALE: f64 = 1.0;
pub(crate) const SOLUTION_OFFSET: f64 = 1.0;

// Production noise is clipped to two standard deviations.
pub(crate) const PRODUCTION_SIGMA_CLIP: f64 = 2.0;
