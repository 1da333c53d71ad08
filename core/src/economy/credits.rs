//! Credit amounts and their human-readable rendering.

/// Whole credits.
pub type Credits = i64;

/// Largest amount representable exactly as an `f64` (2^53 - 1).
pub const CREDITS_MAX: Credits = (1 << 53) - 1;
pub const CREDITS_MIN: Credits = -CREDITS_MAX;

const SUFFIXES: [(Credits, &str); 5] = [
    (1_000_000_000_000_000, "Q"),
    (1_000_000_000_000, "T"),
    (1_000_000_000, "B"),
    (1_000_000, "M"),
    (1_000, "K"),
];

/// Formats an amount with a magnitude suffix.
///
/// Negative `decimals` always yields the exact integer. Amounts below one
/// thousand (including every negative amount) are never abbreviated.
pub fn credits_to_string(credits: Credits, decimals: i32) -> String {
    if decimals < 0 {
        return credits.to_string();
    }
    let precision = decimals as usize;
    SUFFIXES
        .iter()
        .find(|(threshold, _)| credits >= *threshold)
        .map(|(threshold, suffix)| {
            format!(
                "{:.*}{}",
                precision,
                credits as f64 / *threshold as f64,
                suffix
            )
        })
        .unwrap_or_else(|| credits.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceText {
    pub text: String,
    pub affordable: bool,
}

/// Formats a price and flags whether `available` covers it.
pub fn price_to_string(price: Credits, available: Credits, decimals: i32) -> PriceText {
    PriceText {
        text: credits_to_string(price, decimals),
        affordable: price <= available,
    }
}

/// Rounds to the nearest credit and clamps into the representable range.
/// NaN maps to zero.
pub fn clamp_credits(value: f64) -> Credits {
    if value.is_nan() {
        return 0;
    }
    let rounded = value.round();
    if rounded >= CREDITS_MAX as f64 {
        CREDITS_MAX
    } else if rounded <= CREDITS_MIN as f64 {
        CREDITS_MIN
    } else {
        rounded as Credits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_amounts_stay_exact() {
        assert_eq!(credits_to_string(999, 2), "999");
        assert_eq!(credits_to_string(0, 1), "0");
        assert_eq!(credits_to_string(-25_000, 1), "-25000");
    }

    #[test]
    fn thresholds_pick_suffix() {
        assert_eq!(credits_to_string(1_500_000, 1), "1.5M");
        assert_eq!(credits_to_string(1_000, 0), "1K");
        assert_eq!(credits_to_string(2_340_000_000, 2), "2.34B");
        assert_eq!(credits_to_string(7_000_000_000_000, 0), "7T");
        assert_eq!(credits_to_string(3_000_000_000_000_000, 1), "3.0Q");
    }

    #[test]
    fn negative_decimals_are_exact() {
        assert_eq!(credits_to_string(1_500_000, -1), "1500000");
        assert_eq!(credits_to_string(CREDITS_MAX, -3), "9007199254740991");
    }

    #[test]
    fn price_text_flags_unaffordable() {
        let cheap = price_to_string(900, 1_000, 0);
        assert!(cheap.affordable);
        assert_eq!(cheap.text, "900");
        let dear = price_to_string(12_000, 1_000, 1);
        assert!(!dear.affordable);
        assert_eq!(dear.text, "12.0K");
    }

    #[test]
    fn clamp_rounds_and_saturates() {
        assert_eq!(clamp_credits(10.5), 11);
        assert_eq!(clamp_credits(-10.4), -10);
        assert_eq!(clamp_credits(f64::INFINITY), CREDITS_MAX);
        assert_eq!(clamp_credits(f64::NEG_INFINITY), CREDITS_MIN);
        assert_eq!(clamp_credits(f64::NAN), 0);
    }
}
