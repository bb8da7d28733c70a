//! Footprint estimator: activity record in, kilograms of CO₂-equivalent out.
//!
//! The estimate is a weighted linear sum of independent contributions
//! (travel, electricity, diet, water) over fixed rule-based coefficients.
//! It is pure and total: the same record always yields the same result and
//! no well-formed record can make it fail.

use crate::{ActivityRecord, DietType, TravelMode};

/// kg CO₂ per km, by travel mode
pub const CAR_KG_PER_KM: f64 = 0.12;
pub const BUS_KG_PER_KM: f64 = 0.05;
pub const BIKE_KG_PER_KM: f64 = 0.0;
pub const WALK_KG_PER_KM: f64 = 0.0;

/// kg CO₂ per kWh of household electricity
pub const KWH_KG_PER_KWH: f64 = 0.7;

/// kg CO₂ for the day's main meal
pub const VEG_MEAL_KG: f64 = 1.7;
pub const NONVEG_MEAL_KG: f64 = 3.3;

/// kg CO₂ per litre of water (negligible but included)
pub const WATER_KG_PER_L: f64 = 0.0003;

/// Points baseline: gain is this minus the footprint, floored at 1
const POINTS_BASELINE: f64 = 100.0;

impl TravelMode {
    /// Emission coefficient in kg CO₂ per km
    pub fn coefficient(&self) -> f64 {
        match self {
            TravelMode::Car => CAR_KG_PER_KM,
            TravelMode::Bus => BUS_KG_PER_KM,
            TravelMode::Bike => BIKE_KG_PER_KM,
            TravelMode::Walk => WALK_KG_PER_KM,
        }
    }
}

impl DietType {
    /// Emission mass in kg CO₂ for the day's main meal
    pub fn meal_kg(&self) -> f64 {
        match self {
            DietType::Veg => VEG_MEAL_KG,
            DietType::NonVeg => NONVEG_MEAL_KG,
        }
    }
}

/// Estimate the day's footprint in kg CO₂-equivalent, rounded to 2 decimals.
///
/// Rounding is half-away-from-zero (`f64::round` semantics).
pub fn estimate(record: &ActivityRecord) -> f64 {
    let travel_kg = record.travel_km * record.travel_mode.coefficient();
    let electricity_kg = record.electricity_kwh * KWH_KG_PER_KWH;
    let diet_kg = record.diet.meal_kg();
    let water_kg = record.water_liters * WATER_KG_PER_L;

    let total = travel_kg + electricity_kg + diet_kg + water_kg;
    round2(total)
}

/// Points gained for logging a day with the given footprint.
///
/// Lower footprint earns more points; the gain never drops below 1 no
/// matter how large the footprint is.
pub fn points_gain(footprint_kg: f64) -> i64 {
    let gain = (POINTS_BASELINE - footprint_kg).round() as i64;
    gain.max(1)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
