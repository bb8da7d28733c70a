//! Eco-tip generation with a deterministic fallback.
//!
//! An external text-completion service can plug in behind [`TipSource`],
//! but the tip is cosmetic: any failure or absence of a source falls back
//! to a fixed rule-based table and never errors the request.

use crate::Result;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which part of the footprint a tip should target
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FocusArea {
    Transport,
    Electricity,
    Food,
}

impl FocusArea {
    /// Parse a user-supplied focus string, case-insensitively.
    ///
    /// Anything unrecognized means "no particular focus".
    pub fn from_input(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "transport" | "travel" => Some(FocusArea::Transport),
            "electricity" | "energy" => Some(FocusArea::Electricity),
            "food" | "diet" => Some(FocusArea::Food),
            _ => None,
        }
    }
}

/// Context handed to a tip source
#[derive(Clone, Debug)]
pub struct TipRequest {
    pub name: String,
    pub footprint_kg: f64,
    pub focus_area: Option<FocusArea>,
}

/// Seam for an external tip generator
///
/// Implementations may fail; callers go through [`tip_for`], which treats
/// any error as "use the fallback table".
pub trait TipSource {
    fn generate(&self, req: &TipRequest) -> Result<String>;
}

/// Fixed fallback tips, one per focus area
static FALLBACK_TIPS: Lazy<HashMap<FocusArea, &'static str>> = Lazy::new(|| {
    let mut tips = HashMap::new();
    tips.insert(
        FocusArea::Transport,
        "Consider switching short trips (under 3 km) to walking or cycling, \
         and use public transport where possible.",
    );
    tips.insert(
        FocusArea::Electricity,
        "Turn off lights when not in use, replace bulbs with LEDs, and \
         unplug idle chargers.",
    );
    tips.insert(
        FocusArea::Food,
        "Choose plant-based meals more often; try meat-free Mondays.",
    );
    tips
});

/// Fallback tip when no focus area applies
const GENERAL_TIP: &str = "Small daily actions add up. Track your habits and \
                           aim to reduce one high-impact activity each week.";

/// The deterministic tip for a focus area
pub fn fallback_tip(focus_area: Option<FocusArea>) -> &'static str {
    focus_area
        .and_then(|area| FALLBACK_TIPS.get(&area).copied())
        .unwrap_or(GENERAL_TIP)
}

/// Produce a tip, consulting `source` when present.
///
/// A missing or failing source falls back transparently; this function
/// cannot fail.
pub fn tip_for(req: &TipRequest, source: Option<&dyn TipSource>) -> String {
    if let Some(source) = source {
        match source.generate(req) {
            Ok(tip) => return tip,
            Err(e) => {
                tracing::warn!("Tip source failed, using fallback: {}", e);
            }
        }
    }

    fallback_tip(req.focus_area).to_string()
}
