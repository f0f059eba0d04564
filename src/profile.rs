use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const KG_PER_LB: f64 = 0.453592;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

/// The slice of the user profile a session needs for calorie estimates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub weight: f64,
    pub weight_unit: WeightUnit,
}

impl Profile {
    pub fn new(weight: f64, weight_unit: WeightUnit) -> Self {
        Self {
            weight,
            weight_unit,
        }
    }

    pub fn weight_in_kg(&self) -> f64 {
        match self.weight_unit {
            WeightUnit::Kg => self.weight,
            WeightUnit::Lbs => self.weight * KG_PER_LB,
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new(70.0, WeightUnit::Kg)
    }
}
