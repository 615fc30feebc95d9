use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A numeric field that can be summed across records or line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Calories,
    Protein,
    Carbs,
    Fat,
    Duration,
    Sets,
    Reps,
    Weight,
}

impl Metric {
    /// Calories plus the three macros, in display order.
    pub const NUTRITION: [Metric; 4] = [
        Metric::Calories,
        Metric::Protein,
        Metric::Carbs,
        Metric::Fat,
    ];

    pub const EXERCISE: [Metric; 3] = [Metric::Sets, Metric::Reps, Metric::Weight];
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Calories => write!(f, "calories"),
            Metric::Protein => write!(f, "protein"),
            Metric::Carbs => write!(f, "carbs"),
            Metric::Fat => write!(f, "fat"),
            Metric::Duration => write!(f, "duration"),
            Metric::Sets => write!(f, "sets"),
            Metric::Reps => write!(f, "reps"),
            Metric::Weight => write!(f, "weight"),
        }
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "calories" => Ok(Metric::Calories),
            "protein" => Ok(Metric::Protein),
            "carbs" => Ok(Metric::Carbs),
            "fat" => Ok(Metric::Fat),
            "duration" => Ok(Metric::Duration),
            "sets" => Ok(Metric::Sets),
            "reps" => Ok(Metric::Reps),
            "weight" => Ok(Metric::Weight),
            _ => Err(format!(
                "Invalid metric '{}'. Valid options: calories, protein, carbs, fat, duration, sets, reps, weight",
                s
            )),
        }
    }
}
