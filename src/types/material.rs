//! Recyclable material types and their point rates

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ParseError;
use crate::{POINTS_PER_PAPER, POINTS_PER_PLASTIC};

/// Type of recyclable being deposited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    #[default]
    Plastic,
    Paper,
}

impl Material {
    pub const ALL: [Material; 2] = [Material::Plastic, Material::Paper];

    /// Points per deposited unit
    pub const fn rate(self) -> u32 {
        match self {
            Material::Plastic => POINTS_PER_PLASTIC,
            Material::Paper => POINTS_PER_PAPER,
        }
    }

    /// Points for `count` units. Widened so it cannot overflow.
    pub fn points_for(self, count: u32) -> u64 {
        u64::from(count) * u64::from(self.rate())
    }

    /// Noun used when describing the deposit to the fact generator
    pub fn fact_noun(self) -> &'static str {
        match self {
            Material::Plastic => "plastic bottles",
            Material::Paper => "paper sheets",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Material::Plastic => "plastic",
            Material::Paper => "paper",
        }
    }
}

impl FromStr for Material {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plastic" | "pl" => Ok(Material::Plastic),
            "paper" | "pa" => Ok(Material::Paper),
            other => Err(ParseError::UnknownMaterial(other.to_string())),
        }
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
