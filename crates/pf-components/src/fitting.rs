//! Fitting catalogue and the Hooper 2-K resistance table.

use crate::error::ComponentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fitting kinds recognised by the 2-K method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FittingType {
    #[serde(rename = "elbow_90")]
    Elbow90,
    #[serde(rename = "elbow_45")]
    Elbow45,
    #[serde(rename = "u_bend")]
    UBend,
    #[serde(rename = "stub_in_elbow")]
    StubInElbow,
    #[serde(rename = "tee_elbow")]
    TeeElbow,
    #[serde(rename = "tee_through")]
    TeeThrough,
    #[serde(rename = "block_valve_full_line_size")]
    BlockValveFullLineSize,
    #[serde(rename = "block_valve_reduced_trim_0.9d")]
    BlockValveReducedTrim09,
    #[serde(rename = "block_valve_reduced_trim_0.8d")]
    BlockValveReducedTrim08,
    #[serde(rename = "globe_valve")]
    GlobeValve,
    #[serde(rename = "diaphragm_valve")]
    DiaphragmValve,
    #[serde(rename = "butterfly_valve")]
    ButterflyValve,
    #[serde(rename = "check_valve_swing")]
    CheckValveSwing,
    #[serde(rename = "lift_check_valve")]
    LiftCheckValve,
    #[serde(rename = "tilting_check_valve")]
    TiltingCheckValve,
    #[serde(rename = "pipe_entrance_normal")]
    PipeEntranceNormal,
    #[serde(rename = "pipe_entrance_raise")]
    PipeEntranceRaise,
    #[serde(rename = "pipe_exit")]
    PipeExit,
    #[serde(rename = "inlet_swage")]
    InletSwage,
    #[serde(rename = "outlet_swage")]
    OutletSwage,
}

impl FittingType {
    pub const ALL: [FittingType; 20] = [
        FittingType::Elbow90,
        FittingType::Elbow45,
        FittingType::UBend,
        FittingType::StubInElbow,
        FittingType::TeeElbow,
        FittingType::TeeThrough,
        FittingType::BlockValveFullLineSize,
        FittingType::BlockValveReducedTrim09,
        FittingType::BlockValveReducedTrim08,
        FittingType::GlobeValve,
        FittingType::DiaphragmValve,
        FittingType::ButterflyValve,
        FittingType::CheckValveSwing,
        FittingType::LiftCheckValve,
        FittingType::TiltingCheckValve,
        FittingType::PipeEntranceNormal,
        FittingType::PipeEntranceRaise,
        FittingType::PipeExit,
        FittingType::InletSwage,
        FittingType::OutletSwage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FittingType::Elbow90 => "elbow_90",
            FittingType::Elbow45 => "elbow_45",
            FittingType::UBend => "u_bend",
            FittingType::StubInElbow => "stub_in_elbow",
            FittingType::TeeElbow => "tee_elbow",
            FittingType::TeeThrough => "tee_through",
            FittingType::BlockValveFullLineSize => "block_valve_full_line_size",
            FittingType::BlockValveReducedTrim09 => "block_valve_reduced_trim_0.9d",
            FittingType::BlockValveReducedTrim08 => "block_valve_reduced_trim_0.8d",
            FittingType::GlobeValve => "globe_valve",
            FittingType::DiaphragmValve => "diaphragm_valve",
            FittingType::ButterflyValve => "butterfly_valve",
            FittingType::CheckValveSwing => "check_valve_swing",
            FittingType::LiftCheckValve => "lift_check_valve",
            FittingType::TiltingCheckValve => "tilting_check_valve",
            FittingType::PipeEntranceNormal => "pipe_entrance_normal",
            FittingType::PipeEntranceRaise => "pipe_entrance_raise",
            FittingType::PipeExit => "pipe_exit",
            FittingType::InletSwage => "inlet_swage",
            FittingType::OutletSwage => "outlet_swage",
        }
    }

    pub fn is_swage(self) -> bool {
        matches!(self, FittingType::InletSwage | FittingType::OutletSwage)
    }

    /// `(K1, K∞)` pair for the 2-K expression `K1/Re + K∞(1 + 1/D_in)`.
    ///
    /// Entrances, exits and swages are closed-form and return `None`.
    pub fn two_k_constants(self, style: FittingStyle) -> Option<(f64, f64)> {
        use FittingStyle::*;
        let pair = match self {
            FittingType::Elbow90 => match style {
                Screwed => (800.0, 0.40),
                LongRadius => (800.0, 0.20),
                ShortRadius | StubIn => (800.0, 0.25),
            },
            FittingType::Elbow45 => match style {
                LongRadius => (500.0, 0.15),
                _ => (500.0, 0.20),
            },
            FittingType::UBend => match style {
                Screwed => (1000.0, 0.60),
                LongRadius => (1000.0, 0.30),
                ShortRadius | StubIn => (1000.0, 0.35),
            },
            FittingType::StubInElbow => (1000.0, 1.00),
            FittingType::TeeElbow => match style {
                Screwed => (500.0, 0.70),
                LongRadius => (800.0, 0.40),
                ShortRadius => (800.0, 0.80),
                StubIn => (1000.0, 1.00),
            },
            FittingType::TeeThrough => match style {
                Screwed => (200.0, 0.10),
                StubIn => (100.0, 0.00),
                ShortRadius | LongRadius => (150.0, 0.05),
            },
            FittingType::BlockValveFullLineSize => (300.0, 0.10),
            FittingType::BlockValveReducedTrim09 => (500.0, 0.15),
            FittingType::BlockValveReducedTrim08 => (1000.0, 0.25),
            FittingType::GlobeValve => (1500.0, 4.00),
            FittingType::DiaphragmValve => (1000.0, 2.00),
            FittingType::ButterflyValve => (800.0, 0.25),
            FittingType::CheckValveSwing => (1500.0, 1.50),
            FittingType::LiftCheckValve => (2000.0, 10.0),
            FittingType::TiltingCheckValve => (1000.0, 0.50),
            FittingType::PipeEntranceNormal
            | FittingType::PipeEntranceRaise
            | FittingType::PipeExit
            | FittingType::InletSwage
            | FittingType::OutletSwage => return None,
        };
        Some(pair)
    }
}

impl fmt::Display for FittingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FittingType {
    type Err = ComponentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        FittingType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == key)
            .ok_or(ComponentError::UnsupportedFitting { what: key })
    }
}

/// Construction style selecting the 2-K constants for bends and tees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FittingStyle {
    /// Welded/flanged, R/D = 1.
    ShortRadius,
    /// Welded/flanged, R/D = 1.5.
    #[default]
    LongRadius,
    StubIn,
    Screwed,
}

impl FromStr for FittingStyle {
    type Err = ComponentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "short_radius" | "sr" | "flanged" | "welded" => Ok(FittingStyle::ShortRadius),
            "long_radius" | "lr" => Ok(FittingStyle::LongRadius),
            "stub_in" | "stubin" => Ok(FittingStyle::StubIn),
            "screwed" | "threaded" | "scrd" => Ok(FittingStyle::Screwed),
            other => Err(ComponentError::UnsupportedFitting {
                what: format!("fitting style '{other}'"),
            }),
        }
    }
}

/// A fitting type and how many of it the section carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fitting {
    #[serde(rename = "type")]
    pub kind: FittingType,
    pub count: u32,
}

impl Fitting {
    pub fn new(kind: FittingType, count: u32) -> Self {
        Self { kind, count }
    }
}
