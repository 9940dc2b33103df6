//! ASME B36.10M / B36.19M outside diameters and wall thicknesses.

use crate::{ConfigResult, ConfigurationError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One nominal size: NPS in inches, OD and walls in millimetres.
struct PipeSize {
    nps: f64,
    outside_diameter: f64,
    walls: &'static [(&'static str, f64)],
}

const fn size(nps: f64, outside_diameter: f64, walls: &'static [(&'static str, f64)]) -> PipeSize {
    PipeSize {
        nps,
        outside_diameter,
        walls,
    }
}

#[rustfmt::skip]
const PIPE_SIZES: &[PipeSize] = &[
    size(0.5, 21.3, &[("5S", 1.65), ("10S", 2.11), ("40", 2.77), ("STD", 2.77), ("40S", 2.77),
        ("80", 3.73), ("XS", 3.73), ("80S", 3.73), ("160", 4.78), ("XXS", 7.47)]),
    size(0.75, 26.7, &[("5S", 1.65), ("10S", 2.11), ("40", 2.87), ("STD", 2.87), ("40S", 2.87),
        ("80", 3.91), ("XS", 3.91), ("80S", 3.91), ("160", 5.56), ("XXS", 7.82)]),
    size(1.0, 33.4, &[("5S", 1.65), ("10S", 2.77), ("40", 3.38), ("STD", 3.38), ("40S", 3.38),
        ("80", 4.55), ("XS", 4.55), ("80S", 4.55), ("160", 6.35), ("XXS", 9.09)]),
    size(1.25, 42.2, &[("5S", 1.65), ("10S", 2.77), ("40", 3.56), ("STD", 3.56), ("40S", 3.56),
        ("80", 4.85), ("XS", 4.85), ("80S", 4.85), ("160", 6.35), ("XXS", 9.70)]),
    size(1.5, 48.3, &[("5S", 1.65), ("10S", 2.77), ("40", 3.68), ("STD", 3.68), ("40S", 3.68),
        ("80", 5.08), ("XS", 5.08), ("80S", 5.08), ("160", 7.14), ("XXS", 10.15)]),
    size(2.0, 60.3, &[("5S", 1.65), ("10S", 2.77), ("40", 3.91), ("STD", 3.91), ("40S", 3.91),
        ("80", 5.54), ("XS", 5.54), ("80S", 5.54), ("160", 8.74), ("XXS", 11.07)]),
    size(2.5, 73.0, &[("5S", 2.11), ("10S", 3.05), ("40", 5.16), ("STD", 5.16), ("40S", 5.16),
        ("80", 7.01), ("XS", 7.01), ("80S", 7.01), ("160", 9.53), ("XXS", 14.02)]),
    size(3.0, 88.9, &[("5S", 2.11), ("10S", 3.05), ("40", 5.49), ("STD", 5.49), ("40S", 5.49),
        ("80", 7.62), ("XS", 7.62), ("80S", 7.62), ("160", 11.13), ("XXS", 15.24)]),
    size(3.5, 101.6, &[("5S", 2.11), ("10S", 3.05), ("40", 5.74), ("STD", 5.74), ("40S", 5.74),
        ("80", 8.08), ("XS", 8.08), ("80S", 8.08)]),
    size(4.0, 114.3, &[("5S", 2.11), ("10S", 3.05), ("40", 6.02), ("STD", 6.02), ("40S", 6.02),
        ("80", 8.56), ("XS", 8.56), ("80S", 8.56), ("120", 11.13), ("160", 13.49), ("XXS", 17.12)]),
    size(5.0, 141.3, &[("5S", 2.77), ("10S", 3.40), ("40", 6.55), ("STD", 6.55), ("40S", 6.55),
        ("80", 9.53), ("XS", 9.53), ("80S", 9.53), ("120", 12.70), ("160", 15.88), ("XXS", 19.05)]),
    size(6.0, 168.3, &[("5S", 2.77), ("10S", 3.40), ("40", 7.11), ("STD", 7.11), ("40S", 7.11),
        ("80", 10.97), ("XS", 10.97), ("80S", 10.97), ("120", 14.27), ("160", 18.26),
        ("XXS", 21.95)]),
    size(8.0, 219.1, &[("5S", 2.77), ("10S", 3.76), ("20", 6.35), ("30", 7.04), ("40", 8.18),
        ("STD", 8.18), ("40S", 8.18), ("60", 10.31), ("80", 12.70), ("XS", 12.70), ("80S", 12.70),
        ("100", 15.09), ("120", 18.26), ("140", 20.62), ("160", 23.01), ("XXS", 22.23)]),
    size(10.0, 273.0, &[("5S", 3.40), ("10S", 4.19), ("20", 6.35), ("30", 7.80), ("40", 9.27),
        ("STD", 9.27), ("40S", 9.27), ("60", 12.70), ("XS", 12.70), ("80S", 12.70), ("80", 15.09),
        ("100", 18.26), ("120", 21.44), ("140", 25.40), ("160", 28.58), ("XXS", 25.40)]),
    size(12.0, 323.8, &[("5S", 3.96), ("10S", 4.57), ("20", 6.35), ("30", 8.38), ("STD", 9.53),
        ("40S", 9.53), ("40", 10.31), ("XS", 12.70), ("80S", 12.70), ("60", 14.27), ("80", 17.48),
        ("100", 21.44), ("120", 25.40), ("140", 28.58), ("160", 33.32), ("XXS", 25.40)]),
    size(14.0, 355.6, &[("5S", 3.96), ("10S", 4.78), ("10", 6.35), ("20", 7.92), ("30", 9.53),
        ("STD", 9.53), ("40", 11.13), ("XS", 12.70), ("60", 15.09), ("80", 19.05), ("100", 23.83),
        ("120", 27.79), ("140", 31.75), ("160", 35.71)]),
    size(16.0, 406.4, &[("5S", 4.19), ("10S", 4.78), ("10", 6.35), ("20", 7.92), ("30", 9.53),
        ("STD", 9.53), ("40", 12.70), ("XS", 12.70), ("60", 16.66), ("80", 21.44), ("100", 26.19),
        ("120", 30.96), ("140", 36.53), ("160", 40.49)]),
    size(18.0, 457.0, &[("5S", 4.19), ("10S", 4.78), ("10", 6.35), ("20", 7.92), ("STD", 9.53),
        ("30", 11.13), ("XS", 12.70), ("40", 14.27), ("60", 19.05), ("80", 23.83), ("100", 29.36),
        ("120", 34.93), ("140", 39.67), ("160", 45.24)]),
    size(20.0, 508.0, &[("5S", 4.78), ("10S", 5.54), ("10", 6.35), ("20", 9.53), ("STD", 9.53),
        ("30", 12.70), ("XS", 12.70), ("40", 15.09), ("60", 20.62), ("80", 26.19), ("100", 32.54),
        ("120", 38.10), ("140", 44.45), ("160", 50.01)]),
    size(24.0, 610.0, &[("5S", 5.54), ("10S", 6.35), ("10", 6.35), ("20", 9.53), ("STD", 9.53),
        ("XS", 12.70), ("30", 14.27), ("40", 17.48), ("60", 24.61), ("80", 30.96), ("100", 38.89),
        ("120", 46.02), ("140", 52.37), ("160", 59.54)]),
];

/// A schedule as written in a config file: `40`, `"40"`, `"Sch 80S"`, `"STD"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScheduleInput {
    Number(u32),
    Text(String),
}

impl ScheduleInput {
    /// Table key: upper case, `SCH` prefix and whitespace removed.
    pub fn key(&self) -> String {
        match self {
            ScheduleInput::Number(n) => n.to_string(),
            ScheduleInput::Text(text) => {
                let upper: String = text
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect::<String>()
                    .to_ascii_uppercase();
                let stripped = upper
                    .strip_prefix("SCHEDULE")
                    .or_else(|| upper.strip_prefix("SCH."))
                    .or_else(|| upper.strip_prefix("SCH"))
                    .unwrap_or(&upper);
                match stripped {
                    "STANDARD" => "STD".to_string(),
                    "XH" => "XS".to_string(),
                    "XXH" => "XXS".to_string(),
                    other => other.to_string(),
                }
            }
        }
    }
}

impl fmt::Display for ScheduleInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleInput::Number(n) => write!(f, "{n}"),
            ScheduleInput::Text(text) => f.write_str(text),
        }
    }
}

/// Outside diameter for a nominal size, m.
pub fn outside_diameter(nps: f64) -> ConfigResult<f64> {
    find_size(nps)
        .map(|s| s.outside_diameter * 1e-3)
        .ok_or_else(|| ConfigurationError::Schedule {
            nps,
            schedule: "any".into(),
        })
}

/// Inside diameter for a nominal size and schedule, m.
pub fn inside_diameter(nps: f64, schedule: &ScheduleInput) -> ConfigResult<f64> {
    let key = schedule.key();
    let not_found = || ConfigurationError::Schedule {
        nps,
        schedule: schedule.to_string(),
    };
    let size = find_size(nps).ok_or_else(not_found)?;
    let wall = size
        .walls
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, wall)| *wall)
        .ok_or_else(not_found)?;
    Ok((size.outside_diameter - 2.0 * wall) * 1e-3)
}

fn find_size(nps: f64) -> Option<&'static PipeSize> {
    PIPE_SIZES.iter().find(|s| (s.nps - nps).abs() < 1e-6)
}
