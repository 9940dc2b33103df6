//! Pipe section: the unit the network solver walks.

use crate::common::DIAMETER_TOLERANCE;
use crate::error::{ComponentError, ComponentResult};
use crate::fitting::{Fitting, FittingStyle, FittingType};
use crate::orifice::Orifice;
use crate::valve::ControlValve;
use pf_core::units::{Length, Pressure, m};

/// API RP 14E erosional constant (lb/ft³ form).
pub const DEFAULT_EROSIONAL_CONSTANT: f64 = 100.0;

/// One pipe segment with its fittings and optional inline devices.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeSection {
    pub id: String,
    pub description: Option<String>,
    pub schedule: Option<String>,
    /// Nominal pipe size, inches.
    pub nominal_size: Option<f64>,
    pub length: Length,
    pub roughness: Length,
    /// Outlet elevation minus inlet elevation.
    pub elevation_change: Length,
    pub pipe_diameter: Option<Length>,
    pub inlet_diameter: Option<Length>,
    pub outlet_diameter: Option<Length>,
    pub fittings: Vec<Fitting>,
    pub fitting_style: FittingStyle,
    pub user_k: Option<f64>,
    /// Fractional margin applied to the K total.
    pub safety_factor: f64,
    pub user_specified_fixed_loss: Option<Pressure>,
    /// Forces the start pressure of this section when set.
    pub boundary_pressure: Option<Pressure>,
    pub control_valve: Option<ControlValve>,
    pub orifice: Option<Orifice>,
    pub flow_direction_note: Option<String>,
    pub start_node: String,
    pub end_node: String,
    pub erosional_constant: f64,
}

impl PipeSection {
    /// Bare section with default commercial-steel roughness (45.7 µm).
    pub fn new(id: impl Into<String>, length: Length, pipe_diameter: Length) -> Self {
        let id = id.into();
        Self {
            start_node: format!("{id}:in"),
            end_node: format!("{id}:out"),
            id,
            description: None,
            schedule: None,
            nominal_size: None,
            length,
            roughness: m(4.57e-5),
            elevation_change: m(0.0),
            pipe_diameter: Some(pipe_diameter),
            inlet_diameter: None,
            outlet_diameter: None,
            fittings: Vec::new(),
            fitting_style: FittingStyle::default(),
            user_k: None,
            safety_factor: 0.0,
            user_specified_fixed_loss: None,
            boundary_pressure: None,
            control_valve: None,
            orifice: None,
            flow_direction_note: None,
            erosional_constant: DEFAULT_EROSIONAL_CONSTANT,
        }
    }

    pub fn with_roughness(mut self, roughness: Length) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_elevation_change(mut self, dz: Length) -> Self {
        self.elevation_change = dz;
        self
    }

    pub fn with_fitting(mut self, kind: FittingType, count: u32) -> Self {
        self.add_fitting(kind, count);
        self
    }

    pub fn with_fitting_style(mut self, style: FittingStyle) -> Self {
        self.fitting_style = style;
        self
    }

    pub fn with_user_k(mut self, k: f64) -> Self {
        self.user_k = Some(k);
        self
    }

    pub fn with_safety_factor(mut self, sf: f64) -> Self {
        self.safety_factor = sf;
        self
    }

    pub fn with_fixed_loss(mut self, loss: Pressure) -> Self {
        self.user_specified_fixed_loss = Some(loss);
        self
    }

    pub fn with_boundary_pressure(mut self, p: Pressure) -> Self {
        self.boundary_pressure = Some(p);
        self
    }

    pub fn with_control_valve(mut self, valve: ControlValve) -> Self {
        self.control_valve = Some(valve);
        self
    }

    pub fn with_orifice(mut self, orifice: Orifice) -> Self {
        self.orifice = Some(orifice);
        self
    }

    pub fn with_nodes(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_node = start.into();
        self.end_node = end.into();
        self
    }

    pub fn with_end_diameters(mut self, inlet: Option<Length>, outlet: Option<Length>) -> Self {
        self.inlet_diameter = inlet;
        self.outlet_diameter = outlet;
        self
    }

    /// Add to an existing entry of the same type or append a new one.
    pub fn add_fitting(&mut self, kind: FittingType, count: u32) {
        if let Some(existing) = self.fittings.iter_mut().find(|f| f.kind == kind) {
            existing.count += count;
        } else {
            self.fittings.push(Fitting::new(kind, count));
        }
    }

    pub fn has_fitting(&self, kind: FittingType) -> bool {
        self.fittings.iter().any(|f| f.kind == kind)
    }

    /// Pipe inside diameter in metres.
    pub fn diameter_m(&self) -> ComponentResult<f64> {
        let d = self
            .pipe_diameter
            .ok_or(ComponentError::MissingParameter {
                what: "pipe diameter",
            })?
            .value;
        if d.is_finite() && d > 0.0 {
            Ok(d)
        } else {
            Err(ComponentError::Validation {
                what: "pipe diameter",
                value: d,
            })
        }
    }

    pub fn inlet_diameter_m(&self) -> ComponentResult<f64> {
        match self.inlet_diameter {
            Some(d) => positive_diameter(d.value, "inlet diameter"),
            None => self.diameter_m(),
        }
    }

    pub fn outlet_diameter_m(&self) -> ComponentResult<f64> {
        match self.outlet_diameter {
            Some(d) => positive_diameter(d.value, "outlet diameter"),
            None => self.diameter_m(),
        }
    }

    /// No pipe run and no fittings, just a valve and/or orifice.
    pub fn is_component_only(&self) -> bool {
        self.length.value <= 0.0
            && self.fittings.is_empty()
            && (self.control_valve.is_some() || self.orifice.is_some())
    }

    /// Insert `inlet_swage`/`outlet_swage` when the end diameters differ from
    /// the pipe bore. Running it twice leaves the fitting list unchanged.
    pub fn insert_swages(&mut self) {
        let Some(pipe) = self.pipe_diameter.map(|d| d.value) else {
            return;
        };
        let differs =
            |end: Option<Length>| end.is_some_and(|d| (d.value - pipe).abs() > DIAMETER_TOLERANCE);

        if differs(self.inlet_diameter) && !self.has_fitting(FittingType::InletSwage) {
            self.fittings.push(Fitting::new(FittingType::InletSwage, 1));
        }
        if differs(self.outlet_diameter) && !self.has_fitting(FittingType::OutletSwage) {
            self.fittings.push(Fitting::new(FittingType::OutletSwage, 1));
        }
    }

    /// Structural checks that do not need the fluid.
    pub fn validate(&self) -> ComponentResult<()> {
        if self.length.value < 0.0 || !self.length.value.is_finite() {
            return Err(ComponentError::Validation {
                what: "section length",
                value: self.length.value,
            });
        }
        if self.roughness.value < 0.0 || !self.roughness.value.is_finite() {
            return Err(ComponentError::Validation {
                what: "pipe roughness",
                value: self.roughness.value,
            });
        }
        if self.safety_factor < 0.0 || !self.safety_factor.is_finite() {
            return Err(ComponentError::Validation {
                what: "piping and fitting safety factor",
                value: self.safety_factor,
            });
        }
        if let Some(fitting) = self.fittings.iter().find(|f| f.count == 0) {
            return Err(ComponentError::InvalidSpec {
                what: format!("fitting '{}' has zero count", fitting.kind),
            });
        }
        if let Some(valve) = &self.control_valve {
            match valve.mode() {
                Err(e) if !e.is_missing_parameter() => return Err(e),
                _ => {}
            }
        }
        if let Some(orifice) = &self.orifice {
            orifice.validate()?;
        }
        Ok(())
    }
}

fn positive_diameter(d: f64, what: &'static str) -> ComponentResult<f64> {
    if d.is_finite() && d > 0.0 {
        Ok(d)
    } else {
        Err(ComponentError::Validation { what, value: d })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::units::pa;

    #[test]
    fn component_only_needs_a_device() {
        let bare = PipeSection::new("s", m(0.0), m(0.1));
        assert!(!bare.is_component_only());

        let valve = bare
            .clone()
            .with_control_valve(ControlValve::with_pressure_drop("cv-1", pa(1e5)));
        assert!(valve.is_component_only());

        let with_fitting = valve.with_fitting(FittingType::Elbow90, 1);
        assert!(!with_fitting.is_component_only());
    }

    #[test]
    fn swages_inserted_once() {
        let mut s = PipeSection::new("s", m(10.0), m(0.15))
            .with_end_diameters(Some(m(0.25)), Some(m(0.10)));
        s.insert_swages();
        s.insert_swages();
        let inlet: Vec<_> = s
            .fittings
            .iter()
            .filter(|f| f.kind == FittingType::InletSwage)
            .collect();
        assert_eq!(inlet.len(), 1);
        assert_eq!(inlet[0].count, 1);
        assert!(s.has_fitting(FittingType::OutletSwage));
    }

    #[test]
    fn matching_end_diameters_get_no_swage() {
        let mut s = PipeSection::new("s", m(10.0), m(0.15))
            .with_end_diameters(Some(m(0.15 + 5e-7)), None);
        s.insert_swages();
        assert!(s.fittings.is_empty());
    }

    #[test]
    fn add_fitting_merges_counts() {
        let s = PipeSection::new("s", m(1.0), m(0.1))
            .with_fitting(FittingType::Elbow90, 2)
            .with_fitting(FittingType::Elbow90, 3);
        assert_eq!(s.fittings, vec![Fitting::new(FittingType::Elbow90, 5)]);
    }

    #[test]
    fn missing_diameter_is_missing_parameter() {
        let mut s = PipeSection::new("s", m(1.0), m(0.1));
        s.pipe_diameter = None;
        assert!(s.diameter_m().unwrap_err().is_missing_parameter());
    }

    #[test]
    fn negative_length_rejected() {
        let s = PipeSection::new("s", m(-1.0), m(0.1));
        assert!(matches!(
            s.validate(),
            Err(ComponentError::Validation { what: "section length", .. })
        ));
    }
}
