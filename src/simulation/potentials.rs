//! Analytic potential fields
//!
//! A field is a stateless function of a query point, expressed relative to
//! its own centre. Every field provides a potential; gravity is never given in
//! closed form but obtained by finite differencing the potential
//! (see [`finite_difference_gravity`]).
//!
//! Sign convention: potentials are negative (`Φ = -G M / r` far away), so the
//! differenced gravity `(Φ(x) - Φ(x + h)) / h` points toward the centre.

use std::f64::consts::PI;

use serde::Deserialize;

use crate::simulation::error::{BridgeError, Result};
use crate::simulation::states::NVec3;

/// Finite-difference step as a fraction of the distance to the field centre
pub const FD_STEP_FRACTION: f64 = 1.0e-3;

/// Scheme used to turn a potential into an acceleration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Differencing {
    /// `g_a = (Φ(x) - Φ(x + h ê_a)) / h`, first order
    #[default]
    Forward,
    /// `g_a = (Φ(x - h ê_a) - Φ(x + h ê_a)) / 2h`, second order, odd truncation error
    Central,
}

/// Parameters shared by every field variant
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldParameters {
    pub G: f64, // gravitational constant
    pub mass: f64, // source mass M
    pub radius: f64, // scale radius a
    pub epsilon2: f64, // softening length squared
    pub differencing: Differencing,
}

impl FieldParameters {
    #[allow(non_snake_case)]
    pub fn new(G: f64) -> Self {
        Self {
            G,
            mass: 0.0,
            radius: 0.0,
            epsilon2: 0.0,
            differencing: Differencing::Forward,
        }
    }
}

fn non_negative(what: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(BridgeError::InvalidConfiguration(format!(
            "field {what} must be finite and non-negative, got {value}"
        )))
    }
}

/// Capability set of an analytic gravity field.
///
/// Variants implement `potential` and the derived profile queries; parameter
/// handling and the finite-difference gravity come for free.
pub trait PotentialField: Send {
    fn parameters(&self) -> &FieldParameters;

    fn parameters_mut(&mut self) -> &mut FieldParameters;

    /// Potential per unit mass at `point` (relative to the field centre)
    fn potential(&self, point: &NVec3) -> f64;

    /// Mass inside radius `r`
    fn enclosed_mass(&self, r: f64) -> f64;

    fn density(&self, r: f64) -> f64;

    fn circular_velocity(&self, r: f64) -> f64;

    fn velocity_dispersion(&self, r: f64) -> f64;

    /// Set mass and scale radius, rejecting negative values
    fn set_parameters(&mut self, mass: f64, radius: f64) -> Result<()> {
        let mass = non_negative("mass", mass)?;
        let radius = non_negative("radius", radius)?;
        let p = self.parameters_mut();
        p.mass = mass;
        p.radius = radius;
        Ok(())
    }

    fn set_softening(&mut self, epsilon2: f64) -> Result<()> {
        self.parameters_mut().epsilon2 = non_negative("softening", epsilon2)?;
        Ok(())
    }

    fn set_differencing(&mut self, differencing: Differencing) {
        self.parameters_mut().differencing = differencing;
    }

    /// Gravitational acceleration at `point`, differenced from `potential`
    fn gravity(&self, point: &NVec3) -> Result<NVec3> {
        finite_difference_gravity(point, self.parameters().differencing, |p| self.potential(p))
    }

    /// Release whatever the field holds; analytic fields hold nothing
    fn stop(&mut self) {}
}

/// Differentiate `potential` numerically at `point`.
///
/// The step is `h = FD_STEP_FRACTION * |point|`, the unsoftened distance to
/// the centre. A query at the centre gives `h = 0` and is rejected.
pub fn finite_difference_gravity<F>(point: &NVec3, scheme: Differencing, potential: F) -> Result<NVec3>
where
    F: Fn(&NVec3) -> f64,
{
    let h = FD_STEP_FRACTION * point.norm();
    if !(h > 0.0 && h.is_finite()) {
        return Err(BridgeError::DegenerateQuery);
    }

    let phi_0 = potential(point);
    let mut g = NVec3::zeros();

    for axis in 0..3 {
        let mut ahead = *point;
        ahead[axis] += h;

        g[axis] = match scheme {
            // central value minus perturbed value
            Differencing::Forward => (phi_0 - potential(&ahead)) / h,
            Differencing::Central => {
                let mut behind = *point;
                behind[axis] -= h;
                (potential(&behind) - potential(&ahead)) / (2.0 * h)
            }
        };
    }

    Ok(g)
}

/// Cumulative Plummer mass profile, shared by both variants
fn plummer_mass_in(mass: f64, radius: f64, r: f64) -> f64 {
    mass * r.powi(3) / (r * r + radius * radius).powf(1.5)
}

fn plummer_density(mass: f64, radius: f64, r: f64) -> f64 {
    if radius == 0.0 {
        return 0.0;
    }
    3.0 * mass / (4.0 * PI * radius.powi(3)) * (1.0 + (r / radius).powi(2)).powf(-2.5)
}

/// Point mass, optionally softened: `Φ(r) = -G M / sqrt(r² + ε²)`
#[derive(Debug, Clone)]
pub struct PointMassField {
    params: FieldParameters,
}

impl PointMassField {
    #[allow(non_snake_case)]
    pub fn new(G: f64) -> Self {
        Self {
            params: FieldParameters::new(G),
        }
    }
}

impl PotentialField for PointMassField {
    fn parameters(&self) -> &FieldParameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut FieldParameters {
        &mut self.params
    }

    fn potential(&self, point: &NVec3) -> f64 {
        let p = &self.params;
        let r = (point.norm_squared() + p.epsilon2).sqrt();
        -p.G * p.mass / r
    }

    fn enclosed_mass(&self, r: f64) -> f64 {
        plummer_mass_in(self.params.mass, self.params.radius, r)
    }

    /// Zero outside the centre for a true point; a finite radius smears the
    /// mass with the same profile `enclosed_mass` integrates, not with a
    /// uniform `3M/(4πa²)`, so density and enclosed mass describe one
    /// distribution.
    fn density(&self, r: f64) -> f64 {
        plummer_density(self.params.mass, self.params.radius, r)
    }

    fn circular_velocity(&self, r: f64) -> f64 {
        (self.params.G * self.params.mass / r).sqrt()
    }

    fn velocity_dispersion(&self, r: f64) -> f64 {
        (self.params.G * self.params.mass / r).sqrt()
    }
}

/// Plummer sphere: `Φ(r) = -2 G M / sqrt(r² + a² + ε²)`
#[derive(Debug, Clone)]
pub struct PlummerField {
    params: FieldParameters,
}

impl PlummerField {
    #[allow(non_snake_case)]
    pub fn new(G: f64) -> Self {
        Self {
            params: FieldParameters::new(G),
        }
    }
}

impl PotentialField for PlummerField {
    fn parameters(&self) -> &FieldParameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut FieldParameters {
        &mut self.params
    }

    fn potential(&self, point: &NVec3) -> f64 {
        let p = &self.params;
        let r = (point.norm_squared() + p.radius * p.radius + p.epsilon2).sqrt();
        -2.0 * p.G * p.mass / r
    }

    fn enclosed_mass(&self, r: f64) -> f64 {
        plummer_mass_in(self.params.mass, self.params.radius, r)
    }

    fn density(&self, r: f64) -> f64 {
        plummer_density(self.params.mass, self.params.radius, r)
    }

    fn circular_velocity(&self, r: f64) -> f64 {
        (self.params.G * self.enclosed_mass(r) / r).sqrt()
    }

    fn velocity_dispersion(&self, r: f64) -> f64 {
        let r_a = (r * r + self.params.radius * self.params.radius).sqrt();
        (self.params.G * self.enclosed_mass(r_a) / (6.0 * r_a)).sqrt()
    }
}

/// Which analytic profile a source uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FieldKind {
    #[serde(rename = "point")]
    PointMass,
    #[serde(rename = "plummer")]
    Plummer,
}

impl FieldKind {
    #[allow(non_snake_case)]
    pub fn build(self, G: f64, differencing: Differencing) -> Box<dyn PotentialField> {
        let mut field: Box<dyn PotentialField> = match self {
            FieldKind::PointMass => Box::new(PointMassField::new(G)),
            FieldKind::Plummer => Box::new(PlummerField::new(G)),
        };
        field.set_differencing(differencing);
        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn point(mass: f64) -> PointMassField {
        let mut f = PointMassField::new(1.0);
        f.set_parameters(mass, 0.0).unwrap();
        f
    }

    #[test]
    fn forward_difference_matches_manual_formula() {
        let f = point(2.0);
        let x = NVec3::new(0.3, -0.4, 1.2);
        let h = FD_STEP_FRACTION * x.norm();

        let g = f.gravity(&x).unwrap();
        let phi_0 = f.potential(&x);
        let expected_y = (phi_0 - f.potential(&(x + NVec3::new(0.0, h, 0.0)))) / h;

        assert_eq!(g.y, expected_y);
    }

    #[test]
    fn gravity_at_centre_is_degenerate() {
        let f = point(1.0);
        assert_eq!(f.gravity(&NVec3::zeros()), Err(BridgeError::DegenerateQuery));
    }

    #[test]
    fn central_difference_is_closer_to_newton() {
        let mut f = point(1.0);
        let x = NVec3::new(1.0, 0.0, 0.0);
        let exact = -1.0;

        let forward = f.gravity(&x).unwrap().x;
        f.set_differencing(Differencing::Central);
        let central = f.gravity(&x).unwrap().x;

        assert!((central - exact).abs() < (forward - exact).abs());
        assert_relative_eq!(central, exact, max_relative = 1e-5);
        // forward differencing is only first order
        assert_relative_eq!(forward, exact, max_relative = 2e-3);
    }

    #[test]
    fn plummer_profile_is_finite_and_bounded() {
        let mut f = PlummerField::new(1.0);
        f.set_parameters(10.0, 0.5).unwrap();

        for r in [1e-3, 0.1, 0.5, 2.0, 50.0] {
            assert!(f.enclosed_mass(r).is_finite());
            assert!(f.enclosed_mass(r) <= 10.0);
            assert!(f.density(r) > 0.0);
            assert!(f.circular_velocity(r).is_finite());
            assert!(f.velocity_dispersion(r).is_finite());
        }
        assert_relative_eq!(f.enclosed_mass(1e6), 10.0, max_relative = 1e-9);
    }

    #[test]
    fn point_mass_density_matches_its_enclosed_mass() {
        let mut smeared = point(4.0);
        smeared.set_parameters(4.0, 0.5).unwrap();
        let mut plummer = PlummerField::new(1.0);
        plummer.set_parameters(4.0, 0.5).unwrap();

        for r in [0.1, 0.5, 3.0] {
            assert_eq!(smeared.density(r), plummer.density(r));
            assert_eq!(smeared.enclosed_mass(r), plummer.enclosed_mass(r));
        }
        // central density, not the uniform 3M/(4πa²)
        assert_relative_eq!(smeared.density(0.0), 3.0 * 4.0 / (4.0 * PI * 0.125));

        let bare = point(4.0);
        assert_eq!(bare.density(0.3), 0.0);
        assert_relative_eq!(bare.enclosed_mass(0.3), 4.0);
    }

    #[test]
    fn negative_parameters_are_rejected() {
        let mut f = PlummerField::new(1.0);
        assert!(matches!(f.set_parameters(-1.0, 0.1), Err(BridgeError::InvalidConfiguration(_))));
        assert!(matches!(f.set_parameters(1.0, -0.1), Err(BridgeError::InvalidConfiguration(_))));
        assert!(matches!(f.set_softening(-1e-4), Err(BridgeError::InvalidConfiguration(_))));
    }
}
