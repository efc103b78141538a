//! Build fully-initialized bridged scenarios from configuration and run them
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime bundle
//! (`Scenario`) containing:
//! - numerical parameters (`Parameters`)
//! - the bridge with one member per configured source, at `t_start`
//! - the energy tracker used for the drift diagnostic
//!
//! `Scenario::run` is the driver loop: advance by one reporting interval,
//! report `(t, positions, dE/E)`, repeat until `t_end`, then stop the bridge.

use log::info;

use crate::configuration::config::{BodyConfig, ScenarioConfig, SourceConfig};
use crate::simulation::bridge::BridgeCoupler;
use crate::simulation::direct::DirectNBody;
use crate::simulation::energy::{EnergySnapshot, EnergyTracker};
use crate::simulation::error::{BridgeError, Result};
use crate::simulation::integrator::SUBSTEP_TOLERANCE;
use crate::simulation::params::{BridgeParameters, Parameters};
use crate::simulation::report::{Report, ReportSink};
use crate::simulation::source::ForceSource;
use crate::simulation::states::{NVec3, Particle};

/// Runtime bundle built from a [`ScenarioConfig`]
pub struct Scenario {
    pub parameters: Parameters,
    pub bridge: BridgeCoupler,
    pub energy: EnergyTracker,
}

/// What a finished run looked like
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub model_time: f64,
    pub reports: usize, // including the initial one
    pub max_abs_drift: f64,
    pub initial: EnergySnapshot,
    pub last: EnergySnapshot,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        // Parameters (runtime) from the bridge and parameters sections
        let b_cfg = cfg.bridge;
        let timestep = b_cfg.timestep.unwrap_or(0.5 * b_cfg.report_interval);
        let parameters = Parameters {
            t_end: b_cfg.t_end,
            report_interval: b_cfg.report_interval,
            G: cfg.parameters.G,
            differencing: cfg.parameters.differencing,
            bridge: BridgeParameters::new(timestep)
                .with_coupling(b_cfg.coupling)
                .starting_at(b_cfg.t_start),
        };
        parameters.validate()?;

        let mut bridge = BridgeCoupler::new(parameters.bridge.clone())?;
        let t_start = parameters.bridge.t_start;

        // Members: one per field body, one per direct group
        let mut body_index = 0usize;
        for (si, source) in cfg.sources.iter().enumerate() {
            match source {
                SourceConfig::Field { field, epsilon2, bodies } => {
                    for bc in bodies {
                        let particle = to_particle(bc, body_index)?;
                        body_index += 1;

                        let mut potential = field.build(parameters.G, parameters.differencing);
                        potential.set_softening(*epsilon2)?;

                        let mut member = ForceSource::new(potential)
                            .with_label(particle.name.clone())
                            .starting_at(t_start);
                        member.add_particle(particle)?;
                        bridge.add_member(Box::new(member))?;
                    }
                }
                SourceConfig::Direct { eps2, h0, bodies } => {
                    let mut member = DirectNBody::new(parameters.G, *eps2, *h0)?
                        .with_label(format!("direct-{si}"))
                        .starting_at(t_start);
                    for bc in bodies {
                        member.add_particle(to_particle(bc, body_index)?)?;
                        body_index += 1;
                    }
                    bridge.add_member(Box::new(member))?;
                }
            }
        }
        bridge.validate_couplings()?;
        let energy = EnergyTracker::new(b_cfg.energy);
        energy.check(&bridge)?;

        info!(
            "scenario: {} members, {} bodies, {} couplings, dt = {}, t_end = {}",
            bridge.len(),
            body_index,
            bridge.couplings().len(),
            timestep,
            parameters.t_end
        );

        Ok(Self {
            parameters,
            bridge,
            energy,
        })
    }

    /// Drive the bridge to `t_end`, reporting every interval, then stop it.
    /// The bridge is stopped whether or not the run succeeds.
    pub fn run(&mut self, sink: &mut dyn ReportSink) -> Result<RunSummary> {
        let outcome = self.drive(sink);
        self.bridge.stop();
        outcome
    }

    fn drive(&mut self, sink: &mut dyn ReportSink) -> Result<RunSummary> {
        let dt = self.parameters.report_interval;
        let t_end = self.parameters.t_end;

        let initial = self.energy.measure(&self.bridge);
        let mut last = initial;
        let mut max_abs_drift: f64 = 0.0;
        let mut reports = 1usize;

        sink.report(&Report {
            model_time: self.bridge.model_time(),
            positions: self.bridge.positions(),
            energy_drift: 0.0,
        });

        while t_end - self.bridge.model_time() > SUBSTEP_TOLERANCE * dt {
            let remaining = t_end - self.bridge.model_time();
            let target = if remaining <= dt * (1.0 + SUBSTEP_TOLERANCE) {
                t_end
            } else {
                self.bridge.model_time() + dt
            };
            self.bridge.advance(target)?;

            last = self.energy.measure(&self.bridge);
            let energy_drift = last.relative_drift(&initial);
            // f64::max would drop a NaN drift; once seen it sticks
            if !max_abs_drift.is_nan() && !(energy_drift.abs() <= max_abs_drift) {
                max_abs_drift = energy_drift.abs();
            }

            sink.report(&Report {
                model_time: self.bridge.model_time(),
                positions: self.bridge.positions(),
                energy_drift,
            });
            reports += 1;
        }

        Ok(RunSummary {
            model_time: self.bridge.model_time(),
            reports,
            max_abs_drift,
            initial,
            last,
        })
    }
}

/// Map a `BodyConfig` to a runtime `Particle`
fn to_particle(bc: &BodyConfig, index: usize) -> Result<Particle> {
    let vec3 = |what: &str, values: &[f64]| -> Result<NVec3> {
        match values {
            [x, y, z] => Ok(NVec3::new(*x, *y, *z)),
            _ => Err(BridgeError::InvalidConfiguration(format!(
                "body {index}: {what} needs 3 components, got {}",
                values.len()
            ))),
        }
    };

    let particle = Particle::new(
        bc.name.clone().unwrap_or_else(|| format!("body-{index}")),
        vec3("x", &bc.x)?,
        vec3("v", &bc.v)?,
        bc.m,
        bc.radius,
    );
    particle.validate()?;
    Ok(particle)
}
