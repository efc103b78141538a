pub mod simulation;
pub mod configuration;

pub use simulation::states::{Particle, Checkpoint, NVec3};
pub use simulation::error::{BridgeError, Result};
pub use simulation::params::{Parameters, BridgeParameters, Coupling};
pub use simulation::potentials::{PotentialField, PointMassField, PlummerField, FieldKind, FieldParameters, Differencing, finite_difference_gravity};
pub use simulation::member::BridgeMember;
pub use simulation::source::ForceSource;
pub use simulation::forces::{Acceleration3, AccelSet3, NewtonianGravity3};
pub use simulation::direct::DirectNBody;
pub use simulation::bridge::{BridgeCoupler, CouplerState};
pub use simulation::energy::{EnergyTracker, EnergySnapshot, EnergyConvention, center_of_mass, total_momentum, total_mass};
pub use simulation::report::{Report, ReportSink, LogSink};
pub use simulation::scenario::{Scenario, RunSummary};

pub use configuration::config::{ScenarioConfig, BridgeConfig, ParametersConfig, BodyConfig, SourceConfig};
