pub mod states;
pub mod error;
pub mod params;
pub mod potentials;
pub mod member;
pub mod source;
pub mod forces;
pub mod integrator;
pub mod direct;
pub mod bridge;
pub mod energy;
pub mod report;
pub mod scenario;
