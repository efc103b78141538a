//! Error types for the bridge and its members.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BridgeError {
    #[error("cannot evolve backwards: requested t = {requested}, current t = {current}")]
    InvalidTimeOrder { requested: f64, current: f64 },

    #[error("gravity queried at the field centre (finite-difference step is zero)")]
    DegenerateQuery,

    #[error("member {member} is at t = {member_time} but the bridge is at t = {coupler_time}")]
    StateConsistency {
        member: usize,
        member_time: f64,
        coupler_time: f64,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("bridge has been stopped")]
    Stopped,
}

pub type Result<T> = std::result::Result<T, BridgeError>;
