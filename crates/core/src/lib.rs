//! Funnel forecasting engine: forward model, goal-seeking solver and
//! insight rules behind the ROAS projector.

pub mod config;
pub mod error;
pub mod funnel;
pub mod insights;
pub mod projector;
pub mod solver;
pub mod types;

pub use config::{AppConfig, Benchmarks};
pub use error::{ProjectorError, ProjectorResult};
pub use funnel::{compute, ForwardFunnel, FunnelModel};
pub use insights::generate_insights;
pub use projector::{Projection, RoasProjector};
pub use solver::{goal_seek, solve_for_target, GoalSeekReport};
