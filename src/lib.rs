//! Wooden railway puzzle core.
//!
//! `woodrail` simulates a table of wooden track pieces as a Verlet particle
//! system. Every piece is a small rigid body of particles (a center plus one
//! particle per track end) held together by constraints. Pieces are joined by
//! connections between their ends, checked for overlap through their drawn
//! outlines, and can carry a train along the track.
//!
//! # Features
//!
//! - **Track pieces**: straight, round (convex or concave) and split
//! - **Constraint solver**: distance, angle, pin and shape matching, relaxed
//!   Gauss-Seidel style every frame
//! - **Intersections**: outlines flattened from path commands, cached per frame
//! - **Snapshots**: serde records for saving and loading a layout
//! - **Trains**: place a train on a piece and drive it across connections
//! - **Observable**: monitor frames via the `StepObserver` trait
//! - **`no_std` compatible**: needs only `alloc`

#![no_std]

extern crate alloc;

pub mod float;
pub mod vec;
pub mod particle;
pub mod constraint;
pub mod config;
pub mod observer;
pub mod error;
pub mod outline;
pub mod shape;
pub mod element;
pub mod block;
pub mod snapshot;
pub mod solver;
pub mod route;

// Re-export primary API
pub use float::Float;
pub use vec::Vec2;
pub use particle::Particle;
pub use constraint::{Constraint, DistanceConstraint, PinConstraint, AngleConstraint, ShapeConstraint};
pub use config::{SolverConfig, BlockConfig, ConstraintRegime};
pub use observer::{StepObserver, NoOpStepObserver};
pub use error::RailwayError;
pub use outline::{DrawingContext, OutlineContext, Polygon};
pub use shape::{TrackShape, TrainPose, Straight, Round, Split};
pub use element::{ElementId, ElementKind, PinLevel, RailwayElement};
pub use block::{RailwayBlock, Connection, ConnectionId, ConstraintOwner};
pub use snapshot::{ElementRecord, SerializedPoint, Snapshot};
pub use solver::Integrator;
pub use route::{TrainCursor, Switch};
