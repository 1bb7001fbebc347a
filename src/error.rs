//! Error types for railway block operations.

use alloc::string::String;
use core::fmt;

/// Errors that can occur while building or loading a railway block.
#[derive(Debug, Clone, PartialEq)]
pub enum RailwayError {
    /// Snapshot record carries a type tag no element answers to.
    UnknownElementType(String),
    /// Pin level must be 0, 1 or 2.
    InvalidPinLevel(i64),
    /// Snapshot record has the wrong number of boundary points for its type.
    PointCountMismatch { expected: usize, found: usize },
    /// Element id does not refer to an element of the block.
    ElementOutOfBounds { index: usize, count: usize },
    /// Slot index is not a boundary point of the element.
    SlotOutOfBounds { slot: usize, count: usize },
    /// Particle index is out of bounds.
    ParticleOutOfBounds { index: usize, count: usize },
    /// Connection id does not refer to a connection of the block.
    ConnectionOutOfBounds { index: usize, count: usize },
    /// Particle is an element center, not a boundary point.
    NotAnEndpoint(usize),
    /// Boundary point already takes part in a connection.
    AlreadyConnected(usize),
    /// A particle cannot be connected to itself.
    SelfConnection(usize),
}

impl fmt::Display for RailwayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RailwayError::UnknownElementType(tag) => write!(f, "unknown element type tag {:?}", tag),
            RailwayError::InvalidPinLevel(level) => write!(f, "pin level {} is not 0, 1 or 2", level),
            RailwayError::PointCountMismatch { expected, found } => {
                write!(f, "expected {} boundary points, found {}", expected, found)
            }
            RailwayError::ElementOutOfBounds { index, count } => {
                write!(f, "element index {} out of bounds (count: {})", index, count)
            }
            RailwayError::SlotOutOfBounds { slot, count } => {
                write!(f, "slot {} out of bounds (points: {})", slot, count)
            }
            RailwayError::ParticleOutOfBounds { index, count } => {
                write!(f, "particle index {} out of bounds (count: {})", index, count)
            }
            RailwayError::ConnectionOutOfBounds { index, count } => {
                write!(f, "connection index {} out of bounds (count: {})", index, count)
            }
            RailwayError::NotAnEndpoint(index) => write!(f, "particle {} is an element center", index),
            RailwayError::AlreadyConnected(index) => write!(f, "particle {} is already connected", index),
            RailwayError::SelfConnection(index) => write!(f, "particle {} cannot connect to itself", index),
        }
    }
}
