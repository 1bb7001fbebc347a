//! Save and restore a block as a flat list of element records.
//!
//! Records carry positions and pin levels only. Velocities and connections
//! are not stored; use [`RailwayBlock::connect_coincident`] after loading to
//! rebuild joints.

use crate::block::RailwayBlock;
use crate::element::{ElementKind, PinLevel};
use crate::error::RailwayError;
use crate::float::Float;
use crate::vec::Vec2;
use alloc::string::{String, ToString};
use alloc::vec::Vec as AllocVec;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedPoint<F> {
    pub x: F,
    pub y: F,
}

impl<F: Float> From<Vec2<F>> for SerializedPoint<F> {
    fn from(v: Vec2<F>) -> Self {
        SerializedPoint { x: v.x, y: v.y }
    }
}

impl<F: Float> From<SerializedPoint<F>> for Vec2<F> {
    fn from(p: SerializedPoint<F>) -> Self {
        Vec2::new(p.x, p.y)
    }
}

/// One element as stored in a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord<F> {
    /// `"s"`, `"r"` or `"v"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub center: SerializedPoint<F>,
    pub points: AllocVec<SerializedPoint<F>>,
    /// 0 free, 1 center, 2 ends. Anything else is ignored on load.
    #[serde(default)]
    pub pins: i64,
}

pub type Snapshot<F> = AllocVec<ElementRecord<F>>;

impl<F: Float> ElementRecord<F> {
    /// Resolve the record's tag to an element kind. Round convexity is not
    /// stored; it follows from which side of the center the chord bends.
    fn element_kind(&self) -> Result<ElementKind, RailwayError> {
        let kind = match self.kind.as_str() {
            "s" => ElementKind::Straight,
            "v" => ElementKind::Split,
            "r" => {
                let convex = match self.points.as_slice() {
                    [p0, p1, ..] => {
                        let c = Vec2::from(self.center);
                        (Vec2::from(*p0) - c).cross(Vec2::from(*p1) - c) >= F::zero()
                    }
                    _ => true,
                };
                ElementKind::Round { convex }
            }
            other => return Err(RailwayError::UnknownElementType(other.to_string())),
        };
        if self.points.len() != kind.point_count() {
            return Err(RailwayError::PointCountMismatch {
                expected: kind.point_count(),
                found: self.points.len(),
            });
        }
        Ok(kind)
    }
}

impl<F: Float> RailwayBlock<F> {
    /// Record every element in block order.
    pub fn serialize(&self) -> Snapshot<F> {
        self.elements
            .iter()
            .map(|element| ElementRecord {
                kind: element.kind().tag().to_string(),
                center: self.particles[element.center].pos.into(),
                points: element.points.iter().map(|&i| self.particles[i].pos.into()).collect(),
                pins: i64::from(element.pins.as_u8()),
            })
            .collect()
    }

    /// Replace the block's contents with the recorded elements.
    ///
    /// Records with an unknown tag or the wrong number of points are skipped;
    /// the return value counts them. Out-of-range pin levels leave the
    /// element free. Restored particles are at rest. `frame_index` keeps
    /// counting from where it was.
    pub fn deserialize(&mut self, records: &[ElementRecord<F>]) -> usize {
        self.clear();
        let mut dropped = 0;
        for (index, record) in records.iter().enumerate() {
            let kind = match record.element_kind() {
                Ok(kind) => kind,
                Err(err) => {
                    warn!("dropping snapshot record {}: {}", index, err);
                    dropped += 1;
                    continue;
                }
            };

            let id = self.add_element(kind);
            let element = &self.elements[id.0];
            let center = element.center;
            let points = element.points.clone();
            self.particles[center].set_at_rest(record.center.into());
            for (&i, p) in points.iter().zip(&record.points) {
                self.particles[i].set_at_rest((*p).into());
            }

            match PinLevel::try_from(record.pins) {
                Ok(PinLevel::Free) => {}
                Ok(level) => {
                    // The id was just created, so this cannot fail.
                    let _ = self.set_pins(id, level);
                }
                Err(err) => warn!("element {}: {}, leaving it free", id.0, err),
            }
        }
        debug!("loaded {} elements ({} records dropped)", self.elements.len(), dropped);
        dropped
    }
}
