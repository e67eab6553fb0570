//! Directed path segments consumed from the path model.

use serde::Deserialize;

/// Maximum number of segments in one path.
pub const MAX_PATH_SEGMENTS: usize = 32;

/// Node identifier in the path graph.
pub type NodeId = u32;

/// What the planner needs to know about one directed edge of the path.
pub trait PathSegment {
    /// Stable edge identifier.
    fn id(&self) -> u32;

    /// Length of the edge (`>= 0`).
    fn length(&self) -> f64;

    /// Speed limit on the edge.
    fn max_velocity(&self) -> f64;

    /// Node the edge leaves from.
    fn start_node(&self) -> NodeId;

    /// Node the edge arrives at.
    fn end_node(&self) -> NodeId;
}

impl<T: PathSegment + ?Sized> PathSegment for &T {
    fn id(&self) -> u32 {
        (**self).id()
    }

    fn length(&self) -> f64 {
        (**self).length()
    }

    fn max_velocity(&self) -> f64 {
        (**self).max_velocity()
    }

    fn start_node(&self) -> NodeId {
        (**self).start_node()
    }

    fn end_node(&self) -> NodeId {
        (**self).end_node()
    }
}

/// Plain path segment, as found in `[[segments]]` configuration entries.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    /// Edge identifier.
    pub id: u32,

    /// Edge length.
    pub length: f64,

    /// Edge speed limit.
    pub max_velocity: f64,

    /// Start node.
    pub start_node: NodeId,

    /// End node.
    pub end_node: NodeId,
}

impl Segment {
    /// Create a segment.
    pub const fn new(id: u32, length: f64, max_velocity: f64, start_node: NodeId, end_node: NodeId) -> Self {
        Self {
            id,
            length,
            max_velocity,
            start_node,
            end_node,
        }
    }
}

impl PathSegment for Segment {
    fn id(&self) -> u32 {
        self.id
    }

    fn length(&self) -> f64 {
        self.length
    }

    fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    fn start_node(&self) -> NodeId {
        self.start_node
    }

    fn end_node(&self) -> NodeId {
        self.end_node
    }
}
