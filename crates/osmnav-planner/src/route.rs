//! The published route: an ordered sequence of planar poses.

use osmnav_core::{NodeId, Pose};
use osmnav_spatial::NodeTable;

/// Ordered pose sequence from the agent's position to the literal goal.
///
/// Node poses carry the travel direction as yaw (each node points at its
/// successor; the final node points at the goal), and the literal goal
/// pose is appended last: the goal need not coincide with a graph node.
///
/// Rebuilt wholesale on every successful plan; a failed plan leaves the
/// previously published route untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    poses: Vec<Pose>,
}

impl Route {
    /// Two-point route used when start and goal are within footway
    /// clearance and graph search is skipped.
    pub fn direct(start: Pose, goal: Pose) -> Self {
        Self { poses: vec![start, goal] }
    }

    /// Expand a node-id path into poses and append the literal goal.
    ///
    /// `ids` must come from a search over the same node table; foreign ids
    /// are skipped.
    pub(crate) fn from_node_ids(nodes: &NodeTable, ids: &[NodeId], goal: Pose) -> Self {
        let mut poses = Vec::with_capacity(ids.len() + 1);
        for (i, &id) in ids.iter().enumerate() {
            let Some(position) = nodes.planar(id) else {
                continue;
            };
            let toward = match ids.get(i + 1).and_then(|&next| nodes.planar(next)) {
                Some(next) => next,
                None => goal.position,
            };
            poses.push(Pose::new(position, position.bearing(toward)));
        }
        poses.push(goal);
        Self { poses }
    }

    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}
