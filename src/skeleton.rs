//! Hand skeleton reconstruction.
//!
//! Joint poses arrive in tracking space. Every joint is re-expressed relative
//! to the wrist so the markers can hang under the device node, which itself
//! follows the wrist.

use crate::scene::{NodeId, SceneGraph, Transform};
use crate::snapshot::{HandData, JointData, JOINT_COUNT, LITTLE_PHALANX_TIP};
use glam::{Quat, Vec3};

/// Marker scale used when the host reports no joint radius.
pub const DEFAULT_JOINT_SCALE: f32 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointNode {
    pub node: NodeId,
    /// Last wrist-relative transform written to the node
    pub transform: Transform,
    /// Whether the joint was enabled in the latest hand snapshot
    pub tracked: bool,
}

/// Pose of `joint` in the wrist's local space.
pub fn wrist_relative(wrist: &JointData, joint: &JointData) -> (Vec3, Quat) {
    let offset = wrist.rotation.inverse();
    (
        offset * (joint.position - wrist.position),
        offset * joint.rotation,
    )
}

/// Fixed-capacity arena of joint markers, one slot per joint index.
///
/// Slots fill the first time their joint is seen enabled and are never
/// emptied afterwards; a joint that drops out of tracking keeps its node and
/// its last pose.
#[derive(Debug, Clone)]
pub struct HandSkeleton {
    slots: [Option<JointNode>; JOINT_COUNT],
    default_scale: f32,
}

impl Default for HandSkeleton {
    fn default() -> Self {
        Self::new(DEFAULT_JOINT_SCALE)
    }
}

impl HandSkeleton {
    pub fn new(default_scale: f32) -> Self {
        Self {
            slots: [None; JOINT_COUNT],
            default_scale,
        }
    }

    fn joint_scale(&self, joint: &JointData) -> Vec3 {
        if joint.radius > 0.0 {
            Vec3::splat(joint.radius)
        } else {
            Vec3::splat(self.default_scale)
        }
    }

    /// Write every enabled joint of `data` to its marker under `parent`,
    /// spawning markers on first sight. Returns the number of new markers.
    pub fn update(&mut self, data: &HandData, parent: NodeId, scene: &mut dyn SceneGraph) -> usize {
        let wrist = *data.wrist();
        let mut spawned = 0;

        for (index, joint) in data.joints.iter().enumerate().take(LITTLE_PHALANX_TIP + 1) {
            if !joint.enabled {
                if let Some(slot) = self.slots[index].as_mut() {
                    slot.tracked = false;
                }
                continue;
            }

            let (position, rotation) = wrist_relative(&wrist, joint);
            let transform = Transform {
                position,
                rotation,
                scale: self.joint_scale(joint),
            };

            if let Some(slot) = self.slots[index].as_mut() {
                slot.transform = transform;
                slot.tracked = true;
                scene.set_local_transform(slot.node, &transform);
                continue;
            }

            let node = scene.spawn_joint(parent, index, &transform);
            log::debug!("Spawned hand joint {} as {:?}", index, node);
            self.slots[index] = Some(JointNode {
                node,
                transform,
                tracked: true,
            });
            spawned += 1;
        }

        spawned
    }

    pub fn joint(&self, index: usize) -> Option<&JointNode> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    /// All allocated joint markers in index order.
    pub fn joints(&self) -> impl Iterator<Item = &JointNode> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.joints().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Handedness;
    use crate::scene::SceneTree;

    fn joint(position: Vec3, rotation: Quat, radius: f32) -> JointData {
        JointData {
            enabled: true,
            position,
            rotation,
            radius,
        }
    }

    fn hand_with(joints: &[(usize, JointData)]) -> HandData {
        let mut data = HandData::new(Handedness::Right, true);
        for (index, j) in joints {
            data.joints[*index] = *j;
        }
        data
    }

    #[test]
    fn test_wrist_relative_pose() {
        let wrist = joint(Vec3::new(0.1, 1.2, -0.3), Quat::from_rotation_y(1.0), 0.02);
        let finger = joint(
            Vec3::new(0.15, 1.25, -0.4),
            Quat::from_rotation_x(0.4) * Quat::from_rotation_y(1.0),
            0.01,
        );

        let (position, rotation) = wrist_relative(&wrist, &finger);
        let expected_position = wrist.rotation.inverse() * (finger.position - wrist.position);
        let expected_rotation = wrist.rotation.inverse() * finger.rotation;
        assert!(position.abs_diff_eq(expected_position, 1e-6));
        assert!(rotation.abs_diff_eq(expected_rotation, 1e-6));

        // Transforming back lands on the original tracking-space position
        let back = wrist.position + wrist.rotation * position;
        assert!(back.abs_diff_eq(finger.position, 1e-5));
    }

    #[test]
    fn test_wrist_maps_to_origin() {
        let wrist = joint(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_z(0.3), 0.0);
        let (position, rotation) = wrist_relative(&wrist, &wrist);
        assert!(position.abs_diff_eq(Vec3::ZERO, 1e-6));
        assert!(rotation.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn test_update_reuses_nodes() {
        let mut scene = SceneTree::new();
        let root = scene.create_node("hand", None);
        let mut skeleton = HandSkeleton::default();

        let first = hand_with(&[
            (0, joint(Vec3::ZERO, Quat::IDENTITY, 0.02)),
            (1, joint(Vec3::X, Quat::IDENTITY, 0.01)),
        ]);
        assert_eq!(skeleton.update(&first, root, &mut scene), 2);
        let node = skeleton.joint(1).map(|j| j.node);

        let second = hand_with(&[
            (0, joint(Vec3::ZERO, Quat::IDENTITY, 0.02)),
            (1, joint(Vec3::Y, Quat::IDENTITY, 0.01)),
        ]);
        assert_eq!(skeleton.update(&second, root, &mut scene), 0);
        assert_eq!(skeleton.len(), 2);
        assert_eq!(skeleton.joint(1).map(|j| j.node), node);
        assert_eq!(scene.len(), 3);
        assert_eq!(
            skeleton.joint(1).map(|j| j.transform.position),
            Some(Vec3::Y)
        );
    }

    #[test]
    fn test_disabled_joint_keeps_node_and_pose() {
        let mut scene = SceneTree::new();
        let root = scene.create_node("hand", None);
        let mut skeleton = HandSkeleton::default();

        let tracked = hand_with(&[
            (0, joint(Vec3::ZERO, Quat::IDENTITY, 0.0)),
            (5, joint(Vec3::Z, Quat::IDENTITY, 0.0)),
        ]);
        skeleton.update(&tracked, root, &mut scene);

        let mut lost = tracked.clone();
        lost.joints[5].enabled = false;
        lost.joints[5].position = Vec3::splat(9.0);
        skeleton.update(&lost, root, &mut scene);

        let slot = skeleton.joint(5).copied();
        assert_eq!(skeleton.len(), 2);
        assert_eq!(slot.map(|s| s.tracked), Some(false));
        assert_eq!(slot.map(|s| s.transform.position), Some(Vec3::Z));
    }

    #[test]
    fn test_joint_scale_from_radius() {
        let mut scene = SceneTree::new();
        let root = scene.create_node("hand", None);
        let mut skeleton = HandSkeleton::default();

        let data = hand_with(&[
            (0, joint(Vec3::ZERO, Quat::IDENTITY, 0.0)),
            (2, joint(Vec3::X, Quat::IDENTITY, 0.012)),
        ]);
        skeleton.update(&data, root, &mut scene);

        assert_eq!(
            skeleton.joint(0).map(|j| j.transform.scale),
            Some(Vec3::splat(DEFAULT_JOINT_SCALE))
        );
        assert_eq!(
            skeleton.joint(2).map(|j| j.transform.scale),
            Some(Vec3::splat(0.012))
        );
    }
}
