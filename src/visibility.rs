use crate::scene::{NodeId, SceneGraph};
use crate::skeleton::HandSkeleton;

/// Switches between the controller model and the hand joint markers.
#[derive(Debug, Clone, Default)]
pub struct VisibilityController {
    visuals: Vec<NodeId>,
    hand_joints_visible: bool,
}

impl VisibilityController {
    pub fn new(visuals: Vec<NodeId>) -> Self {
        Self {
            visuals,
            hand_joints_visible: false,
        }
    }

    pub fn visuals(&self) -> &[NodeId] {
        &self.visuals
    }

    pub fn hand_joints_visible(&self) -> bool {
        self.hand_joints_visible
    }

    /// Show or hide every controller visual.
    pub fn set_visible(&self, scene: &mut dyn SceneGraph, visible: bool) {
        for node in &self.visuals {
            scene.set_active(*node, visible);
        }
    }

    /// Show or hide every joint marker. Skipped when already in that state,
    /// as it runs on every hand snapshot.
    pub fn set_hand_joints_visible(
        &mut self,
        scene: &mut dyn SceneGraph,
        skeleton: &HandSkeleton,
        visible: bool,
    ) {
        if self.hand_joints_visible == visible {
            return;
        }
        self.hand_joints_visible = visible;
        for joint in skeleton.joints() {
            scene.set_active(joint.node, visible);
        }
    }
}
