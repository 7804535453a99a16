use glam::{Quat, Vec3};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use xrinput::native::{
    DeviceCharacteristics, HapticCapabilities, NativeDevice, NativeDeviceInfo, NativeFeatures,
};
use xrinput::snapshot::{JOINT_COUNT, LITTLE_PHALANX_TIP};
use xrinput::{
    ActiveSource, AxisType, ButtonType, ControllerConfig, ControllerData, HandData, Handedness,
    JointData, NodeId, PulseRoute, SceneGraph, SceneTree, XrBroadcaster, XrController,
};

struct Pad {
    info: NativeDeviceInfo,
    features: Arc<Mutex<NativeFeatures>>,
}

impl NativeDevice for Pad {
    fn info(&self) -> &NativeDeviceInfo {
        &self.info
    }

    fn features(&self) -> NativeFeatures {
        *self.features.lock().unwrap()
    }

    fn haptic_capabilities(&self) -> Option<HapticCapabilities> {
        Some(HapticCapabilities {
            num_channels: 1,
            supports_impulse: true,
        })
    }

    fn send_haptic_impulse(&mut self, _: u32, _: f32, _: Duration) -> anyhow::Result<()> {
        Ok(())
    }
}

struct World {
    scene: SceneTree,
    broadcaster: XrBroadcaster,
    left: XrController,
    right: XrController,
    left_model: NodeId,
    right_model: NodeId,
}

impl World {
    fn new() -> Self {
        let mut scene = SceneTree::new();
        let mut broadcaster = XrBroadcaster::new();
        let left_model = scene.create_node("left model", None);
        let right_model = scene.create_node("right model", None);

        let mut left = XrController::new(ControllerConfig::for_hand(Handedness::Left), &mut scene)
            .with_visuals(vec![left_model]);
        let mut right = XrController::new(ControllerConfig::for_hand(Handedness::Right), &mut scene)
            .with_visuals(vec![right_model]);
        left.enable(&mut broadcaster, &mut scene);
        right.enable(&mut broadcaster, &mut scene);

        Self {
            scene,
            broadcaster,
            left,
            right,
            left_model,
            right_model,
        }
    }

    fn tick(&mut self) {
        self.left.update(&mut self.scene);
        self.right.update(&mut self.scene);
    }
}

fn full_hand(hand: Handedness) -> HandData {
    let mut data = HandData::new(hand, true);
    for (i, joint) in data.joints.iter_mut().enumerate() {
        *joint = JointData {
            enabled: true,
            position: Vec3::new(0.01 * i as f32, 1.0, 0.0),
            rotation: Quat::IDENTITY,
            radius: 0.008,
        };
    }
    data
}

#[test]
fn test_snapshots_reach_only_their_hand() {
    let mut world = World::new();

    let mut data = ControllerData::new(Handedness::Left, true);
    data.trigger = 1.0;
    world.broadcaster.publish_controller(data);
    world.tick();

    assert!(world.left.get_button(ButtonType::Trigger));
    assert_eq!(world.left.active_source(), ActiveSource::Controller);
    assert!(world.scene.is_active(world.left_model));

    assert!(!world.right.get_button(ButtonType::Trigger));
    assert_eq!(world.right.buttons().observed(), 0);
    assert_eq!(world.right.active_source(), ActiveSource::Disabled);
    assert!(!world.scene.is_active(world.right_model));
}

#[test]
fn test_edges_across_ticks() {
    let mut world = World::new();
    let mut downs = 0;
    let mut ups = 0;

    for value in [0.0, 1.0, 1.0, 1.0, 0.0, 0.0] {
        let mut data = ControllerData::new(Handedness::Right, true);
        data.button_a = value;
        world.broadcaster.publish_controller(data);
        world.tick();

        if world.right.get_button_down(ButtonType::ButtonA) {
            downs += 1;
        }
        if world.right.get_button_up(ButtonType::ButtonA) {
            ups += 1;
        }
    }

    assert_eq!(downs, 1);
    assert_eq!(ups, 1);
}

#[test]
fn test_hand_tracking_session() {
    let mut world = World::new();

    world
        .broadcaster
        .publish_controller(ControllerData::new(Handedness::Right, true));
    world.tick();
    assert!(world.scene.is_active(world.right_model));

    world.broadcaster.publish_hand(full_hand(Handedness::Right));
    world.tick();
    assert_eq!(world.right.active_source(), ActiveSource::Hand);
    assert!(!world.scene.is_active(world.right_model));
    assert_eq!(world.right.skeleton().len(), LITTLE_PHALANX_TIP + 1);
    let nodes_after_first = world.scene.len();

    // Same joints again: nodes are reused
    world.broadcaster.publish_hand(full_hand(Handedness::Right));
    world.tick();
    assert_eq!(world.scene.len(), nodes_after_first);

    // Partial tracking loss never shrinks the cache
    let mut partial = full_hand(Handedness::Right);
    for joint in partial.joints.iter_mut().skip(10) {
        joint.enabled = false;
    }
    world.broadcaster.publish_hand(partial);
    world.tick();
    assert_eq!(world.right.skeleton().len(), JOINT_COUNT);
    assert!(world.right.skeleton().joints().filter(|j| !j.tracked).count() == JOINT_COUNT - 10);

    // Hand tracking off: markers hidden, cache kept
    world
        .broadcaster
        .publish_hand(HandData::new(Handedness::Right, false));
    world.tick();
    assert!(!world.right.hand_joints_visible());
    assert_eq!(world.right.skeleton().len(), JOINT_COUNT);
    assert!(world
        .right
        .skeleton()
        .joints()
        .all(|j| !world.scene.is_active(j.node)));

    // The left hand never saw any of it
    assert!(world.left.skeleton().is_empty());
}

#[test]
fn test_fallback_follows_subsystem_availability() {
    let mut world = World::new();
    let features = Arc::new(Mutex::new(NativeFeatures {
        trigger: 0.99,
        grip: 0.5,
        ..Default::default()
    }));
    let pad = Box::new(Pad {
        info: NativeDeviceInfo {
            id: "pad/LEFT".to_string(),
            name: "Pad".to_string(),
            characteristics: DeviceCharacteristics::controller(Handedness::Left),
        },
        features: features.clone(),
    });
    assert!(world.left.handle_device_connected(pad, &mut world.scene));

    world.tick();
    assert!(world.left.get_button(ButtonType::Trigger));
    assert_eq!(world.left.get_axis(AxisType::Grip), 0.5);
    assert!(!world.left.get_button(ButtonType::Grip));
    assert_eq!(world.left.pulse(0.4, 30.0), PulseRoute::Native);

    // Once the host is up the native device is neither polled nor pulsed
    world.broadcaster.set_subsystem_available(true);
    features.lock().unwrap().trigger = 0.0;
    world.tick();
    assert!(world.left.get_button(ButtonType::Trigger));
    assert_eq!(world.left.pulse(0.4, 30.0), PulseRoute::Subsystem);
    assert_eq!(world.broadcaster.take_haptic_requests().len(), 1);
}

#[test]
fn test_disabled_controller_stops_listening() {
    let mut world = World::new();
    world.left.disable(&mut world.broadcaster, &mut world.scene);

    let mut data = ControllerData::new(Handedness::Left, true);
    data.trigger = 1.0;
    // Only the right hand is still listening
    assert_eq!(world.broadcaster.publish_controller(data), 1);
    world.tick();
    assert!(!world.left.get_button(ButtonType::Trigger));
    assert_eq!(world.left.pulse(1.0, 10.0), PulseRoute::Dropped);
}
