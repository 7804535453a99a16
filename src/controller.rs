//! One logical XR controller: merges controller snapshots, hand tracking and
//! the native fallback device into a single button/axis/pose state.

use crate::broadcast::{Subscription, XrBroadcaster, XrEvent};
use crate::config::ControllerConfig;
use crate::haptics::{dispatch_pulse, PulseRoute};
use crate::input::{
    Axis2DType, AxisType, AxisValues, ButtonState, ButtonTable, ButtonType, Handedness,
};
use crate::native::{
    DeviceCharacteristics, HapticCapabilities, NativeDevice, NativeDeviceInfo, NativeFeatures,
};
use crate::scene::{NodeId, SceneGraph, Transform};
use crate::skeleton::HandSkeleton;
use crate::snapshot::{ControllerData, HandData, HeadPose, HeadsetData};
use crate::visibility::VisibilityController;
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

/// Native trigger/grip readings this close to either end snap to it.
pub const SNAP_EPSILON: f32 = 0.02;

/// Snap analog readings near 0 or 1 to the exact extreme.
pub fn snap_to_extremes(value: f32) -> f32 {
    if value <= SNAP_EPSILON {
        0.0
    } else if value >= 1.0 - SNAP_EPSILON {
        1.0
    } else {
        value
    }
}

/// Which input currently drives the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveSource {
    Disabled,
    /// Controller snapshots or the native fallback device
    Controller,
    Hand,
}

struct NativeBinding {
    device: Box<dyn NativeDevice>,
    haptics: Option<HapticCapabilities>,
}

pub struct XrController {
    hand: Handedness,
    config: ControllerConfig,
    root: NodeId,
    transform: Transform,
    buttons: ButtonTable,
    axes: AxisValues,
    skeleton: HandSkeleton,
    visibility: VisibilityController,
    source: ActiveSource,
    head: HeadPose,
    sit_stand: Mat4,
    link: Option<Subscription>,
    native: Option<NativeBinding>,
}

impl XrController {
    /// Create the controller and its root node in `scene`.
    pub fn new(config: ControllerConfig, scene: &mut dyn SceneGraph) -> Self {
        let hand = config.handedness();
        let root = scene.create_node(&format!("{} controller", hand), None);

        Self {
            hand,
            root,
            transform: Transform::default(),
            buttons: ButtonTable::new(),
            axes: AxisValues::default(),
            skeleton: HandSkeleton::new(config.joint_scale),
            visibility: VisibilityController::default(),
            source: ActiveSource::Disabled,
            head: HeadPose::default(),
            sit_stand: Mat4::IDENTITY,
            link: None,
            native: None,
            config,
        }
    }

    /// Scene nodes making up the controller model.
    pub fn with_visuals(mut self, visuals: Vec<NodeId>) -> Self {
        self.visibility = VisibilityController::new(visuals);
        self
    }

    pub fn hand(&self) -> Handedness {
        self.hand
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn active_source(&self) -> ActiveSource {
        self.source
    }

    pub fn head_pose(&self) -> &HeadPose {
        &self.head
    }

    pub fn sit_stand(&self) -> &Mat4 {
        &self.sit_stand
    }

    pub fn skeleton(&self) -> &HandSkeleton {
        &self.skeleton
    }

    pub fn buttons(&self) -> &ButtonTable {
        &self.buttons
    }

    pub fn axes(&self) -> &AxisValues {
        &self.axes
    }

    pub fn hand_joints_visible(&self) -> bool {
        self.visibility.hand_joints_visible()
    }

    pub fn is_enabled(&self) -> bool {
        self.link.is_some()
    }

    pub fn native_device_id(&self) -> Option<&str> {
        self.native.as_ref().map(|b| b.device.info().id.as_str())
    }

    /// Whether the host broadcast path is up. A controller that is not
    /// subscribed has no way to reach it.
    pub fn is_subsystem_available(&self) -> bool {
        self.link
            .as_ref()
            .map(|l| l.is_subsystem_available())
            .unwrap_or(false)
    }

    // Buttons and axes

    pub fn get_button(&self, button: ButtonType) -> bool {
        self.buttons.get_button(button)
    }

    /// True once per press. Consumes the edge, see `ButtonTable`.
    pub fn get_button_down(&mut self, button: ButtonType) -> bool {
        self.buttons.get_button_down(button)
    }

    /// True once per release. Consumes the edge, see `ButtonTable`.
    pub fn get_button_up(&mut self, button: ButtonType) -> bool {
        self.buttons.get_button_up(button)
    }

    pub fn get_axis(&self, axis: AxisType) -> f32 {
        self.axes.get_axis(axis)
    }

    pub fn get_axis_2d(&self, axis: Axis2DType) -> Vec2 {
        self.axes.get_axis_2d(axis)
    }

    // Lifecycle

    /// Start listening to the broadcaster. The model stays hidden until a
    /// source reports in.
    pub fn enable(&mut self, broadcaster: &mut XrBroadcaster, scene: &mut dyn SceneGraph) {
        if self.link.is_none() {
            self.link = Some(broadcaster.subscribe());
            log::info!("{} controller enabled", self.hand);
        }
        self.visibility.set_visible(scene, false);
    }

    pub fn disable(&mut self, broadcaster: &mut XrBroadcaster, scene: &mut dyn SceneGraph) {
        if let Some(link) = self.link.take() {
            broadcaster.unsubscribe(link.id());
            log::info!("{} controller disabled", self.hand);
        }
        self.visibility.set_visible(scene, false);
        self.native = None;
        self.set_source(ActiveSource::Disabled);
    }

    /// Apply everything published since the last tick, then poll the native
    /// device if the host subsystem is down.
    pub fn update(&mut self, scene: &mut dyn SceneGraph) {
        let events = self.link.as_ref().map(|l| l.drain()).unwrap_or_default();
        for event in &events {
            self.handle_event(event, scene);
        }
        self.try_update_buttons();
    }

    pub fn handle_event(&mut self, event: &XrEvent, scene: &mut dyn SceneGraph) {
        match event {
            XrEvent::Controller(data) => self.on_controller_update(data, scene),
            XrEvent::Hand(data) => self.on_hand_update(data, scene),
            XrEvent::Headset(data) => self.on_headset_update(data),
        }
    }

    fn accepts(&self, hand: i32) -> bool {
        hand == self.hand.wire_value()
    }

    fn set_source(&mut self, source: ActiveSource) {
        if self.source != source {
            log::debug!("{} controller source: {:?} -> {:?}", self.hand, self.source, source);
            self.source = source;
        }
    }

    // Sources

    pub fn on_controller_update(&mut self, data: &ControllerData, scene: &mut dyn SceneGraph) {
        if !self.accepts(data.hand) {
            log::trace!("{} controller ignoring controller data for hand {}", self.hand, data.hand);
            return;
        }

        if !data.enabled {
            self.visibility.set_visible(scene, false);
            self.set_source(ActiveSource::Disabled);
            return;
        }
        self.visibility.set_visible(scene, true);
        self.set_source(ActiveSource::Controller);

        let position = if self.config.simulate_3dof {
            self.arm_model_position(data.rotation)
        } else {
            data.position
        };
        self.set_pose(position, data.rotation, scene);

        self.axes = AxisValues {
            trigger: data.trigger,
            squeeze: data.squeeze,
            thumbstick: data.thumbstick,
            thumbstick_x: data.thumbstick_x,
            thumbstick_y: data.thumbstick_y,
            touchpad: data.touchpad,
            touchpad_x: data.touchpad_x,
            touchpad_y: data.touchpad_y,
            button_a: data.button_a,
            button_b: data.button_b,
        };
        self.buttons.update_buttons(&self.axes.buttons());
    }

    pub fn on_hand_update(&mut self, data: &HandData, scene: &mut dyn SceneGraph) {
        if !self.accepts(data.hand) {
            log::trace!("{} controller ignoring hand data for hand {}", self.hand, data.hand);
            return;
        }

        if !data.enabled {
            self.visibility
                .set_hand_joints_visible(scene, &self.skeleton, false);
            if self.source == ActiveSource::Hand {
                self.set_source(ActiveSource::Disabled);
            }
            return;
        }

        // Hand tracking replaces the controller model
        self.visibility.set_visible(scene, false);
        self.visibility
            .set_hand_joints_visible(scene, &self.skeleton, true);
        self.set_source(ActiveSource::Hand);

        let wrist = *data.wrist();
        self.set_pose(wrist.position, wrist.rotation, scene);
        self.skeleton.update(data, self.root, scene);

        self.axes.trigger = data.trigger;
        self.axes.squeeze = data.squeeze;
        self.buttons.update_buttons(&[
            ButtonState::from_value(data.trigger),
            ButtonState::from_value(data.squeeze),
        ]);
    }

    pub fn on_headset_update(&mut self, data: &HeadsetData) {
        self.head = HeadPose::from_view_matrix(&data.left_view);
        self.sit_stand = data.sit_stand;
    }

    /// Poll the bound native device. Only runs while the host subsystem is
    /// unavailable; returns whether a poll happened.
    pub fn try_update_buttons(&mut self) -> bool {
        if self.is_subsystem_available() {
            return false;
        }
        let Some(binding) = self.native.as_ref() else {
            return false;
        };
        let features = binding.device.features();
        self.apply_native_features(&features);
        true
    }

    fn apply_native_features(&mut self, features: &NativeFeatures) {
        let pressed_value = |pressed: bool| if pressed { 1.0 } else { 0.0 };

        self.axes.trigger = snap_to_extremes(features.trigger);
        self.axes.squeeze = snap_to_extremes(features.grip);

        if let Some(axis) = features.primary_2d_axis {
            self.axes.thumbstick_x = axis.x;
            self.axes.thumbstick_y = axis.y;
        }
        if let Some(axis) = features.secondary_2d_axis {
            self.axes.touchpad_x = axis.x;
            self.axes.touchpad_y = axis.y;
        }
        if let Some(pressed) = features.primary_2d_axis_click {
            self.axes.thumbstick = pressed_value(pressed);
        }
        if let Some(pressed) = features.secondary_2d_axis_click {
            self.axes.touchpad = pressed_value(pressed);
        }
        if let Some(pressed) = features.primary_button {
            self.axes.button_a = pressed_value(pressed);
        }
        if let Some(pressed) = features.secondary_button {
            self.axes.button_b = pressed_value(pressed);
        }

        self.buttons.update_buttons(&self.axes.buttons());
    }

    fn set_pose(&mut self, position: Vec3, rotation: Quat, scene: &mut dyn SceneGraph) {
        self.transform = Transform::from_pose(position, rotation);
        scene.set_local_transform(self.root, &self.transform);
    }

    /// Elbow-anchored arm model for controllers without positional tracking.
    fn arm_model_position(&self, rotation: Quat) -> Vec3 {
        let mut eyes_to_elbow = self.config.eyes_to_elbow;
        if self.hand == Handedness::Left {
            eyes_to_elbow.x = -eyes_to_elbow.x;
        }
        let (yaw, _, _) = self.head.rotation.to_euler(EulerRot::YXZ);
        self.head.position + Quat::from_rotation_y(yaw) * eyes_to_elbow + rotation * self.config.elbow_hand
    }

    // Native fallback devices

    /// Whether a native device is a controller for this hand.
    pub fn accepts_device(&self, info: &NativeDeviceInfo) -> bool {
        info.characteristics
            .satisfies(&DeviceCharacteristics::controller(self.hand))
    }

    /// Offer a newly connected native device. It is bound when it is a
    /// controller for this hand; returns whether it was taken.
    pub fn handle_device_connected(
        &mut self,
        device: Box<dyn NativeDevice>,
        scene: &mut dyn SceneGraph,
    ) -> bool {
        if !self.accepts_device(device.info()) {
            return false;
        }

        let haptics = device.haptic_capabilities();
        log::info!(
            "{} controller bound to {} (haptics: {:?})",
            self.hand,
            device.info().name,
            haptics
        );
        self.native = Some(NativeBinding { device, haptics });
        self.visibility.set_visible(scene, true);
        self.set_source(ActiveSource::Controller);
        true
    }

    pub fn handle_device_disconnected(&mut self, device_id: &str, scene: &mut dyn SceneGraph) -> bool {
        let bound = self
            .native
            .as_ref()
            .map(|b| b.device.info().id == device_id)
            .unwrap_or(false);
        if !bound {
            return false;
        }

        log::info!("{} controller lost native device {}", self.hand, device_id);
        self.native = None;
        self.visibility.set_visible(scene, false);
        self.set_source(ActiveSource::Disabled);
        true
    }

    // Haptics

    /// Best-effort haptic pulse. `intensity` is 0.0 to 1.0, `duration_ms` in
    /// milliseconds.
    pub fn pulse(&mut self, intensity: f32, duration_ms: f32) -> PulseRoute {
        let (device, capabilities) = match self.native.as_mut() {
            Some(binding) => (Some(&mut *binding.device), binding.haptics),
            None => (None, None),
        };
        dispatch_pulse(
            self.link.as_ref(),
            device,
            capabilities,
            self.hand,
            intensity,
            duration_ms,
        )
    }
}
