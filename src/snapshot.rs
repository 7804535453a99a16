//! Per-tick device snapshots delivered by the host.
//!
//! These are transient values: the broadcaster hands one to every subscriber
//! and nothing retains them after the tick.

use crate::input::Handedness;
use glam::{Mat4, Quat, Vec3};

/// Number of tracked joints per hand (wrist through little finger tip).
pub const JOINT_COUNT: usize = 25;

/// Index of the wrist, the reference joint for the whole skeleton.
pub const WRIST: usize = 0;

/// Index of the last joint (little finger tip).
pub const LITTLE_PHALANX_TIP: usize = 24;

/// Gamepad-style controller snapshot. Analog fields are in 0.0..=1.0 except
/// the 2D axis components which are in -1.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerData {
    /// Raw handedness, see `Handedness::wire_value`
    pub hand: i32,
    pub enabled: bool,
    pub position: Vec3,
    pub rotation: Quat,
    pub trigger: f32,
    pub squeeze: f32,
    pub thumbstick: f32,
    pub thumbstick_x: f32,
    pub thumbstick_y: f32,
    pub touchpad: f32,
    pub touchpad_x: f32,
    pub touchpad_y: f32,
    pub button_a: f32,
    pub button_b: f32,
}

impl ControllerData {
    pub fn new(hand: Handedness, enabled: bool) -> Self {
        Self {
            hand: hand.wire_value(),
            enabled,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            trigger: 0.0,
            squeeze: 0.0,
            thumbstick: 0.0,
            thumbstick_x: 0.0,
            thumbstick_y: 0.0,
            touchpad: 0.0,
            touchpad_x: 0.0,
            touchpad_y: 0.0,
            button_a: 0.0,
            button_b: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointData {
    pub enabled: bool,
    pub position: Vec3,
    pub rotation: Quat,
    /// Joint radius in meters, 0 when unknown
    pub radius: f32,
}

impl Default for JointData {
    fn default() -> Self {
        Self {
            enabled: false,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            radius: 0.0,
        }
    }
}

/// Articulated hand snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct HandData {
    pub hand: i32,
    pub enabled: bool,
    /// Pinch strengths standing in for trigger and grip
    pub trigger: f32,
    pub squeeze: f32,
    pub joints: [JointData; JOINT_COUNT],
}

impl HandData {
    pub fn new(hand: Handedness, enabled: bool) -> Self {
        Self {
            hand: hand.wire_value(),
            enabled,
            trigger: 0.0,
            squeeze: 0.0,
            joints: [JointData::default(); JOINT_COUNT],
        }
    }

    pub fn wrist(&self) -> &JointData {
        &self.joints[WRIST]
    }
}

/// Headset snapshot: stereo projection and view matrices plus the
/// sitting-to-standing transform of the tracking space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadsetData {
    pub left_projection: Mat4,
    pub right_projection: Mat4,
    pub left_view: Mat4,
    pub right_view: Mat4,
    pub sit_stand: Mat4,
}

impl Default for HeadsetData {
    fn default() -> Self {
        Self {
            left_projection: Mat4::IDENTITY,
            right_projection: Mat4::IDENTITY,
            left_view: Mat4::IDENTITY,
            right_view: Mat4::IDENTITY,
            sit_stand: Mat4::IDENTITY,
        }
    }
}

/// Head pose derived from a headset snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for HeadPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl HeadPose {
    /// The view matrix maps world to eye space; its inverse is the eye's pose.
    pub fn from_view_matrix(view: &Mat4) -> Self {
        let (_, rotation, position) = view.inverse().to_scale_rotation_translation();
        Self { position, rotation }
    }
}
