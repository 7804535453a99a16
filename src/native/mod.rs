//! Native fallback devices, polled directly while the host broadcast is not
//! available.

mod gilrs_backend;

pub use gilrs_backend::*;

use crate::input::Handedness;
use glam::Vec2;
use std::time::Duration;

/// What a native device is. A controller expecting a specific hand only binds
/// devices reporting that hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceCharacteristics {
    pub controller: bool,
    pub hand: Handedness,
}

impl DeviceCharacteristics {
    pub fn controller(hand: Handedness) -> Self {
        Self {
            controller: true,
            hand,
        }
    }

    /// Whether a device with these characteristics satisfies `required`.
    /// `Handedness::None` in `required` accepts either hand.
    pub fn satisfies(&self, required: &DeviceCharacteristics) -> bool {
        if required.controller && !self.controller {
            return false;
        }
        required.hand == Handedness::None || required.hand == self.hand
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NativeDeviceInfo {
    pub id: String,
    pub name: String,
    pub characteristics: DeviceCharacteristics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HapticCapabilities {
    pub num_channels: u32,
    pub supports_impulse: bool,
}

/// One poll of a native device. Optional features are `None` when the device
/// does not report them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NativeFeatures {
    pub trigger: f32,
    pub grip: f32,
    pub primary_2d_axis: Option<Vec2>,
    pub secondary_2d_axis: Option<Vec2>,
    pub primary_2d_axis_click: Option<bool>,
    pub secondary_2d_axis_click: Option<bool>,
    pub primary_button: Option<bool>,
    pub secondary_button: Option<bool>,
}

/// Connection changes reported by a native backend.
pub enum NativeEvent {
    Connected(Box<dyn NativeDevice>),
    Disconnected { device_id: String },
}

impl std::fmt::Debug for NativeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected(device) => f.debug_tuple("Connected").field(&device.info().id).finish(),
            Self::Disconnected { device_id } => f
                .debug_struct("Disconnected")
                .field("device_id", device_id)
                .finish(),
        }
    }
}

/// Trait for natively polled XR controllers
pub trait NativeDevice: Send {
    fn info(&self) -> &NativeDeviceInfo;

    /// Current feature values
    fn features(&self) -> NativeFeatures;

    /// `None` when the device reports no haptics at all
    fn haptic_capabilities(&self) -> Option<HapticCapabilities>;

    /// Play a single impulse. `amplitude` is 0.0 to 1.0.
    fn send_haptic_impulse(
        &mut self,
        channel: u32,
        amplitude: f32,
        duration: Duration,
    ) -> anyhow::Result<()>;
}
