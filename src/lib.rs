//! Unified XR controller input.
//!
//! Controller snapshots, articulated hand tracking and a natively polled
//! fallback device are merged into one state per hand: buttons with press and
//! release edges, analog axes, a pose and a joint skeleton. Haptic pulses go to
//! whichever backend is live.
//!
//! Everything here is tick driven and single threaded. The host publishes
//! snapshots on an [`XrBroadcaster`] and then calls [`XrController::update`]
//! on each controller.

pub mod broadcast;
pub mod config;
pub mod controller;
pub mod haptics;
pub mod input;
pub mod native;
pub mod scene;
pub mod skeleton;
pub mod snapshot;
pub mod visibility;

pub use broadcast::{HapticPulse, Subscription, XrBroadcaster, XrEvent};
pub use config::{ControllerConfig, XrInputConfig};
pub use controller::{ActiveSource, XrController};
pub use haptics::PulseRoute;
pub use input::{Axis2DType, AxisType, ButtonType, Handedness};
pub use scene::{NodeId, SceneGraph, SceneTree, Transform};
pub use snapshot::{ControllerData, HandData, HeadsetData, JointData};
