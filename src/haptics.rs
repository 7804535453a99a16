use crate::broadcast::{HapticPulse, Subscription};
use crate::input::Handedness;
use crate::native::{HapticCapabilities, NativeDevice};
use std::time::Duration;

/// Where a pulse request ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseRoute {
    /// Forwarded to the host broadcast subsystem
    Subsystem,
    /// Sent directly to the bound native device
    Native,
    /// No backend could take it. Haptics are best effort, this is not an error.
    Dropped,
}

/// Route a pulse to the active haptics backend.
///
/// The host subsystem wins while it is available. Otherwise the native device
/// is used, but only if it reported impulse support when it was bound.
pub fn dispatch_pulse(
    link: Option<&Subscription>,
    native: Option<&mut (dyn NativeDevice + '_)>,
    capabilities: Option<HapticCapabilities>,
    hand: Handedness,
    intensity: f32,
    duration_ms: f32,
) -> PulseRoute {
    let intensity = intensity.clamp(0.0, 1.0);

    if let Some(link) = link.filter(|l| l.is_subsystem_available()) {
        let pulse = HapticPulse {
            hand,
            intensity,
            duration_ms,
        };
        if link.request_pulse(pulse) {
            return PulseRoute::Subsystem;
        }
        log::warn!("XR subsystem went away, dropping {} pulse", hand);
        return PulseRoute::Dropped;
    }

    let supports_impulse = capabilities.map(|c| c.supports_impulse).unwrap_or(false);
    match native {
        Some(device) if supports_impulse => {
            // Native devices take the duration in seconds, saturating on overflow
            let duration =
                Duration::try_from_secs_f32(duration_ms.max(0.0) * 0.001).unwrap_or(Duration::MAX);
            match device.send_haptic_impulse(0, intensity, duration) {
                Ok(()) => PulseRoute::Native,
                Err(e) => {
                    log::warn!("Failed to send haptic impulse to {}: {}", device.info().id, e);
                    PulseRoute::Dropped
                }
            }
        }
        _ => PulseRoute::Dropped,
    }
}
