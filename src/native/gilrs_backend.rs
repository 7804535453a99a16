use super::{
    DeviceCharacteristics, HapticCapabilities, NativeDevice, NativeDeviceInfo, NativeEvent,
    NativeFeatures,
};
use crate::input::Handedness;
use crossbeam_channel::{Receiver, Sender};
use gilrs::ff::{BaseEffect, BaseEffectType, EffectBuilder, Replay, Ticks};
use gilrs::{Axis, Button, EventType, GamepadId, Gilrs};
use glam::Vec2;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Gamepad controls standing in for one XR hand controller.
struct HandLayout {
    hand: Handedness,
    trigger: Button,
    grip: Button,
    stick: (Axis, Axis),
    stick_click: Button,
    primary: Button,
    secondary: Button,
    /// The left hand gets the D-pad as its touchpad
    dpad_touchpad: bool,
}

const LAYOUTS: [HandLayout; 2] = [
    HandLayout {
        hand: Handedness::Left,
        trigger: Button::LeftTrigger2,
        grip: Button::LeftTrigger,
        stick: (Axis::LeftStickX, Axis::LeftStickY),
        stick_click: Button::LeftThumb,
        primary: Button::West,
        secondary: Button::North,
        dpad_touchpad: true,
    },
    HandLayout {
        hand: Handedness::Right,
        trigger: Button::RightTrigger2,
        grip: Button::RightTrigger,
        stick: (Axis::RightStickX, Axis::RightStickY),
        stick_click: Button::RightThumb,
        primary: Button::South,
        secondary: Button::East,
        dpad_touchpad: false,
    },
];

struct ImpulseRequest {
    gamepad: GamepadId,
    amplitude: f32,
    duration: Duration,
}

/// One hand of a gilrs gamepad. Feature values are refreshed by
/// `GilrsBackend::poll`; impulses are queued and played on the next poll.
pub struct GilrsHandDevice {
    info: NativeDeviceInfo,
    gamepad: GamepadId,
    features: Arc<Mutex<NativeFeatures>>,
    haptics: Option<HapticCapabilities>,
    impulses: Sender<ImpulseRequest>,
}

impl NativeDevice for GilrsHandDevice {
    fn info(&self) -> &NativeDeviceInfo {
        &self.info
    }

    fn features(&self) -> NativeFeatures {
        self.features.lock().map(|f| *f).unwrap_or_default()
    }

    fn haptic_capabilities(&self) -> Option<HapticCapabilities> {
        self.haptics
    }

    fn send_haptic_impulse(
        &mut self,
        _channel: u32,
        amplitude: f32,
        duration: Duration,
    ) -> anyhow::Result<()> {
        self.impulses
            .send(ImpulseRequest {
                gamepad: self.gamepad,
                amplitude,
                duration,
            })
            .map_err(|_| anyhow::anyhow!("Gamepad backend for {} is gone", self.info.id))
    }
}

struct TrackedPad {
    hands: Vec<(usize, Arc<Mutex<NativeFeatures>>)>,
    device_ids: Vec<String>,
}

/// Native fallback backend exposing every connected gamepad as a left and a
/// right hand controller.
pub struct GilrsBackend {
    gilrs: Gilrs,
    pads: HashMap<GamepadId, TrackedPad>,
    impulse_tx: Sender<ImpulseRequest>,
    impulse_rx: Receiver<ImpulseRequest>,
    /// Effects stop when dropped, keep the latest one per pad alive
    effects: HashMap<GamepadId, gilrs::ff::Effect>,
}

impl GilrsBackend {
    pub fn new() -> anyhow::Result<Self> {
        let gilrs = Gilrs::new().map_err(|e| anyhow::anyhow!("Failed to initialize gilrs: {}", e))?;
        let (impulse_tx, impulse_rx) = crossbeam_channel::unbounded();

        Ok(Self {
            gilrs,
            pads: HashMap::new(),
            impulse_tx,
            impulse_rx,
            effects: HashMap::new(),
        })
    }

    /// Devices for gamepads that were already connected at startup.
    pub fn connected_devices(&mut self) -> Vec<NativeEvent> {
        let ids: Vec<GamepadId> = self.gilrs.gamepads().map(|(id, _)| id).collect();
        let mut events = Vec::new();
        for id in ids {
            if !self.pads.contains_key(&id) {
                events.extend(self.track(id));
            }
        }
        self.refresh_features();
        events
    }

    fn track(&mut self, id: GamepadId) -> Vec<NativeEvent> {
        let gamepad = self.gilrs.gamepad(id);
        let name = gamepad.name().to_string();
        let haptics = gamepad.is_ff_supported().then_some(HapticCapabilities {
            num_channels: 1,
            supports_impulse: true,
        });

        log::info!("Found gamepad: {} ({:?}) - FF: {}", name, id, haptics.is_some());

        let mut pad = TrackedPad {
            hands: Vec::new(),
            device_ids: Vec::new(),
        };
        let mut events = Vec::new();

        for (layout_index, layout) in LAYOUTS.iter().enumerate() {
            let features = Arc::new(Mutex::new(NativeFeatures::default()));
            let info = NativeDeviceInfo {
                id: format!("{:?}/{}", id, layout.hand),
                name: format!("{} ({})", name, layout.hand),
                characteristics: DeviceCharacteristics::controller(layout.hand),
            };

            pad.hands.push((layout_index, features.clone()));
            pad.device_ids.push(info.id.clone());
            events.push(NativeEvent::Connected(Box::new(GilrsHandDevice {
                info,
                gamepad: id,
                features,
                haptics,
                impulses: self.impulse_tx.clone(),
            })));
        }

        self.pads.insert(id, pad);
        events
    }

    fn untrack(&mut self, id: GamepadId) -> Vec<NativeEvent> {
        self.effects.remove(&id);
        match self.pads.remove(&id) {
            Some(pad) => {
                log::info!("Gamepad {:?} disconnected", id);
                pad.device_ids
                    .into_iter()
                    .map(|device_id| NativeEvent::Disconnected { device_id })
                    .collect()
            }
            None => Vec::new(),
        }
    }

    fn read_features(gilrs: &Gilrs, id: GamepadId, layout: &HandLayout) -> NativeFeatures {
        let gamepad = gilrs.gamepad(id);
        let digital = |button: Button| if gamepad.is_pressed(button) { 1.0 } else { 0.0 };

        let trigger = gamepad
            .button_data(layout.trigger)
            .map(|data| data.value())
            .unwrap_or_else(|| digital(layout.trigger));

        let primary_2d_axis = gamepad.axis_data(layout.stick.0).map(|_| {
            Vec2::new(gamepad.value(layout.stick.0), gamepad.value(layout.stick.1))
        });

        let secondary_2d_axis = layout.dpad_touchpad.then(|| {
            Vec2::new(
                digital(Button::DPadRight) - digital(Button::DPadLeft),
                digital(Button::DPadUp) - digital(Button::DPadDown),
            )
        });

        NativeFeatures {
            trigger,
            grip: digital(layout.grip),
            primary_2d_axis,
            secondary_2d_axis,
            primary_2d_axis_click: Some(gamepad.is_pressed(layout.stick_click)),
            secondary_2d_axis_click: None,
            primary_button: Some(gamepad.is_pressed(layout.primary)),
            secondary_button: Some(gamepad.is_pressed(layout.secondary)),
        }
    }

    fn refresh_features(&mut self) {
        for (id, pad) in &self.pads {
            for (layout_index, slot) in &pad.hands {
                let features = Self::read_features(&self.gilrs, *id, &LAYOUTS[*layout_index]);
                if let Ok(mut current) = slot.lock() {
                    *current = features;
                }
            }
        }
    }

    fn play_impulses(&mut self) {
        while let Ok(request) = self.impulse_rx.try_recv() {
            if !self.pads.contains_key(&request.gamepad) {
                continue;
            }
            if let Err(e) = self.play_impulse(&request) {
                log::warn!("Failed to play haptic impulse on {:?}: {}", request.gamepad, e);
            }
        }
    }

    fn play_impulse(&mut self, request: &ImpulseRequest) -> anyhow::Result<()> {
        let magnitude = (request.amplitude.clamp(0.0, 1.0) * u16::MAX as f32) as u16;
        let millis = u32::try_from(request.duration.as_millis()).unwrap_or(u32::MAX);

        let effect = EffectBuilder::new()
            .add_effect(BaseEffect {
                kind: BaseEffectType::Strong { magnitude },
                scheduling: Replay {
                    play_for: Ticks::from_ms(millis),
                    ..Default::default()
                },
                envelope: Default::default(),
            })
            .gamepads(&[request.gamepad])
            .finish(&mut self.gilrs)?;
        effect.play()?;

        log::debug!(
            "Playing impulse on {:?}: magnitude={} for {}ms",
            request.gamepad, magnitude, millis
        );
        self.effects.insert(request.gamepad, effect);
        Ok(())
    }

    /// Drain gilrs events, refresh every hand's features and play queued
    /// impulses. Returns connection changes.
    pub fn poll(&mut self) -> Vec<NativeEvent> {
        let mut events = Vec::new();

        while let Some(event) = self.gilrs.next_event() {
            match event.event {
                EventType::Connected => {
                    if !self.pads.contains_key(&event.id) {
                        events.extend(self.track(event.id));
                    }
                }
                EventType::Disconnected => events.extend(self.untrack(event.id)),
                _ => {}
            }
        }

        self.refresh_features();
        self.play_impulses();

        events
    }
}
