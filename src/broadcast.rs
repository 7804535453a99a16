//! In-process snapshot broadcaster.
//!
//! The host publishes controller, hand and headset snapshots once per tick;
//! each subscriber receives them in publish order on its own queue.
//! Subscribers are served in registration order and can come and go at any
//! point without affecting the others.

use crate::input::Handedness;
use crate::snapshot::{ControllerData, HandData, HeadsetData};
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum XrEvent {
    Controller(ControllerData),
    Hand(Box<HandData>),
    Headset(HeadsetData),
}

/// Haptic request forwarded to the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HapticPulse {
    pub hand: Handedness,
    /// 0.0 to 1.0
    pub intensity: f32,
    pub duration_ms: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A registered listener's end of the broadcaster.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    events: Receiver<XrEvent>,
    haptics: Sender<HapticPulse>,
    subsystem: Arc<AtomicBool>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn is_subsystem_available(&self) -> bool {
        self.subsystem.load(Ordering::Acquire)
    }

    /// Take every event published since the last drain, oldest first.
    pub fn drain(&self) -> Vec<XrEvent> {
        self.events.try_iter().collect()
    }

    pub fn request_pulse(&self, pulse: HapticPulse) -> bool {
        self.haptics.send(pulse).is_ok()
    }
}

pub struct XrBroadcaster {
    subscribers: Vec<(SubscriptionId, Sender<XrEvent>)>,
    next_id: u64,
    subsystem: Arc<AtomicBool>,
    haptic_tx: Sender<HapticPulse>,
    haptic_rx: Receiver<HapticPulse>,
}

impl Default for XrBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl XrBroadcaster {
    pub fn new() -> Self {
        let (haptic_tx, haptic_rx) = crossbeam_channel::unbounded();
        Self {
            subscribers: Vec::new(),
            next_id: 0,
            subsystem: Arc::new(AtomicBool::new(false)),
            haptic_tx,
            haptic_rx,
        }
    }

    /// Mark the host broadcast path as running. While it is not, controllers
    /// fall back to their native devices.
    pub fn set_subsystem_available(&self, available: bool) {
        let previous = self.subsystem.swap(available, Ordering::AcqRel);
        if previous != available {
            log::info!("XR subsystem available: {}", available);
        }
    }

    pub fn is_subsystem_available(&self) -> bool {
        self.subsystem.load(Ordering::Acquire)
    }

    pub fn subscribe(&mut self) -> Subscription {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        let (sender, receiver) = crossbeam_channel::unbounded();
        self.subscribers.push((id, sender));
        log::debug!("Registered XR listener {:?}", id);

        Subscription {
            id,
            events: receiver,
            haptics: self.haptic_tx.clone(),
            subsystem: self.subsystem.clone(),
        }
    }

    /// Returns false when `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        let removed = self.subscribers.len() != before;
        if removed {
            log::debug!("Removed XR listener {:?}", id);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver `event` to every subscriber. Subscribers whose receiving end
    /// was dropped are pruned. Returns the number of deliveries.
    pub fn publish(&mut self, event: XrEvent) -> usize {
        let mut delivered = 0;
        self.subscribers.retain(|(id, sender)| match sender.send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(_) => {
                log::debug!("Dropping XR listener {:?}, receiver is gone", id);
                false
            }
        });
        delivered
    }

    pub fn publish_controller(&mut self, data: ControllerData) -> usize {
        self.publish(XrEvent::Controller(data))
    }

    pub fn publish_hand(&mut self, data: HandData) -> usize {
        self.publish(XrEvent::Hand(Box::new(data)))
    }

    pub fn publish_headset(&mut self, data: HeadsetData) -> usize {
        self.publish(XrEvent::Headset(data))
    }

    /// Pulses requested by controllers since the last call.
    pub fn take_haptic_requests(&self) -> Vec<HapticPulse> {
        self.haptic_rx.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_arrive_in_publish_order() {
        let mut broadcaster = XrBroadcaster::new();
        let sub = broadcaster.subscribe();

        broadcaster.publish_controller(ControllerData::new(Handedness::Left, true));
        broadcaster.publish_headset(HeadsetData::default());

        let events = sub.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], XrEvent::Controller(_)));
        assert!(matches!(events[1], XrEvent::Headset(_)));
        assert!(sub.drain().is_empty());
    }

    #[test]
    fn test_unsubscribe_keeps_other_listeners() {
        let mut broadcaster = XrBroadcaster::new();
        let first = broadcaster.subscribe();
        let second = broadcaster.subscribe();

        assert!(broadcaster.unsubscribe(first.id()));
        assert!(!broadcaster.unsubscribe(first.id()));

        assert_eq!(broadcaster.publish_headset(HeadsetData::default()), 1);
        assert!(first.drain().is_empty());
        assert_eq!(second.drain().len(), 1);
    }

    #[test]
    fn test_dropped_subscription_is_pruned() {
        let mut broadcaster = XrBroadcaster::new();
        let kept = broadcaster.subscribe();
        drop(broadcaster.subscribe());

        assert_eq!(broadcaster.publish_headset(HeadsetData::default()), 1);
        assert_eq!(broadcaster.subscriber_count(), 1);
        assert_eq!(kept.drain().len(), 1);
    }

    #[test]
    fn test_subsystem_flag_is_shared() {
        let mut broadcaster = XrBroadcaster::new();
        let sub = broadcaster.subscribe();
        assert!(!sub.is_subsystem_available());

        broadcaster.set_subsystem_available(true);
        assert!(sub.is_subsystem_available());
    }

    #[test]
    fn test_haptic_requests_reach_host() {
        let mut broadcaster = XrBroadcaster::new();
        let sub = broadcaster.subscribe();
        let pulse = HapticPulse {
            hand: Handedness::Right,
            intensity: 0.5,
            duration_ms: 40.0,
        };

        assert!(sub.request_pulse(pulse));
        assert_eq!(broadcaster.take_haptic_requests(), vec![pulse]);
        assert!(broadcaster.take_haptic_requests().is_empty());
    }
}
