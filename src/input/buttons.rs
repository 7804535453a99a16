use super::{ButtonType, BUTTON_COUNT};

/// Stored state of one logical button.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ButtonState {
    pub pressed: bool,
    /// Analog value (0.0 to 1.0), kept independently of `pressed`
    pub value: f32,
    /// Pressed state last reported through an edge query
    pub prev_pressed: bool,
}

impl ButtonState {
    pub fn new(pressed: bool, value: f32) -> Self {
        Self {
            pressed,
            value,
            prev_pressed: false,
        }
    }

    /// Button state decoded from a raw source value; only a full press counts.
    pub fn from_value(value: f32) -> Self {
        Self::new(value >= 1.0, value)
    }
}

/// Per-device button table.
///
/// A slot stays empty until the first `set_button_state` for that button, so
/// reads of never-observed buttons report "not pressed" without creating an
/// entry.
///
/// `get_button_down` and `get_button_up` consume the edge they report: when
/// two consumers poll the same button in one tick only the first one sees the
/// transition. The table is meant to be read from a single thread.
#[derive(Debug, Clone, Default)]
pub struct ButtonTable {
    slots: [Option<ButtonState>; BUTTON_COUNT],
}

impl ButtonTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_button_state(&mut self, button: ButtonType, pressed: bool, value: f32) {
        let state = self.slots[button.index()].get_or_insert_with(ButtonState::default);
        state.pressed = pressed;
        state.value = value;
    }

    /// Apply a full button vector ordered by `ButtonType` ordinal.
    ///
    /// Shorter vectors only touch the leading buttons.
    pub fn update_buttons(&mut self, buttons: &[ButtonState]) {
        for (button, state) in ButtonType::ALL.iter().zip(buttons) {
            self.set_button_state(*button, state.pressed, state.value);
        }
    }

    pub fn get(&self, button: ButtonType) -> Option<&ButtonState> {
        self.slots[button.index()].as_ref()
    }

    pub fn get_button(&self, button: ButtonType) -> bool {
        self.get(button).map(|s| s.pressed).unwrap_or(false)
    }

    pub fn get_button_value(&self, button: ButtonType) -> f32 {
        self.get(button).map(|s| s.value).unwrap_or(0.0)
    }

    pub fn get_button_down(&mut self, button: ButtonType) -> bool {
        match &mut self.slots[button.index()] {
            Some(state) if state.pressed && !state.prev_pressed => {
                state.prev_pressed = true;
                true
            }
            _ => false,
        }
    }

    pub fn get_button_up(&mut self, button: ButtonType) -> bool {
        match &mut self.slots[button.index()] {
            Some(state) if !state.pressed && state.prev_pressed => {
                state.prev_pressed = false;
                true
            }
            _ => false,
        }
    }

    /// Number of buttons observed at least once.
    pub fn observed(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_buttons_read_false() {
        let mut table = ButtonTable::new();
        for button in ButtonType::ALL {
            assert!(!table.get_button(button));
            assert!(!table.get_button_down(button));
            assert!(!table.get_button_up(button));
        }
        // Reads never create entries
        assert_eq!(table.observed(), 0);
    }

    #[test]
    fn test_press_hold_release_edges() {
        let mut table = ButtonTable::new();
        let b = ButtonType::Trigger;

        table.set_button_state(b, false, 0.0);
        assert!(!table.get_button_down(b));
        assert!(!table.get_button_up(b));

        table.set_button_state(b, true, 1.0);
        assert!(table.get_button_down(b));
        assert!(!table.get_button_down(b));
        assert!(!table.get_button_up(b));

        table.set_button_state(b, true, 1.0);
        assert!(!table.get_button_down(b));
        assert!(table.get_button(b));

        table.set_button_state(b, false, 0.0);
        assert!(table.get_button_up(b));
        assert!(!table.get_button_up(b));
        assert!(!table.get_button_down(b));
    }

    #[test]
    fn test_second_consumer_misses_edge() {
        let mut table = ButtonTable::new();
        table.set_button_state(ButtonType::ButtonA, true, 1.0);

        let first = table.get_button_down(ButtonType::ButtonA);
        let second = table.get_button_down(ButtonType::ButtonA);
        assert!(first);
        assert!(!second);
    }

    #[test]
    fn test_release_without_down_poll_reports_no_up() {
        let mut table = ButtonTable::new();
        table.set_button_state(ButtonType::Grip, true, 1.0);
        table.set_button_state(ButtonType::Grip, false, 0.0);
        // The press edge was never consumed, so there is no release edge either
        assert!(!table.get_button_up(ButtonType::Grip));
    }

    #[test]
    fn test_pressed_and_value_may_diverge() {
        let mut table = ButtonTable::new();
        table.set_button_state(ButtonType::Trigger, true, 0.3);
        assert!(table.get_button(ButtonType::Trigger));
        assert_eq!(table.get_button_value(ButtonType::Trigger), 0.3);

        table.set_button_state(ButtonType::Trigger, false, 0.9);
        assert!(!table.get_button(ButtonType::Trigger));
        assert_eq!(table.get_button_value(ButtonType::Trigger), 0.9);
    }

    #[test]
    fn test_update_buttons_partial_vector() {
        let mut table = ButtonTable::new();
        table.update_buttons(&[ButtonState::from_value(1.0), ButtonState::from_value(0.4)]);
        assert!(table.get_button(ButtonType::Trigger));
        assert!(!table.get_button(ButtonType::Grip));
        assert_eq!(table.observed(), 2);
        assert!(table.get(ButtonType::ButtonA).is_none());
    }
}
