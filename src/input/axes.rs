use super::{Axis2DType, AxisType, ButtonState, BUTTON_COUNT};
use glam::Vec2;

/// Raw analog values of one device, as last written by an input source.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisValues {
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

impl AxisValues {
    pub fn get_axis(&self, axis: AxisType) -> f32 {
        match axis {
            AxisType::Trigger => self.trigger,
            AxisType::Grip => self.squeeze,
        }
    }

    pub fn get_axis_2d(&self, axis: Axis2DType) -> Vec2 {
        match axis {
            Axis2DType::Thumbstick => Vec2::new(self.thumbstick_x, self.thumbstick_y),
            Axis2DType::Touchpad => Vec2::new(self.touchpad_x, self.touchpad_y),
        }
    }

    /// Button vector in `ButtonType` order.
    pub fn buttons(&self) -> [ButtonState; BUTTON_COUNT] {
        [
            ButtonState::from_value(self.trigger),
            ButtonState::from_value(self.squeeze),
            ButtonState::from_value(self.thumbstick),
            ButtonState::from_value(self.touchpad),
            ButtonState::from_value(self.button_a),
            ButtonState::from_value(self.button_b),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_accessors() {
        let axes = AxisValues {
            trigger: 0.25,
            squeeze: 0.75,
            thumbstick_x: -0.5,
            thumbstick_y: 0.5,
            touchpad_x: 0.1,
            touchpad_y: -0.2,
            ..Default::default()
        };
        assert_eq!(axes.get_axis(AxisType::Trigger), 0.25);
        assert_eq!(axes.get_axis(AxisType::Grip), 0.75);
        assert_eq!(axes.get_axis_2d(Axis2DType::Thumbstick), Vec2::new(-0.5, 0.5));
        assert_eq!(axes.get_axis_2d(Axis2DType::Touchpad), Vec2::new(0.1, -0.2));
    }

    #[test]
    fn test_buttons_only_full_press_counts() {
        let axes = AxisValues {
            trigger: 1.0,
            squeeze: 0.99,
            button_b: 1.0,
            ..Default::default()
        };
        let buttons = axes.buttons();
        assert!(buttons[0].pressed);
        assert!(!buttons[1].pressed);
        assert_eq!(buttons[1].value, 0.99);
        assert!(!buttons[4].pressed);
        assert!(buttons[5].pressed);
    }
}
