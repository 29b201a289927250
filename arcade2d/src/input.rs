use serde::{Deserialize, Serialize};
use winit::event::{ElementState, MouseButton, Touch, TouchPhase};

/// Which half of the screen a pointer landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenSide {
    Left,
    Right,
}

impl ScreenSide {
    /// Strictly left of the midpoint is `Left`; the midpoint itself is `Right`.
    pub fn of(x: f32, width: f32) -> Self {
        if x < width / 2.0 {
            ScreenSide::Left
        } else {
            ScreenSide::Right
        }
    }
}

/// Movement flags driven by touch/pointer begin and end events.
///
/// Intended for single-touch input: the last touch's side wins and any
/// release clears both flags, even if another finger is still down.
#[derive(Clone, Debug, Default)]
pub struct TouchInput {
    left_held: bool,
    right_held: bool,
    cursor_x: f32,
}

impl TouchInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pointer went down at horizontal position `x` on a screen `width` wide.
    pub fn touch_began(&mut self, x: f32, width: f32) -> ScreenSide {
        let side = ScreenSide::of(x, width);
        match side {
            ScreenSide::Left => self.left_held = true,
            ScreenSide::Right => self.right_held = true,
        }
        log::debug!("Touching the {side:?} side at x={x}");
        side
    }

    /// Any pointer went up.
    pub fn touch_ended(&mut self) {
        self.left_held = false;
        self.right_held = false;
    }

    pub fn is_held(&self, side: ScreenSide) -> bool {
        match side {
            ScreenSide::Left => self.left_held,
            ScreenSide::Right => self.right_held,
        }
    }

    pub fn left_held(&self) -> bool {
        self.left_held
    }

    pub fn right_held(&self) -> bool {
        self.right_held
    }

    /// Held sides in a stable order (left first).
    pub fn held_sides(&self) -> impl Iterator<Item = ScreenSide> {
        [
            (self.left_held, ScreenSide::Left),
            (self.right_held, ScreenSide::Right),
        ]
        .into_iter()
        .filter_map(|(held, side)| held.then_some(side))
    }

    /// Handle a touch event from winit. `surface_width` must be in the same
    /// (physical pixel) space as the touch location.
    pub fn handle_touch(&mut self, touch: &Touch, surface_width: f32) -> Option<ScreenSide> {
        match touch.phase {
            TouchPhase::Started => Some(self.touch_began(touch.location.x as f32, surface_width)),
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.touch_ended();
                None
            }
            TouchPhase::Moved => None,
        }
    }

    /// Handle mouse cursor movement from winit.
    pub fn handle_cursor_moved(&mut self, x: f64) {
        self.cursor_x = x as f32;
    }

    /// Handle a mouse button event from winit; the left button acts as a touch
    /// at the last known cursor position.
    pub fn handle_mouse_button(
        &mut self,
        button: MouseButton,
        state: ElementState,
        surface_width: f32,
    ) -> Option<ScreenSide> {
        if button != MouseButton::Left {
            return None;
        }
        match state {
            ElementState::Pressed => Some(self.touch_began(self.cursor_x, surface_width)),
            ElementState::Released => {
                self.touch_ended();
                None
            }
        }
    }
}
