use crate::gesture::core::{FrameResult, GestureError};
use crate::touch::{GestureParam, GestureValues, TouchUpdate};

/// One-touch translation tracker: reports displacement of the single finger
/// relative to where it first came down.
pub struct SingleFingerMoveGesture {
    initial_x: f64,
    initial_y: f64,
}

impl SingleFingerMoveGesture {
    pub(crate) fn new(update: &TouchUpdate) -> Result<Self, GestureError> {
        if update.n_touches != 1 || update.touches.len() != 1 {
            return Err(GestureError::InvariantViolation(format!(
                "single-finger gesture requires exactly one reported touch, got n_touches={} with {} reported",
                update.n_touches,
                update.touches.len()
            )));
        }

        let touch = &update.touches[0];
        Ok(Self {
            initial_x: touch.x,
            initial_y: touch.y,
        })
    }

    pub(crate) fn process(&mut self, update: &TouchUpdate) -> FrameResult {
        if update.n_touches != 1 || update.touches.len() != 1 {
            return FrameResult::Terminate;
        }

        let touch = &update.touches[0];
        FrameResult::Emit(GestureValues::from([
            (GestureParam::DeltaX, touch.x - self.initial_x),
            (GestureParam::DeltaY, touch.y - self.initial_y),
        ]))
    }
}
