use crate::config::GestureSettings;
use crate::gesture::core::{FrameResult, GestureError};
use crate::touch::{GestureParam, GestureValues, TouchSample, TouchUpdate};

/// Two-touch tracker: reports the displacement of the touches' centroid and
/// the ratio of their current distance to the initial one (pinch scale).
pub struct TwoFingerSwipePinchGesture {
    initial_cog_x: f64,
    initial_cog_y: f64,
    initial_dist: f64,
}

impl TwoFingerSwipePinchGesture {
    pub(crate) fn new(
        update: &TouchUpdate,
        settings: &GestureSettings,
    ) -> Result<Self, GestureError> {
        if update.n_touches != 2 || update.touches.len() != 2 {
            return Err(GestureError::InvariantViolation(format!(
                "two-finger gesture requires exactly two reported touches, got n_touches={} with {} reported",
                update.n_touches,
                update.touches.len()
            )));
        }

        let (cog_x, cog_y, dist) = measure(&update.touches);
        Ok(Self {
            initial_cog_x: cog_x,
            initial_cog_y: cog_y,
            // floored so a near-zero baseline cannot blow up the ratio
            initial_dist: dist.max(settings.two_finger_min_dist),
        })
    }

    pub(crate) fn process(&mut self, update: &TouchUpdate) -> FrameResult {
        if update.n_touches != 2 {
            return FrameResult::Terminate;
        }

        // two fingers down but coordinates not fully reported yet
        if update.touches.len() != 2 {
            return FrameResult::Hold;
        }

        let (cog_x, cog_y, dist) = measure(&update.touches);
        FrameResult::Emit(GestureValues::from([
            (GestureParam::DeltaX, cog_x - self.initial_cog_x),
            (GestureParam::DeltaY, cog_y - self.initial_cog_y),
            (GestureParam::Scale, dist / self.initial_dist),
        ]))
    }
}

/// Centroid and Euclidean distance of a two-touch frame. The distance is
/// returned unfloored; only the initial reference distance is floored.
fn measure(touches: &[TouchSample]) -> (f64, f64, f64) {
    let cog_x = (touches[0].x + touches[1].x) / 2.0;
    let cog_y = (touches[0].y + touches[1].y) / 2.0;
    let dist = ((touches[0].x - touches[1].x).powi(2) + (touches[0].y - touches[1].y).powi(2))
        .sqrt();
    (cog_x, cog_y, dist)
}
