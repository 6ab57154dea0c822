use crate::gesture::core::{FrameResult, GestureError};
use crate::touch::{GestureParam, GestureValues, TouchUpdate};
use tracing::{debug, warn};

/// Three-to-five finger swipe tracker.
///
/// The first reported touch becomes the *anchor*; the reported displacement
/// is the anchor's position plus an accumulated offset initialized so the
/// displacement starts at zero. When the anchor finger lifts, a hand-off
/// picks a replacement and adjusts the accumulator so the virtual point is
/// continuous across the swap — listeners never see a jump from the hand-off
/// itself.
///
/// Lifting fingers is tolerated down to one remaining; adding a finger beyond
/// the starting count ends the gesture.
pub struct HigherSwipeGesture {
    /// Finger count the gesture started with; exceeding it terminates.
    ceiling: usize,
    anchor_id: u64,
    acc_x: f64,
    acc_y: f64,
    /// Last frame that produced an emission; hand-off reads the lost
    /// anchor's and the replacement's positions from here.
    previous: TouchUpdate,
}

impl HigherSwipeGesture {
    pub(crate) fn new(update: &TouchUpdate) -> Result<Self, GestureError> {
        if !(3..=5).contains(&update.n_touches) {
            return Err(GestureError::InvariantViolation(format!(
                "higher swipe requires 3 to 5 touches, got n_touches={}",
                update.n_touches
            )));
        }
        let Some(anchor) = update.touches.first() else {
            return Err(GestureError::InvariantViolation(
                "higher swipe requires at least one reported touch as anchor".to_string(),
            ));
        };

        Ok(Self {
            ceiling: update.n_touches,
            anchor_id: anchor.id,
            acc_x: -anchor.x,
            acc_y: -anchor.y,
            previous: update.clone(),
        })
    }

    pub(crate) fn ceiling(&self) -> usize {
        self.ceiling
    }

    pub(crate) fn process(&mut self, update: &TouchUpdate) -> FrameResult {
        // only lifted fingers are tolerated, never added ones
        if update.n_touches > self.ceiling || update.n_touches == 0 {
            return FrameResult::Terminate;
        }

        // coordinates transiently missing for every contact
        if update.touches.is_empty() {
            return FrameResult::Hold;
        }

        if !update.contains_id(self.anchor_id) {
            self.hand_off(update);
        }

        let Some(anchor) = update.touch_by_id(self.anchor_id) else {
            // hand-off always adopts an id present in the current frame
            warn!(
                "Anchor {} missing after hand-off, holding frame",
                self.anchor_id
            );
            return FrameResult::Hold;
        };

        let values = GestureValues::from([
            (GestureParam::DeltaX, anchor.x + self.acc_x),
            (GestureParam::DeltaY, anchor.y + self.acc_y),
        ]);

        self.previous = update.clone();
        FrameResult::Emit(values)
    }

    /// The anchor finger lifted: adopt a replacement and fold the position
    /// difference into the accumulator so the reported virtual point does not
    /// move because of the swap.
    fn hand_off(&mut self, update: &TouchUpdate) {
        let Some(lost) = self.previous.touch_by_id(self.anchor_id).copied() else {
            // previous is only replaced after an emission, which requires the
            // anchor to be present in it
            warn!("Lost anchor {} has no previous record", self.anchor_id);
            return;
        };

        // first touch of the previous frame still present now; previous-frame
        // order is the tie-break
        let carried = self
            .previous
            .touches
            .iter()
            .find(|t| update.contains_id(t.id))
            .copied();

        match carried {
            Some(replacement) => {
                // both positions read from the previous frame: shift the
                // accumulator by the fingers' separation as of that frame
                debug!(
                    "Anchor hand-off {} -> {} (carried touch)",
                    self.anchor_id, replacement.id
                );
                self.anchor_id = replacement.id;
                self.acc_x -= replacement.x - lost.x;
                self.acc_y -= replacement.y - lost.y;
            }
            None => {
                // nothing survived from the previous frame: adopt the first
                // touch of the current one and bridge from the anchor's last
                // known position to the replacement's current one
                let replacement = &update.touches[0];
                debug!(
                    "Anchor hand-off {} -> {} (no carried touch)",
                    self.anchor_id, replacement.id
                );
                self.anchor_id = replacement.id;
                self.acc_x += lost.x - replacement.x;
                self.acc_y += lost.y - replacement.y;
            }
        }
    }
}
