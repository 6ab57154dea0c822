use crate::config::GestureSettings;
use crate::gesture::core::{Gesture, GestureError, ProcessOutcome};
use crate::touch::TouchUpdate;
use tracing::{debug, info};

/// Owns at most one active gesture and routes every input frame to it.
///
/// Selects the gesture variant by finger count, replaces a terminated gesture
/// within the same frame when the new count qualifies, and fires a one-time
/// notification when a gesture validates so downstream code attaches output
/// listeners only to gestures that have proven intentional.
pub struct GestureDispatcher {
    settings: GestureSettings,
    active: Option<Gesture>,
    gesture_listeners: Vec<Box<dyn FnMut(&mut Gesture) + Send>>,
}

impl GestureDispatcher {
    pub fn new(settings: Option<GestureSettings>) -> Self {
        let settings = settings.unwrap_or_default();
        info!("Creating GestureDispatcher with settings: {:?}", settings);

        Self {
            settings,
            active: None,
            gesture_listeners: Vec::new(),
        }
    }

    /// Registers a subscriber invoked exactly once per gesture, on its
    /// pending-to-validated transition.
    pub fn on_new_gesture(&mut self, listener: impl FnMut(&mut Gesture) + Send + 'static) {
        self.gesture_listeners.push(Box::new(listener));
    }

    /// The currently tracked gesture, validated or not.
    pub fn active(&self) -> Option<&Gesture> {
        self.active.as_ref()
    }

    /// Feeds one input frame through the active gesture, replacing or
    /// clearing it as the finger count dictates.
    ///
    /// Returns an error only when a gesture constructor's cardinality
    /// contract is violated, which the upstream sanitizer is expected to
    /// prevent; the dispatcher stays idle in that case.
    pub fn on_update(&mut self, update: &TouchUpdate) -> Result<(), GestureError> {
        let mut was_pending = true;

        if let Some(gesture) = self.active.as_mut() {
            was_pending = gesture.is_pending();

            if gesture.process(update) == ProcessOutcome::Terminate {
                info!("Gesture {} ended", gesture.kind());
                gesture.terminate();
                self.active = None;
            }
        }

        if self.active.is_none() {
            self.active = match update.n_touches {
                0 => None,
                1 => Some(Gesture::single_finger_move(update, &self.settings)?),
                2 => Some(Gesture::two_finger_swipe_pinch(update, &self.settings)?),
                _ => Some(Gesture::higher_swipe(update, &self.settings)?),
            };

            if let Some(gesture) = &self.active {
                debug!("Tracking new {} gesture", gesture.kind());
            }
        }

        if let Some(gesture) = self.active.as_mut() {
            if was_pending && !gesture.is_pending() {
                info!(
                    "Gesture {} validated, notifying {} subscribers",
                    gesture.kind(),
                    self.gesture_listeners.len()
                );
                for listener in &mut self.gesture_listeners {
                    listener(gesture);
                }
            }
        }

        Ok(())
    }
}

impl Default for GestureDispatcher {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::core::GestureKind;
    use crate::gesture::test_support::{frame, recorder, Recorded};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn selects_variant_by_finger_count() {
        let mut dispatcher = GestureDispatcher::default();

        dispatcher.on_update(&frame(1, &[(0, 0.0, 0.0)])).unwrap();
        assert_eq!(
            dispatcher.active().map(Gesture::kind),
            Some(GestureKind::SingleFingerMove)
        );

        dispatcher
            .on_update(&frame(2, &[(0, 0.0, 0.0), (1, 1.0, 0.0)]))
            .unwrap();
        assert_eq!(
            dispatcher.active().map(Gesture::kind),
            Some(GestureKind::TwoFingerSwipePinch)
        );

        dispatcher
            .on_update(&frame(3, &[(0, 0.0, 0.0), (1, 1.0, 0.0), (2, 2.0, 0.0)]))
            .unwrap();
        assert_eq!(
            dispatcher.active().map(Gesture::kind),
            Some(GestureKind::HigherSwipe(3))
        );
    }

    #[test]
    fn stays_idle_on_zero_touches() {
        let mut dispatcher = GestureDispatcher::default();
        dispatcher.on_update(&frame(0, &[])).unwrap();
        assert!(dispatcher.active().is_none());
    }

    #[test]
    fn clears_active_gesture_when_all_fingers_lift() {
        let mut dispatcher = GestureDispatcher::default();
        dispatcher.on_update(&frame(1, &[(0, 0.0, 0.0)])).unwrap();
        dispatcher.on_update(&frame(0, &[])).unwrap();
        assert!(dispatcher.active().is_none());
    }

    #[test]
    fn swaps_gesture_within_one_frame() {
        let mut dispatcher = GestureDispatcher::default();
        dispatcher
            .on_update(&frame(3, &[(0, 0.0, 0.0), (1, 1.0, 0.0), (2, 2.0, 0.0)]))
            .unwrap();

        // growing beyond the ceiling ends the 3-finger swipe and starts a
        // 4-finger one in the same call
        dispatcher
            .on_update(&frame(
                4,
                &[(0, 0.0, 0.0), (1, 1.0, 0.0), (2, 2.0, 0.0), (3, 3.0, 0.0)],
            ))
            .unwrap();
        assert_eq!(
            dispatcher.active().map(Gesture::kind),
            Some(GestureKind::HigherSwipe(4))
        );
    }

    #[test]
    fn validated_notification_fires_exactly_once() {
        let mut dispatcher = GestureDispatcher::default();
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = notified.clone();
        dispatcher.on_new_gesture(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        dispatcher.on_update(&frame(1, &[(0, 0.0, 0.0)])).unwrap();
        dispatcher.on_update(&frame(1, &[(0, 0.02, 0.0)])).unwrap();
        assert_eq!(notified.load(Ordering::SeqCst), 0);

        dispatcher.on_update(&frame(1, &[(0, 0.08, 0.0)])).unwrap();
        assert_eq!(notified.load(Ordering::SeqCst), 1);

        dispatcher.on_update(&frame(1, &[(0, 0.12, 0.0)])).unwrap();
        assert_eq!(notified.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscribers_can_attach_listeners_on_validation() {
        let mut dispatcher = GestureDispatcher::default();
        let (listener, log) = recorder();
        let mut slot = Some(listener);
        dispatcher.on_new_gesture(move |gesture| {
            if let Some(listener) = slot.take() {
                gesture.add_listener(Box::new(listener));
            }
        });

        dispatcher.on_update(&frame(1, &[(0, 0.0, 0.0)])).unwrap();
        dispatcher.on_update(&frame(1, &[(0, 0.08, 0.0)])).unwrap();
        dispatcher.on_update(&frame(1, &[(0, 0.10, 0.0)])).unwrap();
        dispatcher.on_update(&frame(0, &[])).unwrap();

        let log = log.lock().unwrap();
        // attached after the validating emission: one update frame, then
        // termination
        assert!(matches!(log[0], Recorded::Update(_)));
        assert!(matches!(log.last(), Some(Recorded::Terminated)));
    }

    #[test]
    fn construction_contract_violation_surfaces_as_error() {
        let mut dispatcher = GestureDispatcher::default();

        // count claims one finger but no coordinates were reported; the
        // sanitizer collaborator is expected to prevent this
        let result = dispatcher.on_update(&frame(1, &[]));
        assert!(matches!(result, Err(GestureError::InvariantViolation(_))));
        assert!(dispatcher.active().is_none());
    }
}
