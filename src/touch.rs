use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// One finger's reported position for one input frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchSample {
    /// Stable for a physical contact for as long as the device reports it.
    /// Id reuse is handled by the sanitizing collaborator upstream.
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

/// One input frame from the touchpad.
///
/// `n_touches` is the authoritative finger count. `touches` may hold fewer
/// samples than `n_touches` while the device has not yet reported coordinates
/// for every contact; that is a recoverable transient, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TouchUpdate {
    pub n_touches: usize,

    /// Samples in device-reported arrival order. The order carries tie-break
    /// significance during anchor hand-off.
    pub touches: Vec<TouchSample>,

    /// Arrival timestamp
    pub timestamp: DateTime<Local>,
}

impl TouchUpdate {
    pub fn new(n_touches: usize, touches: Vec<TouchSample>) -> Self {
        Self {
            n_touches,
            touches,
            timestamp: Local::now(),
        }
    }

    pub fn touch_by_id(&self, id: u64) -> Option<&TouchSample> {
        self.touches.iter().find(|t| t.id == id)
    }

    pub fn contains_id(&self, id: u64) -> bool {
        self.touches.iter().any(|t| t.id == id)
    }
}

// Gesture parameter keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureParam {
    DeltaX,
    DeltaY,
    Scale,
}

impl GestureParam {
    /// The value this parameter rests at before any motion. Validation
    /// measures the excursion from here, and offsets are captured against it.
    pub fn center(&self) -> f64 {
        match self {
            GestureParam::DeltaX => 0.0,
            GestureParam::DeltaY => 0.0,
            GestureParam::Scale => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GestureParam::DeltaX => "delta_x",
            GestureParam::DeltaY => "delta_y",
            GestureParam::Scale => "scale",
        }
    }
}

impl fmt::Display for GestureParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One frame's gesture parameters, keyed by [`GestureParam`].
pub type GestureValues = HashMap<GestureParam, f64>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_lookup_by_id() {
        let update = TouchUpdate::new(
            2,
            vec![
                TouchSample { id: 4, x: 0.1, y: 0.2 },
                TouchSample { id: 7, x: 0.3, y: 0.4 },
            ],
        );

        assert!(update.contains_id(7));
        assert!(!update.contains_id(5));
        let touch = update.touch_by_id(4).unwrap();
        assert_eq!(touch.x, 0.1);
    }

    #[test]
    fn param_centers() {
        assert_eq!(GestureParam::DeltaX.center(), 0.0);
        assert_eq!(GestureParam::DeltaY.center(), 0.0);
        assert_eq!(GestureParam::Scale.center(), 1.0);
    }
}
