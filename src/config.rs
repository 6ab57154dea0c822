use crate::touch::GestureParam;

/// Settings for gesture validation and output smoothing.
///
/// Defaults carry the tuned values every consumer is expected to use; they
/// are exposed as a settings struct so embedders can adjust sensitivity
/// without patching the crate.
#[derive(Clone, Debug)]
pub struct GestureSettings {
    /// Validation threshold for horizontal translation.
    pub delta_x_threshold: f64,

    /// Validation threshold for vertical translation.
    pub delta_y_threshold: f64,

    /// Validation threshold for the pinch scale excursion from 1.0.
    pub scale_threshold: f64,

    /// Floor for the two-finger initial reference distance. Prevents a
    /// near-zero baseline from blowing up the scale ratio later.
    pub two_finger_min_dist: f64,

    /// Weight of each new raw sample in the output exponential filter.
    pub lowpass_inertia: f64,

    /// Republishing rate of the smoothed output stream.
    pub lowpass_freq_hz: f64,
}

impl GestureSettings {
    /// Validation threshold for one gesture parameter.
    pub fn threshold(&self, param: GestureParam) -> f64 {
        match param {
            GestureParam::DeltaX => self.delta_x_threshold,
            GestureParam::DeltaY => self.delta_y_threshold,
            GestureParam::Scale => self.scale_threshold,
        }
    }
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            delta_x_threshold: 0.05,
            delta_y_threshold: 0.05,
            scale_threshold: 0.05,
            two_finger_min_dist: 0.1,
            lowpass_inertia: 0.85,
            lowpass_freq_hz: 100.0,
        }
    }
}
