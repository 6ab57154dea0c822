/// First-order exponential filter for one gesture parameter.
///
/// Each sample moves the filtered value `inertia` of the way toward the raw
/// value. The first sample passes through unchanged: seeding from zero would
/// fabricate a ramp from a value no finger ever produced.
#[derive(Debug, Clone)]
pub struct Lowpass {
    inertia: f64,
    state: Option<f64>,
}

impl Lowpass {
    pub fn new(inertia: f64) -> Self {
        Self {
            inertia,
            state: None,
        }
    }

    pub fn next(&mut self, raw: f64) -> f64 {
        let filtered = match self.state {
            None => raw,
            Some(prev) => prev + self.inertia * (raw - prev),
        };
        self.state = Some(filtered);
        filtered
    }
}
