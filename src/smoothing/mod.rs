//! Output smoothing subsystem.
//!
//! Decouples the cadence of gesture output from the irregular arrival of
//! touch frames:
//!
//! ```text
//! Gesture ──► SmoothedGestureStream ──► GestureListener(s)
//!             (latest snapshot)  │
//!                                └── periodic task, per-key Lowpass
//! ```
//!
//! A [`SmoothedGestureStream`] stores only the most recent raw snapshot and
//! republishes it through per-key exponential filters at a fixed rate, so
//! bursts of raw updates between ticks deliberately collapse into the latest
//! value.

pub mod lowpass;
pub mod stream;

pub use lowpass::Lowpass;
pub use stream::SmoothedGestureStream;
