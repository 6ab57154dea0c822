//! Touchpad gesture classification and smoothing.
//!
//! Converts a sanitized stream of multi-touch frames into classified,
//! validated and temporally smoothed gesture parameters (translation deltas,
//! plus a pinch scale factor for two-finger input), for input-handling layers
//! that want semantically stable gesture events rather than raw coordinates.
//!
//! # Architecture
//!
//! ```text
//! Device ──► Sanitizer ──► GestureDispatcher ──► Gesture ──► listeners
//!            (external)                           │
//!                                                 └──► SmoothedGestureStream ──► listeners
//! ```
//!
//! The input timeline is strictly sequential and synchronous; only the
//! smoothing streams run their own periodic tasks. Device enumeration,
//! protocol parsing and touch-id sanitizing are external collaborators.
//!
//! ```no_run
//! use touchgestures::{
//!     CallbackListener, GestureDispatcher, GestureSettings, SmoothedGestureStream,
//!     TouchSample, TouchUpdate,
//! };
//!
//! # async fn run() {
//! let settings = GestureSettings::default();
//! let mut dispatcher = GestureDispatcher::new(Some(settings.clone()));
//!
//! dispatcher.on_new_gesture(move |gesture| {
//!     let stream = SmoothedGestureStream::attach(gesture, &settings);
//!     stream.add_listener(Box::new(
//!         CallbackListener::new().update_fn(|values| println!("{values:?}")),
//!     ));
//! });
//!
//! let update = TouchUpdate::new(1, vec![TouchSample { id: 0, x: 0.5, y: 0.5 }]);
//! dispatcher.on_update(&update).unwrap();
//! # }
//! ```

pub mod config;
pub mod gesture;
pub mod smoothing;
pub mod touch;

pub use config::GestureSettings;
pub use gesture::{
    CallbackListener, EventSender, Gesture, GestureDispatcher, GestureError, GestureEvent,
    GestureKind, GestureListener, ProcessOutcome,
};
pub use smoothing::{Lowpass, SmoothedGestureStream};
pub use touch::{GestureParam, GestureValues, TouchSample, TouchUpdate};
