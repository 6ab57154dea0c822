//! Gesture classification subsystem.
//!
//! Turns the sanitized stream of [`TouchUpdate`](crate::touch::TouchUpdate)
//! frames into classified, validated gesture output:
//!
//! ```text
//! TouchUpdate ──► GestureDispatcher ──► Gesture (variant tracker)
//!                                          │ validation / offset
//!                                          ▼
//!                                    GestureListener(s)
//! ```
//!
//! The dispatcher owns at most one [`Gesture`] at a time and selects the
//! variant by finger count: one finger moves, two fingers swipe/pinch, three
//! to five fingers drive the higher swipe with anchor hand-off. A gesture
//! emits nothing until a parameter exceeds its validation threshold, which
//! suppresses noise and incidental touches.

pub mod core;
pub mod dispatcher;
mod higher_swipe;
mod single_finger;
mod two_finger;

pub use self::core::{
    CallbackListener, EventSender, Gesture, GestureError, GestureEvent, GestureKind,
    GestureListener, ProcessOutcome,
};
pub use dispatcher::GestureDispatcher;
