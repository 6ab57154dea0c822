use crate::config::GestureSettings;
use crate::gesture::higher_swipe::HigherSwipeGesture;
use crate::gesture::single_finger::SingleFingerMoveGesture;
use crate::gesture::two_finger::TwoFingerSwipePinchGesture;
use crate::touch::{GestureValues, TouchUpdate};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

// Gesture errors
#[derive(Debug, thiserror::Error)]
pub enum GestureError {
    /// A gesture variant was constructed from an update whose touch
    /// cardinality does not match the variant's requirement. Cannot happen
    /// when the dispatcher's variant-selection rule is followed.
    #[error("Gesture contract violation: {0}")]
    InvariantViolation(String),
}

/// Observer of one gesture's output stream.
///
/// `on_update` receives offset-corrected parameter values once per emitting
/// frame; `on_terminate` fires exactly once, when the gesture ends. Delivery
/// order among listeners is registration order.
pub trait GestureListener: Send {
    fn on_update(&mut self, values: &GestureValues);
    fn on_terminate(&mut self);
}

/// Listener built from optional closures, for consumers that do not want to
/// implement [`GestureListener`] themselves.
#[derive(Default)]
pub struct CallbackListener {
    update: Option<Box<dyn FnMut(&GestureValues) + Send>>,
    terminate: Option<Box<dyn FnMut() + Send>>,
}

impl CallbackListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_fn(mut self, f: impl FnMut(&GestureValues) + Send + 'static) -> Self {
        self.update = Some(Box::new(f));
        self
    }

    pub fn terminate_fn(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.terminate = Some(Box::new(f));
        self
    }
}

impl GestureListener for CallbackListener {
    fn on_update(&mut self, values: &GestureValues) {
        if let Some(f) = self.update.as_mut() {
            f(values);
        }
    }

    fn on_terminate(&mut self) {
        if let Some(f) = self.terminate.as_mut() {
            f();
        }
    }
}

/// Gesture output as a channel message, for consumers that drain a queue
/// instead of registering callbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GestureEvent {
    Update(GestureValues),
    Terminated,
}

/// Listener that forwards gesture output over an mpsc channel.
///
/// Uses `try_send`: a full or closed channel drops the update rather than
/// stalling the input timeline.
pub struct EventSender {
    sender: mpsc::Sender<GestureEvent>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<GestureEvent>) -> Self {
        Self { sender }
    }
}

impl GestureListener for EventSender {
    fn on_update(&mut self, values: &GestureValues) {
        if let Err(e) = self.sender.try_send(GestureEvent::Update(values.clone())) {
            warn!("Dropping gesture update, channel unavailable: {}", e);
        }
    }

    fn on_terminate(&mut self) {
        if let Err(e) = self.sender.try_send(GestureEvent::Terminated) {
            warn!("Dropping gesture termination event, channel unavailable: {}", e);
        }
    }
}

/// Result of feeding one frame to a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The gesture stays active.
    Continue,
    /// The frame ends the gesture; the owner must call [`Gesture::terminate`].
    Terminate,
}

/// Per-frame result of a variant tracker, before validation and offset
/// correction are applied by the shared core.
pub(crate) enum FrameResult {
    /// Raw parameter values for this frame.
    Emit(GestureValues),
    /// Stay alive without emitting; coordinates are transiently missing.
    Hold,
    Terminate,
}

/// Which gesture variant is being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureKind {
    SingleFingerMove,
    TwoFingerSwipePinch,
    /// Carries the finger count the gesture started with.
    HigherSwipe(usize),
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureKind::SingleFingerMove => write!(f, "SingleFingerMove"),
            GestureKind::TwoFingerSwipePinch => write!(f, "TwoFingerSwipePinch"),
            GestureKind::HigherSwipe(n) => write!(f, "HigherSwipe({})", n),
        }
    }
}

pub(crate) enum GestureVariant {
    SingleFingerMove(SingleFingerMoveGesture),
    TwoFingerSwipePinch(TwoFingerSwipePinchGesture),
    HigherSwipe(HigherSwipeGesture),
}

impl GestureVariant {
    fn kind(&self) -> GestureKind {
        match self {
            GestureVariant::SingleFingerMove(_) => GestureKind::SingleFingerMove,
            GestureVariant::TwoFingerSwipePinch(_) => GestureKind::TwoFingerSwipePinch,
            GestureVariant::HigherSwipe(g) => GestureKind::HigherSwipe(g.ceiling()),
        }
    }

    fn process(&mut self, update: &TouchUpdate) -> FrameResult {
        match self {
            GestureVariant::SingleFingerMove(g) => g.process(update),
            GestureVariant::TwoFingerSwipePinch(g) => g.process(update),
            GestureVariant::HigherSwipe(g) => g.process(update),
        }
    }
}

/// One tracked gesture: a variant tracker plus the validation, offset and
/// listener state shared by all variants.
///
/// A gesture starts `pending` and emits nothing until one parameter exceeds
/// its validation threshold. At that moment the per-key offset is captured so
/// the emitted output starts at (approximately) the parameter centers, with
/// no jump from the pre-validation drift.
pub struct Gesture {
    variant: GestureVariant,
    settings: GestureSettings,
    pending: bool,
    offset: Option<GestureValues>,
    listeners: Vec<Box<dyn GestureListener>>,
}

impl Gesture {
    pub fn single_finger_move(
        update: &TouchUpdate,
        settings: &GestureSettings,
    ) -> Result<Self, GestureError> {
        let variant = GestureVariant::SingleFingerMove(SingleFingerMoveGesture::new(update)?);
        Ok(Self::with_variant(variant, settings))
    }

    pub fn two_finger_swipe_pinch(
        update: &TouchUpdate,
        settings: &GestureSettings,
    ) -> Result<Self, GestureError> {
        let variant =
            GestureVariant::TwoFingerSwipePinch(TwoFingerSwipePinchGesture::new(update, settings)?);
        Ok(Self::with_variant(variant, settings))
    }

    pub fn higher_swipe(
        update: &TouchUpdate,
        settings: &GestureSettings,
    ) -> Result<Self, GestureError> {
        let variant = GestureVariant::HigherSwipe(HigherSwipeGesture::new(update)?);
        Ok(Self::with_variant(variant, settings))
    }

    fn with_variant(variant: GestureVariant, settings: &GestureSettings) -> Self {
        debug!("Created {} gesture, awaiting validation", variant.kind());
        Self {
            variant,
            settings: settings.clone(),
            pending: true,
            offset: None,
            listeners: Vec::new(),
        }
    }

    pub fn kind(&self) -> GestureKind {
        self.variant.kind()
    }

    /// True until a parameter has exceeded its validation threshold.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Registers an output listener. Listeners are notified in registration
    /// order and detached on termination.
    pub fn add_listener(&mut self, listener: Box<dyn GestureListener>) {
        self.listeners.push(listener);
    }

    /// Feeds one input frame to the variant tracker and runs the shared
    /// validation/offset/emission step on its raw values.
    pub fn process(&mut self, update: &TouchUpdate) -> ProcessOutcome {
        match self.variant.process(update) {
            FrameResult::Emit(raw) => {
                self.apply(raw);
                ProcessOutcome::Continue
            }
            FrameResult::Hold => ProcessOutcome::Continue,
            FrameResult::Terminate => ProcessOutcome::Terminate,
        }
    }

    fn apply(&mut self, raw: GestureValues) {
        if self.pending {
            let exceeded = raw
                .iter()
                .any(|(&param, &value)| (value - param.center()).abs() > self.settings.threshold(param));

            if exceeded {
                let offset: GestureValues = raw
                    .iter()
                    .map(|(&param, &value)| (param, value - param.center()))
                    .collect();
                info!("Gesture {} validated with offset {:?}", self.kind(), offset);
                self.offset = Some(offset);
                self.pending = false;
            }
        }

        if let Some(offset) = &self.offset {
            let corrected: GestureValues = raw
                .iter()
                .map(|(&param, &value)| {
                    (param, value - offset.get(&param).copied().unwrap_or(0.0))
                })
                .collect();

            debug!("Gesture {} emitting {:?}", self.kind(), corrected);
            for listener in &mut self.listeners {
                listener.on_update(&corrected);
            }
        }
    }

    /// Ends the gesture: notifies every listener's `on_terminate` and
    /// detaches them all.
    pub fn terminate(&mut self) {
        debug!(
            "Terminating {} gesture with {} listeners",
            self.kind(),
            self.listeners.len()
        );
        for mut listener in self.listeners.drain(..) {
            listener.on_terminate();
        }
    }
}
