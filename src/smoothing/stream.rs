use crate::config::GestureSettings;
use crate::gesture::core::{Gesture, GestureListener};
use crate::smoothing::lowpass::Lowpass;
use crate::touch::{GestureParam, GestureValues};
use std::collections::HashMap;
use std::sync::{mpsc as std_mpsc, Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Republishes a gesture's validated output at a fixed cadence through
/// per-key exponential filters.
///
/// Attaching registers a tap listener on the wrapped gesture; every raw
/// update overwrites a single latest-snapshot slot. An owned background task
/// wakes at the configured rate, filters the snapshot and publishes the
/// result to this stream's own listeners.
///
/// Termination is a synchronous barrier: when the wrapped gesture terminates
/// (or [`stop`](Self::stop) is called), the caller blocks until the task has
/// observed the stop signal and fully exited, and only then are this stream's
/// listeners told to terminate. No smoothed sample is ever delivered after
/// the termination notification. A second stop is a no-op.
///
/// Must be attached from within a tokio runtime. The stop path blocks the
/// calling thread, so drive the input timeline from a dedicated thread or a
/// multi-threaded runtime.
pub struct SmoothedGestureStream {
    shared: Arc<Shared>,
    control: Arc<Control>,
}

struct Shared {
    /// Latest raw snapshot; writer is the input timeline, reader the
    /// periodic task. Whole-map swap, never partial updates.
    snapshot: Mutex<Option<GestureValues>>,
    listeners: Mutex<Vec<Box<dyn GestureListener>>>,
}

struct Control {
    stop_tx: watch::Sender<bool>,
    /// Present until the task has been joined once. Concurrent stops
    /// serialize on this mutex; whoever takes the receiver performs the join
    /// and the termination delivery, later callers find it empty.
    join: Mutex<Option<std_mpsc::Receiver<()>>>,
}

impl SmoothedGestureStream {
    /// Wraps `gesture`, spawning the periodic smoothing task.
    pub fn attach(gesture: &mut Gesture, settings: &GestureSettings) -> Self {
        let shared = Arc::new(Shared {
            snapshot: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
        });

        let (stop_tx, stop_rx) = watch::channel(false);
        let (done_tx, done_rx) = std_mpsc::channel();
        let control = Arc::new(Control {
            stop_tx,
            join: Mutex::new(Some(done_rx)),
        });

        let period = Duration::from_secs_f64(1.0 / settings.lowpass_freq_hz);
        info!(
            "Starting smoothing task for {} gesture at {:.0} Hz",
            gesture.kind(),
            settings.lowpass_freq_hz
        );

        let task_handle = tokio::spawn(run_smoothing_loop(
            shared.clone(),
            stop_rx,
            done_tx,
            period,
            settings.lowpass_inertia,
        ));
        debug!("Smoothing task spawned with handle: {:?}", task_handle);

        gesture.add_listener(Box::new(SmoothingTap {
            shared: shared.clone(),
            control: control.clone(),
        }));

        Self { shared, control }
    }

    /// Registers a listener for the smoothed output stream.
    pub fn add_listener(&self, listener: Box<dyn GestureListener>) {
        match self.shared.listeners.lock() {
            Ok(mut listeners) => listeners.push(listener),
            Err(e) => warn!("Unable to register smoothed listener: {}", e),
        }
    }

    /// Stops the smoothing task, blocking until it has exited, then notifies
    /// this stream's listeners of termination. Idempotent.
    pub fn stop(&self) {
        stop_and_notify(&self.control, &self.shared);
    }
}

/// Tap registered on the wrapped gesture: records the latest snapshot and
/// translates the gesture's termination into the stream's stop barrier.
struct SmoothingTap {
    shared: Arc<Shared>,
    control: Arc<Control>,
}

impl GestureListener for SmoothingTap {
    fn on_update(&mut self, values: &GestureValues) {
        match self.shared.snapshot.lock() {
            Ok(mut snapshot) => *snapshot = Some(values.clone()),
            Err(e) => warn!("Unable to store gesture snapshot: {}", e),
        }
    }

    fn on_terminate(&mut self) {
        stop_and_notify(&self.control, &self.shared);
    }
}

fn stop_and_notify(control: &Control, shared: &Shared) {
    let mut join = match control.join.lock() {
        Ok(guard) => guard,
        Err(e) => {
            warn!("Smoothing stop lock poisoned: {}", e);
            return;
        }
    };

    let Some(done_rx) = join.take() else {
        // already stopped
        return;
    };

    let _ = control.stop_tx.send(true);
    // blocks until the task drops its end of the channel, i.e. has exited;
    // guarantees no smoothed sample after the termination below
    let _ = done_rx.recv();
    debug!("Smoothing task exited");

    match shared.listeners.lock() {
        Ok(mut listeners) => {
            for mut listener in listeners.drain(..) {
                listener.on_terminate();
            }
        }
        Err(e) => warn!("Unable to notify smoothed listeners of termination: {}", e),
    }
}

async fn run_smoothing_loop(
    shared: Arc<Shared>,
    mut stop_rx: watch::Receiver<bool>,
    done_tx: std_mpsc::Sender<()>,
    period: Duration,
    inertia: f64,
) {
    let mut interval = tokio::time::interval(period);
    let mut filters: HashMap<GestureParam, Lowpass> = HashMap::new();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let raw = match shared.snapshot.lock() {
                    Ok(snapshot) => snapshot.clone(),
                    Err(e) => {
                        warn!("Unable to read gesture snapshot: {}", e);
                        continue;
                    }
                };

                // nothing published until the first raw snapshot arrives
                let Some(raw) = raw else { continue };

                let mut smoothed = GestureValues::with_capacity(raw.len());
                for (&param, &value) in &raw {
                    let filter = filters
                        .entry(param)
                        .or_insert_with(|| Lowpass::new(inertia));
                    smoothed.insert(param, filter.next(value));
                }

                match shared.listeners.lock() {
                    Ok(mut listeners) => {
                        for listener in listeners.iter_mut() {
                            listener.on_update(&smoothed);
                        }
                    }
                    Err(e) => warn!("Unable to publish smoothed values: {}", e),
                }
            }
            _ = stop_rx.changed() => {
                debug!("Smoothing task received stop signal");
                break;
            }
        }
    }

    // dropping the sender is the exit acknowledgement the stop path waits on
    drop(done_tx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::test_support::{frame, recorder, Recorded};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    fn validated_single_finger(settings: &GestureSettings) -> Gesture {
        let mut gesture =
            Gesture::single_finger_move(&frame(1, &[(0, 0.0, 0.0)]), settings).unwrap();
        gesture.process(&frame(1, &[(0, 0.08, 0.0)]));
        assert!(!gesture.is_pending());
        gesture
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn smoothed_updates_converge_to_raw_value() {
        init_tracing();
        let settings = GestureSettings::default();
        let mut gesture = validated_single_finger(&settings);
        let stream = SmoothedGestureStream::attach(&mut gesture, &settings);
        let (listener, log) = recorder();
        stream.add_listener(Box::new(listener));

        // raw dx settles at 0.12 (offset 0.08 captured at validation)
        gesture.process(&frame(1, &[(0, 0.2, 0.0)]));

        // ~10 ticks at 100 Hz; residual shrinks by 0.15 per tick
        tokio::time::sleep(Duration::from_millis(100)).await;
        stream.stop();

        let log = log.lock().unwrap();
        let updates: Vec<_> = log
            .iter()
            .filter_map(|entry| match entry {
                Recorded::Update(values) => Some(values[&GestureParam::DeltaX]),
                Recorded::Terminated => None,
            })
            .collect();
        assert!(!updates.is_empty(), "no smoothed updates delivered");
        let last = updates.last().unwrap();
        assert!(
            (last - 0.12).abs() < 0.01,
            "smoothed value {} did not converge to 0.12",
            last
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn holds_value_without_new_raw_input() {
        init_tracing();
        let settings = GestureSettings::default();
        let mut gesture = validated_single_finger(&settings);
        let stream = SmoothedGestureStream::attach(&mut gesture, &settings);
        let (listener, log) = recorder();
        stream.add_listener(Box::new(listener));

        gesture.process(&frame(1, &[(0, 0.18, 0.0)]));

        // no further raw input: the filter converges onto the last snapshot
        // and stays there, it does not decay toward zero
        tokio::time::sleep(Duration::from_millis(150)).await;
        stream.stop();

        let log = log.lock().unwrap();
        let last = log
            .iter()
            .rev()
            .find_map(|entry| match entry {
                Recorded::Update(values) => Some(values[&GestureParam::DeltaX]),
                Recorded::Terminated => None,
            })
            .expect("no smoothed updates delivered");
        assert!((last - 0.10).abs() < 0.01, "held value drifted: {}", last);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn no_update_after_termination() {
        init_tracing();
        let settings = GestureSettings::default();
        let mut gesture = validated_single_finger(&settings);
        let stream = SmoothedGestureStream::attach(&mut gesture, &settings);
        let (listener, log) = recorder();
        stream.add_listener(Box::new(listener));

        gesture.process(&frame(1, &[(0, 0.2, 0.0)]));
        tokio::time::sleep(Duration::from_millis(50)).await;

        // gesture termination drives the stream's stop barrier through the tap
        gesture.terminate();

        let len_at_termination = {
            let log = log.lock().unwrap();
            assert!(
                matches!(log.last(), Some(Recorded::Terminated)),
                "termination notification missing or not last"
            );
            log.len()
        };

        // the task has exited; nothing may arrive afterwards
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(log.lock().unwrap().len(), len_at_termination);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_is_idempotent() {
        init_tracing();
        let settings = GestureSettings::default();
        let mut gesture = validated_single_finger(&settings);
        let stream = SmoothedGestureStream::attach(&mut gesture, &settings);
        let (listener, log) = recorder();
        stream.add_listener(Box::new(listener));

        stream.stop();
        stream.stop();
        // the gesture's own termination after a manual stop is also a no-op
        gesture.terminate();

        let log = log.lock().unwrap();
        let terminations = log
            .iter()
            .filter(|entry| matches!(entry, Recorded::Terminated))
            .count();
        assert_eq!(terminations, 1);
    }
}
