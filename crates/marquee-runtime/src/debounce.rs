//! Trailing-edge debounce for text input.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Quiet period before a query edit is acted on.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Input side of a debounced signal.
///
/// Values pushed here come out of the paired receiver only once no newer
/// value has arrived for the full delay. Dropping the `Debouncer` cancels
/// any pending emission.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

/// Spawn a debouncer on the current tokio runtime.
pub fn debounce<T: Send + 'static>(delay: Duration) -> (Debouncer<T>, mpsc::UnboundedReceiver<T>) {
    let (tx, input) = mpsc::unbounded_channel();
    let (output, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(delay, input, output));
    (Debouncer { tx, task }, rx)
}

impl<T> Debouncer<T> {
    /// Record a new value, restarting the delay.
    pub fn push(&self, value: T) {
        let _ = self.tx.send(value);
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<T>(delay: Duration, mut input: mpsc::UnboundedReceiver<T>, output: mpsc::UnboundedSender<T>) {
    let mut pending: Option<T> = None;
    let timer = tokio::time::sleep(delay);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            value = input.recv() => match value {
                Some(value) => {
                    pending = Some(value);
                    timer.as_mut().reset(Instant::now() + delay);
                }
                // Input closed: whatever is pending is dropped.
                None => break,
            },
            () = &mut timer, if pending.is_some() => {
                if let Some(value) = pending.take() {
                    if output.send(value).is_err() {
                        break;
                    }
                }
            }
        }
    }
}
