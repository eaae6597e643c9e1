// src/readers/cancel.rs

//! Implements [`CancelToken`], a cooperative cancellation flag shared by
//! the caller of a scan and all file processing threads.
//!
//! Cancellation is not an error. A cancelled scan returns whatever was
//! gathered before the cancellation was noticed.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use ::crossbeam_channel::{bounded, Receiver, Sender};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

#[derive(Default)]
struct CancelInner {
    cancelled: AtomicBool,
    /// notified once upon cancellation
    subscribers: Mutex<Vec<Sender<()>>>,
}

/// A cloneable handle to one cancellation flag.
///
/// All clones observe the same flag.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        defn!();
        let mut subscribers = match self.inner.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            defx!("already cancelled");
            return;
        }
        for subscriber in subscribers.drain(..) {
            // a dropped receiver is not interested
            _ = subscriber.try_send(());
        }
        defx!();
    }

    /// Has cancellation been requested?
    #[inline(always)]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Relaxed)
    }

    /// A channel that receives one `()` when cancellation is requested.
    /// If already cancelled then the `()` is immediately available.
    pub fn subscribe(&self) -> Receiver<()> {
        let (sender, receiver) = bounded::<()>(1);
        let mut subscribers = match self.inner.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if self.inner.cancelled.load(Ordering::SeqCst) {
            _ = sender.try_send(());
        } else {
            subscribers.push(sender);
        }

        receiver
    }
}
