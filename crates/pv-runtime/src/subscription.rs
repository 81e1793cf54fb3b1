#![forbid(unsafe_code)]

//! Background event sources with explicit cancellation.
//!
//! Each subscription runs on its own thread and feeds a shared channel. The
//! view owns a [`SubscriptionManager`]; tearing the view down stops every
//! source through its [`StopSignal`] so nothing outlives the viewport.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, mpsc};
use std::thread;
use std::time::{Duration, Instant};

/// Identifier used to deduplicate subscriptions.
pub type SubId = u64;

/// A source of messages running on a background thread.
pub trait Subscription<M: Send + 'static>: Send {
    /// Subscriptions with equal ids are considered the same source.
    fn id(&self) -> SubId;

    /// Send messages until the receiver is gone or `stop` fires.
    fn run(&self, sender: mpsc::Sender<M>, stop: StopSignal);
}

type StopState = Arc<(Mutex<bool>, Condvar)>;

fn lock_flag(lock: &Mutex<bool>) -> MutexGuard<'_, bool> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cancellation flag observed by a running subscription.
#[derive(Clone)]
pub struct StopSignal {
    inner: StopState,
}

impl StopSignal {
    /// A fresh (signal, trigger) pair.
    pub(crate) fn new() -> (Self, StopTrigger) {
        let inner: StopState = Arc::new((Mutex::new(false), Condvar::new()));
        let signal = Self {
            inner: Arc::clone(&inner),
        };
        (signal, StopTrigger { inner })
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *lock_flag(&self.inner.0)
    }

    /// Block until stopped or `duration` elapses. Returns `true` if stopped.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut stopped = lock_flag(lock);
        let start = Instant::now();
        let mut remaining = duration;
        loop {
            if *stopped {
                return true;
            }
            let (guard, result) = cvar
                .wait_timeout(stopped, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            stopped = guard;
            if *stopped {
                return true;
            }
            let elapsed = start.elapsed();
            if result.timed_out() || elapsed >= duration {
                return false;
            }
            remaining = duration - elapsed;
        }
    }
}

/// Owner side of a [`StopSignal`].
pub(crate) struct StopTrigger {
    inner: StopState,
}

impl StopTrigger {
    pub(crate) fn stop(&self) {
        let (lock, cvar) = &*self.inner;
        *lock_flag(lock) = true;
        cvar.notify_all();
    }
}

pub(crate) struct RunningSubscription {
    pub(crate) id: SubId,
    trigger: StopTrigger,
    thread: Option<thread::JoinHandle<()>>,
}

impl RunningSubscription {
    /// Signal the source and wait for its thread to exit.
    pub(crate) fn stop(mut self) {
        self.trigger.stop();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RunningSubscription {
    fn drop(&mut self) {
        self.trigger.stop();
    }
}

/// Starts, stops and drains the subscriptions of one view.
pub struct SubscriptionManager<M: Send + 'static> {
    active: Vec<RunningSubscription>,
    sender: mpsc::Sender<M>,
    receiver: mpsc::Receiver<M>,
}

impl<M: Send + 'static> Default for SubscriptionManager<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Send + 'static> SubscriptionManager<M> {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            active: Vec::new(),
            sender,
            receiver,
        }
    }

    /// Start each source on its own thread. Ids already running are skipped.
    pub fn start(&mut self, subscriptions: Vec<Box<dyn Subscription<M>>>) {
        for sub in subscriptions {
            let id = sub.id();
            if self.active.iter().any(|running| running.id == id) {
                tracing::trace!(sub_id = id, "subscription already running");
                continue;
            }
            tracing::debug!(sub_id = id, "starting subscription");
            let (signal, trigger) = StopSignal::new();
            let sender = self.sender.clone();
            let thread = thread::spawn(move || sub.run(sender, signal));
            self.active.push(RunningSubscription {
                id,
                trigger,
                thread: Some(thread),
            });
        }
    }

    /// Pending messages, without blocking.
    pub fn drain_messages(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }

    /// Wait up to `timeout` for one message.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<M> {
        self.receiver.recv_timeout(timeout).ok()
    }

    #[inline]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Stop and join every running source.
    pub fn stop_all(&mut self) {
        for running in self.active.drain(..) {
            tracing::debug!(sub_id = running.id, "stopping subscription");
            running.stop();
        }
    }
}

impl<M: Send + 'static> Drop for SubscriptionManager<M> {
    fn drop(&mut self) {
        self.stop_all();
    }
}

/// Fires a message at a fixed interval.
pub struct Every<M: Send + 'static> {
    id: SubId,
    interval: Duration,
    make_msg: Box<dyn Fn() -> M + Send + Sync>,
}

impl<M: Send + 'static> Every<M> {
    /// Id derived from the interval so equal timers deduplicate.
    pub fn new(interval: Duration, make_msg: impl Fn() -> M + Send + Sync + 'static) -> Self {
        let nanos = u64::try_from(interval.as_nanos()).unwrap_or(u64::MAX);
        Self::with_id(nanos ^ 0x5449_434B, interval, make_msg)
    }

    pub fn with_id(
        id: SubId,
        interval: Duration,
        make_msg: impl Fn() -> M + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            interval,
            make_msg: Box::new(make_msg),
        }
    }
}

impl<M: Send + 'static> Subscription<M> for Every<M> {
    fn id(&self) -> SubId {
        self.id
    }

    fn run(&self, sender: mpsc::Sender<M>, stop: StopSignal) {
        while !stop.wait_timeout(self.interval) {
            if sender.send((self.make_msg)()).is_err() {
                break;
            }
        }
    }
}

/// Terminal input read through crossterm.
#[cfg(not(target_arch = "wasm32"))]
pub struct TerminalEvents {
    poll_interval: Duration,
}

#[cfg(not(target_arch = "wasm32"))]
impl TerminalEvents {
    pub const ID: SubId = 0x494E_5055_54; // "INPUT"

    #[must_use]
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Subscription<pv_core::event::Event> for TerminalEvents {
    fn id(&self) -> SubId {
        Self::ID
    }

    fn run(&self, sender: mpsc::Sender<pv_core::event::Event>, stop: StopSignal) {
        use crossterm::event as cte;

        while !stop.is_stopped() {
            match cte::poll(self.poll_interval) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    tracing::warn!(error = %err, "terminal poll failed");
                    break;
                }
            }
            let raw = match cte::read() {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::warn!(error = %err, "terminal read failed");
                    break;
                }
            };
            if let Some(event) = pv_core::event::Event::from_crossterm(raw)
                && sender.send(event).is_err()
            {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Msg {
        Tick,
        Value(u32),
    }

    struct Burst {
        id: SubId,
        values: Vec<u32>,
    }

    impl Subscription<Msg> for Burst {
        fn id(&self) -> SubId {
            self.id
        }

        fn run(&self, sender: mpsc::Sender<Msg>, stop: StopSignal) {
            for v in &self.values {
                if sender.send(Msg::Value(*v)).is_err() {
                    return;
                }
            }
            stop.wait_timeout(Duration::from_secs(5));
        }
    }

    #[test]
    fn stop_signal_starts_clear() {
        let (signal, _trigger) = StopSignal::new();
        assert!(!signal.is_stopped());
    }

    #[test]
    fn trigger_sets_signal_on_every_clone() {
        let (signal, trigger) = StopSignal::new();
        let clone = signal.clone();
        trigger.stop();
        assert!(signal.is_stopped());
        assert!(clone.is_stopped());
        assert!(clone.wait_timeout(Duration::from_secs(1)));
    }

    #[test]
    fn wait_times_out_when_not_stopped() {
        let (signal, _trigger) = StopSignal::new();
        assert!(!signal.wait_timeout(Duration::from_millis(5)));
    }

    #[test]
    fn wait_is_interrupted_by_trigger() {
        let (signal, trigger) = StopSignal::new();
        let handle = thread::spawn(move || signal.wait_timeout(Duration::from_secs(10)));
        thread::sleep(Duration::from_millis(10));
        trigger.stop();
        assert!(handle.join().unwrap_or(false));
    }

    #[test]
    fn every_ids_are_stable() {
        let a = Every::<Msg>::new(Duration::from_secs(1), || Msg::Tick);
        let b = Every::<Msg>::new(Duration::from_secs(1), || Msg::Tick);
        let c = Every::<Msg>::new(Duration::from_secs(2), || Msg::Tick);
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn manager_runs_and_drains() {
        let mut mgr = SubscriptionManager::new();
        mgr.start(vec![Box::new(Burst {
            id: 1,
            values: vec![1, 2, 3],
        })]);
        assert_eq!(mgr.active_count(), 1);
        let mut got = Vec::new();
        while got.len() < 3 {
            match mgr.recv_timeout(Duration::from_secs(2)) {
                Some(msg) => got.push(msg),
                None => break,
            }
        }
        assert_eq!(got, vec![Msg::Value(1), Msg::Value(2), Msg::Value(3)]);
        mgr.stop_all();
        assert_eq!(mgr.active_count(), 0);
    }

    #[test]
    fn start_skips_running_ids() {
        let mut mgr: SubscriptionManager<Msg> = SubscriptionManager::new();
        mgr.start(vec![
            Box::new(Every::with_id(7, Duration::from_secs(60), || Msg::Tick)),
            Box::new(Every::with_id(7, Duration::from_secs(60), || Msg::Tick)),
        ]);
        assert_eq!(mgr.active_count(), 1);
        mgr.start(vec![
            Box::new(Every::with_id(7, Duration::from_secs(60), || Msg::Tick)),
            Box::new(Every::with_id(8, Duration::from_secs(60), || Msg::Tick)),
        ]);
        assert_eq!(mgr.active_count(), 2);
        mgr.stop_all();
        assert_eq!(mgr.active_count(), 0);
    }

    #[test]
    fn every_fires_until_stopped() {
        let mut mgr = SubscriptionManager::new();
        mgr.start(vec![Box::new(Every::with_id(1, Duration::from_millis(5), || {
            Msg::Tick
        }))]);
        assert_eq!(mgr.recv_timeout(Duration::from_secs(2)), Some(Msg::Tick));
        mgr.stop_all();
        let _ = mgr.drain_messages();
        thread::sleep(Duration::from_millis(20));
        assert!(mgr.drain_messages().is_empty());
    }
}
