//! Observable value wrapper with change notification.
//!
//! [`Observable<T>`] holds a value behind a shared handle. When the value
//! changes (determined by `PartialEq`), live subscribers are notified in
//! registration order and the paired `tokio::sync::watch` channel is updated,
//! so both synchronous callbacks and async tasks can react.
//!
//! Cloning an `Observable` creates another handle to the same state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;
type WeakCallback<T> = Weak<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    sender: watch::Sender<T>,
    /// Stored weakly; dead entries are pruned on notify.
    subscribers: Mutex<Vec<WeakCallback<T>>>,
}

/// A shared value with change notification.
///
/// # Invariants
///
/// 1. `set(v)` where `v == current` is a no-op.
/// 2. Subscribers are notified after the value is updated, in registration order.
/// 3. Dropped [`Subscription`] guards are never called again.
pub struct Observable<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.inner.sender.borrow())
            .field("subscriber_count", &lock(&self.inner.subscribers).len())
            .finish()
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        let (sender, _) = watch::channel(value);
        Self {
            inner: Arc::new(Inner {
                sender,
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.inner.sender.borrow().clone()
    }

    /// Set a new value, notifying subscribers if it differs from the current one.
    ///
    /// Returns whether the value changed.
    pub fn set(&self, value: T) -> bool {
        let changed = self.inner.sender.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value.clone();
            true
        });

        if changed {
            self.notify(&value);
        }
        changed
    }

    /// Register a callback invoked with each new value.
    ///
    /// Dropping the returned guard unsubscribes the callback.
    #[must_use = "dropping the subscription immediately unsubscribes"]
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let strong: Callback<T> = Arc::new(callback);
        lock(&self.inner.subscribers).push(Arc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// A receiver that observes every committed value.
    pub fn watch(&self) -> watch::Receiver<T> {
        self.inner.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.subscribers)
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    fn notify(&self, value: &T) {
        // Collect first so callbacks can read or subscribe without deadlocking.
        let callbacks: Vec<Callback<T>> = {
            let mut subscribers = lock(&self.inner.subscribers);
            subscribers.retain(|w| w.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };

        for callback in callbacks {
            callback(value);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Guard keeping an [`Observable`] subscription alive.
pub struct Subscription {
    _guard: Box<dyn std::any::Any + Send + Sync>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_get_returns_initial_value() {
        let observable = Observable::new("es".to_string());
        assert_eq!(observable.get(), "es");
    }

    #[test]
    fn test_set_same_value_is_noop() {
        let observable = Observable::new(1);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let _sub = observable.subscribe(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!observable.set(1));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscribers_notified_in_registration_order() {
        let observable = Observable::new(0);
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = order.clone();
        let _a = observable.subscribe(move |v| first.lock().unwrap().push(("a", *v)));
        let second = order.clone();
        let _b = observable.subscribe(move |v| second.lock().unwrap().push(("b", *v)));

        assert!(observable.set(7));

        assert_eq!(*order.lock().unwrap(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_subscriber_sees_updated_value() {
        let observable = Observable::new("en".to_string());
        let seen = Arc::new(Mutex::new(None));
        let handle = observable.clone();
        let seen_clone = seen.clone();
        let _sub = observable.subscribe(move |_| {
            *seen_clone.lock().unwrap() = Some(handle.get());
        });

        observable.set("pt".to_string());

        assert_eq!(seen.lock().unwrap().as_deref(), Some("pt"));
    }

    #[test]
    fn test_dropped_subscription_not_called() {
        let observable = Observable::new(0);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let sub = observable.subscribe(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        observable.set(1);
        drop(sub);
        observable.set(2);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(observable.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_watch_receives_changes() {
        let observable = Observable::new("en".to_string());
        let mut rx = observable.watch();

        observable.set("fr".to_string());

        rx.changed().await.expect("sender alive");
        assert_eq!(*rx.borrow(), "fr");
    }
}
