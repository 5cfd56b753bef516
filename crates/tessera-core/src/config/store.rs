use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Weak};

use futures::future::{self, BoxFuture, FutureExt};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::oneshot;

use crate::config::error::ConfigError;
use crate::config::path::{self, PathSegment};
use crate::utils::value_kind;

/// Verdict returned by a strict-mode validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Accept,
    Reject,
    /// Reject and report why.
    RejectWith(String),
}

impl Validation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Validation::Accept)
    }
}

impl From<bool> for Validation {
    fn from(accepted: bool) -> Self {
        if accepted {
            Validation::Accept
        } else {
            Validation::Reject
        }
    }
}

/// Validator consulted by a strict store before every write.
pub type Validator = Arc<dyn Fn(&str, &Value) -> Validation + Send + Sync>;

type Callback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Identifier of an [`on_got`](ConfigStore::on_got) subscription.
pub type SubscriptionId = u64;

/// Construction options for a [`ConfigStore`].
#[derive(Clone, Default)]
pub struct StoreOptions {
    pub strict: bool,
    pub validator: Option<Validator>,
}

impl StoreOptions {
    /// Strict store gated by `validator`.
    pub fn strict<F, V>(validator: F) -> Self
    where
        F: Fn(&str, &Value) -> V + Send + Sync + 'static,
        V: Into<Validation>,
    {
        Self {
            strict: true,
            validator: Some(Arc::new(move |key: &str, value: &Value| -> Validation {
                validator(key, value).into()
            })),
        }
    }
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("strict", &self.strict)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

enum Waiter {
    Once(oneshot::Sender<Value>),
    Every {
        id: SubscriptionId,
        // Store version at registration; earlier writes are not delivered.
        since: u64,
        callback: Callback,
    },
}

enum Delivery {
    Once(oneshot::Sender<Value>),
    Every(Callback),
}

/// Queued work for one key.
enum Notification {
    /// A write, delivered to every waiter registered before it.
    Set { version: u64, value: Value },
    /// The value current at subscription time, for one new subscriber.
    Initial { id: SubscriptionId, value: Value },
}

#[derive(Default)]
struct StoreState {
    values: Map<String, Value>,
    // Per key, in registration order.
    waits: HashMap<String, Vec<Waiter>>,
    // A key is present while some call is draining its queue.
    pending: HashMap<String, VecDeque<Notification>>,
    version: u64,
    next_subscription: SubscriptionId,
    disposed: bool,
}

impl StoreState {
    /// Queue `notification` for `key`. Returns true when the caller must
    /// drain the queue, false when another call is already draining it.
    fn enqueue(&mut self, key: &str, notification: Notification) -> bool {
        match self.pending.get_mut(key) {
            Some(queue) => {
                queue.push_back(notification);
                false
            }
            None => {
                self.pending.insert(key.to_string(), VecDeque::from([notification]));
                true
            }
        }
    }

    fn take_deliveries(&mut self, key: &str, notification: Notification) -> (Value, Vec<Delivery>) {
        let mut deliveries = Vec::new();
        let value = match notification {
            Notification::Set { version, value } => {
                if let Some(waiters) = self.waits.remove(key) {
                    let mut kept = Vec::with_capacity(waiters.len());
                    for waiter in waiters {
                        match waiter {
                            Waiter::Once(tx) => deliveries.push(Delivery::Once(tx)),
                            Waiter::Every { id, since, callback } => {
                                if since < version {
                                    deliveries.push(Delivery::Every(callback.clone()));
                                }
                                kept.push(Waiter::Every { id, since, callback });
                            }
                        }
                    }
                    if !kept.is_empty() {
                        self.waits.insert(key.to_string(), kept);
                    }
                }
                value
            }
            Notification::Initial { id, value } => {
                let subscriber = self.waits.get(key).and_then(|waiters| {
                    waiters.iter().find_map(|waiter| match waiter {
                        Waiter::Every { id: current, callback, .. } if *current == id => Some(callback.clone()),
                        _ => None,
                    })
                });
                deliveries.extend(subscriber.map(Delivery::Every));
                value
            }
        };
        (value, deliveries)
    }
}

/// Reactive key-value configuration store.
///
/// Under strict mode every write is checked by the validator first; rejected
/// writes are logged at `warn` and leave the store untouched. Waiters are
/// notified oldest-first, with the store lock released, so callbacks may read
/// from or write to the store.
///
/// Writes to a key are delivered in the order they were applied. A write made
/// while the same key is being delivered, from a callback or another thread,
/// is queued and delivered by the call already draining that key.
pub struct ConfigStore {
    // Only present in strict mode.
    strict_validator: Option<Validator>,
    state: Arc<Mutex<StoreState>>,
}

impl ConfigStore {
    /// Create a store seeded with `initial`. The snapshot goes through
    /// [`set_config`](Self::set_config), so strict validation applies to it too.
    pub fn new(initial: Map<String, Value>, options: StoreOptions) -> Result<Self, ConfigError> {
        let strict_validator = match (options.strict, options.validator) {
            (true, None) => return Err(ConfigError::MissingValidator),
            (true, Some(validator)) => Some(validator),
            (false, _) => None,
        };
        let store = Self {
            strict_validator,
            state: Arc::new(Mutex::new(StoreState::default())),
        };
        store.set_config(initial);
        Ok(store)
    }

    /// Like [`new`](Self::new), but checks that `initial` is a key-value mapping.
    pub fn from_value(initial: Value, options: StoreOptions) -> Result<Self, ConfigError> {
        match initial {
            Value::Object(map) => Self::new(map, options),
            other => Err(ConfigError::NotAMapping {
                found: value_kind(&other),
            }),
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict_validator.is_some()
    }

    /// Whether `key` holds a value. `Value::Null` counts as a value.
    pub fn has(&self, key: &str) -> bool {
        self.state.lock().values.contains_key(key)
    }

    /// Resolve `path` against the stored values. An exact key match wins over
    /// path splitting, so keys containing dots stay addressable.
    pub fn get(&self, path: &str) -> Option<Value> {
        let state = self.state.lock();
        if let Some(value) = state.values.get(path) {
            return Some(value.clone());
        }
        let segments = path::parse_path(path);
        let (first, rest) = segments.split_first()?;
        let root = match first {
            PathSegment::Key(key) => state.values.get(key)?,
            PathSegment::Index(index) => state.values.get(&index.to_string())?,
        };
        path::lookup(root, rest).cloned()
    }

    pub fn get_or(&self, path: &str, default: Value) -> Value {
        self.get(path).unwrap_or(default)
    }

    /// Typed read; `None` when the path is missing or does not deserialize as `T`.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        self.get(path).and_then(|value| serde_json::from_value(value).ok())
    }

    /// Store `value` under `key` and notify its waiters. Returns whether the
    /// write was applied; a strict-mode rejection is logged, never raised.
    pub fn set(&self, key: &str, value: Value) -> bool {
        if let Some(validator) = &self.strict_validator {
            match validator(key, &value) {
                Validation::Accept => {}
                Validation::Reject => {
                    log::warn!("Rejected configuration value for key '{}'", key);
                    return false;
                }
                Validation::RejectWith(reason) => {
                    log::warn!("Rejected configuration value for key '{}': {}", key, reason);
                    return false;
                }
            }
        }
        let drain = {
            let mut state = self.state.lock();
            state.version += 1;
            let version = state.version;
            state.values.insert(key.to_string(), value.clone());
            state.enqueue(key, Notification::Set { version, value })
        };
        if drain {
            self.drain_notifications(key);
        }
        true
    }

    /// Apply every entry through [`set`](Self::set). Keys are validated
    /// independently; the rejected ones are returned.
    pub fn set_config(&self, config: Map<String, Value>) -> Vec<String> {
        config
            .into_iter()
            .filter_map(|(key, value)| (!self.set(&key, value)).then_some(key))
            .collect()
    }

    /// [`set_config`](Self::set_config) for an untyped value, which must be a mapping.
    pub fn set_config_value(&self, config: Value) -> Result<Vec<String>, ConfigError> {
        match config {
            Value::Object(map) => Ok(self.set_config(map)),
            other => Err(ConfigError::NotAMapping {
                found: value_kind(&other),
            }),
        }
    }

    /// Resolve with the value of `key`: immediately if it is set, otherwise on
    /// the first later [`set`](Self::set). Registration happens at call time.
    pub fn once_got(&self, key: &str) -> BoxFuture<'static, Result<Value, ConfigError>> {
        let mut state = self.state.lock();
        if let Some(value) = state.values.get(key) {
            return future::ready(Ok(value.clone())).boxed();
        }
        let key = key.to_string();
        if state.disposed {
            return future::ready(Err(ConfigError::WaitCancelled { key })).boxed();
        }

        let (tx, rx) = oneshot::channel();
        state.waits.entry(key.clone()).or_default().push(Waiter::Once(tx));
        log::trace!("Registered one-shot wait for configuration key '{}'", key);
        drop(state);

        async move { rx.await.map_err(|_| ConfigError::WaitCancelled { key }) }.boxed()
    }

    /// Call `callback` now if `key` is set, then on every later `set` of `key`
    /// until the returned [`Subscription`] is unsubscribed. While `key` is
    /// being delivered, the first call is queued behind the writes already in
    /// flight, so the callback still sees values in write order.
    pub fn on_got<F>(&self, key: &str, callback: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let callback: Callback = Arc::new(callback);
        let mut state = self.state.lock();
        let id = state.next_subscription;
        state.next_subscription += 1;
        let current = state.values.get(key).cloned();

        let subscription = Subscription {
            key: key.to_string(),
            id,
            state: Arc::downgrade(&self.state),
        };

        if state.disposed {
            drop(state);
            if let Some(value) = current {
                callback(&value);
            }
            return subscription;
        }

        let since = state.version;
        state
            .waits
            .entry(key.to_string())
            .or_default()
            .push(Waiter::Every { id, since, callback });
        let drain = match current {
            Some(value) => state.enqueue(key, Notification::Initial { id, value }),
            None => false,
        };
        drop(state);

        if drain {
            self.drain_notifications(key);
        }
        subscription
    }

    /// Number of pending waiters and subscriptions for `key`.
    pub fn waiter_count(&self, key: &str) -> usize {
        self.state.lock().waits.get(key).map_or(0, Vec::len)
    }

    /// Drop every pending waiter and subscription. Pending
    /// [`once_got`](Self::once_got) futures resolve with
    /// [`ConfigError::WaitCancelled`]; stored values stay readable.
    pub fn dispose(&self) {
        let dropped = {
            let mut state = self.state.lock();
            state.disposed = true;
            std::mem::take(&mut state.waits)
        };
        log::debug!("Disposed configuration store, dropping waiters for {} keys", dropped.len());
    }

    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    pub fn keys(&self) -> Vec<String> {
        self.state.lock().values.keys().cloned().collect()
    }

    /// Copy of every stored value.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.state.lock().values.clone()
    }

    /// Deliver queued notifications for `key` until its queue is empty.
    fn drain_notifications(&self, key: &str) {
        loop {
            let (value, deliveries) = {
                let mut state = self.state.lock();
                let next = state.pending.get_mut(key).and_then(VecDeque::pop_front);
                let Some(notification) = next else {
                    state.pending.remove(key);
                    return;
                };
                state.take_deliveries(key, notification)
            };

            log::trace!("Notifying {} waiters for configuration key '{}'", deliveries.len(), key);
            for delivery in deliveries {
                match delivery {
                    // The receiver may have been dropped by an abandoned wait.
                    Delivery::Once(tx) => {
                        let _ = tx.send(value.clone());
                    }
                    Delivery::Every(callback) => callback(&value),
                }
            }
        }
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self {
            strict_validator: None,
            state: Arc::new(Mutex::new(StoreState::default())),
        }
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        let waiter_count: usize = state.waits.values().map(Vec::len).sum();
        f.debug_struct("ConfigStore")
            .field("strict", &self.is_strict())
            .field("keys", &state.values.len())
            .field("waiters", &waiter_count)
            .field("disposed", &state.disposed)
            .finish()
    }
}

/// Handle returned by [`ConfigStore::on_got`]. Dropping it keeps the
/// subscription alive; call [`unsubscribe`](Self::unsubscribe) to end it.
#[derive(Debug, Clone)]
pub struct Subscription {
    key: String,
    id: SubscriptionId,
    state: Weak<Mutex<StoreState>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Remove the subscription. Safe to call any number of times, and after
    /// the store is gone.
    pub fn unsubscribe(&self) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        let mut state = state.lock();
        if let Some(waiters) = state.waits.get_mut(&self.key) {
            waiters.retain(|waiter| !matches!(waiter, Waiter::Every { id, .. } if *id == self.id));
            if waiters.is_empty() {
                state.waits.remove(&self.key);
            }
        }
    }
}
