use std::sync::{Arc, Mutex};

use futures::FutureExt;
use serde_json::{json, Map, Value};

use crate::config::error::ConfigError;
use crate::config::store::{ConfigStore, StoreOptions, Validation};

fn map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("Expected an object, got {:?}", other),
    }
}

/// Records every value a subscriber sees.
fn recorder() -> (Arc<Mutex<Vec<Value>>>, impl Fn(&Value) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    (seen, move |value: &Value| seen_clone.lock().unwrap().push(value.clone()))
}

#[test]
fn test_new_store_is_seeded_from_snapshot() {
    let store = ConfigStore::new(map(json!({ "locale": "en-US", "debug": false })), StoreOptions::default())
        .expect("Store creation should succeed");

    assert!(store.has("locale"));
    assert!(store.has("debug"));
    assert!(!store.has("theme"));
    assert_eq!(store.get("locale"), Some(json!("en-US")));
    assert!(!store.is_strict());
}

#[test]
fn test_from_value_requires_mapping() {
    let result = ConfigStore::from_value(json!([1, 2]), StoreOptions::default());
    assert!(matches!(result, Err(ConfigError::NotAMapping { found: "array" })));

    let result = ConfigStore::from_value(json!(null), StoreOptions::default());
    assert!(matches!(result, Err(ConfigError::NotAMapping { found: "null" })));

    assert!(ConfigStore::from_value(json!({}), StoreOptions::default()).is_ok());
}

#[test]
fn test_strict_store_requires_validator() {
    let options = StoreOptions { strict: true, validator: None };
    let result = ConfigStore::new(Map::new(), options);
    assert!(matches!(result, Err(ConfigError::MissingValidator)));
}

#[test]
fn test_null_counts_as_stored_value() {
    let store = ConfigStore::default();
    assert!(!store.has("theme"));
    assert!(store.set("theme", Value::Null));
    assert!(store.has("theme"));
    assert_eq!(store.get("theme"), Some(Value::Null));
}

#[test]
fn test_get_with_nested_path_and_default() {
    let store = ConfigStore::default();
    store.set("layout", json!({ "columns": [{ "width": 120 }, { "width": 240 }] }));
    store.set("a.b", json!("literal key"));

    assert_eq!(store.get("layout.columns[1].width"), Some(json!(240)));
    assert_eq!(store.get("layout.columns[9].width"), None);
    assert_eq!(store.get_or("layout.rows", json!(3)), json!(3));
    // Exact key match wins over path splitting.
    assert_eq!(store.get("a.b"), Some(json!("literal key")));
    assert_eq!(store.get_as::<u32>("layout.columns[0].width"), Some(120));
    assert_eq!(store.get_as::<String>("layout.columns[0].width"), None);
}

#[test]
fn test_strict_mode_rejects_without_changing_store() {
    let store = ConfigStore::new(
        Map::new(),
        StoreOptions::strict(|key: &str, _value: &Value| key != "x"),
    )
    .expect("Strict store creation should succeed");
    assert!(store.is_strict());

    assert!(!store.set("x", json!(1)));
    assert!(!store.has("x"));
    assert!(store.snapshot().is_empty());

    assert!(store.set("y", json!(1)));
    assert!(store.has("y"));
}

#[test]
fn test_strict_mode_rejection_with_reason_does_not_notify() {
    let store = ConfigStore::new(
        Map::new(),
        StoreOptions::strict(|_key: &str, value: &Value| {
            if value.is_number() {
                Validation::Accept
            } else {
                Validation::RejectWith("expected a number".to_string())
            }
        }),
    )
    .unwrap();
    let (seen, callback) = recorder();
    let _subscription = store.on_got("pageSize", callback);

    assert!(!store.set("pageSize", json!("twenty")));
    assert!(seen.lock().unwrap().is_empty(), "Rejected writes must not notify");

    assert!(store.set("pageSize", json!(20)));
    assert_eq!(*seen.lock().unwrap(), vec![json!(20)]);
}

#[test]
fn test_strict_validation_applies_to_initial_snapshot() {
    let store = ConfigStore::new(
        map(json!({ "allowed": 1, "blocked": 2 })),
        StoreOptions::strict(|key: &str, _value: &Value| key != "blocked"),
    )
    .unwrap();
    assert!(store.has("allowed"));
    assert!(!store.has("blocked"));
}

#[test]
fn test_non_strict_store_ignores_validator() {
    let options = StoreOptions {
        strict: false,
        validator: Some(Arc::new(|_: &str, _: &Value| Validation::Reject)),
    };
    let store = ConfigStore::new(Map::new(), options).unwrap();
    assert!(store.set("anything", json!(true)));
}

#[test]
fn test_set_config_applies_keys_independently() {
    let store = ConfigStore::new(
        Map::new(),
        StoreOptions::strict(|key: &str, _value: &Value| !key.starts_with('_')),
    )
    .unwrap();

    let rejected = store.set_config(map(json!({ "title": "Orders", "_secret": 1, "pageSize": 20 })));
    assert_eq!(rejected, vec!["_secret".to_string()]);
    assert!(store.has("title"));
    assert!(store.has("pageSize"));
    assert!(!store.has("_secret"));

    let result = store.set_config_value(json!("not a mapping"));
    assert!(matches!(result, Err(ConfigError::NotAMapping { found: "string" })));
}

#[tokio::test]
async fn test_once_got_pending_until_set() {
    let store = ConfigStore::default();
    assert!(!store.has("theme"));

    let mut wait = store.once_got("theme");
    assert!((&mut wait).now_or_never().is_none(), "Wait should stay pending before set");

    store.set("theme", json!("dark"));
    store.set("theme", json!("light"));

    // Resolves with the first value set after registration.
    assert_eq!(wait.await.unwrap(), json!("dark"));
    assert_eq!(store.waiter_count("theme"), 0, "One-shot waiters are removed after firing");
}

#[test]
fn test_once_got_resolves_immediately_when_set() {
    let store = ConfigStore::default();
    store.set("theme", json!("dark"));

    let value = store.once_got("theme").now_or_never();
    assert!(matches!(value, Some(Ok(ref v)) if *v == json!("dark")));
    assert_eq!(store.waiter_count("theme"), 0);
}

#[test]
fn test_on_got_fires_on_every_set_in_order() {
    let store = ConfigStore::default();
    let (seen, callback) = recorder();
    let _subscription = store.on_got("k", callback);

    store.set("k", json!("v1"));
    store.set("k", json!("v2"));

    assert_eq!(*seen.lock().unwrap(), vec![json!("v1"), json!("v2")]);
}

#[test]
fn test_on_got_invokes_immediately_when_value_exists() {
    let store = ConfigStore::default();
    store.set("k", json!(1));

    let (seen, callback) = recorder();
    let _subscription = store.on_got("k", callback);
    assert_eq!(*seen.lock().unwrap(), vec![json!(1)]);

    store.set("k", json!(2));
    assert_eq!(*seen.lock().unwrap(), vec![json!(1), json!(2)]);
}

#[test]
fn test_unsubscribe_is_idempotent() {
    let store = ConfigStore::default();
    let (seen, callback) = recorder();
    let subscription = store.on_got("k", callback);
    assert_eq!(subscription.key(), "k");

    store.set("k", json!(1));
    subscription.unsubscribe();
    subscription.unsubscribe();
    store.set("k", json!(2));

    assert_eq!(*seen.lock().unwrap(), vec![json!(1)]);
    assert_eq!(store.waiter_count("k"), 0);

    drop(store);
    // Store is gone; still safe.
    subscription.unsubscribe();
}

#[test]
fn test_dropping_subscription_keeps_it_alive() {
    let store = ConfigStore::default();
    let (seen, callback) = recorder();
    drop(store.on_got("k", callback));

    store.set("k", json!(1));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn test_waiters_fire_oldest_first() {
    let store = ConfigStore::default();
    let order = Arc::new(Mutex::new(Vec::new()));

    let mut subscriptions = Vec::new();
    for label in ["first", "second", "third"] {
        let order = Arc::clone(&order);
        subscriptions.push(store.on_got("k", move |_| order.lock().unwrap().push(label)));
    }
    store.set("k", json!(true));

    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    assert_eq!(subscriptions.len(), 3);
}

#[test]
fn test_callbacks_may_reenter_the_store() {
    let store = Arc::new(ConfigStore::default());
    let store_clone = Arc::clone(&store);
    let _subscription = store.on_got("source", move |value| {
        store_clone.set("mirror", value.clone());
    });

    store.set("source", json!(42));
    assert_eq!(store.get("mirror"), Some(json!(42)));
}

#[test]
fn test_subscriber_added_during_notification_fires_next_time() {
    let store = Arc::new(ConfigStore::default());
    let late_seen = Arc::new(Mutex::new(Vec::new()));

    let store_clone = Arc::clone(&store);
    let late_clone = Arc::clone(&late_seen);
    let registered = Arc::new(Mutex::new(false));
    let _outer = store.on_got("k", move |_| {
        let mut registered = registered.lock().unwrap();
        if !*registered {
            *registered = true;
            let late_clone = Arc::clone(&late_clone);
            // Value already exists, so this fires immediately once.
            let _inner = store_clone.on_got("k", move |v| late_clone.lock().unwrap().push(v.clone()));
        }
    });

    store.set("k", json!(1));
    assert_eq!(*late_seen.lock().unwrap(), vec![json!(1)]);

    store.set("k", json!(2));
    assert_eq!(*late_seen.lock().unwrap(), vec![json!(1), json!(2)]);
}

#[tokio::test]
async fn test_dispose_cancels_pending_waits() {
    let store = ConfigStore::default();
    let (seen, callback) = recorder();
    let _subscription = store.on_got("k", callback);
    let wait = store.once_got("k");

    store.dispose();
    assert!(store.is_disposed());
    assert!(matches!(wait.await, Err(ConfigError::WaitCancelled { ref key }) if key == "k"));

    // Later waits fail fast; values remain readable and writable.
    assert!(matches!(store.once_got("other").await, Err(ConfigError::WaitCancelled { .. })));
    store.set("k", json!(1));
    assert_eq!(store.get("k"), Some(json!(1)));
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(store.once_got("k").await.unwrap(), json!(1));
}

#[test]
fn test_validation_from_bool() {
    assert_eq!(Validation::from(true), Validation::Accept);
    assert_eq!(Validation::from(false), Validation::Reject);
    assert!(Validation::Accept.is_accepted());
    assert!(!Validation::RejectWith("no".into()).is_accepted());
}

#[test]
fn test_nested_set_is_delivered_after_current_round() {
    let store = Arc::new(ConfigStore::default());

    let store_clone = Arc::clone(&store);
    let (first_seen, first_record) = recorder();
    let _first = store.on_got("k", move |value| {
        first_record(value);
        if *value == json!(1) {
            store_clone.set("k", json!(2));
        }
    });
    let (second_seen, second_record) = recorder();
    let _second = store.on_got("k", second_record);

    store.set("k", json!(1));

    assert_eq!(store.get("k"), Some(json!(2)));
    assert_eq!(*first_seen.lock().unwrap(), vec![json!(1), json!(2)]);
    // Later subscribers still see writes in call order, ending on the stored value.
    assert_eq!(*second_seen.lock().unwrap(), vec![json!(1), json!(2)]);
}

#[test]
fn test_subscriber_added_while_write_queued_sees_it_once() {
    let store = Arc::new(ConfigStore::default());
    let (late_seen, late_record) = recorder();
    let late_record = Arc::new(late_record);

    let store_clone = Arc::clone(&store);
    let late_subscription = Arc::new(Mutex::new(None));
    let late_slot = Arc::clone(&late_subscription);
    let _outer = store.on_got("k", move |value| {
        if *value == json!(1) {
            store_clone.set("k", json!(2));
            let late_record = Arc::clone(&late_record);
            let subscription = store_clone.on_got("k", move |v| late_record(v));
            *late_slot.lock().unwrap() = Some(subscription);
        }
    });

    store.set("k", json!(1));

    // Registered after the write of 2 was applied: one initial call, no repeat.
    assert_eq!(*late_seen.lock().unwrap(), vec![json!(2)]);
    assert!(late_subscription.lock().unwrap().is_some());
}

#[test]
fn test_concurrent_sets_deliver_each_value_once_in_write_order() {
    const THREADS: u64 = 4;
    const WRITES: u64 = 50;

    let store = Arc::new(ConfigStore::default());
    let (seen, callback) = recorder();
    let _subscription = store.on_got("counter", callback);

    std::thread::scope(|scope| {
        for thread in 0..THREADS {
            let store = Arc::clone(&store);
            scope.spawn(move || {
                for n in 0..WRITES {
                    store.set("counter", json!(thread * WRITES + n));
                }
            });
        }
    });

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len() as u64, THREADS * WRITES);
    let mut values: Vec<u64> = seen.iter().filter_map(Value::as_u64).collect();
    // Last delivery matches the stored value.
    assert_eq!(seen.last().cloned(), store.get("counter"));
    // Per writer, values arrive in the order that writer set them.
    for thread in 0..THREADS {
        let range = thread * WRITES..(thread + 1) * WRITES;
        let mine: Vec<u64> = values.iter().copied().filter(|v| range.contains(v)).collect();
        assert_eq!(mine, range.collect::<Vec<_>>());
    }
    values.sort_unstable();
    values.dedup();
    assert_eq!(values.len() as u64, THREADS * WRITES, "Every write is delivered exactly once");
}
