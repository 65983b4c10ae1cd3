use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde_json::json;

use crate::config::ConfigError;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::instance::PluginInstance;
use crate::plugin_system::status::PluginStatus;

use super::support::{counter_registry, CounterConfig, CounterFactory, COUNTER_TYPE};

fn counter(config: CounterConfig) -> Arc<PluginInstance<CounterFactory>> {
    let registry = counter_registry();
    registry
        .create_instance(COUNTER_TYPE, "c1", Some(serde_json::to_value(config).unwrap()), None)
        .unwrap();
    registry.get_instance_as::<CounterFactory>("c1").unwrap()
}

#[tokio::test]
async fn test_update_config_applies_and_reloads() {
    let instance = counter(CounterConfig::new("a", 1));
    instance.update_config(CounterConfig::new("b", 2)).await.unwrap();

    assert_eq!(instance.config().await, CounterConfig::new("b", 2));
    assert_eq!(instance.plugin().applied(), CounterConfig::new("b", 2));
    assert_eq!(instance.plugin().reloads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_validation_failure_leaves_config_untouched() {
    let instance = counter(CounterConfig::new("a", 1));
    let before = instance.config().await;

    let result = instance.update_config(CounterConfig::new("", 5)).await;
    assert!(matches!(
        result,
        Err(PluginSystemError::InvalidConfig { source: ConfigError::Invalid { .. }, .. })
    ));
    assert_eq!(instance.config().await, before);
    assert_eq!(instance.plugin().reloads.load(Ordering::SeqCst), 0, "reload must not run");
}

#[tokio::test]
async fn test_reload_failure_rolls_back_config_of_record() {
    let instance = counter(CounterConfig::new("a", 1));
    let before = instance.config().await;

    let mut bad = CounterConfig::new("b", 2);
    bad.fail_reload = true;
    let result = instance.update_config(bad).await;

    match result {
        Err(PluginSystemError::ReloadFailed { plugin_id, source }) => {
            assert_eq!(plugin_id, "c1");
            assert!(matches!(*source, PluginSystemError::Lifecycle { ref operation, .. } if operation == "reload"));
        }
        other => panic!("expected ReloadFailed, got {other:?}"),
    }
    assert_eq!(instance.config().await, before);
    assert_eq!(instance.status(), PluginStatus::Error);
}

#[tokio::test]
async fn test_erased_update_config_value() {
    let registry = counter_registry();
    let erased = registry.create_instance(COUNTER_TYPE, "c1", None, None).unwrap();

    erased
        .update_config_value(json!({"label": "erased", "step": 4}))
        .await
        .unwrap();
    assert_eq!(erased.config_value().await.unwrap()["label"], "erased");

    let mismatch = erased.update_config_value(json!({"step": "four"})).await;
    assert!(matches!(
        mismatch,
        Err(PluginSystemError::InvalidConfig { source: ConfigError::TypeMismatch { .. }, .. })
    ));
    assert_eq!(erased.config_value().await.unwrap()["step"], 4);
}

#[tokio::test]
async fn test_readers_never_observe_a_rolled_back_value() {
    let instance = counter(CounterConfig::new("stable", 1));

    let writer = {
        let instance = instance.clone();
        tokio::spawn(async move {
            for _ in 0..50 {
                let mut bad = CounterConfig::new("transient", 9);
                bad.fail_reload = true;
                let _ = instance.update_config(bad).await;
            }
        })
    };
    for _ in 0..50 {
        assert_eq!(instance.config().await.label, "stable");
        tokio::task::yield_now().await;
    }
    writer.await.unwrap();
    assert_eq!(instance.config().await.label, "stable");
}
