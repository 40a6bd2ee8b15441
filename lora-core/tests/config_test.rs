//! Config loading and error taxonomy.

use lora_core::config::{LoraConfig, TemporalConfig};
use lora_core::errors::{codes, LoraError, StorageError, TemporalError};
use lora_core::traits::actor_resolver_from_config;
use uuid::Uuid;

#[test]
fn empty_toml_gives_defaults() {
    let config = LoraConfig::from_toml("").unwrap();
    assert_eq!(config.storage.read_pool_size, 4);
    assert!(config.storage.db_path.is_none());
    assert!(config.temporal.system_actor.is_none());
    assert_eq!(config.observability.log_filter, "info");
}

#[test]
fn partial_sections_fill_missing_fields() {
    let toml = r#"
        [storage]
        db_path = "/var/lib/lora/lora.db"
        write_timeout_ms = 250

        [temporal]
        system_actor = "42c432e8-9c4a-11e6-9f62-873cf34a735f"
    "#;
    let config = LoraConfig::from_toml(toml).unwrap();
    assert_eq!(config.storage.write_timeout_ms, 250);
    assert_eq!(config.storage.busy_timeout_ms, 5_000);
    assert_eq!(
        config.temporal.system_actor,
        Some(Uuid::parse_str("42c432e8-9c4a-11e6-9f62-873cf34a735f").unwrap())
    );
    assert_eq!(config.temporal.max_changes_per_mutation, 1_000);
}

#[test]
fn malformed_toml_is_config_error() {
    let err = LoraConfig::from_toml("[storage\nread_pool_size = ").unwrap_err();
    assert_eq!(err.code(), codes::CONFIG_ERROR);
}

#[test]
fn system_actor_fallback_only_when_configured() {
    let strict = actor_resolver_from_config(&TemporalConfig::default());
    assert!(strict.resolve(None).is_err());

    let system = Uuid::new_v4();
    let config = TemporalConfig {
        system_actor: Some(system),
        ..TemporalConfig::default()
    };
    let fallback = actor_resolver_from_config(&config);
    assert_eq!(fallback.resolve(None).unwrap(), system);

    let caller = Uuid::new_v4();
    assert_eq!(fallback.resolve(Some(caller)).unwrap(), caller);
}

#[test]
fn retryable_errors() {
    let uuid = Uuid::new_v4();
    assert!(LoraError::ConcurrentModification { uuid, registration_id: 1 }.is_retryable());
    assert!(LoraError::StorageTimeout { operation: "update".into() }.is_retryable());
    assert!(!LoraError::Conflict { token: uuid }.is_retryable());
    assert!(!LoraError::ValidationError("bad".into()).is_retryable());
    assert!(!LoraError::from(StorageError::SqliteError { message: "io".into() }).is_retryable());
}

#[test]
fn temporal_errors_report_as_validation() {
    let err = LoraError::from(TemporalError::InvalidInterval {
        from: "infinity".into(),
        to: "-infinity".into(),
    });
    assert_eq!(err.code(), codes::VALIDATION_ERROR);
}

#[test]
fn tracing_installs_once() {
    let config = lora_core::config::ObservabilityConfig::default();
    let first = lora_core::observability::init_tracing(&config);
    let second = lora_core::observability::init_tracing(&config);
    assert!(first);
    assert!(!second);
}
