// Integration tests for corral::config

use corral::config::*;
use corral::{PoolError, WorkerPool};

#[test]
fn test_pool_config_defaults() {
    let config = PoolConfig::default();

    assert_eq!(config.workers, num_cpus::get());
    assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    assert_eq!(config.queue_capacity, 20);
    assert_eq!(config.thread_name_prefix, "corral-worker-");
    assert!(config.log_statistics_on_shutdown);
    assert!(config.validate().is_ok());
}

#[test]
fn test_with_capacity_keeps_other_defaults() {
    let config = PoolConfig::with_capacity(3);

    assert_eq!(config.queue_capacity, 3);
    assert_eq!(config.thread_name_prefix, DEFAULT_THREAD_NAME_PREFIX);
}

#[test]
fn test_zero_capacity_is_rejected() {
    let config = PoolConfig::with_capacity(0);

    assert_eq!(
        config.validate(),
        Err(PoolError::ConfigError("queue capacity must be positive".to_string()))
    );
    assert!(WorkerPool::new(config).is_err());
}

#[test]
fn test_empty_prefix_is_rejected() {
    let config = PoolConfig {
        thread_name_prefix: String::new(),
        ..PoolConfig::default()
    };

    let error = WorkerPool::new(config).unwrap_err();
    assert_eq!(
        error.to_string(),
        "Configuration error: thread name prefix must not be empty"
    );
}

#[test]
fn test_config_debug_format() {
    let config = PoolConfig::default();
    assert!(format!("{:?}", config).contains("queue_capacity"));
}
