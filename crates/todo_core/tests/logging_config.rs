use todo_core::{default_log_level, init_logging_from_config, logging_status, CoreConfig};

// Logging is process-global, so this binary holds a single init test.
#[test]
fn init_from_config_logs_under_data_dir_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let config = CoreConfig::new(dir.path());
    assert!(config.log_dir.is_none());

    init_logging_from_config(&config).expect("default config should start logging");
    init_logging_from_config(&config).expect("same config should be idempotent");

    let (level, log_dir) = logging_status().expect("logging should be active");
    assert_eq!(level, default_log_level());
    assert_eq!(log_dir, dir.path().join("logs"));
    assert!(log_dir.is_dir());

    let mut moved = config.clone();
    moved.log_dir = Some(dir.path().join("elsewhere"));
    let err = init_logging_from_config(&moved).unwrap_err();
    assert!(err.contains("refusing to switch"));
}
