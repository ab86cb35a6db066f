//! Tests for loading and saving the configuration file

use backup_app::config::{load_config, save_config, ConfigError};
use test_utils::{legacy_config_json, ConfigBuilder, Integration, StorageSettings, TestContext};

#[test]
fn test_reads_existing_install_format() {
    let ctx = TestContext::new();
    let path = ctx.create_file("config.json", legacy_config_json());

    let config = load_config(&path).unwrap();

    assert_eq!(config.integrations, vec![Integration::Postgresql, Integration::Folder]);
    assert_eq!(config.frequency, "0 0 * * 0");
    match config.storage {
        StorageSettings::S3 {
            s3_bucket,
            s3_region,
            s3_endpoint,
            ..
        } => {
            assert_eq!(s3_bucket, "nightly-backups");
            assert_eq!(s3_region, "eu-central-1");
            assert_eq!(s3_endpoint, None);
        }
        other => panic!("Expected S3 storage, got {:?}", other),
    }
}

#[test]
fn test_round_trip_every_storage_kind() {
    let ctx = TestContext::new();
    let configs = vec![
        ConfigBuilder::folder("/data").local("/backups").build(),
        ConfigBuilder::postgres("postgres://db/app").telegram("1:abc", -100).build(),
        ConfigBuilder::both("postgres://db/app", "/data").s3("bucket", "us-east-1").build(),
        ConfigBuilder::folder("~/photos")
            .google_drive("~/sa.json", "1AbCdEf")
            .with_frequency("*/5 * * * *")
            .build(),
    ];

    for config in configs {
        let path = ctx.write_config(&config);
        assert_eq!(load_config(&path).unwrap(), config);
    }
}

#[test]
fn test_reconfiguration_replaces_previous_file() {
    let ctx = TestContext::new();
    let path = ctx.config_path();

    save_config(&path, &ConfigBuilder::both("postgres://db/app", "/data").build()).unwrap();
    save_config(&path, &ConfigBuilder::folder("/data").build()).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(!contents.contains("postgres_url"));
    assert_eq!(load_config(&path).unwrap().integrations, vec![Integration::Folder]);
}

#[test]
fn test_missing_file() {
    let ctx = TestContext::new();
    assert!(matches!(
        load_config(ctx.config_path()),
        Err(ConfigError::NotFound(_))
    ));
}

#[test]
fn test_unknown_storage_kind() {
    let ctx = TestContext::new();
    let path = ctx.create_file(
        "config.json",
        r#"{"integrations": ["folder"], "folder_path": "/data", "frequency": "0 0 * * *", "storage": "ftp"}"#,
    );
    assert!(matches!(load_config(&path), Err(ConfigError::Decode(_))));
}

#[test]
fn test_selected_source_without_parameter() {
    let ctx = TestContext::new();
    let path = ctx.create_file(
        "config.json",
        r#"{"integrations": ["postgresql"], "frequency": "0 0 * * *", "storage": "local", "local_path": "/b"}"#,
    );
    assert!(matches!(load_config(&path), Err(ConfigError::Invalid(_))));
}
