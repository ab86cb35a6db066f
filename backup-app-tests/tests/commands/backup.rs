//! Tests for execution mode (`--backup`)
//!
//! Captures go through MockExecutor, which writes a stand-in file wherever
//! pg_dump or tar would have written the real one.

use backup_app::destinations::{build_destination, DispatchError};
use backup_app::managers::backup::{BackupError, BackupManager};
use test_utils::{
    ConfigBuilder, Integration, MockDestination, MockExecutor, MockResponse, TestContext,
};

#[test]
fn test_folder_to_local_scenario() {
    let ctx = TestContext::new();
    let backups = ctx.create_subdir("backups");
    let config = ConfigBuilder::folder("/data").local(&backups).build();

    let executor = MockExecutor::new().touching_outputs();
    let destination = build_destination(&config.storage);
    let manager =
        BackupManager::with_components(config, ctx.work_dir(), Box::new(executor.clone()), destination);

    let report = manager.run().unwrap();
    assert!(report.is_success());

    let stored = ctx.list_files(&backups).unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].starts_with("folder_backup_"));
    assert!(stored[0].ends_with(".tar.gz"));
    assert_eq!(report.delivered, stored);
    assert!(ctx.list_files(&ctx.work_dir()).unwrap().is_empty());

    let tar = executor.get_calls().into_iter().find(|c| c.program == "tar").unwrap();
    assert_eq!(tar.args[0], "-czf");
    assert_eq!(tar.args[2], "/data");
}

#[test]
fn test_artifacts_match_configured_sources() {
    let ctx = TestContext::new();
    let cases = vec![
        (ConfigBuilder::postgres("postgres://db/app").build(), vec![Integration::Postgresql]),
        (ConfigBuilder::folder("/data").build(), vec![Integration::Folder]),
        (
            ConfigBuilder::both("postgres://db/app", "/data").build(),
            vec![Integration::Postgresql, Integration::Folder],
        ),
    ];

    for (config, expected) in cases {
        let destination = MockDestination::new();
        let manager = BackupManager::with_components(
            config,
            ctx.work_dir(),
            Box::new(MockExecutor::new().touching_outputs()),
            Box::new(destination.clone()),
        );
        manager.run().unwrap();

        let deliveries = destination.deliveries();
        let sources: Vec<_> = deliveries.iter().map(|d| d.source).collect();
        assert_eq!(sources, expected);
        // Each artifact existed when handed over
        assert!(deliveries.iter().all(|d| d.file_present));
    }
}

#[test]
fn test_pg_dump_arguments() {
    let ctx = TestContext::new();
    let executor = MockExecutor::new().touching_outputs();
    let manager = BackupManager::with_components(
        ConfigBuilder::postgres("postgres://user:pass@db:5432/app").build(),
        ctx.work_dir(),
        Box::new(executor.clone()),
        Box::new(MockDestination::new()),
    );
    manager.run().unwrap();

    let call = executor.get_calls().remove(0);
    assert_eq!(call.program, "pg_dump");
    assert_eq!(call.args[0], "postgres://user:pass@db:5432/app");
    assert_eq!(call.args[1], "-f");
    assert!(call.args[2].starts_with(&ctx.work_dir().display().to_string()));
    assert!(call.args[2].ends_with(".sql"));
}

#[test]
fn test_first_capture_failure_prevents_dispatch() {
    let ctx = TestContext::new();
    let executor = MockExecutor::new().touching_outputs().expect(
        "pg_dump",
        MockResponse::Failure {
            stderr: "pg_dump: error: connection to server failed".to_string(),
            exit_code: 1,
        },
    );
    let destination = MockDestination::new();

    let manager = BackupManager::with_components(
        ConfigBuilder::both("postgres://db/app", "/data").build(),
        ctx.work_dir(),
        Box::new(executor.clone()),
        Box::new(destination.clone()),
    );

    match manager.run() {
        Err(BackupError::Capture(e)) => {
            assert_eq!(e.integration, Integration::Postgresql);
            assert!(e.to_string().contains("connection to server failed"));
        }
        other => panic!("Expected capture error, got {:?}", other.map(|r| r.delivered)),
    }
    assert!(!executor.was_called("tar"));
    assert_eq!(destination.delivery_count(), 0);
}

#[test]
fn test_missing_tool_is_reported() {
    let ctx = TestContext::new();
    let executor = MockExecutor::new().expect("tar", MockResponse::NotFound);

    let manager = BackupManager::with_components(
        ConfigBuilder::folder("/data").build(),
        ctx.work_dir(),
        Box::new(executor),
        Box::new(MockDestination::new()),
    );

    let err = manager.run().unwrap_err();
    assert!(err.to_string().contains("tar"));
}

#[test]
fn test_dispatch_failure_does_not_stop_next_dispatch() {
    let ctx = TestContext::new();
    let destination = MockDestination::new().failing_for(Integration::Postgresql);

    let manager = BackupManager::with_components(
        ConfigBuilder::both("postgres://db/app", "/data").build(),
        ctx.work_dir(),
        Box::new(MockExecutor::new().touching_outputs()),
        Box::new(destination.clone()),
    );
    let report = manager.run().unwrap();

    assert_eq!(destination.delivery_count(), 2);
    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].file_name.starts_with("postgres_backup_"));
    assert!(matches!(report.failures[0].error, DispatchError::Transport(_)));
    assert_eq!(report.delivered.len(), 1);
    assert!(report.delivered[0].starts_with("folder_backup_"));

    // Failed artifacts are cleaned up as well
    assert!(ctx.list_files(&ctx.work_dir()).unwrap().is_empty());
}

#[test]
fn test_local_target_missing() {
    let ctx = TestContext::new();
    let config = ConfigBuilder::folder("/data")
        .local(ctx.temp_dir().join("not-mounted"))
        .build();
    let destination = build_destination(&config.storage);

    let manager = BackupManager::with_components(
        config,
        ctx.work_dir(),
        Box::new(MockExecutor::new().touching_outputs()),
        destination,
    );
    let report = manager.run().unwrap();

    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0].error, DispatchError::NotFound(_)));
    assert!(ctx.list_files(&ctx.work_dir()).unwrap().is_empty());
}
