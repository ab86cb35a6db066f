//! Tests for crontab installation

use backup_app::utils::cron::{build_cron_entry, install_backup_job, ScheduleError};
use std::path::Path;
use test_utils::{MockExecutor, MockResponse};

#[test]
fn test_install_replaces_whole_table() {
    let executor = MockExecutor::new().expect(
        "crontab",
        MockResponse::Success {
            stdout: "0 0 * * * /opt/backup-app --backup\n".to_string(),
            stderr: String::new(),
        },
    );

    let entry = install_backup_job(&executor, "0 0 * * *", Path::new("/opt/backup-app")).unwrap();

    assert_eq!(entry, "0 0 * * * /opt/backup-app --backup");
    assert_eq!(
        executor.last_input("crontab").as_deref(),
        Some("0 0 * * * /opt/backup-app --backup\n")
    );
    // One write, one read-back
    assert_eq!(executor.call_count("crontab"), 2);
}

#[test]
fn test_install_fails_without_crontab_binary() {
    let executor = MockExecutor::new().expect("crontab", MockResponse::NotFound);

    let result = install_backup_job(&executor, "0 0 * * *", Path::new("/opt/backup-app"));
    assert!(matches!(result, Err(ScheduleError::Crontab(_))));
}

#[test]
fn test_entry_uses_absolute_executable() {
    assert_eq!(
        build_cron_entry("*/5 * * * *", Path::new("/usr/local/bin/backup-app")),
        "*/5 * * * * /usr/local/bin/backup-app --backup"
    );
}
