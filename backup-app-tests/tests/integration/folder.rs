//! Folder capture with the real `tar`

use super::common::tool_available;
use backup_app::managers::backup::BackupManager;
use backup_app::utils::command::run_command_stdout;
use test_utils::{sample_folder, ConfigBuilder, TestContext};

#[test]
fn test_folder_archive_lands_in_local_target() {
    if !tool_available("tar") {
        eprintln!("tar not available, skipping");
        return;
    }

    let ctx = TestContext::new();
    let data = sample_folder(&ctx.create_subdir("data"));
    let backups = ctx.create_subdir("backups");

    let config = ConfigBuilder::folder(&data).local(&backups).build();
    let report = BackupManager::new(config, ctx.work_dir()).run().unwrap();
    assert!(report.is_success());

    let stored = ctx.list_files(&backups).unwrap();
    assert_eq!(stored.len(), 1);
    assert!(ctx.list_files(&ctx.work_dir()).unwrap().is_empty());

    let archive = backups.join(&stored[0]);
    let listing =
        run_command_stdout("tar", &["-tzf", &archive.to_string_lossy()], None).unwrap();
    assert!(listing.contains("notes.txt"));
    assert!(listing.contains("nested/data.csv"));
}

#[test]
fn test_missing_folder_fails_run() {
    if !tool_available("tar") {
        eprintln!("tar not available, skipping");
        return;
    }

    let ctx = TestContext::new();
    let backups = ctx.create_subdir("backups");
    let config = ConfigBuilder::folder(ctx.temp_dir().join("gone"))
        .local(&backups)
        .build();

    let result = BackupManager::new(config, ctx.work_dir()).run();

    assert!(result.is_err());
    assert!(ctx.list_files(&backups).unwrap().is_empty());
    // The partial archive tar left behind is removed
    assert!(ctx.list_files(&ctx.work_dir()).unwrap().is_empty());
}
