//! Google Drive destination against mock OAuth and upload endpoints

use backup_app::destinations::{Destination, DispatchError, GoogleDriveDestination};
use mockito::{Matcher, Server};
use test_utils::{write_service_account, Artifact, Integration, TestContext};

fn artifact(ctx: &TestContext) -> Artifact {
    let path = ctx.create_file("work/folder_backup_2025-01-01_00-00-00.tar.gz", "archive bytes");
    Artifact::new(Integration::Folder, path)
}

#[test]
fn test_resumable_upload_into_folder() {
    let ctx = TestContext::new();
    let mut server = Server::new();
    let credentials = write_service_account(ctx.temp_dir(), &format!("{}/token", server.url()));

    let token = server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "grant_type".to_string(),
                "urn:ietf:params:oauth:grant-type:jwt-bearer".to_string(),
            ),
            Matcher::Regex("assertion=".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"ya29.test","token_type":"Bearer","expires_in":3599}"#)
        .create();
    let session = server
        .mock("POST", Matcher::Regex(r"^/upload".to_string()))
        .match_query(Matcher::UrlEncoded("uploadType".to_string(), "resumable".to_string()))
        .match_header("authorization", "Bearer ya29.test")
        .match_header("x-upload-content-length", "13")
        .match_body(Matcher::Json(serde_json::json!({
            "name": "folder_backup_2025-01-01_00-00-00.tar.gz",
            "parents": ["drive-folder-id"],
        })))
        .with_status(200)
        .with_header("location", &format!("{}/session/abc", server.url()))
        .create();
    let upload = server
        .mock("PUT", "/session/abc")
        .match_header("authorization", "Bearer ya29.test")
        .match_body("archive bytes")
        .with_status(200)
        .with_body(r#"{"id":"file-id","name":"folder_backup_2025-01-01_00-00-00.tar.gz"}"#)
        .create();

    let destination = GoogleDriveDestination::new(credentials, "drive-folder-id".to_string())
        .with_upload_base(format!("{}/upload", server.url()));
    destination.deliver(&artifact(&ctx)).unwrap();

    token.assert();
    session.assert();
    upload.assert();
}

#[test]
fn test_rejected_assertion() {
    let ctx = TestContext::new();
    let mut server = Server::new();
    let credentials = write_service_account(ctx.temp_dir(), &format!("{}/token", server.url()));

    server
        .mock("POST", "/token")
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant","error_description":"Invalid JWT Signature."}"#)
        .create();

    let destination = GoogleDriveDestination::new(credentials, "drive-folder-id".to_string())
        .with_upload_base(format!("{}/upload", server.url()));
    assert!(matches!(
        destination.deliver(&artifact(&ctx)),
        Err(DispatchError::Authentication(_))
    ));
}

#[test]
fn test_unknown_folder() {
    let ctx = TestContext::new();
    let mut server = Server::new();
    let credentials = write_service_account(ctx.temp_dir(), &format!("{}/token", server.url()));

    server
        .mock("POST", "/token")
        .with_status(200)
        .with_body(r#"{"access_token":"ya29.test","expires_in":3599}"#)
        .create();
    server
        .mock("POST", Matcher::Regex(r"^/upload".to_string()))
        .with_status(404)
        .with_body(r#"{"error":{"code":404,"message":"File not found: missing-folder."}}"#)
        .create();

    let destination = GoogleDriveDestination::new(credentials, "missing-folder".to_string())
        .with_upload_base(format!("{}/upload", server.url()));
    assert!(matches!(
        destination.deliver(&artifact(&ctx)),
        Err(DispatchError::NotFound(_))
    ));
}

#[test]
fn test_missing_credentials_file() {
    let ctx = TestContext::new();
    let destination = GoogleDriveDestination::new(
        ctx.temp_dir().join("does-not-exist.json"),
        "drive-folder-id".to_string(),
    );

    assert!(matches!(
        destination.deliver(&artifact(&ctx)),
        Err(DispatchError::Credentials(_))
    ));
}
