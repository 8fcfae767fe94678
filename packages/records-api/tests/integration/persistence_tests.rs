//! Snapshot persistence through the HTTP surface.

use std::time::Duration;

use hyper::StatusCode;
use records_core::config::RecordsConfig;
use records_core::error::DbError;
use records_core::persistence::SNAPSHOT_FILE;
use tempfile::tempdir;

use super::fixtures::*;
use super::helpers::{
    create_base_record, create_base_student, create_base_year, create_random_year, guid,
    test_config, TestApp,
};

#[tokio::test]
async fn test_data_survives_restart() {
    let temp_dir = tempdir().unwrap();
    let config = RecordsConfig {
        data_dir: Some(temp_dir.path().to_path_buf()),
        ..test_config()
    };

    let app = TestApp::spawn_with(config.clone()).await;
    let client = app.client();
    let student = create_base_student(&client).await;
    let year = create_base_year(&client).await;
    let record = create_base_record(&client, &student, &year).await;
    let db = app.shutdown().await;
    assert_eq!(db.students().live_count(), 1);
    assert!(temp_dir.path().join(SNAPSHOT_FILE).exists());

    let app = TestApp::spawn_with(config).await;
    let client = app.client();

    let response = client.get(&format!("/student/{}", guid(&student))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, student);

    let response = client
        .get(&format!("/student/{}/record/{}", guid(&student), guid(&record)))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["subject"], RECORD_CREATE_SUBJECT);

    // Passwords are persisted as digests, so login still works
    app.auth_mocker.stop();
    let response = app
        .anonymous_client()
        .post(
            "/auth/login",
            &serde_json::json!({
                "email": STUDENT_CREATE_EMAIL,
                "password": STUDENT_CREATE_PASSWORD,
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_failing_snapshots_do_not_stall_requests() {
    let temp_dir = tempdir().unwrap();
    // A regular file where the data directory should be
    let blocker = temp_dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"").unwrap();
    let config = RecordsConfig {
        data_dir: Some(blocker),
        persistence_interval_ms: 5,
        ..test_config()
    };

    let app = TestApp::spawn_with(config).await;
    let client = app.client();
    for _ in 0..3 {
        let year = create_random_year(&client).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        let response = client.get(&format!("/year/{}", guid(&year))).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let err = app.stop().await.unwrap_err();
    assert!(matches!(err, DbError::IoError(_)));
}
