//! `/student/{guid}/record` endpoint tests.

use hyper::StatusCode;
use serde_json::json;

use super::fixtures::*;
use super::helpers::{
    check_system, create_base_record, create_base_student, create_base_year,
    create_random_student, create_random_year, guid, TestApp,
};

#[tokio::test]
async fn test_post_record() {
    let app = TestApp::spawn().await;
    let client = app.client();
    let student = create_base_student(&client).await;
    let year = create_base_year(&client).await;

    let record = create_base_record(&client, &student, &year).await;
    assert_eq!(record["student_guid"], student["guid"]);
    assert_eq!(record["year_guid"], year["guid"]);
    assert_eq!(record["subject"], RECORD_CREATE_SUBJECT);
    assert_eq!(record["mark"], RECORD_CREATE_MARK);
    assert_eq!(record["semester"], RECORD_CREATE_SEMESTER);
    check_system(&record);
}

#[tokio::test]
async fn test_post_record_requires_year() {
    let app = TestApp::spawn().await;
    let client = app.client();
    let student = create_base_student(&client).await;
    let path = format!("/student/{}/record", guid(&student));

    let response = client.post(&path, &record_create()).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = client
        .post(&format!("{}?year=2024", path), &record_create())
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Well-formed but unknown year
    let response = client
        .post(
            &format!("{}?year=0b8e5a3c-1d2f-4e6a-8b9c-7d0e1f2a3b4c", path),
            &record_create(),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_record_validates_mark_and_semester() {
    let app = TestApp::spawn().await;
    let client = app.client();
    let student = create_base_student(&client).await;
    let year = create_base_year(&client).await;
    let path = format!("/student/{}/record?year={}", guid(&student), guid(&year));

    let response = client
        .post(&path, &json!({ "subject": "Physics", "mark": 6 }))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = client
        .post(&path, &json!({ "subject": "Physics", "mark": 4, "semester": 3 }))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    // Semester defaults to 1
    let response = client
        .post(&path, &json!({ "subject": "Physics", "mark": 4 }))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["semester"], 1);
}

#[tokio::test]
async fn test_list_records_by_year() {
    let app = TestApp::spawn().await;
    let client = app.client();
    let student = create_random_student(&client).await;
    let other = create_random_student(&client).await;
    let first = create_random_year(&client).await;
    let second = create_random_year(&client).await;

    create_base_record(&client, &student, &first).await;
    create_base_record(&client, &student, &first).await;
    create_base_record(&client, &student, &second).await;
    create_base_record(&client, &other, &first).await;

    let path = format!("/student/{}/record", guid(&student));
    let response = client.get(&path).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 3);

    let response = client
        .get(&format!("{}?year={}", path, guid(&first)))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let records = response.body.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r["year_guid"] == first["guid"]));
}

#[tokio::test]
async fn test_get_and_delete_record() {
    let app = TestApp::spawn().await;
    let client = app.client();
    let student = create_base_student(&client).await;
    let year = create_base_year(&client).await;
    let record = create_base_record(&client, &student, &year).await;
    let path = format!("/student/{}/record/{}", guid(&student), guid(&record));

    let response = client.get(&path).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, record);

    let response = client.delete(&path).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = client.get(&path).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_record_is_scoped_to_its_student() {
    let app = TestApp::spawn().await;
    let client = app.client();
    let owner = create_random_student(&client).await;
    let other = create_random_student(&client).await;
    let year = create_base_year(&client).await;
    let record = create_base_record(&client, &owner, &year).await;

    let path = format!("/student/{}/record/{}", guid(&other), guid(&record));
    assert_eq!(client.get(&path).await.status, StatusCode::NOT_FOUND);
    assert_eq!(client.delete(&path).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_student_hides_records() {
    let app = TestApp::spawn().await;
    let client = app.client();
    let student = create_base_student(&client).await;
    let year = create_base_year(&client).await;
    create_base_record(&client, &student, &year).await;

    let response = client.delete(&format!("/student/{}", guid(&student))).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = client
        .get(&format!("/student/{}/record", guid(&student)))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let db = app.shutdown().await;
    assert_eq!(db.records().live_count(), 0);
    assert_eq!(db.records().rows().len(), 1);
}

#[tokio::test]
async fn test_records_require_auth() {
    let app = TestApp::spawn().await;
    let client = app.client();
    let student = create_base_student(&client).await;
    let path = format!("/student/{}/record", guid(&student));

    assert_eq!(
        app.anonymous_client().get(&path).await.status,
        StatusCode::FORBIDDEN
    );
    app.auth_mocker.stop();
    assert_eq!(client.get(&path).await.status, StatusCode::UNAUTHORIZED);
}
