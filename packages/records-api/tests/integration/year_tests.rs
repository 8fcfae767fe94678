//! `/year` endpoint tests.

use hyper::StatusCode;

use super::fixtures::*;
use super::helpers::{check_system, create_base_year, create_random_year, guid, TestApp};

#[tokio::test]
async fn test_get_years() {
    let app = TestApp::spawn().await;
    let client = app.client();
    for _ in 0..10 {
        create_random_year(&client).await;
    }

    let response = client.get("/year").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_get_years_bad_auth() {
    let app = TestApp::spawn().await;
    let client = app.client();
    for _ in 0..10 {
        create_random_year(&client).await;
    }
    app.auth_mocker.stop();

    let response = client.get("/year").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_years_no_auth() {
    let app = TestApp::spawn().await;
    for _ in 0..10 {
        create_random_year(&app.client()).await;
    }

    let response = app.anonymous_client().get("/year").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_get_year() {
    let app = TestApp::spawn().await;
    let client = app.client();
    let year = create_base_year(&client).await;

    let response = client.get(&format!("/year/{}", guid(&year))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], YEAR_CREATE_NAME);
    check_system(&response.body);
}

#[tokio::test]
async fn test_year_has_no_email_lookup() {
    let app = TestApp::spawn().await;
    let response = app.client().get("/year/email/a@test.com").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_year() {
    let app = TestApp::spawn().await;
    let response = app.client().post("/year", &year_create()).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["name"], YEAR_CREATE_NAME);
    check_system(&response.body);
}

#[tokio::test]
async fn test_put_year() {
    let app = TestApp::spawn().await;
    let client = app.client();
    let year = create_base_year(&client).await;

    let response = client
        .put(&format!("/year/{}", guid(&year)), &year_put())
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], YEAR_PUT_NAME);
    assert_eq!(response.body["guid"], year["guid"]);
    check_system(&response.body);
}

#[tokio::test]
async fn test_delete_year() {
    let app = TestApp::spawn().await;
    let client = app.client();
    let year = create_base_year(&client).await;
    let path = format!("/year/{}", guid(&year));

    let response = client.delete(&path).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = client.get(&path).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_year() {
    let app = TestApp::spawn().await;
    let client = app.client();
    let year = create_base_year(&client).await;

    let response = client
        .patch(&format!("/year/{}", guid(&year)), &year_patch())
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], YEAR_PATCH_NAME);
    check_system(&response.body);
}
