//! `/teacher` endpoint tests.

use hyper::StatusCode;
use serde_json::json;

use super::fixtures::*;
use super::helpers::{
    check_system, create_base_student, create_base_teacher, create_random_teacher, guid, TestApp,
};

#[tokio::test]
async fn test_get_teachers() {
    let app = TestApp::spawn().await;
    let client = app.client();
    for _ in 0..10 {
        create_random_teacher(&client).await;
    }

    let response = client.get("/teacher").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_get_teachers_bad_auth() {
    let app = TestApp::spawn().await;
    let client = app.client();
    for _ in 0..10 {
        create_random_teacher(&client).await;
    }
    app.auth_mocker.stop();

    let response = client.get("/teacher").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_teachers_no_auth() {
    let app = TestApp::spawn().await;
    for _ in 0..10 {
        create_random_teacher(&app.client()).await;
    }

    let response = app.anonymous_client().get("/teacher").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_get_teacher() {
    let app = TestApp::spawn().await;
    let client = app.client();
    let teacher = create_base_teacher(&client).await;

    let response = client.get(&format!("/teacher/{}", guid(&teacher))).await;
    assert_eq!(response.status, StatusCode::OK);

    let teacher = response.body;
    assert_eq!(teacher["email"], TEACHER_CREATE_EMAIL);
    assert_eq!(teacher["first_name"], TEACHER_CREATE_FIRST_NAME);
    assert_eq!(teacher["last_name"], TEACHER_CREATE_LAST_NAME);
    assert_eq!(teacher["middle_name"], TEACHER_CREATE_MIDDLE_NAME);
    assert_eq!(teacher["role"], TEACHER_CREATE_ROLE);
    assert_eq!(teacher["department"], TEACHER_CREATE_DEPARTMENT);
    assert_eq!(teacher["position"], TEACHER_CREATE_POSITION);
    check_system(&teacher);
}

#[tokio::test]
async fn test_get_teacher_by_email() {
    let app = TestApp::spawn().await;
    let client = app.client();
    let teacher = create_base_teacher(&client).await;

    let response = client
        .get(&format!("/teacher/email/{}", TEACHER_CREATE_EMAIL))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["guid"], teacher["guid"]);
    assert_eq!(response.body["department"], TEACHER_CREATE_DEPARTMENT);
    check_system(&response.body);
}

#[tokio::test]
async fn test_post_teacher() {
    let app = TestApp::spawn().await;
    let response = app.client().post("/teacher", &teacher_create()).await;
    assert_eq!(response.status, StatusCode::CREATED);

    let teacher = response.body;
    assert_eq!(teacher["email"], TEACHER_CREATE_EMAIL);
    assert_eq!(teacher["first_name"], TEACHER_CREATE_FIRST_NAME);
    assert_eq!(teacher["last_name"], TEACHER_CREATE_LAST_NAME);
    assert_eq!(teacher["middle_name"], TEACHER_CREATE_MIDDLE_NAME);
    assert_eq!(teacher["role"], TEACHER_CREATE_ROLE);
    assert_eq!(teacher["department"], TEACHER_CREATE_DEPARTMENT);
    assert_eq!(teacher["position"], TEACHER_CREATE_POSITION);
    check_system(&teacher);
}

#[tokio::test]
async fn test_post_teacher_defaults_role() {
    let app = TestApp::spawn().await;
    let mut body = teacher_create();
    body.as_object_mut().unwrap().remove("role");

    let response = app.client().post("/teacher", &body).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["role"], "teacher");
}

#[tokio::test]
async fn test_teacher_and_student_may_share_email() {
    let app = TestApp::spawn().await;
    let client = app.client();
    create_base_teacher(&client).await;
    let student = create_base_student(&client).await;

    let mut body = teacher_create();
    body["email"] = student["email"].clone();
    assert_eq!(
        client.post("/teacher", &body).await.status,
        StatusCode::CREATED
    );

    // Same table, same email
    assert_eq!(
        client.post("/teacher", &body).await.status,
        StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn test_put_teacher() {
    let app = TestApp::spawn().await;
    let client = app.client();
    let created = create_base_teacher(&client).await;

    let response = client
        .put(&format!("/teacher/{}", guid(&created)), &teacher_put())
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let teacher = response.body;
    assert_eq!(teacher["email"], TEACHER_PUT_EMAIL);
    assert_eq!(teacher["first_name"], TEACHER_PUT_FIRST_NAME);
    assert_eq!(teacher["last_name"], TEACHER_PUT_LAST_NAME);
    assert_eq!(teacher["middle_name"], TEACHER_PUT_MIDDLE_NAME);
    assert_eq!(teacher["role"], TEACHER_PUT_ROLE);
    assert_eq!(teacher["department"], TEACHER_PUT_DEPARTMENT);
    assert_eq!(teacher["position"], TEACHER_PUT_POSITION);
    check_system(&teacher);
}

#[tokio::test]
async fn test_delete_teacher() {
    let app = TestApp::spawn().await;
    let client = app.client();
    let teacher = create_base_teacher(&client).await;
    let path = format!("/teacher/{}", guid(&teacher));

    let response = client.delete(&path).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = client.get(&path).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = client
        .get(&format!("/teacher/email/{}", TEACHER_CREATE_EMAIL))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_teacher() {
    let app = TestApp::spawn().await;
    let client = app.client();
    let created = create_base_teacher(&client).await;
    let path = format!("/teacher/{}", guid(&created));

    let response = client.patch(&path, &teacher_patch()).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["email"], TEACHER_PATCH_EMAIL);
    assert_eq!(response.body["position"], TEACHER_CREATE_POSITION);
    check_system(&response.body);

    let response = client
        .patch(&path, &json!({ "departament": "Physics" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["department"], "Physics");
    assert_eq!(response.body["email"], TEACHER_PATCH_EMAIL);
}
