//! End-to-end workflow tests over the database container.

use records_core::database::Database;
use records_core::error::DbError;
use records_core::model::{
    Entity, PasswordHasher, RecordCreate, Role, Student, StudentCreate, StudentPatch, StudentPut,
    Teacher, TeacherCreate, TeacherPatch, Year, YearCreate, YearPut,
};
use records_core::table::ListQuery;

fn student(email: &str, course: u8) -> StudentCreate {
    StudentCreate {
        email: email.to_string(),
        first_name: "Nikolai".to_string(),
        last_name: "Kuznetsov".to_string(),
        middle_name: Some("Olegovich".to_string()),
        role: Role::Student,
        group: "PI-31".to_string(),
        course,
        password: Some("secret".to_string()),
    }
}

fn database() -> Database {
    Database::new().with_password_hasher(PasswordHasher::new(4))
}

/// Full student lifecycle: create → read → put → patch → delete → read.
#[test]
fn test_full_student_lifecycle() {
    let mut db = database();

    let created = db.create::<Student>(student("life@test.com", 1)).unwrap().clone();
    assert!(!created.envelope.is_deleted);
    assert_eq!(created.envelope.created_at, created.envelope.updated_at);

    let put: StudentPut = student("life2@test.com", 2);
    let replaced = db.put::<Student>(created.guid(), put).unwrap().clone();
    assert_eq!(replaced.email, "life2@test.com");
    assert_eq!(replaced.course, 2);
    assert_eq!(replaced.envelope.guid, created.envelope.guid);

    let patched = db
        .patch::<Student>(
            created.guid(),
            StudentPatch {
                group: Some("PI-41".to_string()),
                ..Default::default()
            },
        )
        .unwrap()
        .clone();
    assert_eq!(patched.group, "PI-41");
    assert_eq!(patched.email, "life2@test.com");

    db.delete_student(created.guid()).unwrap();
    assert!(matches!(
        db.get::<Student>(created.guid()),
        Err(DbError::NotFound { .. })
    ));
    assert!(db.find_by_email::<Student>("life2@test.com").is_err());
    assert!(db.put::<Student>(created.guid(), student("x@test.com", 1)).is_err());
}

/// Listing returns exactly the live rows created.
#[test]
fn test_list_counts_only_live_rows() {
    let mut db = database();
    let mut guids = Vec::new();
    for i in 0..10 {
        guids.push(
            db.create::<Student>(student(&format!("s{}@test.com", i), 1 + (i % 6) as u8))
                .unwrap()
                .guid(),
        );
    }
    assert_eq!(db.list::<Student>(&ListQuery::default()).len(), 10);

    db.delete_student(guids[3]).unwrap();
    db.delete_student(guids[7]).unwrap();
    assert_eq!(db.list::<Student>(&ListQuery::default()).len(), 8);
}

/// Teachers and students have separate email namespaces.
#[test]
fn test_teacher_and_student_may_share_email() {
    let mut db = database();
    db.create::<Student>(student("shared@test.com", 1)).unwrap();
    db.create::<Teacher>(TeacherCreate {
        email: "shared@test.com".to_string(),
        first_name: "Elena".to_string(),
        last_name: "Volkova".to_string(),
        middle_name: None,
        role: Role::Teacher,
        department: "Chemistry".to_string(),
        position: "Lecturer".to_string(),
        password: None,
    })
    .unwrap();

    let teacher = db.find_by_email::<Teacher>("shared@test.com").unwrap().guid();
    let patched = db
        .patch::<Teacher>(
            teacher,
            TeacherPatch {
                position: Some("Senior lecturer".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(patched.position, "Senior lecturer");
    assert_eq!(patched.department, "Chemistry");
}

/// Years can be replaced and records keep pointing at them.
#[test]
fn test_year_replace_keeps_records() {
    let mut db = database();
    let s = db.create::<Student>(student("rec@test.com", 3)).unwrap().guid();
    let y = db
        .create::<Year>(YearCreate {
            name: "2024".to_string(),
        })
        .unwrap()
        .guid();
    db.create_record(
        s,
        y,
        RecordCreate {
            subject: "Databases".to_string(),
            mark: 5,
            semester: 1,
        },
    )
    .unwrap();

    db.put::<Year>(
        y,
        YearPut {
            name: "2024/2025".to_string(),
        },
    )
    .unwrap();
    let records = db.list_records(s, Some(y), &ListQuery::default()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].subject, "Databases");
}

/// Passwords are stored as bcrypt hashes at the configured cost.
#[test]
fn test_password_is_stored_as_bcrypt_hash() {
    let mut db = Database::new().with_password_hasher(PasswordHasher::new(5));
    let created = db.create::<Student>(student("hash@test.com", 2)).unwrap().clone();
    let stored = created.password_hash.as_deref().unwrap();
    assert!(stored.starts_with("$2b$05$"));
    assert!(!stored.contains("secret"));
    assert!(db.authenticate("hash@test.com", "secret").is_ok());
    assert_eq!(
        db.authenticate("hash@test.com", "Secret"),
        Err(DbError::InvalidCredentials)
    );
}
