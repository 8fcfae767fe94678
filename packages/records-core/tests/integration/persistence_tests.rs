//! Persistence across simulated restarts.

use tempfile::tempdir;

use records_core::config::RecordsConfig;
use records_core::model::{Entity, Year, YearCreate, YearPatch};
use records_core::persistence::PersistenceManager;
use records_core::table::ListQuery;

/// Writes survive a restart; guids and timestamps are preserved.
#[test]
fn test_restart_preserves_rows() {
    let temp_dir = tempdir().unwrap();
    let config = RecordsConfig {
        data_dir: Some(temp_dir.path().to_path_buf()),
        ..Default::default()
    };

    let mut first_run = PersistenceManager::from_config(&config).unwrap();
    let mut db = first_run.load().unwrap();
    let mut created = Vec::new();
    for i in 0..5 {
        created.push(
            db.create::<Year>(YearCreate {
                name: format!("{}/{}", 2020 + i, 2021 + i),
            })
            .unwrap()
            .clone(),
        );
    }
    db.patch::<Year>(
        created[0].guid(),
        YearPatch {
            name: Some("renamed".to_string()),
        },
    )
    .unwrap();
    db.delete::<Year>(created[4].guid()).unwrap();
    assert!(first_run.flush_if_dirty(&db).unwrap());

    let mut second_run = PersistenceManager::from_config(&config).unwrap();
    let reloaded = second_run.load().unwrap();
    let years = reloaded.list::<Year>(&ListQuery::default());
    assert_eq!(years.len(), 4);
    assert_eq!(years[0].name, "renamed");
    assert_eq!(years[1].envelope, created[1].envelope);
    assert!(reloaded.get::<Year>(created[4].guid()).is_err());

    // A clean reload does not rewrite the snapshot
    assert!(!second_run.flush_if_dirty(&reloaded).unwrap());
}

/// A truncated snapshot is refused instead of loading as empty.
#[test]
fn test_truncated_snapshot_is_refused() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let config = RecordsConfig {
        data_dir: Some(temp_dir.path().to_path_buf()),
        ..Default::default()
    };

    let mut manager = PersistenceManager::from_config(&config)
        .ok_or_else(|| anyhow::anyhow!("data_dir not configured"))?;
    let mut db = manager.load()?;
    db.create::<Year>(YearCreate {
        name: "2030/2031".to_string(),
    })?;
    manager.save(&db)?;

    let path = manager.snapshot_path();
    let contents = std::fs::read(&path)?;
    std::fs::write(&path, &contents[..contents.len() / 2])?;

    let err = PersistenceManager::new(temp_dir.path(), &config)
        .load()
        .unwrap_err();
    assert!(matches!(
        err,
        records_core::error::DbError::SerializationError(_)
    ));
    Ok(())
}
