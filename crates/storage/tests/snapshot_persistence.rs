use storage::{SnapshotStore, Storage};

#[tokio::test]
async fn snapshot_survives_reopening_the_database() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("directory.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    {
        let storage = Storage::new(&database_url).await.expect("open");
        storage
            .save_snapshot("users", r#"[{"id":7}]"#)
            .await
            .expect("save");
        storage.pool().close().await;
    }

    let reopened = Storage::new(&database_url).await.expect("reopen");
    let snapshot = reopened
        .load_snapshot("users")
        .await
        .expect("load")
        .expect("persisted snapshot");
    assert_eq!(snapshot.payload, r#"[{"id":7}]"#);
}
