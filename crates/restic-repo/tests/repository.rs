//! Repository operations against a scripted restic
#![cfg(unix)]

mod common;

use common::{FakeRestic, REPO, snapshot_json, snapshot_list};
use restic_exec::{Observers, ResticMessage};
use restic_repo::{
    BackupOptions, Error, ForgetOptions, InitOptions, Repository, RepositoryConfig, TagAction,
    TagOptions,
};

const DISPATCH: &str = r#"case "$2" in
  snapshots) cat "$STATE/snapshots.json" ;;
  backup)
    cp "$STATE/next.json" "$STATE/snapshots.json"
    echo '{"message_type":"status","percent_done":1}'
    echo '{"message_type":"summary","files_new":1,"snapshot_id":"cc000003"}'
    ;;
  tag)
    cp "$STATE/next.json" "$STATE/snapshots.json"
    ;;
  forget) echo '[]' ;;
  init) echo '{"message_type":"initialized","id":"f00d","repository":"repo"}' ;;
esac"#;

fn two_snapshots() -> String {
    snapshot_list(&[
        snapshot_json("aa000001", &["daily"]),
        snapshot_json("bb000002", &[]),
    ])
}

#[smol_potat::test]
async fn test_open_loads_snapshots() {
    let restic = FakeRestic::new(DISPATCH);
    restic.write_state("snapshots.json", &two_snapshots());

    let mut repository = Repository::open(restic.config()).await.unwrap();

    assert_eq!(repository.cached_snapshots().unwrap().len(), 2);
    assert_eq!(
        restic.calls(),
        vec![format!("--json snapshots -r {} --verbose=1", REPO)]
    );

    let found = repository.snapshot("bb000002", false).await.unwrap().unwrap();
    assert_eq!(found.hostname, "web-1");
    assert!(found.tags.is_empty());
    assert!(repository.snapshot("zz", false).await.unwrap().is_none());
    // Served from the cache
    assert_eq!(restic.calls().len(), 1);
}

#[smol_potat::test]
async fn test_snapshots_reload_on_request() {
    let restic = FakeRestic::new(DISPATCH);
    restic.write_state("snapshots.json", &two_snapshots());
    let mut repository = Repository::new(restic.config());

    assert_eq!(repository.snapshots(false).await.unwrap().len(), 2);
    assert_eq!(repository.snapshots(false).await.unwrap().len(), 2);
    assert_eq!(restic.calls().len(), 1);

    restic.write_state("snapshots.json", &snapshot_list(&[]));
    assert!(repository.snapshots(true).await.unwrap().is_empty());
    assert_eq!(restic.calls().len(), 2);
}

#[smol_potat::test]
async fn test_backup_reloads_snapshots() {
    let restic = FakeRestic::new(DISPATCH);
    restic.write_state("snapshots.json", &two_snapshots());
    restic.write_state(
        "next.json",
        &snapshot_list(&[
            snapshot_json("aa000001", &["daily"]),
            snapshot_json("bb000002", &[]),
            snapshot_json("cc000003", &[]),
        ]),
    );
    let mut repository = Repository::open(restic.config()).await.unwrap();
    let mut summaries = Vec::new();

    let events = {
        let mut observers = Observers::new().on_summary(|s| summaries.push(s.snapshot_id.clone()));
        repository
            .backup(
                &BackupOptions::new(["/home/alice/my docs"]),
                Some(&mut observers),
            )
            .await
            .unwrap()
    };

    assert_eq!(events.len(), 2);
    assert_eq!(summaries, vec![Some("cc000003".to_string())]);
    assert_eq!(repository.cached_snapshots().unwrap().len(), 3);
    assert_eq!(restic.verbs(), vec!["snapshots", "backup", "snapshots"]);
    assert!(restic.calls()[1].ends_with("--verbose=1 /home/alice/my docs"));
}

#[smol_potat::test]
async fn test_failed_backup_skips_reload() {
    let restic = FakeRestic::new(
        r#"if [ "$2" = backup ]; then echo 'Fatal: unable to save snapshot' >&2; exit 1; fi
echo '[]'"#,
    );
    let mut repository = Repository::open(restic.config()).await.unwrap();

    let err = repository
        .backup(&BackupOptions::new(["/data"]), None)
        .await
        .unwrap_err();

    assert_eq!(err.exit_code(), Some(1));
    assert!(err.to_string().contains("unable to save snapshot"));
    assert_eq!(restic.verbs(), vec!["snapshots", "backup"]);
}

#[smol_potat::test]
async fn test_invalid_request_never_spawns() {
    let restic = FakeRestic::new(DISPATCH);
    let mut repository = Repository::new(restic.config());

    let err = repository
        .backup(&BackupOptions::default(), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Restic(restic_exec::Error::InvalidRequest { .. })
    ));
    assert!(restic.calls().is_empty());
}

#[smol_potat::test]
async fn test_forget_with_policy() {
    let restic = FakeRestic::new(DISPATCH);
    restic.write_state("snapshots.json", &snapshot_list(&[]));
    let mut repository = Repository::new(restic.config());

    let options = ForgetOptions {
        keep_last: Some(3),
        tags: vec!["daily".to_string()],
        ..Default::default()
    };
    let events = repository.forget(&options, None).await.unwrap();

    assert_eq!(events, vec![ResticMessage::Unstructured(serde_json::json!([]))]);
    assert_eq!(restic.verbs(), vec!["forget", "snapshots"]);
    assert!(restic.calls()[0].ends_with("--keep-last 3 --tag daily"));
}

#[smol_potat::test]
async fn test_delete_snapshot_with_prune() {
    let restic = FakeRestic::new(DISPATCH);
    restic.write_state("snapshots.json", &snapshot_list(&[]));
    let mut repository = Repository::new(restic.config());

    repository.delete_snapshot("aa000001", true).await.unwrap();

    assert_eq!(restic.verbs(), vec!["forget", "snapshots"]);
    assert!(restic.calls()[0].ends_with("--verbose=1 aa000001 --prune"));
}

#[smol_potat::test]
async fn test_delete_all_snapshots() {
    let restic = FakeRestic::new(DISPATCH);
    restic.write_state("snapshots.json", &two_snapshots());
    let mut repository = Repository::new(restic.config());

    let results = repository.delete_all_snapshots(true).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(
        restic.verbs(),
        vec!["snapshots", "forget", "forget", "prune", "snapshots"]
    );
    let calls = restic.calls();
    assert!(calls[1].ends_with(&format!("aa000001{}", "0".repeat(56))));
    assert!(calls[2].ends_with(&format!("bb000002{}", "0".repeat(56))));
}

#[smol_potat::test]
async fn test_update_tags_reloads() {
    let restic = FakeRestic::new(DISPATCH);
    restic.write_state("snapshots.json", &two_snapshots());
    restic.write_state(
        "next.json",
        &snapshot_list(&[
            snapshot_json("aa000001", &["daily", "keep"]),
            snapshot_json("bb000002", &[]),
        ]),
    );
    let mut repository = Repository::open(restic.config()).await.unwrap();

    let options = TagOptions::new(["aa000001"], vec!["keep".to_string()], TagAction::Add);
    repository.update_tags(&options, None).await.unwrap();

    let tagged = repository.snapshot("aa000001", false).await.unwrap().unwrap();
    assert_eq!(tagged.tags, vec!["daily", "keep"]);
    assert!(restic.calls()[1].ends_with("aa000001 --add keep"));
}

#[smol_potat::test]
async fn test_create_runs_init() {
    let restic = FakeRestic::new(DISPATCH);

    let repository = Repository::create(restic.config(), &InitOptions::default())
        .await
        .unwrap();

    assert_eq!(repository.path(), REPO);
    assert_eq!(restic.verbs(), vec!["init"]);
    assert!(repository.cached_snapshots().is_none());
}

#[smol_potat::test]
async fn test_malformed_snapshot_list_is_decode_error() {
    let restic = FakeRestic::new(r#"echo '[{"id":"abc","time":"not a time"}]'"#);

    let err = Repository::open(restic.config()).await.unwrap_err();

    assert!(matches!(err, Error::Decode { .. }), "got {:?}", err);
}

#[smol_potat::test]
async fn test_password_file_reaches_command_line() {
    let restic = FakeRestic::new(r#"echo "{\"password\":\"${RESTIC_PASSWORD:-}\"}""#);
    let mut config = restic.config();
    config.password = None;
    config.password_file = Some("/etc/restic/pass word".to_string());
    let repository = Repository::new(config);

    let events = repository
        .check(&Default::default(), None)
        .await
        .unwrap();

    assert_eq!(events[0].to_value()["password"], "");
    assert!(restic.calls()[0].contains("--password-file=/etc/restic/pass word"));
}

#[smol_potat::test]
async fn test_config_file_drives_repository() {
    let restic = FakeRestic::new(DISPATCH);
    restic.write_state("snapshots.json", &two_snapshots());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repo.yaml");
    let binary = restic.config().binary.unwrap();
    std::fs::write(
        &path,
        format!(
            "path: ${{RESTIC_REPO_TEST_UNSET_REPO:-/srv/from-file}}\npassword: pw\nbinary: {}\nshell: posix\nno_lock: true\n",
            binary
        ),
    )
    .unwrap();

    let config = RepositoryConfig::from_file(&path).unwrap();
    let repository = Repository::open(config).await.unwrap();

    assert_eq!(repository.path(), "/srv/from-file");
    assert_eq!(
        restic.calls(),
        vec!["--json snapshots -r /srv/from-file --no-lock --verbose=1"]
    );
}
