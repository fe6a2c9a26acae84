use super::stubs::{failed_files, services_in, staged_files, StubFactory, StubTracker};
use crate::domain::{ConduitCommand, IssueKey, JiraCommand, PlatformName};
use crate::run_service_command;
use std::sync::Arc;

fn key(s: &str) -> IssueKey {
    IssueKey::parse(s).unwrap()
}

#[test]
fn test_create_from_staged_file_cleans_up() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = Arc::new(StubFactory::new(StubTracker::default()));
    let services = services_in(tmp.path(), Arc::clone(&factory));

    let path = services.staging.stage("## Steps\n- run it").unwrap();
    let code = run_service_command(
        &services,
        None,
        ConduitCommand::Jira(JiraCommand::Create {
            project: "ABC".to_string(),
            summary: "Broken build".to_string(),
            content_file: path.clone(),
            issue_type: "Bug".to_string(),
        }),
    )
    .unwrap();

    assert_eq!(code, 0);
    assert!(!path.exists());
    assert_eq!(staged_files(tmp.path()), 0);
    assert!(failed_files(tmp.path()).is_empty());
    let created = factory.tracker.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].description, "## Steps\n- run it");
    assert_eq!(created[0].issue_type, "Bug");
}

#[test]
fn test_failed_comment_archives_content() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = Arc::new(StubFactory::new(StubTracker::failing()));
    let services = services_in(tmp.path(), Arc::clone(&factory));

    let path = services.staging.stage("please look").unwrap();
    let err = run_service_command(
        &services,
        None,
        ConduitCommand::Jira(JiraCommand::Comment {
            key: key("ABC-7"),
            content_file: path.clone(),
        }),
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "HTTP 400: summary: required");
    assert_eq!(err.exit_code(), 69);
    assert!(!path.exists());
    let failed = failed_files(tmp.path());
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].file_name(), path.file_name());
    assert_eq!(std::fs::read_to_string(&failed[0]).unwrap(), "please look");
}

#[test]
fn test_content_file_outside_staging_is_left_alone() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = Arc::new(StubFactory::new(StubTracker::failing()));
    let services = services_in(tmp.path(), Arc::clone(&factory));
    let own = tmp.path().join("my-description.md");
    std::fs::write(&own, "draft").unwrap();

    let result = run_service_command(
        &services,
        None,
        ConduitCommand::Jira(JiraCommand::Update {
            key: key("ABC-2"),
            summary: None,
            content_file: Some(own.clone()),
        }),
    );

    assert!(result.is_err());
    assert_eq!(std::fs::read_to_string(&own).unwrap(), "draft");
    assert!(failed_files(tmp.path()).is_empty());
}

#[test]
fn test_update_requires_summary_or_content() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = Arc::new(StubFactory::new(StubTracker::default()));
    let services = services_in(tmp.path(), Arc::clone(&factory));

    let err = run_service_command(
        &services,
        None,
        ConduitCommand::Jira(JiraCommand::Update {
            key: key("ABC-2"),
            summary: None,
            content_file: None,
        }),
    )
    .unwrap_err();
    assert!(err.is_usage());
    assert!(factory.tracker.calls().is_empty());
}

#[test]
fn test_update_summary_only_skips_staging() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = Arc::new(StubFactory::new(StubTracker::default()));
    let services = services_in(tmp.path(), Arc::clone(&factory));

    run_service_command(
        &services,
        None,
        ConduitCommand::Jira(JiraCommand::Update {
            key: key("ABC-2"),
            summary: Some("New title".to_string()),
            content_file: None,
        }),
    )
    .unwrap();

    let updates = factory.tracker.updates.lock().unwrap();
    assert_eq!(updates[0].summary.as_deref(), Some("New title"));
    assert_eq!(updates[0].description, None);
}

#[test]
fn test_missing_content_file_does_not_call_remote() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = Arc::new(StubFactory::new(StubTracker::default()));
    let services = services_in(tmp.path(), Arc::clone(&factory));
    let never_written = services.staging.content_path();

    let err = run_service_command(
        &services,
        None,
        ConduitCommand::Jira(JiraCommand::Comment {
            key: key("ABC-1"),
            content_file: never_written,
        }),
    )
    .unwrap_err();

    assert_eq!(err.exit_code(), 66);
    assert!(factory.tracker.calls().is_empty());
}

#[test]
fn test_unknown_site_archives_staged_comment() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = Arc::new(StubFactory::new(StubTracker::default()));
    let services = services_in(tmp.path(), Arc::clone(&factory));

    let path = services.staging.stage("long comment").unwrap();
    let failure = services
        .issues
        .comment(Some("nope"), &key("ABC-3"), &path)
        .unwrap_err();

    assert_eq!(failure.error.exit_code(), 78);
    assert!(!path.exists());
    assert_eq!(staged_files(tmp.path()), 0);
    let failed = failed_files(tmp.path());
    assert_eq!(failed.len(), 1);
    assert_eq!(std::fs::read_to_string(&failed[0]).unwrap(), "long comment");
    assert_eq!(
        failure.notices(),
        vec![format!("Content preserved at {}", failed[0].display())]
    );
    assert!(factory.tracker.calls().is_empty());
}

#[test]
fn test_connect_failure_archives_staged_description() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = Arc::new(StubFactory::new(StubTracker::offline()));
    let services = services_in(tmp.path(), Arc::clone(&factory));

    for command in ["create", "update"] {
        let path = services.staging.stage(command).unwrap();
        let jira = match command {
            "create" => JiraCommand::Create {
                project: "ABC".to_string(),
                summary: "Broken build".to_string(),
                content_file: path.clone(),
                issue_type: "Task".to_string(),
            },
            _ => JiraCommand::Update {
                key: key("ABC-4"),
                summary: None,
                content_file: Some(path.clone()),
            },
        };
        let err = run_service_command(&services, None, ConduitCommand::Jira(jira)).unwrap_err();
        assert_eq!(err.exit_code(), 69);
        assert!(!path.exists());
    }

    let failed = failed_files(tmp.path());
    assert_eq!(failed.len(), 2);
    let mut archived: Vec<String> = failed
        .iter()
        .map(|p| std::fs::read_to_string(p).unwrap())
        .collect();
    archived.sort();
    assert_eq!(archived, vec!["create".to_string(), "update".to_string()]);
    assert!(factory.tracker.created.lock().unwrap().is_empty());
    assert!(factory.tracker.updates.lock().unwrap().is_empty());
}

#[test]
fn test_read_commands_and_site_alias() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = Arc::new(StubFactory::new(StubTracker::default()));
    let services = services_in(tmp.path(), Arc::clone(&factory));

    for command in [
        JiraCommand::Get { key: key("ABC-1") },
        JiraCommand::Search {
            jql: "project = ABC".to_string(),
        },
        JiraCommand::Status {
            key: key("ABC-1"),
            status: "Closed".to_string(),
        },
        JiraCommand::Transitions { key: key("ABC-1") },
        JiraCommand::RemoteLinks { key: key("ABC-1") },
    ] {
        assert_eq!(
            run_service_command(&services, Some("work"), ConduitCommand::Jira(command)).unwrap(),
            0
        );
    }
    let calls = factory.tracker.calls();
    assert!(calls.contains(&"search project = ABC".to_string()));
    assert!(calls.contains(&"transition ABC-1 Closed".to_string()));
    assert!(factory
        .sites
        .lock()
        .unwrap()
        .iter()
        .all(|s| s.as_deref() == Some("work")));

    let err = run_service_command(
        &services,
        Some("elsewhere"),
        ConduitCommand::Jira(JiraCommand::Get { key: key("ABC-1") }),
    )
    .unwrap_err();
    assert_eq!(err.exit_code(), 78);
}

#[test]
fn test_connect_and_content_path() {
    let tmp = tempfile::tempdir().unwrap();
    let factory = Arc::new(StubFactory::new(StubTracker::default()));
    let services = services_in(tmp.path(), Arc::clone(&factory));

    assert_eq!(
        run_service_command(
            &services,
            None,
            ConduitCommand::Connect {
                platform: PlatformName::Jira
            }
        )
        .unwrap(),
        0
    );
    assert_eq!(factory.tracker.calls(), vec!["connect".to_string()]);

    assert_eq!(
        run_service_command(&services, None, ConduitCommand::GetContentPath).unwrap(),
        0
    );
    // パスを表示するだけでファイルは作らない
    assert_eq!(staged_files(tmp.path()), 0);
}
