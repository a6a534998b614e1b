use crate::harness::{modified, running, snapshot, Failure, TestEnv, Verb, WatchScript};
use std::time::Duration;
use wfe_core::{WfeError, Workflow};

fn manifest(generate_name: &str) -> Workflow {
    let mut wf = Workflow::default();
    wf.metadata.generate_name = generate_name.to_string();
    wf
}

#[test]
fn test_submit_without_workflow_fails() {
    let env = TestEnv::new();

    let err = env.suite().given().when().submit_workflow().unwrap_err();

    assert!(matches!(err, WfeError::Precondition(ref m) if m == "No workflow to submit"));
    assert_eq!(env.cluster.log.len(), 0);
}

#[test]
fn test_failed_submit_skips_remaining_steps() {
    let env = TestEnv::new();
    env.cluster
        .workflows
        .store
        .fail_next(Verb::Create, Failure::Api("admission webhook denied".to_string()));

    let journal = env.journal.clone();
    let err = env
        .suite()
        .run("failed_submit", |given| {
            given
                .workflow(manifest("hello-"))
                .when()
                .submit_workflow()?
                .wait_for_workflow(Duration::from_secs(5))?
                .then()
                .expect_workflow(|_| {
                    journal.push("expect");
                    Ok(())
                })?;
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(err, WfeError::Api { ref message, .. } if message.contains("admission")));
    assert_eq!(env.cluster.log.len(), 1);
    assert_eq!(env.cluster.log.count("Workflow", Verb::Create), 1);
    assert_eq!(env.cluster.log.count("Workflow", Verb::Watch), 0);
    assert_eq!(env.cluster.log.count("Workflow", Verb::Get), 0);
    assert_eq!(env.journal.count("expect"), 0);
}

#[test]
fn test_wait_timeout_skips_assertions() {
    let env = TestEnv::new();
    env.script(WatchScript::new().then(modified(running("hello", "2"))));

    let journal = env.journal.clone();
    let err = env
        .suite()
        .run("wait_timeout", |given| {
            given
                .workflow(snapshot("hello", ""))
                .when()
                .submit_workflow()?
                .wait_for_workflow(Duration::from_millis(200))?
                .then()
                .expect_workflow(|_| {
                    journal.push("expect");
                    Ok(())
                })?;
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(err, WfeError::Timeout { .. }));
    assert_eq!(env.cluster.log.count("Workflow", Verb::Watch), 1);
    assert_eq!(env.cluster.log.count("Workflow", Verb::Get), 0);
    assert_eq!(env.cluster.workflows.closes(), 1);
    assert_eq!(env.journal.count("expect"), 0);
}

#[test]
fn test_block_error_stops_chain() {
    let env = TestEnv::new();
    env.cluster.workflows.store.insert(snapshot("hello", "1"));

    let err = env
        .suite()
        .run("block_error", |given| {
            given
                .workflow_name("hello")
                .when()
                .and(|| Err(WfeError::assertion("boom")))?
                .delete_workflow()?;
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(err, WfeError::Assertion(ref m) if m == "boom"));
    assert_eq!(env.cluster.log.count("Workflow", Verb::Delete), 0);
    assert!(env.cluster.workflows.store.peek("hello").is_some());
}

#[test]
fn test_failed_assertion_stops_then_chain() {
    let env = TestEnv::new();
    env.cluster.workflows.store.insert(running("hello", "1"));

    let err = env
        .suite()
        .run("failed_assertion", |given| {
            given
                .workflow_name("hello")
                .when()
                .then()
                .expect_workflow(|wf| {
                    if wf.status.finished_at.is_some() {
                        Ok(())
                    } else {
                        Err(WfeError::assertion("workflow has not finished"))
                    }
                })?
                .run_cli(&["logs", "hello"], |_| Ok(()))?;
            Ok(())
        })
        .unwrap_err();

    assert!(err.to_string().contains("workflow has not finished"));
    assert!(env.cli.invocations().is_empty());
}

#[test]
fn test_delete_missing_workflow_is_fatal() {
    let env = TestEnv::new();

    let err = env
        .suite()
        .given()
        .workflow_name("gone")
        .when()
        .delete_workflow()
        .unwrap_err();

    assert!(err.is_not_found());
}

#[test]
fn test_cli_start_failure_is_fatal() {
    let env = TestEnv::new();
    env.cli.fail_to_start();

    let journal = env.journal.clone();
    let err = env
        .suite()
        .given()
        .when()
        .run_cli(&["version"], |_| {
            journal.push("block");
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(err, WfeError::CommandStartFailed { .. }));
    assert_eq!(env.journal.count("block"), 0);
}

#[test]
fn test_cli_nonzero_exit_is_handed_to_block() {
    let env = TestEnv::new();
    env.cli.reply("Error: workflow not found", 1);

    let when = env
        .suite()
        .given()
        .when()
        .run_cli(&["get", "missing"], |out| {
            assert_eq!(out.exit_code, Some(1));
            assert!(out.output.contains("not found"));
            assert!(out.expect_success().is_err());
            Ok(())
        })
        .unwrap();

    assert_eq!(when.workflow_name(), "");
}

#[test]
fn test_delete_quota_without_quota_fails() {
    let env = TestEnv::new();

    let err = env.suite().given().when().delete_quota().unwrap_err();

    assert!(matches!(err, WfeError::Precondition(_)));
    assert_eq!(env.cluster.log.len(), 0);
}

#[test]
fn test_delete_quota_not_found_is_fatal() {
    let env = TestEnv::new();
    env.cluster.quotas.fail_next(Verb::Delete, Failure::NotFound);

    let err = env
        .suite()
        .given()
        .when()
        .memory_quota("1Gi")
        .and_then(|w| w.delete_quota())
        .unwrap_err();

    assert!(err.is_not_found());
}

#[test]
fn test_delete_storage_quota_error_is_fatal() {
    let env = TestEnv::new();
    env.cluster
        .quotas
        .fail_next(Verb::Delete, Failure::Api("forbidden".to_string()));

    let err = env
        .suite()
        .given()
        .when()
        .storage_quota("5Gi")
        .and_then(|w| w.delete_storage_quota())
        .unwrap_err();

    assert!(matches!(err, WfeError::Api { .. }));
}
