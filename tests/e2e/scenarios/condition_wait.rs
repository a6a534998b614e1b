use crate::harness::{
    added, deleted, foreign, modified, nodes, running, snapshot, succeeded, Failure, TestEnv,
    Verb, WatchScript,
};
use serde_json::json;
use std::time::{Duration, Instant};
use wfe_core::{
    compress_nodes, ApiStatus, Condition, ConditionWaiter, ListOptions, NodePhase, WatchEvent,
    WatchObject, WfeError, Workflow, WorkflowPhase,
};

fn wait(env: &TestEnv, name: &str, condition: &Condition) -> wfe_core::Result<Workflow> {
    ConditionWaiter::new(env.cluster.workflows.as_ref(), env.hydrator.as_ref()).wait(name, condition)
}

#[test]
fn test_returns_as_soon_as_condition_is_met() {
    let env = TestEnv::new();
    env.script(
        WatchScript::new()
            .then(added(running("hello", "1")))
            .after(200, modified(succeeded("hello", "2"))),
    );

    let start = Instant::now();
    let wf = wait(&env, "hello", &Condition::finished(Duration::from_secs(2))).unwrap();
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(200), "returned too early: {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(1500), "waited too long: {:?}", elapsed);
    assert_eq!(wf.metadata.resource_version, "2");
    assert_eq!(wf.status.phase, WorkflowPhase::Succeeded);
    assert_eq!(env.cluster.workflows.closes(), 1);
}

#[test]
fn test_times_out_when_condition_never_met() {
    let env = TestEnv::new();
    env.script(WatchScript::new().then(added(running("hello", "1"))));

    let start = Instant::now();
    let err = wait(&env, "hello", &Condition::finished(Duration::from_millis(300))).unwrap_err();
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_secs(2), "timeout overshot: {:?}", elapsed);
    match &err {
        WfeError::Timeout {
            condition,
            selector,
            timeout,
            ..
        } => {
            assert_eq!(condition, "to finish");
            assert_eq!(*timeout, Duration::from_millis(300));
            assert!(selector.contains("metadata.name=hello"));
        }
        other => panic!("expected timeout, got {:?}", other),
    }
    let message = err.to_string();
    assert!(message.contains("timeout after"), "{}", message);
    assert!(message.contains("to finish"), "{}", message);
    assert_eq!(env.cluster.workflows.closes(), 1);
}

#[test]
fn test_times_out_on_silent_stream() {
    let env = TestEnv::new();

    let err = wait(&env, "hello", &Condition::started(Duration::from_millis(100))).unwrap_err();

    assert!(matches!(err, WfeError::Timeout { .. }));
    assert_eq!(env.journal.count("hydrate:"), 0);
    assert_eq!(env.cluster.workflows.closes(), 1);
}

#[test]
fn test_foreign_object_fails_immediately() {
    let env = TestEnv::new();
    env.script(WatchScript::new().then(foreign("v1/Pod", "hello-1234")));

    let start = Instant::now();
    let err = wait(&env, "hello", &Condition::finished(Duration::from_secs(10))).unwrap_err();

    assert!(start.elapsed() < Duration::from_secs(2));
    match err {
        WfeError::UnexpectedObject { condition, detail } => {
            assert_eq!(condition, "to finish");
            assert!(detail.contains("v1/Pod"), "{}", detail);
        }
        other => panic!("expected unexpected object, got {:?}", other),
    }
    assert_eq!(env.journal.count("hydrate:"), 0);
    assert_eq!(env.cluster.workflows.closes(), 1);
}

#[test]
fn test_error_event_fails_wait() {
    let env = TestEnv::new();
    env.script(WatchScript::new().then(WatchEvent::Error(ApiStatus {
        code: Some(410),
        reason: "Expired".to_string(),
        message: "too old resource version".to_string(),
    })));

    let err = wait(&env, "hello", &Condition::finished(Duration::from_secs(10))).unwrap_err();

    assert!(
        matches!(err, WfeError::UnexpectedObject { ref detail, .. } if detail.contains("too old resource version"))
    );
    assert_eq!(env.cluster.workflows.closes(), 1);
}

#[test]
fn test_closed_stream_fails_wait() {
    let env = TestEnv::new();
    env.script(
        WatchScript::new()
            .then(added(running("hello", "1")))
            .close_after(50),
    );

    let start = Instant::now();
    let err = wait(&env, "hello", &Condition::finished(Duration::from_secs(10))).unwrap_err();

    assert!(start.elapsed() < Duration::from_secs(2));
    assert!(matches!(err, WfeError::WatchClosed { ref condition } if condition == "to finish"));
    assert_eq!(env.cluster.workflows.closes(), 1);
}

#[test]
fn test_hydrates_each_snapshot_before_predicate() {
    let env = TestEnv::new();
    env.script(
        WatchScript::new()
            .then(added(snapshot("hello", "1")))
            .after(20, modified(running("hello", "2")))
            .after(20, modified(succeeded("hello", "3"))),
    );

    let journal = env.journal.clone();
    let condition = Condition::new("to finish", Duration::from_secs(2), move |wf| {
        journal.push(format!("predicate:{}", wf.metadata.resource_version));
        wf.status.finished_at.is_some()
    });
    wait(&env, "hello", &condition).unwrap();

    assert_eq!(
        env.journal.entries(),
        vec![
            "hydrate:hello@1",
            "predicate:1",
            "hydrate:hello@2",
            "predicate:2",
            "hydrate:hello@3",
            "predicate:3",
        ]
    );
}

#[test]
fn test_predicate_sees_expanded_nodes() {
    let env = TestEnv::new();
    let mut wf = succeeded("hello", "2");
    wf.status.compressed_nodes = compress_nodes(&nodes(&["hello", "hello-step-1"])).unwrap();
    env.script(WatchScript::new().then(modified(wf)));

    let condition = Condition::new("to have nodes", Duration::from_secs(2), |wf| {
        wf.status.compressed_nodes.is_empty() && wf.status.nodes.len() == 2
    });
    let wf = wait(&env, "hello", &condition).unwrap();

    assert!(wf.status.nodes.contains_key("hello-step-1"));
    assert_eq!(env.journal.count("hydrate:"), 1);
}

#[test]
fn test_hydration_failure_fails_wait() {
    let env = TestEnv::new();
    env.hydrator.fail_on("2");
    env.script(
        WatchScript::new()
            .then(added(running("hello", "1")))
            .then(modified(succeeded("hello", "2"))),
    );

    let err = wait(&env, "hello", &Condition::finished(Duration::from_secs(10))).unwrap_err();

    assert!(matches!(err, WfeError::Hydration { ref name, .. } if name == "hello"));
    assert_eq!(env.cluster.workflows.closes(), 1);
}

#[test]
fn test_offloaded_snapshot_without_store_fails() {
    let env = TestEnv::new();
    let mut wf = succeeded("hello", "2");
    wf.status.offload_node_status_version = "fnv:123".to_string();
    env.script(WatchScript::new().then(modified(wf)));

    let err = wait(&env, "hello", &Condition::finished(Duration::from_secs(10))).unwrap_err();

    assert!(matches!(err, WfeError::Hydration { .. }));
}

#[test]
fn test_watch_scoped_to_managed_name() {
    let env = TestEnv::new();
    env.script(
        WatchScript::new()
            .then(modified(succeeded("other", "5")))
            .after(50, modified(succeeded("hello", "6"))),
    );

    let wf = wait(&env, "hello", &Condition::finished(Duration::from_secs(2))).unwrap();

    assert_eq!(wf.metadata.name, "hello");
    assert_eq!(env.cluster.workflows.opened(), vec![ListOptions::managed("hello")]);
    assert_eq!(env.journal.entries(), vec!["hydrate:hello@6"]);
}

#[test]
fn test_unlabelled_workflows_are_ignored() {
    let env = TestEnv::new();
    let mut stray = succeeded("hello", "3");
    stray.metadata.labels.clear();
    env.script(WatchScript::new().then(modified(stray)));

    let err = wait(&env, "hello", &Condition::finished(Duration::from_millis(150))).unwrap_err();

    assert!(matches!(err, WfeError::Timeout { .. }));
    assert_eq!(env.journal.count("hydrate:"), 0);
}

#[test]
fn test_empty_name_accepts_any_managed_workflow() {
    let env = TestEnv::new();
    env.script(WatchScript::new().then(modified(succeeded("anything", "1"))));

    let wf = wait(&env, "", &Condition::finished(Duration::from_secs(2))).unwrap();

    assert_eq!(wf.metadata.name, "anything");
    assert_eq!(env.cluster.workflows.opened()[0].field_selector, "");
}

#[test]
fn test_deleted_snapshot_is_still_evaluated() {
    let env = TestEnv::new();
    env.script(WatchScript::new().then(deleted(succeeded("hello", "9"))));

    let wf = wait(&env, "hello", &Condition::finished(Duration::from_secs(2))).unwrap();

    assert_eq!(wf.metadata.resource_version, "9");
}

#[test]
fn test_watch_open_failure_is_returned() {
    let env = TestEnv::new();
    env.cluster
        .workflows
        .fail_next_watch(Failure::Api("connection refused".to_string()));

    let err = wait(&env, "hello", &Condition::finished(Duration::from_secs(2))).unwrap_err();

    assert!(matches!(err, WfeError::Api { ref message, .. } if message == "connection refused"));
    assert_eq!(env.cluster.log.count("Workflow", Verb::Watch), 1);
    assert_eq!(env.cluster.workflows.closes(), 0);
}

#[test]
fn test_each_wait_opens_and_closes_its_own_watch() {
    let env = TestEnv::new();
    env.script(WatchScript::new().then(modified(running("hello", "1"))));
    env.script(WatchScript::new().then(modified(succeeded("hello", "2"))));

    wait(&env, "hello", &Condition::started(Duration::from_secs(2))).unwrap();
    wait(&env, "hello", &Condition::finished(Duration::from_secs(2))).unwrap();

    assert_eq!(env.cluster.log.count("Workflow", Verb::Watch), 2);
    assert_eq!(env.cluster.workflows.closes(), 2);
}

#[test]
fn test_backend_json_with_skipped_nodes_matches() {
    let env = TestEnv::new();
    let object = WatchObject::from_value(json!({
        "apiVersion": "argoproj.io/v1alpha1",
        "kind": "Workflow",
        "metadata": {"name": "hello", "resourceVersion": "5", "labels": {"argo-e2e": "true"}},
        "status": {
            "phase": "Succeeded",
            "startedAt": "2024-01-01T10:00:00Z",
            "finishedAt": "2024-01-01T10:00:05Z",
            "nodes": {
                "hello": {"id": "hello", "name": "hello", "type": "DAG", "phase": "Succeeded"},
                "hello-1": {"id": "hello-1", "name": "hello.when-false", "type": "Skipped", "phase": "Skipped"},
                "hello-2": {"id": "hello-2", "name": "hello.after-fail", "type": "Pod", "phase": "Omitted"}
            }
        }
    }));
    env.script(WatchScript::new().then(WatchEvent::Modified(object)));

    let wf = wait(&env, "hello", &Condition::finished(Duration::from_secs(2))).unwrap();

    assert_eq!(wf.status.nodes["hello-1"].phase, NodePhase::Skipped);
    assert_eq!(wf.status.nodes["hello-2"].phase, NodePhase::Omitted);
    assert_eq!(env.journal.entries(), vec!["hydrate:hello@5"]);
}
