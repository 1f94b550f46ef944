// tests/execute_scripted.rs

use std::error::Error;

use frecklaunch::errors::FrecklaunchError;
use frecklaunch::exec::{ExitOutcome, RunEvent, Termination};
use frecklaunch::{RunOptions, RunReport, execute};
use frecklaunch_test_utils::builders::ConfigFileBuilder;
use frecklaunch_test_utils::scripted_backend::{Launch, ScriptedBackend};
use frecklaunch_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn launches_once_with_payload_and_relays_output() -> TestResult {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_hosts(&["dev.cutecode.co"])
        .build();

    let mut backend = ScriptedBackend::new(vec![
        RunEvent::Stdout(b"PLAY [basic-hardening]\n".to_vec()),
        RunEvent::Stderr(b"deprecation warning\n".to_vec()),
        RunEvent::Stdout(b"ok: [dev.cutecode.co]\n".to_vec()),
        RunEvent::Exited(ExitOutcome::Code(0)),
    ]);
    let launches = backend.launches();
    let mut out = Vec::new();

    let summary =
        with_timeout(execute(&cfg, &mut backend, &mut out, RunOptions::default())).await?;

    assert_eq!(
        *launches.lock().unwrap(),
        vec![Launch {
            program: "freckles".to_string(),
            payload: r#"[{"target":"root@dev.cutecode.co","frecklet":"basic-hardening","vars":{"fail2ban":true,"ufw":true,"ufw_open_tcp":[80,443]}}]"#.to_string(),
        }]
    );

    assert_eq!(
        String::from_utf8(out)?,
        "stdout: PLAY [basic-hardening]\n\
         stderr: deprecation warning\n\
         stdout: ok: [dev.cutecode.co]\n\
         child process exited with code 0\n"
    );
    assert_eq!(summary.stdout_chunks, 2);
    assert_eq!(summary.stderr_chunks, 1);
    assert_eq!(summary.termination, Termination::Exited(ExitOutcome::Code(0)));
    assert_eq!(RunReport::Finished(summary).exit_code(), 0);
    Ok(())
}

#[tokio::test]
async fn nonzero_exit_is_reported_as_data() -> TestResult {
    init_tracing();

    let cfg = ConfigFileBuilder::new().with_host("a.lan").build();
    let mut backend = ScriptedBackend::new(vec![RunEvent::Exited(ExitOutcome::Code(1))]);
    let mut out = Vec::new();

    let summary =
        with_timeout(execute(&cfg, &mut backend, &mut out, RunOptions::default())).await?;

    assert_eq!(String::from_utf8(out)?, "child process exited with code 1\n");
    assert_eq!(summary.stdout_chunks + summary.stderr_chunks, 0);
    assert_eq!(summary.termination.process_exit_code(), 1);
    Ok(())
}

#[tokio::test]
async fn empty_host_list_still_launches_with_empty_array() -> TestResult {
    init_tracing();

    let cfg = ConfigFileBuilder::new().executable("/usr/local/bin/freckles").build();
    let mut backend = ScriptedBackend::new(vec![RunEvent::Exited(ExitOutcome::Code(0))]);
    let launches = backend.launches();
    let mut out = Vec::new();

    with_timeout(execute(&cfg, &mut backend, &mut out, RunOptions::default())).await?;

    let guard = launches.lock().unwrap();
    assert_eq!(guard.len(), 1);
    assert_eq!(guard[0].program, "/usr/local/bin/freckles");
    assert_eq!(guard[0].payload, "[]");
    Ok(())
}

#[tokio::test]
async fn spawn_failure_is_returned_and_nothing_is_relayed() {
    init_tracing();

    let cfg = ConfigFileBuilder::new().with_host("a.lan").build();
    let mut backend = ScriptedBackend::failing();
    let mut out = Vec::new();

    let result =
        with_timeout(execute(&cfg, &mut backend, &mut out, RunOptions::default())).await;

    assert!(matches!(result, Err(FrecklaunchError::SpawnFailed { .. })));
    assert!(out.is_empty(), "no output expected after spawn failure");
}

#[tokio::test]
async fn frecklecute_envelope_and_login_flow_into_payload() -> TestResult {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_hosts(&["b.lan", "a.lan", "b.lan"])
        .login("deploy")
        .envelope("frecklecute")
        .build();

    let mut backend = ScriptedBackend::new(vec![RunEvent::Exited(ExitOutcome::Code(0))]);
    let launches = backend.launches();
    let mut out = Vec::new();

    with_timeout(execute(&cfg, &mut backend, &mut out, RunOptions::default())).await?;

    let payload = launches.lock().unwrap()[0].payload.clone();
    let value: serde_json::Value = serde_json::from_str(&payload)?;
    let targets: Vec<&str> = value
        .as_array()
        .ok_or("payload is not an array")?
        .iter()
        .filter_map(|item| item["frecklecute"]["target"].as_str())
        .collect();
    assert_eq!(targets, vec!["deploy@b.lan", "deploy@a.lan"]);
    Ok(())
}
