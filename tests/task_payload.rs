// tests/task_payload.rs

use std::error::Error;

use frecklaunch::task::{
    BASIC_HARDENING, Frecklet, TaskRecord, VarMap, VarValue, build_tasks, decode_payload,
    encode_payload,
};
use frecklaunch::types::Envelope;
use frecklaunch_test_utils::builders::ConfigFileBuilder;
use frecklaunch_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn single_host_payload_matches_wire_format() -> TestResult {
    init_tracing();

    let tasks = build_tasks(&["dev.cutecode.co"], "root", &Frecklet::default());
    let payload = encode_payload(&tasks, Envelope::Plain)?;

    assert_eq!(
        payload,
        r#"[{"target":"root@dev.cutecode.co","frecklet":"basic-hardening","vars":{"fail2ban":true,"ufw":true,"ufw_open_tcp":[80,443]}}]"#
    );
    Ok(())
}

#[test]
fn empty_host_list_encodes_as_empty_array() -> TestResult {
    let hosts: Vec<String> = Vec::new();
    let tasks = build_tasks(&hosts, "root", &Frecklet::default());

    assert!(tasks.is_empty());
    assert_eq!(encode_payload(&tasks, Envelope::Plain)?, "[]");
    assert_eq!(encode_payload(&tasks, Envelope::Frecklecute)?, "[]");
    Ok(())
}

#[test]
fn frecklecute_envelope_wraps_each_record() -> TestResult {
    let tasks = build_tasks(&["a", "b"], "root", &Frecklet::default());
    let payload = encode_payload(&tasks, Envelope::Frecklecute)?;

    let value: serde_json::Value = serde_json::from_str(&payload)?;
    let items = value.as_array().ok_or("payload is not an array")?;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["frecklecute"]["target"], "root@a");
    assert_eq!(items[1]["frecklecute"]["target"], "root@b");
    assert_eq!(items[1]["frecklecute"]["frecklet"], BASIC_HARDENING);

    assert_eq!(decode_payload(&payload, Envelope::Frecklecute)?, tasks);
    Ok(())
}

#[test]
fn custom_frecklet_round_trips_nested_values() -> TestResult {
    let mut env = VarMap::new();
    env.insert("TZ".to_string(), VarValue::Str("UTC".to_string()));

    let mut vars = VarMap::new();
    vars.insert("image".to_string(), VarValue::Str("nginx:stable".to_string()));
    vars.insert("replicas".to_string(), VarValue::Int(3));
    vars.insert("ratio".to_string(), VarValue::Float(0.5));
    vars.insert("env".to_string(), VarValue::Map(env));
    vars.insert(
        "ports".to_string(),
        VarValue::List(vec![VarValue::Int(8080), VarValue::Int(8443)]),
    );

    let frecklet = Frecklet::from_parts("docker-service", vars.clone())?;
    let tasks = build_tasks(&["x.lan", "y.lan"], "admin", &frecklet);
    let payload = encode_payload(&tasks, Envelope::Plain)?;

    let decoded: Vec<TaskRecord> = decode_payload(&payload, Envelope::Plain)?;
    assert_eq!(decoded, tasks);
    assert_eq!(decoded[1].target, "admin@y.lan");
    assert_eq!(decoded[1].vars, vars);
    Ok(())
}

#[test]
fn configured_vars_reach_the_payload() -> TestResult {
    let cfg = ConfigFileBuilder::new()
        .with_host("box.lan")
        .var("ufw_open_tcp", vec![22i64])
        .var("fail2ban", false)
        .build();

    let payload = frecklaunch::payload_for(&cfg)?;
    assert_eq!(
        payload,
        r#"[{"target":"root@box.lan","frecklet":"basic-hardening","vars":{"fail2ban":false,"ufw":true,"ufw_open_tcp":[22]}}]"#
    );
    Ok(())
}

#[test]
fn payload_with_wrong_envelope_fails_to_decode() {
    let tasks = build_tasks(&["a"], "root", &Frecklet::default());
    let payload = encode_payload(&tasks, Envelope::Frecklecute).unwrap();
    assert!(decode_payload(&payload, Envelope::Plain).is_err());
}
