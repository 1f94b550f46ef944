// src/task/builder.rs

use std::collections::HashSet;

use crate::task::model::{Frecklet, TaskRecord};

/// Build one task record per host, in input order.
///
/// Each record targets `login@host` and carries the same operation and
/// options. An empty host list yields an empty task list.
pub fn build_tasks<S: AsRef<str>>(hosts: &[S], login: &str, frecklet: &Frecklet) -> Vec<TaskRecord> {
    let name = frecklet.name();
    let vars = frecklet.vars();

    hosts
        .iter()
        .map(|host| TaskRecord {
            target: format!("{login}@{}", host.as_ref()),
            frecklet: name.to_string(),
            vars: vars.clone(),
        })
        .collect()
}

/// Drop repeated hosts, keeping the first occurrence of each.
pub fn dedupe_hosts<S: AsRef<str>>(hosts: &[S]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    hosts
        .iter()
        .map(|h| h.as_ref())
        .filter(|h| seen.insert(*h))
        .map(str::to_string)
        .collect()
}
