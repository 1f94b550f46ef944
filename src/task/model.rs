// src/task/model.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{FrecklaunchError, Result};

/// Name of the one operation we know the option schema of.
pub const BASIC_HARDENING: &str = "basic-hardening";

/// A single option value passed to a frecklet.
///
/// Untagged so it encodes as plain JSON (`true`, `443`, `"x"`, `[80, 443]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<VarValue>),
    Map(BTreeMap<String, VarValue>),
}

/// Option name -> value. Keys are unique and iterate in a stable order.
pub type VarMap = BTreeMap<String, VarValue>;

/// One unit of work for the external tool.
///
/// This is the wire shape; it is built once per host and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub target: String,
    pub frecklet: String,
    pub vars: VarMap,
}

/// Options of the `basic-hardening` frecklet.
///
/// Options we don't model are kept in `extra` and passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicHardening {
    #[serde(default = "default_true")]
    pub fail2ban: bool,

    #[serde(default = "default_true")]
    pub ufw: bool,

    #[serde(default = "default_open_tcp")]
    pub ufw_open_tcp: Vec<u16>,

    #[serde(flatten)]
    pub extra: VarMap,
}

fn default_true() -> bool {
    true
}

fn default_open_tcp() -> Vec<u16> {
    vec![80, 443]
}

impl Default for BasicHardening {
    fn default() -> Self {
        Self {
            fail2ban: default_true(),
            ufw: default_true(),
            ufw_open_tcp: default_open_tcp(),
            extra: VarMap::new(),
        }
    }
}

/// The operation every task in a run performs.
#[derive(Debug, Clone, PartialEq)]
pub enum Frecklet {
    BasicHardening(BasicHardening),
    /// Any other operation; its options are owned by the external tool and
    /// are not checked here.
    Custom { name: String, vars: VarMap },
}

impl Default for Frecklet {
    fn default() -> Self {
        Frecklet::BasicHardening(BasicHardening::default())
    }
}

impl Frecklet {
    /// Build a frecklet from its name and untyped options, checking the
    /// options of operations we have a schema for.
    pub fn from_parts(name: &str, vars: VarMap) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(FrecklaunchError::ConfigError(format!(
                "invalid frecklet name '{name}'"
            )));
        }

        for (key, value) in vars.iter() {
            ensure_json_safe(key, value)?;
        }

        if name != BASIC_HARDENING {
            return Ok(Frecklet::Custom {
                name: name.to_string(),
                vars,
            });
        }

        let value = serde_json::to_value(&vars)?;
        let opts: BasicHardening = serde_json::from_value(value).map_err(|e| {
            FrecklaunchError::ConfigError(format!("invalid {BASIC_HARDENING} vars: {e}"))
        })?;

        if opts.ufw_open_tcp.contains(&0) {
            return Err(FrecklaunchError::ConfigError(format!(
                "invalid {BASIC_HARDENING} vars: port 0 in ufw_open_tcp"
            )));
        }

        Ok(Frecklet::BasicHardening(opts))
    }

    pub fn name(&self) -> &str {
        match self {
            Frecklet::BasicHardening(_) => BASIC_HARDENING,
            Frecklet::Custom { name, .. } => name,
        }
    }

    /// Options as they go on the wire.
    pub fn vars(&self) -> VarMap {
        match self {
            Frecklet::BasicHardening(opts) => {
                let mut vars = opts.extra.clone();
                vars.insert("fail2ban".to_string(), VarValue::Bool(opts.fail2ban));
                vars.insert("ufw".to_string(), VarValue::Bool(opts.ufw));
                vars.insert(
                    "ufw_open_tcp".to_string(),
                    VarValue::List(
                        opts.ufw_open_tcp
                            .iter()
                            .map(|p| VarValue::Int(i64::from(*p)))
                            .collect(),
                    ),
                );
                vars
            }
            Frecklet::Custom { vars, .. } => vars.clone(),
        }
    }
}

/// JSON has no NaN or infinity; serde_json would silently write `null`.
fn ensure_json_safe(path: &str, value: &VarValue) -> Result<()> {
    match value {
        VarValue::Float(f) if !f.is_finite() => Err(FrecklaunchError::ConfigError(format!(
            "var '{path}': non-finite number {f} has no JSON form"
        ))),
        VarValue::List(items) => items
            .iter()
            .enumerate()
            .try_for_each(|(i, item)| ensure_json_safe(&format!("{path}[{i}]"), item)),
        VarValue::Map(map) => map
            .iter()
            .try_for_each(|(key, item)| ensure_json_safe(&format!("{path}.{key}"), item)),
        _ => Ok(()),
    }
}
