// src/task/mod.rs

//! Task records for the external tool.
//!
//! - [`model`] defines the wire record and the typed frecklet layer.
//! - [`builder`] maps a host list to task records.
//! - [`payload`] turns task records into the JSON argument and back.

pub mod builder;
pub mod model;
pub mod payload;

pub use builder::{build_tasks, dedupe_hosts};
pub use model::{BASIC_HARDENING, BasicHardening, Frecklet, TaskRecord, VarMap, VarValue};
pub use payload::{decode_payload, encode_payload};
