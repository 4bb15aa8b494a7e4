//! Layered YAML configuration for the `rc-daemon` and `rc-worker` binaries.
//!
//! Each process has a compiled-in default document; an optional on-disk file
//! is deep-merged on top of it. This mirrors the original Viper-based
//! `LoadApi`/`LoadWorker` loaders, simplified to two layers since this
//! workspace has no secrets-resolution or multi-environment concept to add
//! beyond what the two config structs already express.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

const API_DEFAULTS_YAML: &str = r#"
app:
  env: debug
  port: 8080
storage:
  type: memory
  database:
    dsn: ""
"#;

const WORKER_DEFAULTS_YAML: &str = r#"
storage:
  type: memory
  database:
    dsn: ""
limit:
  cpu: 1.0
  memory: 512
  time: 10.0
process: 1
name: "default name"
compiler_image: "gcc:14"
size: 65536
"#;

#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    pub env: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSection {
    #[serde(default)]
    pub dsn: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub database: DatabaseSection,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self { dsn: String::new() }
    }
}

impl StorageSection {
    pub fn is_database(&self) -> bool {
        self.kind == "database"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitSection {
    pub cpu: f64,
    pub memory: i64,
    pub time: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub app: AppSection,
    pub storage: StorageSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    pub storage: StorageSection,
    pub limit: LimitSection,
    pub process: u32,
    pub name: String,
    pub compiler_image: String,
    /// Reserved code-size limit in bytes. Accepted and stored; not enforced
    /// by the sandbox pipeline (see DESIGN.md open-question decision).
    pub size: i64,
}

impl ApiConfig {
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        load_layered(API_DEFAULTS_YAML, override_path)
    }
}

impl WorkerConfig {
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        load_layered(WORKER_DEFAULTS_YAML, override_path)
    }
}

fn load_layered<T: for<'de> Deserialize<'de>>(
    defaults_yaml: &str,
    override_path: Option<&Path>,
) -> Result<T> {
    let default_val: serde_yaml::Value =
        serde_yaml::from_str(defaults_yaml).context("parse built-in config defaults")?;
    let mut merged = serde_json::to_value(default_val).context("defaults yaml->json")?;

    if let Some(path) = override_path {
        if path.exists() {
            let s = fs::read_to_string(path)
                .with_context(|| format!("read config: {}", path.display()))?;
            let yaml_val: serde_yaml::Value =
                serde_yaml::from_str(&s).with_context(|| format!("parse yaml: {}", path.display()))?;
            let json_val = serde_json::to_value(yaml_val).context("yaml->json conversion failed")?;
            deep_merge(&mut merged, json_val);
        }
    }

    serde_json::from_value(merged).context("config does not match the expected shape")
}

/// Deep-merge: objects merge recursively; arrays and scalars are overwritten.
fn deep_merge(dst: &mut Value, src: Value) {
    match (dst, src) {
        (Value::Object(dst_map), Value::Object(src_map)) => {
            for (k, v) in src_map {
                match dst_map.get_mut(&k) {
                    Some(existing) => deep_merge(existing, v),
                    None => {
                        dst_map.insert(k, v);
                    }
                }
            }
        }
        (dst_slot, src_val) => {
            *dst_slot = src_val;
        }
    }
}
