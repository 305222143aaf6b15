#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tempfile::TempDir;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

fn config_dir() -> &'static Path {
    static CONFIG_DIR: OnceLock<TempDir> = OnceLock::new();
    CONFIG_DIR
        .get_or_init(|| tempfile::tempdir().expect("failed to create config dir for tests"))
        .path()
}

/// Create a `urlregen` command isolated from the user's configuration.
#[allow(dead_code)]
pub fn urlregen_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("urlregen"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env_remove("URLREGEN_CONFIG");
    cmd.env_remove("URLREGEN_CATALOG");
    cmd.env_remove("URLREGEN_INVALIDATE_BATCH_SIZE");
    cmd.env_remove("URLREGEN_OUTPUT_FORMAT");
    cmd.env("URLREGEN_CONFIG_DIR", config_dir());
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Two storefronts: 101 and 102 in both, 102 disabled in `fr`, 101 renamed in `fr`.
#[allow(dead_code)]
pub fn shop() -> Value {
    json!({
        "stores": [
            { "id": 0, "code": "admin", "name": "Admin" },
            { "id": 1, "code": "default", "name": "Main Store" },
            { "id": 2, "code": "fr", "name": "French Store" }
        ],
        "products": [
            {
                "id": 101, "sku": "TEE-BLUE", "name": "Blue Tee", "url_key": "blue-tee",
                "status": "enabled", "visibility": "catalog_search", "store_ids": [1, 2],
                "overrides": { "2": { "url_key": "tee-bleu" } }
            },
            {
                "id": 102, "sku": "MUG-RED", "name": "Red Mug", "url_key": "red-mug",
                "status": "enabled", "visibility": "catalog", "store_ids": [1, 2],
                "overrides": { "2": { "status": "disabled" } }
            },
            {
                "id": 103, "sku": "CAP-HIDDEN", "name": "Hidden Cap", "url_key": "hidden-cap",
                "status": "enabled", "visibility": "not_visible", "store_ids": [1]
            }
        ],
        "url_rewrites": []
    })
}

/// Write `snapshot` as `catalog.json` under `dir`.
#[allow(dead_code)]
pub fn write_catalog(dir: &Path, snapshot: &Value) -> PathBuf {
    let path = dir.join("catalog.json");
    std::fs::write(&path, serde_json::to_vec_pretty(snapshot).unwrap()).unwrap();
    path
}

/// Parse the catalog file back into JSON.
#[allow(dead_code)]
pub fn read_catalog(path: &Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

/// Sorted `(store_id, request_path)` pairs of a catalog file.
#[allow(dead_code)]
pub fn rewrite_paths(path: &Path) -> Vec<(u64, String)> {
    let catalog = read_catalog(path);
    let mut paths: Vec<(u64, String)> = catalog["url_rewrites"]
        .as_array()
        .unwrap()
        .iter()
        .map(|rewrite| {
            (
                rewrite["store_id"].as_u64().unwrap(),
                rewrite["request_path"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    paths.sort();
    paths
}
