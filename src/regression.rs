//! Frame-hash regression helpers.
//!
//! A scripted playtest produces one serialized `GameState` per step; hashing
//! each snapshot gives a compact fingerprint of the whole run that can be
//! compared across machines and commits. Goldens live under
//! `tests/goldens/` and are regenerated with `NULLSUM_UPDATE_GOLDENS=1`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::state::GameState;

/// Environment flag helper: accepts `1/true/yes/on` (case-insensitive).
pub fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// If set, regression tests may rewrite golden files in place.
pub fn update_goldens_enabled() -> bool {
    env_flag("NULLSUM_UPDATE_GOLDENS")
}

/// sha256 over the canonical JSON encoding of a game state.
pub fn state_hash_hex(state: &GameState) -> serde_json::Result<String> {
    let bytes = serde_json::to_vec(state)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrameHashGolden {
    pub version: u32,
    pub name: String,
    pub seed: u64,
    pub hash_alg: String,
    /// One hash per scripted step.
    pub hashes: Vec<String>,
}

impl FrameHashGolden {
    pub fn new(name: impl Into<String>, seed: u64, hashes: Vec<String>) -> Self {
        Self {
            version: 1,
            name: name.into(),
            seed,
            hash_alg: "sha256".to_string(),
            hashes,
        }
    }
}

pub fn golden_path(name: &str) -> PathBuf {
    let base: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("goldens")
        .join(format!("{base}.json"))
}

pub fn load_golden_json(path: impl AsRef<Path>) -> io::Result<FrameHashGolden> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("failed parsing golden json {}: {e}", path.display()),
        )
    })
}

pub fn save_golden_json(path: impl AsRef<Path>, golden: &FrameHashGolden) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(golden)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, text)
}
