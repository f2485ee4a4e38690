use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct BestScoreRecord {
    version: u32,
    best_score: u32,
}

impl Default for BestScoreRecord {
    fn default() -> Self {
        Self {
            version: 1,
            best_score: 0,
        }
    }
}

/// Persistent best score. The game proceeds on a zero baseline whenever the
/// record is missing or unreadable, and write failures never surface to the
/// caller's control flow.
#[derive(Debug, Clone)]
pub struct BestScoreStore {
    path: PathBuf,
}

impl BestScoreStore {
    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("NULLSUM_BEST_SCORE_PATH") {
            return Self {
                path: PathBuf::from(explicit),
            };
        }

        let base = std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".local");
                    p.push("share");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("nullsum");
        path.push("best_score.json");
        Self { path }
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn best(&self) -> u32 {
        load_record(&self.path).unwrap_or_default().best_score
    }

    /// Records `final_score` if it beats the stored best. Returns whether it
    /// did; ties are not a new best.
    pub fn maybe_record_score(&self, final_score: u32) -> bool {
        let best = self.best();
        if final_score <= best {
            return false;
        }
        let record = BestScoreRecord {
            version: 1,
            best_score: final_score,
        };
        let _ = save_record(&self.path, &record);
        true
    }
}

fn load_record(path: &Path) -> io::Result<BestScoreRecord> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn save_record(path: &Path, record: &BestScoreRecord) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let json = serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".to_string());
    atomic_write(path, json.as_bytes())
}

fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    match fs::rename(&tmp, path) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(&tmp, path)?;
            let _ = fs::remove_file(&tmp);
            Ok(())
        }
    }
}
