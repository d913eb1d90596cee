//! Env-File Preprocessing
//!
//! Loads `.env`-style files from a workspace root into the process
//! environment so `${VAR}` placeholders can resolve. Pure preprocessing; the
//! resolver itself only ever reads the process environment.

use std::path::Path;

/// Files considered, in load order. Later files override earlier ones.
pub const ENV_FILE_NAMES: [&str; 4] = [".env", ".env.local", ".env.development", ".env.production"];

/// Load every env file present under `root`; returns how many were loaded.
///
/// Missing files are skipped silently; unreadable or malformed files are
/// logged and skipped.
pub fn load_env_files(root: &Path) -> usize {
    let mut loaded = 0;

    for name in ENV_FILE_NAMES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }

        match dotenvy::from_path_override(&path) {
            Ok(()) => {
                loaded += 1;
                tracing::info!(file = %path.display(), "loaded environment variables");
            }
            Err(err) => {
                tracing::warn!(file = %path.display(), error = %err, "failed to load env file");
            }
        }
    }

    if loaded == 0 {
        tracing::debug!(root = %root.display(), "no env files found");
    }

    loaded
}
