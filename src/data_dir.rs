use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "NOTELENS_DATA_DIR";

#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Resolve the data directory from, in order of priority:
    /// 1. An explicit path (from --data-dir)
    /// 2. The NOTELENS_DATA_DIR environment variable
    /// 3. The XDG data directory (~/.local/share/notelens/)
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let root = if let Some(path) = explicit {
            path.to_path_buf()
        } else if let Ok(val) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(val)
        } else {
            xdg::BaseDirectories::with_prefix("notelens")
                .get_data_home()
                .ok_or_else(|| {
                    Error::Config(
                        "could not determine XDG data home directory".into(),
                    )
                })?
        };

        std::fs::create_dir_all(&root)
            .map_err(|_| Error::DataDir(root.clone()))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The archive index exported alongside the note pages.
    pub fn corpus_file(&self) -> PathBuf {
        self.root.join("files_info.json")
    }

    /// Folder to domain rules for attachment links. Optional.
    pub fn host_rules_file(&self) -> PathBuf {
        self.root.join("attachment_hosts.json")
    }

    /// Topic tag rules replacing the built-in set. Optional.
    pub fn tag_rules_file(&self) -> PathBuf {
        self.root.join("tag_rules.json")
    }
}
