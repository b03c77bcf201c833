use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub(crate) const DB_ENV: &str = "DAYCARE_LEDGER_DB";
pub(crate) const USER_ENV: &str = "DAYCARE_LEDGER_USER";
const DB_FILE: &str = "daycare-ledger.db";

/// Runtime settings taken from the environment.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Settings {
    pub(crate) db_path: PathBuf,
    /// Recorded as `createdBy`; `None` marks entries as system-generated.
    pub(crate) acting_user: Option<i64>,
}

impl Settings {
    pub(crate) fn load() -> Result<Self> {
        let db_override = std::env::var(DB_ENV).ok();
        let user = std::env::var(USER_ENV).ok();

        let db_path = match db_override.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => default_db_path()?,
        };
        Self::resolve(db_path, user.as_deref())
    }

    pub(crate) fn resolve(db_path: PathBuf, user: Option<&str>) -> Result<Self> {
        let acting_user = parse_user(user)?;
        Ok(Self {
            db_path,
            acting_user,
        })
    }
}

fn parse_user(raw: Option<&str>) -> Result<Option<i64>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(id) => id
            .parse::<i64>()
            .map(Some)
            .with_context(|| format!("{USER_ENV} must be a numeric user id, got '{id}'")),
    }
}

fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "daycare-ledger", "DaycareLedger")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    ensure_dir(data_dir)?;
    Ok(data_dir.join(DB_FILE))
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create data directory: {}", dir.display()))
}
