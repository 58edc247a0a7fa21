use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "DOCPROBE_CONFIG";
pub const DATA_DIR_ENV: &str = "DOCPROBE_DATA_DIR";
pub const CONFIG_FILE: &str = "docprobe.json";

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppOptions {
    pub project_id: String,
    pub data_dir: PathBuf,
}

impl Default for AppOptions {
    fn default() -> AppOptions {
        AppOptions {
            project_id: "docprobe".to_string(),
            data_dir: PathBuf::from("docprobe-data"),
        }
    }
}

impl AppOptions {
    /// Options from `$DOCPROBE_CONFIG`, else `./docprobe.json` if present,
    /// else defaults; `$DOCPROBE_DATA_DIR` overrides the data directory.
    pub fn load() -> Result<AppOptions> {
        let config = env::var_os(CONFIG_ENV).map(PathBuf::from);
        let data_dir = env::var_os(DATA_DIR_ENV).map(PathBuf::from);
        AppOptions::resolve(config.as_deref(), data_dir)
    }

    pub fn resolve(config: Option<&Path>, data_dir: Option<PathBuf>) -> Result<AppOptions> {
        let mut options = match config {
            Some(path) => AppOptions::from_file(path)?,
            None if Path::new(CONFIG_FILE).is_file() => AppOptions::from_file(Path::new(CONFIG_FILE))?,
            None => AppOptions::default(),
        };

        if let Some(data_dir) = data_dir {
            options.data_dir = data_dir;
        }

        Ok(options)
    }

    pub fn from_file(path: &Path) -> Result<AppOptions> {
        let file = File::open(path)
            .with_context(|| format!("opening config file {}", path.display()))?;
        let options: AppOptions = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(options)
    }
}
