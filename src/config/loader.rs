use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{Error, Result};

use super::{Config, CONFIG_DIR_NAME, CONFIG_FILE_NAME};

const HEADER: &str = "# port-finder config\n";

pub fn load_or_default() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        let cfg = Config::default();
        cfg.save_to_path(&path)?;
        super::validate(&cfg)?;
        return Ok(cfg);
    }
    load_from_path(&path)
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        let cfg = Config::default();
        super::validate(&cfg)?;
        return Ok(cfg);
    }

    let raw = fs::read_to_string(path)?;
    parse(&raw)
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(config)?;
    fs::write(path, format!("{HEADER}{body}"))?;
    Ok(())
}

pub fn parse(raw: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(raw)?;
    super::validate(&cfg)?;
    Ok(cfg)
}

pub fn config_path() -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| Error::InvalidArgs("HOME not set; cannot locate config directory".into()))?;
    Ok(home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
