use std::env;
use std::path::PathBuf;

use capvalis::config::{read_config, Config};

use crate::CFG_FILE_NAME;

fn get_config_path() -> Option<PathBuf> {
    let exe_dir = env::current_exe().ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()));
    let cur_dir = env::current_dir().ok();

    [exe_dir, cur_dir, dirs::config_dir()]
        .into_iter()
        .flatten()
        .map(|dir| dir.join(CFG_FILE_NAME))
        .find(|path| path.exists())
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Capvalis")
}

pub fn default_log_location() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("Capvalis")
        .join("log")
        .join("capvalis.log")
}

pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<Config, String> {
    let config_path = match cfg_path.or_else(get_config_path) {
        Some(path) => path,
        None => return Ok(Config::with_data_dir(default_data_dir())),
    };

    read_config(&config_path).map_err(|e| e.to_string())
}
