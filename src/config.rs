use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_RECENT_COUNT: usize = 3;

#[derive(Deserialize, Debug)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub template_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug)]
pub struct Defaults {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_recent_count")]
    pub recent_count: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            page_size: DEFAULT_PAGE_SIZE,
            recent_count: DEFAULT_RECENT_COUNT,
        }
    }
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_recent_count() -> usize {
    DEFAULT_RECENT_COUNT
}

#[derive(Deserialize, Debug)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone, Debug, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub paths: Paths,
    #[serde(default)]
    pub defaults: Defaults,
    pub log: Option<Log>,
}

impl Config {
    /// Configuration used when no file is found.
    pub fn with_data_dir(data_dir: PathBuf) -> Config {
        Config {
            paths: Paths {
                data_dir,
                template_dir: None,
            },
            defaults: Defaults::default(),
            log: None,
        }
    }
}

fn parse_path(path: PathBuf) -> io::Result<PathBuf> {
    if !path.starts_with("${exe_dir}") {
        return Ok(path);
    }

    let cur_exe = env::current_exe()?;
    let exe_dir = cur_exe.parent()
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "Executable has no parent directory"))?;
    let relative = path.strip_prefix("${exe_dir}")
        .map_err(|e| io::Error::new(ErrorKind::InvalidInput, e.to_string()))?;
    Ok(exe_dir.join(relative))
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        data_dir: parse_path(cfg.paths.data_dir)?,
        template_dir: cfg.paths.template_dir.map(parse_path).transpose()?,
    };

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}
