use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use spdlog::debug;

pub const POSTS_KEY: &str = "capvalis_blog_posts";

/// Named, durable key/value slots. Each `set` replaces the whole value.
pub trait Storage {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// Keeps one `<key>.json` file per slot inside `root_dir`.
pub struct FileStorage {
    root_dir: PathBuf,
}

impl FileStorage {
    pub fn new(root_dir: &Path) -> FileStorage {
        FileStorage {
            root_dir: root_dir.to_path_buf(),
        }
    }

    fn slot_path(&self, key: &str) -> io::Result<PathBuf> {
        let valid = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(io::Error::new(ErrorKind::InvalidInput, format!("Invalid slot name {}", key)));
        }
        Ok(self.root_dir.join(format!("{}.json", key)))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io::Error::new(e.kind(), format!("Error reading slot {}: {}", path.display(), e))),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.root_dir)?;

        // Readers only ever see the previous or the new snapshot
        let tmp_path = path.with_extension("json.tmp");
        if let Err(e) = write_and_replace(&tmp_path, &path, value) {
            let _ = fs::remove_file(&tmp_path);
            return Err(io::Error::new(e.kind(), format!("Error writing slot {}: {}", path.display(), e)));
        }

        debug!("Slot {} written ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let path = self.slot_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

fn write_and_replace(tmp_path: &Path, path: &Path, value: &str) -> io::Result<()> {
    let mut file = fs::File::create(tmp_path)?;
    file.write_all(value.as_bytes())?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp_path, path)
}

/// Non-durable slots, for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStorage {
    slots: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.slots.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}
