#![allow(dead_code)]

use parking_lot::Mutex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Process environment is global; tests that touch `PRESENCE_*` take this lock.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with the given variables set (`Some`) or removed (`None`), restoring the
/// previous values afterwards, including on panic.
pub fn with_presence_env<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock();
    let _restore = EnvRestore::apply(vars);
    f()
}

struct EnvRestore(Vec<(String, Option<String>)>);

impl EnvRestore {
    fn apply(vars: &[(&str, Option<&str>)]) -> Self {
        let previous = vars
            .iter()
            .map(|(key, _)| (key.to_string(), std::env::var(key).ok()))
            .collect();
        for (key, value) in vars {
            set_or_remove(key, value.as_deref());
        }
        Self(previous)
    }
}

impl Drop for EnvRestore {
    fn drop(&mut self) {
        for (key, value) in self.0.iter().rev() {
            set_or_remove(key, value.as_deref());
        }
    }
}

fn set_or_remove(key: &str, value: Option<&str>) {
    match value {
        Some(value) => std::env::set_var(key, value),
        None => std::env::remove_var(key),
    }
}

/// A CSV source written to a temporary file.
pub struct CsvFixture {
    file: NamedTempFile,
}

impl CsvFixture {
    pub fn new(lines: &[&str]) -> Self {
        let mut file = NamedTempFile::new().expect("create temp csv");
        for line in lines {
            writeln!(file, "{}", line).expect("write temp csv");
        }
        file.flush().expect("flush temp csv");
        Self { file }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Replace the file contents in place.
    pub fn rewrite(&self, lines: &[&str]) {
        let mut body = lines.join("\n");
        body.push('\n');
        fs::write(self.file.path(), body).expect("rewrite temp csv");
    }
}

/// Path of a file under `runtime/data`.
pub fn runtime_data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("runtime")
        .join("data")
        .join(name)
}
