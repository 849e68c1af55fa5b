//! Test helpers for writing plan inputs into temporary workspaces.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use haulroute_core::TruckProfile;
use tempfile::TempDir;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directories");
    }
    fs::write(path, contents).expect("write test file");
}

pub(super) fn write_profile(path: &Utf8Path, truck: &TruckProfile) {
    let payload = serde_json::to_string_pretty(truck).expect("serialize profile");
    write_utf8(path, payload.as_bytes());
}

/// Temporary directory exposed as a UTF-8 root.
pub(super) fn temp_root() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}
