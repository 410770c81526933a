// Reject lint-suppression attributes ("#[" + "allow" + ...) in the disposal sources.
// This runs on every build, so a suppression cannot slip in through tests either.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    // Skipped only when explicitly disabled (CHECK_NO_ALLOW=0).
    if env::var("CHECK_NO_ALLOW")
        .map(|v| v == "0")
        .unwrap_or(false)
    {
        return;
    }

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("manifest dir"));
    let check_paths = ["src", "tests"];

    for relative in check_paths {
        println!("cargo:rerun-if-changed={relative}");
    }

    let mut violations = Vec::new();
    for relative in check_paths {
        let path = manifest_dir.join(relative);
        if path.exists() {
            scan_path(&path, &mut violations);
        }
    }

    if violations.is_empty() {
        return;
    }

    eprintln!("ERROR: disallowed allow-attributes detected in disposal:");
    for (file, line, content) in violations {
        eprintln!("  {}:{}: {}", file.display(), line, content.trim());
    }
    panic!("lint suppression attributes are forbidden");
}

fn scan_path(path: &Path, violations: &mut Vec<(PathBuf, usize, String)>) {
    const IGNORED_DIRS: [&str; 2] = ["target", ".git"];

    if path.is_dir() {
        if IGNORED_DIRS.iter().any(|&d| path.ends_with(d)) {
            return;
        }
        for entry in fs::read_dir(path).expect("read dir") {
            let entry = entry.expect("dir entry");
            scan_path(&entry.path(), violations);
        }
        return;
    }

    if path.extension().map_or(true, |ext| ext != "rs") {
        return;
    }

    if let Ok(content) = fs::read_to_string(path) {
        let needle = concat!("#[", "allow");
        let inner_needle = concat!("#![", "allow");
        for (idx, line) in content.lines().enumerate() {
            if line.contains(needle) || line.contains(inner_needle) {
                violations.push((path.to_path_buf(), idx + 1, line.to_string()));
            }
        }
    }
}
