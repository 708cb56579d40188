use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;

const ASSET_DIR: &str = "static";

/// Hash every file under `static/` into `STATIC_HASH`, which templates append
/// to asset URLs so browsers refetch after a deploy.
fn main() {
    println!("cargo:rerun-if-changed={ASSET_DIR}/");

    let mut files = Vec::new();
    collect_files(Path::new(ASSET_DIR), &mut files);
    files.sort();

    let mut hasher = DefaultHasher::new();
    for path in files {
        path.to_string_lossy().hash(&mut hasher);
        fs::read(&path)
            .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
            .hash(&mut hasher);
    }

    let hash = format!("{:016x}", hasher.finish());
    println!("cargo:rustc-env=STATIC_HASH={}", &hash[..8]);
}

fn collect_files(dir: &Path, out: &mut Vec<std::path::PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out);
        } else if path.is_file() {
            out.push(path);
        }
    }
}
