//! Source lines stay within rustfmt's default 100-column width.

use std::path::{Path, PathBuf};

const MAX_WIDTH: usize = 100;

fn rust_sources(root: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(root) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            rust_sources(&path, files);
        } else if path.extension().is_some_and(|e| e == "rs") {
            files.push(path);
        }
    }
}

#[test]
fn no_line_exceeds_max_width() {
    let workspace = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let mut files = Vec::new();
    for dir in ["kernel/src", "search/src", "harness/src", "benchmarks", "tests/lock"] {
        rust_sources(&workspace.join(dir), &mut files);
    }
    assert!(!files.is_empty());

    let mut offenders = Vec::new();
    for file in &files {
        let text = std::fs::read_to_string(file).unwrap();
        for (n, line) in text.lines().enumerate() {
            let width = line.chars().count();
            if width > MAX_WIDTH {
                offenders.push(format!("{}:{} ({width})", file.display(), n + 1));
            }
        }
    }
    assert!(offenders.is_empty(), "over {MAX_WIDTH} columns: {offenders:#?}");
}
