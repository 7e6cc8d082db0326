//! Locks the set of hash domains and where their bytes may be written.
//!
//! Every domain is `GES::<NAME>::V1\0` where `<NAME>` is the variant name in
//! upper snake case. Only `hash_domain.rs` may spell out a `b"GES::` literal.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use ges_kernel::proof::hash::canonical_hash;
use ges_kernel::proof::hash_domain::HashDomain;

/// Bump when a domain is added; a new domain is a wire-format change.
const DOMAIN_COUNT: usize = 9;

fn upper_snake(camel: &str) -> String {
    let mut out = String::new();
    for (i, c) in camel.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            out.push('_');
        }
        out.push(c.to_ascii_uppercase());
    }
    out
}

#[test]
fn domain_count_is_locked() {
    assert_eq!(HashDomain::ALL.len(), DOMAIN_COUNT);
}

#[test]
fn domain_bytes_match_variant_names() {
    for domain in HashDomain::ALL {
        let expected = format!("GES::{}::V1\0", upper_snake(&domain.to_string()));
        assert_eq!(
            domain.as_bytes(),
            expected.as_bytes(),
            "{domain} has unexpected prefix bytes"
        );
    }
}

#[test]
fn domain_bytes_are_distinct_and_not_prefixes_of_each_other() {
    let all: Vec<&[u8]> = HashDomain::ALL.iter().map(HashDomain::as_bytes).collect();
    let unique: BTreeSet<&[u8]> = all.iter().copied().collect();
    assert_eq!(unique.len(), all.len());
    for a in &all {
        for b in &all {
            if a != b {
                assert!(!b.starts_with(a), "{a:?} prefixes {b:?}");
            }
        }
    }
}

#[test]
fn each_domain_separates_the_same_payload() {
    let digests: BTreeSet<String> = HashDomain::ALL
        .iter()
        .map(|&d| canonical_hash(d, b"{}").as_str().to_string())
        .collect();
    assert_eq!(digests.len(), DOMAIN_COUNT);
}

fn rust_sources(root: &Path) -> Vec<PathBuf> {
    let mut pending = vec![root.to_path_buf()];
    let mut files = Vec::new();
    while let Some(dir) = pending.pop() {
        let entries = std::fs::read_dir(&dir).unwrap_or_else(|e| panic!("{}: {e}", dir.display()));
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|e| e == "rs") {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

#[test]
fn domain_literals_live_only_in_hash_domain_rs() {
    let workspace = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let mut offenders = Vec::new();
    for krate in ["kernel", "search", "harness"] {
        for file in rust_sources(&workspace.join(krate).join("src")) {
            if file.ends_with("proof/hash_domain.rs") {
                continue;
            }
            let text = std::fs::read_to_string(&file).unwrap();
            offenders.extend(
                text.lines()
                    .enumerate()
                    .filter(|(_, line)| {
                        let line = line.trim_start();
                        !line.starts_with("//") && line.contains("b\"GES::")
                    })
                    .map(|(n, _)| format!("{}:{}", file.display(), n + 1)),
            );
        }
    }
    assert!(offenders.is_empty(), "raw domain literals: {offenders:#?}");
}
