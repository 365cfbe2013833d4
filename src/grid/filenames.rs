//! Expand file patterns with `*` and `?` wildcards
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Match `name` against a pattern where `*` matches any sequence
/// and `?` any single character.
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();
    let (mut pi, mut ni) = (0, 0);
    // Position of the last `*` and the name index it was tried at
    let mut star: Option<(usize, usize)> = None;
    while ni < n.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == n[ni]) {
            pi += 1;
            ni += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ni));
            pi += 1;
        } else if let Some((sp, sn)) = star {
            pi = sp + 1;
            ni = sn + 1;
            star = Some((sp, sn + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|c| *c == '*')
}

/// Files matching `pattern`, sorted by path.
///
/// Wildcards are honoured in the file name component only.
///
/// # Errors
/// Nothing matches, or the directory can not be read.
pub fn expand(pattern: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(pattern);
    let file_pattern = match path.file_name().and_then(|f| f.to_str()) {
        Some(f) => f,
        None => return Err(Error::NoMatchingFiles(pattern.to_owned())),
    };
    if !file_pattern.contains(|c: char| c == '*' || c == '?') {
        return if path.is_file() {
            Ok(vec![path.to_path_buf()])
        } else {
            Err(Error::NoMatchingFiles(pattern.to_owned()))
        };
    }

    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(_) => return Err(Error::NoMatchingFiles(pattern.to_owned())),
    };
    let mut matches = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        if let Some(name) = name.to_str() {
            if wildcard_match(file_pattern, name) && entry.path().is_file() {
                matches.push(dir.join(name));
            }
        }
    }
    if matches.is_empty() {
        return Err(Error::NoMatchingFiles(pattern.to_owned()));
    }
    matches.sort();
    Ok(matches)
}
