//! Input discovery for the process command
//!
//! Expands the positional inputs (files, directories, glob patterns) into a
//! sorted, de-duplicated list of sounding files and derives collision-free
//! output stems for them.

use crate::constants::SOUNDING_EXTENSIONS;
use anyhow::{Context, Result};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Expand inputs into sounding files
///
/// Explicit files are taken as given regardless of extension. Directories are
/// walked recursively for the known sounding extensions. Anything containing
/// `*`, `?` or `[` is treated as a glob pattern.
pub fn resolve_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for input in inputs {
        let path = Path::new(input);

        if path.is_file() {
            files.insert(path.to_path_buf());
        } else if path.is_dir() {
            let found = discover_sounding_files(path)?;
            if found.is_empty() {
                warn!("No sounding files found in {}", path.display());
            }
            files.extend(found);
        } else if is_glob_pattern(input) {
            let matches = glob::glob(input)
                .with_context(|| format!("Invalid glob pattern '{}'", input))?;
            let mut matched = 0;
            for entry in matches {
                let entry = entry.with_context(|| format!("Failed to read match for '{}'", input))?;
                if entry.is_file() {
                    files.insert(entry);
                    matched += 1;
                }
            }
            if matched == 0 {
                warn!("Pattern '{}' matched no files", input);
            }
        } else {
            anyhow::bail!("Input does not exist: {}", input);
        }
    }

    if files.is_empty() {
        anyhow::bail!("No sounding files found in the given inputs");
    }

    debug!("Resolved {} sounding files", files.len());
    Ok(files.into_iter().collect())
}

/// Recursively find files with a sounding extension below `dir`
pub fn discover_sounding_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if entry.file_type().is_file() && has_sounding_extension(entry.path()) {
            found.push(entry.into_path());
        }
    }

    found.sort();
    Ok(found)
}

fn has_sounding_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SOUNDING_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// Output stem per file; repeated stems get the lowest free numeric suffix
///
/// A suffixed candidate that is already taken, including by another file's
/// own stem, is skipped.
pub fn output_stems(files: &[PathBuf]) -> Vec<String> {
    let bases: Vec<String> = files
        .iter()
        .map(|file| {
            file.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "sounding".to_string())
        })
        .collect();

    let mut taken: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();

    bases
        .into_iter()
        .map(|base| {
            if taken.insert(base.clone()) {
                return base;
            }
            let suffix = next_suffix.entry(base.clone()).or_insert(2);
            loop {
                let candidate = format!("{}_{}", base, suffix);
                *suffix += 1;
                if taken.insert(candidate.clone()) {
                    return candidate;
                }
            }
        })
        .collect()
}
