// Discovery of numbered frame sequences on disk

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

use super::frame_id::split_numbered;
use crate::config::SequenceConfig;

/// File stems of every `*.<extension>` directly inside `dir`, sorted.
pub fn frame_names(dir: &Path, extension: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to scan {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches_ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
            .unwrap_or(false);
        if !matches_ext {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Groups numbered names by prefix and digit count. Each group starts at
/// its lowest number.
pub fn group_sequences(names: &[String]) -> Vec<SequenceConfig> {
    let mut groups: BTreeMap<(String, usize), u32> = BTreeMap::new();
    for name in names {
        let Some((prefix, n, digits)) = split_numbered(name) else {
            continue;
        };
        groups
            .entry((prefix.to_string(), digits))
            .and_modify(|start| *start = (*start).min(n))
            .or_insert(n);
    }

    groups
        .into_iter()
        .map(|((prefix, padding), start)| SequenceConfig {
            prefix,
            start,
            padding,
        })
        .collect()
}
