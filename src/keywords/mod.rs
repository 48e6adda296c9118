use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::helpers::{self, AppError};

/// Normalize keyword entries: lowercase, trimmed, one trailing comma
/// removed, always ending in a period. Duplicates collapse and the result
/// comes back sorted. Blank lines are dropped.
pub fn normalize_entries<'a, I>(lines: I) -> Vec<String>
where
	I: IntoIterator<Item = &'a str>,
{
	let mut entries = BTreeSet::new();
	for line in lines {
		let mut entry = line.to_lowercase().trim().to_string();
		if entry.is_empty() {
			continue;
		}
		if let Some(stripped) = entry.strip_suffix(',') {
			entry = stripped.trim_end().to_string();
		}
		if !entry.ends_with('.') {
			entry.push('.');
		}
		entries.insert(entry);
	}
	entries.into_iter().collect()
}

/// Rewrite the file in place with its normalized entries, one per line.
pub fn normalize_file(path: &Path) -> Result<usize, AppError> {
	let content = fs::read_to_string(path)?;
	let entries = normalize_entries(content.lines());

	let mut output = String::new();
	for entry in &entries {
		output.push_str(entry);
		output.push('\n');
	}
	helpers::write_atomic(path, &output)?;

	info!("'{}' rewritten with {} entries", path.display(), entries.len());
	Ok(entries.len())
}
