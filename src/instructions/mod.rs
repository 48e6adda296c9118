use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Read the instruction file: UTF-8 text, one instruction per blank-line
/// separated block. A missing or unreadable file yields an empty list and
/// the caller decides how to report it.
pub fn read_instructions(path: &Path) -> Vec<String> {
	let content = match fs::read_to_string(path) {
		Ok(content) => content,
		Err(err) => {
			warn!("could not read instructions file '{}': {}", path.display(), err);
			return Vec::new();
		}
	};

	let normalized = content.replace("\r\n", "\n");
	let instructions: Vec<String> = normalized
		.split("\n\n")
		.map(str::trim)
		.filter(|block| !block.is_empty())
		.map(str::to_string)
		.collect();

	info!("read {} instructions from '{}'", instructions.len(), path.display());
	instructions
}
