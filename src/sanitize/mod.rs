//! Post-processing applied to generated text before it is shown or stored.

/// Fixed transform sequence, in this order: trim surrounding whitespace,
/// drop one trailing "\n." artifact, strip one leading and one trailing
/// double quote. Not configurable.
pub fn clean_generated(text: &str) -> String {
	let mut out = text.trim().to_string();
	if let Some(stripped) = out.strip_suffix("\n.") {
		out = stripped.trim_end().to_string();
	}
	if let Some(stripped) = out.strip_prefix('"') {
		out = stripped.to_string();
	}
	if let Some(stripped) = out.strip_suffix('"') {
		out = stripped.to_string();
	}
	out
}

/// Replace line breaks with spaces so the text fits in one history row.
pub fn collapse_newlines(text: &str) -> String {
	text.replace("\r\n", " ").replace('\n', " ").replace('\r', " ")
}

/// The cleanup-pass version of quote/comma stripping: whitespace, then any
/// surrounding quotes, then trailing commas, then surrounding quotes again
/// (a quote exposed by a removed comma goes too).
pub fn strip_field_artifacts(text: &str) -> String {
	text.trim()
		.trim_matches('"')
		.trim_end_matches(',')
		.trim_matches('"')
		.to_string()
}
