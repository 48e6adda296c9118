use std::env;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::time::{timeout, Duration};
use tracing::{error, info, warn};

use crate::sanitize;

pub const GENERATE_TIMEOUT: Duration = Duration::from_secs(120);
pub const LIST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum OllamaError {
	#[error("ollama binary not found, is it installed?")]
	NotFound,
	#[error("ollama did not answer within the time limit")]
	Timeout,
	#[error("ollama exited with an error: {0}")]
	Failed(String),
	#[error("ollama returned no text")]
	Empty,
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

/// Locate the ollama command, also without PATH: launcher environments on
/// macOS often have the install locations but no shell profile.
pub fn find_binary() -> Option<PathBuf> {
	let mut candidates = vec![
		PathBuf::from("/usr/local/bin/ollama"),
		PathBuf::from("/opt/homebrew/bin/ollama"),
	];
	if let Ok(home) = env::var("HOME") {
		candidates.push(PathBuf::from(home).join(".ollama").join("bin").join("ollama"));
	}
	for candidate in candidates {
		if candidate.is_file() {
			return Some(candidate);
		}
	}

	let path_env = env::var_os("PATH")?;
	for dir in env::split_paths(&path_env) {
		let candidate = dir.join("ollama");
		if candidate.is_file() {
			return Some(candidate);
		}
	}
	None
}

pub fn build_prompt(instruction: &str, keywords: &str) -> String {
	format!("{}\n{}", instruction.trim(), keywords.trim())
}

/// `ollama list` prints a header row, then one model per line with the
/// name in the first column.
pub fn parse_model_listing(stdout: &str) -> Vec<String> {
	stdout
		.trim()
		.lines()
		.skip(1)
		.filter_map(|line| line.split_whitespace().next())
		.map(str::to_string)
		.collect()
}

pub async fn list_models() -> Result<Vec<String>, OllamaError> {
	let binary = find_binary().ok_or(OllamaError::NotFound)?;
	let (status, stdout, stderr) = run_command(&binary, &["list"], LIST_TIMEOUT).await?;
	if !status.success() {
		error!("listing models failed: {}", stderr.trim());
		return Err(OllamaError::Failed(stderr.trim().to_string()));
	}
	let models = parse_model_listing(&stdout);
	if models.is_empty() {
		warn!("no models found");
	} else {
		info!("{} models found", models.len());
	}
	Ok(models)
}

/// Run the model over instruction + keywords and return the sanitized
/// output. Any failure (missing binary, non-zero exit, timeout, empty
/// payload) comes back as an error and never as partial text.
pub async fn generate(instruction: &str, keywords: &str, model: &str) -> Result<String, OllamaError> {
	let binary = find_binary().ok_or(OllamaError::NotFound)?;
	let prompt = build_prompt(instruction, keywords);
	info!("generating with model '{}' ({} prompt bytes)", model, prompt.len());

	let (status, stdout, stderr) = run_command(&binary, &["run", model, prompt.as_str()], GENERATE_TIMEOUT).await?;
	if !status.success() {
		error!("generation failed: {}", stderr.trim());
		return Err(OllamaError::Failed(stderr.trim().to_string()));
	}

	let text = sanitize::clean_generated(&stdout);
	if text.is_empty() {
		return Err(OllamaError::Empty);
	}
	Ok(text)
}

/// Spawn the command with piped output and wait for it within `time_limit`.
/// On expiry the child is terminated before the error is returned.
pub(crate) async fn run_command(
	binary: &Path,
	cmd_args: &[&str],
	time_limit: Duration,
) -> Result<(ExitStatus, String, String), OllamaError> {
	let mut child = Command::new(binary)
		.args(cmd_args)
		.stdin(Stdio::null())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.spawn()?;

	let mut stdout_pipe = child.stdout.take().ok_or_else(|| OllamaError::Failed("stdout not piped".to_string()))?;
	let mut stderr_pipe = child.stderr.take().ok_or_else(|| OllamaError::Failed("stderr not piped".to_string()))?;

	let read_fut = async {
		let mut stdout = String::new();
		let mut stderr = String::new();
		tokio::try_join!(
			stdout_pipe.read_to_string(&mut stdout),
			stderr_pipe.read_to_string(&mut stderr),
		)?;
		Ok::<(String, String), std::io::Error>((stdout, stderr))
	};

	match timeout(time_limit, read_fut).await {
		Ok(Ok((stdout, stderr))) => {
			let status = child.wait().await?;
			Ok((status, stdout, stderr))
		}
		Ok(Err(err)) => {
			terminate_child_gracefully(&mut child).await;
			Err(err.into())
		}
		Err(_) => {
			error!("command timed out after {:?}", time_limit);
			terminate_child_gracefully(&mut child).await;
			Err(OllamaError::Timeout)
		}
	}
}

async fn terminate_child_gracefully(child: &mut Child) {
	let _ = child.start_kill();
	match timeout(Duration::from_secs(1), child.wait()).await {
		Ok(Ok(_status)) => {}
		Ok(Err(_e)) => {
			let _ = child.kill().await;
		}
		Err(_) => {
			let _ = child.kill().await;
			let _ = child.wait().await;
		}
	}
}
