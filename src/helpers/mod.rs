#![allow(dead_code)]
#![allow(unused_imports)]

use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::string;
use std::sync::Mutex;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum AppError {
	#[error("IO error: {0}")]
	Io(#[from] io::Error),
	#[error("Serde error: {0}")]
	Serde(#[from] serde_json::Error),
	#[error("FromUtf8 error: {0}")]
	FromUtf8Error(#[from] string::FromUtf8Error),
	#[error("{0}")]
	Message(String),
}

impl AppError {
	pub fn msg<M: Into<String>>(msg: M) -> Self {
		AppError::Message(msg.into())
	}
}

pub fn config_get_dir(name: Option<&str>) -> Result<PathBuf, io::Error> {
	let xdg_config_home_env = env::var("XDG_CONFIG_HOME");
	let mut pb = if let Ok(config_home) = xdg_config_home_env {
		PathBuf::from(config_home)
	} else {
		let home_env = env::var("HOME");
		if let Ok(home) = home_env {
			let mut config_home = PathBuf::from(home);
			config_home.push(".config");
			config_home
		} else {
			return Err(io::Error::new(io::ErrorKind::Other, "XDG_CONFIG_HOME or HOME not found"))
		}
	};
	if let Some(app_name) = name {
		pb.push(app_name);
	}
	Ok(pb)
}

pub fn data_get_dir(name: Option<&str>) -> Result<PathBuf, io::Error> {
	let xdg_data_home_env = env::var("XDG_DATA_HOME");
	let mut pb = if let Ok(data_home) = xdg_data_home_env {
		PathBuf::from(data_home)
	} else {
		let home_env = env::var("HOME");
		if let Ok(home) = home_env {
			let mut data_home = PathBuf::from(home);
			data_home.push(".local");
			data_home.push("share");
			data_home
		} else {
			return Err(io::Error::new(io::ErrorKind::Other, "XDG_DATA_HOME or HOME not found"))
		}
	};
	if let Some(app_name) = name {
		pb.push(app_name);
	}
	Ok(pb)
}

pub fn config_load<T: DeserializeOwned>(app_name: &str, config_name: &str) -> Result<T, AppError> {
	let mut config_file = config_get_dir(Some(app_name))?;
	config_file.push(config_name.to_string() + ".json");
	let mut file = File::open(&config_file)?;
	let mut content = String::new();
	file.read_to_string(&mut content)?;
	let parsed: T = serde_json::from_str(&content)?;
	Ok(parsed)
}

/// Set up the file log. The log file is opened in append mode so repeated
/// runs share one file; failing to open it must not stop the tool.
pub fn init_logging(log_file: &Path) {
	let file = match OpenOptions::new().create(true).append(true).open(log_file) {
		Ok(file) => file,
		Err(_) => return,
	};
	let _ = tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
		.with_writer(Mutex::new(file))
		.with_ansi(false)
		.try_init();
}

const MAX_READ_BYTES: usize = 32_768;

pub fn read_stdin() -> Result<String, AppError> {
	let mut stdin = io::stdin();

	let mut buffer = Vec::with_capacity(MAX_READ_BYTES);
	stdin.by_ref().take(MAX_READ_BYTES as u64).read_to_end(&mut buffer)?;

	if buffer.len() == buffer.capacity() {
		let mut extra = [0u8; 1];
		let extra_read = stdin.read(&mut extra)?;
		if extra_read != 0 {
			return Err(AppError::msg("Input too large"));
		}
	}

	Ok(String::from_utf8(buffer)?)
}

/// Write `content` to a sibling temp file and move it over `path`, so an
/// interrupted write can never leave a half-written file at `path`.
pub fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
	let mut tmp_name = path.as_os_str().to_owned();
	tmp_name.push(".tmp");
	let tmp_path = PathBuf::from(tmp_name);

	let mut file = File::create(&tmp_path)?;
	file.write_all(content.as_bytes())?;
	file.sync_all()?;
	drop(file);

	if let Err(err) = replace_file(&tmp_path, path) {
		let _ = fs::remove_file(&tmp_path);
		return Err(err);
	}
	Ok(())
}

/// Move a file from `src` to `dst`.
/// - First tries `fs::rename` (fast, atomic on same filesystem).
/// - If that fails (commonly cross-filesystem), falls back to copying then removing the source.
pub fn replace_file(src: &Path, dst: &Path) -> io::Result<()> {
	match fs::rename(src, dst) {
		Ok(()) => Ok(()),
		Err(_) => {
			fs::copy(src, dst)?;
			if let Err(remove_err) = fs::remove_file(src) {
				let _ = fs::remove_file(dst);
				return Err(remove_err);
			}
			Ok(())
		}
	}
}

/// Hand `text` to $VISUAL/$EDITOR through a temp file. Returns None when the
/// editor exits non-zero, which callers treat as "do not save".
pub fn edit_in_editor(text: &str) -> Result<Option<String>, AppError> {
	let editor = env::var("VISUAL")
		.or_else(|_| env::var("EDITOR"))
		.unwrap_or_else(|_| "vi".to_string());

	let mut tmp = NamedTempFile::new()?;
	tmp.write_all(text.as_bytes())?;
	tmp.flush()?;

	let status = process::Command::new(&editor).arg(tmp.path()).status()?;
	if !status.success() {
		return Ok(None);
	}

	let mut content = String::new();
	File::open(tmp.path())?.read_to_string(&mut content)?;
	Ok(Some(content))
}
