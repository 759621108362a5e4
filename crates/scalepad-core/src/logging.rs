//! Logging init (file under XDG state dir, or stderr fallback) and redaction
//! of credentials before they reach a log line.

use anyhow::Result;
use regex::Regex;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

pub const REDACTED: &str = "***REDACTED***";

/// Filter used when neither `RUST_LOG` nor the config's `log_level` is set.
pub const DEFAULT_FILTER: &str = "info,scalepad_core=debug";

/// Writer that is either a file or stderr (used when file clone fails).
enum FileOrStderr {
    File(std::fs::File),
    Stderr,
}

impl io::Write for FileOrStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrStderr::File(f) => f.write(buf),
            FileOrStderr::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrStderr::File(f) => f.flush(),
            FileOrStderr::Stderr => io::stderr().lock().flush(),
        }
    }
}

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Initialize structured logging to `~/.local/state/scalepad/scalepad.log`.
/// `RUST_LOG` wins over `default_filter`. On failure (e.g. log dir
/// unwritable), returns Err so the caller can fall back to stderr.
pub fn init_logging(default_filter: &str) -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("scalepad")?;
    let log_dir = xdg_dirs.get_state_home().join("scalepad");

    fs::create_dir_all(&log_dir)?;
    let log_file_path = log_dir.join("scalepad.log");

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    struct FileMakeWriter(std::fs::File);

    impl<'a> MakeWriter<'a> for FileMakeWriter {
        type Writer = FileOrStderr;

        fn make_writer(&'a self) -> Self::Writer {
            self.0
                .try_clone()
                .map(FileOrStderr::File)
                .unwrap_or(FileOrStderr::Stderr)
        }
    }

    let writer = BoxMakeWriter::new(FileMakeWriter(file));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    tracing::info!("scalepad logging initialized at {}", log_file_path.display());

    Ok(log_file_path)
}

/// Initialize logging to stderr only. Use when `init_logging` fails so the CLI
/// still reports problems.
pub fn init_logging_stderr(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

/// Replaces API-key-shaped tokens (four or more dash-separated groups of
/// eight hex digits, as a whole word) with [`REDACTED`].
pub fn redact_secrets(text: &str) -> String {
    api_key_pattern().replace_all(text, REDACTED).into_owned()
}

fn api_key_pattern() -> &'static Regex {
    static API_KEY: OnceLock<Regex> = OnceLock::new();
    API_KEY.get_or_init(|| {
        Regex::new(r"(?i)\b[a-f0-9]{8}(?:-[a-f0-9]{8}){3,}\b").expect("valid regex pattern")
    })
}

/// Copies `headers`, replacing values of credential-bearing headers (name
/// contains `key`, `token` or `secret`) with [`REDACTED`].
pub fn redact_headers(headers: &[(String, String)]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let lower = name.to_ascii_lowercase();
            let value = if ["key", "token", "secret"].iter().any(|s| lower.contains(s)) {
                REDACTED.to_string()
            } else {
                redact_secrets(value)
            };
            (name.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "c4d67eca-3b32ed26-b2412e47-2f634617-7e91a0f4-5c8d2b67-e3a19f0b-46d7c582";

    #[test]
    fn redacts_whole_api_keys() {
        assert_eq!(redact_secrets(KEY), REDACTED);
        assert_eq!(
            redact_secrets(&format!("using key {} for GET", KEY)),
            format!("using key {} for GET", REDACTED)
        );
        assert_eq!(
            redact_secrets("https://x.test/?k=C4D67ECA-3B32ED26-B2412E47-2F634617"),
            format!("https://x.test/?k={}", REDACTED)
        );
    }

    #[test]
    fn leaves_short_or_embedded_tokens() {
        let three = "c4d67eca-3b32ed26-b2412e47";
        assert_eq!(redact_secrets(three), three);
        let glued = format!("x{}", &KEY[..35]);
        assert_eq!(redact_secrets(&glued), glued);
        let uuid = "123e4567-e89b-12d3-a456-426614174000";
        assert_eq!(redact_secrets(uuid), uuid);
        assert_eq!(redact_secrets(""), "");
    }

    #[test]
    fn trailing_partial_group_is_kept() {
        let text = format!("{}-zz", &KEY[..35]);
        assert_eq!(redact_secrets(&text), format!("{}-zz", REDACTED));
    }

    #[test]
    fn redacts_every_key_in_a_line() {
        let lower = KEY.to_ascii_lowercase();
        let upper = KEY.to_ascii_uppercase();
        assert_eq!(
            redact_secrets(&format!("{} then {};", lower, upper)),
            format!("{} then {};", REDACTED, REDACTED)
        );
    }

    #[test]
    fn redacts_credential_headers() {
        let headers = vec![
            ("x-api-key".to_string(), "secret".to_string()),
            ("Authorization-Token".to_string(), "t".to_string()),
            ("content-type".to_string(), "application/json".to_string()),
        ];
        let redacted = redact_headers(&headers);
        assert_eq!(redacted[0].1, REDACTED);
        assert_eq!(redacted[1].1, REDACTED);
        assert_eq!(redacted[2].1, "application/json");
    }
}
