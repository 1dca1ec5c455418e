use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use crate::widget::DEFAULT_HISTORY_KEY;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Chat Endpoint Args ---
    /// URL the chat messages are POSTed to
    #[arg(long, env = "CHAT_ENDPOINT_URL", default_value = "http://127.0.0.1:8080/api/gemini-chat")]
    pub endpoint_url: String,

    /// Give up on a request after this many seconds. Unset means wait forever.
    #[arg(long, env = "CHAT_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    // --- Storage Args ---
    /// Session storage backend for the conversation (memory, file)
    #[arg(long, env = "SESSION_STORE", default_value = "memory")]
    pub session_store: String,

    /// Directory for the file session backend. Defaults to a folder in the system temp dir.
    #[arg(long, env = "SESSION_DIR")]
    pub session_dir: Option<PathBuf>,

    /// Storage key holding the serialized conversation.
    #[arg(long, env = "HISTORY_KEY", default_value = DEFAULT_HISTORY_KEY)]
    pub history_key: String,

    /// Directory for durable preferences (theme).
    #[arg(long, env = "PREFS_DIR", default_value = ".gemini-chat")]
    pub prefs_dir: String,

    // --- Display Args ---
    /// Characters shown before a long bubble is collapsed behind /more
    #[arg(long, env = "PREVIEW_LEN", default_value = "280")]
    pub preview_len: usize,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

impl Args {
    pub fn session_dir(&self) -> PathBuf {
        self.session_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("gemini-chat"))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.filter(|s| *s > 0).map(Duration::from_secs)
    }
}
