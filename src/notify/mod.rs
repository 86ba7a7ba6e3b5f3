// src/notify/mod.rs
pub mod email;

use anyhow::Result;

pub use email::EmailSender;

/// Best-effort delivery of one (subject, body) pair. Failures are
/// returned to the caller, never swallowed; the engine decides what to
/// record regardless of the outcome.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str) -> Result<()>;
}

// --- Test helper ---
pub struct MemoryNotifier {
    pub sent: std::sync::Mutex<Vec<(String, String)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self {
            sent: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl Default for MemoryNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
        Ok(())
    }
}
