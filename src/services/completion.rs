//! Completion-effect collaborator: what happens audibly when a countdown ends

use std::io::Write;

use tokio::{process::Command, runtime::Handle};
use tracing::{debug, info, warn};

/// Side effect played once per completed countdown.
///
/// Implementations must not fail the caller; problems are logged and swallowed.
pub trait CompletionEffect: Send {
    fn play(&self);
}

/// Rings the terminal bell
#[derive(Debug, Default, Clone)]
pub struct TerminalBell;

impl CompletionEffect for TerminalBell {
    fn play(&self) {
        info!("Time's up!");
        let mut stdout = std::io::stdout();
        if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            warn!("Failed to ring terminal bell: {}", e);
        }
    }
}

/// Runs a user-supplied shell command, e.g. an audio player pointed at an alarm sound
#[derive(Debug, Clone)]
pub struct CommandEffect {
    command: String,
}

impl CommandEffect {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl CompletionEffect for CommandEffect {
    fn play(&self) {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No async runtime available, skipping alarm command");
                return;
            }
        };

        let command = self.command.clone();
        handle.spawn(async move {
            debug!("Running alarm command: {}", command);
            match Command::new("sh").arg("-c").arg(&command).output().await {
                Ok(output) if output.status.success() => {
                    info!("Alarm command finished");
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!("Alarm command failed ({}): {}", output.status, stderr.trim());
                }
                Err(e) => warn!("Failed to execute alarm command: {}", e),
            }
        });
    }
}

/// Silent completion
#[derive(Debug, Default, Clone)]
pub struct NoEffect;

impl CompletionEffect for NoEffect {
    fn play(&self) {
        debug!("Completion effect disabled");
    }
}
