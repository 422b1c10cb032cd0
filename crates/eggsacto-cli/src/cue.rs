//! Terminal completion cue: bell, optional sound asset, optional haptic buzz.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use eggsacto_core::{CompletionCue, Config};
use tokio::task::JoinHandle;

/// Sound file contents, read on first use and kept until release.
///
/// The bytes are never decoded. A terminal only has the bell, so holding the
/// file proves it is readable and marks the acquired resource; the audible
/// cue is always [`ring_bell`].
struct SoundAsset {
    path: PathBuf,
    bytes: Vec<u8>,
}

pub struct TerminalCue {
    enabled: bool,
    sound_path: Option<PathBuf>,
    sound: Option<SoundAsset>,
    haptic_repeats: u32,
    haptic_interval: Duration,
    haptics: Option<JoinHandle<()>>,
}

impl TerminalCue {
    pub fn from_config(config: &Config) -> Self {
        Self {
            enabled: config.notifications.sound_enabled,
            sound_path: config.notifications.sound_path.as_ref().map(PathBuf::from),
            sound: None,
            haptic_repeats: config.notifications.haptic_repeats,
            haptic_interval: config.haptic_interval(),
            haptics: None,
        }
    }

    fn load_sound(&mut self) {
        if self.sound.is_some() {
            return;
        }
        let Some(path) = self.sound_path.clone() else {
            return;
        };
        match std::fs::read(&path) {
            Ok(bytes) => {
                tracing::debug!(path = %path.display(), bytes = bytes.len(), "sound asset loaded");
                self.sound = Some(SoundAsset { path, bytes });
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "sound asset unavailable, using bell");
                // Don't retry on every expiry.
                self.sound_path = None;
            }
        }
    }

    fn spawn_haptics(&mut self) {
        if self.haptic_repeats == 0 {
            return;
        }
        if let Some(previous) = self.haptics.take() {
            previous.abort();
        }
        let repeats = self.haptic_repeats;
        let interval = self.haptic_interval;
        self.haptics = Some(tokio::spawn(async move {
            for pulse in 1..=repeats {
                tokio::time::sleep(interval).await;
                tracing::debug!(pulse, "haptic pulse");
                ring_bell();
            }
        }));
    }
}

/// On stderr, so JSON output on stdout stays parseable.
fn ring_bell() {
    let mut out = std::io::stderr();
    if let Err(e) = out.write_all(b"\x07").and_then(|_| out.flush()) {
        tracing::warn!(error = %e, "failed to ring terminal bell");
    }
}

impl CompletionCue for TerminalCue {
    fn play(&mut self) {
        if self.enabled {
            self.load_sound();
            if let Some(sound) = &self.sound {
                tracing::info!(path = %sound.path.display(), bytes = sound.bytes.len(), "completion sound");
            }
            // Terminals have one built-in sound.
            ring_bell();
        } else {
            tracing::debug!("completion sound disabled");
        }
        self.spawn_haptics();
    }

    fn release(&mut self) {
        if let Some(sound) = self.sound.take() {
            tracing::debug!(path = %sound.path.display(), "sound asset released");
        }
        if let Some(haptics) = self.haptics.take() {
            haptics.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sound_is_swallowed() {
        let mut config = Config::default();
        config.notifications.sound_path = Some("/definitely/not/here.aif".into());
        let mut cue = TerminalCue::from_config(&config);
        cue.play();
        assert!(cue.sound.is_none());
        assert!(cue.sound_path.is_none());
        cue.release();
        cue.release();
    }

    #[test]
    fn sound_is_loaded_lazily_and_released() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("explosion-mono.aif");
        std::fs::write(&path, b"FORM").unwrap();
        let mut config = Config::default();
        config.notifications.sound_path = Some(path.display().to_string());

        let mut cue = TerminalCue::from_config(&config);
        assert!(cue.sound.is_none());
        cue.play();
        assert_eq!(cue.sound.as_ref().map(|s| s.bytes.len()), Some(4));
        cue.release();
        assert!(cue.sound.is_none());
    }

    #[tokio::test]
    async fn haptics_run_in_background_and_abort_on_release() {
        let mut config = Config::default();
        config.notifications.haptic_repeats = 3;
        config.notifications.haptic_interval_ms = 60_000;
        let mut cue = TerminalCue::from_config(&config);
        cue.play();
        // play() returned without waiting out the pulses.
        let handle = cue.haptics.take().unwrap();
        assert!(!handle.is_finished());
        cue.haptics = Some(handle);
        cue.release();
        assert!(cue.haptics.is_none());
    }
}
