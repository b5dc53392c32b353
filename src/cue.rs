//! Audio cue
//!
//! The alarm sound played when a period starts and ends. Playback is
//! fire-and-forget: the player runs as a detached child process and the
//! timer never waits for it to finish.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command as TokioCommand;

use crate::error::TimerError;

/// Sound formats the alarm file may use
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["wav", "mp3", "ogg"];

/// Something that can play the period boundary alert
pub trait Cue {
    /// Start playing the alert without waiting for it to finish
    fn play(&self) -> Result<()>;
}

/// Plays a sound file through an external player command
#[derive(Debug, Clone)]
pub struct CommandCue {
    program: String,
    args: Vec<String>,
    sound: PathBuf,
}

impl CommandCue {
    /// Check that the sound file can be used and prepare the player command.
    ///
    /// `player` is a whitespace-separated command line; the sound path is
    /// appended as its last argument on every play.
    pub fn load<P: AsRef<Path>>(sound: P, player: &str) -> Result<Self, TimerError> {
        let sound = sound.as_ref().to_path_buf();
        let unavailable = |reason: String| TimerError::CueUnavailable {
            path: sound.clone(),
            reason,
        };

        let extension = sound
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(unavailable(format!(
                "unsupported format, expected one of: {}",
                SUPPORTED_EXTENSIONS.join(", ")
            )));
        }

        if sound.is_dir() {
            return Err(unavailable("is a directory".to_string()));
        }
        File::open(&sound).map_err(|e| unavailable(e.to_string()))?;

        let mut words = player.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .ok_or_else(|| TimerError::InvalidPlayer(player.to_string()))?;

        Ok(Self {
            program,
            args: words.collect(),
            sound,
        })
    }

    /// Build the player command for one playback
    #[must_use]
    pub fn command(&self) -> TokioCommand {
        let mut cmd = TokioCommand::new(&self.program);
        cmd.args(&self.args)
            .arg(&self.sound)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl Cue for CommandCue {
    fn play(&self) -> Result<()> {
        // The child is dropped without waiting; tokio reaps it in the background
        self.command()
            .spawn()
            .with_context(|| format!("Failed to start sound player '{}'", self.program))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sound_file(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"RIFF").unwrap();
        path
    }

    #[test]
    fn test_load_accepts_supported_formats() {
        let tmp = TempDir::new().unwrap();
        for name in ["bell.wav", "bell.mp3", "bell.ogg", "BELL.MP3"] {
            let path = sound_file(&tmp, name);
            let cue = CommandCue::load(&path, "aplay -q").unwrap();
            let cmd = cue.command();
            assert_eq!(cmd.as_std().get_args().last(), Some(path.as_os_str()));
        }
    }

    #[test]
    fn test_load_rejects_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = CommandCue::load(tmp.path().join("ship-bell.mp3"), "afplay").unwrap_err();
        assert!(matches!(err, TimerError::CueUnavailable { .. }));
    }

    #[test]
    fn test_load_rejects_unsupported_format() {
        let tmp = TempDir::new().unwrap();
        let path = sound_file(&tmp, "bell.flac");
        let err = CommandCue::load(&path, "afplay").unwrap_err();
        assert!(err.to_string().contains("unsupported format"));
    }

    #[test]
    fn test_load_rejects_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("sounds.wav");
        std::fs::create_dir(&dir).unwrap();
        assert!(CommandCue::load(&dir, "afplay").is_err());
    }

    #[test]
    fn test_load_rejects_empty_player() {
        let tmp = TempDir::new().unwrap();
        let path = sound_file(&tmp, "bell.wav");
        let err = CommandCue::load(&path, "   ").unwrap_err();
        assert!(matches!(err, TimerError::InvalidPlayer(_)));
    }

    #[test]
    fn test_command_appends_sound_path() {
        let tmp = TempDir::new().unwrap();
        let path = sound_file(&tmp, "bell.mp3");
        let cue = CommandCue::load(&path, "ffplay -nodisp -autoexit").unwrap();

        let cmd = cue.command();
        let std_cmd = cmd.as_std();
        assert_eq!(std_cmd.get_program(), "ffplay");
        let args: Vec<_> = std_cmd.get_args().collect();
        assert_eq!(args.len(), 3);
        assert_eq!(args[0], "-nodisp");
        assert_eq!(args[1], "-autoexit");
        assert_eq!(args[2], path.as_os_str());
    }

    #[tokio::test]
    async fn test_play_does_not_wait_for_player() {
        let tmp = TempDir::new().unwrap();
        let path = sound_file(&tmp, "bell.wav");
        // ${IFS} keeps "sleep 5" a single word for the player command line
        let cue = CommandCue::load(&path, "sh -c sleep${IFS}5").unwrap();

        let start = std::time::Instant::now();
        cue.play().unwrap();
        assert!(start.elapsed() < std::time::Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_play_reports_missing_player() {
        let tmp = TempDir::new().unwrap();
        let path = sound_file(&tmp, "bell.wav");
        let cue = CommandCue::load(&path, "nightshade-no-such-player").unwrap();

        let err = cue.play().unwrap_err();
        assert!(err.to_string().contains("nightshade-no-such-player"));
    }
}
