use std::io;
use std::process::{Child, Command, Stdio};

use engine_logging::{engine_debug, engine_warn};

/// External audio player fed with a stream URL. At most one child runs.
pub struct AudioPlayer {
    command: Vec<String>,
    current: Option<Playing>,
}

struct Playing {
    filename: String,
    child: Child,
}

impl AudioPlayer {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            current: None,
        }
    }

    /// Stop whatever is playing and start `stream_url`.
    pub fn play(&mut self, filename: &str, stream_url: &str) -> io::Result<()> {
        self.stop();
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no player configured"))?;

        let child = Command::new(program)
            .args(args)
            .arg(stream_url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        engine_debug!("Player pid={} playing {}", child.id(), filename);
        self.current = Some(Playing {
            filename: filename.to_string(),
            child,
        });
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(mut playing) = self.current.take() {
            if let Err(err) = playing.child.kill() {
                engine_debug!("Player already gone: {}", err);
            }
            let _ = playing.child.wait();
        }
    }

    /// Filename of a track whose player exited by itself since the last call.
    pub fn poll_finished(&mut self) -> Option<String> {
        let playing = self.current.as_mut()?;
        match playing.child.try_wait() {
            Ok(None) => None,
            Ok(Some(status)) => {
                if !status.success() {
                    engine_warn!("Player exited with {} for {}", status, playing.filename);
                }
                self.current.take().map(|p| p.filename)
            }
            Err(err) => {
                engine_warn!("Could not query player: {}", err);
                self.current.take().map(|p| p.filename)
            }
        }
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_fails_to_start() {
        let mut player = AudioPlayer::new(vec!["tubedrop-no-such-player".to_string()]);
        assert!(player.play("a.mp3", "http://127.0.0.1:5000/play-audio/a.mp3").is_err());
        assert_eq!(player.poll_finished(), None);
    }

    #[test]
    fn empty_command_is_rejected() {
        let mut player = AudioPlayer::new(Vec::new());
        let err = player.play("a.mp3", "http://x/a.mp3").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[cfg(unix)]
    #[test]
    fn short_lived_player_reports_finish() {
        let mut player = AudioPlayer::new(vec!["true".to_string()]);
        player.play("a.mp3", "ignored").unwrap();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        let mut finished = None;
        while finished.is_none() && std::time::Instant::now() < deadline {
            finished = player.poll_finished();
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert_eq!(finished.as_deref(), Some("a.mp3"));
    }
}
