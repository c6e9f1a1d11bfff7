//! Playback boundary.
//!
//! Decoding and mixing belong to the host. The engine only needs to hand a
//! clip and a start offset to an [`AudioBackend`] and remember where a
//! paused clip should resume.

use std::sync::Arc;

use log::debug;

use crate::error::AudioError;

/// A decoded clip, shared between every source that plays it.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    path: Arc<str>,
}

impl AudioClip {
    pub fn new(path: impl AsRef<str>) -> Self {
        Self {
            path: Arc::from(path.as_ref()),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

pub trait AudioBackend {
    fn decode(&mut self, path: &str) -> Result<AudioClip, AudioError>;
    /// Starts `clip` at `offset` seconds into it.
    fn start(&mut self, clip: &AudioClip, offset: f64);
    fn stop(&mut self, clip: &AudioClip);
}

/// Backend that plays nothing and logs what it would have played.
#[derive(Debug, Default, Clone)]
pub struct LogAudioBackend {
    started: usize,
    stopped: usize,
    last_started: Option<String>,
}

impl LogAudioBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) -> usize {
        self.started
    }

    pub fn stopped(&self) -> usize {
        self.stopped
    }

    pub fn last_started(&self) -> Option<&str> {
        self.last_started.as_deref()
    }
}

impl AudioBackend for LogAudioBackend {
    fn decode(&mut self, path: &str) -> Result<AudioClip, AudioError> {
        if path.trim().is_empty() {
            return Err(AudioError::EmptyPath);
        }
        Ok(AudioClip::new(path))
    }

    fn start(&mut self, clip: &AudioClip, offset: f64) {
        debug!("audio: start {} at {offset:.3}s", clip.path());
        self.started += 1;
        self.last_started = Some(clip.path().to_string());
    }

    fn stop(&mut self, clip: &AudioClip) {
        debug!("audio: stop {}", clip.path());
        self.stopped += 1;
    }
}

/// Play/pause/stop state for one clip.
///
/// Times passed in are seconds on any monotonic clock, usually
/// [`Time::elapsed`](crate::time::Time::elapsed).
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSource {
    clip: AudioClip,
    start_time: f64,
    pause_offset: f64,
    playing: bool,
}

impl AudioSource {
    pub fn new(clip: AudioClip) -> Self {
        Self {
            clip,
            start_time: 0.0,
            pause_offset: 0.0,
            playing: false,
        }
    }

    pub fn from_file(backend: &mut dyn AudioBackend, path: &str) -> Result<Self, AudioError> {
        Ok(Self::new(backend.decode(path)?))
    }

    pub fn clip(&self) -> &AudioClip {
        &self.clip
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Offset into the clip where the next `play` resumes.
    pub fn pause_offset(&self) -> f64 {
        self.pause_offset
    }

    /// Plays from the last pause point, or from the start after `stop`.
    /// Playing an already playing source restarts it at the same offset.
    pub fn play(&mut self, backend: &mut dyn AudioBackend, now: f64) {
        if self.playing {
            backend.stop(&self.clip);
        }
        backend.start(&self.clip, self.pause_offset);
        self.start_time = now;
        self.playing = true;
    }

    pub fn pause(&mut self, backend: &mut dyn AudioBackend, now: f64) {
        if !self.playing {
            return;
        }
        backend.stop(&self.clip);
        self.pause_offset += (now - self.start_time).max(0.0);
        self.playing = false;
    }

    pub fn stop(&mut self, backend: &mut dyn AudioBackend) {
        if self.playing {
            backend.stop(&self.clip);
        }
        self.start_time = 0.0;
        self.pause_offset = 0.0;
        self.playing = false;
    }
}
