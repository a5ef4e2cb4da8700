//! Background track state, shared between the waveform indicator and the
//! player. The host window is the only writer.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::RwLock;
use rand::{Rng, SeedableRng, rngs::StdRng};

pub type SharedAudio = Arc<RwLock<AudioState>>;

pub struct AudioState {
    playing: bool,
    tracks: Vec<PathBuf>,
    current: Option<usize>,
    rng: StdRng,
}

impl AudioState {
    pub fn new(tracks: Vec<PathBuf>) -> Self {
        Self::with_rng(tracks, StdRng::from_entropy())
    }

    pub fn with_rng(tracks: Vec<PathBuf>, rng: StdRng) -> Self {
        let mut state = Self {
            playing: false,
            tracks,
            current: None,
            rng,
        };
        state.reset_track();
        state
    }

    pub fn shared(self) -> SharedAudio {
        Arc::new(RwLock::new(self))
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    pub fn tracks(&self) -> &[PathBuf] {
        &self.tracks
    }

    pub fn current_track(&self) -> Option<&Path> {
        self.current.map(|i| self.tracks[i].as_path())
    }

    /// Picks a random track; repeats are allowed.
    pub fn reset_track(&mut self) {
        self.current = if self.tracks.is_empty() {
            None
        } else {
            Some(self.rng.gen_range(0..self.tracks.len()))
        };
    }
}

#[cfg(feature = "playback")]
pub use player::Player;

#[cfg(feature = "playback")]
mod player {
    use std::{fs::File, io::BufReader, path::PathBuf};

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

    use super::AudioState;
    use crate::error::{Error, Result};

    /// Plays whatever track [`AudioState`] points at while its flag is set.
    ///
    /// Failures never reach the caller: a missing device, file or codec is
    /// logged and the indicator simply keeps animating without sound.
    pub struct Player {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sink: Option<Sink>,
        loaded: Option<PathBuf>,
    }

    impl Player {
        pub fn new() -> Option<Self> {
            match Self::open() {
                Ok(player) => Some(player),
                Err(err) => {
                    log::warn!("audio disabled: {err}");
                    None
                }
            }
        }

        fn open() -> Result<Self> {
            let (stream, handle) = OutputStream::try_default()?;
            Ok(Self {
                _stream: stream,
                handle,
                sink: None,
                loaded: None,
            })
        }

        /// Brings the output in line with `state`. Cheap when nothing changed.
        pub fn sync(&mut self, state: &AudioState) {
            if !state.is_playing() {
                if let Some(sink) = self.sink.take() {
                    sink.stop();
                }
                self.loaded = None;
                return;
            }

            let Some(track) = state.current_track() else {
                return;
            };
            if self.loaded.as_deref() == Some(track) {
                return;
            }

            // remember the attempt so a broken file isn't retried every frame
            self.loaded = Some(track.to_path_buf());
            if let Err(err) = self.start(track.to_path_buf()) {
                log::warn!("could not play {}: {err}", track.display());
            }
        }

        fn start(&mut self, path: PathBuf) -> Result<()> {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
            let file = File::open(&path).map_err(|source| Error::Io { path, source })?;
            let source = Decoder::new(BufReader::new(file))?;
            let sink = Sink::try_new(&self.handle)?;
            sink.append(source);
            self.sink = Some(sink);
            Ok(())
        }
    }
}
