use std::path::PathBuf;

/// Errors surfaced while loading configuration or starting audio playback.
///
/// Nothing in the per-frame path can fail; these only show up at startup
/// or when the audio layer swallows and logs them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid color {0:?}, expected #rrggbb or #rrggbbaa")]
    InvalidColor(String),

    #[cfg(feature = "playback")]
    #[error("no audio output: {0}")]
    Stream(#[from] rodio::StreamError),

    #[cfg(feature = "playback")]
    #[error("audio playback: {0}")]
    Play(#[from] rodio::PlayError),

    #[cfg(feature = "playback")]
    #[error("audio decode: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
}

pub type Result<T> = std::result::Result<T, Error>;
