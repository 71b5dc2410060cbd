//! Frame sinks: the encoder contract, an in-memory sink, and the `ffmpeg` MP4 sink.

/// `ffmpeg` subprocess sink.
pub mod ffmpeg;
/// Sink trait and in-memory implementation.
pub mod sink;
