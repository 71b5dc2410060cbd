//! Input adapters: path cleanup, image decoding, audio probing and tool locations.

/// Still image decoding and resizing.
pub mod decode;
/// Audio probing through `ffprobe`.
pub mod media;
/// Input path cleanup and existence checks.
pub mod path;
/// External binary locations.
pub mod tools;
