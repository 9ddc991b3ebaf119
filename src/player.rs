//! Playback engine: the transport state machine and the audio output it
//! drives.
//!
//! The controller owns the output exclusively; collaborators observe it via
//! drained [`PlayerEvent`]s and the read-only sample tap.

mod backend;
mod controller;
mod session;
mod stream;

pub use backend::{AudioBackend, PlaybackError, SampleTap};
pub use controller::{PlaybackController, PlayerEvent};
pub use session::{PlaybackSession, TransportState};
pub use stream::StreamBackend;

#[cfg(test)]
mod tests;
