pub mod body;
pub mod events;

pub use body::paced_stream;
pub use events::{STREAM_TERMINATOR, synthesize_frames};
