use bytes::Bytes;
use futures::{Stream, StreamExt, stream};
use std::time::Duration;

/// Adapts a synthesized frame sequence into a paced byte stream.
///
/// Pacing only spaces out delivery; it carries no correctness weight, and
/// tests run with a zero delay. Dropping the stream (client disconnect)
/// stops production at the current frame.
pub fn paced_stream(
    frames: Vec<String>,
    delay: Duration,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
    stream::iter(frames).then(move |frame| async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(Bytes::from(frame))
    })
}
