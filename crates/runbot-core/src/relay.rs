//! Incremental republishing of streamed output to a live message.
//!
//! A relay consumes a source stream once, formats each item, and edits a
//! single externally-owned message in place: the reader always sees the
//! latest formatted value, never an append-only log. One relay per request;
//! a relay is not restartable and a message is never shared between two
//! relays.

use crate::errors::{CoreError, EngineError};
use crate::sink::{MessageHandle, MessageSink};
use futures_util::{Stream, StreamExt};

/// Consume `source` to completion, pushing each formatted item to the sink.
///
/// The source is taken by `&mut` so a caller that must keep classifying
/// events after a sink failure can resume draining the same stream.
/// Ends with the underlying fault when the source yields an error; sink
/// faults end the relay immediately.
pub async fn relay<S, T, F>(
    sink: &dyn MessageSink,
    handle: &MessageHandle,
    source: &mut S,
    mut format: F,
) -> Result<(), CoreError>
where
    S: Stream<Item = Result<T, EngineError>> + Unpin,
    F: FnMut(T) -> String,
{
    while let Some(item) = source.next().await {
        let text = format(item?);
        sink.edit(handle, &text).await?;
    }
    Ok(())
}
