//! Drives one request body through splitter, parser and sink.

use crate::{
    error::{IngestError, LifecycleError},
    sink::TableSink,
};
use bytes::Bytes;
use connectors::{
    file::csv::{lines::LineSplitter, parser::LineParser},
    sql::base::adapter::SqlAdapter,
};
use futures::{Stream, StreamExt};
use std::io;
use tokio::io::AsyncRead;
use tokio_util::{io::StreamReader, sync::CancellationToken};
use tracing::debug;

/// Outcome of feeding one body into a sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Non-empty lines consumed, header included.
    pub lines: u64,
    /// Rows flushed at the end of the body.
    pub flushed: usize,
}

/// Adapts a chunked body, such as an HTTP request stream, into a reader.
pub fn body_reader<S>(body: S) -> StreamReader<S, Bytes>
where
    S: Stream<Item = Result<Bytes, io::Error>>,
{
    StreamReader::new(body)
}

/// Streams `reader` into `sink`, then flushes whatever is still buffered.
///
/// Stops at the first error. Cancelling `cancel` stops input consumption
/// at the next suspension point and returns [`LifecycleError::Cancelled`];
/// rolling back is the caller's job.
pub async fn run<R>(
    reader: R,
    sink: &mut TableSink,
    adapter: &dyn SqlAdapter,
    parser: &LineParser,
    max_line_length: usize,
    cancel: &CancellationToken,
) -> Result<StreamStats, IngestError>
where
    R: AsyncRead + Send,
{
    let work = async {
        let lines = LineSplitter::frame(reader, max_line_length);
        tokio::pin!(lines);

        let mut stats = StreamStats::default();
        while let Some(line) = lines.next().await {
            let line = line?;
            let cells = parser.parse_line(&line)?;
            sink.accept(adapter, cells, line.number).await?;
            stats.lines += 1;
        }
        stats.flushed = sink.flush(adapter).await?;
        Ok::<_, IngestError>(stats)
    };

    let stats = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(LifecycleError::Cancelled.into()),
        result = work => result?,
    };

    debug!(table = %sink.table(), lines = stats.lines, "Body consumed");
    Ok(stats)
}
