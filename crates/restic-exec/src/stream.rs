//! Line-by-line demultiplexing of a child's stdout and stderr

use async_process::{ChildStderr, ChildStdout};
use futures::stream::Stream;
use futures_lite::io::{AsyncBufRead, AsyncRead, BufReader};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Source of an output line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    /// Standard output
    Stdout,
    /// Standard error
    Stderr,
}

/// One line of child output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    /// The stream the line was read from
    pub source: LogSource,
    /// The line content without its terminator, lossily decoded as UTF-8
    pub text: String,
    /// The bytes exactly as read, terminator included if there was one
    pub raw: Vec<u8>,
}

impl OutputLine {
    fn new(source: LogSource, raw: Vec<u8>) -> Self {
        let mut content = raw.as_slice();
        if let Some(rest) = content.strip_suffix(b"\n") {
            content = rest;
        }
        if let Some(rest) = content.strip_suffix(b"\r") {
            content = rest;
        }
        Self {
            source,
            text: String::from_utf8_lossy(content).into_owned(),
            raw,
        }
    }
}

/// Splits a pipe on `\n`, keeping the terminator and a final unterminated
/// line
struct LineReader<R> {
    reader: BufReader<R>,
    pending: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    fn new(pipe: R) -> Self {
        Self {
            reader: BufReader::new(pipe),
            pending: Vec::new(),
        }
    }

    fn poll_line(&mut self, cx: &mut Context<'_>) -> Poll<Option<io::Result<Vec<u8>>>> {
        loop {
            let (consumed, complete) = {
                let buf = match Pin::new(&mut self.reader).poll_fill_buf(cx) {
                    Poll::Ready(Ok(buf)) => buf,
                    Poll::Ready(Err(e)) => return Poll::Ready(Some(Err(e))),
                    Poll::Pending => return Poll::Pending,
                };
                if buf.is_empty() {
                    // EOF
                    if self.pending.is_empty() {
                        return Poll::Ready(None);
                    }
                    return Poll::Ready(Some(Ok(std::mem::take(&mut self.pending))));
                }
                match buf.iter().position(|&b| b == b'\n') {
                    Some(end) => {
                        self.pending.extend_from_slice(&buf[..=end]);
                        (end + 1, true)
                    }
                    None => {
                        self.pending.extend_from_slice(buf);
                        (buf.len(), false)
                    }
                }
            };
            Pin::new(&mut self.reader).consume(consumed);
            if complete {
                return Poll::Ready(Some(Ok(std::mem::take(&mut self.pending))));
            }
        }
    }
}

/// Stream of lines from both pipes of one child.
///
/// Both pipes are polled on every wake-up, so a child that fills one pipe
/// while the caller waits on the other can never stall. Order is preserved
/// within each pipe; across pipes lines come in whatever order they arrive.
pub struct OutputLines {
    stdout: Option<LineReader<ChildStdout>>,
    stderr: Option<LineReader<ChildStderr>>,
    stderr_first: bool,
}

impl OutputLines {
    /// Wrap the pipes taken from a freshly spawned child
    pub fn new(stdout: Option<ChildStdout>, stderr: Option<ChildStderr>) -> Self {
        Self {
            stdout: stdout.map(LineReader::new),
            stderr: stderr.map(LineReader::new),
            stderr_first: false,
        }
    }
}

fn poll_pipe<R: AsyncRead + Unpin>(
    pipe: &mut Option<LineReader<R>>,
    source: LogSource,
    cx: &mut Context<'_>,
) -> Option<OutputLine> {
    let reader = pipe.as_mut()?;
    match reader.poll_line(cx) {
        Poll::Ready(Some(Ok(bytes))) => Some(OutputLine::new(source, bytes)),
        Poll::Ready(Some(Err(e))) => {
            tracing::warn!("Error reading {:?}, closing it: {}", source, e);
            *pipe = None;
            None
        }
        Poll::Ready(None) => {
            // Pipe closed
            *pipe = None;
            None
        }
        Poll::Pending => None,
    }
}

impl Stream for OutputLines {
    type Item = OutputLine;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        // Alternate which pipe goes first so a chatty stdout cannot starve stderr
        this.stderr_first = !this.stderr_first;
        let line = if this.stderr_first {
            poll_pipe(&mut this.stderr, LogSource::Stderr, cx)
                .or_else(|| poll_pipe(&mut this.stdout, LogSource::Stdout, cx))
        } else {
            poll_pipe(&mut this.stdout, LogSource::Stdout, cx)
                .or_else(|| poll_pipe(&mut this.stderr, LogSource::Stderr, cx))
        };

        if let Some(line) = line {
            return Poll::Ready(Some(line));
        }

        // If both pipes are closed, the stream is exhausted
        if this.stdout.is_none() && this.stderr.is_none() {
            return Poll::Ready(None);
        }

        // One or both pipes are still pending
        Poll::Pending
    }
}
