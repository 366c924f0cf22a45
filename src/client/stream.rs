//! Streaming chat responses
//!
//! The chat endpoint answers with newline-delimited JSON: one
//! [`GenerateResponse`] fragment per line, arriving in chunks that need not
//! align with line boundaries. [`FragmentDecoder`] reassembles lines from raw
//! chunks; [`ChatStream`] drives it from an open HTTP response.

use crate::client::error::ClientError;
use crate::types::api::GenerateResponse;

/// Incremental decoder for newline-delimited JSON fragments.
///
/// Feed it raw bytes with [`push`](Self::push) and drain parsed fragments
/// with [`next_fragment`](Self::next_fragment). Call
/// [`finish`](Self::finish) at end of input to flush a trailing record the
/// server did not newline-terminate.
#[derive(Debug, Default)]
pub struct FragmentDecoder {
    buffer: Vec<u8>,
}

impl FragmentDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of raw bytes from the transport
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Parse and remove the next complete line, if one is buffered.
    ///
    /// Blank lines are skipped. A line that is not valid JSON is an error;
    /// the server either sent garbage or the connection was corrupted.
    pub fn next_fragment(&mut self) -> Result<Option<GenerateResponse>, serde_json::Error> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = &line[..line.len() - 1];
            let line = strip_cr(line);
            if line.is_empty() {
                continue;
            }
            return serde_json::from_slice(line).map(Some);
        }
        Ok(None)
    }

    /// Flush a final unterminated record at end of input
    pub fn finish(&mut self) -> Result<Option<GenerateResponse>, serde_json::Error> {
        let rest = std::mem::take(&mut self.buffer);
        let rest = strip_cr(&rest);
        if rest.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(rest).map(Some)
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    }
}

/// A finite, non-restartable sequence of chat response fragments.
///
/// Produced by [`ServerClient::chat`](crate::client::ServerClient::chat).
/// The sequence ends when a fragment with `done: true` is yielded or the
/// server closes the connection; a transport or decode failure mid-stream is
/// surfaced as a terminal [`ClientError::ChatStreamInterrupted`]. Dropping
/// the stream closes the underlying connection.
#[derive(Debug)]
pub struct ChatStream {
    response: Option<reqwest::Response>,
    decoder: FragmentDecoder,
    finished: bool,
}

impl ChatStream {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self {
            response: Some(response),
            decoder: FragmentDecoder::new(),
            finished: false,
        }
    }

    /// Yield the next fragment, or `None` once the stream is finished.
    ///
    /// After the first `None` or error, every subsequent call returns `None`.
    pub async fn next(&mut self) -> Option<Result<GenerateResponse, ClientError>> {
        if self.finished {
            return None;
        }
        loop {
            match self.decoder.next_fragment() {
                Ok(Some(fragment)) => return Some(Ok(self.check_done(fragment))),
                Ok(None) => {}
                Err(e) => return Some(Err(self.interrupt(e))),
            }

            let response = self.response.as_mut()?;
            match response.chunk().await {
                Ok(Some(bytes)) => self.decoder.push(&bytes),
                Ok(None) => {
                    // server closed the connection; flush any trailing record
                    self.response = None;
                    self.finished = true;
                    return match self.decoder.finish() {
                        Ok(Some(fragment)) => Some(Ok(fragment)),
                        Ok(None) => None,
                        Err(e) => Some(Err(interrupted(e))),
                    };
                }
                Err(e) => return Some(Err(self.interrupt(e))),
            }
        }
    }

    /// Drain the rest of the stream, concatenating fragment text in arrival
    /// order into the full reply.
    pub async fn collect_text(mut self) -> Result<String, ClientError> {
        let mut reply = String::new();
        while let Some(fragment) = self.next().await {
            reply.push_str(fragment?.text());
        }
        Ok(reply)
    }

    /// Nothing may follow the `done` fragment; drop the connection once seen.
    fn check_done(&mut self, fragment: GenerateResponse) -> GenerateResponse {
        if fragment.done {
            self.response = None;
            self.finished = true;
        }
        fragment
    }

    fn interrupt(&mut self, e: impl std::fmt::Display) -> ClientError {
        self.response = None;
        self.finished = true;
        interrupted(e)
    }
}

fn interrupted(e: impl std::fmt::Display) -> ClientError {
    ClientError::ChatStreamInterrupted(e.to_string())
}
