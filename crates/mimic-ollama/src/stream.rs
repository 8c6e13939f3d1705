// SPDX-FileCopyrightText: 2026 Mimic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Newline-delimited JSON decoding for streamed generations.
//!
//! Ollama streams one `GenerateResponse` object per line. Network chunks do
//! not respect line boundaries, so bytes are buffered until a full line is
//! available. The stream ends after the `done: true` line.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;

use mimic_core::{MimicError, TextStream};

use crate::types::GenerateResponse;

struct Chunk {
    text: String,
    done: bool,
}

fn parse_line(line: &[u8]) -> Result<Option<Chunk>, MimicError> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return Ok(None);
    }
    let parsed: GenerateResponse =
        serde_json::from_slice(line).map_err(|e| MimicError::Provider {
            message: format!("malformed stream line: {e}"),
            source: Some(Box::new(e)),
        })?;
    if let Some(error) = parsed.error {
        return Err(MimicError::Provider {
            message: format!("ollama error: {error}"),
            source: None,
        });
    }
    Ok(Some(Chunk {
        text: parsed.response,
        done: parsed.done,
    }))
}

struct State {
    inner: Pin<Box<dyn Stream<Item = Result<Bytes, MimicError>> + Send>>,
    buf: Vec<u8>,
    done: bool,
    finished: bool,
}

/// Turns a byte stream of NDJSON lines into a stream of text fragments.
///
/// Empty fragments are skipped. A stream that ends without a `done` line
/// yields a final [`MimicError::Provider`].
pub fn ndjson_text_stream<S>(bytes: S) -> TextStream
where
    S: Stream<Item = Result<Bytes, MimicError>> + Send + 'static,
{
    let state = State {
        inner: Box::pin(bytes),
        buf: Vec::new(),
        done: false,
        finished: false,
    };

    Box::pin(stream::unfold(state, |mut st| async move {
        loop {
            if st.finished {
                return None;
            }

            if let Some(pos) = st.buf.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = st.buf.drain(..=pos).collect();
                match parse_line(&line) {
                    Ok(Some(chunk)) => {
                        if chunk.done {
                            st.done = true;
                            st.finished = true;
                        }
                        if !chunk.text.is_empty() {
                            return Some((Ok(chunk.text), st));
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        st.finished = true;
                        return Some((Err(e), st));
                    }
                }
                continue;
            }

            match st.inner.next().await {
                Some(Ok(bytes)) => st.buf.extend_from_slice(&bytes),
                Some(Err(e)) => {
                    st.finished = true;
                    return Some((Err(e), st));
                }
                None => {
                    // Last line may lack a trailing newline.
                    st.finished = true;
                    let rest = std::mem::take(&mut st.buf);
                    match parse_line(&rest) {
                        Ok(Some(chunk)) => {
                            st.done = chunk.done;
                            if !chunk.text.is_empty() {
                                if chunk.done {
                                    return Some((Ok(chunk.text), st));
                                }
                                // Deliver the text; the missing `done` is reported on the next poll.
                                st.finished = false;
                                st.inner = Box::pin(stream::empty());
                                return Some((Ok(chunk.text), st));
                            }
                        }
                        Ok(None) => {}
                        Err(e) => return Some((Err(e), st)),
                    }
                    if !st.done {
                        return Some((
                            Err(MimicError::Provider {
                                message: "stream ended before the model finished".to_string(),
                                source: None,
                            }),
                            st,
                        ));
                    }
                    return None;
                }
            }
        }
    }))
}
