//! Transparent response-body decompression.
//!
//! Servers declaring `content-encoding: gzip`, `compress` or `deflate` get
//! their bodies routed through [`decode_stream`]. The decoder sniffs the
//! first two bytes rather than trusting the declared name: `1f 8b` selects
//! gzip, anything else the zlib format (the usual meaning of `deflate` on
//! the wire). Decoding is incremental - each compressed chunk yields its
//! decompressed output as soon as it is available, so streaming consumers
//! never wait for the full body.

use std::io::{self, Write};
use std::mem;

use bytes::Bytes;
use flate2::write::{GzDecoder, ZlibDecoder};
use futures_util::stream::{self, BoxStream, StreamExt};

use courier_core::{BodyStream, BoxError};

/// Returns `true` for encoding names the decoder reverses.
#[must_use]
pub fn is_supported_encoding(name: &str) -> bool {
    matches!(
        name.trim().to_ascii_lowercase().as_str(),
        "gzip" | "compress" | "deflate"
    )
}

/// Wraps a compressed byte stream with an incremental decoder.
///
/// Decoder failures (corrupt or truncated data) surface as stream errors.
#[must_use]
pub fn decode_stream(stream: BodyStream) -> BodyStream {
    let state = DecodeState {
        inner: stream.into_inner(),
        decoder: None,
        prelude: Vec::new(),
        done: false,
    };

    BodyStream::new(stream::unfold(state, |mut state| async move {
        loop {
            if state.done {
                return None;
            }
            match state.inner.next().await {
                Some(Ok(chunk)) => match state.feed(&chunk) {
                    Ok(output) if output.is_empty() => {}
                    Ok(output) => return Some((Ok(Bytes::from(output)), state)),
                    Err(error) => {
                        state.done = true;
                        return Some((Err(error.into()), state));
                    }
                },
                Some(Err(error)) => {
                    state.done = true;
                    return Some((Err(error), state));
                }
                None => {
                    state.done = true;
                    return match state.finish() {
                        Ok(output) if output.is_empty() => None,
                        Ok(output) => Some((Ok(Bytes::from(output)), state)),
                        Err(error) => Some((Err(error.into()), state)),
                    };
                }
            }
        }
    }))
}

/// Incremental decoder selected from the stream's magic bytes.
enum Decoder {
    Gzip(GzDecoder<Vec<u8>>),
    Zlib(ZlibDecoder<Vec<u8>>),
}

impl Decoder {
    fn for_magic(prelude: &[u8]) -> Self {
        if prelude.len() >= 2 && prelude[0] == 0x1f && prelude[1] == 0x8b {
            Self::Gzip(GzDecoder::new(Vec::new()))
        } else {
            Self::Zlib(ZlibDecoder::new(Vec::new()))
        }
    }

    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        match self {
            Self::Gzip(decoder) => decoder.write_all(data),
            Self::Zlib(decoder) => decoder.write_all(data),
        }
    }

    fn take_output(&mut self) -> Vec<u8> {
        match self {
            Self::Gzip(decoder) => mem::take(decoder.get_mut()),
            Self::Zlib(decoder) => mem::take(decoder.get_mut()),
        }
    }

    fn finish(self) -> io::Result<Vec<u8>> {
        match self {
            Self::Gzip(decoder) => decoder.finish(),
            Self::Zlib(decoder) => decoder.finish(),
        }
    }
}

struct DecodeState {
    inner: BoxStream<'static, Result<Bytes, BoxError>>,
    decoder: Option<Decoder>,
    // Bytes held back until the format can be sniffed.
    prelude: Vec<u8>,
    done: bool,
}

impl DecodeState {
    fn feed(&mut self, chunk: &[u8]) -> io::Result<Vec<u8>> {
        match self.decoder.as_mut() {
            Some(decoder) => {
                decoder.write(chunk)?;
                Ok(decoder.take_output())
            }
            None => {
                self.prelude.extend_from_slice(chunk);
                if self.prelude.len() < 2 {
                    return Ok(Vec::new());
                }
                let mut decoder = Decoder::for_magic(&self.prelude);
                decoder.write(&mem::take(&mut self.prelude))?;
                let output = decoder.take_output();
                self.decoder = Some(decoder);
                Ok(output)
            }
        }
    }

    fn finish(&mut self) -> io::Result<Vec<u8>> {
        match self.decoder.take() {
            Some(decoder) => decoder.finish(),
            None if self.prelude.is_empty() => Ok(Vec::new()),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "compressed body truncated",
            )),
        }
    }
}
