//! Request and response body types.
//!
//! PUT bodies may be gigabytes, so [`S3RequestBody`] exposes the underlying
//! frames as a stream that the store writes straight to disk; it is only
//! collected into memory for operations whose bodies are small XML
//! documents. Symmetrically, [`S3ResponseBody`] can stream an object file
//! back without buffering it.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::TryStreamExt;
use http_body_util::combinators::{BoxBody, UnsyncBoxBody};
use http_body_util::{BodyDataStream, BodyExt, Full, StreamBody};
use tokio_util::io::ReaderStream;

// ---------------------------------------------------------------------------
// S3RequestBody
// ---------------------------------------------------------------------------

/// An incoming request body.
///
/// Wraps either a live hyper body or pre-buffered bytes (the latter is what
/// tests construct). Consumers choose between [`collect`](Self::collect) for
/// small XML payloads and [`into_data_stream`](Self::into_data_stream) for
/// object data that must go to disk unbuffered.
pub struct S3RequestBody {
    inner: UnsyncBoxBody<Bytes, io::Error>,
}

impl std::fmt::Debug for S3RequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3RequestBody").finish_non_exhaustive()
    }
}

impl S3RequestBody {
    /// Wrap a live hyper request body.
    #[must_use]
    pub fn from_incoming(body: hyper::body::Incoming) -> Self {
        Self {
            inner: body.map_err(io::Error::other).boxed_unsync(),
        }
    }

    /// Wrap pre-buffered bytes.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self {
            inner: Full::new(data.into())
                .map_err(|never| match never {})
                .boxed_unsync(),
        }
    }

    /// An empty body.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    /// Collect the entire body into memory. Only for XML documents and other
    /// bounded payloads.
    ///
    /// # Errors
    ///
    /// Returns the underlying transport error, if any.
    pub async fn collect(self) -> io::Result<Bytes> {
        Ok(self.inner.collect().await?.to_bytes())
    }

    /// Turn the body into a stream of data chunks.
    #[must_use]
    pub fn into_data_stream(
        self,
    ) -> impl futures_util::Stream<Item = io::Result<Bytes>> + Send + Unpin {
        BodyDataStream::new(self.inner)
    }
}

// ---------------------------------------------------------------------------
// S3ResponseBody
// ---------------------------------------------------------------------------

/// S3 response body supporting buffered, file-streaming, and empty modes.
#[derive(Default)]
pub enum S3ResponseBody {
    /// Buffered body for XML payloads, error bodies, and small objects.
    Buffered(Full<Bytes>),
    /// Body streamed from an open file (GetObject).
    Streaming {
        /// The boxed frame stream.
        body: BoxBody<Bytes, io::Error>,
        /// Exact number of bytes the stream will yield.
        length: u64,
    },
    /// Empty body for 204 responses, HEAD responses, and the like.
    #[default]
    Empty,
}

impl std::fmt::Debug for S3ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buffered(_) => f.write_str("S3ResponseBody::Buffered"),
            Self::Streaming { length, .. } => f
                .debug_struct("S3ResponseBody::Streaming")
                .field("length", length)
                .finish(),
            Self::Empty => f.write_str("S3ResponseBody::Empty"),
        }
    }
}

impl S3ResponseBody {
    /// Create a buffered body from bytes.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::Buffered(Full::new(data.into()))
    }

    /// Create a buffered body from an XML byte vector.
    #[must_use]
    pub fn from_xml(xml: Vec<u8>) -> Self {
        Self::Buffered(Full::new(Bytes::from(xml)))
    }

    /// Create an empty body.
    #[must_use]
    pub fn empty() -> Self {
        Self::Empty
    }

    /// Stream `length` bytes from an open file positioned at the start of
    /// the desired range.
    #[must_use]
    pub fn from_file(file: tokio::fs::File, length: u64) -> Self {
        let limited = tokio::io::AsyncReadExt::take(file, length);
        let stream = ReaderStream::new(limited).map_ok(http_body::Frame::data);
        Self::Streaming {
            body: BoxBody::new(StreamBody::new(stream)),
            length,
        }
    }
}

impl http_body::Body for S3ResponseBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<http_body::Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            Self::Buffered(full) => Pin::new(full)
                .poll_frame(cx)
                .map_err(|never| match never {}),
            Self::Streaming { body, .. } => Pin::new(body).poll_frame(cx),
            Self::Empty => Poll::Ready(None),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Buffered(full) => full.is_end_stream(),
            Self::Streaming { length, .. } => *length == 0,
            Self::Empty => true,
        }
    }

    fn size_hint(&self) -> http_body::SizeHint {
        match self {
            Self::Buffered(full) => full.size_hint(),
            Self::Streaming { length, .. } => http_body::SizeHint::with_exact(*length),
            Self::Empty => http_body::SizeHint::with_exact(0),
        }
    }
}
