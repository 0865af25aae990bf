//! Byte and text encodings for the crypto primitives.
use anyhow::Context as _;

/// Text being parsed by [`TextFmt::decode`].
///
/// Remembers the full input next to the unparsed suffix, so that a failure
/// can report how far parsing got.
pub struct Text<'a> {
    /// Full input.
    context: &'a str,
    /// Unparsed suffix of `context`.
    inner: &'a str,
}

impl<'a> Text<'a> {
    /// Wraps a string for parsing.
    pub fn new(s: &'a str) -> Self {
        Self {
            context: s,
            inner: s,
        }
    }

    /// Part of the input that has been consumed so far.
    fn parsed(&self) -> &'a str {
        // `inner` is always a suffix of `context`, so the split lands on a char boundary.
        &self.context[..self.context.len() - self.inner.len()]
    }

    /// Consumes an expected tag from the front of the text.
    pub fn strip(mut self, tag: &str) -> anyhow::Result<Self> {
        let Some(inner) = self.inner.strip_prefix(tag) else {
            anyhow::bail!("{}: expected {tag}, got {}", self.parsed(), self.inner);
        };
        self.inner = inner;
        Ok(self)
    }

    /// Decodes the rest of the text as hex, then the bytes via [`ByteFmt`].
    pub fn decode_hex<T: ByteFmt>(self) -> anyhow::Result<T> {
        let raw = hex::decode(self.inner).with_context(|| self.parsed().to_owned())?;
        ByteFmt::decode(&raw).with_context(|| self.parsed().to_owned())
    }

    /// Shorthand for `<T as TextFmt>::decode(self)`.
    pub fn decode<T: TextFmt>(self) -> anyhow::Result<T> {
        TextFmt::decode(self)
    }
}

/// Human readable encoding, used for keys in configs and for debug output.
///
/// `decode(encode(x)) == x` must hold, and encodings of different key or
/// signature kinds must not be mistaken for each other, which is why every
/// implementation prefixes its hex payload with a role/scheme tag.
pub trait TextFmt: Sized {
    /// Parses the value.
    fn decode(text: Text) -> anyhow::Result<Self>;
    /// Renders the value.
    fn encode(&self) -> String;
}

/// Well defined binary encoding.
///
/// Encodings end up inside signed messages and hash inputs, so they must not
/// depend on any serializer internals.
pub trait ByteFmt: Sized {
    /// Decodes the value.
    fn decode(bytes: &[u8]) -> anyhow::Result<Self>;
    /// Encodes the value.
    fn encode(&self) -> Vec<u8>;
}
