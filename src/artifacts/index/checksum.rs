use crate::artifacts::index::CHECKSUM_SIZE;
use crate::errors::{Error, Result};
use sha1::{Digest, Sha1};
use std::io::Write;

/// Writer that hashes everything passing through it and appends the digest
#[derive(Debug)]
pub struct Checksum<W> {
    inner: W,
    digest: Sha1,
}

impl<W: Write> Checksum<W> {
    pub fn new(inner: W) -> Self {
        Checksum {
            inner,
            digest: Sha1::new(),
        }
    }

    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        self.digest.update(data);
        Ok(())
    }

    /// Append the SHA-1 of everything written so far and hand back the writer
    pub fn write_checksum(mut self) -> Result<W> {
        let checksum = self.digest.finalize();
        self.inner.write_all(checksum.as_slice())?;
        Ok(self.inner)
    }
}

/// Check the trailing digest of `content` and return the bytes it covers
pub fn verify(content: &[u8]) -> Result<&[u8]> {
    let body_len = content
        .len()
        .checked_sub(CHECKSUM_SIZE)
        .ok_or(Error::OutOfBounds {
            offset: 0,
            needed: CHECKSUM_SIZE,
            available: content.len(),
        })?;
    let (body, expected) = content.split_at(body_len);

    let actual = Sha1::digest(body);
    if actual.as_slice() != expected {
        return Err(Error::ChecksumMismatch {
            expected: hex::encode(expected),
            actual: hex::encode(actual),
        });
    }

    Ok(body)
}
