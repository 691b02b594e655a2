//! Sample buffers carried between endpoints.
//!
//! A [`SampleBuffer`] is an immutable block of integer samples behind an
//! `Arc`. Delivering a buffer to N inputs clones the handle N times, so every
//! receiver observes the same allocation. A device that wants to modify data
//! it received calls [`SampleBuffer::make_mut`], which copies only when the
//! block is still shared.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A single sample value.
pub type Sample = i32;

/// Number of leading and trailing samples shown by the `Display` impl.
const DISPLAY_EDGE: usize = 3;

/// Shared, copy-on-write block of samples.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SampleBuffer(Arc<Vec<Sample>>);

impl SampleBuffer {
    /// Wraps an owned vector.
    pub fn from_vec(samples: Vec<Sample>) -> Self {
        Self(Arc::new(samples))
    }

    /// A block of `len` zeros.
    pub fn silence(len: usize) -> Self {
        Self::filled(len, 0)
    }

    /// A block of `len` copies of `value`.
    pub fn filled(len: usize, value: Sample) -> Self {
        Self(Arc::new(vec![value; len]))
    }

    /// Number of samples in the block.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for a zero-length block.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the samples.
    pub fn as_slice(&self) -> &[Sample] {
        &self.0
    }

    /// Mutable access, cloning the data first if other handles share it.
    pub fn make_mut(&mut self) -> &mut Vec<Sample> {
        Arc::make_mut(&mut self.0)
    }

    /// Returns `true` if both handles point at the same allocation.
    pub fn shares_data(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Applies `f` to every sample, producing a new buffer.
    pub fn map(&self, f: impl FnMut(Sample) -> Sample) -> Self {
        self.0.iter().copied().map(f).collect()
    }

    /// Extracts the samples, cloning only if the block is shared.
    pub fn into_vec(self) -> Vec<Sample> {
        Arc::try_unwrap(self.0).unwrap_or_else(|shared| (*shared).clone())
    }
}

impl Deref for SampleBuffer {
    type Target = [Sample];

    fn deref(&self) -> &[Sample] {
        &self.0
    }
}

impl From<Vec<Sample>> for SampleBuffer {
    fn from(samples: Vec<Sample>) -> Self {
        Self::from_vec(samples)
    }
}

impl From<&[Sample]> for SampleBuffer {
    fn from(samples: &[Sample]) -> Self {
        Self::from_vec(samples.to_vec())
    }
}

impl FromIterator<Sample> for SampleBuffer {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl fmt::Display for SampleBuffer {
    /// Abbreviated view: long blocks show only their first and last samples.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let samples = self.as_slice();
        let join = |part: &[Sample]| {
            part.iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        if samples.len() <= 2 * DISPLAY_EDGE {
            write!(f, "[{}]", join(samples))
        } else {
            write!(
                f,
                "[{}, ..., {}]",
                join(&samples[..DISPLAY_EDGE]),
                join(&samples[samples.len() - DISPLAY_EDGE..])
            )
        }
    }
}
