//! Native value types for the physical types that have no Rust primitive counterpart.

/// A 96-bit value stored as three little-endian 32-bit words, lowest word first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Int96([u32; 3]);

impl Int96 {
    pub const SIZE: usize = 12;

    pub fn new(words: [u32; 3]) -> Self {
        Self(words)
    }

    pub fn words(&self) -> &[u32; 3] {
        &self.0
    }

    pub fn from_le_bytes(bytes: [u8; Self::SIZE]) -> Self {
        let word = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        Self([word(0), word(4), word(8)])
    }

    pub fn to_le_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.0) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }
}

/// An owned fixed-length byte array value.
///
/// All values of one column share the width recorded in its
/// [`ColumnDescriptor`](crate::schema::ColumnDescriptor).
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixedLenByteArray(Vec<u8>);

impl Clone for FixedLenByteArray {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }

    fn clone_from(&mut self, source: &Self) {
        self.0.clone_from(&source.0);
    }
}

impl FixedLenByteArray {
    pub fn new(data: Vec<u8>) -> Self {
        Self(data)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    /// Overwrites the value with `bytes`, reusing the existing allocation.
    pub fn set_from_slice(&mut self, bytes: &[u8]) {
        self.0.clear();
        self.0.extend_from_slice(bytes);
    }
}

impl std::ops::Deref for FixedLenByteArray {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for FixedLenByteArray {
    fn from(data: Vec<u8>) -> Self {
        Self(data)
    }
}

impl From<&[u8]> for FixedLenByteArray {
    fn from(data: &[u8]) -> Self {
        Self(data.to_vec())
    }
}
