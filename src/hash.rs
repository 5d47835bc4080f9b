use std::fmt::Write;

use crate::input::InputRecord;

/// A 32-byte BLAKE3 hash, used to fingerprint the input record an
/// evaluation was computed from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash32([u8; 32]);

impl<T> From<T> for Hash32
where
    T: Into<[u8; 32]>,
{
    fn from(value: T) -> Self {
        Hash32(value.into())
    }
}

impl Hash32 {
    pub fn hash(buffer: impl AsRef<[u8]>) -> Self {
        blake3::Hasher::new()
            .update(buffer.as_ref())
            .finalize()
            .into()
    }

    /// Fingerprint of the canonical JSON form of `input`.
    pub fn of_input(input: &InputRecord) -> Result<Self, serde_json::Error> {
        Ok(Self::hash(serde_json::to_vec(input)?))
    }

    pub fn to_hex(self) -> String {
        let mut acc = String::with_capacity(64);
        for byte in self.0 {
            // Writing into a String can't fail.
            let _ = write!(&mut acc, "{byte:02x}");
        }
        acc
    }
}

impl std::fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hash32({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_length() {
        let hex = Hash32::hash(b"abc").to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.starts_with("6437b3ac"));
    }

    #[test]
    fn test_input_digest_is_stable() {
        let input = InputRecord::default();
        let a = Hash32::of_input(&input).unwrap();
        let b = Hash32::of_input(&input.clone()).unwrap();
        assert_eq!(a, b);

        let mut other = input.clone();
        other.misc_elections.occupation = "Engineer".into();
        assert_ne!(a, Hash32::of_input(&other).unwrap());
    }
}
