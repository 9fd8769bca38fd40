//! Object ID Generator
//!
//! 12-byte document identifiers rendered as 24 lowercase hex characters:
//! a 4-byte big-endian seconds timestamp, 5 bytes unique to the generator,
//! and a 3-byte counter. IDs from one generator sort in creation order.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

const COUNTER_MASK: u32 = 0x00FF_FFFF;

/// Error returned when a string is not a well-formed object id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid object id: expected 24 hex characters")]
pub struct InvalidObjectId;

/// Document identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Seconds since the Unix epoch at which this id was generated.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self)
    }
}

impl FromStr for ObjectId {
    type Err = InvalidObjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 24 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InvalidObjectId);
        }

        let mut bytes = [0u8; 12];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).map_err(|_| InvalidObjectId)?;
            bytes[i] = u8::from_str_radix(pair, 16).map_err(|_| InvalidObjectId)?;
        }

        Ok(Self(bytes))
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Object ID generator
pub struct ObjectIdGenerator {
    process_unique: [u8; 5],
    counter: AtomicU32,
}

impl ObjectIdGenerator {
    /// Create a generator with a random process-unique segment and counter seed.
    pub fn new() -> Self {
        Self {
            process_unique: rand::random(),
            counter: AtomicU32::new(rand::random::<u32>() & COUNTER_MASK),
        }
    }

    /// Generate a new object id
    pub fn generate(&self) -> ObjectId {
        let timestamp = Utc::now().timestamp() as u32;
        let counter = self.counter.fetch_add(1, Ordering::SeqCst) & COUNTER_MASK;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..9].copy_from_slice(&self.process_unique);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);

        ObjectId(bytes)
    }
}

impl Default for ObjectIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
