//! Unix timestamps and authorization validity windows.
//!
//! [`UnixTimestamp`] is the type of the `validAfter` / `validBefore` fields of
//! an EIP-3009 authorization. [`ValidityWindow`] pairs the two bounds and owns
//! the inclusive containment check the verifier applies.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::ops::Add;
use std::time::SystemTime;

/// Seconds subtracted from "now" when opening a validity window, to absorb
/// clock skew between client and server.
pub const VALIDITY_BUFFER_SECS: u64 = 60;

/// A Unix timestamp representing seconds since the Unix epoch (1970-01-01T00:00:00Z).
///
/// # Serialization
///
/// Serialized as a JSON number. Deserialization accepts either a non-negative
/// integer or a string holding one, since clients disagree on the encoding:
///
/// ```json
/// 1699999999
/// "1699999999"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash, Default)]
pub struct UnixTimestamp(u64);

impl Serialize for UnixTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

struct UnixTimestampVisitor;

impl Visitor<'_> for UnixTimestampVisitor {
    type Value = UnixTimestamp;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer or a string holding one")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(UnixTimestamp(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(UnixTimestamp)
            .map_err(|_| E::custom("timestamp must be a non-negative integer"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.trim()
            .parse::<u64>()
            .map(UnixTimestamp)
            .map_err(|_| E::custom("timestamp must be a non-negative integer"))
    }
}

impl<'de> Deserialize<'de> for UnixTimestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(UnixTimestampVisitor)
    }
}

impl Display for UnixTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add<u64> for UnixTimestamp {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0.saturating_add(rhs))
    }
}

impl From<u64> for UnixTimestamp {
    fn from(secs: u64) -> Self {
        Self(secs)
    }
}

impl UnixTimestamp {
    /// Creates a new [`UnixTimestamp`] from a raw seconds value.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the current system time as a [`UnixTimestamp`].
    ///
    /// A clock set before the Unix epoch reads as `0`.
    #[must_use]
    pub fn now() -> Self {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self(now)
    }

    /// Returns the timestamp as raw seconds since the Unix epoch.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    /// Subtracts seconds, clamping at the epoch.
    #[must_use]
    pub const fn saturating_sub(self, secs: u64) -> Self {
        Self(self.0.saturating_sub(secs))
    }
}

/// The `[valid_after, valid_before]` interval of an authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityWindow {
    /// Earliest second at which the authorization is usable.
    pub valid_after: UnixTimestamp,
    /// Last second at which the authorization is usable.
    pub valid_before: UnixTimestamp,
}

impl ValidityWindow {
    /// Creates a window from explicit bounds.
    #[must_use]
    pub const fn new(valid_after: UnixTimestamp, valid_before: UnixTimestamp) -> Self {
        Self {
            valid_after,
            valid_before,
        }
    }

    /// Opens a window at `now`: starts [`VALIDITY_BUFFER_SECS`] in the past and
    /// lasts `duration_secs` into the future.
    #[must_use]
    pub fn starting_at(now: UnixTimestamp, duration_secs: u64) -> Self {
        Self {
            valid_after: now.saturating_sub(VALIDITY_BUFFER_SECS),
            valid_before: now + duration_secs,
        }
    }

    /// Inclusive on both ends. An inverted window contains nothing.
    #[must_use]
    pub fn contains(&self, t: UnixTimestamp) -> bool {
        self.valid_after <= t && t <= self.valid_before
    }
}

/// Computes a validity window of `duration_secs` from the current clock.
#[must_use]
pub fn validity_window(duration_secs: u64) -> ValidityWindow {
    ValidityWindow::starting_at(UnixTimestamp::now(), duration_secs)
}
