//! Random identifier generation for `crossutil`.
//!
//! Identifiers come from the first random source that is both available and
//! succeeds, in probe order:
//! - `os-rng`: `rand::rngs::OsRng`
//! - `getrandom`: the platform entropy call, via the `getrandom` crate
//!
//! Requests of [`UUID_LENGTH`] or more characters return a canonical hyphenated
//! v4 UUID from the chosen source. Shorter requests return lowercase hex.
//!
//! When no source works the generator degrades to a timestamp-derived value.
//! That fallback is not random and not unique within one millisecond.

use anyhow::Context;
use clap::builder::PossibleValue;
use clap::ValueEnum;
use rand::RngCore;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// Length used by [`generate_id8`].
pub const DEFAULT_ID_LENGTH: usize = 8;

/// Length of a canonical hyphenated UUID.
pub const UUID_LENGTH: usize = 36;

/// Source name reported when the timestamp fallback produced the id.
pub const CLOCK_SOURCE: &str = "clock";

const fn hex_digit(nibble: u8) -> u8 {
    match nibble {
        0..=9 => b'0' + nibble,
        10..=15 => b'a' + (nibble - 10),
        // Callers provide only 0..=15.
        _ => b'0',
    }
}

/// One provider strategy in the identifier cascade.
pub trait RandomSource: Send + Sync {
    /// Short name reported alongside generated ids and in logs.
    fn name(&self) -> &'static str;

    /// Whether the facility exists at all. Unavailable sources are skipped without an attempt.
    fn is_available(&self) -> bool {
        true
    }

    /// Whether this source should answer long requests with a canonical UUID.
    fn supports_uuid(&self) -> bool {
        true
    }

    /// Fill `buf` with secure random bytes.
    ///
    /// # Errors
    /// Returns an error if the underlying facility cannot produce randomness.
    fn fill_bytes(&self, buf: &mut [u8]) -> anyhow::Result<()>;

    /// Produce a random (v4) UUID.
    ///
    /// # Errors
    /// Returns an error if the underlying facility cannot produce randomness.
    fn random_uuid(&self) -> anyhow::Result<Uuid> {
        let mut bytes = [0_u8; 16];
        self.fill_bytes(&mut bytes).context("fill uuid bytes")?;
        Ok(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }
}

/// OS-backed randomness through `rand::rngs::OsRng`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRngSource;

impl RandomSource for OsRngSource {
    fn name(&self) -> &'static str {
        SourceKind::OsRng.name()
    }

    fn fill_bytes(&self, buf: &mut [u8]) -> anyhow::Result<()> {
        rand::rngs::OsRng
            .try_fill_bytes(buf)
            .context("read OS randomness")
    }
}

/// Platform-native entropy through `getrandom::fill`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetrandomSource;

impl RandomSource for GetrandomSource {
    fn name(&self) -> &'static str {
        SourceKind::Getrandom.name()
    }

    fn fill_bytes(&self, buf: &mut [u8]) -> anyhow::Result<()> {
        getrandom::fill(buf).map_err(|err| anyhow::anyhow!("read platform entropy: {err}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Built-in random sources, in their default probe order.
pub enum SourceKind {
    /// `rand::rngs::OsRng`.
    OsRng,
    /// `getrandom::fill`.
    Getrandom,
}

impl SourceKind {
    /// Default probe order.
    pub const DEFAULT_ORDER: [Self; 2] = [Self::OsRng, Self::Getrandom];

    /// Stable name of the source.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::OsRng => "os-rng",
            Self::Getrandom => "getrandom",
        }
    }

    /// Instantiate the source.
    #[must_use]
    pub fn into_source(self) -> Box<dyn RandomSource> {
        match self {
            Self::OsRng => Box::new(OsRngSource),
            Self::Getrandom => Box::new(GetrandomSource),
        }
    }
}

impl ValueEnum for SourceKind {
    fn value_variants<'a>() -> &'a [Self] {
        &Self::DEFAULT_ORDER
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        let pv = match self {
            Self::OsRng => PossibleValue::new("os-rng").help("OS randomness via rand::rngs::OsRng"),
            Self::Getrandom => {
                PossibleValue::new("getrandom").help("Platform entropy via getrandom")
            }
        };
        Some(pv)
    }
}

/// An identifier and the name of the source that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedId {
    /// The identifier.
    pub id: String,
    /// Source name, or [`CLOCK_SOURCE`] for the timestamp fallback.
    pub source: &'static str,
}

/// Ordered cascade of random sources with a timestamp fallback.
pub struct IdGenerator {
    sources: Vec<Box<dyn RandomSource>>,
    clock: fn() -> u128,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::from_kinds(&SourceKind::DEFAULT_ORDER)
    }
}

impl std::fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.sources.iter().map(|s| s.name()).collect();
        f.debug_struct("IdGenerator")
            .field("sources", &names)
            .finish_non_exhaustive()
    }
}

impl IdGenerator {
    /// Build a generator probing the given built-in sources in order.
    #[must_use]
    pub fn from_kinds(kinds: &[SourceKind]) -> Self {
        Self::with_sources(kinds.iter().map(|k| k.into_source()).collect())
    }

    /// Build a generator from arbitrary sources. An empty list always uses the timestamp fallback.
    #[must_use]
    pub fn with_sources(sources: Vec<Box<dyn RandomSource>>) -> Self {
        Self {
            sources,
            clock: system_millis,
        }
    }

    /// Replace the clock (milliseconds since the Unix epoch) used by the fallback.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> u128) -> Self {
        self.clock = clock;
        self
    }

    /// Names of the configured sources, in probe order.
    #[must_use]
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Generate an identifier of `length` characters.
    ///
    /// See [`IdGenerator::generate_with_source`] for the selection rules.
    #[must_use]
    pub fn generate(&self, length: usize) -> String {
        self.generate_with_source(length).id
    }

    /// Generate an identifier and report which source produced it.
    ///
    /// For `length >= UUID_LENGTH` a source that supports UUIDs returns a 36-character
    /// hyphenated UUID regardless of `length`. Otherwise `ceil(length / 2)` random bytes are
    /// hex-encoded and truncated to `length`. Failing sources are logged and skipped; if none
    /// succeeds the timestamp fallback is used, which may return fewer than `length` characters.
    #[must_use]
    pub fn generate_with_source(&self, length: usize) -> GeneratedId {
        for source in &self.sources {
            if !source.is_available() {
                tracing::debug!(source = source.name(), "random source unavailable");
                continue;
            }
            match attempt(source.as_ref(), length) {
                Ok(id) => {
                    return GeneratedId {
                        id,
                        source: source.name(),
                    }
                }
                Err(err) => {
                    let error = format!("{err:#}");
                    tracing::debug!(
                        source = source.name(),
                        error = %error,
                        "random source failed; trying next"
                    );
                }
            }
        }

        tracing::warn!(length, "no random source succeeded; using timestamp fallback");
        GeneratedId {
            id: timestamp_id((self.clock)(), length),
            source: CLOCK_SOURCE,
        }
    }
}

fn attempt(source: &dyn RandomSource, length: usize) -> anyhow::Result<String> {
    if length >= UUID_LENGTH && source.supports_uuid() {
        let uuid = source.random_uuid()?;
        return Ok(uuid.hyphenated().to_string());
    }

    let byte_len = length.div_ceil(2);
    let mut raw: Vec<u8> = Vec::new();
    raw.try_reserve_exact(byte_len)
        .with_context(|| format!("allocate {byte_len} id bytes"))?;
    raw.resize(byte_len, 0_u8);
    source.fill_bytes(&mut raw)?;
    hex_encode(&raw, length)
}

fn system_millis() -> u128 {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    u128::try_from(millis).unwrap_or(0)
}

/// Lowercase, zero-padded hex encoding of `bytes`, truncated to `length` characters.
///
/// # Errors
/// Returns an error if the output buffer cannot be allocated.
pub fn hex_encode(bytes: &[u8], length: usize) -> anyhow::Result<String> {
    let capacity = bytes.len().saturating_mul(2).min(length);
    let mut out = String::new();
    out.try_reserve_exact(capacity)
        .with_context(|| format!("allocate {capacity} hex characters"))?;
    for b in bytes {
        if out.len() >= length {
            break;
        }
        out.push(char::from(hex_digit(b >> 4)));
        out.push(char::from(hex_digit(b & 0x0f)));
    }
    out.truncate(length);
    Ok(out)
}

/// Lowercase base-36 rendering of `n`.
#[must_use]
pub fn to_base36(mut n: u128) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while n > 0 {
        let digit = u32::try_from(n % 36)
            .ok()
            .and_then(|d| char::from_digit(d, 36))
            .unwrap_or('0');
        digits.push(digit);
        n /= 36;
    }
    digits.iter().rev().collect()
}

/// Non-random fallback id: the base-36 timestamp, repeated twice, truncated to `length`.
///
/// Calls with the same `millis` return the same value.
#[must_use]
pub fn timestamp_id(millis: u128, length: usize) -> String {
    to_base36(millis).repeat(2).chars().take(length).collect()
}

/// Generate an identifier of `length` characters using the default source chain.
#[must_use]
pub fn generate_id(length: usize) -> String {
    IdGenerator::default().generate(length)
}

/// Generate an 8-character identifier.
///
/// This is a convenience wrapper around `generate_id(DEFAULT_ID_LENGTH)`.
#[must_use]
pub fn generate_id8() -> String {
    generate_id(DEFAULT_ID_LENGTH)
}
