// src/data/sid.rs

//! Implement [`Sid`], a Windows security identifier as stored in an event
//! record, and [`SidResolver`], best-effort translation of a `Sid` to an
//! account name.
//!
//! The binary layout is
//!
//! ```text
//! revision              u8
//! sub_authority_count   u8
//! identifier_authority  [u8; 6]   (big-endian)
//! sub_authorities       [u32; sub_authority_count]   (little-endian)
//! ```
//!
//! See [SID structure].
//!
//! [SID structure]: https://learn.microsoft.com/en-us/windows/win32/api/winnt/ns-winnt-sid

use std::fmt;

use ::phf::phf_map;

use crate::data::evt::u32_at;

/// Largest count of sub-authorities allowed in a `SID`.
pub const SID_MAX_SUB_AUTHORITIES: usize = 15;

/// Size of a `SID` without sub-authorities.
pub const SID_SZ_MIN: usize = 8;

/// A parsed security identifier.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Sid {
    revision: u8,
    authority: u64,
    sub_authorities: Vec<u32>,
}

impl Sid {
    /// Parse a binary `SID`. Returns `None` if `buffer` is not exactly one
    /// well-formed `SID`.
    pub fn from_bytes(buffer: &[u8]) -> Option<Sid> {
        if buffer.len() < SID_SZ_MIN {
            return None;
        }
        let revision: u8 = buffer[0];
        if revision != 1 {
            return None;
        }
        let count: usize = buffer[1] as usize;
        if count > SID_MAX_SUB_AUTHORITIES || buffer.len() != SID_SZ_MIN + count * 4 {
            return None;
        }
        let authority: u64 = buffer[2..8]
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | *byte as u64);
        let mut sub_authorities: Vec<u32> = Vec::with_capacity(count);
        for i in 0..count {
            sub_authorities.push(u32_at(buffer, SID_SZ_MIN + i * 4)?);
        }

        Some(Sid {
            revision,
            authority,
            sub_authorities,
        })
    }

    pub const fn revision(&self) -> u8 {
        self.revision
    }

    pub const fn authority(&self) -> u64 {
        self.authority
    }

    pub fn sub_authorities(&self) -> &[u32] {
        &self.sub_authorities
    }
}

/// Write the textual `S-R-I-S-S…` form. An identifier authority of 2^32 or
/// more is written in hexadecimal.
impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}-", self.revision)?;
        if self.authority >= (1 << 32) {
            write!(f, "{:#014x}", self.authority)?;
        } else {
            write!(f, "{}", self.authority)?;
        }
        for sub in self.sub_authorities.iter() {
            write!(f, "-{}", sub)?;
        }

        Ok(())
    }
}

/// Hexadecimal form of a raw identifier that is not a well-formed `SID`.
pub fn sid_bytes_to_hex(buffer: &[u8]) -> String {
    let mut s: String = String::with_capacity(buffer.len() * 2 + 2);
    s.push_str("0x");
    for byte in buffer.iter() {
        s.push_str(&format!("{:02X}", byte));
    }

    s
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// resolvers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Best-effort translation of a [`Sid`] to an account name.
///
/// A resolver must never fail the decoding of a record; return `None` when
/// the name is not known.
pub trait SidResolver: Send + Sync {
    fn resolve(&self, sid: &Sid) -> Option<String>;
}

/// Well-known `SID`s that are the same on every Windows system.
///
/// See [Well-known SIDs].
///
/// [Well-known SIDs]: https://learn.microsoft.com/en-us/windows/win32/secauthz/well-known-sids
pub static WELL_KNOWN_SIDS: phf::Map<&'static str, &'static str> = phf_map! {
    "S-1-0-0" => "NULL SID",
    "S-1-1-0" => "Everyone",
    "S-1-2-0" => "LOCAL",
    "S-1-3-0" => "CREATOR OWNER",
    "S-1-3-1" => "CREATOR GROUP",
    "S-1-5-1" => "NT AUTHORITY\\DIALUP",
    "S-1-5-2" => "NT AUTHORITY\\NETWORK",
    "S-1-5-3" => "NT AUTHORITY\\BATCH",
    "S-1-5-4" => "NT AUTHORITY\\INTERACTIVE",
    "S-1-5-6" => "NT AUTHORITY\\SERVICE",
    "S-1-5-7" => "NT AUTHORITY\\ANONYMOUS LOGON",
    "S-1-5-9" => "NT AUTHORITY\\ENTERPRISE DOMAIN CONTROLLERS",
    "S-1-5-10" => "NT AUTHORITY\\SELF",
    "S-1-5-11" => "NT AUTHORITY\\Authenticated Users",
    "S-1-5-12" => "NT AUTHORITY\\RESTRICTED",
    "S-1-5-13" => "NT AUTHORITY\\TERMINAL SERVER USER",
    "S-1-5-14" => "NT AUTHORITY\\REMOTE INTERACTIVE LOGON",
    "S-1-5-17" => "NT AUTHORITY\\IUSR",
    "S-1-5-18" => "NT AUTHORITY\\SYSTEM",
    "S-1-5-19" => "NT AUTHORITY\\LOCAL SERVICE",
    "S-1-5-20" => "NT AUTHORITY\\NETWORK SERVICE",
    "S-1-5-32-544" => "BUILTIN\\Administrators",
    "S-1-5-32-545" => "BUILTIN\\Users",
    "S-1-5-32-546" => "BUILTIN\\Guests",
    "S-1-5-32-547" => "BUILTIN\\Power Users",
    "S-1-5-32-548" => "BUILTIN\\Account Operators",
    "S-1-5-32-549" => "BUILTIN\\Server Operators",
    "S-1-5-32-550" => "BUILTIN\\Print Operators",
    "S-1-5-32-551" => "BUILTIN\\Backup Operators",
    "S-1-5-32-552" => "BUILTIN\\Replicator",
    "S-1-5-32-555" => "BUILTIN\\Remote Desktop Users",
    "S-1-5-32-556" => "BUILTIN\\Network Configuration Operators",
};

/// A [`SidResolver`] that knows only [`WELL_KNOWN_SIDS`].
#[derive(Clone, Copy, Debug, Default)]
pub struct WellKnownSidResolver;

impl SidResolver for WellKnownSidResolver {
    fn resolve(&self, sid: &Sid) -> Option<String> {
        WELL_KNOWN_SIDS
            .get(sid.to_string().as_str())
            .map(|name| String::from(*name))
    }
}

/// A [`SidResolver`] that resolves nothing; every user is shown as a
/// textual `SID`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSidResolver;

impl SidResolver for NoSidResolver {
    fn resolve(&self, _sid: &Sid) -> Option<String> {
        None
    }
}
