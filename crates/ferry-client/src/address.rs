//! Peer address validation.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The input was not a dotted-quad IPv4 address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a valid IPv4 address: {input:?}")]
pub struct AddressError {
    /// The rejected input, verbatim.
    pub input: String,
}

/// IPv4 address of the peer to connect to.
///
/// Only exactly four dot-separated decimal octets in `0..=255` are accepted.
/// Leading zeros, surrounding whitespace, ports and hostnames are rejected,
/// so the `Display` form is always identical to the accepted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerAddress(Ipv4Addr);

impl PeerAddress {
    /// Validate user input.
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        Ipv4Addr::from_str(input)
            .map(PeerAddress)
            .map_err(|_| AddressError {
                input: input.to_string(),
            })
    }

    /// The underlying address.
    pub fn ip(&self) -> Ipv4Addr {
        self.0
    }
}

impl FromStr for PeerAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
