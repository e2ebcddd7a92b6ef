//! ap_core: Core types, domains, exact quotients, and deterministic tie RNG.
//!
//! This crate is **I/O-free**. It defines stable types/APIs used across the
//! workspace (`ap_io`, `ap_algo`, `ap_pipeline`, `ap_report`, `ap_cli`).
//!
//! - Registry token: `PartyId`
//! - Input record: `Election` + `SurplusPair`
//! - Domains: `AllocationMethod`, `TiePolicy`, `Params`
//! - Integer-first score comparisons: `Quotient`
//! - Seedable RNG (ChaCha20) for **ties only**
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod entities;
pub mod rng;
pub mod rounding;
pub mod variables;

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidToken,
        InvalidRatio,
        UnknownMethod,
        UnknownTiePolicy,
        DomainOutOfRange(&'static str),
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidToken => write!(f, "invalid token"),
                CoreError::InvalidRatio => write!(f, "invalid ratio"),
                CoreError::UnknownMethod => write!(f, "unknown allocation method"),
                CoreError::UnknownTiePolicy => write!(f, "unknown tie policy"),
                CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod ids {
    //! Party identifiers.
    //!
    //! Party names come straight from election data ("Likud", "YahadutTora",
    //! "Yesh Atid"), so the charset is lenient: 1..=64 characters, no control
    //! characters, no leading/trailing whitespace.

    use crate::errors::CoreError;
    use core::fmt;
    use core::str::FromStr;

    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};

    fn is_party_token(s: &str) -> bool {
        let n = s.chars().count();
        (1..=64).contains(&n)
            && s.trim() == s
            && !s.chars().any(char::is_control)
    }

    #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
    pub struct PartyId(String);

    impl PartyId {
        pub fn as_str(&self) -> &str { &self.0 }
    }

    impl fmt::Display for PartyId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
    }

    impl FromStr for PartyId {
        type Err = CoreError;
        fn from_str(s: &str) -> Result<Self, Self::Err> {
            if is_party_token(s) { Ok(Self(s.to_string())) } else { Err(CoreError::InvalidToken) }
        }
    }

    impl TryFrom<String> for PartyId {
        type Error = CoreError;
        fn try_from(s: String) -> Result<Self, Self::Error> {
            if is_party_token(&s) { Ok(Self(s)) } else { Err(CoreError::InvalidToken) }
        }
    }

    impl From<PartyId> for String {
        fn from(p: PartyId) -> String { p.0 }
    }

    impl AsRef<str> for PartyId {
        fn as_ref(&self) -> &str { &self.0 }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn accepts_real_party_names() {
            assert!("Likud".parse::<PartyId>().is_ok());
            assert!("Yesh Atid".parse::<PartyId>().is_ok());
            assert!("Ra'am".parse::<PartyId>().is_ok());
        }

        #[test]
        fn rejects_empty_padded_and_control() {
            assert_eq!("".parse::<PartyId>(), Err(CoreError::InvalidToken));
            assert_eq!(" Likud".parse::<PartyId>(), Err(CoreError::InvalidToken));
            assert_eq!("a\nb".parse::<PartyId>(), Err(CoreError::InvalidToken));
            let long = "x".repeat(65);
            assert!(long.parse::<PartyId>().is_err());
        }
    }
}

pub use entities::{Election, SurplusPair};
pub use errors::CoreError;
pub use ids::PartyId;
pub use rounding::Quotient;
pub use variables::{AllocationMethod, Params, TiePolicy, DEFAULT_PARLIAMENT_SIZE};
