//! Token derivation
//!
//!     A token is the prefix character followed by the first 16 hex characters of a digest of
//!     the lowercased display name. Collisions between distinct names are possible and accepted.
//!
//!     The digest itself is pluggable through [`IdDigest`]. [`Sha256Digest`] is the default.

use sha2::{Digest, Sha256};
use tracing::warn;

/// Leading character of every token.
pub const TOKEN_PREFIX: char = 'x';

/// Number of hex characters following the prefix.
pub const TOKEN_HEX_LEN: usize = 16;

/// Total token length in bytes (all characters are ASCII).
pub const TOKEN_LEN: usize = TOKEN_HEX_LEN + 1;

/// Deterministic hex digest used to derive tokens.
///
/// Implementations should return lowercase hex of at least [`TOKEN_HEX_LEN`] characters and
/// must not fail for any input. See [`derive_with`] for what happens otherwise.
pub trait IdDigest: Send + Sync {
    fn hex_digest(&self, input: &str) -> String;
}

/// SHA-256, hex encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digest;

impl IdDigest for Sha256Digest {
    fn hex_digest(&self, input: &str) -> String {
        hex::encode(Sha256::digest(input.as_bytes()))
    }
}

impl<F> IdDigest for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn hex_digest(&self, input: &str) -> String {
        self(input)
    }
}

/// Derive the token for `name` using `digest`.
///
/// Digest output that breaks the [`IdDigest`] contract is normalized rather than rejected: its
/// hex digits are lowercased, anything else is dropped, and the result is right-padded with
/// `0` to [`TOKEN_HEX_LEN`]. The returned token always matches the scanner's grammar.
pub fn derive_with(name: &str, digest: &dyn IdDigest) -> String {
    let folded = name.to_lowercase();
    let hex = digest.hex_digest(&folded);
    let mut token = String::with_capacity(TOKEN_LEN);
    token.push(TOKEN_PREFIX);
    match hex.get(..TOKEN_HEX_LEN).filter(|prefix| is_lower_hex(prefix)) {
        Some(prefix) => token.push_str(prefix),
        None => {
            warn!(output = %hex, "digest output is not lowercase hex, normalizing");
            token.extend(
                hex.chars()
                    .filter(char::is_ascii_hexdigit)
                    .map(|c| c.to_ascii_lowercase())
                    .chain(std::iter::repeat('0'))
                    .take(TOKEN_HEX_LEN),
            );
        }
    }
    token
}

fn is_lower_hex(text: &str) -> bool {
    text.bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Derive the token for `name` with the default SHA-256 digest.
pub fn derive(name: &str) -> String {
    derive_with(name, &Sha256Digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reveal::scanner::scan;
    use rstest::rstest;

    #[test]
    fn token_has_fixed_shape() {
        let token = derive("teams-prod");
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.starts_with(TOKEN_PREFIX));
        assert!(token[1..]
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn derivation_ignores_case() {
        assert_eq!(derive("Teams-Prod"), derive("teams-prod"));
        assert_eq!(derive("TEAMS-PROD"), derive("teams-prod"));
    }

    #[test]
    fn distinct_names_give_distinct_tokens() {
        assert_ne!(derive("teams-prod"), derive("teams-dev"));
    }

    #[test]
    fn sha256_prefix_of_known_input() {
        // sha256("abc") = ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad
        assert_eq!(derive("ABC"), "xba7816bf8f01cfea");
    }

    #[test]
    fn custom_digest_is_used() {
        let digest = |input: &str| format!("{:0>64}", input.len());
        assert_eq!(derive_with("abcd", &digest), "x0000000000000000");
    }

    #[rstest]
    #[case::short(|_: &str| "abc".to_string(), "xabc0000000000000")]
    #[case::empty(|_: &str| String::new(), "x0000000000000000")]
    #[case::uppercase(|_: &str| "ABCDEF0123456789FF".to_string(), "xabcdef0123456789")]
    #[case::multibyte(|_: &str| "ééééééééé1".to_string(), "x1000000000000000")]
    fn malformed_digest_output_is_normalized(
        #[case] digest: fn(&str) -> String,
        #[case] expected: &str,
    ) {
        let token = derive_with("anything", &digest);
        assert_eq!(token, expected);
        assert_eq!(scan(&token).len(), 1);
    }

    #[test]
    fn derived_tokens_are_scannable() {
        let token = derive("payments");
        let text = format!("ns {} here", token);
        let matches = scan(&text);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].token, token);
    }
}
