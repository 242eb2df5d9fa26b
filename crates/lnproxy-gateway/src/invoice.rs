//! Route and invoice grammar for the relay endpoints.
//!
//! A relay path is `/wrap/<invoice>` or `/api/<invoice>`. The invoice must look
//! like a BOLT-11 payment request: the `lnbc` prefix, any characters, a `1`
//! separator and a non-empty Bech32 data part. BOLT-11 only allows single-case
//! encodings, so an all-lower and an all-upper form are accepted and anything
//! mixing the two is not. Checksums are never verified here.

use std::fmt;

/// Bech32 data alphabet (lower-case form).
const BECH32_CHARSET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";

const LOWER_PREFIX: &str = "lnbc";
const UPPER_PREFIX: &str = "LNBC";
const LOWER_SCHEME: &str = "lightning:";
const UPPER_SCHEME: &str = "LIGHTNING:";

/// Which relay endpoint a path addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayRoute {
    /// `/wrap/<invoice>`: browser page with QR code.
    Wrap,
    /// `/api/<invoice>`: text or JSON for scripts.
    Api,
}

impl RelayRoute {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayRoute::Wrap => "wrap",
            RelayRoute::Api => "api",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Case {
    Lower,
    Upper,
}

/// A syntactically valid invoice, scheme prefix already removed.
///
/// Only [`parse_invoice`] and [`match_relay_path`] construct this type, so
/// holding one means the grammar check has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice(String);

impl Invoice {
    /// The invoice exactly as it appeared in the request.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-case form sent to the wrapping backend.
    pub fn to_backend_form(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for Invoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Match a decoded request path against the relay routes.
///
/// Returns `None` when the path names neither route or the trailing segment
/// fails the invoice grammar; callers answer that with 404.
pub fn match_relay_path(path: &str) -> Option<(RelayRoute, Invoice)> {
    let (route, rest) = if let Some(rest) = path.strip_prefix("/wrap/") {
        (RelayRoute::Wrap, rest)
    } else if let Some(rest) = path.strip_prefix("/api/") {
        (RelayRoute::Api, rest)
    } else {
        return None;
    };
    parse_invoice(rest).map(|invoice| (route, invoice))
}

/// Validate a candidate invoice, stripping an optional `lightning:` scheme.
pub fn parse_invoice(candidate: &str) -> Option<Invoice> {
    if let Some(body) = candidate.strip_prefix(LOWER_SCHEME) {
        return check_body(body, Case::Lower).map(|_| Invoice(body.to_string()));
    }
    if let Some(body) = candidate.strip_prefix(UPPER_SCHEME) {
        return check_body(body, Case::Upper).map(|_| Invoice(body.to_string()));
    }
    [Case::Lower, Case::Upper]
        .into_iter()
        .find_map(|case| check_body(candidate, case))
        .map(|_| Invoice(candidate.to_string()))
}

fn check_body(body: &str, case: Case) -> Option<()> {
    let prefix = match case {
        Case::Lower => LOWER_PREFIX,
        Case::Upper => UPPER_PREFIX,
    };
    let after_prefix = body.strip_prefix(prefix)?;

    // Single-case rule covers the free-form middle as well as the data part.
    let mixed = match case {
        Case::Lower => body.chars().any(char::is_uppercase),
        Case::Upper => body.chars().any(char::is_lowercase),
    };
    if mixed {
        return None;
    }

    // `1` is not in the alphabet, so the data part must follow the last one.
    let sep = after_prefix.rfind('1')?;
    let data = &after_prefix[sep + 1..];
    if data.is_empty() {
        return None;
    }
    data.chars()
        .all(|c| is_bech32_char(c, case))
        .then_some(())
}

fn is_bech32_char(c: char, case: Case) -> bool {
    match case {
        Case::Lower => BECH32_CHARSET.contains(c),
        // Digits have no case and belong to both forms.
        Case::Upper => !c.is_lowercase() && BECH32_CHARSET.contains(c.to_ascii_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "lnbc10u1pjdtsm5pp5qvv0m2zmgt8q9grqn3f5gqx8vsvsk8w9mtk6gf2x0uv8dpuyqvyqdqqcqzzsxqyz5vqsp5";

    #[test]
    fn test_accepts_lower_case_on_both_routes() {
        let (route, inv) = match_relay_path(&format!("/wrap/{SAMPLE}")).unwrap();
        assert_eq!(route, RelayRoute::Wrap);
        assert_eq!(inv.as_str(), SAMPLE);

        let (route, inv) = match_relay_path(&format!("/api/{SAMPLE}")).unwrap();
        assert_eq!(route, RelayRoute::Api);
        assert_eq!(inv.as_str(), SAMPLE);
    }

    #[test]
    fn test_accepts_upper_case_and_lowers_for_backend() {
        let upper = SAMPLE.to_ascii_uppercase();
        let (_, inv) = match_relay_path(&format!("/api/{upper}")).unwrap();
        assert_eq!(inv.as_str(), upper);
        assert_eq!(inv.to_backend_form(), SAMPLE);
    }

    #[test]
    fn test_upper_case_data_part_with_digits() {
        let inv = parse_invoice("LNBC1QP2").unwrap();
        assert_eq!(inv.to_backend_form(), "lnbc1qp2");

        let inv = parse_invoice("LIGHTNING:LNBC10U1PJDTSM5PP5").unwrap();
        assert_eq!(inv.as_str(), "LNBC10U1PJDTSM5PP5");
        assert_eq!(inv.to_backend_form(), "lnbc10u1pjdtsm5pp5");
    }

    #[test]
    fn test_non_ascii_case_in_middle_section() {
        assert!(parse_invoice("lnbc\u{c9}1qq").is_none());
        assert!(parse_invoice("LNBC\u{e9}1QQ").is_none());

        let inv = parse_invoice("LNBC\u{c9}1QQ").unwrap();
        assert_eq!(inv.to_backend_form(), "lnbc\u{e9}1qq");
    }

    #[test]
    fn test_rejects_mixed_case() {
        assert!(parse_invoice("lnbc1QPZRY").is_none());
        assert!(parse_invoice("LNBC1qpzry").is_none());
        assert!(parse_invoice("lnbcXYZ1qpzry").is_none());
        assert!(parse_invoice("Lnbc1qpzry").is_none());
    }

    #[test]
    fn test_strips_scheme_prefix_matching_case() {
        let inv = parse_invoice("lightning:lnbc1qpzry").unwrap();
        assert_eq!(inv.as_str(), "lnbc1qpzry");

        let inv = parse_invoice("LIGHTNING:LNBC1QPZRY").unwrap();
        assert_eq!(inv.as_str(), "LNBC1QPZRY");

        assert!(parse_invoice("LIGHTNING:lnbc1qpzry").is_none());
        assert!(parse_invoice("lightning:LNBC1QPZRY").is_none());
    }

    #[test]
    fn test_requires_separator_and_data() {
        assert!(parse_invoice("lnbc").is_none());
        assert!(parse_invoice("lnbc1").is_none());
        assert!(parse_invoice("lnbcqpzry").is_none());
        assert!(parse_invoice("lnbc1acd").is_some());
        // 'b' is not a Bech32 character.
        assert!(parse_invoice("lnbc1abc").is_none());
        assert!(parse_invoice("lnbc1qpzry1").is_none());
    }

    #[test]
    fn test_middle_section_is_free_form() {
        assert!(parse_invoice("lnbc2500u1qpzry").is_some());
        assert!(parse_invoice("lnbc-anything.goes11qq").is_some());
    }

    #[test]
    fn test_anchored_at_both_ends() {
        // 'b', 'i' and 'o' are outside the Bech32 alphabet.
        assert!(match_relay_path("/wrap/lnbc1qpzryb").is_none());
        assert!(match_relay_path("/wrap/lnbc1qpzry/").is_none());
        assert!(match_relay_path("/wrap/lnbc1qpzry?x").is_none());
        assert!(match_relay_path("/wrap/xlnbc1qpzry").is_none());
        assert!(match_relay_path("/wrap/ lnbc1qpzry").is_none());
    }

    #[test]
    fn test_long_data_part() {
        let long = format!("lnbc1{}", "qpzry9x8gf2tvdw0s3jn54khce6mua7l".repeat(40));
        assert!(parse_invoice(&long).is_some());
    }

    #[test]
    fn test_unknown_routes() {
        assert!(match_relay_path(&format!("/pay/{SAMPLE}")).is_none());
        assert!(match_relay_path(&format!("wrap/{SAMPLE}")).is_none());
        assert!(match_relay_path("/wrap/").is_none());
        assert!(match_relay_path("/api").is_none());
    }
}
