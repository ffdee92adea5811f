//! Trust-set comparison of PEM bundles.
//!
//! A bundle is decoded into typed blocks and compared as a set of DER
//! payloads. Block order, line wrapping and surrounding whitespace do not
//! affect identity; the PEM label does not either.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use base64::Engine;
use regex::Regex;
use serde::Serialize;

use crate::error::CertsError;

static PEM_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-----BEGIN([^\n]*?)-----([\s\S]*?)-----END[^\n]*?-----")
        .expect("invalid PEM block pattern")
});

/// How bundle A's trust set relates to bundle B's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustRelation {
    Equal,
    /// A is a strict subset of B.
    Subset,
    /// A is a strict superset of B.
    Superset,
    /// Neither contains the other, including partial overlap.
    Disjoint,
}

impl TrustRelation {
    /// The relation seen from the other side.
    pub fn inverse(self) -> Self {
        match self {
            Self::Subset => Self::Superset,
            Self::Superset => Self::Subset,
            other => other,
        }
    }

    /// True when A trusts nothing that B does not already trust.
    pub fn is_covered(self) -> bool {
        matches!(self, Self::Equal | Self::Subset)
    }
}

impl fmt::Display for TrustRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Equal => "equal",
            Self::Subset => "subset",
            Self::Superset => "superset",
            Self::Disjoint => "disjoint",
        };
        f.write_str(s)
    }
}

/// One decoded PEM unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertBlock {
    /// Text after `BEGIN`, e.g. `CERTIFICATE`.
    pub label: String,
    pub der: Vec<u8>,
}

/// Ordered sequence of blocks, as found in a root or chain file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertBundle {
    blocks: Vec<CertBlock>,
}

impl CertBundle {
    /// Extract and decode every PEM block in `text`. Text outside the
    /// BEGIN/END delimiters is ignored.
    pub fn parse(text: &str) -> Result<Self, CertsError> {
        let engine = base64::engine::general_purpose::STANDARD;
        let mut blocks = Vec::new();

        for (index, caps) in PEM_BLOCK.captures_iter(text).enumerate() {
            let label = caps[1].trim().to_string();
            let body: String = caps[2].split_whitespace().collect();
            let der = engine
                .decode(body.as_bytes())
                .map_err(|e| CertsError::MalformedPem {
                    index,
                    label: label.clone(),
                    reason: e.to_string(),
                })?;
            blocks.push(CertBlock { label, der });
        }

        Ok(Self { blocks })
    }

    pub fn blocks(&self) -> &[CertBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Distinct DER payloads in this bundle.
    pub fn trust_set(&self) -> BTreeSet<&[u8]> {
        self.blocks.iter().map(|b| b.der.as_slice()).collect()
    }

    pub fn relation_to(&self, other: &CertBundle) -> TrustRelation {
        let a = self.trust_set();
        let b = other.trust_set();
        if a == b {
            TrustRelation::Equal
        } else if a.is_subset(&b) {
            TrustRelation::Subset
        } else if a.is_superset(&b) {
            TrustRelation::Superset
        } else {
            TrustRelation::Disjoint
        }
    }
}

/// Compare two PEM bundles as trust sets.
pub fn compare(bundle_a: &str, bundle_b: &str) -> Result<TrustRelation, CertsError> {
    let a = CertBundle::parse(bundle_a)?;
    let b = CertBundle::parse(bundle_b)?;
    Ok(a.relation_to(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn block(payload: &[u8]) -> String {
        let b64 = base64::engine::general_purpose::STANDARD.encode(payload);
        let mut out = String::from("-----BEGIN CERTIFICATE-----\n");
        for chunk in b64.as_bytes().chunks(64) {
            out.push_str(std::str::from_utf8(chunk).unwrap());
            out.push('\n');
        }
        out.push_str("-----END CERTIFICATE-----\n");
        out
    }

    fn bundle(payloads: &[&[u8]]) -> String {
        payloads.iter().map(|p| block(p)).collect()
    }

    #[test]
    fn identical_bundles_are_equal() {
        let a = bundle(&[b"cert-a"]);
        assert_eq!(compare(&a, &a).unwrap(), TrustRelation::Equal);
    }

    #[test]
    fn chain_produces_multiple_blocks() {
        let chain = bundle(&[b"leaf", b"intermediate", b"root"]);
        let parsed = CertBundle::parse(&chain).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed.blocks()[1].der, b"intermediate");
        assert_eq!(parsed.blocks()[0].label, "CERTIFICATE");
    }

    #[test]
    fn subset_and_superset() {
        let small = bundle(&[b"cert-a"]);
        let large = bundle(&[b"cert-a", b"cert-b"]);
        assert_eq!(compare(&small, &large).unwrap(), TrustRelation::Subset);
        assert_eq!(compare(&large, &small).unwrap(), TrustRelation::Superset);
    }

    #[test]
    fn partial_overlap_is_disjoint() {
        let a = bundle(&[b"cert-a", b"cert-b"]);
        let b = bundle(&[b"cert-b", b"cert-c"]);
        assert_eq!(compare(&a, &b).unwrap(), TrustRelation::Disjoint);
    }

    #[test]
    fn unrelated_bundles_are_disjoint() {
        let a = bundle(&[b"cert-a"]);
        let b = bundle(&[b"cert-z"]);
        assert_eq!(compare(&a, &b).unwrap(), TrustRelation::Disjoint);
    }

    #[test]
    fn duplicate_blocks_collapse() {
        let once = bundle(&[b"cert-a"]);
        let twice = bundle(&[b"cert-a", b"cert-a"]);
        assert_eq!(compare(&once, &twice).unwrap(), TrustRelation::Equal);
    }

    #[test]
    fn whitespace_and_crlf_do_not_matter() {
        let plain = block(b"some certificate payload bytes");
        let mangled = plain.replace('\n', "\r\n   ").replace("-----\r\n   ", "-----\r\n");
        assert_eq!(compare(&plain, &mangled).unwrap(), TrustRelation::Equal);
    }

    #[test]
    fn text_outside_blocks_is_ignored() {
        let bare = bundle(&[b"cert-a"]);
        let annotated = format!("subject=CN = Root\nissuer=CN = Root\n{bare}\n# trailing\n");
        assert_eq!(compare(&bare, &annotated).unwrap(), TrustRelation::Equal);
    }

    #[test]
    fn empty_bundles_are_equal() {
        assert_eq!(compare("", "no pem here").unwrap(), TrustRelation::Equal);
        let a = bundle(&[b"cert-a"]);
        assert_eq!(compare("", &a).unwrap(), TrustRelation::Subset);
    }

    #[test]
    fn malformed_body_is_reported() {
        let bad = "-----BEGIN CERTIFICATE-----\nnot*base64!\n-----END CERTIFICATE-----\n";
        let err = compare(bad, bad).unwrap_err();
        assert!(matches!(err, CertsError::MalformedPem { index: 0, .. }));
    }

    #[test]
    fn inverse_swaps_only_containment() {
        assert_eq!(TrustRelation::Subset.inverse(), TrustRelation::Superset);
        assert_eq!(TrustRelation::Superset.inverse(), TrustRelation::Subset);
        assert_eq!(TrustRelation::Equal.inverse(), TrustRelation::Equal);
        assert_eq!(TrustRelation::Disjoint.inverse(), TrustRelation::Disjoint);
    }

    fn payloads() -> impl Strategy<Value = Vec<Vec<u8>>> {
        prop::collection::vec(prop::collection::vec(any::<u8>(), 1..48), 0..5)
    }

    proptest! {
        #[test]
        fn compare_is_antisymmetric(a in payloads(), b in payloads()) {
            let a_refs: Vec<&[u8]> = a.iter().map(Vec::as_slice).collect();
            let b_refs: Vec<&[u8]> = b.iter().map(Vec::as_slice).collect();
            let (a, b) = (bundle(&a_refs), bundle(&b_refs));
            let forward = compare(&a, &b).unwrap();
            let backward = compare(&b, &a).unwrap();
            prop_assert_eq!(forward, backward.inverse());
            prop_assert_eq!(compare(&a, &a).unwrap(), TrustRelation::Equal);
        }

        #[test]
        fn compare_ignores_order_and_wrapping(a in payloads(), width in 4usize..80) {
            let refs: Vec<&[u8]> = a.iter().map(Vec::as_slice).collect();
            let original = bundle(&refs);

            let engine = base64::engine::general_purpose::STANDARD;
            let rewrapped: String = refs
                .iter()
                .rev()
                .map(|p| {
                    let b64 = engine.encode(p);
                    let lines: Vec<&str> = b64
                        .as_bytes()
                        .chunks(width)
                        .map(|c| std::str::from_utf8(c).unwrap())
                        .collect();
                    format!(
                        "-----BEGIN CERTIFICATE-----\n  {}  \n-----END CERTIFICATE-----\n",
                        lines.join(" \n ")
                    )
                })
                .collect();

            prop_assert_eq!(compare(&original, &rewrapped).unwrap(), TrustRelation::Equal);
        }
    }
}
