//! Human-readable CLI output.
//!
//! JSON output goes through [`ok`] (or [`json`] for error documents) and
//! bypasses the text helpers.

use std::path::Path;

use nodetls_certs::{RootRemoval, ServerDeployReport, TrustRelation, VerifyOutcome};
use serde::Serialize;

/// Print one JSON document on stdout.
pub fn json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(s) => println!("{s}"),
        Err(e) => tracing::error!(error = %e, "Failed to serialize output"),
    }
}

/// Wrap a successful result as `{"ok": value}`.
pub fn success_document<T: Serialize>(value: &T) -> serde_json::Result<serde_json::Value> {
    Ok(serde_json::json!({ "ok": serde_json::to_value(value)? }))
}

/// Print a successful result as one JSON document on stdout.
pub fn ok<T: Serialize>(value: &T) {
    match success_document(value) {
        Ok(doc) => json(&doc),
        Err(e) => tracing::error!(error = %e, "Failed to serialize output"),
    }
}

/// Format: `RELATION\tA\tB\tDETAIL`
pub fn relation(a: &Path, b: &Path, relation: TrustRelation) {
    let detail = match relation {
        TrustRelation::Equal => "A and B trust the same certificates",
        TrustRelation::Subset => "B already trusts everything in A",
        TrustRelation::Superset => "A adds trust beyond B",
        TrustRelation::Disjoint => "neither bundle contains the other",
    };
    println!("{relation}\t{}\t{}\t{detail}", a.display(), b.display());
}

pub fn verify_outcome(host: &str, cert: &str, outcome: &VerifyOutcome) {
    match outcome {
        VerifyOutcome::Verified => println!("{cert} on {host}: OK"),
        VerifyOutcome::Skipped { reason } => println!("{cert} on {host}: skipped ({reason})"),
    }
}

pub fn removal(certs_dir: &str, removal: RootRemoval) {
    match removal {
        RootRemoval::Finalized => println!("Old root CA removed from {certs_dir}"),
        RootRemoval::NotStaged => println!("No staged root CA in {certs_dir}, nothing to do"),
    }
}

pub fn server_report(report: &ServerDeployReport) {
    println!("Server certs installed");
    if report.root_copied {
        println!("  Root: {}", report.root_path);
    } else {
        println!("  Root: {} (unchanged, already trusted)", report.root_path);
    }
    println!("  Cert: {}", report.cert_path);
    println!("  Key:  {}", report.key_path);
    match &report.verification {
        Some(VerifyOutcome::Verified) => println!("  Verified: yes"),
        Some(VerifyOutcome::Skipped { reason }) => println!("  Verified: skipped ({reason})"),
        None => println!("  Verified: no (uploaded from platform)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_output_is_wrapped_in_ok() {
        assert_eq!(
            success_document(&json!({ "relation": TrustRelation::Subset })).unwrap(),
            json!({ "ok": { "relation": "subset" } })
        );
        let skipped = VerifyOutcome::Skipped {
            reason: "openssl not found on db1".to_string(),
        };
        assert_eq!(
            success_document(&skipped).unwrap(),
            json!({ "ok": { "status": "skipped", "reason": "openssl not found on db1" } })
        );
    }
}
