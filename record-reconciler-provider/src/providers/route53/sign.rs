//! AWS Signature Version 4

use std::fmt::Write;

use sha2::{Digest, Sha256};

use crate::providers::common::hmac_sha256;
use crate::utils::log_sanitizer::{mask_secret, truncate_for_log};

use super::{ROUTE53_SERVICE, Route53Provider};

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Everything needed to sign one request.
pub(crate) struct SigningRequest<'a> {
    pub method: &'a str,
    /// Absolute path, unencoded.
    pub path: &'a str,
    /// Query parameters, unencoded.
    pub query: &'a [(String, String)],
    /// Headers to sign; names are lowercased during canonicalization.
    pub headers: &'a [(String, String)],
    pub payload: &'a str,
    /// `YYYYMMDD'T'HHMMSS'Z'`
    pub amz_date: &'a str,
}

/// Credentials and scope used to derive the signing key.
pub(crate) struct SigningKey<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub region: &'a str,
    pub service: &'a str,
}

/// Percent-encode per RFC 3986, leaving only unreserved characters.
fn uri_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Canonical (and wire) query string: encoded, sorted by key then value.
pub(crate) fn canonical_query_string(query: &[(String, String)]) -> String {
    let mut pairs: Vec<(String, String)> = query
        .iter()
        .map(|(k, v)| (uri_encode(k), uri_encode(v)))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.split('/')
        .map(uri_encode)
        .collect::<Vec<_>>()
        .join("/")
}

/// Compute the `Authorization` header value for a request.
///
/// Reference: <https://docs.aws.amazon.com/IAM/latest/UserGuide/create-signed-request.html>
pub(crate) fn authorization_header(key: &SigningKey<'_>, req: &SigningRequest<'_>) -> String {
    let date_stamp = &req.amz_date[..req.amz_date.len().min(8)];

    // 1. Canonical headers: lowercase names, trimmed values, sorted
    let mut sorted_headers: Vec<(String, &str)> = req
        .headers
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.trim()))
        .collect();
    sorted_headers.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical_headers = sorted_headers
        .iter()
        .fold(String::new(), |mut acc, (k, v)| {
            let _ = writeln!(acc, "{k}:{v}");
            acc
        });

    let signed_headers = sorted_headers
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(";");

    // 2. Canonical request
    let hashed_payload = hex::encode(Sha256::digest(req.payload.as_bytes()));
    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        req.method,
        canonical_uri(req.path),
        canonical_query_string(req.query),
        canonical_headers,
        signed_headers,
        hashed_payload
    );

    log::debug!("CanonicalRequest:\n{}", truncate_for_log(&canonical_request));

    // 3. String to sign
    let scope = format!(
        "{date_stamp}/{}/{}/aws4_request",
        key.region, key.service
    );
    let string_to_sign = format!(
        "{ALGORITHM}\n{}\n{scope}\n{}",
        req.amz_date,
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );

    log::debug!("StringToSign:\n{string_to_sign}");

    // 4. Derived signing key
    let k_date = hmac_sha256(
        format!("AWS4{}", key.secret_access_key).as_bytes(),
        date_stamp.as_bytes(),
    );
    let k_region = hmac_sha256(&k_date, key.region.as_bytes());
    let k_service = hmac_sha256(&k_region, key.service.as_bytes());
    let k_signing = hmac_sha256(&k_service, b"aws4_request");

    let signature = hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes()));

    log::debug!(
        "Signed request with {}/{scope}",
        mask_secret(key.access_key_id)
    );

    format!(
        "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
        key.access_key_id
    )
}

impl Route53Provider {
    /// Sign a Route 53 request with this provider's credentials.
    pub(crate) fn sign(&self, req: &SigningRequest<'_>) -> String {
        let key = SigningKey {
            access_key_id: &self.access_key_id,
            secret_access_key: &self.secret_access_key,
            region: &self.signing_region,
            service: ROUTE53_SERVICE,
        };
        authorization_header(&key, req)
    }
}
