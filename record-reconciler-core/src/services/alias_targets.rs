//! Fixed alias target zones

use crate::error::{ReconcileError, ReconcileResult};

/// Hosted zone id shared by every CloudFront distribution.
pub const CLOUDFRONT_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";

/// S3 website endpoint hosted zone ids, by region.
const S3_WEBSITE_ZONES: &[(&str, &str)] = &[
    ("us-east-2", "Z2O1EMRO9K5GLX"),
    ("us-east-1", "Z3AQBSTGFYJSTF"),
    ("us-west-1", "Z2F56UZL2M1ACD"),
    ("us-west-2", "Z3BJ6K6RIION7M"),
    ("af-south-1", "Z83WF9RJE8B12"),
    ("ap-east-1", "ZNB98KWMFR0R6"),
    ("ap-south-1", "Z11RGJOFQNVJUP"),
    ("ap-northeast-3", "Z2YQB5RD63NC85"),
    ("ap-northeast-2", "Z3W03O7B5YMIYP"),
    ("ap-northeast-1", "Z2M4EHUR26P7ZW"),
    ("ap-southeast-2", "Z1WCIGYICN2BYD"),
    ("ap-southeast-1", "Z3O0J2DXBE1FTB"),
    ("ca-central-1", "Z1QDHH18159H29"),
    ("cn-northwest-1", "Z282HJ1KT0DH03"),
    ("eu-central-1", "Z21DNDUVLTQW6Q"),
    ("eu-west-1", "Z1BKCTXD74EZPE"),
    ("eu-west-2", "Z3GKZC51ZF0DB4"),
    ("eu-west-3", "Z3R1K369G5AVDG"),
    ("eu-south-1", "Z30OZKI7KPW7MI"),
    ("eu-north-1", "Z3BAZG2TWCNX0D"),
    ("me-south-1", "Z1MPMWCPA7YB62"),
    ("sa-east-1", "Z7KQH4QJS55SO"),
];

/// Hosted zone id and DNS name of the S3 website endpoint in `region`.
pub fn s3_website_target(region: &str) -> ReconcileResult<(&'static str, String)> {
    let region = region.trim();
    let zone_id = S3_WEBSITE_ZONES
        .iter()
        .find(|(r, _)| *r == region)
        .map(|(_, zone)| *zone)
        .ok_or_else(|| ReconcileError::UnknownS3Region(region.to_string()))?;

    let dns_name = if region.starts_with("cn-") {
        format!("s3-website.{region}.amazonaws.com.cn")
    } else {
        format!("s3-website-{region}.amazonaws.com")
    };
    Ok((zone_id, dns_name))
}
