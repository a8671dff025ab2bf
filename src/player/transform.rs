//! URL quality-transform selection.
//!
//! Media URLs on a supported host have the shape
//! `<base>/upload/<transform-segment>/<opaque-id>` where the transform
//! segment is a comma-joined list of directive tokens the media service
//! applies server-side. Everything here is pure string policy: safe to call
//! on arbitrary URLs, idempotent on its own output.

use url::Url;

use crate::config::QualityConfig;
use crate::models::QualityTier;

/// Path component after which a transform segment may appear.
const UPLOAD_MARKER: &str = "/upload/";

/// Reserved token prefixes that identify a transform segment. A path segment
/// made entirely of these is ours to strip; anything else is part of the
/// opaque id and untouchable.
const DIRECTIVE_PREFIXES: [&str; 6] = ["q_", "br_", "ar_", "ac_", "f_", "fl_"];

/// Compose the transformed URL for a tier, stripping any prior transform
/// segment first so directives never compound.
pub fn select_transform(raw_url: &str, tier: QualityTier, quality: &QualityConfig) -> String {
    if !is_media_host(raw_url, quality) {
        return raw_url.to_string();
    }

    let clean = strip_transform(raw_url);
    let Some((base, rest)) = clean.split_once(UPLOAD_MARKER) else {
        return raw_url.to_string();
    };

    let params = quality.tier_params(tier);
    let quality_token = match tier {
        QualityTier::Low => "q_auto:low",
        QualityTier::Medium => "q_auto:good",
        QualityTier::High => "q_auto:best",
    };
    let segment = format!(
        "{},br_{}k,ar_{},ac_{},f_auto,fl_streaming_attachment",
        quality_token, params.bitrate_kbps, params.sample_rate_hz, params.channels
    );

    format!("{}{}{}/{}", base, UPLOAD_MARKER, segment, rest)
}

/// Remove a transform segment if one follows the upload marker. This is the
/// "clean" URL used when retrying after a network-class error.
pub fn strip_transform(url: &str) -> String {
    let Some((base, rest)) = url.split_once(UPLOAD_MARKER) else {
        return url.to_string();
    };

    let first_segment = rest.split('/').next().unwrap_or("");
    if is_transform_segment(first_segment) {
        let remainder = &rest[first_segment.len()..];
        let remainder = remainder.strip_prefix('/').unwrap_or(remainder);
        format!("{}{}{}", base, UPLOAD_MARKER, remainder)
    } else {
        url.to_string()
    }
}

/// Rewrite to a single forced-compatible container, for the one-shot
/// unsupported-format fallback.
pub fn forced_fallback(url: &str, quality: &QualityConfig) -> String {
    if !is_media_host(url, quality) {
        return url.to_string();
    }

    let clean = strip_transform(url);
    let Some((base, rest)) = clean.split_once(UPLOAD_MARKER) else {
        return url.to_string();
    };

    format!(
        "{}{}f_{}/{}",
        base, UPLOAD_MARKER, quality.fallback_container, rest
    )
}

fn is_media_host(raw_url: &str, quality: &QualityConfig) -> bool {
    let Ok(parsed) = Url::parse(raw_url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };

    quality
        .media_hosts
        .iter()
        .any(|h| host == h || host.ends_with(&format!(".{}", h)))
}

fn is_transform_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.split(',').all(|token| {
            DIRECTIVE_PREFIXES
                .iter()
                .any(|prefix| token.starts_with(prefix))
        })
}
