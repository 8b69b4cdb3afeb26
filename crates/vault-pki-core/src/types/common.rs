use crate::{Result, VaultPkiError};

/// Placeholder for any name that could not be read from a certificate
pub const UNKNOWN_NAME: &str = "Unknown";

/// Name of the synthetic root group holding certificates with unresolvable issuers
pub const UNKNOWN_ROOT: &str = "Unknown Root";

/// Suffix appended to the name of an issuer that no longer exists in the backend
pub const INACTIVE_SUFFIX: &str = "(issuer inactive)";

/// Canonicalize a certificate serial to lowercase colon-separated octets.
///
/// Vault lists serials as `17:67:16:b0:...`; other sources use bare hex
/// (`1767` or `0x1767`) or dashes. Odd-length hex is left-padded with a zero.
/// Strings that are not hex at all are returned trimmed and lowercased so the
/// serial is still usable as an identifier.
#[must_use]
pub fn canonical_serial(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let digits: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | ' '))
        .collect();

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return trimmed.to_ascii_lowercase();
    }

    let mut hex = digits.to_ascii_lowercase();
    if hex.len() % 2 == 1 {
        hex.insert(0, '0');
    }

    hex.as_bytes()
        .chunks(2)
        .map(|pair| String::from_utf8_lossy(pair).into_owned())
        .collect::<Vec<_>>()
        .join(":")
}

/// Format an issuer name with the inactive suffix.
#[must_use]
pub fn inactive_name(common_name: &str) -> String {
    format!("{common_name} {INACTIVE_SUFFIX}")
}

/// Validate and normalize a PKI mount path.
///
/// Accepts one or more segments of ASCII alphanumerics, `_` and `-` separated
/// by single slashes. A single trailing slash is trimmed.
pub fn normalize_mount_path(raw: &str) -> Result<String> {
    let path = raw.strip_suffix('/').unwrap_or(raw);

    let valid = !path.is_empty()
        && path.split('/').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        });

    if valid {
        Ok(path.to_string())
    } else {
        Err(VaultPkiError::InvalidMountPath(raw.to_string()))
    }
}
