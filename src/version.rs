use crate::error::{ReplayError, Result};

/// Header layout: byte 0 is a marker, then two ASCII digits each for major, minor, patch.
const HEADER_VERSION_SPANS: [(usize, usize); 3] = [(1, 3), (3, 5), (5, 7)];
const HEADER_MIN_LEN: usize = 7;

fn is_numeric(component: &str) -> bool {
    !component.is_empty() && component.bytes().all(|b| b.is_ascii_digit())
}

pub fn version_to_token(version: &str) -> Result<String> {
    let mut parts = Vec::new();
    for component in version.split('.') {
        if !is_numeric(component) {
            return Err(ReplayError::invalid_version(version));
        }
        if component.len() == 1 {
            parts.push(format!("0{component}"));
        } else {
            parts.push(component.to_string());
        }
    }
    Ok(parts.join("_"))
}

pub fn token_to_version(token: &str) -> Result<String> {
    let mut parts = Vec::new();
    for component in token.split('_') {
        if !is_numeric(component) {
            return Err(ReplayError::invalid_version(token));
        }
        let n: u64 = component
            .parse()
            .map_err(|_| ReplayError::invalid_version(token))?;
        parts.push(n.to_string());
    }
    Ok(parts.join("."))
}

/// True for names shaped like a collection directory: `dd_dd_dd`.
pub fn is_version_token(name: &str) -> bool {
    let parts: Vec<&str> = name.split('_').collect();
    parts.len() == 3 && parts.iter().all(|p| p.len() == 2 && is_numeric(p))
}

pub fn extract_version_token(header_line: &[u8]) -> Result<String> {
    if header_line.len() < HEADER_MIN_LEN {
        return Err(ReplayError::MalformedReplayHeader {
            detail: format!(
                "first line is {} bytes, need at least {}",
                header_line.len(),
                HEADER_MIN_LEN
            ),
        });
    }

    let mut parts = Vec::with_capacity(HEADER_VERSION_SPANS.len());
    for (start, end) in HEADER_VERSION_SPANS {
        let span = &header_line[start..end];
        if !span.iter().all(u8::is_ascii_digit) {
            return Err(ReplayError::MalformedReplayHeader {
                detail: format!("non-digit version bytes at {start}..{end}: {span:?}"),
            });
        }
        // all ASCII digits, so this is valid UTF-8
        parts.push(String::from_utf8_lossy(span).into_owned());
    }
    Ok(parts.join("_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_pads_single_digit_components() {
        assert_eq!(version_to_token("1.2.3").unwrap(), "01_02_03");
        assert_eq!(version_to_token("1.14.0").unwrap(), "01_14_00");
        assert_eq!(version_to_token("12").unwrap(), "12");
    }

    #[test]
    fn token_drops_leading_zeros() {
        assert_eq!(token_to_version("01_02_03").unwrap(), "1.2.3");
        assert_eq!(token_to_version("01_14_00").unwrap(), "1.14.0");
    }

    #[test]
    fn two_digit_versions_round_trip() {
        for v in ["1.2.3", "0.0.0", "10.4.99", "1.5.0", "99.99.99"] {
            let token = version_to_token(v).unwrap();
            assert_eq!(token_to_version(&token).unwrap(), v, "token {token}");
            assert!(is_version_token(&token), "token {token}");
        }
    }

    #[test]
    fn non_numeric_components_are_rejected() {
        for bad in ["", "1..2", "1.x.3", "v1.2.3", "1.2.3-beta", "1. 2"] {
            assert!(
                matches!(
                    version_to_token(bad),
                    Err(ReplayError::InvalidVersionFormat { .. })
                ),
                "accepted {bad:?}"
            );
        }
        for bad in ["", "01__03", "01_a2_03", "backup"] {
            assert!(
                matches!(
                    token_to_version(bad),
                    Err(ReplayError::InvalidVersionFormat { .. })
                ),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn version_token_shape() {
        assert!(is_version_token("01_04_00"));
        assert!(!is_version_token("1_4_0"));
        assert!(!is_version_token("frames"));
        assert!(!is_version_token("01_04"));
    }

    #[test]
    fn header_offsets_are_read_verbatim() {
        assert_eq!(extract_version_token(b"R010400rest").unwrap(), "01_04_00");
        assert_eq!(extract_version_token(b"\x00011502").unwrap(), "01_15_02");
    }

    #[test]
    fn short_or_garbled_header_is_malformed() {
        assert!(matches!(
            extract_version_token(b"R0104"),
            Err(ReplayError::MalformedReplayHeader { .. })
        ));
        assert!(matches!(
            extract_version_token(b"Rab0400"),
            Err(ReplayError::MalformedReplayHeader { .. })
        ));
    }
}
