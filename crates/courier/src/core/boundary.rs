use crate::error::{Error, Result};

const MAX_BOUNDARY_LEN: usize = 70;

/// Generate a fresh boundary of 32 lowercase hex characters.
pub fn random_boundary() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Check a caller-chosen boundary against RFC 2046 section 5.1.1.
pub fn validate_boundary(boundary: &str) -> Result<()> {
    let valid = !boundary.is_empty()
        && boundary.len() <= MAX_BOUNDARY_LEN
        && !boundary.ends_with(' ')
        && boundary.bytes().all(is_bchar);

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidBoundary(boundary.to_string()))
    }
}

fn is_bchar(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"'()+_,-./:=? ".contains(&b)
}

/// `multipart/form-data` content type carrying `boundary`.
///
/// The boundary is quoted when it contains characters that are not valid
/// in an unquoted parameter value.
pub fn content_type(boundary: &str) -> String {
    if boundary.bytes().any(|b| b"()<>@,;:\\\"/[]?= ".contains(&b)) {
        format!("multipart/form-data; boundary=\"{boundary}\"")
    } else {
        format!("multipart/form-data; boundary={boundary}")
    }
}

/// Escape a value for use inside a quoted `Content-Disposition` parameter.
pub fn escape_quotes(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_boundary_is_valid() {
        let boundary = random_boundary();
        assert_eq!(boundary.len(), 32);
        assert!(validate_boundary(&boundary).is_ok());
        assert_ne!(boundary, random_boundary());
    }

    #[test]
    fn rejects_bad_boundaries() {
        assert!(validate_boundary("").is_err());
        assert!(validate_boundary("trailing ").is_err());
        assert!(validate_boundary("semi;colon").is_err());
        assert!(validate_boundary(&"x".repeat(71)).is_err());
        assert!(validate_boundary(&"x".repeat(70)).is_ok());
    }

    #[test]
    fn content_type_quotes_when_needed() {
        assert_eq!(
            content_type("testbound"),
            "multipart/form-data; boundary=testbound"
        );
        assert_eq!(
            content_type("a:b"),
            "multipart/form-data; boundary=\"a:b\""
        );
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        assert_eq!(escape_quotes(r#"a"b\c"#), r#"a\"b\\c"#);
    }
}
