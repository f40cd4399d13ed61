//! Status classification. Every helper is a pure function of the code.

pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

pub fn is_redirect(status: u16) -> bool {
    (300..400).contains(&status)
}

pub fn is_success_or_redirect(status: u16) -> bool {
    (200..400).contains(&status)
}

/// 4xx and 5xx.
pub fn is_error(status: u16) -> bool {
    status >= 400
}

pub fn is_auth_error(status: u16) -> bool {
    status == 401
}
