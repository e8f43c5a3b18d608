//! Email normalization.
//!
//! Every boundary that reads or writes an email goes through [`normalize_email`],
//! so two spellings of the same address always compare equal.

use unicode_normalization::UnicodeNormalization;
use validator::ValidateEmail;

/// Trim, compose to Unicode NFC, then case-fold.
pub fn normalize_email(email: &str) -> String {
    let composed: String = email.trim().nfc().collect();
    caseless::default_case_fold_str(&composed)
}

/// Longest local part accepted, in characters
const MAX_LOCAL_PART_LENGTH: usize = 64;

/// Syntactic check on an already-normalized address.
///
/// The local part may contain any non-ASCII character (RFC 6531); ASCII
/// characters are limited to the dot-atom set. The domain goes through
/// validator's rule, which accepts internationalized names via IDNA.
pub fn is_valid_email(normalized: &str) -> bool {
    let Some((local, domain)) = normalized.rsplit_once('@') else {
        return false;
    };
    is_valid_local_part(local) && format!("user@{}", domain).validate_email()
}

fn is_valid_local_part(local: &str) -> bool {
    if local.is_empty() || local.chars().count() > MAX_LOCAL_PART_LENGTH {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    local.chars().all(|c| {
        if c.is_ascii() {
            c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~.".contains(c)
        } else {
            !c.is_whitespace() && !c.is_control()
        }
    })
}
