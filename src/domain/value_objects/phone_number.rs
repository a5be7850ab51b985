use anyhow::{Result, bail};

/// Brazilian country code, prepended when the stored phone lacks it.
pub const DEFAULT_COUNTRY_CODE: &str = "55";

/// Suffix selecting the direct-message channel on the transport.
pub const DIRECT_MESSAGE_SUFFIX: &str = "@s.whatsapp.net";

/// Normalizes a stored phone into the transport address: digits only,
/// country code prefixed, direct-message suffix appended.
pub fn normalize_whatsapp_address(raw: &str) -> Result<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        bail!("Invalid phone: no digits in {:?}", raw);
    }

    let with_country_code = if digits.starts_with(DEFAULT_COUNTRY_CODE) {
        digits
    } else {
        format!("{}{}", DEFAULT_COUNTRY_CODE, digits)
    };

    Ok(format!("{}{}", with_country_code, DIRECT_MESSAGE_SUFFIX))
}

/// Digits-only form of a phone, used as the duplicate-detection key.
pub fn phone_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}
