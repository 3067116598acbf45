use crate::error::{AppError, AppResult};
use regex::Regex;

/// 校验邮箱格式（只做基本形状检查）
pub fn validate_email(email: &str) -> AppResult<()> {
    let email_regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    if !email_regex.is_match(email) {
        return Err(AppError::ValidationError(format!(
            "Invalid email address: {email}"
        )));
    }

    Ok(())
}

/// 规范化印尼手机号为 `+62xxxxxxxxx`
///
/// 接受 `08..`、`628..`、`+628..` 以及带空格、横线、括号的写法。
pub fn normalize_id_phone(phone: &str) -> AppResult<String> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    let national = if let Some(rest) = digits.strip_prefix("62") {
        rest
    } else if let Some(rest) = digits.strip_prefix('0') {
        rest
    } else {
        digits.as_str()
    };

    let formatted = format!("+62{national}");
    let phone_regex =
        Regex::new(r"^\+628\d{7,12}$").map_err(|e| AppError::InternalError(e.to_string()))?;

    if !phone_regex.is_match(&formatted) {
        return Err(AppError::ValidationError(format!(
            "Invalid Indonesian phone number: {phone}"
        )));
    }

    Ok(formatted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("donatur@pesantren.id").is_ok());
        assert!(validate_email("a.b+c@mail.co.id").is_ok());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("spaces in@mail.com").is_err());
        assert!(validate_email("user@localhost").is_err());
    }

    #[test]
    fn test_normalize_id_phone() {
        assert_eq!(normalize_id_phone("081234567890").unwrap(), "+6281234567890");
        assert_eq!(normalize_id_phone("6281234567890").unwrap(), "+6281234567890");
        assert_eq!(normalize_id_phone("+62 812-3456-7890").unwrap(), "+6281234567890");
        assert_eq!(normalize_id_phone("(0812) 3456 789").unwrap(), "+628123456789");
    }

    #[test]
    fn test_normalize_id_phone_rejects_invalid() {
        assert!(normalize_id_phone("12345").is_err());
        assert!(normalize_id_phone("+1 202 555 0100").is_err());
        assert!(normalize_id_phone("0212345678").is_err());
    }
}
