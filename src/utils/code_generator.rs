use chrono::{DateTime, Utc};
use rand::Rng;

const RECEIPT_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// 生成捐款收据号：`<前缀>-<YYYYMMDD>-<6位随机字母数字>`
///
/// 去掉了容易混淆的 0/O、1/I，便于捐款人电话或短信报号。
pub fn generate_receipt_number(prefix: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}-{}-{}",
        prefix.trim().to_ascii_uppercase(),
        now.format("%Y%m%d"),
        random_code(6)
    )
}

pub fn random_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| RECEIPT_ALPHABET[rng.gen_range(0..RECEIPT_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generate_receipt_number_format() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap();
        let receipt = generate_receipt_number("psn", now);

        let parts: Vec<&str> = receipt.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "PSN");
        assert_eq!(parts[1], "20250314");
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].bytes().all(|b| RECEIPT_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_random_code_avoids_ambiguous_characters() {
        let code = random_code(64);
        assert_eq!(code.len(), 64);
        assert!(!code.contains(['0', 'O', '1', 'I']));
    }
}
