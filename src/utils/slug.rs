/// 把标题转换为 URL slug（小写 ASCII，单词以 `-` 连接）
///
/// 非 ASCII 字符直接丢弃；结果为空时返回 `campaign`。
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' || c.is_ascii_punctuation() {
            pending_dash = true;
        }
    }

    slug.truncate(150);
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "campaign".to_string()
    } else {
        slug
    }
}

/// 第 n 个候选 slug：`base`, `base-2`, `base-3` ...
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_string()
    } else {
        format!("{base}-{attempt}")
    }
}
