//! 日志脱敏
//!
//! 响应体可能很长（整页仓库、整页记录），凭证不能完整出现在日志里。

/// 日志中保留的响应体最大字符数
const BODY_LOG_LIMIT: usize = 512;
/// 凭证保留的前缀字符数
const SECRET_VISIBLE_CHARS: usize = 4;

/// 截断过长的响应体，按字符边界切分
pub fn truncate_for_log(s: &str) -> String {
    match s.char_indices().nth(BODY_LOG_LIMIT) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}... [{} more bytes]", &s[..cut], s.len() - cut),
    }
}

/// 遮蔽凭证，只保留前几个字符（过短的凭证完全遮蔽）
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= SECRET_VISIBLE_CHARS * 2 {
        return "****".to_string();
    }
    let visible: String = secret.chars().take(SECRET_VISIBLE_CHARS).collect();
    format!("{visible}****")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_body_unchanged() {
        let body = r#"{"message":"Bad credentials"}"#;
        assert_eq!(truncate_for_log(body), body);
    }

    #[test]
    fn long_body_reports_dropped_bytes() {
        let body = "x".repeat(BODY_LOG_LIMIT + 88);
        let result = truncate_for_log(&body);
        assert!(result.starts_with(&"x".repeat(BODY_LOG_LIMIT)));
        assert!(result.ends_with("[88 more bytes]"));
    }

    #[test]
    fn multibyte_body_cut_on_char_boundary() {
        let body = "域".repeat(BODY_LOG_LIMIT + 1);
        let result = truncate_for_log(&body);
        assert!(result.ends_with("[3 more bytes]"));
    }

    #[test]
    fn secrets_keep_only_a_prefix() {
        assert_eq!(mask_secret("ghp_abcdefghijklmnop"), "ghp_****");
        assert_eq!(mask_secret("short"), "****");
        assert_eq!(mask_secret(""), "****");
    }
}
