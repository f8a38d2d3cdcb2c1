//! 文本规整
//!
//! 所有从 HTML 中提取的文本都要经过这里

/// 连续空白折叠为单个空格，并去掉首尾空白
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 按字符数计算长度（非字节数）
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// 转义放入卡片 HTML 的文本
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  Jane \n\t  Doe  "), "Jane Doe");
        assert_eq!(clean_text("\u{a0}Professor\u{a0}of Law"), "Professor of Law");
        assert_eq!(clean_text("   "), "");
    }

    #[test]
    fn test_char_len_counts_chars() {
        assert_eq!(char_len("café"), 4);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("A & B <i>"), "A &amp; B &lt;i&gt;");
    }
}
