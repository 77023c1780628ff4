//! Display formatting for counters.

/// Format a word count the way the site's readers expect ("12.3万字").
pub fn format_word_count(count: Option<i64>) -> String {
    match count {
        None | Some(0) => "未知".to_string(),
        Some(n) if n >= 10_000 => format!("{:.1}万字", n as f64 / 10_000.0),
        Some(n) => format!("{}字", n),
    }
}

/// Format a number with thousands separators.
pub fn format_number(num: i64) -> String {
    let digits = num.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if num < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
