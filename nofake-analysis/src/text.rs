/// First `max` characters of `s` (never splits a code point).
pub fn prefix_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// `s` cut to `max` characters with `...` appended when anything was cut.
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    let head = prefix_chars(s, max);
    if head.len() == s.len() {
        s.to_string()
    } else {
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_respects_multibyte_chars() {
        assert_eq!(prefix_chars("añoñeño", 3), "año");
        assert_eq!(prefix_chars("abc", 10), "abc");
        assert_eq!(prefix_chars("", 5), "");
    }

    #[test]
    fn ellipsis_only_when_cut() {
        assert_eq!(truncate_with_ellipsis("corto", 200), "corto");
        let long = "x".repeat(250);
        let cut = truncate_with_ellipsis(&long, 200);
        assert_eq!(cut.len(), 203);
        assert!(cut.ends_with("..."));
    }
}
