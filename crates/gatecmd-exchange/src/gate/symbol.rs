/// Normalize a user-entered pair to Gate's `BASE_QUOTE` form.
///
/// `btc_usdt`, `BTC/USDT` and ` btc-usdt ` all become `BTC_USDT`.
pub fn normalize_pair(symbol: &str) -> String {
    symbol
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

/// Gate requires custom order text to start with `t-`. Empty ids are not sent.
pub fn order_text(client_id: &str) -> Option<String> {
    let client_id = client_id.trim();
    if client_id.is_empty() {
        None
    } else if client_id.starts_with("t-") {
        Some(client_id.to_string())
    } else {
        Some(format!("t-{client_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_separators_and_case() {
        assert_eq!(normalize_pair("btc_usdt"), "BTC_USDT");
        assert_eq!(normalize_pair("BTC/USDT"), "BTC_USDT");
        assert_eq!(normalize_pair(" eth-btc "), "ETH_BTC");
        assert_eq!(normalize_pair(""), "");
    }

    #[test]
    fn order_text_prefix() {
        assert_eq!(order_text(""), None);
        assert_eq!(order_text("   "), None);
        assert_eq!(order_text("abc"), Some("t-abc".to_string()));
        assert_eq!(order_text("t-abc"), Some("t-abc".to_string()));
    }
}
