use subtle::ConstantTimeEq;

/// Compare a presented API key against the configured one in constant time.
///
/// Keys of different length compare unequal without inspecting their contents.
pub fn api_keys_match(expected: &str, presented: &str) -> bool {
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_keys_match() {
        let key = "f271c81ff7084ee5b99a5091b42d486e";

        assert!(api_keys_match(key, "f271c81ff7084ee5b99a5091b42d486e"));
        assert!(!api_keys_match(key, "f271c81ff7084ee5b99a5091b42d486f"));
        assert!(!api_keys_match(key, "f271c81f"));
        assert!(!api_keys_match(key, ""));
    }
}
