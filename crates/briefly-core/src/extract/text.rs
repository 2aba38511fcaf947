/// Decode bytes as UTF-8, falling back to Latin-1 so no byte is lost
pub fn decode_text(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(text) => text.to_string(),
        Err(_) => data.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8() {
        assert_eq!(decode_text("naïve résumé".as_bytes()), "naïve résumé");
    }

    #[test]
    fn test_latin1_fallback() {
        assert_eq!(decode_text(&[0x72, 0xE9, 0x73, 0x75, 0x6D, 0xE9]), "r\u{e9}sum\u{e9}");
    }
}
