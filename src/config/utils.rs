/// Parse a timeout given in whole seconds
///
/// `name` identifies the source of the value in the error message.
pub fn parse_seconds(name: &str, value: &str) -> Result<u64, String> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("Invalid {name} value '{value}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds_valid() {
        assert_eq!(parse_seconds("X", "20"), Ok(20));
        assert_eq!(parse_seconds("X", " 15 "), Ok(15));
        assert_eq!(parse_seconds("X", "0"), Ok(0));
    }

    #[test]
    fn test_parse_seconds_invalid() {
        assert!(parse_seconds("X", "").is_err());
        assert!(parse_seconds("X", "-1").is_err());
        assert!(parse_seconds("X", "1.5").is_err());
        let err = parse_seconds("VOLC_ASR_TIMEOUT_SECONDS", "soon").unwrap_err();
        assert!(err.contains("VOLC_ASR_TIMEOUT_SECONDS"));
    }
}
