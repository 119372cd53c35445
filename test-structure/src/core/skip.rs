//! Stage override names and the boolean parser for their values.

/// Name of the override variable for `stage` (e.g. `SKIP_build`).
///
/// The stage name is used verbatim; matching is case-sensitive.
pub fn skip_var_name(prefix: &str, stage: &str) -> String {
    format!("{prefix}{stage}")
}

/// Parse an override value as a boolean.
///
/// Case-insensitive and trimmed. Returns `None` for values that are neither
/// truthy nor falsy so callers can report them.
pub fn parse_truthy(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Some(true),
        "" | "0" | "f" | "false" | "n" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_name_keeps_stage_case() {
        assert_eq!(skip_var_name("SKIP_", "build_ami"), "SKIP_build_ami");
        assert_eq!(skip_var_name("SKIP_", "Deploy"), "SKIP_Deploy");
    }

    #[test]
    fn truthy_values() {
        for value in ["1", "true", "TRUE", "True", "t", "yes", "Y", "on", " true\n"] {
            assert_eq!(parse_truthy(value), Some(true), "{value:?}");
        }
    }

    #[test]
    fn falsy_values() {
        for value in ["", "0", "false", "False", "f", "no", "off", "  "] {
            assert_eq!(parse_truthy(value), Some(false), "{value:?}");
        }
    }

    #[test]
    fn unrecognized_values() {
        assert_eq!(parse_truthy("maybe"), None);
        assert_eq!(parse_truthy("2"), None);
    }
}
