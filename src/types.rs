use std::str::FromStr;

use serde::Deserialize;

/// Shape of each entry in the JSON payload handed to the external tool.
///
/// - `Plain`: the task record object itself (default).
/// - `Frecklecute`: the record wrapped as `{"frecklecute": {...}}`, the
///   longer task-list form the `freckles` CLI also accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Envelope {
    Plain,
    Frecklecute,
}

impl Default for Envelope {
    fn default() -> Self {
        Envelope::Plain
    }
}

impl FromStr for Envelope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" => Ok(Envelope::Plain),
            "frecklecute" => Ok(Envelope::Frecklecute),
            other => Err(format!(
                "invalid envelope: {other} (expected \"plain\" or \"frecklecute\")"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_envelope_names_case_insensitively() {
        assert_eq!("plain".parse::<Envelope>(), Ok(Envelope::Plain));
        assert_eq!(" Frecklecute ".parse::<Envelope>(), Ok(Envelope::Frecklecute));
        assert!("nested".parse::<Envelope>().is_err());
    }
}
