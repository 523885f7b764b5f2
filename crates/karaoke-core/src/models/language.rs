use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Spoken language of the uploaded media, forwarded to the separation job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageHint {
    /// Let the server detect the language.
    #[default]
    Auto,
    Es,
    En,
    Pt,
}

impl LanguageHint {
    pub const ALL: [LanguageHint; 4] = [
        LanguageHint::Auto,
        LanguageHint::Es,
        LanguageHint::En,
        LanguageHint::Pt,
    ];

    /// Wire value sent in the `language` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageHint::Auto => "auto",
            LanguageHint::Es => "es",
            LanguageHint::En => "en",
            LanguageHint::Pt => "pt",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LanguageHint::Auto => "Automatic detection",
            LanguageHint::Es => "Spanish",
            LanguageHint::En => "English",
            LanguageHint::Pt => "Portuguese",
        }
    }
}

impl Display for LanguageHint {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageHint {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(LanguageHint::Auto),
            "es" => Ok(LanguageHint::Es),
            "en" => Ok(LanguageHint::En),
            "pt" => Ok(LanguageHint::Pt),
            _ => Err(anyhow::anyhow!(
                "Invalid language: {} (expected auto, es, en or pt)",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_languages() {
        for lang in LanguageHint::ALL {
            assert_eq!(lang.as_str().parse::<LanguageHint>().unwrap(), lang);
        }
        assert_eq!("EN".parse::<LanguageHint>().unwrap(), LanguageHint::En);
    }

    #[test]
    fn rejects_unknown_language() {
        assert!("fr".parse::<LanguageHint>().is_err());
    }

    #[test]
    fn default_is_auto() {
        assert_eq!(LanguageHint::default(), LanguageHint::Auto);
    }
}
