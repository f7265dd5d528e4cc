use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// The fixed mood palette offered when composing an entry. Stored rows keep
/// the glyph and label as plain text so data written by older builds never
/// fails to load; this enum is the vocabulary for new entries and filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    Tired,
    Thoughtful,
    Grateful,
}

impl Mood {
    pub const ALL: [Mood; 6] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Angry,
        Mood::Tired,
        Mood::Thoughtful,
        Mood::Grateful,
    ];

    pub fn glyph(self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Sad => "😢",
            Mood::Angry => "😡",
            Mood::Tired => "😴",
            Mood::Thoughtful => "🤔",
            Mood::Grateful => "🙏",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Angry => "Angry",
            Mood::Tired => "Tired",
            Mood::Thoughtful => "Thoughtful",
            Mood::Grateful => "Grateful",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

impl FromStr for Mood {
    type Err = ParseMoodError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        for mood in Mood::ALL {
            if trimmed == mood.glyph() || trimmed.eq_ignore_ascii_case(mood.label()) {
                return Ok(mood);
            }
        }
        Err(ParseMoodError {
            value: value.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMoodError {
    value: String,
}

impl fmt::Display for ParseMoodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid mood '{}': expected one of {}",
            self.value,
            Mood::ALL
                .iter()
                .map(|mood| mood.label())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl Error for ParseMoodError {}

#[cfg(test)]
mod tests {
    use super::Mood;
    use std::str::FromStr;

    #[test]
    fn parses_glyphs_and_labels() {
        assert_eq!(Mood::from_str("😊").unwrap(), Mood::Happy);
        assert_eq!(Mood::from_str("grateful").unwrap(), Mood::Grateful);
        assert_eq!(Mood::from_str(" Thoughtful ").unwrap(), Mood::Thoughtful);
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(Mood::from_str("🚀").is_err());
        assert!(Mood::from_str("ecstatic").is_err());
    }

    #[test]
    fn glyph_and_label_pair_up() {
        for mood in Mood::ALL {
            assert_eq!(Mood::from_str(mood.glyph()).unwrap(), mood);
            assert_eq!(Mood::from_str(mood.label()).unwrap(), mood);
        }
    }
}
