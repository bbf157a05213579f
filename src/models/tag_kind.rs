use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Category of a descriptive tag.
///
/// Each kind has its own registry and its own reference field on a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    /// A person involved in the case. Named and colored.
    Character,
    /// A location. Named and colored.
    Place,
    /// A free-text time label such as "朝" or "13:00".
    Time,
    /// A free-text date label such as "1日目".
    Date,
}

impl TagKind {
    /// All kinds in display order.
    pub const ALL: [TagKind; 4] = [Self::Character, Self::Place, Self::Time, Self::Date];

    /// Returns true for kinds whose entities carry a color.
    pub fn is_colored(self) -> bool {
        matches!(self, Self::Character | Self::Place)
    }

    /// Returns the lowercase name used on the wire and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Place => "place",
            Self::Time => "time",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "character" | "char" => Ok(Self::Character),
            "place" => Ok(Self::Place),
            "time" => Ok(Self::Time),
            "date" => Ok(Self::Date),
            _ => Err(ParseError::UnknownKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_kind_serializes_to_lowercase() {
        let json = serde_json::to_string(&TagKind::Character).unwrap();
        assert_eq!(json, r#""character""#);

        let parsed: TagKind = serde_json::from_str(r#""date""#).unwrap();
        assert_eq!(parsed, TagKind::Date);
    }

    #[test]
    fn tag_kind_deserialization_fails_on_unknown_variant() {
        let result: Result<TagKind, _> = serde_json::from_str(r#""weapon""#);
        assert!(result.is_err());
    }

    #[test]
    fn from_str_accepts_short_alias_and_case() {
        assert_eq!("Char".parse::<TagKind>().unwrap(), TagKind::Character);
        assert_eq!("PLACE".parse::<TagKind>().unwrap(), TagKind::Place);
        assert!("weapon".parse::<TagKind>().is_err());
    }

    #[test]
    fn only_character_and_place_are_colored() {
        let colored: Vec<TagKind> = TagKind::ALL
            .into_iter()
            .filter(|kind| kind.is_colored())
            .collect();
        assert_eq!(colored, vec![TagKind::Character, TagKind::Place]);
    }
}
