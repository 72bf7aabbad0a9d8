//! Airline format tags and the format hint accepted by the engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// Discrete invoice layout family, one per issuing airline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatTag {
    Indigo,
    AirIndia,
    AirIndiaExpress,
    Kuwait,
    Oman,
    Qatar,
    SriLankan,
    Turkish,
    Malaysia,
    Akasa,
}

impl FormatTag {
    /// Every supported format.
    pub const ALL: [FormatTag; 10] = [
        FormatTag::Indigo,
        FormatTag::AirIndia,
        FormatTag::AirIndiaExpress,
        FormatTag::Kuwait,
        FormatTag::Oman,
        FormatTag::Qatar,
        FormatTag::SriLankan,
        FormatTag::Turkish,
        FormatTag::Malaysia,
        FormatTag::Akasa,
    ];

    /// Short machine name, as accepted on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            FormatTag::Indigo => "indigo",
            FormatTag::AirIndia => "airindia",
            FormatTag::AirIndiaExpress => "airindiaexpress",
            FormatTag::Kuwait => "kuwait",
            FormatTag::Oman => "oman",
            FormatTag::Qatar => "qatar",
            FormatTag::SriLankan => "srilankan",
            FormatTag::Turkish => "turkish",
            FormatTag::Malaysia => "malaysia",
            FormatTag::Akasa => "akasa",
        }
    }

    /// Label written into the record's airline column.
    pub fn label(self) -> &'static str {
        match self {
            FormatTag::Indigo => "INDIGO",
            FormatTag::AirIndia => "AIR INDIA",
            FormatTag::AirIndiaExpress => "AIR INDIA EXPRESS",
            FormatTag::Kuwait => "KUWAIT AIRWAYS",
            FormatTag::Oman => "OMAN AIR",
            FormatTag::Qatar => "QATAR AIRWAYS",
            FormatTag::SriLankan => "SRILANKAN AIRLINES",
            FormatTag::Turkish => "TURKISH AIRLINES",
            FormatTag::Malaysia => "MALAYSIA AIRLINES",
            FormatTag::Akasa => "AKASA AIR",
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatTag {
    type Err = ExtractionError;

    /// Accepts machine names and labels, ignoring case, spaces, `-` and `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();

        let tag = match key.as_str() {
            "indigo" | "6e" => FormatTag::Indigo,
            "airindia" | "ai" => FormatTag::AirIndia,
            "airindiaexpress" | "ix" => FormatTag::AirIndiaExpress,
            "kuwait" | "kuwaitairways" => FormatTag::Kuwait,
            "oman" | "omanair" => FormatTag::Oman,
            "qatar" | "qatarairways" => FormatTag::Qatar,
            "srilankan" | "srilankanairlines" => FormatTag::SriLankan,
            "turkish" | "turkishairlines" => FormatTag::Turkish,
            "malaysia" | "malaysiaairlines" => FormatTag::Malaysia,
            "akasa" | "akasaair" => FormatTag::Akasa,
            _ => return Err(ExtractionError::UnknownFormat(s.to_string())),
        };
        Ok(tag)
    }
}

/// How the engine picks a format profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatHint {
    /// Classify the document from its text.
    #[default]
    Auto,
    /// Use the given format without classification.
    Fixed(FormatTag),
}

impl FromStr for FormatHint {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "auto" | "any" => Ok(FormatHint::Auto),
            other => other.parse().map(FormatHint::Fixed),
        }
    }
}
