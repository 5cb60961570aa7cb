use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// TTL value the provider interprets as "automatic".
pub const AUTO_TTL: u32 = 1;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    MX,
    TXT,
    NS,
    SRV,
    Other(String),
}

/// Optional wire fields a record type accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OptionalFields {
    pub priority: bool,
    pub proxied: bool,
}

impl RecordType {
    /// Field applicability table shared by the create and update paths.
    pub fn optional_fields(&self) -> OptionalFields {
        match self {
            RecordType::MX | RecordType::SRV => OptionalFields {
                priority: true,
                proxied: false,
            },
            RecordType::A | RecordType::AAAA | RecordType::CNAME => OptionalFields {
                priority: false,
                proxied: true,
            },
            _ => OptionalFields {
                priority: false,
                proxied: false,
            },
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::CNAME => "CNAME",
            RecordType::MX => "MX",
            RecordType::TXT => "TXT",
            RecordType::NS => "NS",
            RecordType::SRV => "SRV",
            RecordType::Other(name) => name,
        }
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Ok(match upper.as_str() {
            "" => return Err("record type cannot be empty".to_string()),
            "A" => RecordType::A,
            "AAAA" => RecordType::AAAA,
            "CNAME" => RecordType::CNAME,
            "MX" => RecordType::MX,
            "TXT" => RecordType::TXT,
            "NS" => RecordType::NS,
            "SRV" => RecordType::SRV,
            _ => RecordType::Other(upper),
        })
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RecordType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecordType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// A DNS record as returned by the provider. The serde form is the JSON output shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Type")]
    pub record_type: RecordType,
    pub name: String,
    pub content: String,
    #[serde(rename = "TTL")]
    pub ttl: u32,
    pub priority: Option<u16>,
    pub proxied: Option<bool>,
}

impl Record {
    pub fn is_proxied(&self) -> bool {
        self.proxied.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub status: String,
}
