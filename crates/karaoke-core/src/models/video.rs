use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AlbumId, JobId};

/// Processed video projection. The job id is the primary key and every video belongs to
/// exactly one album.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub job_id: JobId,
    pub name: String,
    pub album_id: AlbumId,
    #[serde(default)]
    pub duration_in_seconds: Option<u32>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Video {
    /// Duration as `m:ss`, or `00:00` when the server has not reported one.
    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration_in_seconds)
    }
}

pub fn format_duration(seconds: Option<u32>) -> String {
    match seconds {
        None | Some(0) => "00:00".to_string(),
        Some(total) => format!("{}:{:02}", total / 60, total % 60),
    }
}

/// Request DTO for moving a video to another album
#[derive(Debug, Clone, Serialize)]
pub struct MoveVideoRequest {
    pub album_id: AlbumId,
}

/// Server timestamps arrive either as RFC 3339 or as naive UTC date-times.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) => parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw))),
            }
        }
    }
}
