use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Timestamp format used in log lines: `YYYY-MM-DD HH:MM:SS` local time.
pub mod log_time {
    use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(time: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Local>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let naive = NaiveDateTime::parse_from_str(&raw, FORMAT)
            .map_err(serde::de::Error::custom)?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| serde::de::Error::custom("invalid local time"))
    }
}

/// One entry in a tracker's buffer, later serialized verbatim as a
/// single JSON line in the security's log file.
///
/// Price lines look like `{"time": "...", "curr": 9.8, "high": 10.1, "low": 9.5}`,
/// error lines like `{"time": "...", "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Observation {
    Price {
        #[serde(with = "log_time")]
        time: DateTime<Local>,
        curr: f64,
        high: f64,
        low: f64,
    },
    Error {
        #[serde(with = "log_time")]
        time: DateTime<Local>,
        error: String,
    },
}

impl Observation {
    pub fn price(time: DateTime<Local>, curr: f64, high: f64, low: f64) -> Self {
        Observation::Price {
            time,
            curr,
            high,
            low,
        }
    }

    pub fn error(time: DateTime<Local>, message: impl Into<String>) -> Self {
        Observation::Error {
            time,
            error: message.into(),
        }
    }

    pub fn time(&self) -> DateTime<Local> {
        match self {
            Observation::Price { time, .. } | Observation::Error { time, .. } => *time,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Observation::Error { .. })
    }
}

/// Outcome of a single quote fetch.
///
/// `NoData` (the source answered but carried no usable price) is kept
/// distinct from `Error`: no-data ticks never reach the buffer or the
/// log, while errors are buffered and eventually persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum Quote {
    Price {
        time: DateTime<Local>,
        curr: f64,
        high: f64,
        low: f64,
    },
    NoData,
    Error {
        time: DateTime<Local>,
        message: String,
    },
}
