use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: String,
    pub salon_id: String,
    pub service_id: String,
    pub user_id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
}

impl Booking {
    pub fn slot(&self) -> Slot {
        Slot {
            salon_id: self.salon_id.clone(),
            service_id: self.service_id.clone(),
            date: self.date,
            time: self.time,
        }
    }
}

/// `pending` and `failed` are kept for an asynchronous confirmation flow;
/// bookings are currently created `confirmed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Failed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "failed" => Some(BookingStatus::Failed),
            _ => None,
        }
    }
}

/// One bookable appointment: a salon's service at a date and time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub salon_id: String,
    pub service_id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "salon {} / service {} on {} at {}",
            self.salon_id,
            self.service_id,
            self.date.format(DATE_FORMAT),
            self.time.format(TIME_FORMAT)
        )
    }
}

/// Booking request as submitted by a client. The booking's user comes from
/// the caller's session, never from the payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookingRequest {
    pub salon_id: String,
    pub service_id: String,
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingEvent {
    pub kind: &'static str,
    pub booking: Booking,
}

impl BookingEvent {
    pub fn created(booking: Booking) -> Self {
        Self {
            kind: "booking.created",
            booking,
        }
    }
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

pub fn parse_date(s: &str) -> Result<NaiveDate, &'static str> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| "date must be YYYY-MM-DD")
}

/// Accepts `HH:MM`, `HH:MM:SS` and the 12-hour `hh:MM AM` form.
pub fn parse_time(s: &str) -> Result<NaiveTime, &'static str> {
    let s = s.trim();
    let parsed = NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .or_else(|_| NaiveTime::parse_from_str(&s.to_uppercase(), "%I:%M %p"))
        .map_err(|_| "time must be HH:MM")?;

    if parsed.second() != 0 || parsed.nanosecond() != 0 {
        return Err("time must fall on a whole minute");
    }
    Ok(parsed)
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIME_FORMAT;

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_formats() {
        let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        assert_eq!(parse_time("10:00").unwrap(), ten);
        assert_eq!(parse_time("10:00:00").unwrap(), ten);
        assert_eq!(parse_time("10:00 AM").unwrap(), ten);
        assert_eq!(
            parse_time("02:00 pm").unwrap(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_time_rejects_garbage_and_seconds() {
        assert!(parse_time("25:00").is_err());
        assert!(parse_time("noon").is_err());
        assert!(parse_time("").is_err());
        assert_eq!(parse_time("10:00:30").unwrap_err(), "time must fall on a whole minute");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2030-01-10").unwrap(),
            NaiveDate::from_ymd_opt(2030, 1, 10).unwrap()
        );
        assert!(parse_date("2030-02-30").is_err());
        assert!(parse_date("10/01/2030").is_err());
    }

    #[test]
    fn test_booking_serializes_time_as_hhmm() {
        let booking = Booking {
            id: "b1".to_string(),
            salon_id: "S1".to_string(),
            service_id: "SVC1".to_string(),
            user_id: "U1".to_string(),
            date: NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            status: BookingStatus::Confirmed,
            created_at: NaiveDate::from_ymd_opt(2029, 12, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        };
        let json = serde_json::to_value(&booking).unwrap();
        assert_eq!(json["date"], "2030-01-10");
        assert_eq!(json["time"], "09:30");
        assert_eq!(json["status"], "confirmed");
    }

    #[test]
    fn test_slot_display() {
        let slot = Slot {
            salon_id: "S1".to_string(),
            service_id: "SVC1".to_string(),
            date: NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        };
        assert_eq!(slot.to_string(), "salon S1 / service SVC1 on 2030-01-10 at 10:00");
    }

    #[test]
    fn test_booking_request_rejects_unknown_fields() {
        let result = serde_json::from_str::<BookingRequest>(
            r#"{"salon_id":"S1","service_id":"SVC1","date":"2030-01-10","time":"10:00","user_id":"U9"}"#,
        );
        assert!(result.is_err());
    }
}
