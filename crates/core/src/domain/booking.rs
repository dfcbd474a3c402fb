use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ValidationError;

pub const DEFAULT_NUM_PASSENGERS: i64 = 1;
pub const DEFAULT_SALES_CHANNEL: &str = "Internet";
pub const DEFAULT_TRIP_TYPE: &str = "RoundTrip";

/// A booking inquiry as submitted by a sales workflow.
///
/// Deserializing only checks shape. Bounds are enforced by
/// [`BookingRequest::validate`], which every prediction path runs before
/// feature engineering. Integer fields also accept whole-valued JSON floats
/// such as `80.0`. Extra-service flags accept either JSON booleans or the
/// integers `0`/`1`. `sales_channel` and `trip_type` are free categories.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Days between booking and travel.
    #[serde(deserialize_with = "deserialize_whole_number")]
    pub purchase_lead: i64,
    /// Days spent at the destination.
    #[serde(deserialize_with = "deserialize_whole_number")]
    pub length_of_stay: i64,
    /// Departure hour, 0-23.
    #[serde(deserialize_with = "deserialize_whole_number")]
    pub flight_hour: i64,
    /// Day of week, 1 = Monday through 7 = Sunday.
    #[serde(deserialize_with = "deserialize_whole_number")]
    pub flight_day: i64,
    pub route: String,
    pub booking_origin: String,
    #[serde(deserialize_with = "deserialize_flag")]
    pub wants_extra_baggage: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    pub wants_preferred_seat: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    pub wants_in_flight_meals: bool,
    /// Flight duration in hours.
    pub flight_duration: f64,
    #[serde(default = "default_num_passengers", deserialize_with = "deserialize_whole_number")]
    pub num_passengers: i64,
    #[serde(default = "default_sales_channel")]
    pub sales_channel: String,
    #[serde(default = "default_trip_type")]
    pub trip_type: String,
}

impl BookingRequest {
    /// Parses a JSON payload and validates it in one step.
    pub fn from_json_slice(payload: &[u8]) -> Result<Self, ValidationError> {
        let request: Self = serde_json::from_slice(payload)
            .map_err(|error| ValidationError::Malformed(error.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.purchase_lead < 0 {
            return Err(ValidationError::OutOfRange { field: "purchase_lead", constraint: ">= 0" });
        }
        if self.length_of_stay < 1 {
            return Err(ValidationError::OutOfRange { field: "length_of_stay", constraint: ">= 1" });
        }
        if !(0..=23).contains(&self.flight_hour) {
            return Err(ValidationError::OutOfRange { field: "flight_hour", constraint: "0..=23" });
        }
        if !(1..=7).contains(&self.flight_day) {
            return Err(ValidationError::OutOfRange { field: "flight_day", constraint: "1..=7" });
        }
        if self.route.trim().is_empty() {
            return Err(ValidationError::Empty { field: "route" });
        }
        if self.booking_origin.trim().is_empty() {
            return Err(ValidationError::Empty { field: "booking_origin" });
        }
        if !self.flight_duration.is_finite() {
            return Err(ValidationError::NotFinite { field: "flight_duration" });
        }
        if self.flight_duration <= 0.0 {
            return Err(ValidationError::OutOfRange { field: "flight_duration", constraint: "> 0" });
        }
        if self.num_passengers < 1 {
            return Err(ValidationError::OutOfRange { field: "num_passengers", constraint: ">= 1" });
        }
        Ok(())
    }
}

fn default_num_passengers() -> i64 {
    DEFAULT_NUM_PASSENGERS
}

fn default_sales_channel() -> String {
    DEFAULT_SALES_CHANNEL.to_string()
}

fn default_trip_type() -> String {
    DEFAULT_TRIP_TYPE.to_string()
}

fn deserialize_whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(value) => Ok(value),
        Number::Float(value)
            if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 =>
        {
            Ok(value as i64)
        }
        Number::Float(value) => {
            Err(D::Error::custom(format!("expected a whole number, got {value}")))
        }
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(other) => Err(D::Error::custom(format!("expected 0 or 1, got {other}"))),
    }
}
