//! Booking feature engineering
//!
//! Turns a validated [`BookingRequest`] into the exact column set the
//! classifier was fit on. The numeric schema is fixed by
//! [`NUMERIC_FEATURE_NAMES`]; model artifacts declaring any other order are
//! rejected at load time.

pub mod popularity;

use serde::{Deserialize, Serialize};

use crate::domain::booking::BookingRequest;

pub use self::popularity::PopularityLookup;

/// Bookings made this many days ahead or fewer count as last minute.
pub const LAST_MINUTE_DAYS: i64 = 7;
pub const NIGHT_STARTS_AT_HOUR: i64 = 22;
pub const NIGHT_ENDS_AT_HOUR: i64 = 5;

/// Numeric columns in model input order: raw fields first, derived after.
pub const NUMERIC_FEATURE_NAMES: [&str; 17] = [
    "num_passengers",
    "purchase_lead",
    "length_of_stay",
    "flight_hour",
    "flight_day",
    "wants_extra_baggage",
    "wants_preferred_seat",
    "wants_in_flight_meals",
    "flight_duration",
    "purchase_lead_log",
    "length_of_stay_log",
    "is_last_minute",
    "is_night_flight",
    "is_weekend_flight",
    "extra_count",
    "route_popularity",
    "booking_origin_popularity",
];

/// Categorical columns, fed to the classifier by value.
pub const CATEGORICAL_FEATURE_NAMES: [&str; 4] =
    ["sales_channel", "trip_type", "route", "booking_origin"];

/// Model-ready view of one booking request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineeredFeatureVector {
    pub num_passengers: i64,
    pub sales_channel: String,
    pub trip_type: String,
    pub purchase_lead: i64,
    pub length_of_stay: i64,
    pub flight_hour: i64,
    pub flight_day: i64,
    pub route: String,
    pub booking_origin: String,
    pub wants_extra_baggage: u8,
    pub wants_preferred_seat: u8,
    pub wants_in_flight_meals: u8,
    pub flight_duration: f64,
    pub purchase_lead_log: f64,
    pub length_of_stay_log: f64,
    pub is_last_minute: u8,
    pub is_night_flight: u8,
    pub is_weekend_flight: u8,
    pub extra_count: u8,
    pub route_popularity: f64,
    pub booking_origin_popularity: f64,
}

impl EngineeredFeatureVector {
    /// Numeric columns in [`NUMERIC_FEATURE_NAMES`] order.
    pub fn to_numeric_vector(&self) -> [f64; NUMERIC_FEATURE_NAMES.len()] {
        [
            self.num_passengers as f64,
            self.purchase_lead as f64,
            self.length_of_stay as f64,
            self.flight_hour as f64,
            self.flight_day as f64,
            f64::from(self.wants_extra_baggage),
            f64::from(self.wants_preferred_seat),
            f64::from(self.wants_in_flight_meals),
            self.flight_duration,
            self.purchase_lead_log,
            self.length_of_stay_log,
            f64::from(self.is_last_minute),
            f64::from(self.is_night_flight),
            f64::from(self.is_weekend_flight),
            f64::from(self.extra_count),
            self.route_popularity,
            self.booking_origin_popularity,
        ]
    }

    /// Value of a categorical column by name, `None` for unknown names.
    pub fn categorical(&self, name: &str) -> Option<&str> {
        match name {
            "sales_channel" => Some(&self.sales_channel),
            "trip_type" => Some(&self.trip_type),
            "route" => Some(&self.route),
            "booking_origin" => Some(&self.booking_origin),
            _ => None,
        }
    }
}

/// Derives the engineered columns. Pure: the same request and lookup always
/// give the same vector. Unknown categories get `0.0` popularity.
pub fn engineer(request: &BookingRequest, popularity: &PopularityLookup) -> EngineeredFeatureVector {
    let wants_extra_baggage = flag(request.wants_extra_baggage);
    let wants_preferred_seat = flag(request.wants_preferred_seat);
    let wants_in_flight_meals = flag(request.wants_in_flight_meals);

    EngineeredFeatureVector {
        num_passengers: request.num_passengers,
        sales_channel: request.sales_channel.clone(),
        trip_type: request.trip_type.clone(),
        purchase_lead: request.purchase_lead,
        length_of_stay: request.length_of_stay,
        flight_hour: request.flight_hour,
        flight_day: request.flight_day,
        route: request.route.clone(),
        booking_origin: request.booking_origin.clone(),
        wants_extra_baggage,
        wants_preferred_seat,
        wants_in_flight_meals,
        flight_duration: request.flight_duration,
        purchase_lead_log: (request.purchase_lead as f64).ln_1p(),
        length_of_stay_log: (request.length_of_stay as f64).ln_1p(),
        is_last_minute: flag(is_last_minute(request.purchase_lead)),
        is_night_flight: flag(is_night_flight(request.flight_hour)),
        is_weekend_flight: flag(is_weekend_flight(request.flight_day)),
        extra_count: wants_extra_baggage + wants_preferred_seat + wants_in_flight_meals,
        route_popularity: popularity.route_popularity(&request.route),
        booking_origin_popularity: popularity.booking_origin_popularity(&request.booking_origin),
    }
}

pub fn is_last_minute(purchase_lead: i64) -> bool {
    purchase_lead <= LAST_MINUTE_DAYS
}

pub fn is_night_flight(flight_hour: i64) -> bool {
    flight_hour >= NIGHT_STARTS_AT_HOUR || flight_hour <= NIGHT_ENDS_AT_HOUR
}

/// Saturday (6) and Sunday (7).
pub fn is_weekend_flight(flight_day: i64) -> bool {
    matches!(flight_day, 6 | 7)
}

fn flag(value: bool) -> u8 {
    u8::from(value)
}
