//! Flight lookup tool
//!
//! Backed by a fixed synthetic record; no network access.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const NAME: &str = "get_flight_info";

const DEPARTURE: &str = "New York";
const ARRIVAL: &str = "San Francisco";

/// Arguments the model passes to `get_flight_info`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlightInfoInput {
    #[serde(rename = "flightNumber")]
    pub flight_number: String,
}

/// Resolved flight record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightInfo {
    pub flight_number: String,
    pub departure: String,
    pub arrival: String,
}

pub fn description() -> String {
    "Get the information for a flight".to_string()
}

pub fn input_schema() -> Value {
    json!({
        "type": "object",
        "required": ["flightNumber"],
        "properties": {
            "flightNumber": {
                "type": "string",
                "description": "the number of the flight"
            }
        }
    })
}

/// Look up a flight. Every flight number maps to the same route.
pub fn lookup_flight(flight_number: &str) -> FlightInfo {
    FlightInfo {
        flight_number: flight_number.to_string(),
        departure: DEPARTURE.to_string(),
        arrival: ARRIVAL.to_string(),
    }
}
