use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveTime};
use reqwest::{
    blocking::Client,
    header::{HeaderMap, CONTENT_TYPE},
    StatusCode,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    config::ProviderConfig,
    events::{parse_day_length, Coordinates, LightEventData, LightEventTimes},
    Result, SunMatrixError,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%I:%M:%S %p";

/// Source of daily light events.
///
/// `Ok(None)` means the source answered without usable data; the caller
/// decides whether to keep what it already has. `Err` covers transport
/// failures and responses that could not be parsed.
pub trait LightEventProvider {
    fn fetch(&self, coordinates: Coordinates, date: NaiveDate) -> Result<Option<LightEventData>>;

    /// Fetches the events for the local calendar date.
    fn fetch_today(&self, coordinates: Coordinates) -> Result<Option<LightEventData>> {
        self.fetch(coordinates, Local::now().date_naive())
    }
}

impl<P: LightEventProvider + ?Sized> LightEventProvider for &P {
    fn fetch(&self, coordinates: Coordinates, date: NaiveDate) -> Result<Option<LightEventData>> {
        (**self).fetch(coordinates, date)
    }
}

/// Blocking client for the sunrisesunset.io JSON API.
#[derive(Debug, Clone)]
pub struct SunriseSunsetClient {
    client: Client,
    endpoint: String,
}

impl SunriseSunsetClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl LightEventProvider for SunriseSunsetClient {
    fn fetch(&self, coordinates: Coordinates, date: NaiveDate) -> Result<Option<LightEventData>> {
        let url = request_url(&self.endpoint, coordinates, date);
        debug!(%url, "requesting light events");

        let response = self.client.get(&url).send()?;
        if !has_light_events(response.status(), response.headers()) {
            return Ok(None);
        }

        let body = response.text()?;
        parse_response(&body).map(Some)
    }
}

/// Decides whether a response carries a light-event document. A non-success
/// status or a non-JSON body means "no data" rather than an error.
pub fn has_light_events(status: StatusCode, headers: &HeaderMap) -> bool {
    if !status.is_success() {
        warn!(%status, "light event service returned an error status");
        return false;
    }
    if !is_json(headers) {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("<missing>");
        warn!(%content_type, "light event service returned a non-JSON body");
        return false;
    }
    true
}

/// Builds the query for one coordinate and date; coordinates carry six
/// decimals.
pub fn request_url(endpoint: &str, coordinates: Coordinates, date: NaiveDate) -> String {
    format!(
        "{endpoint}?lat={:.6}&lng={:.6}&date={}",
        coordinates.latitude,
        coordinates.longitude,
        date.format(DATE_FORMAT)
    )
}

/// True when the declared media type is `application/json`, ignoring
/// parameters such as the charset.
pub fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|media_type| media_type.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    results: RawLightEvents,
}

#[derive(Debug, Deserialize)]
struct RawLightEvents {
    date: String,
    sunrise: String,
    sunset: String,
    first_light: String,
    last_light: String,
    dawn: String,
    dusk: String,
    golden_hour: String,
    day_length: String,
}

/// Parses a full response body into a record.
pub fn parse_response(body: &str) -> Result<LightEventData> {
    let envelope: ResponseEnvelope = serde_json::from_str(body)?;
    let raw = envelope.results;

    let date = NaiveDate::parse_from_str(&raw.date, DATE_FORMAT).map_err(|source| {
        SunMatrixError::InvalidTimestamp {
            field: "date",
            value: raw.date.clone(),
            source,
        }
    })?;

    let times = LightEventTimes {
        sunrise: parse_clock("sunrise", &raw.sunrise)?,
        sunset: parse_clock("sunset", &raw.sunset)?,
        first_light: parse_clock("first_light", &raw.first_light)?,
        last_light: parse_clock("last_light", &raw.last_light)?,
        dawn: parse_clock("dawn", &raw.dawn)?,
        dusk: parse_clock("dusk", &raw.dusk)?,
        golden_hour: parse_clock("golden_hour", &raw.golden_hour)?,
    };
    let day_length = parse_day_length(&raw.day_length)?;

    Ok(LightEventData::new(date, times, day_length))
}

fn parse_clock(field: &'static str, value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|source| {
        SunMatrixError::InvalidTimestamp {
            field,
            value: value.to_string(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;
    use crate::events::fixtures::{date, hms};

    const SAMPLE: &str = r#"{
        "results": {
            "date": "2024-06-21",
            "sunrise": "5:42:03 AM",
            "sunset": "8:08:40 PM",
            "first_light": "3:52:10 AM",
            "last_light": "9:58:33 PM",
            "dawn": "5:13:21 AM",
            "dusk": "8:37:22 PM",
            "solar_noon": "12:55:21 PM",
            "golden_hour": "7:29:52 PM",
            "day_length": "14:26:37",
            "timezone": "America/Los_Angeles",
            "utc_offset": -420
        },
        "status": "OK"
    }"#;

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn builds_request_with_six_decimals() {
        let url = request_url(
            "https://api.sunrisesunset.io/json",
            Coordinates::new(34.110856, -118.272459),
            date(2024, 6, 21),
        );
        assert_eq!(
            url,
            "https://api.sunrisesunset.io/json?lat=34.110856&lng=-118.272459&date=2024-06-21"
        );

        let url = request_url("http://x", Coordinates::new(1.5, 2.0), date(2024, 1, 2));
        assert_eq!(url, "http://x?lat=1.500000&lng=2.000000&date=2024-01-02");
    }

    #[test]
    fn parses_sample_response() {
        let data = parse_response(SAMPLE).unwrap();

        assert_eq!(data.date(), date(2024, 6, 21));
        assert_eq!(data.sunrise(), date(2024, 6, 21).and_time(hms(5, 42, 3)));
        assert_eq!(data.sunset().time(), hms(20, 8, 40));
        assert_eq!(data.first_light().time(), hms(3, 52, 10));
        assert_eq!(data.last_light().time(), hms(21, 58, 33));
        assert_eq!(data.dawn().time(), hms(5, 13, 21));
        assert_eq!(data.dusk().time(), hms(20, 37, 22));
        assert_eq!(data.golden_hour().time(), hms(19, 29, 52));
        assert_eq!(data.day_length().num_seconds(), 14 * 3600 + 26 * 60 + 37);
        assert_eq!(data.light_length(), data.dusk() - data.dawn());
    }

    #[test]
    fn twelve_oclock_follows_am_pm_rules() {
        assert_eq!(parse_clock("sunrise", "12:05:00 AM").unwrap(), hms(0, 5, 0));
        assert_eq!(parse_clock("sunrise", "12:05:00 PM").unwrap(), hms(12, 5, 0));
    }

    #[test]
    fn missing_field_is_a_hard_failure() {
        let body = SAMPLE.replace("\"dusk\": \"8:37:22 PM\",", "");
        let err = parse_response(&body).unwrap_err();
        assert!(matches!(err, SunMatrixError::Json(_)));
        assert!(format!("{err}").contains("dusk"));
    }

    #[test]
    fn bad_clock_string_names_the_field() {
        let body = SAMPLE.replace("8:08:40 PM", "20:08:40");
        let err = parse_response(&body).unwrap_err();
        assert!(matches!(
            err,
            SunMatrixError::InvalidTimestamp { field: "sunset", .. }
        ));
    }

    #[test]
    fn bad_day_length_is_rejected() {
        let body = SAMPLE.replace("14:26:37", "14h26m");
        let err = parse_response(&body).unwrap_err();
        assert!(matches!(err, SunMatrixError::InvalidDayLength(_)));
    }

    #[test]
    fn accepts_json_media_types_only() {
        assert!(is_json(&headers("application/json")));
        assert!(is_json(&headers("application/json; charset=utf-8")));
        assert!(!is_json(&headers("text/html")));
        assert!(!is_json(&headers("application/jsonp")));
        assert!(!is_json(&HeaderMap::new()));
    }

    #[test]
    fn error_status_means_no_data() {
        let json = headers("application/json");
        assert!(!has_light_events(StatusCode::NOT_FOUND, &json));
        assert!(!has_light_events(StatusCode::INTERNAL_SERVER_ERROR, &json));
    }

    #[test]
    fn html_body_means_no_data() {
        assert!(!has_light_events(StatusCode::OK, &headers("text/html")));
        assert!(!has_light_events(StatusCode::OK, &HeaderMap::new()));
    }

    #[test]
    fn json_success_is_parsed() {
        assert!(has_light_events(
            StatusCode::OK,
            &headers("application/json; charset=utf-8")
        ));
        assert_eq!(parse_response(SAMPLE).unwrap().date(), date(2024, 6, 21));
    }

    #[derive(Default)]
    struct RecordingProvider {
        dates: std::cell::RefCell<Vec<NaiveDate>>,
    }

    impl LightEventProvider for RecordingProvider {
        fn fetch(&self, _: Coordinates, date: NaiveDate) -> Result<Option<LightEventData>> {
            self.dates.borrow_mut().push(date);
            Ok(None)
        }
    }

    #[test]
    fn fetch_today_asks_for_the_local_date() {
        let provider = RecordingProvider::default();
        let before = Local::now().date_naive();
        let result = provider
            .fetch_today(Coordinates::new(34.110856, -118.272459))
            .unwrap();
        let after = Local::now().date_naive();

        assert!(result.is_none());
        let dates = provider.dates.borrow();
        assert_eq!(dates.len(), 1);
        assert!(dates[0] == before || dates[0] == after);
    }
}
