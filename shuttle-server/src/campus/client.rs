//! Campus transport data service client.
//!
//! Routes, schedules and bookings are owned by the campus transport
//! administration system; the engine consumes them read-only through this
//! client. The same service fronts the stop-analysis job that proposes
//! possible stops.

use base64::Engine as _;
use chrono::NaiveTime;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;

use crate::domain::{Booking, BookingStatus, Route, RouteId, RouteStatus, ServiceDate};
use crate::registry::{PossibleStopCandidate, ScheduleStop};

use super::error::CampusError;

/// Default base URL for the campus transport data service.
const DEFAULT_BASE_URL: &str = "http://localhost:9000";

/// A route as delivered by the data service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDto {
    pub route_id: String,
    pub route_name: String,
    pub route_number: String,
    pub status: String,
    pub seat_capacity: Option<u32>,
}

impl RouteDto {
    /// Convert to the domain route type.
    pub fn into_domain(self) -> Result<Route, CampusError> {
        let id = RouteId::parse(&self.route_id).map_err(|e| CampusError::Invalid {
            message: format!("route id {:?}: {e}", self.route_id),
        })?;

        // Unknown status tokens are treated as inactive, never as active
        let status = if self.status.eq_ignore_ascii_case("active") {
            RouteStatus::Active
        } else {
            RouteStatus::Inactive
        };

        let mut route = Route::new(id, self.route_name, self.route_number).with_status(status);
        route.capacity = self.seat_capacity;
        Ok(route)
    }
}

/// A schedule stop as delivered by the data service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStopDto {
    pub stop_name: String,
    pub stop_time: String,
    pub sequence: u32,
}

impl ScheduleStopDto {
    /// Convert to the registry's schedule stop type.
    pub fn into_schedule_stop(self) -> Result<ScheduleStop, CampusError> {
        let time = parse_stop_time(&self.stop_time)?;
        Ok(ScheduleStop {
            name: self.stop_name,
            time,
            sequence: self.sequence,
        })
    }
}

/// A booking as delivered by the data service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    pub student_id: String,
    pub student_name: String,
    pub roll_number: String,
    pub boarding_stop: String,
    pub status: String,
}

impl BookingDto {
    /// Convert to the domain booking type for a route and date.
    pub fn into_domain(self, route: RouteId, date: ServiceDate) -> Booking {
        Booking {
            student_id: self.student_id,
            student_name: self.student_name,
            roll_number: self.roll_number,
            route,
            date,
            boarding_stop: self.boarding_stop,
            status: BookingStatus::parse(&self.status),
        }
    }
}

/// A candidate possible stop proposed by the stop-analysis job.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedStopDto {
    pub stop_name: Option<String>,
    pub stop_time: Option<String>,
    pub sequence: Option<u32>,
    pub source_route_id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_major_stop: bool,
}

impl SuggestedStopDto {
    /// Convert to a registry candidate. Missing fields stay missing so
    /// the registry can report them; malformed fields are an error.
    pub fn into_candidate(self) -> Result<PossibleStopCandidate, CampusError> {
        let time = self.stop_time.as_deref().map(parse_stop_time).transpose()?;
        let source_route = self
            .source_route_id
            .as_deref()
            .map(|s| {
                RouteId::parse(s).map_err(|e| CampusError::Invalid {
                    message: format!("source route id {s:?}: {e}"),
                })
            })
            .transpose()?;

        Ok(PossibleStopCandidate {
            name: self.stop_name,
            time,
            sequence: self.sequence,
            source_route,
            latitude: self.latitude,
            longitude: self.longitude,
            is_major: self.is_major_stop,
        })
    }
}

/// The stop-analysis job's suggestions for one route.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSuggestionsDto {
    pub route_id: String,
    pub candidates: Vec<SuggestedStopDto>,
}

/// Converted per-route suggestions ready for registry ingestion.
#[derive(Debug, Clone)]
pub struct RouteSuggestions {
    pub route: RouteId,
    pub candidates: Vec<PossibleStopCandidate>,
}

impl RouteSuggestionsDto {
    /// Convert to domain form.
    pub fn into_domain(self) -> Result<RouteSuggestions, CampusError> {
        let route = RouteId::parse(&self.route_id).map_err(|e| CampusError::Invalid {
            message: format!("route id {:?}: {e}", self.route_id),
        })?;
        let candidates = self
            .candidates
            .into_iter()
            .map(SuggestedStopDto::into_candidate)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RouteSuggestions { route, candidates })
    }
}

/// Parse a stop time in `HH:MM` (or `HH:MM:SS`) format.
pub fn parse_stop_time(s: &str) -> Result<NaiveTime, CampusError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s.trim(), "%H:%M:%S"))
        .map_err(|_| CampusError::Invalid {
            message: format!("stop time {s:?}: must be HH:MM"),
        })
}

/// Configuration for the data service client.
#[derive(Debug, Clone)]
pub struct CampusClientConfig {
    /// Basic-auth username
    pub username: String,
    /// Basic-auth password
    pub password: String,
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl CampusClientConfig {
    /// Create a new config with the given credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// Client for the campus transport data service.
#[derive(Debug, Clone)]
pub struct CampusClient {
    http: reqwest::Client,
    base_url: String,
}

impl CampusClient {
    /// Create a new data service client.
    pub fn new(config: CampusClientConfig) -> Result<Self, CampusError> {
        let mut headers = HeaderMap::new();

        let token = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", config.username, config.password));
        let auth = HeaderValue::from_str(&format!("Basic {token}")).map_err(|_| {
            CampusError::Api {
                status: 0,
                message: "Invalid credential format".to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Fetch all routes.
    pub async fn fetch_routes(&self) -> Result<Vec<Route>, CampusError> {
        let url = format!("{}/api/routes", self.base_url);
        let dtos: Vec<RouteDto> = self.get_json(&url).await?;
        dtos.into_iter().map(RouteDto::into_domain).collect()
    }

    /// Fetch a route's regular schedule stops.
    pub async fn fetch_schedule(&self, route: &RouteId) -> Result<Vec<ScheduleStop>, CampusError> {
        let url = format!("{}/api/routes/{}/stops", self.base_url, route);
        let dtos: Vec<ScheduleStopDto> = self.get_json(&url).await?;
        dtos.into_iter()
            .map(ScheduleStopDto::into_schedule_stop)
            .collect()
    }

    /// Fetch a route's bookings for a date.
    pub async fn fetch_bookings(
        &self,
        route: &RouteId,
        date: ServiceDate,
    ) -> Result<Vec<Booking>, CampusError> {
        let url = format!(
            "{}/api/bookings?routeId={}&date={}",
            self.base_url, route, date
        );
        let dtos: Vec<BookingDto> = self.get_json(&url).await?;
        Ok(dtos
            .into_iter()
            .map(|d| d.into_domain(route.clone(), date))
            .collect())
    }

    /// Trigger the stop-analysis job for a date and return its proposed
    /// possible stops per route.
    pub async fn fetch_possible_stop_suggestions(
        &self,
        date: ServiceDate,
    ) -> Result<Vec<RouteSuggestions>, CampusError> {
        let url = format!("{}/api/analysis/possible-stops", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "date": date.to_string() }))
            .send()
            .await?;
        let body = check_status(response).await?;

        let dtos: Vec<RouteSuggestionsDto> =
            serde_json::from_str(&body).map_err(|e| CampusError::Json {
                message: e.to_string(),
            })?;
        dtos.into_iter().map(RouteSuggestionsDto::into_domain).collect()
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, CampusError> {
        let response = self.http.get(url).send().await?;
        let body = check_status(response).await?;

        serde_json::from_str(&body).map_err(|e| CampusError::Json {
            message: e.to_string(),
        })
    }
}

async fn check_status(response: reqwest::Response) -> Result<String, CampusError> {
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(CampusError::Unauthorized);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CampusError::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = CampusClientConfig::new("transport-admin", "secret");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn config_with_base_url() {
        let config =
            CampusClientConfig::new("transport-admin", "secret").with_base_url("http://host:8080");
        assert_eq!(config.base_url, "http://host:8080");
    }

    #[test]
    fn route_dto_conversion() {
        let dto = RouteDto {
            route_id: "R1".into(),
            route_name: "Erode Express".into(),
            route_number: "2".into(),
            status: "Active".into(),
            seat_capacity: Some(48),
        };
        let route = dto.into_domain().unwrap();
        assert_eq!(route.id.as_str(), "R1");
        assert!(route.status.is_active());
        assert_eq!(route.capacity, Some(48));
    }

    #[test]
    fn unknown_status_is_inactive() {
        let dto = RouteDto {
            route_id: "R1".into(),
            route_name: "X".into(),
            route_number: "1".into(),
            status: "draft".into(),
            seat_capacity: None,
        };
        assert!(!dto.into_domain().unwrap().status.is_active());
    }

    #[test]
    fn bad_route_id_is_invalid() {
        let dto = RouteDto {
            route_id: "  ".into(),
            route_name: "X".into(),
            route_number: "1".into(),
            status: "active".into(),
            seat_capacity: None,
        };
        assert!(matches!(dto.into_domain(), Err(CampusError::Invalid { .. })));
    }

    #[test]
    fn parse_stop_time_formats() {
        assert_eq!(
            parse_stop_time("07:30").unwrap(),
            NaiveTime::from_hms_opt(7, 30, 0).unwrap()
        );
        assert_eq!(
            parse_stop_time("07:30:15").unwrap(),
            NaiveTime::from_hms_opt(7, 30, 15).unwrap()
        );
        assert!(parse_stop_time("7.30 am").is_err());
        assert!(parse_stop_time("").is_err());
    }

    #[test]
    fn booking_dto_conversion() {
        let dto = BookingDto {
            student_id: "S1".into(),
            student_name: "Priya".into(),
            roll_number: "21CS042".into(),
            boarding_stop: "Main Stop".into(),
            status: "confirmed".into(),
        };
        let booking = dto.into_domain(
            RouteId::parse("R1").unwrap(),
            ServiceDate::parse("2025-03-10").unwrap(),
        );
        assert!(booking.status.is_confirmed());
        assert_eq!(booking.boarding_stop, "Main Stop");
    }

    #[test]
    fn suggestion_keeps_missing_fields_missing() {
        let dto = SuggestedStopDto {
            stop_name: Some("Main Junction".into()),
            stop_time: None,
            sequence: None,
            source_route_id: Some("C".into()),
            latitude: None,
            longitude: None,
            is_major_stop: true,
        };
        let candidate = dto.into_candidate().unwrap();
        assert_eq!(candidate.name.as_deref(), Some("Main Junction"));
        assert!(candidate.time.is_none());
        assert!(candidate.is_major);
    }

    #[test]
    fn suggestion_rejects_malformed_time() {
        let dto = SuggestedStopDto {
            stop_name: Some("Main Junction".into()),
            stop_time: Some("late morning".into()),
            sequence: None,
            source_route_id: Some("C".into()),
            latitude: None,
            longitude: None,
            is_major_stop: false,
        };
        assert!(matches!(
            dto.into_candidate(),
            Err(CampusError::Invalid { .. })
        ));
    }
}
