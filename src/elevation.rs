//! External elevation resolver — fills in a route's elevation when the
//! request omits it. Unlike the weather provider, elevation is never fatal
//! to a request: a route with no resolvable elevation simply gets `w_elev =
//! 1.0` from every accident (the kernel already treats a missing elevation
//! as neutral), so failures here are logged and swallowed rather than
//! surfaced as an error.

use std::time::Duration;

use serde::Deserialize;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ElevationClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ElevationResponseBody {
    elevation_meters: Option<f64>,
}

impl ElevationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("reqwest client with a timeout always builds"),
            base_url: base_url.into(),
        }
    }

    /// Resolve elevation for a point. Returns `None` on any failure
    /// (timeout, transport error, malformed body) rather than propagating
    /// an error — the caller degrades to the elevation kernel's neutral
    /// behavior instead.
    pub async fn resolve(&self, lat: f64, lon: f64) -> Option<f64> {
        let url = format!("{}/elevation?lat={lat:.5}&lon={lon:.5}", self.base_url);

        let response = match self.http.get(&url).send().await {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!("elevation lookup failed for ({lat}, {lon}): {err}");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!("elevation provider returned HTTP {} for ({lat}, {lon})", response.status());
            return None;
        }

        match response.json::<ElevationResponseBody>().await {
            Ok(body) => body.elevation_meters,
            Err(err) => {
                tracing::warn!("elevation provider returned malformed body for ({lat}, {lon}): {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn resolves_elevation_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/elevation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"elevation_meters": 3100.5})))
            .mount(&server)
            .await;

        let client = ElevationClient::new(server.uri());
        let elevation = client.resolve(46.5, 7.98).await;
        assert_eq!(elevation, Some(3100.5));
    }

    #[tokio::test]
    async fn returns_none_on_failure_rather_than_erroring() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/elevation"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ElevationClient::new(server.uri());
        let elevation = client.resolve(46.5, 7.98).await;
        assert_eq!(elevation, None);
    }
}
