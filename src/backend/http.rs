use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::{
    CoverageRequest, CoverageResponse, LocationInfo, LocationUpdate, ProfileRequest,
    ProfileResponse, SessionData, TiltUpdate,
};
use super::{Backend, BackendError};

const SESSION_DATA_PATH: &str = "/carregar-dados";
const TX_LOCATION_PATH: &str = "/tx-location";
const TILT_PATH: &str = "/update-tilt";
const COVERAGE_PATH: &str = "/calculate-coverage";
const PROFILE_PATH: &str = "/gerar_img_perfil";

/// JSON-over-HTTP client for the link-planning backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session_cookie: Option<&str>,
    ) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = session_cookie {
            match HeaderValue::from_str(cookie) {
                Ok(value) => {
                    headers.insert(COOKIE, value);
                }
                Err(e) => log::warn!("Ignoring invalid session cookie: {}", e),
            }
        }

        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<T, R>(&self, path: &str, body: &T) -> Result<R, BackendError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Ok(check_status(response)?.json().await?)
    }
}

fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(BackendError::Status(status.as_u16()))
    }
}

impl Backend for HttpBackend {
    async fn fetch_session(&self) -> Result<SessionData, BackendError> {
        let response = self.client.get(self.url(SESSION_DATA_PATH)).send().await?;
        Ok(check_status(response)?.json().await?)
    }

    async fn push_location(&self, update: LocationUpdate) -> Result<LocationInfo, BackendError> {
        self.post_json(TX_LOCATION_PATH, &update).await
    }

    async fn push_tilt(&self, tilt: f64) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url(TILT_PATH))
            .json(&TiltUpdate { tilt })
            .send()
            .await?;
        check_status(response)?;
        Ok(())
    }

    async fn compute_coverage(
        &self,
        request: CoverageRequest,
    ) -> Result<CoverageResponse, BackendError> {
        self.post_json(COVERAGE_PATH, &request).await
    }

    async fn request_profile(
        &self,
        request: ProfileRequest,
    ) -> Result<ProfileResponse, BackendError> {
        self.post_json(PROFILE_PATH, &request).await
    }
}
