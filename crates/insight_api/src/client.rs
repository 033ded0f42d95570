use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::models::{
    EmailGroups, PlatformsResponse, PrioritiesResponse, ReleasesResponse, ReportRequest,
    ReportResponse, ReportTypeInfo, ReportTypesResponse, SeveritiesResponse, TeamsResponse,
};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

const RELEASES_PATH: &str = "api/releases";
const REPORT_TYPES_PATH: &str = "api/report-types";
const TEAMS_PATH: &str = "api/teams";
const PLATFORMS_PATH: &str = "api/reports";
const PRIORITIES_PATH: &str = "api/priorities";
const SEVERITIES_PATH: &str = "api/severities";
const EMAIL_GROUPS_PATH: &str = "api/email-groups";
const GENERATE_REPORT_PATH: &str = "api/generate-report";

#[derive(Clone)]
pub struct ReportApiClient {
    http: HttpClient,
    config: ApiConfig,
}

impl ReportApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub async fn get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let request = self.http.get(self.url_for(path));
        debug!(method = "GET", path, "backend request");
        Self::parse_json(request.send().await?).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B, timeout: Option<Duration>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path, timeout).json(body);
        debug!(method = "POST", path, "backend request");
        Self::parse_json(request.send().await?).await
    }

    fn request(&self, method: Method, path: &str, timeout: Option<Duration>) -> RequestBuilder {
        let request = self.http.request(method, self.url_for(path));
        match timeout {
            Some(duration) => request.timeout(duration),
            None => request,
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.config.root(), path.trim_start_matches('/'))
    }

    async fn parse_json<T>(response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            response.json::<T>().await.map_err(ApiError::from)
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "backend returned an error status");
            Err(ApiError::http(status, body))
        }
    }

    pub async fn list_releases(&self) -> Result<Vec<String>> {
        let payload: ReleasesResponse = self.get(RELEASES_PATH).await?;
        Ok(payload.releases)
    }

    pub async fn list_report_types(&self) -> Result<Vec<ReportTypeInfo>> {
        let payload: ReportTypesResponse = self.get(REPORT_TYPES_PATH).await?;
        Ok(payload.report_types)
    }

    pub async fn list_teams(&self) -> Result<Vec<String>> {
        let payload: TeamsResponse = self.get(TEAMS_PATH).await?;
        Ok(payload.teams)
    }

    pub async fn list_platforms(&self) -> Result<Vec<String>> {
        let payload: PlatformsResponse = self.get(PLATFORMS_PATH).await?;
        Ok(payload.platforms)
    }

    pub async fn list_priorities(&self) -> Result<Vec<String>> {
        let payload: PrioritiesResponse = self.get(PRIORITIES_PATH).await?;
        Ok(payload.priorities)
    }

    pub async fn list_severities(&self) -> Result<Vec<String>> {
        let payload: SeveritiesResponse = self.get(SEVERITIES_PATH).await?;
        Ok(payload.severities)
    }

    pub async fn list_email_groups(&self) -> Result<EmailGroups> {
        self.get(EMAIL_GROUPS_PATH).await
    }

    /// Posts the composed request and returns the rendered HTML report.
    pub async fn generate_report(&self, request: &ReportRequest) -> Result<String> {
        let payload: ReportResponse = self
            .post(GENERATE_REPORT_PATH, request, self.config.report_timeout)
            .await?;
        Ok(payload.report)
    }

    /// Fetches the static fact list displayed while a report is generating.
    pub async fn fetch_facts(&self) -> Result<Vec<String>> {
        self.get(&self.config.facts_path).await
    }

    pub async fn download_excel(&self, filename: &str) -> Result<BinaryContent> {
        let url = self.excel_url(filename)?;
        debug!(method = "GET", path = url.path(), "backend request");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::http(status, body));
        }
        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let bytes = response.bytes().await?.to_vec();
        Ok(BinaryContent { bytes, mime_type })
    }

    fn excel_url(&self, filename: &str) -> Result<Url> {
        let mut url =
            Url::parse(self.config.root()).map_err(|err| ApiError::Other(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::Other(format!("cannot append path to {}", self.config.base_url))
            })?
            .pop_if_empty()
            .extend(["api", "download-excel", filename]);
        Ok(url)
    }
}

fn build_http_client(config: &ApiConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    let user_agent =
        HeaderValue::from_str(&config.user_agent).map_err(|err| ApiError::Other(err.to_string()))?;
    headers.insert(USER_AGENT, user_agent);

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| ApiError::Other(err.to_string()))
}

#[derive(Debug, Clone)]
pub struct BinaryContent {
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}
