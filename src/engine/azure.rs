use super::{
    types::{AnalyzeOut, OperationStatus, PollState},
    Engine, OutputFormat,
};
use crate::config::{Config, Credentials};
use anyhow::{anyhow, Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION: &str = "operation-location";

/// Layout analysis backed by the Document Intelligence REST API.
pub struct AzureLayoutEngine {
    cfg: Config,
    creds: Credentials,
    client: Client,
}

impl AzureLayoutEngine {
    pub fn new(cfg: &Config, creds: &Credentials) -> Result<Self> {
        if !creds.endpoint.starts_with("https://") && !creds.endpoint.starts_with("http://") {
            return Err(anyhow!("endpoint is not an http(s) URL: {}", creds.endpoint));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.service.request_timeout_seconds))
            .build()
            .with_context(|| "building HTTP client")?;
        Ok(Self {
            cfg: cfg.clone(),
            creds: creds.clone(),
            client,
        })
    }

    pub fn analyze_url(&self, format: OutputFormat) -> String {
        analyze_url(
            &self.creds.endpoint,
            &self.cfg.service.model_id,
            &self.cfg.service.api_version,
            format,
        )
    }

    fn submit(&self, bytes: &[u8], format: OutputFormat) -> Result<String> {
        let url = self.analyze_url(format);
        debug!("submit {url}");
        let resp = self
            .client
            .post(&url)
            .header(KEY_HEADER, &self.creds.api_key)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes.to_vec())
            .send()
            .with_context(|| format!("sending analyze request: {url}"))?;
        let resp = ensure_success(resp, "analyze request")?;

        let location = resp
            .headers()
            .get(OPERATION_LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| anyhow!("analyze response is missing the Operation-Location header"))?;
        Ok(location.to_string())
    }

    fn poll(&self, operation_url: &str) -> Result<OperationStatus> {
        let interval = Duration::from_millis(self.cfg.service.poll_interval_ms.max(1));
        let timeout = Duration::from_secs(self.cfg.service.poll_timeout_seconds);
        let start = Instant::now();

        loop {
            let resp = self
                .client
                .get(operation_url)
                .header(KEY_HEADER, &self.creds.api_key)
                .send()
                .with_context(|| format!("polling operation: {operation_url}"))?;
            let resp = ensure_success(resp, "operation poll")?;
            let wait = retry_after(resp.headers()).map_or(interval, |d| d.max(interval));
            let op: OperationStatus = resp.json().with_context(|| "parsing operation status")?;

            match op.state() {
                PollState::Succeeded => return Ok(op),
                PollState::Failed => {
                    let detail = op
                        .error
                        .map(|e| format!("{}: {}", e.code, e.message))
                        .unwrap_or_else(|| "no error detail".to_string());
                    return Err(anyhow!("analysis {}: {detail}", op.status));
                }
                PollState::Pending => {
                    debug!("operation status={} elapsed={:?}", op.status, start.elapsed());
                }
            }

            if start.elapsed() > timeout {
                return Err(anyhow!("analysis did not finish within {:?}", timeout));
            }
            std::thread::sleep(wait);
        }
    }
}

impl Engine for AzureLayoutEngine {
    fn analyze(&self, input: &Path, format: OutputFormat) -> Result<AnalyzeOut> {
        let bytes =
            std::fs::read(input).with_context(|| format!("reading input: {}", input.display()))?;

        info!("sending {} ({} bytes) format={format}", input.display(), bytes.len());
        let mut fell_back = false;
        let operation = match self.submit(&bytes, format) {
            Ok(op) => op,
            Err(err) if format != OutputFormat::Default && self.cfg.service.fallback_to_default => {
                warn!("format {format} rejected: {err:#}; retrying with default parameters");
                fell_back = true;
                self.submit(&bytes, OutputFormat::Default)?
            }
            Err(err) => return Err(err),
        };

        info!("processing document");
        let op = self.poll(&operation)?;
        let result = op
            .analyze_result
            .ok_or_else(|| anyhow!("succeeded operation has no analyzeResult"))?;

        Ok(AnalyzeOut {
            content: result.content,
            model_id: result.model_id,
            api_version: result.api_version,
            fell_back,
        })
    }
}

pub fn analyze_url(endpoint: &str, model_id: &str, api_version: &str, format: OutputFormat) -> String {
    let mut url = format!(
        "{}/documentintelligence/documentModels/{}:analyze?api-version={}",
        endpoint.trim_end_matches('/'),
        model_id,
        api_version
    );
    if let Some(v) = format.query_value() {
        url.push_str("&outputContentFormat=");
        url.push_str(v);
    }
    url
}

fn ensure_success(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(anyhow!("{what} failed with {status}: {}", body.trim()))
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
