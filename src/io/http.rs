use url::Url;

use super::remote::{ApiRequest, Method, RawResponse, RemoteError, Surface, Transport};
use crate::model::ClientConfig;

/// Blocking HTTPS transport backed by a shared `ureq` agent.
pub struct HttpTransport {
    agent: ureq::Agent,
    rest_base: Url,
    sync_url: Url,
    authorization: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build();
        HttpTransport {
            agent: agent_config.into(),
            rest_base: config.rest_base.clone(),
            sync_url: config.sync_url.clone(),
            authorization: format!("Bearer {}", config.token),
        }
    }

    /// Resolve a request against its surface base. Each path segment and
    /// query pair is percent-encoded by `url`.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url, RemoteError> {
        let mut url = match request.surface {
            Surface::Rest => self.rest_base.clone(),
            Surface::Sync => self.sync_url.clone(),
        };
        if !request.segments.is_empty() {
            url.path_segments_mut()
                .map_err(|_| RemoteError::Url("base URL cannot take a path".into()))?
                .pop_if_empty()
                .extend(&request.segments);
        }
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

impl Transport for HttpTransport {
    fn perform(&self, request: &ApiRequest) -> Result<RawResponse, RemoteError> {
        let url = self.url_for(request)?;
        let auth = self.authorization.as_str();

        let result = match request.method {
            Method::Get => self.agent.get(url.as_str()).header("Authorization", auth).call(),
            Method::Delete => self
                .agent
                .delete(url.as_str())
                .header("Authorization", auth)
                .call(),
            Method::Post if request.form.is_empty() => self
                .agent
                .post(url.as_str())
                .header("Authorization", auth)
                .send_empty(),
            Method::Post => self
                .agent
                .post(url.as_str())
                .header("Authorization", auth)
                .send_form(request.form.iter().map(|(k, v)| (k.as_str(), v.as_str()))),
        };

        match result {
            Ok(mut response) => {
                let status = response.status().as_u16();
                let body = response
                    .body_mut()
                    .read_to_string()
                    .map_err(|e| RemoteError::Transport(e.to_string()))?;
                Ok(RawResponse { status, body })
            }
            Err(ureq::Error::StatusCode(code)) => Err(RemoteError::Status(code)),
            Err(e) => Err(RemoteError::Transport(e.to_string())),
        }
    }
}
