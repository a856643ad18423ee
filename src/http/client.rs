// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Client, Method, StatusCode};

use super::cookie::CookieJar;
use super::request::Request;
use super::response::Response;
use super::{headers, DEFAULT_USER_AGENT};
use crate::error::{Error, Result};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub user_agent: String,
    /// Default timeout for a single exchange
    pub timeout: Duration,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    /// Send and store cookies through the jar
    pub handle_cookies: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            accept_invalid_certs: false,
            handle_cookies: true,
        }
    }
}

impl HttpClientConfig {
    /// Config for out-of-band calls that carry credentials explicitly
    pub fn without_cookies() -> Self {
        Self {
            handle_cookies: false,
            max_redirects: 0,
            ..Default::default()
        }
    }
}

/// HTTP client with cookie management
///
/// Redirects are followed here rather than inside reqwest so that
/// Set-Cookie headers on intermediate hops reach the jar.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    cookie_jar: CookieJar,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            headers::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,*/*;q=0.8"),
        );

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .default_headers(default_headers)
            .build()?;

        Ok(Self {
            client,
            config,
            cookie_jar: CookieJar::new(),
        })
    }

    /// Get the cookie jar
    pub fn cookie_jar(&self) -> &CookieJar {
        &self.cookie_jar
    }

    /// Get client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Execute a GET request
    pub async fn get(&self, url: impl AsRef<str>) -> Result<Response> {
        self.execute(Request::get(url)?).await
    }

    /// Execute a request, following redirects
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let start = Instant::now();
        let mut current = request;
        let mut hops = 0usize;

        loop {
            let (status, headers, body, url) = self.send_once(&current).await?;

            let location = headers
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            match location {
                Some(location) if status.is_redirection() && hops < self.config.max_redirects => {
                    hops += 1;
                    let next = url.join(&location)?;
                    tracing::debug!(from = %url, to = %next, status = %status, "Following redirect");

                    let keep_method = matches!(
                        status,
                        StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT
                    );
                    current = if keep_method {
                        Request {
                            url: next,
                            ..current
                        }
                    } else {
                        let mut get = Request::from_url(Method::GET, next);
                        get.timeout = current.timeout;
                        get
                    };
                }
                _ => {
                    let elapsed = start.elapsed().as_millis() as u64;
                    return Ok(Response::new(status, headers, body, url, elapsed));
                }
            }
        }
    }

    async fn send_once(
        &self,
        request: &Request,
    ) -> Result<(StatusCode, HeaderMap, bytes::Bytes, url::Url)> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());

        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }

        if self.config.handle_cookies && request.headers.get(headers::COOKIE).is_none() {
            if let Some(cookie_header) = self.cookie_jar.get_cookie_header(&request.url) {
                builder = builder.header(headers::COOKIE, cookie_header);
            }
        }

        if let Some(ref body) = request.body {
            builder = builder.body(body.clone());
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(method = %request.method, url = %request.url, error = %e, "Request failed");
            Error::Transport(e)
        })?;

        let url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();

        if self.config.handle_cookies {
            for value in headers.get_all(headers::SET_COOKIE) {
                if let Ok(cookie) = value.to_str() {
                    self.cookie_jar.add_from_header(cookie, &url);
                }
            }
        }

        let body = response.bytes().await?;

        tracing::debug!(
            method = %request.method,
            url = %url,
            status = status.as_u16(),
            bytes = body.len(),
            "Exchange"
        );

        Ok((status, headers, body, url))
    }
}
