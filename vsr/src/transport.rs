//! The HTTP seam every provider talks through.
//!
//! Providers only ever issue `GET` requests and read the body as text, so the
//! trait is kept that small. The real implementation is a blocking
//! [`reqwest::blocking::Client`]; tests script their own.

use crate::{Error, Result};
use log::debug;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

pub const USER_AGENT: &str = "User-Agent";
pub const REFERER: &str = "Referer";
pub const X_REQUESTED_WITH: &str = "X-Requested-With";
pub const ACCEPT: &str = "Accept";

#[derive(Clone, Debug)]
pub struct Request {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub timeout: Option<Duration>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Value of the last header set under `name`, compared case insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(x, _)| x.eq_ignore_ascii_case(name))
            .map(|(_, x)| x.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct Response {
    pub status: u16,
    /// Final url after redirects.
    pub url: String,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::Status {
                url: self.url,
                status: self.status,
            })
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

pub trait Transport {
    fn get(&self, request: &Request) -> Result<Response>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, request: &Request) -> Result<Response> {
        (**self).get(request)
    }
}

impl Transport for Client {
    fn get(&self, request: &Request) -> Result<Response> {
        debug!("GET {}", request.url);

        let mut builder = Client::get(self, &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let transport_error = |e: reqwest::Error| Error::Transport {
            url: request.url.clone(),
            reason: e.to_string(),
        };

        let response = builder.send().map_err(transport_error)?;
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response.text().map_err(transport_error)?;

        debug!("{} {} ({} bytes)", status, url, body.len());
        Ok(Response { status, url, body })
    }
}

/// Fetches a success response and decodes its JSON body.
pub fn fetch_json<T: DeserializeOwned>(transport: &dyn Transport, request: &Request) -> Result<T> {
    transport.get(request)?.error_for_status()?.json()
}

/// Spends one time budget across every request of a resolution.
///
/// Each request gets at most the remaining budget as its timeout and no new
/// request starts once the budget is gone.
pub struct Deadline<T> {
    inner: T,
    budget: Duration,
    started: Instant,
}

impl<T> Deadline<T> {
    pub fn new(inner: T, budget: Duration) -> Self {
        Self {
            inner,
            budget,
            started: Instant::now(),
        }
    }

    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.started.elapsed())
    }
}

impl<T: Transport> Transport for Deadline<T> {
    fn get(&self, request: &Request) -> Result<Response> {
        let exceeded = || Error::DeadlineExceeded {
            url: request.url.clone(),
            elapsed: self.started.elapsed(),
        };

        let remaining = self.remaining();

        if remaining.is_zero() {
            return Err(exceeded());
        }

        let timeout = request.timeout.map_or(remaining, |x| x.min(remaining));
        let response = self.inner.get(&request.clone().timeout(timeout))?;

        if self.remaining().is_zero() {
            return Err(exceeded());
        }

        Ok(response)
    }
}
