#![allow(dead_code)]

use std::{cell::RefCell, collections::HashMap};
use vsr::{
    Error, Result,
    transport::{Request, Response, Transport},
};

/// Serves canned bodies by exact url and remembers every request.
#[derive(Default)]
pub struct Scripted {
    routes: HashMap<String, (u16, String)>,
    seen: RefCell<Vec<Request>>,
}

impl Scripted {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.route_status(url, 200, body)
    }

    pub fn route_status(mut self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.routes.insert(url.into(), (status, body.into()));
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.seen.borrow().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.seen.borrow().iter().map(|x| x.url.clone()).collect()
    }

    /// The last request sent to `url`.
    pub fn request(&self, url: &str) -> Request {
        self.seen
            .borrow()
            .iter()
            .rev()
            .find(|x| x.url == url)
            .cloned()
            .unwrap_or_else(|| panic!("no request was sent to {}", url))
    }
}

impl Transport for Scripted {
    fn get(&self, request: &Request) -> Result<Response> {
        self.seen.borrow_mut().push(request.clone());

        match self.routes.get(&request.url) {
            Some((status, body)) => Ok(Response {
                status: *status,
                url: request.url.clone(),
                body: body.clone(),
            }),
            None => Err(Error::Transport {
                url: request.url.clone(),
                reason: "connection refused".to_owned(),
            }),
        }
    }
}
