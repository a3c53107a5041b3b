//! HTTP GET transport for manifests and segments.
//!
//! `Fetcher` is the seam the engine and session depend on; `CurlFetcher` is
//! the libcurl implementation used by the CLI. Each call is a blocking GET on
//! the current thread.

use std::time::Duration;

use crate::config::FetchConfig;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, TLS, etc.).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: curl::Error,
    },
    /// Response had a non-2xx status.
    #[error("GET {url} returned HTTP {status}")]
    Http { url: String, status: u32 },
    /// Manifest body was not valid UTF-8.
    #[error("response from {url} is not valid UTF-8")]
    InvalidText { url: String },
}

/// Transport capability: whole-body GETs that fail on non-success status.
pub trait Fetcher {
    /// Fetch a manifest body as text.
    fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
    /// Fetch a segment body as raw bytes.
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch_text(url)
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        (**self).fetch_bytes(url)
    }
}

/// libcurl-backed fetcher with separate manifest and segment time limits.
#[derive(Debug, Clone, Copy)]
pub struct CurlFetcher {
    connect_timeout: Duration,
    manifest_timeout: Duration,
    segment_timeout: Duration,
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

impl CurlFetcher {
    pub fn from_config(cfg: &FetchConfig) -> Self {
        Self {
            connect_timeout: cfg.connect_timeout(),
            manifest_timeout: cfg.manifest_timeout(),
            segment_timeout: cfg.segment_timeout(),
        }
    }

    fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        let transport = |source: curl::Error| FetchError::Transport {
            url: url.to_string(),
            source,
        };
        let mut body = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(transport)?;
        easy.follow_location(true).map_err(transport)?;
        easy.max_redirections(10).map_err(transport)?;
        easy.connect_timeout(self.connect_timeout.min(timeout))
            .map_err(transport)?;
        easy.timeout(timeout).map_err(transport)?;

        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(transport)?;
            transfer.perform().map_err(transport)?;
        }

        let code = easy.response_code().map_err(transport)?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: code,
            });
        }
        tracing::trace!(bytes = body.len(), "GET {} -> {}", url, code);
        Ok(body)
    }
}

impl Fetcher for CurlFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let body = self.get(url, self.manifest_timeout)?;
        String::from_utf8(body).map_err(|_| FetchError::InvalidText {
            url: url.to_string(),
        })
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.get(url, self.segment_timeout)
    }
}

/// Scripted fetcher for unit tests: serves fixed bodies and records every URL requested.
#[cfg(test)]
pub(crate) mod fake {
    use super::{FetchError, Fetcher};
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    pub(crate) struct FakeFetcher {
        bodies: HashMap<String, Vec<u8>>,
        statuses: HashMap<String, u32>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeFetcher {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn serve(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
            self.bodies.insert(url.to_string(), body.into());
            self
        }

        pub(crate) fn fail(mut self, url: &str, status: u32) -> Self {
            self.statuses.insert(url.to_string(), status);
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }

        fn respond(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.calls.borrow_mut().push(url.to_string());
            if let Some(&status) = self.statuses.get(url) {
                return Err(FetchError::Http {
                    url: url.to_string(),
                    status,
                });
            }
            self.bodies.get(url).cloned().ok_or_else(|| FetchError::Http {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    impl Fetcher for FakeFetcher {
        fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
            let body = self.respond(url)?;
            String::from_utf8(body).map_err(|_| FetchError::InvalidText {
                url: url.to_string(),
            })
        }

        fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.respond(url)
        }
    }
}
