use std::net::SocketAddr;

/// A trait to extract the request data the attribute extractors need
pub trait RequestHeaders {
    /// Get a single header value by case-insensitive name
    ///
    /// Values that are not valid visible ASCII are treated as absent
    fn header(&self, name: &str) -> Option<&str>;

    /// Get every value of a repeated header, in wire order
    fn header_values(&self, name: &str) -> impl Iterator<Item = &str>;

    /// Host the request was addressed to, used when rendering usage instructions
    fn host(&self) -> Option<&str>;
}

/// Read-only view of the inbound request handed to the extractors
///
/// Headers come from the wrapped request, the remote address and port are
/// environment-style values owned by the hosting server (CGI `REMOTE_ADDR` /
/// `REMOTE_PORT`). The extractors never mutate it and it lives for a single
/// request.
pub struct ClientRequestContext<'a, R> {
    request: &'a R,
    remote_addr: Option<String>,
    remote_port: Option<String>,
}

impl<'a, R: RequestHeaders> ClientRequestContext<'a, R> {
    /// Wrap a request with no connection information
    pub fn new(request: &'a R) -> Self {
        Self {
            request,
            remote_addr: None,
            remote_port: None,
        }
    }

    /// Wrap a request together with the peer address of its connection
    pub fn from_socket(peer: SocketAddr, request: &'a R) -> Self {
        Self {
            request,
            remote_addr: Some(peer.ip().to_string()),
            remote_port: Some(peer.port().to_string()),
        }
    }

    /// Set the environment-style remote address (`REMOTE_ADDR`)
    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    /// Set the environment-style remote port (`REMOTE_PORT`)
    pub fn with_remote_port(mut self, port: impl Into<String>) -> Self {
        self.remote_port = Some(port.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    pub fn header_values<'s, 'n>(
        &'s self,
        name: &'n str,
    ) -> impl Iterator<Item = &'s str> + use<'a, 's, 'n, R> {
        self.request.header_values(name)
    }

    pub fn remote_addr(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }

    pub fn remote_port(&self) -> Option<&str> {
        self.remote_port.as_deref()
    }

    /// Host of the request without any port suffix, `localhost` when unknown
    pub fn host(&self) -> &str {
        self.request
            .host()
            .and_then(|host| host.split(':').next())
            .filter(|host| !host.is_empty())
            .unwrap_or("localhost")
    }
}

#[cfg(feature = "http")]
mod http {
    use super::RequestHeaders;

    impl<T> RequestHeaders for http::Request<T> {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
        }

        fn header_values(&self, name: &str) -> impl Iterator<Item = &str> {
            self.headers()
                .get_all(name)
                .iter()
                .filter_map(|value| value.to_str().ok())
        }

        fn host(&self) -> Option<&str> {
            self.header("host")
                // skip host header if HTTP/2, we should use :authority instead
                .filter(|_| self.version() < http::Version::HTTP_2)
                .or_else(|| self.uri().authority().map(|auth| auth.as_str()))
        }
    }

    impl RequestHeaders for http::request::Parts {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .get(name)
                .and_then(|value| value.to_str().ok())
        }

        fn header_values(&self, name: &str) -> impl Iterator<Item = &str> {
            self.headers
                .get_all(name)
                .iter()
                .filter_map(|value| value.to_str().ok())
        }

        fn host(&self) -> Option<&str> {
            self.header("host")
                .filter(|_| self.version < http::Version::HTTP_2)
                .or_else(|| self.uri.authority().map(|auth| auth.as_str()))
        }
    }
}
