//! # Client info
//!
//! This crate inspects an inbound http request and reports attributes of the
//! caller: IP address behind proxy chains, reverse-proxy geolocation headers,
//! user agent breakdown, resolved hostname, remote port and server clock, in
//! plain text, JSON or pretty XML.
//!
//! ## Usage
//!
//! ```rust
//! use client_info::{ClientRequestContext, ExtractorKey, InfoReport, NullResolver};
//!
//! # async fn demo() {
//! let mut request = http::Request::get("http://localhost/info").body(()).unwrap();
//! request.headers_mut().insert(
//!     http::HeaderName::from_static("x-forwarded-for"),
//!     "10.0.0.1, 203.0.113.5".parse().unwrap(),
//! );
//!
//! let peer = "198.51.100.9:4711".parse().unwrap();
//! let ctx = ClientRequestContext::from_socket(peer, &request);
//!
//! let report = InfoReport::collect(&ctx, &NullResolver).await;
//!
//! // the first public address in the proxy chain wins
//! assert_eq!(report.get(ExtractorKey::Ip), Some("203.0.113.5"));
//! assert_eq!(report.get(ExtractorKey::Pt), Some("4711"));
//! # }
//! ```
//!
//! ## Features
//!
//!  * A fixed registry of 13 named extractors, each validating its input and
//!    falling back to a caller supplied default instead of failing.
//!  * Rendering of the full report as a plain text banner, an aligned short
//!    listing for command line clients, JSON or pretty printed XML.
//!  * Content negotiation over the url extension, the `X-Requested-With`
//!    header and curl/wget user agent sniffing.
//!
//! ## Implementation
//!
//! Proxy chain headers are spoofable, so only the first candidate that is a
//! valid, non private address is reported. Geolocation comes from a trusted
//! upstream `X-Geo-IP` header and is never computed here.

mod context;
mod extract;
mod negotiate;
mod render;
mod report;
mod resolve;
mod ua;
mod validators;

#[cfg(feature = "server")]
pub mod server;

pub use context::{ClientRequestContext, RequestHeaders};
pub use extract::{ExtractorKey, NOT_AVAILABLE, REGISTRY};
pub use negotiate::{is_cli_request, negotiate, Format};
pub use render::render;
pub use report::{AttributeResult, InfoReport};
#[cfg(feature = "server")]
pub use resolve::SystemResolver;
pub use resolve::{NullResolver, Resolver};
pub use ua::UserAgentView;
pub use validators::{is_hostname, is_ip_address, is_private_address, is_user_agent, IpVersion};
