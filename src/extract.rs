use std::net::IpAddr;

use chrono::Utc;
use serde::Deserialize;

use crate::context::{ClientRequestContext, RequestHeaders};
use crate::resolve::Resolver;
use crate::ua::UserAgentView;
use crate::validators::{is_hostname, is_ip_address, is_private_address, is_user_agent, IpVersion};

/// Value substituted whenever an attribute cannot be derived from the request
pub const NOT_AVAILABLE: &str = "N/A";

// Proxy chain headers scanned for the client address, in trust order. These
// are spoofable, so a candidate only qualifies if it parses as an address and
// sits outside the reserved ranges that indicate an internal hop.
const IP_HEADER_CHAIN: [&str; 8] = [
    "client-ip",
    "cf-connecting-ip",
    "x-forwarded-for",
    "x-forwarded",
    "x-cluster-client-ip",
    "x-real-ip",
    "forwarded-for",
    "forwarded",
];

/// One of the 13 named client attributes this crate reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractorKey {
    Ip,
    Cn,
    Cc,
    C3,
    Ct,
    Ua,
    Hn,
    Ts,
    Dt,
    Pt,
    Os,
    Bw,
    Bv,
}

/// All extractor keys, in report declaration order
pub const REGISTRY: [ExtractorKey; 13] = [
    ExtractorKey::Ip,
    ExtractorKey::Cn,
    ExtractorKey::Cc,
    ExtractorKey::C3,
    ExtractorKey::Ct,
    ExtractorKey::Ua,
    ExtractorKey::Hn,
    ExtractorKey::Ts,
    ExtractorKey::Dt,
    ExtractorKey::Pt,
    ExtractorKey::Os,
    ExtractorKey::Bw,
    ExtractorKey::Bv,
];

impl ExtractorKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ip => "ip",
            Self::Cn => "cn",
            Self::Cc => "cc",
            Self::C3 => "c3",
            Self::Ct => "ct",
            Self::Ua => "ua",
            Self::Hn => "hn",
            Self::Ts => "ts",
            Self::Dt => "dt",
            Self::Pt => "pt",
            Self::Os => "os",
            Self::Bw => "bw",
            Self::Bv => "bv",
        }
    }

    /// Look up a key by its short code, `None` for anything unknown
    pub fn from_name(name: &str) -> Option<Self> {
        REGISTRY.into_iter().find(|key| key.as_str() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Ip => "IP Address",
            Self::Cn => "Country Name",
            Self::Cc => "Country Code",
            Self::C3 => "Country Code 3",
            Self::Ct => "City Name",
            Self::Ua => "User Agent",
            Self::Hn => "Host Name",
            Self::Ts => "Current Timestamp (UTC)",
            Self::Dt => "Current Date Time (UTC)",
            Self::Pt => "Remote Port",
            Self::Os => "Platform Name",
            Self::Bw => "Browser Name",
            Self::Bv => "Browser Version",
        }
    }

    /// Derive this attribute from the request, falling back to `default`
    ///
    /// Malformed or missing client data never surfaces as an error, it
    /// resolves to `default`. The only suspension point is the reverse DNS
    /// lookup behind [`ExtractorKey::Hn`].
    pub async fn extract<R: RequestHeaders>(
        &self,
        ctx: &ClientRequestContext<'_, R>,
        resolver: &impl Resolver,
        default: &str,
    ) -> String {
        match self {
            Self::Ip => client_address(ctx, default),
            Self::Cn => geo_field(ctx, default, |geo| geo.country.as_ref()?.name.as_deref()),
            Self::Cc => geo_field(ctx, default, |geo| geo.country.as_ref()?.code.as_deref()),
            Self::C3 => geo_field(ctx, default, |geo| geo.country.as_ref()?.code3.as_deref()),
            Self::Ct => geo_field(ctx, default, |geo| geo.city.as_ref()?.name.as_deref()),
            Self::Ua => match user_agent(ctx) {
                Some(ua) => ua.to_string(),
                None => default.to_string(),
            },
            Self::Hn => resolved_hostname(ctx, resolver, default).await,
            Self::Ts => timestamp_utc(),
            Self::Dt => datetime_utc(),
            Self::Pt => remote_port(ctx, default),
            Self::Os => user_agent_attr(ctx, default, |view| view.platform.map(str::to_string)),
            Self::Bw => user_agent_attr(ctx, default, |view| view.browser.map(str::to_string)),
            Self::Bv => user_agent_attr(ctx, default, |view| view.version),
        }
    }
}

/// First plausible public client address from the proxy chain headers
///
/// Falls back to the raw connection remote address, then to `default`.
fn client_address<R: RequestHeaders>(ctx: &ClientRequestContext<'_, R>, default: &str) -> String {
    for name in IP_HEADER_CHAIN {
        // a header may appear several times; every value is a comma list
        let public = ctx
            .header_values(name)
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .find(|part| is_public_address(part));

        if let Some(public) = public {
            return public.to_string();
        }
    }

    match ctx.remote_addr() {
        Some(addr) if !addr.is_empty() => addr.to_string(),
        _ => default.to_string(),
    }
}

fn is_public_address(value: &str) -> bool {
    is_ip_address(value, IpVersion::Any)
        && value
            .parse::<IpAddr>()
            .map(|addr| !is_private_address(&addr))
            .unwrap_or(false)
}

#[derive(Debug, Deserialize)]
struct GeoIp {
    country: Option<GeoCountry>,
    city: Option<GeoCity>,
}

#[derive(Debug, Deserialize)]
struct GeoCountry {
    name: Option<String>,
    code: Option<String>,
    code3: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeoCity {
    name: Option<String>,
}

// The X-Geo-IP header is injected by a trusted upstream and holds a JSON
// object. Anything that does not look like one, fails to parse or misses the
// requested field resolves to the default.
fn geo_field<R, F>(ctx: &ClientRequestContext<'_, R>, default: &str, pick: F) -> String
where
    R: RequestHeaders,
    F: for<'g> Fn(&'g GeoIp) -> Option<&'g str>,
{
    let Some(raw) = ctx.header("x-geo-ip") else {
        return default.to_string();
    };

    let raw = raw.trim();

    if !(raw.starts_with('{') && raw.ends_with('}')) {
        return default.to_string();
    }

    let Ok(geo) = serde_json::from_str::<GeoIp>(raw) else {
        return default.to_string();
    };

    match pick(&geo) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}

/// The raw `User-Agent` header, if it passes validation
pub(crate) fn user_agent<'c, R: RequestHeaders>(
    ctx: &'c ClientRequestContext<'_, R>,
) -> Option<&'c str> {
    ctx.header("user-agent").filter(|ua| is_user_agent(ua))
}

fn user_agent_attr<R, F>(ctx: &ClientRequestContext<'_, R>, default: &str, pick: F) -> String
where
    R: RequestHeaders,
    F: Fn(UserAgentView) -> Option<String>,
{
    user_agent(ctx)
        .map(UserAgentView::parse)
        .and_then(pick)
        .unwrap_or_else(|| default.to_string())
}

async fn resolved_hostname<R: RequestHeaders>(
    ctx: &ClientRequestContext<'_, R>,
    resolver: &impl Resolver,
    default: &str,
) -> String {
    let Ok(addr) = client_address(ctx, "").parse::<IpAddr>() else {
        return default.to_string();
    };

    match resolver.reverse_lookup(addr).await {
        Some(name) if is_hostname(&name) => name,
        _ => default.to_string(),
    }
}

fn remote_port<R: RequestHeaders>(ctx: &ClientRequestContext<'_, R>, default: &str) -> String {
    // an entirely absent port resolves to the default as well
    let Some(raw) = ctx.remote_port() else {
        return default.to_string();
    };

    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return default.to_string();
    }

    match raw.parse::<u32>() {
        Ok(port) if port <= 65535 => port.to_string(),
        _ => default.to_string(),
    }
}

/// Current UTC time as fractional epoch seconds
pub(crate) fn timestamp_utc() -> String {
    let now = Utc::now();

    format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros())
}

/// Current UTC time in asctime style, locale independent
pub(crate) fn datetime_utc() -> String {
    Utc::now().format("%a %b %e %H:%M:%S %Y").to_string()
}

#[cfg(all(test, feature = "http"))]
mod tests {
    use super::*;
    use crate::resolve::NullResolver;

    fn request(headers: &[(&str, &str)]) -> http::Request<()> {
        let mut builder = http::Request::get("/");

        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        builder.body(()).unwrap()
    }

    #[tokio::test]
    async fn forwarded_for_skips_private_hops() {
        let request = request(&[("x-forwarded-for", "10.0.0.1, 203.0.113.5")]);
        let ctx = ClientRequestContext::new(&request);

        let value = ExtractorKey::Ip.extract(&ctx, &NullResolver, "N/A").await;

        assert_eq!(value, "203.0.113.5");
    }

    #[tokio::test]
    async fn repeated_forwarded_for_headers_are_all_scanned() {
        let request = request(&[
            ("x-forwarded-for", "10.0.0.1"),
            ("x-forwarded-for", "203.0.113.5"),
        ]);
        let ctx = ClientRequestContext::new(&request);

        let value = ExtractorKey::Ip.extract(&ctx, &NullResolver, "N/A").await;

        assert_eq!(value, "203.0.113.5");
    }

    #[tokio::test]
    async fn header_priority_over_forwarded_for() {
        let request = request(&[
            ("x-forwarded-for", "198.51.100.1"),
            ("client-ip", "203.0.113.5"),
        ]);
        let ctx = ClientRequestContext::new(&request);

        let value = ExtractorKey::Ip.extract(&ctx, &NullResolver, "N/A").await;

        assert_eq!(value, "203.0.113.5");
    }

    #[tokio::test]
    async fn remote_addr_fallback_is_not_filtered() {
        let empty = request(&[]);
        let ctx = ClientRequestContext::new(&empty).with_remote_addr("198.51.100.9");

        let value = ExtractorKey::Ip.extract(&ctx, &NullResolver, "N/A").await;

        assert_eq!(value, "198.51.100.9");

        // private remote addresses are still reported, only header values
        // are held to the public range rule
        let private = request(&[("x-forwarded-for", "10.0.0.1")]);
        let ctx = ClientRequestContext::new(&private).with_remote_addr("192.168.2.60");
        let value = ExtractorKey::Ip.extract(&ctx, &NullResolver, "N/A").await;

        assert_eq!(value, "192.168.2.60");
    }

    #[tokio::test]
    async fn no_address_at_all_yields_default() {
        let request = request(&[("x-forwarded-for", "not-an-address")]);
        let ctx = ClientRequestContext::new(&request);

        let value = ExtractorKey::Ip.extract(&ctx, &NullResolver, "N/A").await;

        assert_eq!(value, "N/A");
    }

    #[tokio::test]
    async fn geo_header_fields() {
        let request = request(&[(
            "x-geo-ip",
            r#"{"country":{"name":"Germany","code":"DE","code3":"DEU"},"city":{"name":"Berlin"}}"#,
        )]);
        let ctx = ClientRequestContext::new(&request);

        assert_eq!(
            ExtractorKey::Cn.extract(&ctx, &NullResolver, "N/A").await,
            "Germany"
        );
        assert_eq!(
            ExtractorKey::Cc.extract(&ctx, &NullResolver, "N/A").await,
            "DE"
        );
        assert_eq!(
            ExtractorKey::C3.extract(&ctx, &NullResolver, "N/A").await,
            "DEU"
        );
        assert_eq!(
            ExtractorKey::Ct.extract(&ctx, &NullResolver, "N/A").await,
            "Berlin"
        );
    }

    #[tokio::test]
    async fn geo_header_is_parsed_defensively() {
        for value in [
            "",
            "plain text",
            "[1,2,3]",
            r#"{"country":"#,
            r#"{"country":{"code":""}}"#,
            r#"{"city":{"name":"Berlin"}}"#,
        ] {
            let request = request(&[("x-geo-ip", value)]);
            let ctx = ClientRequestContext::new(&request);

            assert_eq!(
                ExtractorKey::Cc.extract(&ctx, &NullResolver, "N/A").await,
                "N/A",
                "{value:?}"
            );
        }
    }

    #[tokio::test]
    async fn user_agent_breakdown() {
        let request = request(&[(
            "user-agent",
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
             Chrome/91.0.4472.124 Safari/537.36",
        )]);
        let ctx = ClientRequestContext::new(&request);

        assert_eq!(
            ExtractorKey::Ua.extract(&ctx, &NullResolver, "N/A").await,
            ctx.header("user-agent").unwrap()
        );
        assert_eq!(
            ExtractorKey::Os.extract(&ctx, &NullResolver, "N/A").await,
            "linux"
        );
        assert_eq!(
            ExtractorKey::Bw.extract(&ctx, &NullResolver, "N/A").await,
            "chrome"
        );
        assert_eq!(
            ExtractorKey::Bv.extract(&ctx, &NullResolver, "N/A").await,
            "91.0.4472.124"
        );
    }

    #[tokio::test]
    async fn missing_user_agent_yields_defaults() {
        let request = request(&[]);
        let ctx = ClientRequestContext::new(&request);

        for key in [
            ExtractorKey::Ua,
            ExtractorKey::Os,
            ExtractorKey::Bw,
            ExtractorKey::Bv,
        ] {
            assert_eq!(key.extract(&ctx, &NullResolver, "N/A").await, "N/A");
        }
    }

    #[tokio::test]
    async fn port_validation() {
        let request = request(&[]);

        let ctx = ClientRequestContext::new(&request).with_remote_port("4711");
        assert_eq!(
            ExtractorKey::Pt.extract(&ctx, &NullResolver, "N/A").await,
            "4711"
        );

        for bad in ["", "70000", "-1", "80a", "99999999999999999999"] {
            let ctx = ClientRequestContext::new(&request).with_remote_port(bad);
            assert_eq!(
                ExtractorKey::Pt.extract(&ctx, &NullResolver, "N/A").await,
                "N/A",
                "{bad:?}"
            );
        }

        // absent entirely
        let ctx = ClientRequestContext::new(&request);
        assert_eq!(
            ExtractorKey::Pt.extract(&ctx, &NullResolver, "N/A").await,
            "N/A"
        );
    }

    #[tokio::test]
    async fn hostname_requires_resolvable_address() {
        struct StaticResolver;

        impl Resolver for StaticResolver {
            fn reverse_lookup(
                &self,
                addr: IpAddr,
            ) -> impl std::future::Future<Output = Option<String>> + Send {
                std::future::ready(
                    (addr == "203.0.113.5".parse::<IpAddr>().unwrap())
                        .then(|| "client.example.com".to_string()),
                )
            }
        }

        let resolvable = request(&[("x-forwarded-for", "203.0.113.5")]);
        let ctx = ClientRequestContext::new(&resolvable);
        assert_eq!(
            ExtractorKey::Hn.extract(&ctx, &StaticResolver, "N/A").await,
            "client.example.com"
        );

        // resolver failure degrades to the default
        assert_eq!(
            ExtractorKey::Hn.extract(&ctx, &NullResolver, "N/A").await,
            "N/A"
        );

        // no usable address at all
        let empty = request(&[]);
        let ctx = ClientRequestContext::new(&empty);
        assert_eq!(
            ExtractorKey::Hn.extract(&ctx, &StaticResolver, "N/A").await,
            "N/A"
        );
    }

    #[tokio::test]
    async fn invalid_resolved_hostname_is_rejected() {
        struct BadNameResolver;

        impl Resolver for BadNameResolver {
            fn reverse_lookup(
                &self,
                _addr: IpAddr,
            ) -> impl std::future::Future<Output = Option<String>> + Send {
                std::future::ready(Some("-not_a_host-".to_string()))
            }
        }

        let request = request(&[("x-forwarded-for", "203.0.113.5")]);
        let ctx = ClientRequestContext::new(&request);

        assert_eq!(
            ExtractorKey::Hn.extract(&ctx, &BadNameResolver, "N/A").await,
            "N/A"
        );
    }

    #[test]
    fn key_round_trip() {
        for key in REGISTRY {
            assert_eq!(ExtractorKey::from_name(key.as_str()), Some(key));
        }

        assert_eq!(ExtractorKey::from_name("zz"), None);
        assert_eq!(ExtractorKey::from_name(""), None);
    }

    #[test]
    fn timestamp_shape() {
        let ts = timestamp_utc();
        let (secs, micros) = ts.split_once('.').unwrap();

        assert!(secs.bytes().all(|b| b.is_ascii_digit()));
        assert_eq!(micros.len(), 6);
    }
}
