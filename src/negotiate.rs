use crate::context::{ClientRequestContext, RequestHeaders};
use crate::extract::user_agent;

/// Output representation of a full report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    /// Aligned listing without the banner, served to command line clients.
    /// Internal variant only, not addressable through a url extension.
    TextShort,
    Json,
    Xml,
}

impl Format {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Text | Self::TextShort => "text/plain",
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }
}

const CLI_AGENT_TOKENS: [&str; 3] = ["curl/", "libcurl/", "wget/"];

/// True when the user agent identifies a known command line http client
pub fn is_cli_request(user_agent: Option<&str>) -> bool {
    match user_agent {
        Some(ua) => CLI_AGENT_TOKENS.iter().any(|token| ua.contains(token)),
        None => false,
    }
}

/// Pick the output format for a full report request
///
/// `extension` is the path suffix after `/info.`, absent for the bare
/// `/info` route. `None` means the request cannot be served (404).
pub fn negotiate<R: RequestHeaders>(
    extension: Option<&str>,
    ctx: &ClientRequestContext<'_, R>,
) -> Option<Format> {
    let format = match extension {
        Some(ext) => {
            if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphabetic()) {
                return None;
            }

            match ext {
                "txt" => Format::Text,
                "json" => Format::Json,
                "xml" => Format::Xml,
                _ => return None,
            }
        }
        None => {
            if is_xml_http_request(ctx) {
                Format::Json
            } else {
                Format::Text
            }
        }
    };

    // command line clients get the short listing instead of the banner
    if format == Format::Text && is_cli_request(user_agent(ctx)) {
        return Some(Format::TextShort);
    }

    Some(format)
}

fn is_xml_http_request<R: RequestHeaders>(ctx: &ClientRequestContext<'_, R>) -> bool {
    ctx.header("x-requested-with")
        .map(|value| value.eq_ignore_ascii_case("xmlhttprequest"))
        .unwrap_or(false)
}

#[cfg(all(test, feature = "http"))]
mod tests {
    use super::*;

    fn ctx_request(headers: &[(&str, &str)]) -> http::Request<()> {
        let mut builder = http::Request::get("/info");

        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        builder.body(()).unwrap()
    }

    #[test]
    fn no_extension_defaults_to_text() {
        let request = ctx_request(&[]);
        let ctx = ClientRequestContext::new(&request);

        assert_eq!(negotiate(None, &ctx), Some(Format::Text));
    }

    #[test]
    fn xml_http_request_header_selects_json() {
        let request = ctx_request(&[("x-requested-with", "XMLHttpRequest")]);
        let ctx = ClientRequestContext::new(&request);
        assert_eq!(negotiate(None, &ctx), Some(Format::Json));

        let request = ctx_request(&[("x-requested-with", "xmlhttprequest")]);
        let ctx = ClientRequestContext::new(&request);
        assert_eq!(negotiate(None, &ctx), Some(Format::Json));

        let request = ctx_request(&[("x-requested-with", "fetch")]);
        let ctx = ClientRequestContext::new(&request);
        assert_eq!(negotiate(None, &ctx), Some(Format::Text));
    }

    #[test]
    fn known_extensions() {
        let request = ctx_request(&[]);
        let ctx = ClientRequestContext::new(&request);

        assert_eq!(negotiate(Some("txt"), &ctx), Some(Format::Text));
        assert_eq!(negotiate(Some("json"), &ctx), Some(Format::Json));
        assert_eq!(negotiate(Some("xml"), &ctx), Some(Format::Xml));
    }

    #[test]
    fn unknown_or_malformed_extensions_are_rejected() {
        let request = ctx_request(&[]);
        let ctx = ClientRequestContext::new(&request);

        for ext in ["csv", "html", "txt2", "txt_short", "", ".."] {
            assert_eq!(negotiate(Some(ext), &ctx), None, "{ext:?}");
        }
    }

    #[test]
    fn cli_clients_get_the_short_form() {
        let request = ctx_request(&[("user-agent", "curl/7.68.0")]);
        let ctx = ClientRequestContext::new(&request);

        assert_eq!(negotiate(None, &ctx), Some(Format::TextShort));
        assert_eq!(negotiate(Some("txt"), &ctx), Some(Format::TextShort));
        // only the text form is substituted
        assert_eq!(negotiate(Some("json"), &ctx), Some(Format::Json));

        let request = ctx_request(&[("user-agent", "wget/1.20.3 (linux-gnu)")]);
        let ctx = ClientRequestContext::new(&request);
        assert_eq!(negotiate(None, &ctx), Some(Format::TextShort));

        // matching is case sensitive, other spellings keep the banner
        let request = ctx_request(&[("user-agent", "Curl/7.68.0")]);
        let ctx = ClientRequestContext::new(&request);
        assert_eq!(negotiate(None, &ctx), Some(Format::Text));
    }

    #[test]
    fn cli_detection_tokens() {
        assert!(is_cli_request(Some("curl/7.68.0")));
        assert!(is_cli_request(Some("libcurl/7.64.1")));
        assert!(is_cli_request(Some("wget/1.20.3 (linux-gnu)")));
        assert!(!is_cli_request(Some("Wget/1.20.3 (linux-gnu)")));
        assert!(!is_cli_request(Some("Mozilla/5.0")));
        assert!(!is_cli_request(None));
    }
}
