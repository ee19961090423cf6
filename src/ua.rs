use std::sync::LazyLock;

use regex::Regex;

/// Parsed breakdown of a raw user agent string
///
/// Derived on demand, never stored. Every field is optional: an unknown
/// platform or browser simply stays `None` and the caller falls back to its
/// default value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgentView {
    pub platform: Option<&'static str>,
    pub browser: Option<&'static str>,
    pub version: Option<String>,
}

// Matched in order against the lowercased user agent. Order matters:
// "darwin" contains "win" and android agents also advertise linux.
static PLATFORM_RULES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("chromeos", "cros"),
        ("iphone", "iphone|ios"),
        ("ipad", "ipad"),
        ("macos", r"darwin|mac|os\s*x"),
        ("windows", "win"),
        ("android", "android"),
        ("bsd", "netbsd|openbsd|freebsd|dragonfly"),
        ("linux", r"x11|lin(?:ux)?\b"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).unwrap()))
    .collect()
});

// Matched in order; the first pattern found wins and its trailing digits, if
// any, become the version. "version" is listed with safari because safari
// reports its own version through a separate `Version/x.y` token.
static BROWSER_RULES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("google", "googlebot"),
        ("wget", "wget"),
        ("curl", "curl"),
        ("opera", "opera|opr"),
        ("edge", "edge|edg"),
        ("chrome", "chrome|crios"),
        ("seamonkey", "seamonkey"),
        ("firefox", "firefox|firebird|phoenix|iceweasel"),
        ("safari", "safari|version"),
        ("webkit", "webkit"),
        ("konqueror", "konqueror"),
        ("netscape", "netscape"),
        ("msie", r"msie|trident/.+?\brv:"),
        ("lynx", "lynx"),
        ("links", "links"),
        ("mozilla", "mozilla"),
    ]
    .into_iter()
    .map(|(name, pattern)| {
        let versioned = format!(r"(?:{pattern})[/\sa-z(]*(\d+[.\d\w]*)?");
        (name, Regex::new(&versioned).unwrap())
    })
    .collect()
});

impl UserAgentView {
    /// Parse a raw user agent string into platform, browser and version
    pub fn parse(user_agent: &str) -> Self {
        let lowered = user_agent.to_lowercase();

        let platform = PLATFORM_RULES
            .iter()
            .find(|(_, rule)| rule.is_match(&lowered))
            .map(|(name, _)| *name);

        let mut browser = None;
        let mut version = None;

        for (name, rule) in BROWSER_RULES.iter() {
            if let Some(caps) = rule.captures(&lowered) {
                browser = Some(*name);
                version = caps.get(1).map(|m| m.as_str().to_string());
                break;
            }
        }

        Self {
            platform,
            browser,
            version,
        }
    }
}
