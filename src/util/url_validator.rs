use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Reasons a user-supplied feed URL is refused.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("Private IP address not allowed: {0}")]
    PrivateIp(IpAddr),
    #[error("Localhost not allowed")]
    Localhost,
}

/// Validates a custom feed URL passed on the command line.
///
/// The built-in arXiv feeds skip this check; it only guards `--url`, which
/// would otherwise let the tool be pointed at internal services (SSRF).
/// Rejects non-HTTP(S) schemes, `localhost`, loopback, private, link-local
/// and unspecified addresses.
pub fn validate_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlValidationError::UnsupportedScheme(url.scheme().to_owned()));
    }

    match url.host() {
        Some(url::Host::Domain(host)) if host.eq_ignore_ascii_case("localhost") => {
            return Err(UrlValidationError::Localhost);
        }
        Some(url::Host::Ipv4(v4)) => check_ip(IpAddr::V4(v4))?,
        Some(url::Host::Ipv6(v6)) => check_ip(IpAddr::V6(v6))?,
        _ => {}
    }

    Ok(url)
}

fn check_ip(ip: IpAddr) -> Result<(), UrlValidationError> {
    if ip.is_loopback() {
        return Err(UrlValidationError::Localhost);
    }
    let private = match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_link_local() || v4.is_unspecified(),
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            // fc00::/7 unique local, fe80::/10 link-local
            v6.is_unspecified() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
        }
    };
    if private {
        return Err(UrlValidationError::PrivateIp(ip));
    }
    Ok(())
}
