//! Endpoint resolution - maps the client-visible hostname to the server URI
//!
//! Pure and deterministic: the deployment topology is encoded entirely in the
//! hostname, so this can be unit tested without any live connection.
//!
//! - Local development (`localhost` or a dotted-quad address) talks plain
//!   `ws://` to a fixed port and path.
//! - Hosted deployments follow the API-subdomain convention: the UI at
//!   `{subdomain}.{rest}` reaches its server at `wss://{subdomain}-api.{rest}/`.

use std::sync::OnceLock;

use regex_lite::Regex;
use thiserror::Error;

/// Port the local development server listens on.
pub const LOCAL_API_PORT: u16 = 7000;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EndpointError {
    /// The hostname has no `{subdomain}.{rest}` split to build an API
    /// endpoint from. This is reported, never silently defaulted.
    #[error("hostname {0:?} cannot be split into subdomain and domain")]
    MalformedHostname(String),
}

fn local_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(localhost|[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3})")
            .expect("static pattern is valid")
    })
}

fn subdomain_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\w+?)\.(.*)").expect("static pattern is valid"))
}

/// Resolve the WebSocket endpoint for a client-visible hostname.
///
/// Hostnames containing `localhost` or a dotted quad count as local, matching
/// the deployed rule (a substring match, not an anchored one).
pub fn resolve(hostname: &str) -> Result<String, EndpointError> {
    if local_pattern().is_match(hostname) {
        return Ok(format!("ws://{hostname}:{LOCAL_API_PORT}/api"));
    }

    let malformed = || EndpointError::MalformedHostname(hostname.to_string());
    let captures = subdomain_pattern()
        .captures(hostname)
        .ok_or_else(malformed)?;
    let subdomain = captures.get(1).ok_or_else(malformed)?.as_str();
    let rest = captures.get(2).ok_or_else(malformed)?.as_str();

    Ok(format!("wss://{subdomain}-api.{rest}/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localhost_resolves_to_local_endpoint() {
        assert_eq!(
            resolve("localhost"),
            Ok("ws://localhost:7000/api".to_string())
        );
    }

    #[test]
    fn dotted_quad_resolves_to_local_endpoint() {
        assert_eq!(
            resolve("127.0.0.1"),
            Ok("ws://127.0.0.1:7000/api".to_string())
        );
        assert_eq!(
            resolve("192.168.1.20"),
            Ok("ws://192.168.1.20:7000/api".to_string())
        );
    }

    #[test]
    fn local_match_is_a_substring_match() {
        // Deployed behavior: anything containing the local pattern is local.
        assert_eq!(
            resolve("localhost.localdomain"),
            Ok("ws://localhost.localdomain:7000/api".to_string())
        );
    }

    #[test]
    fn hosted_hostname_maps_to_api_subdomain() {
        assert_eq!(
            resolve("game.example.com"),
            Ok("wss://game-api.example.com/".to_string())
        );
    }

    #[test]
    fn deep_subdomain_keeps_the_remainder_intact() {
        assert_eq!(
            resolve("play.games.example.com"),
            Ok("wss://play-api.games.example.com/".to_string())
        );
    }

    #[test]
    fn hostname_without_dot_is_malformed() {
        assert_eq!(
            resolve("gameserver"),
            Err(EndpointError::MalformedHostname("gameserver".to_string()))
        );
    }
}
