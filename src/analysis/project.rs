//! Repository identity: owner/repo parsing and SonarCloud project keys.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// A GitHub repository reference parsed from a clone/browse URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubRepo {
    pub owner: String,
    pub repo: String,
}

impl GitHubRepo {
    /// Accepts `https://github.com/o/r`, `https://github.com/o/r.git`,
    /// `git@github.com:o/r.git` and bare `o/r`.
    pub fn parse(url: &str) -> Option<Self> {
        let mut path = url.trim().trim_end_matches('/');
        if let Some(rest) = path.strip_prefix("git@github.com:") {
            path = rest;
        } else if let Some(idx) = path.find("github.com/") {
            path = &path[idx + "github.com/".len()..];
        }
        let path = path.strip_suffix(".git").unwrap_or(path);

        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        if parts.len() < 2 {
            return None;
        }
        let owner = parts[parts.len() - 2];
        let repo = parts[parts.len() - 1];
        if owner.contains(':') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// `{owner}_{repo}`, used in report file names.
    pub fn slug(&self) -> String {
        format!("{}_{}", self.owner, self.repo)
    }

    /// SonarCloud project key: `{organization}_{owner}_{repo}`.
    pub fn project_key(&self, organization: &str) -> String {
        format!(
            "{}_{}_{}",
            organization,
            sanitize_key_part(&self.owner),
            sanitize_key_part(&self.repo)
        )
    }
}

impl fmt::Display for GitHubRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

fn sanitize_key_part(part: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let re = UNSAFE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_\-.]").expect("static regex"));
    re.replace_all(part, "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_url_shapes() {
        let expected = GitHubRepo {
            owner: "acme".to_string(),
            repo: "weather-mcp".to_string(),
        };
        for url in [
            "https://github.com/acme/weather-mcp",
            "https://github.com/acme/weather-mcp.git",
            "https://github.com/acme/weather-mcp/",
            "git@github.com:acme/weather-mcp.git",
            "acme/weather-mcp",
        ] {
            assert_eq!(GitHubRepo::parse(url), Some(expected.clone()), "{url}");
        }
    }

    #[test]
    fn rejects_urls_without_owner() {
        assert_eq!(GitHubRepo::parse(""), None);
        assert_eq!(GitHubRepo::parse("weather"), None);
        assert_eq!(GitHubRepo::parse("https://github.com/acme"), None);
    }

    #[test]
    fn project_key_replaces_unsafe_characters() {
        let repo = GitHubRepo {
            owner: "ac me".to_string(),
            repo: "weather@mcp".to_string(),
        };
        assert_eq!(repo.project_key("org"), "org_ac_me_weather_mcp");
        assert_eq!(repo.slug(), "ac me_weather@mcp");
    }
}
