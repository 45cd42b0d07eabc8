//! Key sanitization and log-safe masking
//!
//! `sanitize_key` turns logical store keys into file names. The remaining
//! helpers keep credentials out of log lines.

/// Sanitizer for store keys and sensitive values
pub struct Sanitizer;

impl Sanitizer {
    /// Maps a logical store key to a filesystem-safe file stem
    ///
    /// Every character outside `[A-Za-z0-9_-]` becomes `_`. The mapping is
    /// not injective: distinct keys can alias to the same stem.
    ///
    /// # Examples
    ///
    /// ```
    /// use forgevault_lib::security::Sanitizer;
    ///
    /// assert_eq!(Sanitizer::sanitize_key("github_global"), "github_global");
    /// assert_eq!(Sanitizer::sanitize_key("proj:a"), "proj_a");
    /// assert_eq!(Sanitizer::sanitize_key("proj a"), "proj_a");
    /// assert_eq!(Sanitizer::sanitize_key("../etc/passwd"), "___etc_passwd");
    /// ```
    pub fn sanitize_key(key: &str) -> String {
        key.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Sanitizes a token for safe logging
    ///
    /// Shows only the last 4 characters preceded by "***".
    ///
    /// # Examples
    ///
    /// ```
    /// use forgevault_lib::security::Sanitizer;
    ///
    /// assert_eq!(Sanitizer::sanitize_token("ghp_abcdefghijklmnop"), "***mnop");
    /// assert_eq!(Sanitizer::sanitize_token("abc"), "****");
    /// ```
    pub fn sanitize_token(token: &str) -> String {
        let chars: Vec<char> = token.chars().collect();
        if chars.len() > 4 {
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("***{}", tail)
        } else {
            "****".to_string()
        }
    }

    /// Removes userinfo, query parameters and fragments from a URL
    ///
    /// # Examples
    ///
    /// ```
    /// use forgevault_lib::security::Sanitizer;
    ///
    /// assert_eq!(
    ///     Sanitizer::sanitize_url("https://user:pw@gitlab.example.com/api?private_token=x"),
    ///     "https://gitlab.example.com/api"
    /// );
    /// ```
    pub fn sanitize_url(url: &str) -> String {
        let without_query = url
            .split('?')
            .next()
            .unwrap_or(url)
            .split('#')
            .next()
            .unwrap_or(url);

        match without_query.split_once("://") {
            Some((scheme, rest)) => {
                let (authority, path) = match rest.find('/') {
                    Some(idx) => rest.split_at(idx),
                    None => (rest, ""),
                };
                let host = authority.rsplit('@').next().unwrap_or(authority);
                format!("{}://{}{}", scheme, host, path)
            }
            None => without_query.to_string(),
        }
    }
}
