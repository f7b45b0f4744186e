use std::path::{Path, PathBuf};

use crate::client::{ClientConfig, DEFAULT_TIMEOUT};
use crate::error::MonsoonError;
use crate::util::{DEFAULT_API_URL, strip_quotes};

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct RcConfig {
    pub(crate) url: Option<String>,
    pub(crate) username: Option<String>,
    pub(crate) key: Option<String>,
    pub(crate) verify: Option<bool>,
}

/// Values that could be resolved without asking the user.
#[derive(Debug, Clone)]
pub struct PartialConfig {
    pub url: String,
    pub username: Option<String>,
    pub key: Option<String>,
    pub verify: bool,
}

impl PartialConfig {
    /// Completes the configuration, failing on whichever credential is still missing.
    pub fn complete(self) -> Result<ClientConfig, MonsoonError> {
        let username = self.username.ok_or_else(|| missing("username", "MONSOON_USERNAME"))?;
        let key = self.key.ok_or_else(|| missing("key", "MONSOON_KEY"))?;
        Ok(ClientConfig {
            url: self.url,
            username,
            key,
            verify: self.verify,
            timeout: DEFAULT_TIMEOUT,
        })
    }
}

fn missing(field: &str, env: &str) -> MonsoonError {
    let candidates = rc_candidates();
    if candidates.is_empty() {
        return MonsoonError::MissingConfig(format!(
            "{} (set {} or create .monsoonrc)",
            field, env
        ));
    }
    MonsoonError::MissingConfig(format!(
        "{} (set {} or put `{}:` in one of: {})",
        field,
        env,
        field,
        candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    ))
}

/// Resolves settings from, in order of precedence: explicit arguments,
/// `MONSOON_URL` / `MONSOON_USERNAME` / `MONSOON_KEY`, then the first rc
/// file found (see [`rc_candidates`]).
pub fn resolve_config(
    url: Option<String>,
    username: Option<String>,
    key: Option<String>,
    verify: Option<bool>,
) -> Result<PartialConfig, MonsoonError> {
    let mut url = url.or_else(|| std::env::var("MONSOON_URL").ok());
    let mut username = username.or_else(|| std::env::var("MONSOON_USERNAME").ok());
    let mut key = key.or_else(|| std::env::var("MONSOON_KEY").ok());
    let mut file_verify: Option<bool> = None;

    if url.is_none() || username.is_none() || key.is_none() || verify.is_none() {
        for rc_path in rc_candidates() {
            if rc_path.exists() {
                tracing::debug!(path = %rc_path.display(), "reading configuration file");
                let cfg = read_rc(&rc_path).map_err(|e| MonsoonError::ConfigFile(rc_path, e))?;

                url = url.or(cfg.url);
                username = username.or(cfg.username);
                key = key.or(cfg.key);
                file_verify = cfg.verify;
                break;
            }
        }
    }

    Ok(PartialConfig {
        url: url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        username,
        key,
        verify: verify.or(file_verify).unwrap_or(true),
    })
}

/// Like [`resolve_config`], but requires both credentials to be present.
pub fn load_config(
    url: Option<String>,
    username: Option<String>,
    key: Option<String>,
    verify: Option<bool>,
) -> Result<ClientConfig, MonsoonError> {
    resolve_config(url, username, key, verify)?.complete()
}

fn read_rc(path: &Path) -> std::io::Result<RcConfig> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_rc(&text))
}

pub(crate) fn parse_rc(text: &str) -> RcConfig {
    let mut cfg = RcConfig::default();

    // `key:` may be on one line with the value on the next.
    let mut pending: Option<&str> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(field) = pending.take() {
            if !line.contains(':') {
                set_field(&mut cfg, field, strip_quotes(line));
                continue;
            }
        }

        if let Some((k, v)) = line.split_once(':') {
            let k = k.trim();
            let v = strip_quotes(v.trim());
            match k {
                "url" | "username" | "key" => {
                    if v.is_empty() {
                        pending = Some(k);
                    } else {
                        set_field(&mut cfg, k, v);
                    }
                }
                "verify" => {
                    if !v.is_empty() {
                        cfg.verify = Some(v != "0");
                    }
                }
                _ => {}
            }
        }
    }

    cfg
}

fn set_field(cfg: &mut RcConfig, field: &str, value: &str) {
    let value = Some(value.to_string());
    match field {
        "url" => cfg.url = value,
        "username" => cfg.username = value,
        "key" => cfg.key = value,
        _ => {}
    }
}

/// Search order: `MONSOON_RC` if set, then `./.monsoonrc`, then `~/.monsoonrc`.
fn rc_candidates() -> Vec<PathBuf> {
    if let Ok(p) = std::env::var("MONSOON_RC") {
        return vec![PathBuf::from(p)];
    }

    let mut v = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        v.push(cwd.join(".monsoonrc"));
    }
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".monsoonrc"));
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn parses_all_fields() {
        let cfg = parse_rc(
            "# monsoon credentials\nurl: https://example.test\nusername: alice\nkey: 's3cret'\nverify: 0\n",
        );
        assert_eq!(
            cfg,
            RcConfig {
                url: Some("https://example.test".into()),
                username: Some("alice".into()),
                key: Some("s3cret".into()),
                verify: Some(false),
            }
        );
    }

    #[test]
    fn value_may_follow_on_next_line() {
        let cfg = parse_rc("key:\n  \"abc-def\"\nusername: bob\n");
        assert_eq!(cfg.key.as_deref(), Some("abc-def"));
        assert_eq!(cfg.username.as_deref(), Some("bob"));
    }

    #[test]
    fn pending_field_is_dropped_when_next_line_is_a_field() {
        let cfg = parse_rc("key:\nusername: bob\n");
        assert_eq!(cfg.key, None);
        assert_eq!(cfg.username.as_deref(), Some("bob"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let cfg = parse_rc("colour: blue\nverify: 1\n");
        assert_eq!(cfg.verify, Some(true));
        assert_eq!(cfg.url, None);
    }

    #[test]
    fn read_rc_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "username: carol\nkey: k").unwrap();
        let cfg = read_rc(file.path()).unwrap();
        assert_eq!(cfg.username.as_deref(), Some("carol"));
        assert_eq!(cfg.key.as_deref(), Some("k"));
    }

    #[test]
    fn explicit_values_skip_lookup() {
        let cfg = load_config(
            Some("http://localhost:1".into()),
            Some("alice".into()),
            Some("key".into()),
            Some(false),
        )
        .unwrap();
        assert_eq!(cfg.url, "http://localhost:1");
        assert_eq!(cfg.username, "alice");
        assert!(!cfg.verify);
        assert_eq!(cfg.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn incomplete_config_reports_missing_field() {
        let partial = PartialConfig {
            url: DEFAULT_API_URL.into(),
            username: Some("alice".into()),
            key: None,
            verify: true,
        };
        let err = partial.complete().unwrap_err();
        assert!(matches!(err, MonsoonError::MissingConfig(ref m) if m.starts_with("key")));
    }
}
