use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::time::Duration;

pub const DEFAULT_CREATE_URL: &str = "https://muse.hackclub.dev/";
pub const DEFAULT_FORM_FIELD: &str = "entry.XXXXXX";

const FORM_URL_VAR: &str = "VINYLCODE_FORM_URL";
const FORM_FIELD_VAR: &str = "VINYLCODE_FORM_FIELD";
const CREATE_URL_VAR: &str = "VINYLCODE_CREATE_URL";
const TIMEOUT_VAR: &str = "VINYLCODE_SUBMIT_TIMEOUT_SECS";

/// Command-line flags. Anything left unset falls back to the environment.
#[derive(Debug, Default, Parser)]
#[command(name = "vinylcode", version, about = "Paste Muse song code and submit it to a form")]
pub struct Args {
    /// Read commands from stdin instead of opening a window
    #[arg(long)]
    pub console: bool,

    /// Form endpoint receiving submissions
    #[arg(long)]
    pub form_url: Option<String>,

    /// Form field name holding the song code
    #[arg(long)]
    pub form_field: Option<String>,

    /// Page opened by the `create` command
    #[arg(long)]
    pub create_url: Option<String>,

    /// Give up on a submission after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub form_url: Option<String>,
    pub form_field: String,
    pub create_url: String,
    pub submit_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            form_url: None,
            form_field: DEFAULT_FORM_FIELD.to_string(),
            create_url: DEFAULT_CREATE_URL.to_string(),
            submit_timeout: None,
        }
    }
}

impl Config {
    /// Loads `.env` (if any), then reads the process environment.
    pub fn load(args: &Args) -> Result<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(err).context("failed to read .env file");
            }
        }
        Self::resolve(args, |key| env::var(key).ok())
    }

    /// Flags win over variables, variables over defaults. Blank values count as unset.
    pub fn resolve(args: &Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let timeout_secs = match args.timeout_secs {
            Some(secs) => Some(secs),
            None => var(TIMEOUT_VAR)
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .with_context(|| format!("{TIMEOUT_VAR} must be a whole number of seconds, got {raw:?}"))
                })
                .transpose()?,
        };

        Ok(Self {
            form_url: args.form_url.clone().or_else(|| var(FORM_URL_VAR)),
            form_field: args
                .form_field
                .clone()
                .or_else(|| var(FORM_FIELD_VAR))
                .unwrap_or(defaults.form_field),
            create_url: args
                .create_url
                .clone()
                .or_else(|| var(CREATE_URL_VAR))
                .unwrap_or(defaults.create_url),
            submit_timeout: timeout_secs.filter(|secs| *secs > 0).map(Duration::from_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::resolve(&Args::default(), lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.create_url, "https://muse.hackclub.dev/");
        assert_eq!(config.form_field, "entry.XXXXXX");
        assert!(config.form_url.is_none());
        assert!(config.submit_timeout.is_none());
    }

    #[test]
    fn environment_fills_in_values() {
        let env = lookup(&[
            (FORM_URL_VAR, "https://docs.google.com/forms/d/e/abc/formResponse"),
            (FORM_FIELD_VAR, "entry.42"),
            (TIMEOUT_VAR, " 15 "),
        ]);
        let config = Config::resolve(&Args::default(), env).unwrap();
        assert_eq!(
            config.form_url.as_deref(),
            Some("https://docs.google.com/forms/d/e/abc/formResponse")
        );
        assert_eq!(config.form_field, "entry.42");
        assert_eq!(config.submit_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn flags_override_environment() {
        let args = Args {
            form_url: Some("http://localhost:9000/form".to_string()),
            timeout_secs: Some(0),
            ..Args::default()
        };
        let env = lookup(&[(FORM_URL_VAR, "https://example.com"), (TIMEOUT_VAR, "30")]);
        let config = Config::resolve(&args, env).unwrap();
        assert_eq!(config.form_url.as_deref(), Some("http://localhost:9000/form"));
        assert_eq!(config.submit_timeout, None);
    }

    #[test]
    fn blank_variables_are_ignored() {
        let env = lookup(&[(FORM_URL_VAR, "  "), (FORM_FIELD_VAR, "")]);
        let config = Config::resolve(&Args::default(), env).unwrap();
        assert!(config.form_url.is_none());
        assert_eq!(config.form_field, DEFAULT_FORM_FIELD);
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let env = lookup(&[(TIMEOUT_VAR, "soon")]);
        let err = Config::resolve(&Args::default(), env).unwrap_err();
        assert!(err.to_string().contains(TIMEOUT_VAR));
    }

    #[test]
    fn parses_flags() {
        let args = Args::parse_from(["vinylcode", "--console", "--form-field", "entry.7"]);
        assert!(args.console);
        assert_eq!(args.form_field.as_deref(), Some("entry.7"));
    }
}
