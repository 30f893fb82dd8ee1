//! Process configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::alerts::FailurePolicy;
use crate::cli::CliArgs;

/// Configuration read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Sleep between checks
    pub interval: Duration,
    /// Interval exactly as given, substituted into search templates
    pub interval_text: String,
    pub es_host: String,
    pub es_port: u16,
    /// Template file rendered into the POST body
    pub search_template: Option<PathBuf>,
    pub from: String,
    pub to: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Optional limit on search requests and mail delivery
    pub timeout: Option<Duration>,
    pub failure_policy: FailurePolicy,
}

impl Config {
    /// Resolve CLI arguments, deriving mail defaults from this host
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let identity = if args.from.is_none() || args.to.is_none() {
            Some(LocalIdentity::detect()?)
        } else {
            None
        };
        Self::resolve(args, identity.as_ref())
    }

    /// Resolve CLI arguments against a known identity
    pub fn resolve(args: CliArgs, identity: Option<&LocalIdentity>) -> Result<Self, ConfigError> {
        let interval = parse_duration(&args.interval)?;
        if interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }

        let timeout = args.timeout.as_deref().map(parse_duration).transpose()?;

        let from = match args.from {
            Some(from) => from,
            None => identity
                .ok_or(ConfigError::HostnameUnavailable)?
                .default_sender(),
        };
        let to = match args.to {
            Some(to) => to,
            None => identity
                .ok_or(ConfigError::UserUnavailable)?
                .default_recipient(),
        };

        Ok(Self {
            interval,
            interval_text: args.interval,
            es_host: args.es_host,
            es_port: args.es_port,
            search_template: args.es_search,
            from,
            to,
            smtp_host: args.smtp_host,
            smtp_port: args.smtp_port,
            timeout,
            failure_policy: if args.keep_going {
                FailurePolicy::Continue
            } else {
                FailurePolicy::Exit
            },
        })
    }
}

/// Host and user the default mail addresses are derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalIdentity {
    pub hostname: String,
    pub username: String,
}

impl LocalIdentity {
    /// Look up the local hostname and the current user (`$USER`, then `$LOGNAME`)
    pub fn detect() -> Result<Self, ConfigError> {
        let hostname = gethostname::gethostname()
            .into_string()
            .ok()
            .filter(|h| !h.is_empty())
            .ok_or(ConfigError::HostnameUnavailable)?;

        let username = ["USER", "LOGNAME"]
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|u| !u.is_empty()))
            .ok_or(ConfigError::UserUnavailable)?;

        Ok(Self { hostname, username })
    }

    /// `healthy@<hostname>`
    pub fn default_sender(&self) -> String {
        format!("healthy@{}", self.hostname)
    }

    /// `<user>@<hostname>`
    pub fn default_recipient(&self) -> String {
        format!("{}@{}", self.username, self.hostname)
    }
}

/// Parse a duration such as `300ms`, `5m`, `1h30m` or `1.5h`
///
/// Accepted units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare
/// `0` is accepted; any other number needs a unit.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidDuration(s.to_string());

    let mut rest = s.trim();
    if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    } else if rest.starts_with('-') {
        return Err(invalid());
    }

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total_nanos: u128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        let unit_nanos: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3_600 * 1_000_000_000,
            _ => return Err(invalid()),
        };

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if fraction.contains('.') {
            return Err(invalid());
        }

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        total_nanos = whole
            .checked_mul(unit_nanos)
            .and_then(|n| total_nanos.checked_add(n))
            .ok_or_else(invalid)?;

        if !fraction.is_empty() {
            let digits: u128 = fraction.parse().map_err(|_| invalid())?;
            let scale = 10u128
                .checked_pow(fraction.len() as u32)
                .ok_or_else(invalid)?;
            total_nanos = digits
                .checked_mul(unit_nanos)
                .map(|n| n / scale)
                .and_then(|n| total_nanos.checked_add(n))
                .ok_or_else(invalid)?;
        }

        rest = tail;
    }

    let secs = u64::try_from(total_nanos / 1_000_000_000).map_err(|_| invalid())?;
    Ok(Duration::new(secs, (total_nanos % 1_000_000_000) as u32))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse duration: {0:?}")]
    InvalidDuration(String),

    #[error("interval must be greater than zero")]
    ZeroInterval,

    #[error("failed to get hostname")]
    HostnameUnavailable,

    #[error("failed to get user: neither USER nor LOGNAME is set")]
    UserUnavailable,
}
