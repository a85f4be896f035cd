//! Page rendering context.
//!
//! A read-only record injected into every page template: the site menu tree,
//! package metadata and the build timestamp. Constructed once per invocation
//! and passed by reference into the page task.

use serde::Serialize;

use crate::config::{BuildConfig, MenuItem};

/// Data available to page templates.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    /// Navigation menu tree, `{% for menu in menus %}`.
    pub menus: Vec<MenuItem>,

    /// Package metadata, `{{ pkg.name }}` / `{{ pkg.version }}`.
    pub pkg: PkgMeta,

    /// Build timestamp, `{{ date }}`.
    pub date: String,
}

/// Package metadata drawn from the `[site]` config section.
#[derive(Debug, Clone, Serialize)]
pub struct PkgMeta {
    pub name: String,
    pub version: String,
    pub url: Option<String>,
    pub description: Option<String>,
}

impl PageContext {
    /// Build the context for one invocation.
    pub fn from_config(config: &BuildConfig) -> Self {
        Self {
            menus: config.site.menus.clone(),
            pkg: PkgMeta {
                name: config.site.name.clone(),
                version: config.site.version.clone(),
                url: config.site.url.clone(),
                description: config.site.description.clone(),
            },
            date: build_date(),
        }
    }
}

/// Current UTC timestamp as `YYYY-MM-DD HH:MM:SS`.
fn build_date() -> String {
    use std::time::SystemTime;
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format_timestamp(secs)
}

/// Convert unix seconds to a civil UTC date-time string.
fn format_timestamp(secs: u64) -> String {
    let days = secs / 86_400;
    let rem = secs % 86_400;
    let (hours, minutes, seconds) = (rem / 3600, (rem / 60) % 60, rem % 60);

    // Civil-from-days (Gregorian calendar, valid for unix range)
    let z = days as i64 + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);

    format!("{year:04}-{month:02}-{day:02} {hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp_epoch() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00");
    }

    #[test]
    fn test_format_timestamp_known_date() {
        // 2021-03-01 12:30:45 UTC
        assert_eq!(format_timestamp(1_614_601_845), "2021-03-01 12:30:45");
    }

    #[test]
    fn test_context_from_config() {
        let config = crate::config::test_parse_config("[site]\nname = \"demo\"");
        let ctx = PageContext::from_config(&config);
        assert_eq!(ctx.pkg.name, "demo");
        assert!(ctx.date.starts_with("2"));
    }
}
