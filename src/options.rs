use std::str::FromStr;

use tracing::debug;

use crate::error::Error;
use crate::unit::UnitFile;

/// Separator between the section and key of a raw option, as in `Service:Environment=A=1`.
pub const DEFAULT_SEPARATOR: char = ':';

/// An extra `Section:Key=Value` setting layered on top of a generated unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOption {
    section: String,
    key: String,
    value: String,
}

impl UnitOption {
    /// Parses `raw` using `sep` between the section and the key.
    ///
    /// Everything after the first `=` is the value, so values may contain `=` themselves. A string
    /// with no `=` at all is accepted and yields an empty value. Line breaks are rejected since
    /// unit files have one setting per line.
    pub fn parse(raw: &str, sep: char) -> Result<Self, Error> {
        let (path, value) = raw.split_once('=').unwrap_or((raw, ""));

        let invalid = || Error::InvalidOptionFormat {
            option: raw.to_owned(),
        };

        if raw.contains(['\n', '\r']) {
            return Err(invalid());
        }

        let mut segments = path.split(sep).map(str::trim);
        let (Some(section), Some(key), None) = (segments.next(), segments.next(), segments.next())
        else {
            return Err(invalid());
        };

        if section.is_empty() || key.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            section: section.to_owned(),
            key: key.to_owned(),
            value: value.to_owned(),
        })
    }

    #[must_use]
    pub fn section(&self) -> &str {
        &self.section
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Appends the value to `Section.Key`, creating either one if needed.
    pub fn apply(&self, unit: &mut UnitFile) {
        unit.section_mut(&self.section)
            .append(&self.key, self.value.clone());
    }
}

impl FromStr for UnitOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, DEFAULT_SEPARATOR)
    }
}

/// Applies already-parsed options to `unit` in order.
pub fn apply_options(unit: &mut UnitFile, options: &[UnitOption]) {
    for option in options {
        debug!(
            section = option.section(),
            key = option.key(),
            value = option.value(),
            "merging option"
        );
        option.apply(unit);
    }
}

/// Parses every raw option with `sep`, then merges them all into `unit`.
///
/// Nothing is merged unless every option parses.
pub fn merge_options<S>(unit: &mut UnitFile, options: &[S], sep: char) -> Result<(), Error>
where
    S: AsRef<str>,
{
    let parsed = options
        .iter()
        .map(|raw| UnitOption::parse(raw.as_ref(), sep))
        .collect::<Result<Vec<_>, _>>()?;

    apply_options(unit, &parsed);
    Ok(())
}
