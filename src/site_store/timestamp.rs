//! Serde adapter for `created` timestamps.
//!
//! Written as RFC 3339. Older state files hold naive ISO-8601 local times without an offset;
//! those are read as UTC.

use serde::{de, Deserialize, Deserializer, Serializer};
use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

const NAIVE_ISO: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]");
const LISTING: &[FormatItem<'_>] = format_description!("[year]-[month]-[day] [hour]:[minute]");

pub(super) fn serialize<S: Serializer>(ts: &OffsetDateTime, s: S) -> Result<S::Ok, S::Error> {
    let text = ts.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
    s.serialize_str(&text)
}

pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<OffsetDateTime, D::Error> {
    let text = String::deserialize(d)?;
    parse(&text).ok_or_else(|| de::Error::custom(format!("invalid timestamp \"{text}\"")))
}

fn parse(text: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(text, &Rfc3339).ok().or_else(|| {
        PrimitiveDateTime::parse(text, NAIVE_ISO)
            .ok()
            .map(PrimitiveDateTime::assume_utc)
    })
}

/// `YYYY-MM-DD HH:MM`, as shown by `vhostcrab list`.
#[must_use]
pub fn format_listing(ts: OffsetDateTime) -> String {
    // NB: the listing format has no fallible components.
    ts.format(LISTING).unwrap_or_default()
}
