pub mod payload;
pub mod sections;

use crate::error::Result;
use crate::record::CountryRecord;

pub use sections::{extract_section, SectionList, YOUTUBE_LINKS};

/// Two-step reply parsing: raw model text → JSON value → record.
pub fn parse_country_reply(raw: &str) -> Result<CountryRecord> {
    let value = payload::parse_json_reply(raw)?;
    CountryRecord::from_value(value)
}
