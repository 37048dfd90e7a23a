//! Low-bandwidth message records.
//!
//! Four record kinds cross the process boundary: [`Status`] (one per
//! transmission cycle), [`DataSnippet`] (associated with a status at
//! export time), [`Config`] (inbound parameter collection, import-only),
//! and [`General`] (a single tagged parameter in either direction).
//!
//! Required fields are constructor arguments, so a record can never exist
//! without them. Optional fields are independently nullable and validated
//! at the point of setting; the two all-or-nothing groups (the heading
//! pair and the score triple) are rejected immediately when partially
//! supplied, since a partial group can never become valid later.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::{Error, Result};
use crate::param::{self, Identifier, TaggedParam, Value};

/// Reference frame for a heading angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum HeadingRef {
    /// Heading measured against true (geographic) north.
    TrueNorth,
    /// Heading measured against magnetic north.
    MagNorth,
}

/// Returns `v` if it lies within `lo..=hi`, otherwise an `OutOfRange`.
fn in_range(field: &'static str, v: f32, lo: f32, hi: f32) -> Result<f32> {
    if (lo..=hi).contains(&v) {
        Ok(v)
    } else {
        Err(Error::OutOfRange { field })
    }
}

/// One status record per transmission cycle.
///
/// The timestamp is required and fixed at construction; everything else
/// is optional and `None` until set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    navsat_fix_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    latitude_deg: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    longitude_deg: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    heading_ref: Option<HeadingRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    heading_deg: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    roll_angle_deg: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pitch_angle_deg: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temperature_c: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    power_state_pct: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    device_status: Option<Vec<u8>>,
}

/// Optional [`Status`] fields, applied in bulk via [`Status::set_fields`].
///
/// Every member defaults to `None`; supply only what you have. The
/// heading pair must be supplied together or not at all.
#[derive(Debug, Clone, Default)]
pub struct StatusFields {
    /// Time of the most recent navigation satellite fix (RFC3339).
    pub navsat_fix_time: Option<String>,
    /// Latitude in degrees, −90…90.
    pub latitude_deg: Option<f32>,
    /// Longitude in degrees, −180…180.
    pub longitude_deg: Option<f32>,
    /// Heading reference frame; requires `heading_deg`.
    pub heading_ref: Option<HeadingRef>,
    /// Heading in degrees, −360…360; requires `heading_ref`.
    pub heading_deg: Option<f32>,
    /// Roll angle in degrees, −360…360.
    pub roll_angle_deg: Option<f32>,
    /// Pitch angle in degrees, −360…360.
    pub pitch_angle_deg: Option<f32>,
    /// Device temperature in degrees Celsius.
    pub temperature_c: Option<f32>,
    /// Remaining power as a percentage, 0…100.
    pub power_state_pct: Option<f32>,
    /// Opaque device status bytes.
    pub device_status: Option<Vec<u8>>,
}

impl Status {
    /// Creates a status with its required RFC3339 timestamp.
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            navsat_fix_time: None,
            latitude_deg: None,
            longitude_deg: None,
            heading_ref: None,
            heading_deg: None,
            roll_angle_deg: None,
            pitch_angle_deg: None,
            temperature_c: None,
            power_state_pct: None,
            device_status: None,
        }
    }

    /// The required cycle timestamp.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Time of the most recent navsat fix, if set.
    pub fn navsat_fix_time(&self) -> Option<&str> {
        self.navsat_fix_time.as_deref()
    }

    /// Latitude in degrees, if set.
    pub const fn latitude_deg(&self) -> Option<f32> {
        self.latitude_deg
    }

    /// Longitude in degrees, if set.
    pub const fn longitude_deg(&self) -> Option<f32> {
        self.longitude_deg
    }

    /// The heading pair, if set. Both halves are always set together.
    pub fn heading(&self) -> Option<(HeadingRef, f32)> {
        self.heading_ref.zip(self.heading_deg)
    }

    /// Roll angle in degrees, if set.
    pub const fn roll_angle_deg(&self) -> Option<f32> {
        self.roll_angle_deg
    }

    /// Pitch angle in degrees, if set.
    pub const fn pitch_angle_deg(&self) -> Option<f32> {
        self.pitch_angle_deg
    }

    /// Temperature in degrees Celsius, if set.
    pub const fn temperature_c(&self) -> Option<f32> {
        self.temperature_c
    }

    /// Power state percentage, if set.
    pub const fn power_state_pct(&self) -> Option<f32> {
        self.power_state_pct
    }

    /// Opaque device status bytes, if set.
    pub fn device_status(&self) -> Option<&[u8]> {
        self.device_status.as_deref()
    }

    /// Sets the navsat fix time (RFC3339).
    pub fn set_navsat_fix_time(&mut self, timestamp: impl Into<String>) {
        self.navsat_fix_time = Some(timestamp.into());
    }

    /// Sets the latitude in degrees, −90…90.
    pub fn set_latitude(&mut self, deg: f32) -> Result<()> {
        self.latitude_deg = Some(in_range("latitude_deg", deg, -90.0, 90.0)?);
        Ok(())
    }

    /// Sets the longitude in degrees, −180…180.
    pub fn set_longitude(&mut self, deg: f32) -> Result<()> {
        self.longitude_deg = Some(in_range("longitude_deg", deg, -180.0, 180.0)?);
        Ok(())
    }

    /// Sets the heading pair. The reference frame and angle travel
    /// together; there is no way to set one without the other.
    pub fn set_heading(&mut self, heading_ref: HeadingRef, deg: f32) -> Result<()> {
        self.heading_deg = Some(in_range("heading_deg", deg, -360.0, 360.0)?);
        self.heading_ref = Some(heading_ref);
        Ok(())
    }

    /// Sets the roll angle in degrees, −360…360.
    pub fn set_roll_angle(&mut self, deg: f32) -> Result<()> {
        self.roll_angle_deg = Some(in_range("roll_angle_deg", deg, -360.0, 360.0)?);
        Ok(())
    }

    /// Sets the pitch angle in degrees, −360…360.
    pub fn set_pitch_angle(&mut self, deg: f32) -> Result<()> {
        self.pitch_angle_deg = Some(in_range("pitch_angle_deg", deg, -360.0, 360.0)?);
        Ok(())
    }

    /// Sets the device temperature in degrees Celsius.
    pub fn set_temperature(&mut self, celsius: f32) {
        self.temperature_c = Some(celsius);
    }

    /// Sets the power state percentage, 0…100.
    pub fn set_power_state(&mut self, pct: f32) -> Result<()> {
        self.power_state_pct = Some(in_range("power_state_pct", pct, 0.0, 100.0)?);
        Ok(())
    }

    /// Sets the opaque device status bytes.
    pub fn set_device_status(&mut self, entries: impl Into<Vec<u8>>) {
        self.device_status = Some(entries.into());
    }

    /// Applies a batch of optional fields.
    ///
    /// Fails immediately with `RequiredFieldMissing` when exactly one half
    /// of the heading pair is supplied; nothing is applied in that case.
    pub fn set_fields(&mut self, fields: StatusFields) -> Result<()> {
        match (fields.heading_ref, fields.heading_deg) {
            (Some(_), None) => {
                return Err(Error::RequiredFieldMissing {
                    field: "heading_deg",
                });
            }
            (None, Some(_)) => {
                return Err(Error::RequiredFieldMissing {
                    field: "heading_ref",
                });
            }
            _ => {}
        }
        if let Some(ts) = fields.navsat_fix_time {
            self.set_navsat_fix_time(ts);
        }
        if let Some(deg) = fields.latitude_deg {
            self.set_latitude(deg)?;
        }
        if let Some(deg) = fields.longitude_deg {
            self.set_longitude(deg)?;
        }
        if let (Some(href), Some(deg)) = (fields.heading_ref, fields.heading_deg) {
            self.set_heading(href, deg)?;
        }
        if let Some(deg) = fields.roll_angle_deg {
            self.set_roll_angle(deg)?;
        }
        if let Some(deg) = fields.pitch_angle_deg {
            self.set_pitch_angle(deg)?;
        }
        if let Some(celsius) = fields.temperature_c {
            self.set_temperature(celsius);
        }
        if let Some(pct) = fields.power_state_pct {
            self.set_power_state(pct)?;
        }
        if let Some(entries) = fields.device_status {
            self.set_device_status(entries);
        }
        Ok(())
    }

    /// Checks invariants that a decoded artifact could violate.
    ///
    /// In-memory records hold the heading pair together by construction;
    /// a hand-edited artifact might not.
    pub fn validate(&self) -> Result<()> {
        match (self.heading_ref, self.heading_deg) {
            (Some(_), None) => Err(Error::RequiredFieldMissing {
                field: "heading_deg",
            }),
            (None, Some(_)) => Err(Error::RequiredFieldMissing {
                field: "heading_ref",
            }),
            _ => Ok(()),
        }
    }
}

/// A 3-byte application-defined snippet classification code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnippetType([u8; 3]);

impl SnippetType {
    /// Wraps a classification code. Exactly three bytes, by type.
    pub const fn new(code: [u8; 3]) -> Self {
        Self(code)
    }

    /// The raw code bytes.
    pub const fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }
}

impl From<[u8; 3]> for SnippetType {
    fn from(code: [u8; 3]) -> Self {
        Self(code)
    }
}

impl std::fmt::Display for SnippetType {
    /// Renders the code for use in artifact names; non-printable bytes
    /// come out as `_`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in self.0 {
            let c = if b.is_ascii_graphic() { b as char } else { '_' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// A data snippet, exported only as part of a [`Status`] batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSnippet {
    #[serde(rename = "type")]
    stype: SnippetType,
    instance: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    latitude_deg: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    longitude_deg: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    heading_deg: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    roll_angle_deg: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pitch_angle_deg: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quality_score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    type_score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    event_score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_file: Option<PathBuf>,
    /// Export-time instruction, not artifact content.
    #[serde(skip)]
    delete_data_file: bool,
}

/// Optional [`DataSnippet`] fields, applied in bulk via
/// [`DataSnippet::set_fields`]. The score triple must be supplied
/// together or not at all.
#[derive(Debug, Clone, Default)]
pub struct SnippetFields {
    /// Acquisition time of the snippet data (RFC3339).
    pub data_timestamp: Option<String>,
    /// Latitude in degrees, −90…90.
    pub latitude_deg: Option<f32>,
    /// Longitude in degrees, −180…180.
    pub longitude_deg: Option<f32>,
    /// Heading in degrees, −360…360.
    pub heading_deg: Option<f32>,
    /// Roll angle in degrees, −360…360.
    pub roll_angle_deg: Option<f32>,
    /// Pitch angle in degrees, −360…360.
    pub pitch_angle_deg: Option<f32>,
    /// Detection quality score, 0…1; requires the other two scores.
    pub quality_score: Option<f32>,
    /// Classification score, 0…1; requires the other two scores.
    pub type_score: Option<f32>,
    /// Event significance score, 0…1; requires the other two scores.
    pub event_score: Option<f32>,
    /// Payload file to ship with the snippet.
    pub data_file: Option<PathBuf>,
    /// Delete the source payload file after a successful export.
    pub delete_data_file: bool,
}

impl DataSnippet {
    /// Creates a snippet with its required classification code and
    /// same-type disambiguator.
    pub fn new(stype: impl Into<SnippetType>, instance: u32) -> Self {
        Self {
            stype: stype.into(),
            instance,
            data_timestamp: None,
            latitude_deg: None,
            longitude_deg: None,
            heading_deg: None,
            roll_angle_deg: None,
            pitch_angle_deg: None,
            quality_score: None,
            type_score: None,
            event_score: None,
            data_file: None,
            delete_data_file: false,
        }
    }

    /// The classification code.
    pub const fn snippet_type(&self) -> SnippetType {
        self.stype
    }

    /// The same-type disambiguator.
    pub const fn instance(&self) -> u32 {
        self.instance
    }

    /// Acquisition timestamp, if set.
    pub fn data_timestamp(&self) -> Option<&str> {
        self.data_timestamp.as_deref()
    }

    /// Latitude in degrees, if set.
    pub const fn latitude_deg(&self) -> Option<f32> {
        self.latitude_deg
    }

    /// Longitude in degrees, if set.
    pub const fn longitude_deg(&self) -> Option<f32> {
        self.longitude_deg
    }

    /// Heading in degrees, if set.
    pub const fn heading_deg(&self) -> Option<f32> {
        self.heading_deg
    }

    /// Roll angle in degrees, if set.
    pub const fn roll_angle_deg(&self) -> Option<f32> {
        self.roll_angle_deg
    }

    /// Pitch angle in degrees, if set.
    pub const fn pitch_angle_deg(&self) -> Option<f32> {
        self.pitch_angle_deg
    }

    /// The `(quality, type, event)` score triple, if set. All three are
    /// always set together.
    pub fn scores(&self) -> Option<(f32, f32, f32)> {
        match (self.quality_score, self.type_score, self.event_score) {
            (Some(q), Some(t), Some(e)) => Some((q, t, e)),
            _ => None,
        }
    }

    /// The associated payload file, if set.
    pub fn data_file(&self) -> Option<&Path> {
        self.data_file.as_deref()
    }

    /// Whether the source payload file is deleted after export.
    pub const fn delete_data_file(&self) -> bool {
        self.delete_data_file
    }

    /// Sets the acquisition timestamp (RFC3339).
    pub fn set_data_timestamp(&mut self, timestamp: impl Into<String>) {
        self.data_timestamp = Some(timestamp.into());
    }

    /// Sets the latitude in degrees, −90…90.
    pub fn set_latitude(&mut self, deg: f32) -> Result<()> {
        self.latitude_deg = Some(in_range("latitude_deg", deg, -90.0, 90.0)?);
        Ok(())
    }

    /// Sets the longitude in degrees, −180…180.
    pub fn set_longitude(&mut self, deg: f32) -> Result<()> {
        self.longitude_deg = Some(in_range("longitude_deg", deg, -180.0, 180.0)?);
        Ok(())
    }

    /// Sets the heading in degrees, −360…360.
    pub fn set_heading(&mut self, deg: f32) -> Result<()> {
        self.heading_deg = Some(in_range("heading_deg", deg, -360.0, 360.0)?);
        Ok(())
    }

    /// Sets the roll angle in degrees, −360…360.
    pub fn set_roll_angle(&mut self, deg: f32) -> Result<()> {
        self.roll_angle_deg = Some(in_range("roll_angle_deg", deg, -360.0, 360.0)?);
        Ok(())
    }

    /// Sets the pitch angle in degrees, −360…360.
    pub fn set_pitch_angle(&mut self, deg: f32) -> Result<()> {
        self.pitch_angle_deg = Some(in_range("pitch_angle_deg", deg, -360.0, 360.0)?);
        Ok(())
    }

    /// Sets the score triple. All three travel together, each 0…1.
    pub fn set_scores(&mut self, quality: f32, stype: f32, event: f32) -> Result<()> {
        self.quality_score = Some(in_range("quality_score", quality, 0.0, 1.0)?);
        self.type_score = Some(in_range("type_score", stype, 0.0, 1.0)?);
        self.event_score = Some(in_range("event_score", event, 0.0, 1.0)?);
        Ok(())
    }

    /// Attaches a payload file, optionally deleting the source after a
    /// successful export.
    pub fn set_data_file(&mut self, path: impl Into<PathBuf>, delete_after_export: bool) {
        self.data_file = Some(path.into());
        self.delete_data_file = delete_after_export;
    }

    /// Applies a batch of optional fields.
    ///
    /// Fails immediately with `RequiredFieldMissing` when the score
    /// triple is partially supplied; nothing is applied in that case.
    pub fn set_fields(&mut self, fields: SnippetFields) -> Result<()> {
        let scores = [
            ("quality_score", fields.quality_score),
            ("type_score", fields.type_score),
            ("event_score", fields.event_score),
        ];
        if scores.iter().any(|(_, s)| s.is_some()) {
            if let Some(&(field, _)) = scores.iter().find(|(_, s)| s.is_none()) {
                return Err(Error::RequiredFieldMissing { field });
            }
        }
        if let Some(ts) = fields.data_timestamp {
            self.set_data_timestamp(ts);
        }
        if let Some(deg) = fields.latitude_deg {
            self.set_latitude(deg)?;
        }
        if let Some(deg) = fields.longitude_deg {
            self.set_longitude(deg)?;
        }
        if let Some(deg) = fields.heading_deg {
            self.set_heading(deg)?;
        }
        if let Some(deg) = fields.roll_angle_deg {
            self.set_roll_angle(deg)?;
        }
        if let Some(deg) = fields.pitch_angle_deg {
            self.set_pitch_angle(deg)?;
        }
        if let (Some(q), Some(t), Some(e)) =
            (fields.quality_score, fields.type_score, fields.event_score)
        {
            self.set_scores(q, t, e)?;
        }
        if let Some(path) = fields.data_file {
            self.set_data_file(path, fields.delete_data_file);
        }
        Ok(())
    }

    /// Checks invariants that a decoded artifact could violate.
    pub fn validate(&self) -> Result<()> {
        let scores = [
            ("quality_score", self.quality_score),
            ("type_score", self.type_score),
            ("event_score", self.event_score),
        ];
        if scores.iter().any(|(_, s)| s.is_some()) {
            if let Some(&(field, _)) = scores.iter().find(|(_, s)| s.is_none()) {
                return Err(Error::RequiredFieldMissing { field });
            }
        }
        Ok(())
    }
}

/// An inbound configuration record: an ordered collection of tagged
/// parameters.
///
/// Duplicate identifiers are retained and addressed by ordinal index;
/// no last-wins collapsing happens here. There is no setter and no
/// export surface — configs only ever travel server → device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    params: Vec<TaggedParam>,
}

impl Config {
    /// Number of parameters in the collection.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// The parameter at `index`, in import order.
    pub fn param(&self, index: usize) -> Option<&TaggedParam> {
        self.params.get(index)
    }

    /// Iterates parameters in import order.
    pub fn params(&self) -> impl Iterator<Item = &TaggedParam> {
        self.params.iter()
    }

    /// Decodes a config record from its JSON document.
    ///
    /// A document without a `params` array is an empty config, which is
    /// valid; a malformed entry fails the whole decode.
    pub fn from_json(raw: &Json) -> Result<Self> {
        let entries = match raw.get("params") {
            None => return Ok(Self::default()),
            Some(entries) => entries.as_array().ok_or(Error::MalformedRecord("config"))?,
        };
        let params = entries
            .iter()
            .map(param::decode)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { params })
    }
}

/// An outbound or inbound general-purpose message carrying exactly one
/// tagged parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct General {
    payload: Option<TaggedParam>,
}

impl General {
    /// Creates an empty general message.
    pub fn new() -> Self {
        Self::default()
    }

    /// The payload, if one has been set or imported.
    pub const fn payload(&self) -> Option<&TaggedParam> {
        self.payload.as_ref()
    }

    /// Sets the single payload. A second call overwrites the first; a
    /// general message never carries more than one parameter.
    pub fn set_payload(&mut self, id: impl Into<Identifier>, value: impl Into<Value>) {
        self.payload = Some(TaggedParam::new(id, value));
    }

    /// Encodes the message for export. Fails when no payload was set.
    pub fn to_json(&self) -> Result<Json> {
        self.payload
            .as_ref()
            .map(param::encode)
            .ok_or(Error::RequiredFieldMissing { field: "payload" })
    }

    /// Decodes a general message from its JSON document.
    pub fn from_json(raw: &Json) -> Result<Self> {
        Ok(Self {
            payload: Some(param::decode(raw)?),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn heading_pair_is_all_or_nothing() {
        let mut status = Status::new("2020-09-03T17:14:25.2-04:00");
        let err = status
            .set_fields(StatusFields {
                heading_ref: Some(HeadingRef::MagNorth),
                ..StatusFields::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            Error::RequiredFieldMissing {
                field: "heading_deg"
            }
        ));
        // Nothing was applied.
        assert_eq!(status.heading(), None);

        status
            .set_fields(StatusFields {
                heading_ref: Some(HeadingRef::MagNorth),
                heading_deg: Some(45.0),
                ..StatusFields::default()
            })
            .unwrap();
        assert_eq!(status.heading(), Some((HeadingRef::MagNorth, 45.0)));
    }

    #[test]
    fn unset_heading_pair_is_valid() {
        let status = Status::new("2020-09-03T17:14:25.2-04:00");
        status.validate().unwrap();
    }

    #[test]
    fn status_rejects_out_of_range_values() {
        let mut status = Status::new("t");
        assert!(matches!(
            status.set_latitude(91.0),
            Err(Error::OutOfRange {
                field: "latitude_deg"
            })
        ));
        assert!(matches!(
            status.set_power_state(101.0),
            Err(Error::OutOfRange {
                field: "power_state_pct"
            })
        ));
        status.set_latitude(-90.0).unwrap();
        status.set_longitude(180.0).unwrap();
    }

    #[test]
    fn status_serde_keeps_unset_fields_null() {
        let mut status = Status::new("2020-09-03T17:14:25.2-04:00");
        status.set_latitude(47.6062).unwrap();
        let json = serde_json::to_string(&status).unwrap();
        // Unset optional fields are absent, not null placeholders.
        assert!(!json.contains("roll_angle_deg"));
        let back: Status = serde_json::from_str(&json).unwrap();
        assert_eq!(back, status);
        assert_eq!(back.longitude_deg(), None);
    }

    #[test]
    fn score_triple_is_all_or_nothing() {
        let mut snippet = DataSnippet::new(*b"cls", 0);
        let err = snippet
            .set_fields(SnippetFields {
                quality_score: Some(0.3),
                type_score: Some(0.9),
                ..SnippetFields::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            Error::RequiredFieldMissing {
                field: "event_score"
            }
        ));
        assert_eq!(snippet.scores(), None);

        snippet.set_scores(0.33, 1.0, 0.5).unwrap();
        assert_eq!(snippet.scores(), Some((0.33, 1.0, 0.5)));
        snippet.validate().unwrap();
    }

    #[test]
    fn scores_outside_unit_interval_are_rejected() {
        let mut snippet = DataSnippet::new(*b"img", 3);
        assert!(matches!(
            snippet.set_scores(0.5, 1.2, 0.5),
            Err(Error::OutOfRange {
                field: "type_score"
            })
        ));
    }

    #[test]
    fn snippet_type_renders_for_filenames() {
        assert_eq!(SnippetType::new(*b"cls").to_string(), "cls");
        assert_eq!(SnippetType::new([0x00, b'a', 0x7F]).to_string(), "_a_");
    }

    #[test]
    fn general_payload_overwrites_not_appends() {
        let mut general = General::new();
        general.set_payload("a", 1i64);
        general.set_payload("a", "x");
        let encoded = general.to_json().unwrap();
        let back = General::from_json(&encoded).unwrap();
        let payload = back.payload().unwrap();
        assert_eq!(payload.id, Identifier::Str("a".to_owned()));
        assert_eq!(payload.value, Value::Str("x".to_owned()));
    }

    #[test]
    fn empty_general_refuses_export() {
        let general = General::new();
        assert!(matches!(
            general.to_json(),
            Err(Error::RequiredFieldMissing { field: "payload" })
        ));
    }

    #[test]
    fn config_keeps_duplicates_in_order() {
        let raw = serde_json::json!({
            "params": [
                {"identifier": {"string": "gain"}, "value": {"int64": 1}},
                {"identifier": {"string": "gain"}, "value": {"int64": 2}},
                {"identifier": {"number": 9}, "value": {"bool": false}},
            ]
        });
        let config = Config::from_json(&raw).unwrap();
        assert_eq!(config.param_count(), 3);
        assert_eq!(config.param(0).unwrap().value, Value::Int64(1));
        assert_eq!(config.param(1).unwrap().value, Value::Int64(2));
        assert_eq!(config.param(2).unwrap().id, Identifier::Num(9));
        assert!(config.param(3).is_none());
    }

    #[test]
    fn config_without_params_is_empty_not_an_error() {
        let config = Config::from_json(&serde_json::json!({})).unwrap();
        assert_eq!(config.param_count(), 0);
    }

    #[test]
    fn config_with_corrupt_entry_fails_whole_decode() {
        let raw = serde_json::json!({
            "params": [
                {"identifier": {"string": "ok"}, "value": {"bool": true}},
                {"identifier": {"string": "bad"}, "value": {"blob": 1}},
            ]
        });
        assert!(matches!(
            Config::from_json(&raw),
            Err(Error::UnknownType { .. })
        ));
    }
}
