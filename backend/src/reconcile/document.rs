//! Parsing and validation of submitted interruption documents.
//!
//! A document is read as loose JSON first so that one malformed entry never
//! spoils its siblings: each top-level entry is validated on its own into a
//! strict [`InterruptionRecord`], and a failure names the entity kind and
//! field that were wrong.

use crate::error::ApiError;
use chrono::{NaiveDate, NaiveTime};
use common::model::document::{
    AffectedAreaRecord, InterruptionRecord, NoticeRecord, PersonnelRecord,
};
use common::model::import::EntityKind;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Bulletins write times as `0800H` / `1730H`.
static BULLETIN_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})(\d{2})\s*H$").expect("bulletin time pattern is valid")
});

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%m/%d/%Y"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M%p"];

/// Why a single entry was rejected before touching the database.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidEntry {
    pub entity: EntityKind,
    pub message: String,
}

impl InvalidEntry {
    fn new(entity: EntityKind, message: impl Into<String>) -> Self {
        Self {
            entity,
            message: message.into(),
        }
    }
}

impl From<InvalidEntry> for ApiError {
    fn from(invalid: InvalidEntry) -> Self {
        ApiError::Validation(invalid.message)
    }
}

/// Splits a parsed document into its top-level entries.
///
/// Accepts a bare array, an object with an `interruptions` array, or a
/// single interruption object.
pub fn document_entries(document: Value) -> Result<Vec<Value>, ApiError> {
    match document {
        Value::Array(entries) => Ok(entries),
        Value::Object(mut object) => match object.remove("interruptions") {
            Some(Value::Array(entries)) => Ok(entries),
            Some(_) => Err(ApiError::Validation(
                "'interruptions' must be an array".to_string(),
            )),
            None => Ok(vec![Value::Object(object)]),
        },
        other => Err(ApiError::Validation(format!(
            "document must be an array or an object, got {}",
            type_name(&other)
        ))),
    }
}

/// Natural key of a raw entry, read best effort for failure reports.
pub fn raw_key(entry: &Value) -> (Option<String>, Option<String>) {
    let text = |field: &str| {
        entry
            .get(field)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
    };
    (text("date"), text("area"))
}

pub fn validate_entry(entry: &Value) -> Result<InterruptionRecord, InvalidEntry> {
    let kind = EntityKind::Interruption;
    let object = as_object(entry, kind, "interruption entry")?;

    let date = parse_date(&required_text(object, kind, "date")?)
        .map_err(|message| InvalidEntry::new(kind, message))?;
    let area = required_text(object, kind, "area")?;
    let start_time = optional_text(object, kind, "start_time")?
        .map(|s| parse_time(&s))
        .transpose()
        .map_err(|message| InvalidEntry::new(kind, message))?;
    let end_time = optional_text(object, kind, "end_time")?
        .map(|s| parse_time(&s))
        .transpose()
        .map_err(|message| InvalidEntry::new(kind, message))?;

    let notices = optional_array(object, kind, &["notices"])?
        .iter()
        .enumerate()
        .map(|(i, notice)| {
            validate_notice(notice).map_err(|e| InvalidEntry {
                message: format!("notices[{}]: {}", i, e.message),
                ..e
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let (affected_customers, specific_activities) = named_lists(object, kind)?;
    let affected_areas = optional_array(object, kind, &["affected_areas"])?
        .iter()
        .enumerate()
        .map(|(i, item)| validate_area(item, i))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(InterruptionRecord {
        date,
        area,
        start_time,
        end_time,
        reason: optional_text(object, kind, "reason")?,
        affected_line: optional_text(object, kind, "affected_line")?,
        is_update: optional_bool(object, kind, "is_update")?.unwrap_or(false),
        affected_customers,
        specific_activities,
        affected_areas,
        notices,
    })
}

fn validate_notice(notice: &Value) -> Result<NoticeRecord, InvalidEntry> {
    let kind = EntityKind::Notice;
    let object = as_object(notice, kind, "notice")?;

    let date_issued = optional_text(object, kind, "date_issued")?
        .map(|s| parse_date(&s))
        .transpose()
        .map_err(|message| InvalidEntry::new(kind, message))?;

    let (affected_customers, specific_activities) = named_lists(object, kind)?;
    let personnel = optional_array(object, kind, &["personnel"])?
        .iter()
        .enumerate()
        .map(|(i, item)| validate_personnel(item, i))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NoticeRecord {
        area: required_text(object, kind, "area")?,
        control_no: optional_text(object, kind, "control_no")?,
        date_issued,
        body: optional_text(object, kind, "body")?,
        affected_customers,
        specific_activities,
        personnel,
    })
}

/// The customer and activity lists an interruption or a notice may carry.
fn named_lists(
    object: &Map<String, Value>,
    kind: EntityKind,
) -> Result<(Vec<String>, Vec<String>), InvalidEntry> {
    let customers = optional_array(object, kind, &["affected_customers", "customers"])?
        .iter()
        .enumerate()
        .map(|(i, item)| named_item(item, EntityKind::Customer, "affected_customers", i))
        .collect::<Result<Vec<_>, _>>()?;
    let activities = optional_array(object, kind, &["specific_activities", "activities"])?
        .iter()
        .enumerate()
        .map(|(i, item)| named_item(item, EntityKind::Activity, "specific_activities", i))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((customers, activities))
}

/// An area is a bare name or `{name, barangays}`.
fn validate_area(item: &Value, index: usize) -> Result<AffectedAreaRecord, InvalidEntry> {
    let kind = EntityKind::Area;
    let at = |e: InvalidEntry| InvalidEntry {
        message: format!("affected_areas[{}]: {}", index, e.message),
        ..e
    };
    if let Value::String(_) = item {
        let name = named_item(item, kind, "affected_areas", index)?;
        return Ok(AffectedAreaRecord {
            name,
            barangays: Vec::new(),
        });
    }
    let object = as_object(item, kind, "area").map_err(at)?;
    let name = required_text(object, kind, "name").map_err(at)?;
    let barangays = optional_array(object, kind, &["barangays"])
        .map_err(at)?
        .iter()
        .enumerate()
        .map(|(i, barangay)| named_item(barangay, EntityKind::Barangay, "barangays", i))
        .collect::<Result<Vec<_>, _>>()
        .map_err(at)?;
    Ok(AffectedAreaRecord { name, barangays })
}

fn validate_personnel(item: &Value, index: usize) -> Result<PersonnelRecord, InvalidEntry> {
    let kind = EntityKind::Personnel;
    let object = as_object(item, kind, "personnel")?;
    let at = |e: InvalidEntry| InvalidEntry {
        message: format!("personnel[{}]: {}", index, e.message),
        ..e
    };
    Ok(PersonnelRecord {
        name: required_text(object, kind, "name").map_err(at)?,
        position: required_text(object, kind, "position").map_err(at)?,
    })
}

/// Customers and activities are plain strings, or objects carrying the text
/// under `name` (or `description`).
fn named_item(
    item: &Value,
    kind: EntityKind,
    list: &str,
    index: usize,
) -> Result<String, InvalidEntry> {
    let text = match item {
        Value::String(s) => Some(s.as_str()),
        Value::Object(object) => object
            .get("name")
            .or_else(|| object.get("description"))
            .and_then(Value::as_str),
        _ => None,
    };
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t.to_string()),
        _ => Err(InvalidEntry::new(
            kind,
            format!("{}[{}]: expected a non-blank name", list, index),
        )),
    }
}

fn as_object<'a>(
    value: &'a Value,
    kind: EntityKind,
    what: &str,
) -> Result<&'a Map<String, Value>, InvalidEntry> {
    value.as_object().ok_or_else(|| {
        InvalidEntry::new(
            kind,
            format!("{} must be an object, got {}", what, type_name(value)),
        )
    })
}

fn required_text(
    object: &Map<String, Value>,
    kind: EntityKind,
    field: &str,
) -> Result<String, InvalidEntry> {
    optional_text(object, kind, field)?.ok_or_else(|| {
        InvalidEntry::new(kind, format!("missing required field '{}'", field))
    })
}

/// Trimmed text; absent, null and blank all read as `None`.
fn optional_text(
    object: &Map<String, Value>,
    kind: EntityKind,
    field: &str,
) -> Result<Option<String>, InvalidEntry> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(other) => Err(InvalidEntry::new(
            kind,
            format!("field '{}' must be a string, got {}", field, type_name(other)),
        )),
    }
}

fn optional_bool(
    object: &Map<String, Value>,
    kind: EntityKind,
    field: &str,
) -> Result<Option<bool>, InvalidEntry> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(InvalidEntry::new(
            kind,
            format!("field '{}' must be a boolean, got {}", field, type_name(other)),
        )),
    }
}

/// First present array among `fields` (aliases), or an empty slice.
fn optional_array<'a>(
    object: &'a Map<String, Value>,
    kind: EntityKind,
    fields: &[&str],
) -> Result<&'a [Value], InvalidEntry> {
    for field in fields {
        match object.get(*field) {
            None | Some(Value::Null) => continue,
            Some(Value::Array(items)) => return Ok(items),
            Some(other) => {
                return Err(InvalidEntry::new(
                    kind,
                    format!("field '{}' must be an array, got {}", field, type_name(other)),
                ))
            }
        }
    }
    Ok(&[])
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub fn parse_date(text: &str) -> Result<NaiveDate, String> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .ok_or_else(|| format!("unrecognised date '{}'", text))
}

pub fn parse_time(text: &str) -> Result<NaiveTime, String> {
    let cleaned = text.trim().to_uppercase();
    let cleaned = match BULLETIN_TIME.captures(&cleaned) {
        Some(caps) => format!("{}:{}", &caps[1], &caps[2]),
        None => cleaned,
    };
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(&cleaned, format).ok())
        .ok_or_else(|| format!("unrecognised time '{}'", text.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bulletin_and_clock_times_parse() {
        let eight = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        assert_eq!(parse_time("0800H").unwrap(), eight);
        assert_eq!(parse_time(" 0800h ").unwrap(), eight);
        assert_eq!(parse_time("08:00").unwrap(), eight);
        assert_eq!(parse_time("08:00:00").unwrap(), eight);
        assert_eq!(parse_time("8:00 AM").unwrap(), eight);
        assert_eq!(
            parse_time("1730H").unwrap(),
            NaiveTime::from_hms_opt(17, 30, 0).unwrap()
        );
        assert!(parse_time("2500H").is_err());
        assert!(parse_time("noon").is_err());
    }

    #[test]
    fn dates_accept_iso_and_long_form() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(parse_date("2024-01-01").unwrap(), d);
        assert_eq!(parse_date("January 1, 2024").unwrap(), d);
        assert!(parse_date("2024-13-01").is_err());
    }

    #[test]
    fn full_entry_validates() {
        let entry = json!({
            "date": "2024-01-01",
            "area": " Zone A ",
            "start_time": "0800H",
            "end_time": "17:00",
            "reason": "",
            "notices": [{
                "area": "Zone A",
                "control_no": "PIN-01",
                "customers": ["Juan Dela Cruz", {"name": "Acme Rice Mill"}],
                "activities": ["Pole replacement"],
                "personnel": [{"name": "Maria Santos", "position": "Area Engineer"}]
            }]
        });
        let record = validate_entry(&entry).unwrap();
        assert_eq!(record.area, "Zone A");
        assert_eq!(record.reason, None);
        assert!(!record.is_update);
        let notice = &record.notices[0];
        assert_eq!(
            notice.affected_customers,
            vec!["Juan Dela Cruz".to_string(), "Acme Rice Mill".to_string()]
        );
        assert_eq!(notice.specific_activities, vec!["Pole replacement".to_string()]);
        assert_eq!(notice.personnel[0].position, "Area Engineer");
    }

    #[test]
    fn interruption_level_lists_and_areas_validate() {
        let entry = json!({
            "date": "2024-01-01",
            "area": "Batangas",
            "affected_customers": [" Acme Rice Mill "],
            "activities": [{"description": "Line clearing"}],
            "affected_areas": [
                {"name": "Lipa City", "barangays": ["Sabang", {"name": "Marawoy"}]},
                "Tanauan"
            ]
        });
        let record = validate_entry(&entry).unwrap();
        assert_eq!(record.affected_customers, vec!["Acme Rice Mill".to_string()]);
        assert_eq!(record.specific_activities, vec!["Line clearing".to_string()]);
        assert_eq!(
            record.affected_areas,
            vec![
                AffectedAreaRecord {
                    name: "Lipa City".to_string(),
                    barangays: vec!["Sabang".to_string(), "Marawoy".to_string()],
                },
                AffectedAreaRecord {
                    name: "Tanauan".to_string(),
                    barangays: Vec::new(),
                },
            ]
        );
    }

    #[test]
    fn malformed_areas_are_reported() {
        let err = validate_entry(&json!({
            "date": "2024-01-01",
            "area": "Batangas",
            "affected_areas": [{"barangays": ["Sabang"]}]
        }))
        .unwrap_err();
        assert_eq!(err.entity, EntityKind::Area);
        assert_eq!(err.message, "affected_areas[0]: missing required field 'name'");

        let err = validate_entry(&json!({
            "date": "2024-01-01",
            "area": "Batangas",
            "affected_areas": [{"name": "Lipa City", "barangays": ["Sabang", 4]}]
        }))
        .unwrap_err();
        assert_eq!(err.entity, EntityKind::Barangay);
        assert_eq!(
            err.message,
            "affected_areas[0]: barangays[1]: expected a non-blank name"
        );

        let err = validate_entry(&json!({
            "date": "2024-01-01",
            "area": "Batangas",
            "affected_customers": "Acme Rice Mill"
        }))
        .unwrap_err();
        assert_eq!(err.entity, EntityKind::Interruption);
        assert!(err.message.contains("'affected_customers' must be an array"));
    }

    #[test]
    fn missing_notice_area_is_blamed_on_the_notice() {
        let entry = json!({
            "date": "2024-01-01",
            "area": "Zone A",
            "notices": [{"area": "Zone A"}, {"control_no": "PIN-02"}]
        });
        let err = validate_entry(&entry).unwrap_err();
        assert_eq!(err.entity, EntityKind::Notice);
        assert_eq!(err.message, "notices[1]: missing required field 'area'");
    }

    #[test]
    fn wrong_types_are_reported() {
        let err = validate_entry(&json!({"date": "2024-01-01", "area": 7})).unwrap_err();
        assert_eq!(err.entity, EntityKind::Interruption);
        assert!(err.message.contains("must be a string"));

        let err = validate_entry(&json!({
            "date": "2024-01-01",
            "area": "Zone A",
            "notices": [{"area": "Zone A", "customers": [""]}]
        }))
        .unwrap_err();
        assert_eq!(err.entity, EntityKind::Customer);

        let err = validate_entry(&json!("not an object")).unwrap_err();
        assert!(err.message.contains("got a string"));
    }

    #[test]
    fn documents_come_in_three_shapes() {
        assert_eq!(document_entries(json!([{}, {}])).unwrap().len(), 2);
        assert_eq!(
            document_entries(json!({"interruptions": [{}]})).unwrap().len(),
            1
        );
        assert_eq!(
            document_entries(json!({"date": "2024-01-01", "area": "Zone A"}))
                .unwrap()
                .len(),
            1
        );
        assert!(document_entries(json!(42)).is_err());
    }

    #[test]
    fn raw_key_reads_what_it_can() {
        assert_eq!(
            raw_key(&json!({"date": "2024-01-01", "area": 3})),
            (Some("2024-01-01".to_string()), None)
        );
    }
}
