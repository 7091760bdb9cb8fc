use crate::utils::error::{PlannerError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

/// 缺少計算方式時顯示的文字
pub const MISSING_UNIT_TYPE: &str = "<missing>";

pub const UNTITLED_ACTIVITY: &str = "Untitled activity";

/// 器材數量的計算方式
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnitType {
    PerClass,
    PerPupil,
    PerGroup,
    /// 無法辨識的原始文字，保留下來以便回報
    Unrecognized(String),
}

impl UnitType {
    /// 寬鬆解析：忽略大小寫、前後空白，底線與空白視為同一個分隔符。
    /// 無法辨識時回傳 `Unrecognized`，不會失敗。
    pub fn parse(raw: &str) -> Self {
        match normalize_unit_text(raw).as_str() {
            "per class" => UnitType::PerClass,
            "per pupil" => UnitType::PerPupil,
            "per group" => UnitType::PerGroup,
            "" => UnitType::Unrecognized(MISSING_UNIT_TYPE.to_string()),
            _ => UnitType::Unrecognized(raw.to_string()),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, UnitType::Unrecognized(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            UnitType::PerClass => "per_class",
            UnitType::PerPupil => "per_pupil",
            UnitType::PerGroup => "per_group",
            UnitType::Unrecognized(raw) => raw,
        }
    }
}

fn normalize_unit_text(raw: &str) -> String {
    raw.split(|c: char| c.is_whitespace() || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

impl FromStr for UnitType {
    type Err = PlannerError;

    /// 嚴格解析，無法辨識時回傳錯誤
    fn from_str(s: &str) -> Result<Self> {
        match UnitType::parse(s) {
            UnitType::Unrecognized(value) => Err(PlannerError::UnknownUnitType { value }),
            unit => Ok(unit),
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for UnitType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UnitType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = lenient_text(serde_json::Value::deserialize(deserializer)?);
        Ok(UnitType::parse(raw.as_deref().unwrap_or_default()))
    }
}

/// 活動所需的一項器材規則
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRequirement {
    #[serde(default = "missing_unit_type")]
    pub unit_type: UnitType,
    #[serde(default = "default_ratio", deserialize_with = "deserialize_ratio")]
    pub ratio: f64,
    #[serde(
        rename = "min_quantity",
        default,
        deserialize_with = "deserialize_min_quantity"
    )]
    pub minimum_quantity: u32,
}

impl EquipmentRequirement {
    pub fn new(unit_type: UnitType, ratio: f64, minimum_quantity: u32) -> Self {
        Self {
            unit_type,
            ratio,
            minimum_quantity,
        }
    }
}

fn default_ratio() -> f64 {
    1.0
}

fn missing_unit_type() -> UnitType {
    UnitType::Unrecognized(MISSING_UNIT_TYPE.to_string())
}

fn untitled_activity() -> String {
    UNTITLED_ACTIVITY.to_string()
}

// 資料庫各列的型別不一定一致：單一欄位格式錯誤只退回預設值，不讓整批資料解析失敗

fn lenient_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Number(number) => Some(number.to_string()),
        serde_json::Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn lenient_number(value: serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|number| number.is_finite())
}

fn deserialize_ratio<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    Ok(lenient_number(serde_json::Value::deserialize(deserializer)?).unwrap_or_else(default_ratio))
}

fn deserialize_min_quantity<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<u32, D::Error> {
    // 資料庫欄位可能是 numeric，容許 2.0 這類值
    let value = lenient_number(serde_json::Value::deserialize(deserializer)?).unwrap_or(0.0);
    Ok(value.max(0.0).ceil() as u32)
}

fn deserialize_optional_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(lenient_text(serde_json::Value::deserialize(deserializer)?))
}

fn deserialize_optional_price<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<f64>, D::Error> {
    Ok(lenient_number(serde_json::Value::deserialize(deserializer)?).filter(|price| *price >= 0.0))
}

fn deserialize_title<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(lenient_text(serde_json::Value::deserialize(deserializer)?)
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(untitled_activity))
}

/// 年齡取整數，負數或無法解析時視為未填
fn deserialize_age<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<u32>, D::Error> {
    Ok(lenient_number(serde_json::Value::deserialize(deserializer)?)
        .filter(|age| *age >= 0.0)
        .map(|age| age.round() as u32))
}

fn deserialize_null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// 一堂課的人數與分組設定。建構時驗證，之後不可變。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionParameters {
    pupil_count: NonZeroU32,
    group_size: NonZeroU32,
}

impl SessionParameters {
    pub fn new(pupil_count: u32, group_size: u32) -> Result<Self> {
        let pupil_count = NonZeroU32::new(pupil_count).ok_or_else(|| PlannerError::InvalidSession {
            message: "pupil count must be at least 1".to_string(),
        })?;
        let group_size = NonZeroU32::new(group_size).ok_or_else(|| PlannerError::InvalidSession {
            message: "group size must be at least 1".to_string(),
        })?;

        Ok(Self {
            pupil_count,
            group_size,
        })
    }

    pub fn pupil_count(&self) -> u32 {
        self.pupil_count.get()
    }

    pub fn group_size(&self) -> u32 {
        self.group_size.get()
    }

    /// 組數，不足一組也算一組
    pub fn group_count(&self) -> u32 {
        self.pupil_count.get().div_ceil(self.group_size.get())
    }
}

/// 學科篩選條件
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Discipline {
    #[default]
    All,
    Named(String),
}

impl Discipline {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Discipline::All
        } else {
            Discipline::Named(trimmed.to_string())
        }
    }

    pub fn as_filter(&self) -> Option<&str> {
        match self {
            Discipline::All => None,
            Discipline::Named(name) => Some(name),
        }
    }

    pub fn matches(&self, discipline: Option<&str>) -> bool {
        match self {
            Discipline::All => true,
            Discipline::Named(name) => discipline
                .map(|d| d.trim().eq_ignore_ascii_case(name))
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discipline::All => f.write_str("All"),
            Discipline::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityId {
    Int(i64),
    Text(String),
}

impl ActivityId {
    pub fn matches(&self, raw: &str) -> bool {
        self.to_string() == raw.trim()
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityId::Int(id) => write!(f, "{}", id),
            ActivityId::Text(id) => f.write_str(id),
        }
    }
}

/// 器材主檔中的一筆
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItem {
    #[serde(rename = "item_title", default, deserialize_with = "deserialize_optional_text")]
    pub title: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "deserialize_optional_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_price")]
    pub unit_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentLine {
    #[serde(flatten)]
    pub requirement: EquipmentRequirement,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub notes: Option<String>,
    #[serde(rename = "equipment master list", default)]
    pub item: Option<EquipmentItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "activity_id")]
    pub id: ActivityId,
    #[serde(
        rename = "activity_title",
        default = "untitled_activity",
        deserialize_with = "deserialize_title"
    )]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub discipline: Option<String>,
    #[serde(default, deserialize_with = "deserialize_age")]
    pub age_min: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_age")]
    pub age_max: Option<u32>,
    #[serde(rename = "drive_files_url", default, deserialize_with = "deserialize_optional_text")]
    pub resources_url: Option<String>,
    #[serde(
        rename = "activities equipment",
        default,
        deserialize_with = "deserialize_null_as_empty"
    )]
    pub equipment: Vec<EquipmentLine>,
}

impl Activity {
    pub fn age_range(&self) -> Option<String> {
        match (self.age_min, self.age_max) {
            (Some(min), Some(max)) => Some(format!("{} - {}", min, max)),
            (Some(min), None) => Some(format!("{}+", min)),
            (None, Some(max)) => Some(format!("up to {}", max)),
            (None, None) => None,
        }
    }
}

/// 計算後的一行器材
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedLine {
    pub item: String,
    pub item_type: Option<String>,
    pub notes: Option<String>,
    pub unit_type: UnitType,
    pub ratio: f64,
    pub minimum_quantity: u32,
    pub quantity: u32,
    pub unit_recognized: bool,
    pub unit_price: Option<f64>,
    pub line_cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentPlan {
    pub activity_id: ActivityId,
    pub title: String,
    pub discipline: Option<String>,
    pub age_range: Option<String>,
    pub resources_url: Option<String>,
    pub session: SessionParameters,
    pub lines: Vec<PlannedLine>,
    pub estimated_total_cost: Option<f64>,
    pub generated_at: DateTime<Utc>,
}

impl EquipmentPlan {
    pub fn unrecognized_lines(&self) -> impl Iterator<Item = &PlannedLine> {
        self.lines.iter().filter(|line| !line.unit_recognized)
    }
}

/// 一個要寫出的檔案
#[derive(Debug, Clone)]
pub struct RenderedOutput {
    pub file_name: String,
    pub contents: String,
}

#[derive(Debug, Clone)]
pub struct PlanResult {
    pub plan: EquipmentPlan,
    pub outputs: Vec<RenderedOutput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_type_accepts_spacing_and_case_variants() {
        for raw in ["per class", "per_class", "Per Class", " PER_CLASS ", "per  class"] {
            assert_eq!(UnitType::parse(raw), UnitType::PerClass, "{raw}");
        }
        for raw in ["per pupil", "per_pupil", "PER_PUPIL", "Per Pupil\n"] {
            assert_eq!(UnitType::parse(raw), UnitType::PerPupil, "{raw}");
        }
        for raw in ["per group", "per_group", "Per Group", "\tper_Group"] {
            assert_eq!(UnitType::parse(raw), UnitType::PerGroup, "{raw}");
        }
    }

    #[test]
    fn test_unit_type_keeps_unrecognized_text() {
        let unit = UnitType::parse("unknown_type");
        assert_eq!(unit, UnitType::Unrecognized("unknown_type".to_string()));
        assert!(!unit.is_recognized());
        assert_eq!(unit.to_string(), "unknown_type");
    }

    #[test]
    fn test_unit_type_strict_parse() {
        assert_eq!("Per Group".parse::<UnitType>().unwrap(), UnitType::PerGroup);
        assert!(matches!(
            "per table".parse::<UnitType>(),
            Err(PlannerError::UnknownUnitType { .. })
        ));
    }

    #[test]
    fn test_session_rejects_zero_values() {
        assert!(matches!(
            SessionParameters::new(0, 4),
            Err(PlannerError::InvalidSession { .. })
        ));
        assert!(matches!(
            SessionParameters::new(30, 0),
            Err(PlannerError::InvalidSession { .. })
        ));

        let session = SessionParameters::new(30, 4).unwrap();
        assert_eq!(session.pupil_count(), 30);
        assert_eq!(session.group_size(), 4);
        assert_eq!(session.group_count(), 8);
    }

    #[test]
    fn test_discipline_parse_and_match() {
        assert_eq!(Discipline::parse("All"), Discipline::All);
        assert_eq!(Discipline::parse("  "), Discipline::All);
        assert_eq!(Discipline::parse("all"), Discipline::All);

        let physics = Discipline::parse(" Physics ");
        assert_eq!(physics.as_filter(), Some("Physics"));
        assert!(physics.matches(Some("physics")));
        assert!(!physics.matches(Some("Biology")));
        assert!(!physics.matches(None));
        assert!(Discipline::All.matches(None));
    }

    #[test]
    fn test_activity_deserializes_nested_rows() {
        let json = serde_json::json!({
            "activity_id": 7,
            "activity_title": "Egg Drop",
            "discipline": "Engineering",
            "age_min": 9,
            "age_max": 11,
            "drive_files_url": null,
            "activities equipment": [
                {
                    "unit_type": "Per Group",
                    "ratio": 2,
                    "min_quantity": null,
                    "notes": "Spare for breakages",
                    "equipment master list": {
                        "item_title": "Eggs",
                        "type": "Consumable",
                        "unit_price": 0.25
                    }
                },
                {
                    "unit_type": null,
                    "min_quantity": 3
                }
            ]
        });

        let activity: Activity = serde_json::from_value(json).unwrap();
        assert_eq!(activity.id, ActivityId::Int(7));
        assert_eq!(activity.age_range().as_deref(), Some("9 - 11"));
        assert_eq!(activity.equipment.len(), 2);

        let eggs = &activity.equipment[0];
        assert_eq!(eggs.requirement.unit_type, UnitType::PerGroup);
        assert_eq!(eggs.requirement.ratio, 2.0);
        assert_eq!(eggs.requirement.minimum_quantity, 0);
        assert_eq!(
            eggs.item.as_ref().and_then(|i| i.title.as_deref()),
            Some("Eggs")
        );

        let blank = &activity.equipment[1];
        assert!(!blank.requirement.unit_type.is_recognized());
        assert_eq!(blank.requirement.unit_type.to_string(), MISSING_UNIT_TYPE);
        assert_eq!(blank.requirement.ratio, 1.0);
        assert_eq!(blank.requirement.minimum_quantity, 3);
        assert!(blank.item.is_none());
    }

    #[test]
    fn test_one_malformed_row_keeps_the_rest() {
        let rows = serde_json::json!([
            {
                "activity_id": 1,
                "activity_title": "Ok",
                "discipline": "Physics",
                "age_min": 7,
                "age_max": 9
            },
            {
                "activity_id": 2,
                "activity_title": null,
                "discipline": 5,
                "age_min": 8.6,
                "age_max": -3,
                "drive_files_url": false,
                "activities equipment": [
                    {
                        "unit_type": "per_pupil",
                        "ratio": "0.5",
                        "min_quantity": "two",
                        "notes": 12,
                        "equipment master list": {"item_title": null, "type": 3, "unit_price": "n/a"}
                    }
                ]
            },
            {
                "activity_id": 3,
                "age_min": "ten"
            }
        ]);

        let activities: Vec<Activity> = serde_json::from_value(rows).unwrap();
        assert_eq!(activities.len(), 3);
        assert_eq!(activities[0].title, "Ok");
        assert_eq!(activities[0].age_range().as_deref(), Some("7 - 9"));

        let damaged = &activities[1];
        assert_eq!(damaged.title, UNTITLED_ACTIVITY);
        assert_eq!(damaged.discipline.as_deref(), Some("5"));
        assert_eq!(damaged.age_min, Some(9));
        assert_eq!(damaged.age_max, None);
        assert_eq!(damaged.resources_url.as_deref(), Some("false"));

        let line = &damaged.equipment[0];
        assert_eq!(line.requirement.ratio, 0.5);
        assert_eq!(line.requirement.minimum_quantity, 0);
        assert_eq!(line.notes.as_deref(), Some("12"));
        let item = line.item.as_ref().unwrap();
        assert_eq!(item.title, None);
        assert_eq!(item.kind.as_deref(), Some("3"));
        assert_eq!(item.unit_price, None);

        assert_eq!(activities[2].title, UNTITLED_ACTIVITY);
        assert_eq!(activities[2].age_min, None);
    }

    #[test]
    fn test_blank_unit_type_reads_as_missing() {
        assert_eq!(
            UnitType::parse("   "),
            UnitType::Unrecognized(MISSING_UNIT_TYPE.to_string())
        );

        let line: EquipmentLine = serde_json::from_value(serde_json::json!({"ratio": 1})).unwrap();
        assert_eq!(line.requirement.unit_type.to_string(), MISSING_UNIT_TYPE);
    }

    #[test]
    fn test_activity_with_null_equipment_and_text_id() {
        let json = serde_json::json!({
            "activity_id": "act-01",
            "activity_title": "Pond Dipping",
            "activities equipment": null
        });

        let activity: Activity = serde_json::from_value(json).unwrap();
        assert!(activity.id.matches("act-01"));
        assert!(activity.equipment.is_empty());
        assert_eq!(activity.age_range(), None);
    }
}
