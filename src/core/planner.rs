use crate::core::calculator::required_quantity;
use crate::domain::model::{Activity, EquipmentLine, EquipmentPlan, PlannedLine, SessionParameters};
use crate::utils::error::{PlannerError, Result};
use chrono::Utc;

const UNNAMED_ITEM: &str = "Unnamed item";

pub fn select_activity<'a>(activities: &'a [Activity], id: &str) -> Result<&'a Activity> {
    activities
        .iter()
        .find(|activity| activity.id.matches(id))
        .ok_or_else(|| PlannerError::ActivityNotFound {
            id: id.trim().to_string(),
        })
}

/// 依照課堂設定計算整個活動的器材清單，順序與資料來源相同
pub fn plan_activity(activity: &Activity, session: &SessionParameters) -> EquipmentPlan {
    let lines: Vec<PlannedLine> = activity
        .equipment
        .iter()
        .map(|line| plan_line(line, session))
        .collect();

    for line in lines.iter().filter(|line| !line.unit_recognized) {
        tracing::warn!(
            "⚠️ Unknown unit type '{}' for '{}' in activity {}, using minimum quantity {}",
            line.unit_type,
            line.item,
            activity.id,
            line.minimum_quantity
        );
    }

    let priced: Vec<f64> = lines.iter().filter_map(|line| line.line_cost).collect();
    let estimated_total_cost = if priced.is_empty() {
        None
    } else {
        Some(priced.iter().sum::<f64>())
    };

    EquipmentPlan {
        activity_id: activity.id.clone(),
        title: activity.title.clone(),
        discipline: activity.discipline.clone(),
        age_range: activity.age_range(),
        resources_url: activity.resources_url.clone(),
        session: *session,
        lines,
        estimated_total_cost,
        generated_at: Utc::now(),
    }
}

/// 嚴格模式：任何無法辨識的計算方式都視為錯誤
pub fn ensure_units_recognized(activity: &Activity) -> Result<()> {
    match activity
        .equipment
        .iter()
        .find(|line| !line.requirement.unit_type.is_recognized())
    {
        Some(line) => Err(PlannerError::UnknownUnitType {
            value: line.requirement.unit_type.to_string(),
        }),
        None => Ok(()),
    }
}

fn plan_line(line: &EquipmentLine, session: &SessionParameters) -> PlannedLine {
    let requirement = &line.requirement;
    let quantity = required_quantity(requirement, session);

    let item = line
        .item
        .as_ref()
        .and_then(|item| item.title.as_deref())
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or(UNNAMED_ITEM)
        .to_string();
    let item_type = line.item.as_ref().and_then(|item| item.kind.clone());
    let unit_price = line.item.as_ref().and_then(|item| item.unit_price);
    let notes = line
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|notes| !notes.is_empty())
        .map(str::to_string);

    PlannedLine {
        item,
        item_type,
        notes,
        unit_type: requirement.unit_type.clone(),
        ratio: requirement.ratio,
        minimum_quantity: requirement.minimum_quantity,
        quantity,
        unit_recognized: requirement.unit_type.is_recognized(),
        unit_price,
        line_cost: unit_price.map(|price| price * f64::from(quantity)),
    }
}
