use crate::domain::model::{Activity, EquipmentPlan};
use crate::utils::error::{PlannerError, Result};
use std::fmt::Write;

const CSV_HEADER: [&str; 9] = [
    "item",
    "type",
    "notes",
    "unit_type",
    "ratio",
    "min_quantity",
    "quantity",
    "unit_price",
    "line_cost",
];

impl EquipmentPlan {
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;

        for line in &self.lines {
            writer.write_record([
                line.item.clone(),
                line.item_type.clone().unwrap_or_default(),
                line.notes.clone().unwrap_or_default(),
                line.unit_type.to_string(),
                line.ratio.to_string(),
                line.minimum_quantity.to_string(),
                line.quantity.to_string(),
                line.unit_price.map(format_money).unwrap_or_default(),
                line.line_cost.map(format_money).unwrap_or_default(),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| PlannerError::ProcessingError {
                message: format!("Failed to flush CSV writer: {}", e),
            })?;

        String::from_utf8(bytes).map_err(|e| PlannerError::ProcessingError {
            message: format!("CSV output is not valid UTF-8: {}", e),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 終端機顯示用的表格，無法辨識的計算方式以 `?` 標示
    pub fn render_table(&self) -> String {
        let item_width = self
            .lines
            .iter()
            .map(|line| line.item.chars().count())
            .chain(std::iter::once("Item".len()))
            .max()
            .unwrap_or(4);
        let notes_width = self
            .lines
            .iter()
            .map(|line| line.notes.as_deref().unwrap_or("-").chars().count())
            .chain(std::iter::once("Notes".len()))
            .max()
            .unwrap_or(5);

        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        if let Some(discipline) = &self.discipline {
            let _ = write!(out, "{}", discipline);
            if let Some(ages) = &self.age_range {
                let _ = write!(out, " | Ages {}", ages);
            }
            out.push('\n');
        }
        let _ = writeln!(
            out,
            "Equipment list for {} pupils in groups of {} ({} groups)",
            self.session.pupil_count(),
            self.session.group_size(),
            self.session.group_count()
        );
        out.push('\n');

        let _ = writeln!(
            out,
            "{:<iw$}  {:<nw$}  {:>5}",
            "Item",
            "Notes",
            "Qty",
            iw = item_width,
            nw = notes_width
        );
        let _ = writeln!(out, "{}", "-".repeat(item_width + notes_width + 9));

        for line in &self.lines {
            let marker = if line.unit_recognized { ' ' } else { '?' };
            let _ = writeln!(
                out,
                "{:<iw$}  {:<nw$}  {:>5}{}",
                line.item,
                line.notes.as_deref().unwrap_or("-"),
                line.quantity,
                marker,
                iw = item_width,
                nw = notes_width
            );
        }

        if self.lines.is_empty() {
            out.push_str("(no equipment listed)\n");
        }

        let unknown = self.unrecognized_lines().count();
        if unknown > 0 {
            let _ = writeln!(
                out,
                "\n? {} line(s) use an unknown unit type; only the minimum quantity is shown",
                unknown
            );
        }
        if let Some(total) = self.estimated_total_cost {
            let _ = writeln!(out, "\nEstimated cost: {}", format_money(total));
        }
        if let Some(url) = &self.resources_url {
            let _ = writeln!(out, "Resources bundle: {}", url);
        }

        out
    }
}

/// 活動清單，對應選擇畫面
pub fn render_catalogue(activities: &[Activity]) -> String {
    if activities.is_empty() {
        return "No activities found.\n".to_string();
    }

    let mut out = String::new();
    for activity in activities {
        let _ = write!(
            out,
            "[{}] {} | {}",
            activity.id,
            activity.discipline.as_deref().unwrap_or("-"),
            activity.title
        );
        if let Some(ages) = activity.age_range() {
            let _ = write!(out, " | Ages {}", ages);
        }
        out.push('\n');
    }
    out
}

fn format_money(value: f64) -> String {
    format!("{:.2}", value)
}
