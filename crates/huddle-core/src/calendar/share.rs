use chrono::Datelike;

use huddle_db::models::PlanningItem;

use super::month::{MonthView, YearMonth};

/// Render the month's schedule as shareable text.
///
/// ```text
/// YouthConnect Ministry Plan - March 2024
///
/// 📅 March 4 (Mon):
///    • Bible Study (1 hour)
///
/// ```
///
/// Derived occurrences are listed like anchors. Returns `None` when nothing
/// is scheduled in the month.
pub fn share_text(title: &str, month: YearMonth, items: &[PlanningItem]) -> Option<String> {
    let view = MonthView::build(items, month);
    if view.is_empty() {
        return None;
    }

    let name = month.name();
    let mut out = format!("{title} - {name} {}\n\n", month.year());
    for cell in view.busy_days() {
        let weekday = cell.date.format("%a");
        out.push_str(&format!("📅 {name} {} ({weekday}):\n", cell.date.day()));
        for occ in &cell.occurrences {
            out.push_str(&format!(
                "   • {} ({})\n",
                occ.item.title, occ.item.suggested_duration
            ));
        }
        out.push('\n');
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_db::models::{Cost, Difficulty, Recurrence};

    fn weekly_study() -> PlanningItem {
        PlanningItem {
            id: Some("a".into()),
            title: "Bible Study".into(),
            description: "Week 1".into(),
            materials_needed: vec![],
            steps: vec![],
            scripture_reference: String::new(),
            suggested_duration: "1 hour".into(),
            difficulty_level: Difficulty::Low,
            estimated_cost: Cost::Free,
            roles: None,
            assigned_team_members: None,
            assigned_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 25),
            recurrence: Recurrence::Weekly,
            notes: None,
            saved_at: None,
        }
    }

    #[test]
    fn lists_each_busy_day() {
        let march = YearMonth::new(2024, 3).unwrap();
        let text = share_text("YouthConnect Ministry Plan", march, &[weekly_study()]).unwrap();
        assert_eq!(
            text,
            "YouthConnect Ministry Plan - March 2024\n\n\
             📅 March 25 (Mon):\n   • Bible Study (1 hour)\n\n"
        );

        let april = share_text("Plan", march.next(), &[weekly_study()]).unwrap();
        assert_eq!(april.matches("📅").count(), 5);
        assert!(april.contains("📅 April 29 (Mon):"));
    }

    #[test]
    fn empty_month_has_nothing_to_share() {
        let feb = YearMonth::new(2024, 2).unwrap();
        assert_eq!(share_text("Plan", feb, &[weekly_study()]), None);
    }
}
