//! Rendering a single plan for download, printing, and editing.

use huddle_db::models::PlanningItem;

/// Shown in place of a missing anchor date.
pub const NOT_SCHEDULED: &str = "Not scheduled";

/// Errors from the editable TOML form.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to render plan as TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("invalid plan TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}

fn date_label(item: &PlanningItem) -> String {
    item.assigned_date
        .map_or_else(|| NOT_SCHEDULED.to_owned(), |d| d.format("%Y-%m-%d").to_string())
}

fn has_scripture(item: &PlanningItem) -> bool {
    let s = item.scripture_reference.trim();
    !s.is_empty() && s != "N/A"
}

fn non_empty(list: &Option<Vec<String>>) -> Option<&[String]> {
    list.as_deref().filter(|l| !l.is_empty())
}

/// File name for an exported plan: whitespace runs become `_`.
///
/// `"Youth Game  Night"` with `"txt"` gives `"Youth_Game_Night_Plan.txt"`.
pub fn export_file_name(item: &PlanningItem, extension: &str) -> String {
    let stem = item.title.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{stem}_Plan.{extension}")
}

// ---------------------------------------------------------------------------
// Plain text
// ---------------------------------------------------------------------------

/// Render `item` as the plain-text download layout.
pub fn render_plain_text(item: &PlanningItem) -> String {
    let mut sections: Vec<String> = Vec::new();

    sections.push(format!(
        "PLAN: {title}\n\
         ----------------------------------------\n\
         Date: {date}\n\
         Description: {description}\n\
         Duration: {duration}\n\
         Cost: {cost}\n\
         Difficulty: {difficulty}",
        title = item.title,
        date = date_label(item),
        description = item.description,
        duration = item.suggested_duration,
        cost = item.estimated_cost,
        difficulty = item.difficulty_level,
    ));

    sections.push(format!("SCRIPTURE FOCUS:\n{}", item.scripture_reference));
    sections.push(bulleted("MATERIALS NEEDED:", &item.materials_needed));

    let mut steps = String::from("STEPS:");
    for (i, step) in item.steps.iter().enumerate() {
        steps.push_str(&format!("\n{}. {step}", i + 1));
    }
    sections.push(steps);

    if let Some(roles) = non_empty(&item.roles) {
        sections.push(bulleted("TEAM ROLES:", roles));
    }
    if let Some(members) = non_empty(&item.assigned_team_members) {
        sections.push(bulleted("ASSIGNED MEMBERS:", members));
    }
    if let Some(notes) = item.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        sections.push(format!("NOTES:\n{notes}"));
    }

    sections.join("\n\n")
}

fn bulleted(heading: &str, lines: &[String]) -> String {
    let mut out = heading.to_owned();
    for line in lines {
        out.push_str(&format!("\n- {line}"));
    }
    out
}

// ---------------------------------------------------------------------------
// Print HTML
// ---------------------------------------------------------------------------

const PRINT_STYLE: &str = "\
body { font-family: 'Helvetica Neue', Helvetica, Arial, sans-serif; padding: 40px; color: #1f2937; line-height: 1.5; }
h1 { color: #059669; border-bottom: 2px solid #059669; padding-bottom: 10px; }
.meta { display: flex; gap: 20px; font-size: 0.9em; color: #4b5563; margin-bottom: 20px; background: #ecfdf5; padding: 10px; border-radius: 8px; }
.section-title { font-weight: bold; font-size: 1.1em; margin-top: 25px; margin-bottom: 10px; color: #065f46; }
ul, ol { margin-top: 5px; padding-left: 20px; }
li { margin-bottom: 6px; }
.scripture { background: #f3f4f6; padding: 15px; border-left: 4px solid #059669; font-style: italic; margin: 20px 0; }
.notes { background: #fffbeb; padding: 15px; border: 1px solid #fcd34d; border-radius: 8px; margin-top: 20px; }
@media print { body { padding: 0; } }";

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn html_list(out: &mut String, tag: &str, title: &str, items: &[String]) {
    out.push_str(&format!(
        "<div class=\"section-title\">{}</div>\n",
        escape_html(title)
    ));
    out.push_str(&format!("<{tag}>\n"));
    for item in items {
        out.push_str(&format!("  <li>{}</li>\n", escape_html(item)));
    }
    out.push_str(&format!("</{tag}>\n"));
}

/// Render `item` as a standalone printable HTML document.
///
/// Every piece of plan text is escaped. The scripture block is left out
/// when the reference is empty or `N/A`.
pub fn render_print_html(item: &PlanningItem) -> String {
    let title = escape_html(&item.title);
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n");
    out.push_str("<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{title} - Print View</title>\n"));
    out.push_str(&format!("<style>\n{PRINT_STYLE}\n</style>\n</head>\n<body>\n"));
    out.push_str(&format!("<h1>{title}</h1>\n"));

    out.push_str("<div class=\"meta\">\n");
    for (label, value) in [
        ("Date", date_label(item)),
        ("Duration", item.suggested_duration.clone()),
        ("Cost", item.estimated_cost.to_string()),
        ("Difficulty", item.difficulty_level.to_string()),
    ] {
        out.push_str(&format!(
            "  <span><strong>{label}:</strong> {}</span>\n",
            escape_html(&value)
        ));
    }
    out.push_str("</div>\n");

    out.push_str(&format!("<p>{}</p>\n", escape_html(&item.description)));

    if has_scripture(item) {
        out.push_str(&format!(
            "<div class=\"scripture\"><strong>Scripture:</strong> {}</div>\n",
            escape_html(&item.scripture_reference)
        ));
    }

    html_list(&mut out, "ol", "Action Steps", &item.steps);
    html_list(&mut out, "ul", "Materials Needed", &item.materials_needed);
    if let Some(roles) = non_empty(&item.roles) {
        html_list(&mut out, "ul", "Team Roles", roles);
    }
    if let Some(members) = non_empty(&item.assigned_team_members) {
        html_list(&mut out, "ul", "Assigned Members", members);
    }

    if let Some(notes) = item.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        let body = notes
            .lines()
            .map(escape_html)
            .collect::<Vec<_>>()
            .join("<br/>");
        out.push_str(&format!(
            "<div class=\"notes\"><strong>Notes:</strong><br/>{body}</div>\n"
        ));
    }

    out.push_str("</body>\n</html>\n");
    out
}

// ---------------------------------------------------------------------------
// Editable TOML
// ---------------------------------------------------------------------------

/// Render `item` as TOML for editing by hand.
pub fn to_toml(item: &PlanningItem) -> Result<String, ExportError> {
    Ok(toml::to_string_pretty(item)?)
}

/// Parse a plan edited by hand. Field names match [`to_toml`].
pub fn from_toml(content: &str) -> Result<PlanningItem, ExportError> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use huddle_db::models::{Cost, Difficulty, Recurrence};

    fn game_night() -> PlanningItem {
        PlanningItem {
            id: Some("p-1".into()),
            title: "Youth Game  Night".into(),
            description: "Board games & <snacks>".into(),
            materials_needed: vec!["Dominoes".into(), "Ludo".into()],
            steps: vec!["Set up".into(), "Play".into()],
            scripture_reference: "Psalm 133:1".into(),
            suggested_duration: "2 hours".into(),
            difficulty_level: Difficulty::Low,
            estimated_cost: Cost::Free,
            roles: Some(vec!["Host".into()]),
            assigned_team_members: Some(vec![]),
            assigned_date: NaiveDate::from_ymd_opt(2024, 3, 8),
            recurrence: Recurrence::Weekly,
            notes: Some("Bring chairs\nLock up after".into()),
            saved_at: None,
        }
    }

    #[test]
    fn file_name_collapses_whitespace() {
        assert_eq!(export_file_name(&game_night(), "txt"), "Youth_Game_Night_Plan.txt");
    }

    #[test]
    fn plain_text_layout() {
        let text = render_plain_text(&game_night());
        let expected = "\
PLAN: Youth Game  Night
----------------------------------------
Date: 2024-03-08
Description: Board games & <snacks>
Duration: 2 hours
Cost: Free
Difficulty: Low

SCRIPTURE FOCUS:
Psalm 133:1

MATERIALS NEEDED:
- Dominoes
- Ludo

STEPS:
1. Set up
2. Play

TEAM ROLES:
- Host

NOTES:
Bring chairs
Lock up after";
        assert_eq!(text, expected);
    }

    #[test]
    fn plain_text_marks_unscheduled() {
        let mut item = game_night();
        item.assigned_date = None;
        assert!(render_plain_text(&item).contains("Date: Not scheduled"));
    }

    #[test]
    fn print_html_escapes_and_omits_na_scripture() {
        let mut item = game_night();
        let html = render_print_html(&item);
        assert!(html.contains("<p>Board games &amp; &lt;snacks&gt;</p>"));
        assert!(html.contains("Scripture:</strong> Psalm 133:1"));
        assert!(html.contains("Bring chairs<br/>Lock up after"));
        assert!(!html.contains("Assigned Members"));

        item.scripture_reference = "N/A".into();
        assert!(!render_print_html(&item).contains("class=\"scripture\""));
    }

    #[test]
    fn toml_form_roundtrips() {
        let item = game_night();
        let text = to_toml(&item).unwrap();
        assert!(text.contains("assignedDate = \"2024-03-08\""));
        assert_eq!(from_toml(&text).unwrap(), item);
    }

    #[test]
    fn toml_form_rejects_bad_enum() {
        let text = to_toml(&game_night()).unwrap().replace("\"Low\"", "\"Trivial\"");
        assert!(matches!(from_toml(&text), Err(ExportError::TomlParse(_))));
    }
}
