use std::io::Write;
use std::path::Path;

use anyhow::Context;

use huddle_core::export;
use huddle_db::models::PlanningItem;

use crate::ExportFormat;

/// Export a plan as plain text, printable HTML, or editable TOML.
///
/// `output` may name a file or an existing directory; in a directory the
/// file is named after the plan title.
pub fn run_export(
    item: &PlanningItem,
    format: ExportFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let body = match format {
        ExportFormat::Text => format!("{}\n", export::render_plain_text(item)),
        ExportFormat::Html => export::render_print_html(item),
        ExportFormat::Toml => export::to_toml(item).context("failed to render plan")?,
    };

    let target = output.map(|path| {
        if path.is_dir() {
            path.join(export::export_file_name(item, format.extension()))
        } else {
            path.to_path_buf()
        }
    });

    let mut writer: Box<dyn Write> = if let Some(path) = &target {
        Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("cannot create output file: {}", path.display()))?,
        )
    } else {
        Box::new(std::io::stdout().lock())
    };

    writer.write_all(body.as_bytes())?;
    writer.flush()?;

    if let Some(path) = &target {
        println!("Exported \"{}\" to {}", item.title, path.display());
    }

    Ok(())
}
