//! Plain-text rendering of view snapshots.

use crm_core::{display_date, Field, KindDescriptor, Record, RecordKind};

use crate::commands::available_commands;
use crate::model::{ViewPhase, ViewSnapshot};

/// Detail lines shown under each record name.
fn detail_fields(kind: RecordKind) -> &'static [(&'static str, Field)] {
    match kind {
        RecordKind::Consultation => &[
            ("Contact", Field::Contact),
            ("Place", Field::Place),
            ("Duration", Field::Duration),
        ],
        RecordKind::Booking => &[
            ("Email", Field::Email),
            ("Contact", Field::Contact),
            ("Place", Field::Place),
            ("Duration", Field::Duration),
            ("Package", Field::PackageBooked),
        ],
    }
}

/// Avatar letter: first character of the name, uppercased.
pub fn avatar_initial(name: Option<&str>) -> String {
    match name.and_then(|n| n.chars().next()) {
        Some(c) => c.to_uppercase().collect(),
        None => "N".to_string(),
    }
}

/// Render the screen for a snapshot.
pub fn render_snapshot<R: Record>(snapshot: &ViewSnapshot<R>) -> String {
    let label = snapshot.descriptor.label;
    match snapshot.phase {
        ViewPhase::Idle => return format!("{} not loaded yet.", label),
        ViewPhase::Loading => return format!("Loading {}...", label),
        ViewPhase::Ready => {}
    }

    let mut lines = vec![snapshot.summary()];
    if snapshot.can_clear() {
        lines.push("Filters active. Type 'clear' to reset.".to_string());
    }

    if snapshot.visible.is_empty() {
        lines.push(snapshot.empty_message());
        return lines.join("\n");
    }

    let fields = detail_fields(snapshot.descriptor.kind);
    for record in &snapshot.visible {
        let name = record.field(Field::Name);
        lines.push(format!(
            "[{}] {}  (id: {})",
            avatar_initial(name),
            name.unwrap_or("N/A"),
            record.id()
        ));
        for (title, field) in fields {
            lines.push(detail_line(title, record.field(*field).unwrap_or("N/A")));
        }
        lines.push(detail_line(
            "Created",
            &display_date(record.field(Field::CreatedAt)),
        ));
    }

    lines.join("\n")
}

fn detail_line(title: &str, value: &str) -> String {
    format!("    {:<10}{}", format!("{}:", title), value)
}

/// Render the filters, their values, and sort keys a screen accepts.
pub fn render_options(descriptor: &KindDescriptor) -> String {
    let mut lines = Vec::new();
    for filter in descriptor.filters {
        lines.push(format!("filter {}:", filter.name));
        lines.push("    all".to_string());
        for option in filter.options {
            lines.push(format!("    {}", option));
        }
    }
    let keys: Vec<&str> = descriptor.sort_keys.iter().map(|k| k.as_str()).collect();
    lines.push(format!("sort: {}", keys.join(", ")));
    lines.join("\n")
}

pub fn render_help() -> String {
    available_commands()
        .iter()
        .map(|(usage, about)| format!("  {:<24}{}", usage, about))
        .collect::<Vec<_>>()
        .join("\n")
}
