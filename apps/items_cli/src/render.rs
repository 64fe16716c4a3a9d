//! Plain-text rendering of a controller snapshot.

use client_core::{Phase, ViewSnapshot};
use shared::domain::Item;

const HEADERS: [&str; 3] = ["ID", "Name", "Description"];

pub fn render_table(items: &[Item]) -> String {
    if items.is_empty() {
        return "(no items)\n".to_string();
    }

    let rows: Vec<[&str; 3]> = items
        .iter()
        .map(|item| [item.id.as_str(), item.name.as_str(), item.description.as_str()])
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[&str; 3], widths: &[usize; 3]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}

pub fn render_view(snapshot: &ViewSnapshot) -> String {
    let mut out = render_table(&snapshot.items);

    if snapshot.dialog_open {
        let mode = snapshot.dialog_mode();
        out.push_str(&format!("\n[{}]\n", mode.title()));
        out.push_str(&format!("  name:        {}\n", snapshot.draft.fields.name));
        out.push_str(&format!(
            "  description: {}\n",
            snapshot.draft.fields.description
        ));
        let submit = match snapshot.phase {
            Phase::Submitting => format!("{} (in progress)", mode.submit_label()),
            Phase::Idle => mode.submit_label().to_string(),
        };
        out.push_str(&format!("  actions:     {submit} | Cancel\n"));
    }

    if let Some(error) = &snapshot.last_error {
        out.push_str(&format!("\n! {error}\n"));
    }
    out
}
