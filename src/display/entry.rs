//! Entry display formatting
//!
//! Formats change log entries for terminal output in table and detail views.

use crate::changelog::{describe_change, format_value, Entry};

/// Format entries as a table
pub fn format_entry_table(entries: &[&Entry]) -> String {
    if entries.is_empty() {
        return "No changes recorded.".to_string();
    }

    let rows: Vec<[String; 4]> = entries
        .iter()
        .map(|entry| {
            [
                entry.attribute.clone(),
                format_value(&entry.old_value),
                format_value(&entry.new_value),
                entry
                    .call_site()
                    .map(|frame| frame.location())
                    .unwrap_or_default(),
            ]
        })
        .collect();

    // Calculate column widths
    let width = |column: usize, header: &str| {
        rows.iter()
            .map(|row| row[column].chars().count())
            .max()
            .unwrap_or(0)
            .max(header.len())
    };
    let attr_width = width(0, "Attribute");
    let old_width = width(1, "Old");
    let new_width = width(2, "New");

    // Build header
    let mut output = String::new();
    output.push_str(&format!(
        "{:<19}  {:<attr_width$}  {:<old_width$}  {:<new_width$}  {}\n",
        "Time",
        "Attribute",
        "Old",
        "New",
        "Location",
        attr_width = attr_width,
        old_width = old_width,
        new_width = new_width,
    ));

    // Separator line
    output.push_str(&format!(
        "{:-<19}  {:-<attr_width$}  {:-<old_width$}  {:-<new_width$}  {:-<8}\n",
        "",
        "",
        "",
        "",
        "",
        attr_width = attr_width,
        old_width = old_width,
        new_width = new_width,
    ));

    for (entry, [attribute, old, new, location]) in entries.iter().zip(&rows) {
        let line = format!(
            "{:<19}  {:<attr_width$}  {:<old_width$}  {:<new_width$}  {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            attribute,
            old,
            new,
            location,
            attr_width = attr_width,
            old_width = old_width,
            new_width = new_width,
        );
        output.push_str(line.trim_end());
        output.push('\n');
    }

    output.push_str(&format!("\n{} change(s)\n", entries.len()));

    output
}

/// Format a single entry's details
pub fn format_entry_details(entry: &Entry) -> String {
    let mut output = String::new();

    output.push_str(&format!("Change: {}\n", entry.attribute));
    output.push_str(&format!(
        "  Time:      {}\n",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f UTC")
    ));
    output.push_str(&format!("  Old:       {}\n", entry.old_value));
    output.push_str(&format!("  New:       {}\n", entry.new_value));

    match describe_change(&entry.old_value, &entry.new_value) {
        Some(change) => output.push_str(&format!("  Summary:   {}\n", change)),
        None => output.push_str("  Summary:   unchanged\n"),
    }

    match &entry.call_stack {
        Some(stack) if !stack.is_empty() => {
            output.push_str("  Stack:\n");
            for frame in stack {
                output.push_str(&format!("    {}\n", frame));
                if let Some(source) = &frame.source {
                    output.push_str(&format!("        {}\n", source.trim()));
                }
            }
        }
        _ => output.push_str("  Stack:     not captured\n"),
    }

    output
}
