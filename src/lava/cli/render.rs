use colored::Colorize;
use lava::commands::{CmdMessage, MessageLevel};
use lava::store::StoredEntry;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
        }
    }
}

/// One `[namespace]` block per namespace, entries already sorted.
pub(super) fn render_entries(entries: &[StoredEntry]) -> String {
    if entries.is_empty() {
        return format!("{}\n", "No values stored.".dimmed());
    }

    let mut output = String::new();
    let mut current: Option<&str> = None;
    for entry in entries {
        if current != Some(entry.namespace.as_str()) {
            if current.is_some() {
                output.push('\n');
            }
            output.push_str(&format!("{}\n", format!("[{}]", entry.namespace).bold()));
            current = Some(entry.namespace.as_str());
        }
        output.push_str(&format!("{} = {}\n", entry.key, entry.value));
    }
    output
}

pub(super) fn render_templates(templates: &[(&str, &str)]) -> String {
    let width = templates.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    templates
        .iter()
        .map(|(name, description)| {
            format!("  {}  {}\n", format!("{:<width$}", name).green(), description)
        })
        .collect()
}
