use colored::Colorize;

use crate::message::{Message, Sender};

/// Format a message for terminal display with sender label and colors.
pub fn format_message(msg: &Message) -> String {
    let label = match msg.sender {
        Sender::User => format!("{}:", msg.sender).green().bold(),
        Sender::Bot => format!("{}:", msg.sender).cyan().bold(),
    };
    let body = match msg.sender {
        Sender::User => msg.text.clone(),
        Sender::Bot => render_markdown_lite(&msg.text),
    };
    format!("{}\n{}", label, body)
}

/// Minimal markdown renderer for chat replies.
///
/// Handles the patterns the assistant actually produces: `**bold**`,
/// `` `inline code` ``, fenced code blocks, `#` headings and `-`/`*` bullet
/// lists. Anything else is printed as-is.
pub fn render_markdown_lite(text: &str) -> String {
    let mut lines = Vec::new();
    let mut in_code_block = false;

    for line in text.lines() {
        if let Some(fence) = line.trim_start().strip_prefix("```") {
            if !in_code_block {
                let lang = fence.trim_start_matches('`').trim();
                if !lang.is_empty() {
                    lines.push(lang.dimmed().italic().to_string());
                }
            }
            in_code_block = !in_code_block;
            continue;
        }

        if in_code_block {
            lines.push(line.dimmed().to_string());
        } else {
            lines.push(render_line(line));
        }
    }

    lines.join("\n")
}

fn render_line(line: &str) -> String {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];

    if let Some(heading) = trimmed.strip_prefix('#') {
        let heading = heading.trim_start_matches('#').trim();
        return format!("{}{}", indent, render_inline(heading).bold());
    }

    if let Some(item) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        return format!("{}• {}", indent, render_inline(item));
    }

    format!("{}{}", indent, render_inline(trimmed))
}

/// Renders `**bold**` and `` `code` `` spans. Unclosed markers are kept
/// literally.
fn render_inline(line: &str) -> String {
    let mut out = String::new();
    let mut rest = line;

    while let Some(pos) = rest.find(&['*', '`'][..]) {
        let (before, tail) = rest.split_at(pos);
        out.push_str(before);

        let (marker, style): (&str, fn(&str) -> String) = if tail.starts_with("**") {
            ("**", |s| s.bold().to_string())
        } else if tail.starts_with('`') {
            ("`", |s| s.dimmed().to_string())
        } else {
            out.push('*');
            rest = &tail[1..];
            continue;
        };

        let body = &tail[marker.len()..];
        match body.find(marker) {
            Some(end) => {
                out.push_str(&style(&body[..end]));
                rest = &body[end + marker.len()..];
            }
            None => {
                out.push_str(marker);
                rest = body;
            }
        }
    }

    out.push_str(rest);
    out
}
