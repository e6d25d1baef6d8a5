//! Server-side rendering of the task list page.
//!
//! Kept as a pure function from the ordered task list to an HTML string so
//! the store and handlers stay independent of any templating mechanism.

use crate::api::task_store::Task;

/// Render the full index page for the given task list.
///
/// Tasks are expected in the default listing order (most recent first);
/// this function does not re-sort.
pub fn render_page(tasks: &[Task]) -> String {
    let pending = tasks.iter().filter(|t| !t.completed).count();
    let completed = tasks.len() - pending;

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n<title>taskdeck</title>\n");
    html.push_str("</head>\n<body>\n<main>\n<h1>Tasks</h1>\n");
    html.push_str(&format!(
        "<p class=\"counts\">{} pending, {} completed</p>\n",
        pending, completed
    ));

    if tasks.is_empty() {
        html.push_str("<p class=\"empty\">No tasks yet.</p>\n");
    } else {
        html.push_str("<ul class=\"tasks\">\n");
        for task in tasks {
            let class = if task.completed { "task done" } else { "task" };
            let checked = if task.completed { " checked" } else { "" };
            html.push_str(&format!(
                "<li class=\"{}\" data-id=\"{}\"><input type=\"checkbox\"{} disabled> <span class=\"title\">{}</span></li>\n",
                class,
                task.id,
                checked,
                escape_html(&task.title),
            ));
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

/// Escape text for safe inclusion in HTML element content and attributes.
fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
