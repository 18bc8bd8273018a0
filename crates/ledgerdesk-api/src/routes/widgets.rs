//! Small HTML building blocks shared by the page modules

use ledgerdesk_core::FieldError;
use ledgerdesk_utils::escape_html;

fn errors_for<'a>(errors: &'a [FieldError], field: &str) -> Vec<&'a str> {
    errors
        .iter()
        .filter(|e| e.field == field)
        .map(|e| e.message.as_str())
        .collect()
}

fn error_lines(errors: &[FieldError], field: &str) -> String {
    errors_for(errors, field)
        .iter()
        .map(|m| format!("<p class='text-sm text-red-600 mt-1'>{}</p>", escape_html(m)))
        .collect()
}

fn border_class(errors: &[FieldError], field: &str) -> &'static str {
    if errors_for(errors, field).is_empty() {
        "border-gray-300"
    } else {
        "border-red-500"
    }
}

pub fn text_input(name: &str, label: &str, value: &str, errors: &[FieldError], extra: &str) -> String {
    format!(
        r#"<div class='mb-4'><label for='{name}' class='block text-sm font-medium text-gray-700 mb-1'>{label}</label><input type='text' id='{name}' name='{name}' value='{value}' class='w-full px-3 py-2 border rounded-lg {border}' {extra}>{errors}</div>"#,
        value = escape_html(value),
        border = border_class(errors, name),
        errors = error_lines(errors, name),
    )
}

pub fn textarea_input(name: &str, label: &str, value: &str, errors: &[FieldError]) -> String {
    format!(
        r#"<div class='mb-4'><label for='{name}' class='block text-sm font-medium text-gray-700 mb-1'>{label}</label><textarea id='{name}' name='{name}' rows='3' class='w-full px-3 py-2 border rounded-lg {border}'>{value}</textarea>{errors}</div>"#,
        value = escape_html(value),
        border = border_class(errors, name),
        errors = error_lines(errors, name),
    )
}

/// `<select>` over `(value, label)` pairs with a leading placeholder
pub fn select_input(
    name: &str,
    label: &str,
    options: &[(String, String)],
    selected: &str,
    errors: &[FieldError],
) -> String {
    let mut html = format!(
        r#"<div class='mb-4'><label for='{name}' class='block text-sm font-medium text-gray-700 mb-1'>{label}</label><select id='{name}' name='{name}' class='w-full px-3 py-2 border rounded-lg bg-white {border}'><option value=''>Select...</option>"#,
        border = border_class(errors, name),
    );
    for (value, text) in options {
        html.push_str(&format!(
            "<option value='{}'{}>{}</option>",
            escape_html(value),
            if value == selected { " selected" } else { "" },
            escape_html(text)
        ));
    }
    html.push_str("</select>");
    html.push_str(&error_lines(errors, name));
    html.push_str("</div>");
    html
}

pub fn submit_button(label: &str) -> String {
    format!(
        "<button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>{}</button>",
        label
    )
}

pub fn detail_row(label: &str, value: &str) -> String {
    format!(
        "<div><p class='text-sm text-gray-500'>{}</p><p class='font-medium break-all'>{}</p></div>",
        label,
        escape_html(value)
    )
}

/// Table with pre-rendered cells; `empty` is shown when there are no rows
pub fn table(headers: &[&str], rows: &[Vec<String>], empty: &str) -> String {
    if rows.is_empty() {
        return format!("<p class='text-gray-500 py-8 text-center'>{}</p>", empty);
    }
    let head: String = headers
        .iter()
        .map(|h| format!("<th class='px-4 py-2 text-left text-xs font-medium text-gray-500 uppercase'>{}</th>", h))
        .collect();
    let body: String = rows
        .iter()
        .map(|cells| {
            let tds: String = cells
                .iter()
                .map(|c| format!("<td class='px-4 py-2 text-sm'>{}</td>", c))
                .collect();
            format!("<tr class='border-b hover:bg-gray-50'>{}</tr>", tds)
        })
        .collect();
    format!(
        "<div class='bg-white rounded-xl shadow-sm overflow-x-auto'><table class='min-w-full'><thead class='bg-gray-50'><tr>{}</tr></thead><tbody>{}</tbody></table></div>",
        head, body
    )
}

/// Upstream timestamp as `YYYY-MM-DD HH:MM`, or "—" when absent
pub fn display_date(value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => chrono::DateTime::parse_from_rfc3339(v)
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| escape_html(v)),
        None => "—".to_string(),
    }
}

pub fn link(href: &str, text: &str) -> String {
    format!(
        "<a href='{}' class='text-indigo-600 hover:underline'>{}</a>",
        escape_html(href),
        escape_html(text)
    )
}

pub fn status_badge(status: &str) -> String {
    let color = match status.to_ascii_lowercase().as_str() {
        "active" | "applied" | "verified" => "green",
        "inflight" | "queued" | "pending" => "yellow",
        "void" | "rejected" | "inactive" => "red",
        _ => "gray",
    };
    format!(
        "<span class='px-2 py-0.5 text-xs rounded-full bg-{color}-100 text-{color}-800'>{}</span>",
        escape_html(status)
    )
}

/// Page heading with an optional action button on the right
pub fn page_header(title: &str, action: Option<(&str, &str)>) -> String {
    let button = action
        .map(|(href, label)| {
            format!(
                "<a href='{}' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>{}</a>",
                href, label
            )
        })
        .unwrap_or_default();
    format!(
        "<div class='flex items-center justify-between mb-6'><h2 class='text-2xl font-bold'>{}</h2>{}</div>",
        escape_html(title),
        button
    )
}
