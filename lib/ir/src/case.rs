//! Case conversion for canonical identifiers.
//!
//! All four renderings share one tokenizer: split on non-alphanumerics and
//! on camelCase boundaries (including acronym runs, so `APIKey` tokenizes
//! as `api` + `key`). An attribute name round-trips through any rendering
//! without changing which document it refers to.

/// Split a canonical identifier into lowercase tokens.
fn tokenize(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            continue;
        }

        let boundary = if current.is_empty() {
            false
        } else if ch.is_uppercase() {
            let prev = chars[i - 1];
            // aB → new token; ABc → the last uppercase starts the new token.
            prev.is_lowercase()
                || prev.is_numeric()
                || matches!(chars.get(i + 1), Some(next) if next.is_lowercase())
        } else {
            false
        };

        if boundary {
            tokens.push(std::mem::take(&mut current));
        }
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `widgetId` → `widget_id`
pub fn to_snake_case(s: &str) -> String {
    tokenize(s).join("_")
}

/// `widgetId` → `widget-id`
pub fn to_kebab_case(s: &str) -> String {
    tokenize(s).join("-")
}

/// `widget_id` → `WidgetId`
pub fn to_pascal_case(s: &str) -> String {
    tokenize(s).iter().map(|t| capitalize(t)).collect()
}

/// `WidgetId` → `widgetId`
pub fn to_camel_case(s: &str) -> String {
    let tokens = tokenize(s);
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i == 0 {
            out.push_str(token);
        } else {
            out.push_str(&capitalize(token));
        }
    }
    out
}
