//! Purpose: Render library values as pretty JSON-style text with optional ANSI color.
//! Exports: `colorize_value`.
//! Role: Small, pure formatter used by CLI emission paths.
//! Invariants: When color is disabled, output equals the pretty JSON of `Value::to_json`.
//! Invariants: ANSI escapes appear only when explicitly enabled.
use batchkit::api::Value;

const INDENT: &str = "  ";

// Conservative 8/16-color palette for broad terminal compatibility.
const COLOR_KEY: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_NUMBER: &str = "33";
const COLOR_BOOL: &str = "35";
const COLOR_PUNCT: &str = "39";

pub fn colorize_value(value: &Value, use_color: bool) -> String {
    let mut out = String::new();
    write_value(value, 0, use_color, &mut out);
    out
}

fn write_value(value: &Value, indent: usize, use_color: bool, out: &mut String) {
    match value {
        Value::Number(number) => {
            let text = serde_json::Value::from(*number).to_string();
            push_colored(&text, COLOR_NUMBER, use_color, out);
        }
        Value::Bool(flag) => {
            let text = if *flag { "true" } else { "false" };
            push_colored(text, COLOR_BOOL, use_color, out);
        }
        Value::Text(text) => {
            let encoded = serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
            push_colored(&encoded, COLOR_STRING, use_color, out);
        }
        Value::List(items) => write_list(items, indent, use_color, out),
        Value::Map(map) => write_map(map, indent, use_color, out),
    }
}

fn write_list(items: &[Value], indent: usize, use_color: bool, out: &mut String) {
    if items.is_empty() {
        push_colored("[]", COLOR_PUNCT, use_color, out);
        return;
    }
    push_colored("[", COLOR_PUNCT, use_color, out);
    out.push('\n');
    for (idx, item) in items.iter().enumerate() {
        push_indent(indent + 1, out);
        write_value(item, indent + 1, use_color, out);
        if idx + 1 < items.len() {
            push_colored(",", COLOR_PUNCT, use_color, out);
        }
        out.push('\n');
    }
    push_indent(indent, out);
    push_colored("]", COLOR_PUNCT, use_color, out);
}

fn write_map(
    map: &std::collections::BTreeMap<String, Value>,
    indent: usize,
    use_color: bool,
    out: &mut String,
) {
    if map.is_empty() {
        push_colored("{}", COLOR_PUNCT, use_color, out);
        return;
    }
    push_colored("{", COLOR_PUNCT, use_color, out);
    out.push('\n');
    let len = map.len();
    for (idx, (key, value)) in map.iter().enumerate() {
        push_indent(indent + 1, out);
        let encoded = serde_json::to_string(key).unwrap_or_else(|_| "\"\"".to_string());
        push_colored(&encoded, COLOR_KEY, use_color, out);
        push_colored(":", COLOR_PUNCT, use_color, out);
        out.push(' ');
        write_value(value, indent + 1, use_color, out);
        if idx + 1 < len {
            push_colored(",", COLOR_PUNCT, use_color, out);
        }
        out.push('\n');
    }
    push_indent(indent, out);
    push_colored("}", COLOR_PUNCT, use_color, out);
}

fn push_indent(level: usize, out: &mut String) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

fn push_colored(text: &str, color: &str, use_color: bool, out: &mut String) {
    if !use_color {
        out.push_str(text);
        return;
    }
    out.push_str("\u{1b}[");
    out.push_str(color);
    out.push('m');
    out.push_str(text);
    out.push_str("\u{1b}[0m");
}

#[cfg(test)]
mod tests {
    use super::colorize_value;
    use batchkit::api::Value;
    use std::collections::BTreeMap;

    fn sample() -> Value {
        let mut map = BTreeMap::new();
        map.insert(
            "names".to_string(),
            Value::List(vec![
                Value::Text("alice".to_string()),
                Value::Number(1.0),
                Value::Bool(true),
            ]),
        );
        map.insert("empty".to_string(), Value::List(Vec::new()));
        Value::Map(map)
    }

    #[test]
    fn plain_output_matches_pretty_json() {
        let value = sample();
        let plain = colorize_value(&value, false);
        let pretty = serde_json::to_string_pretty(&value.to_json()).expect("pretty");
        assert_eq!(plain, pretty);
    }

    #[test]
    fn colored_output_emits_ansi() {
        let colored = colorize_value(&sample(), true);
        assert!(colored.contains("\u{1b}["));
        assert!(colored.contains("\u{1b}[36m\"names\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[32m\"alice\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[33m1.0\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[35mtrue\u{1b}[0m"));
    }
}
