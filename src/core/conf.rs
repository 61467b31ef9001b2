// Config file parsing and rendering: one `key = token token ...` per line.
//
// `#` starts a comment anywhere in a line. A value beginning with `"` is a
// single uncoerced text token up to the closing quote. Repeated keys extend
// the key's sequence in file order. Lines without `=` are skipped by
// default; `Malformed::Fail` surfaces them as Parse errors instead.
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::core::error::{Error, ErrorKind, io_error_kind};
use crate::core::value::Value;

pub type ConfMap = BTreeMap<String, Value>;

/// Policy for lines that carry no assignment.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Malformed {
    #[default]
    Skip,
    Fail,
}

#[derive(Clone, Debug, Default)]
pub struct ConfOptions {
    /// Collapse multi-token sequences to their final token.
    pub strip_to_last: bool,
    pub malformed: Malformed,
    /// Merged in for keys the file does not define.
    pub defaults: ConfMap,
}

impl ConfOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A malformed line the parser skipped under `Malformed::Skip`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SkippedLine {
    pub line: u64,
    pub text: String,
}

#[derive(Clone, Debug)]
pub struct ParseReport {
    pub map: ConfMap,
    pub skipped: Vec<SkippedLine>,
}

pub fn read_conf(path: impl AsRef<Path>, options: &ConfOptions) -> Result<ConfMap, Error> {
    Ok(read_conf_report(path, options)?.map)
}

pub fn read_conf_report(
    path: impl AsRef<Path>,
    options: &ConfOptions,
) -> Result<ParseReport, Error> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|err| Error::new(io_error_kind(&err)).with_path(path).with_source(err))?;
    parse_conf_report(&text, options).map_err(|err| err.with_path(path))
}

pub fn parse_conf(text: &str, options: &ConfOptions) -> Result<ConfMap, Error> {
    Ok(parse_conf_report(text, options)?.map)
}

pub fn parse_conf_report(text: &str, options: &ConfOptions) -> Result<ParseReport, Error> {
    let mut sequences: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    let mut skipped = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx as u64 + 1;
        let line = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parsed = line.split_once('=').and_then(|(key, rest)| {
            let key = key.trim();
            if key.is_empty() {
                None
            } else {
                Some((key, rest.trim()))
            }
        });
        let Some((key, rest)) = parsed else {
            match options.malformed {
                Malformed::Skip => {
                    skipped.push(SkippedLine {
                        line: line_no,
                        text: line.to_string(),
                    });
                    continue;
                }
                Malformed::Fail => {
                    return Err(Error::new(ErrorKind::Parse)
                        .with_message("line has no assignment")
                        .with_line(line_no)
                        .with_hint("Expected `key = value ...`; prefix remarks with `#`."));
                }
            }
        };

        sequences.entry(key.to_string()).or_default().extend(tokenize(rest));
    }

    let mut map = ConfMap::new();
    for (key, tokens) in sequences {
        map.insert(key, shape(tokens, options.strip_to_last));
    }
    for (key, value) in &options.defaults {
        if !map.contains_key(key) {
            map.insert(key.clone(), value.clone());
        }
    }

    Ok(ParseReport { map, skipped })
}

/// Split value text into coerced tokens. A leading `"` makes everything up
/// to the closing quote one text token; anything after it is ignored, which
/// mirrors how quoted values have always behaved in these files.
fn tokenize(rest: &str) -> Vec<Value> {
    if let Some(quoted) = rest.strip_prefix('"') {
        let content = match quoted.find('"') {
            Some(end) => &quoted[..end],
            None => quoted,
        };
        return vec![Value::Text(content.to_string())];
    }
    if rest.is_empty() {
        return vec![Value::Text(String::new())];
    }
    rest.split_whitespace().map(Value::coerce).collect()
}

fn shape(mut tokens: Vec<Value>, strip_to_last: bool) -> Value {
    if tokens.len() == 1 {
        return tokens.remove(0);
    }
    if strip_to_last {
        return tokens.pop().unwrap_or(Value::Text(String::new()));
    }
    Value::List(tokens)
}

/// Render a mapping back to config text, one key per line in key order.
///
/// Text tokens that would re-coerce (or that contain whitespace, `#`, or
/// `"`) are emitted quoted, so `parse_conf(render_conf(map))` returns the
/// same mapping for everything the parser itself can produce. Text
/// containing a double quote is the one shape this format cannot represent.
pub fn render_conf(map: &ConfMap) -> String {
    let mut out = String::new();
    for (key, value) in map {
        out.push_str(key);
        out.push_str(" = ");
        out.push_str(&render_tokens(value));
        out.push('\n');
    }
    out
}

pub fn write_conf(path: impl AsRef<Path>, map: &ConfMap) -> Result<(), Error> {
    let path = path.as_ref();
    fs::write(path, render_conf(map))
        .map_err(|err| Error::new(io_error_kind(&err)).with_path(path).with_source(err))
}

fn render_tokens(value: &Value) -> String {
    match value {
        Value::List(items) => items
            .iter()
            .map(render_tokens)
            .collect::<Vec<_>>()
            .join(" "),
        Value::Text(text) => {
            if needs_quoting(text) {
                format!("\"{text}\"")
            } else {
                text.clone()
            }
        }
        other => other.to_string(),
    }
}

fn needs_quoting(text: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    if text.chars().any(|ch| ch.is_whitespace() || ch == '#' || ch == '"') {
        return true;
    }
    !matches!(Value::coerce(text), Value::Text(_))
}

#[cfg(test)]
mod tests {
    use super::{ConfOptions, Malformed, parse_conf, parse_conf_report, render_conf};
    use crate::core::error::ErrorKind;
    use crate::core::value::Value;

    #[test]
    fn single_token_becomes_scalar() {
        let map = parse_conf("width = 10\n", &ConfOptions::new()).expect("parse");
        assert_eq!(map.get("width"), Some(&Value::Number(10.0)));
    }

    #[test]
    fn multi_token_becomes_list_unless_stripped() {
        let text = "names = alice bob carol\n";
        let map = parse_conf(text, &ConfOptions::new()).expect("parse");
        assert_eq!(
            map.get("names"),
            Some(&Value::List(vec![
                Value::Text("alice".to_string()),
                Value::Text("bob".to_string()),
                Value::Text("carol".to_string()),
            ]))
        );

        let mut options = ConfOptions::new();
        options.strip_to_last = true;
        let map = parse_conf(text, &options).expect("parse");
        assert_eq!(map.get("names"), Some(&Value::Text("carol".to_string())));
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let text = "# run settings\n\nwidth = 10 # columns\n   \n";
        let map = parse_conf(text, &ConfOptions::new()).expect("parse");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("width"), Some(&Value::Number(10.0)));
    }

    #[test]
    fn quoted_value_is_one_uncoerced_token() {
        let map = parse_conf("label = \"run 10\"\n", &ConfOptions::new()).expect("parse");
        assert_eq!(map.get("label"), Some(&Value::Text("run 10".to_string())));

        let map = parse_conf("version = \"10\"\n", &ConfOptions::new()).expect("parse");
        assert_eq!(map.get("version"), Some(&Value::Text("10".to_string())));
    }

    #[test]
    fn repeated_keys_accumulate_in_order() {
        let text = "run = 1\nrun = 2 3\n";
        let map = parse_conf(text, &ConfOptions::new()).expect("parse");
        assert_eq!(
            map.get("run"),
            Some(&Value::List(vec![
                Value::Number(1.0),
                Value::Number(2.0),
                Value::Number(3.0),
            ]))
        );
    }

    #[test]
    fn malformed_lines_skip_or_fail() {
        let text = "width = 10\njust words\n";
        let report = parse_conf_report(text, &ConfOptions::new()).expect("parse");
        assert_eq!(report.map.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].line, 2);
        assert_eq!(report.skipped[0].text, "just words");

        let mut options = ConfOptions::new();
        options.malformed = Malformed::Fail;
        let err = parse_conf(text, &options).expect_err("should fail");
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn empty_key_is_malformed() {
        let report = parse_conf_report(" = 10\n", &ConfOptions::new()).expect("parse");
        assert!(report.map.is_empty());
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn defaults_fill_missing_keys_only() {
        let mut options = ConfOptions::new();
        options.defaults.insert("width".to_string(), Value::Number(80.0));
        options.defaults.insert("mode".to_string(), Value::Text("fast".to_string()));
        let map = parse_conf("width = 10\n", &options).expect("parse");
        assert_eq!(map.get("width"), Some(&Value::Number(10.0)));
        assert_eq!(map.get("mode"), Some(&Value::Text("fast".to_string())));
    }

    #[test]
    fn render_round_trips_parsed_mappings() {
        let text = "width = 10\nnames = alice bob carol\nflag = true\nversion = \"10\"\nlabel = \"two words\"\n";
        let options = ConfOptions::new();
        let first = parse_conf(text, &options).expect("parse");
        let rendered = render_conf(&first);
        let second = parse_conf(&rendered, &options).expect("reparse");
        assert_eq!(first, second);
    }
}
