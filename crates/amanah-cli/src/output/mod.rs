use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::OutputFormat;

pub mod table;

use table::{TableOptions, render_entity_table};

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value, TableOptions::detect()),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn render_table<T: Serialize>(value: &T, options: TableOptions) -> anyhow::Result<String> {
    let value = serde_json::to_value(value)?;
    Ok(match value {
        Value::Array(items) => render_array_table(&items, options),
        Value::Object(map) => render_object_table(map, options),
        scalar => render_entity_table(&["value"], &[vec![value_to_cell(&scalar)]], options),
    })
}

/// Scalars become key/value rows keyed by dotted path. Arrays of objects
/// (entry lines, statement rows) get their own table titled by that path.
fn render_object_table(map: Map<String, Value>, options: TableOptions) -> String {
    let mut scalars = Vec::new();
    let mut sections = Vec::new();
    flatten_object("", map, &mut scalars, &mut sections);

    let mut blocks = Vec::with_capacity(1 + sections.len());
    if !scalars.is_empty() {
        scalars.sort_by(|a, b| a[0].cmp(&b[0]));
        blocks.push(render_entity_table(&["key", "value"], &scalars, options));
    }
    for (title, items) in sections {
        blocks.push(format!("{title}\n{}", render_array_table(&items, options)));
    }
    blocks.join("\n\n")
}

fn flatten_object(
    prefix: &str,
    map: Map<String, Value>,
    scalars: &mut Vec<Vec<String>>,
    sections: &mut Vec<(String, Vec<Value>)>,
) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) => flatten_object(&path, inner, scalars, sections),
            Value::Array(items) if items.is_empty() || items.iter().any(Value::is_object) => {
                sections.push((path, items));
            }
            other => scalars.push(vec![path, value_to_cell(&other)]),
        }
    }
}

fn render_array_table(items: &[Value], options: TableOptions) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    let all_objects = items.iter().all(Value::is_object);
    if !all_objects {
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return render_entity_table(&["value"], &rows, options);
    }

    // Nested arrays (entry lines) are left to `entry get`.
    let mut headers = Vec::<String>::new();
    for item in items {
        if let Some(map) = item.as_object() {
            for (key, value) in map {
                if !value.is_array() && !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }
    }

    if headers.is_empty() {
        return String::from("(no columns)");
    }

    headers.sort();

    let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| {
                    map.get(header)
                        .map_or_else(|| String::from("-"), value_to_cell)
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    render_entity_table(&header_refs, &rows, options)
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}
