use crate::formatter::{FormattedString, MethodDescription};
use conduit_core::catalog::{AppSchema, MethodSchema, Schema, SemanticType};
use std::{collections::BTreeMap, fs, path::Path};

/// Writes `<app>.md` for every app in `schema`, then `index.md`. Returns the file names written.
pub fn generate(output_dir: &Path, schema: &Schema) -> std::io::Result<Vec<String>> {
    // Disable colors for plain text generation
    colored::control::set_override(false);
    let written = write_pages(output_dir, schema);
    // Restore colors
    colored::control::unset_override();
    written
}

fn write_pages(output_dir: &Path, schema: &Schema) -> std::io::Result<Vec<String>> {
    fs::create_dir_all(output_dir)?;

    let mut written = Vec::new();

    for app in schema.apps() {
        let Some(methods) = schema.app(app) else {
            continue;
        };

        let filename = format!("{app}.md");
        fs::write(output_dir.join(&filename), generate_app_file(app, methods))?;
        written.push(filename);
    }

    fs::write(output_dir.join("index.md"), generate_index(schema))?;
    written.push("index.md".to_string());

    Ok(written)
}

fn generate_index(schema: &Schema) -> String {
    let mut out = String::new();

    out.push_str("# Conduit API\n\n");
    out.push_str(&format!(
        "{} methods across {} apps.\n\n",
        schema.len(),
        schema.apps().count()
    ));

    out.push_str("## Apps\n\n");

    let mut empty = true;
    for app in schema.apps() {
        empty = false;
        let count = schema.app(app).map_or(0, AppSchema::len);
        out.push_str(&format!("- [{app}]({app}.md) ({count} methods)\n"));
    }

    if empty {
        out.push_str("*None*\n");
    }

    out
}

fn generate_app_file(app: &str, methods: &AppSchema) -> String {
    let mut out = String::new();

    out.push_str(&format!("# App: `{app}`\n\n"));

    for (name, schema) in methods {
        let full_name = format!("{app}.{name}");

        write_anchor(&mut out, &full_name);
        out.push_str(&format!("## {full_name}\n\n"));
        write_method_content(&mut out, &full_name, schema);
        out.push_str("---\n\n");
    }

    out
}

fn write_anchor(out: &mut String, name: &str) {
    out.push_str(&format!("<a id=\"{}\"></a>\n", name));
}

fn write_method_content(out: &mut String, full_name: &str, schema: &MethodSchema) {
    if let Some(description) = &schema.description {
        out.push_str(description.trim());
        out.push_str("\n\n");
    }

    out.push_str(&format!("**HTTP Verb**: `{}`\n\n", schema.http_verb));
    out.push_str(&format!("**Formats**: `{}`\n\n", schema.formats.join("`, `")));

    out.push_str("### Signature\n\n```text\n");
    out.push_str(
        &FormattedString::from(MethodDescription {
            name: full_name,
            schema,
        })
        .0,
    );
    out.push_str("\n```\n\n");

    out.push_str("### Parameters\n\n");
    if schema.required.is_empty() && schema.optional.is_empty() {
        out.push_str("*None*\n\n");
        return;
    }

    out.push_str("| Name | Type | Required |\n");
    out.push_str("|------|------|----------|\n");
    write_rows(out, &schema.required, "yes");
    write_rows(out, &schema.optional, "no");
    out.push('\n');
}

fn write_rows(out: &mut String, params: &BTreeMap<String, SemanticType>, required: &str) {
    for (name, ty) in params {
        out.push_str(&format!("| `{name}` | `{ty}` | {required} |\n"));
    }
}
