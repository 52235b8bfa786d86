use colored::*;
use conduit_core::{
    catalog::{AppSchema, MethodSchema, SemanticType},
    client::{CallError, ConduitResult, ConfigurationError},
    http::TransportError,
};
use std::{collections::BTreeMap, fmt::Display};

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

pub struct AppList(pub Vec<(String, usize)>);

pub struct MethodList<'a> {
    pub app: &'a str,
    pub methods: &'a AppSchema,
}

pub struct MethodDescription<'a> {
    pub name: &'a str,
    pub schema: &'a MethodSchema,
}

pub struct GenericError<T: Display>(pub &'static str, pub T);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.0)?;
        Ok(())
    }
}

impl From<ConduitResult> for FormattedString {
    fn from(result: ConduitResult) -> Self {
        let value = result.into_inner();
        FormattedString(serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()))
    }
}

impl From<CallError> for FormattedString {
    fn from(err: CallError) -> Self {
        let title = match &err {
            CallError::MissingResource(_) => "Unknown Method:",
            CallError::Validation(_) => "Invalid Arguments:",
            CallError::Transport(_) => "Request Failed:",
            CallError::Api(_) => "Remote API Error:",
            CallError::Protocol(_) => "Unexpected Response:",
        };
        FormattedString(format!("{}\n\n'{}'", title.red().bold(), err))
    }
}

impl From<ConfigurationError> for FormattedString {
    fn from(err: ConfigurationError) -> Self {
        FormattedString(format!(
            "{}\n\n'{}'",
            "Configuration Error:".red().bold(),
            err
        ))
    }
}

impl From<TransportError> for FormattedString {
    fn from(err: TransportError) -> Self {
        FormattedString(format!("{}\n\n'{}'", "Connection Error:".red().bold(), err))
    }
}

impl From<std::io::Error> for FormattedString {
    fn from(err: std::io::Error) -> Self {
        FormattedString(format!(
            "{}\n\n'{}'",
            "Failed to write file:".red().bold(),
            err
        ))
    }
}

impl<T: Display> From<GenericError<T>> for FormattedString {
    fn from(GenericError(msg, err): GenericError<T>) -> Self {
        FormattedString(format!("{}:\n\n'{}'", msg.red().bold(), err))
    }
}

impl From<AppList> for FormattedString {
    fn from(AppList(apps): AppList) -> Self {
        if apps.is_empty() {
            return FormattedString("No apps found.".yellow().to_string());
        }

        let mut out = String::new();
        out.push_str("Available Apps:\n");
        for (app, methods) in apps {
            out.push_str(&format!(
                "  - {} {}\n",
                app.green(),
                format!("({methods} methods)").dimmed()
            ));
        }
        FormattedString(out.trim_end().to_string())
    }
}

impl From<MethodList<'_>> for FormattedString {
    fn from(MethodList { app, methods }: MethodList<'_>) -> Self {
        if methods.is_empty() {
            let message = format!("No methods found for app '{app}'.");
            return FormattedString(message.yellow().to_string());
        }

        let mut out = String::new();
        out.push_str(&format!("Methods of {}:\n", app.cyan().bold()));
        for (name, schema) in methods {
            out.push_str(&format!("  - {}.{}", app, name.green()));
            if let Some(summary) = schema.description.as_deref().and_then(first_line) {
                out.push_str(&format!("  {}", summary.dimmed()));
            }
            out.push('\n');
        }
        FormattedString(out.trim_end().to_string())
    }
}

impl From<MethodDescription<'_>> for FormattedString {
    fn from(MethodDescription { name, schema }: MethodDescription<'_>) -> Self {
        let mut out = String::new();
        out.push_str(&format!("{} {}\n", "method".cyan(), name.green().bold()));

        if let Some(description) = &schema.description {
            out.push('\n');
            for line in description.lines() {
                out.push_str(&format!("  {line}\n"));
            }
        }

        out.push('\n');
        write_params(&mut out, "Required", &schema.required);
        write_params(&mut out, "Optional", &schema.optional);

        if let Some(returns) = &schema.returns {
            out.push_str(&format!("{} {}\n", "Returns:".bold(), returns.yellow()));
        }

        FormattedString(out.trim_end().to_string())
    }
}

fn write_params(out: &mut String, title: &str, params: &BTreeMap<String, SemanticType>) {
    out.push_str(&format!("{}\n", format!("{title}:").bold()));

    if params.is_empty() {
        out.push_str(&format!("  {}\n", "(none)".dimmed()));
    }

    for (name, ty) in params {
        out.push_str(&format!("  {}: {}\n", name, ty.to_string().yellow()));
    }
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}
