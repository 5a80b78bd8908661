//! Output rendering: JSON, YAML or tables, with optional JMESPath filtering

use anyhow::{Context, Result};
use comfy_table::Table;
use jpx_core::Runtime;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;

use crate::cli;

/// Global JMESPath runtime with extended functions
static JMESPATH_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Get or initialize the JMESPath runtime with extended functions
pub fn get_jmespath_runtime() -> &'static Runtime {
    JMESPATH_RUNTIME.get_or_init(|| Runtime::builder().with_all_extensions().build())
}

/// Normalize backtick literals in JMESPath expressions.
///
/// JMESPath allows elided quotes in backtick literals, so `` `foo` `` means
/// `` `"foo"` ``. The compiler wants valid JSON inside backticks, so bare
/// strings are quoted here. Numbers, booleans, null and already quoted
/// strings pass through unchanged.
fn normalize_backtick_literals(query: &str) -> String {
    static BACKTICK_RE: OnceLock<Regex> = OnceLock::new();
    let re = BACKTICK_RE.get_or_init(|| Regex::new(r"`([^`\\]*(?:\\.[^`\\]*)*)`").unwrap());

    re.replace_all(query, |caps: &regex::Captures| {
        let content = &caps[1];
        let trimmed = content.trim();

        if serde_json::from_str::<Value>(trimmed).is_ok() {
            format!("`{}`", content)
        } else {
            let escaped = trimmed.replace('\\', "\\\\").replace('"', "\\\"");
            format!("`\"{}\"`", escaped)
        }
    })
    .into_owned()
}

/// Compile a JMESPath expression using the extended runtime.
pub fn compile_jmespath(
    query: &str,
) -> Result<jpx_core::Expression<'static>, jpx_core::JmespathError> {
    let normalized = normalize_backtick_literals(query);
    get_jmespath_runtime().compile(&normalized)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

impl From<cli::OutputFormat> for OutputFormat {
    fn from(format: cli::OutputFormat) -> Self {
        match format {
            cli::OutputFormat::Auto | cli::OutputFormat::Json => OutputFormat::Json,
            cli::OutputFormat::Yaml => OutputFormat::Yaml,
            cli::OutputFormat::Table => OutputFormat::Table,
        }
    }
}

/// Column layout used when a resource is printed as a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableView {
    Users,
    Projects,
    ProjectTypes,
    Providers,
}

const USER_COLUMNS: &[&str] = &["User ID", "Role", "Tags"];

const PROJECT_COLUMNS: &[&str] = &[
    "Project ID",
    "Name",
    "Type",
    "Resource Group",
    "Subscription",
    "Region",
    "Tags",
    "Properties",
];

const PROJECT_TYPE_COLUMNS: &[&str] = &[
    "Project Type ID",
    "Default",
    "Region",
    "Subscriptions",
    "Subscription Capacity",
    "Resource Group Prefix",
    "Providers",
    "Tags",
    "Properties",
];

const PROVIDER_COLUMNS: &[&str] = &[
    "Provider ID",
    "Url",
    "Code",
    "Optional",
    "Dependencies (Create)",
    "Dependencies (Init)",
    "Events",
    "Properties",
];

const MASKED_CODE: &str = "************";

impl TableView {
    fn columns(&self) -> &'static [&'static str] {
        match self {
            TableView::Users => USER_COLUMNS,
            TableView::Projects => PROJECT_COLUMNS,
            TableView::ProjectTypes => PROJECT_TYPE_COLUMNS,
            TableView::Providers => PROVIDER_COLUMNS,
        }
    }

    fn row(&self, item: &Value) -> Vec<String> {
        match self {
            TableView::Users => vec![
                text(&item["id"]),
                text(&item["role"]),
                key_values(&item["tags"]),
            ],
            TableView::Projects => {
                let group = &item["resourceGroup"];
                vec![
                    text(&item["id"]),
                    text(&item["name"]),
                    text(&item["type"]["id"]),
                    text(&group["resourceGroupName"]),
                    text(&group["subscriptionId"]),
                    text(&group["region"]),
                    key_values(&item["tags"]),
                    key_values(&item["properties"]),
                ]
            }
            TableView::ProjectTypes => vec![
                text(&item["id"]),
                text(&item["default"]),
                text(&item["region"]),
                lines(&item["subscriptions"]),
                text(&item["subscriptionCapacity"]),
                text(&item["resourceGroupNamePrefix"]),
                provider_ids(&item["providers"]),
                key_values(&item["tags"]),
                key_values(&item["properties"]),
            ],
            TableView::Providers => vec![
                text(&item["id"]),
                text(&item["url"]),
                MASKED_CODE.to_string(),
                text(&item["optional"]),
                lines(&item["dependencies"]["create"]),
                lines(&item["dependencies"]["init"]),
                lines(&item["events"]),
                key_values(&item["properties"]),
            ],
        }
    }

    /// Build a table for one resource or a list of them
    pub fn table(&self, value: &Value) -> Table {
        let mut table = Table::new();
        table.set_header(self.columns().to_vec());

        match value {
            Value::Array(items) => {
                for item in items {
                    table.add_row(self.row(item));
                }
            }
            Value::Null => {}
            item => {
                table.add_row(self.row(item));
            }
        }

        table
    }
}

pub fn print_output<T: Serialize>(
    data: T,
    format: OutputFormat,
    query: Option<&str>,
) -> Result<()> {
    print_output_with_view(data, format, query, None)
}

/// Print data, using `view` for the table layout when no query reshapes it
pub fn print_output_with_view<T: Serialize>(
    data: T,
    format: OutputFormat,
    query: Option<&str>,
    view: Option<TableView>,
) -> Result<()> {
    let mut json_value = serde_json::to_value(data)?;

    if let Some(query_str) = query {
        let expr = compile_jmespath(query_str)
            .with_context(|| format!("Invalid JMESPath expression: {}", query_str))?;
        json_value = expr.search(&json_value).context("JMESPath query failed")?;
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json_value)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&json_value)?);
        }
        OutputFormat::Table => match view.filter(|_| query.is_none()) {
            Some(view) => println!("{}", view.table(&json_value)),
            None => print_as_table(&json_value)?,
        },
    }

    Ok(())
}

fn print_as_table(value: &Value) -> Result<()> {
    match value {
        Value::Array(arr) if !arr.is_empty() => {
            let mut table = Table::new();

            if let Value::Object(first) = &arr[0] {
                let headers: Vec<String> = first.keys().cloned().collect();
                table.set_header(&headers);

                for item in arr {
                    if let Value::Object(obj) = item {
                        let row: Vec<String> = headers
                            .iter()
                            .map(|h| format_value(obj.get(h).unwrap_or(&Value::Null)))
                            .collect();
                        table.add_row(row);
                    }
                }
            } else {
                table.set_header(vec!["Value"]);
                for item in arr {
                    table.add_row(vec![format_value(item)]);
                }
            }

            println!("{}", table);
        }
        Value::Object(obj) => {
            let mut table = Table::new();
            table.set_header(vec!["Key", "Value"]);

            for (key, val) in obj {
                table.add_row(vec![key.clone(), format_value(val)]);
            }

            println!("{}", table);
        }
        _ => {
            println!("{}", format_value(value));
        }
    }

    Ok(())
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

/// Scalar cell; missing values render empty
fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => format_value(other),
    }
}

/// One list element per line
fn lines(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(text).collect::<Vec<_>>().join("\n"),
        other => text(other),
    }
}

/// `key=value` per line, sorted by key
fn key_values(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut pairs: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}={}", k, text(v)))
                .collect();
            pairs.sort();
            pairs.join("\n")
        }
        other => text(other),
    }
}

fn provider_ids(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|p| text(&p["id"]))
            .collect::<Vec<_>>()
            .join("\n"),
        other => text(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_backtick_unquoted_string() {
        assert_eq!(
            normalize_backtick_literals(r#"[?role==`Admin`]"#),
            r#"[?role==`"Admin"`]"#
        );
    }

    #[test]
    fn test_normalize_backtick_keeps_json_literals() {
        assert_eq!(
            normalize_backtick_literals(r#"[?name==`"foo"`]"#),
            r#"[?name==`"foo"`]"#
        );
        assert_eq!(
            normalize_backtick_literals(r#"[?capacity==`10`]"#),
            r#"[?capacity==`10`]"#
        );
        assert_eq!(
            normalize_backtick_literals(r#"[?default==`true`]"#),
            r#"[?default==`true`]"#
        );
        assert_eq!(
            normalize_backtick_literals(r#"[?region==`null`]"#),
            r#"[?region==`null`]"#
        );
    }

    #[test]
    fn test_normalize_multiple_backticks() {
        assert_eq!(
            normalize_backtick_literals(r#"[?role==`Owner` && userType==`User`]"#),
            r#"[?role==`"Owner"` && userType==`"User"`]"#
        );
    }

    #[test]
    fn test_jmespath_filter_compiles_and_runs() {
        let expr = compile_jmespath(r#"[?role==`Admin`].id | [0]"#).unwrap();
        let data = json!([
            { "id": "u-1", "role": "Creator" },
            { "id": "u-2", "role": "Admin" }
        ]);
        let result = expr.search(&data).unwrap();
        assert_eq!(result, json!("u-2"));
    }

    #[test]
    fn test_auto_maps_to_json() {
        assert_eq!(OutputFormat::from(cli::OutputFormat::Auto), OutputFormat::Json);
        assert_eq!(OutputFormat::from(cli::OutputFormat::Table), OutputFormat::Table);
    }

    #[test]
    fn test_user_row() {
        let row = TableView::Users.row(&json!({
            "id": "u-1",
            "role": "Admin",
            "tags": { "team": "blue", "env": "dev" }
        }));
        assert_eq!(row, vec!["u-1", "Admin", "env=dev\nteam=blue"]);
    }

    #[test]
    fn test_project_row_flattens_type_and_resource_group() {
        let row = TableView::Projects.row(&json!({
            "id": "p-1",
            "name": "contoso-web",
            "type": { "id": "azure.default" },
            "resourceGroup": {
                "resourceGroupName": "tc_contoso-web",
                "subscriptionId": "s-1",
                "region": "eastus"
            }
        }));
        assert_eq!(
            row,
            vec!["p-1", "contoso-web", "azure.default", "tc_contoso-web", "s-1", "eastus", "", ""]
        );
    }

    #[test]
    fn test_project_type_row_joins_lists() {
        let row = TableView::ProjectTypes.row(&json!({
            "id": "azure.default",
            "default": true,
            "subscriptions": ["a", "b", "c"],
            "subscriptionCapacity": 10,
            "providers": [{ "id": "azure.devops" }, { "id": "github.repos" }]
        }));
        assert_eq!(row[1], "true");
        assert_eq!(row[3], "a\nb\nc");
        assert_eq!(row[4], "10");
        assert_eq!(row[6], "azure.devops\ngithub.repos");
    }

    #[test]
    fn test_provider_row_masks_code() {
        let row = TableView::Providers.row(&json!({
            "id": "azure.devops",
            "authCode": "c2VjcmV0",
            "dependencies": { "create": ["azure.rm"], "init": [] },
            "events": ["github.repos"]
        }));
        assert_eq!(row[2], MASKED_CODE);
        assert!(!row.iter().any(|cell| cell.contains("c2VjcmV0")));
        assert_eq!(row[4], "azure.rm");
        assert_eq!(row[6], "github.repos");
    }

    #[test]
    fn test_view_table_accepts_single_item() {
        let table = TableView::Users.table(&json!({ "id": "u-1", "role": "Creator" }));
        let rendered = table.to_string();
        assert!(rendered.contains("User ID"));
        assert!(rendered.contains("u-1"));
    }
}
