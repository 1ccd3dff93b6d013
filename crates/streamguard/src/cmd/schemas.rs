use serde::Serialize;
use streamguard_schema::{CoerceTo, SchemaRegistry};

use crate::cmd::{RegistryArgs, SchemasArgs};
use crate::exit::{CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct SchemaEntry<'a> {
    family: &'a str,
    name: &'a str,
    title: Option<&'a str>,
    array_payload: bool,
    coercions: Vec<String>,
}

pub fn run(args: SchemasArgs, registry: &RegistryArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = registry.load()?;

    if let Some(family) = &args.family {
        if registry.family(family).is_empty() {
            return Err(CliError::new(
                USAGE,
                format!(
                    "unknown family '{family}' (known: {})",
                    registry.families().join(", ")
                ),
            ));
        }
    }

    let entries = collect_entries(&registry, args.family.as_deref());
    match format {
        OutputFormat::Json => print_json(&entries),
        OutputFormat::Table => print_table(
            &["FAMILY", "SCHEMA", "TITLE", "PAYLOAD", "COERCIONS"],
            entries
                .iter()
                .map(|entry| {
                    vec![
                        entry.family.to_string(),
                        entry.name.to_string(),
                        entry.title.unwrap_or("").to_string(),
                        payload_label(entry).to_string(),
                        entry.coercions.join(", "),
                    ]
                })
                .collect(),
        ),
        OutputFormat::Pretty => {
            for entry in &entries {
                println!(
                    "{}/{} ({}) {}",
                    entry.family,
                    entry.name,
                    payload_label(entry),
                    entry.title.unwrap_or("")
                );
            }
        }
    }

    Ok(SUCCESS)
}

fn collect_entries<'a>(registry: &'a SchemaRegistry, only: Option<&str>) -> Vec<SchemaEntry<'a>> {
    registry
        .families()
        .into_iter()
        .filter(|family| only.is_none_or(|only| only == *family))
        .flat_map(|family| {
            registry.family(family).iter().map(move |schema| SchemaEntry {
                family,
                name: schema.name(),
                title: schema.title(),
                array_payload: schema.expects_array(),
                coercions: schema
                    .coercions()
                    .iter()
                    .map(|coercion| {
                        let target = match coercion.target {
                            CoerceTo::Number => "number",
                            CoerceTo::String => "string",
                        };
                        format!("{}->{target}", coercion.field)
                    })
                    .collect(),
            })
        })
        .collect()
}

fn payload_label(entry: &SchemaEntry<'_>) -> &'static str {
    if entry.array_payload {
        "array"
    } else {
        "object"
    }
}
