use serde::Serialize;
use serde_json::Value;
use streamguard_envelope::{self as envelope, EnvelopeError, Rejection};

use crate::cmd::{read_input, EnvelopeKind, RegistryArgs, ValidateArgs};
use crate::exit::{envelope_error, schema_error, CliResult, SUCCESS};
use crate::output::{preview, print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct ValidateOutput {
    valid: bool,
    envelope: &'static str,
    schema: String,
    family: Option<String>,
    correlation_id: Option<String>,
    items: usize,
    rejection: Option<String>,
}

pub fn run(args: ValidateArgs, registry: &RegistryArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = registry.load()?;
    let schema = registry
        .require(&args.schema)
        .map_err(|err| schema_error("unknown schema", err))?;
    let frame = read_input(&args.input)?;

    // Lenient runs record the rejection and report it; strict runs fail.
    let lenient = args.lenient;
    let mut rejection = None;
    let mut record = |reason: Rejection| -> Result<(), EnvelopeError> {
        if !lenient {
            return Err(EnvelopeError::Rejected(reason));
        }
        rejection = Some(reason.to_string());
        Ok(())
    };

    let accepted = match args.envelope {
        EnvelopeKind::Snapshot => envelope::snapshot::<Value, _>(
            &frame,
            schema,
            |reason: Rejection| -> Result<Option<_>, EnvelopeError> {
                record(reason)?;
                Ok(None)
            },
        )
        .map(|env| env.map(|env| (env.correlation_id, env.snapshot.len()))),
        EnvelopeKind::Data => envelope::data::<Value, _>(
            &frame,
            schema,
            |reason: Rejection| -> Result<Option<_>, EnvelopeError> {
                record(reason)?;
                Ok(None)
            },
        )
        .map(|env| env.map(|env| (env.correlation_id, env.data.len()))),
    }
    .map_err(|err| envelope_error("validation failed", err))?;

    let out = ValidateOutput {
        valid: accepted.is_some(),
        envelope: match args.envelope {
            EnvelopeKind::Snapshot => "snapshot",
            EnvelopeKind::Data => "data",
        },
        schema: schema.name().to_string(),
        family: registry.family_of(schema).map(str::to_string),
        items: accepted.as_ref().map_or(0, |(_, items)| *items),
        correlation_id: accepted.map(|(id, _)| id),
        rejection,
    };

    print_report(&out, format);
    Ok(SUCCESS)
}

fn print_report(out: &ValidateOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => print_table(
            &["VALID", "ENVELOPE", "SCHEMA", "FAMILY", "UUID", "ITEMS", "REJECTION"],
            vec![vec![
                out.valid.to_string(),
                out.envelope.to_string(),
                out.schema.clone(),
                out.family.clone().unwrap_or_default(),
                out.correlation_id.clone().unwrap_or_default(),
                out.items.to_string(),
                out.rejection
                    .as_deref()
                    .map(|r| preview(r, 120))
                    .unwrap_or_default(),
            ]],
        ),
        OutputFormat::Pretty => {
            if out.valid {
                println!(
                    "valid {} envelope: uuid={} items={} schema={}",
                    out.envelope,
                    out.correlation_id.as_deref().unwrap_or(""),
                    out.items,
                    out.schema
                );
            } else {
                println!(
                    "rejected {} envelope (schema={}):\n{}",
                    out.envelope,
                    out.schema,
                    out.rejection.as_deref().unwrap_or("")
                );
            }
        }
    }
}
