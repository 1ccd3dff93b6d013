use serde::Serialize;
use serde_json::Value;
use streamguard_classify::{classify, classify_all, classify_payload, MessageKind};

use crate::cmd::{read_input, ClassifyArgs, RegistryArgs};
use crate::exit::{schema_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{preview, print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct ClassifiedFrame {
    line: usize,
    kind: Option<MessageKind>,
    matches: Vec<MessageKind>,
    payload_family: Option<&'static str>,
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(args: ClassifyArgs, registry: &RegistryArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = registry.load()?;
    let schema = args
        .schema
        .as_deref()
        .map(|name| registry.require(name))
        .transpose()
        .map_err(|err| schema_error("unknown schema", err))?;

    let input = read_input(&args.input)?;
    let text = std::str::from_utf8(&input)
        .map_err(|err| CliError::new(USAGE, format!("input is not UTF-8: {err}")))?;

    let mut frames = Vec::new();
    let mut unparseable = 0usize;
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(line = index + 1, error = %err, "skipping frame that is not JSON");
                unparseable += 1;
                frames.push(ClassifiedFrame {
                    line: index + 1,
                    kind: None,
                    matches: Vec::new(),
                    payload_family: None,
                    correlation_id: None,
                    error: Some(err.to_string()),
                });
                continue;
            }
        };

        frames.push(ClassifiedFrame {
            line: index + 1,
            kind: classify(&value),
            matches: classify_all(&value),
            payload_family: schema
                .and_then(|schema| classify_payload(&value, schema, &registry))
                .map(|family| family.as_str()),
            correlation_id: value
                .get("uuid")
                .and_then(Value::as_str)
                .map(str::to_string),
            error: None,
        });
    }

    print_frames(&frames, format);
    Ok(if unparseable == 0 { SUCCESS } else { DATA_INVALID })
}

fn print_frames(frames: &[ClassifiedFrame], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&frames),
        OutputFormat::Table => print_table(
            &["LINE", "KIND", "MATCHES", "FAMILY", "UUID"],
            frames
                .iter()
                .map(|frame| {
                    vec![
                        frame.line.to_string(),
                        kind_label(frame),
                        join_kinds(&frame.matches),
                        frame.payload_family.unwrap_or("").to_string(),
                        frame.correlation_id.clone().unwrap_or_default(),
                    ]
                })
                .collect(),
        ),
        OutputFormat::Pretty => {
            for frame in frames {
                println!(
                    "line={} kind={} matches=[{}] uuid={}",
                    frame.line,
                    kind_label(frame),
                    join_kinds(&frame.matches),
                    frame.correlation_id.as_deref().unwrap_or("-")
                );
            }
        }
    }
}

fn kind_label(frame: &ClassifiedFrame) -> String {
    match (&frame.kind, &frame.error) {
        (Some(kind), _) => kind.to_string(),
        (None, Some(err)) => format!("invalid json: {}", preview(err, 60)),
        (None, None) => "unrecognized".to_string(),
    }
}

fn join_kinds(kinds: &[MessageKind]) -> String {
    kinds
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
