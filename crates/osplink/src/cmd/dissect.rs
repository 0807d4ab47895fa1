use osplink::frame::{dissect, hex_bytes, Field};
use osplink::variants::{ValidationContext, VariantRegistry};
use serde::Serialize;

use crate::cmd::{DissectArgs, Globals};
use crate::exit::{CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct FieldOutput<'a> {
    name: &'a str,
    value: &'a str,
    note: &'a str,
}

#[derive(Serialize)]
struct DissectOutput<'a> {
    telegram: String,
    checksum: &'static str,
    fields: Vec<FieldOutput<'a>>,
    findings: Vec<String>,
    valid: bool,
}

pub fn run(args: DissectArgs, globals: &Globals, variants: &VariantRegistry) -> CliResult<i32> {
    let bytes = parse_bytes(&args.bytes)?;
    let fields: Vec<Field> = dissect(&bytes, globals.checksum)
        .map(|d| d.fields())
        .unwrap_or_default();
    let ctx = ValidationContext {
        checksum: globals.checksum,
        ..ValidationContext::default()
    };
    let findings: Vec<String> = variants
        .validate(&bytes, &ctx)
        .iter()
        .map(ToString::to_string)
        .collect();

    match globals.format {
        OutputFormat::Json => print_json(&DissectOutput {
            telegram: hex_bytes(&bytes),
            checksum: globals.checksum.as_str(),
            fields: fields
                .iter()
                .map(|f| FieldOutput {
                    name: f.name,
                    value: &f.value,
                    note: &f.note,
                })
                .collect(),
            findings: findings.clone(),
            valid: findings.is_empty(),
        }),
        OutputFormat::Table => {
            if !fields.is_empty() {
                let rows = fields
                    .iter()
                    .map(|f| [f.name.to_string(), f.value.clone(), f.note.clone()])
                    .collect();
                print_table(["FIELD", "VALUE", "NOTE"], rows);
            }
            print_findings(&findings);
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for f in &fields {
                println!("{:<9}{:<24}{}", f.name, f.value, f.note);
            }
            print_findings(&findings);
        }
    }

    if findings.is_empty() {
        Ok(SUCCESS)
    } else {
        Ok(DATA_INVALID)
    }
}

fn print_findings(findings: &[String]) {
    if findings.is_empty() {
        println!("valid");
    }
    for finding in findings {
        println!("warning: {finding}");
    }
}

/// Accepts `A0`, `a0` and `0xA0`; each argument is one byte.
fn parse_bytes(args: &[String]) -> CliResult<Vec<u8>> {
    args.iter()
        .map(|arg| {
            let digits = arg
                .strip_prefix("0x")
                .or_else(|| arg.strip_prefix("0X"))
                .unwrap_or(arg);
            if digits.is_empty() || digits.len() > 2 {
                return Err(CliError::new(USAGE, format!("'{arg}' is not a hex byte")));
            }
            u8::from_str_radix(digits, 16)
                .map_err(|_| CliError::new(USAGE, format!("'{arg}' is not a hex byte")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_hex_bytes_in_any_case() {
        let bytes = parse_bytes(&strings(&["A0", "0x04", "c2", "f"])).unwrap();
        assert_eq!(bytes, vec![0xA0, 0x04, 0xC2, 0x0F]);
    }

    #[test]
    fn rejects_non_hex_and_overlong_arguments() {
        let err = parse_bytes(&strings(&["A0", "zz"])).unwrap_err();
        assert_eq!(err.code, USAGE);
        assert!(err.message.contains("'zz'"));

        let err = parse_bytes(&strings(&["A00"])).unwrap_err();
        assert_eq!(err.code, USAGE);
    }
}
