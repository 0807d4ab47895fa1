use osplink::variants::{TelegramVariant, VariantRegistry, TID_COUNT};
use serde::Serialize;

use crate::cmd::{Globals, InfoArgs};
use crate::exit::{CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Serialize)]
struct VariantRow<'a> {
    tid: String,
    name: &'a str,
    casting: String,
    payload: String,
    response: u8,
    args: Option<&'a str>,
}

impl<'a> VariantRow<'a> {
    fn new(variant: &'a TelegramVariant) -> Self {
        Self {
            tid: format!("{:02X}", variant.tid),
            name: variant.display_name(),
            casting: casting(variant),
            payload: variant.sizes.to_string(),
            response: variant.response_size,
            args: variant.tele_args.as_deref(),
        }
    }

    fn cells(&self) -> [String; 5] {
        [
            self.tid.clone(),
            self.name.to_string(),
            self.casting.clone(),
            self.payload.clone(),
            self.response.to_string(),
        ]
    }
}

fn casting(variant: &TelegramVariant) -> String {
    let mut casting = format!("{:?}", variant.casting).to_lowercase();
    if variant.supports_broadcast() {
        casting.push_str("+broad");
    }
    casting
}

pub fn run(args: InfoArgs, globals: &Globals, variants: &VariantRegistry) -> CliResult<i32> {
    let indices: Vec<usize> = match args.tele.as_deref() {
        Some(key) => variants.resolve(key, TID_COUNT),
        None => variants.named().map(|(index, _)| index).collect(),
    };
    if indices.is_empty() {
        let key = args.tele.unwrap_or_default();
        return Err(CliError::new(FAILURE, format!("no telegram matches '{key}'")));
    }

    match globals.format {
        OutputFormat::Json => {
            let rows: Vec<VariantRow<'_>> = indices
                .iter()
                .filter_map(|&i| variants.get(i))
                .map(VariantRow::new)
                .collect();
            print_json(&rows);
        }
        OutputFormat::Table => {
            let rows = indices
                .iter()
                .filter_map(|&i| variants.get(i))
                .map(|v| VariantRow::new(v).cells())
                .collect();
            print_table(["TID", "NAME", "CASTING", "PAYLOAD", "RESPONSE"], rows);
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            // a filtered listing is described in full
            let detailed = args.tele.is_some();
            for &index in &indices {
                if detailed {
                    for line in variants.describe(index) {
                        println!("{line}");
                    }
                } else if let Some(variant) = variants.get(index) {
                    println!("{}", variant.label());
                }
            }
        }
    }
    Ok(SUCCESS)
}
