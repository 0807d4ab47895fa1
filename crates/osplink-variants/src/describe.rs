use crate::registry::VariantRegistry;
use crate::variant::{Casting, STATUS_REQUEST_BIT};

const WRAP_WIDTH: usize = 65;
const INDENT: &str = "            ";

impl VariantRegistry {
    /// Operator-facing description of the variant at `index`, one entry per
    /// output line.
    pub fn describe(&self, index: usize) -> Vec<String> {
        let Some(variant) = self.get(index) else {
            return Vec::new();
        };
        let mut lines = Vec::new();
        let Some(name) = variant.name.as_deref() else {
            lines.push(format!("TELEGRAM {:02X}: no info on telegram", variant.tid));
            return lines;
        };
        lines.push(format!("TELEGRAM {:02X}: {name}", variant.tid));

        let description = variant.description.as_deref().unwrap_or_default();
        for (i, chunk) in wrap(description, WRAP_WIDTH).into_iter().enumerate() {
            let lead = if i == 0 { "DESCRIPTION:" } else { INDENT };
            lines.push(format!("{lead} {chunk}"));
        }

        let mut casting = Vec::new();
        match variant.casting {
            Casting::Unicast => casting.push("uni"),
            Casting::Serial => casting.push("serial"),
        }
        if variant.supports_broadcast() {
            casting.extend(["multi", "broad"]);
        }
        lines.push(format!("CASTING    : {}", casting.join(" ")));

        let mut payload = format!("PAYLOAD    : {}", variant.sizes);
        if let Some(args) = variant.tele_args.as_deref() {
            payload.push_str(&format!(" ({args})"));
        }
        match variant.resp_args.as_deref() {
            Some(args) if variant.has_response() => {
                payload.push_str(&format!("; response {} ({args})", variant.response_size));
            }
            _ => payload.push_str("; no response"),
        }
        lines.push(payload);

        let twin = &self.variants()[self.slot(variant.tid ^ STATUS_REQUEST_BIT).first];
        let status = if variant.is_status_request() {
            format!("yes (tele {} has none)", twin.label())
        } else if variant.may_have_status_request() && twin.has_info() {
            format!("no (tele {} has sr)", twin.label())
        } else {
            "no (no sr possible)".to_string()
        };
        lines.push(format!("STATUS REQ : {status}"));

        let duplicates: Vec<String> = self
            .slot(variant.tid)
            .indices()
            .filter(|&i| i != index)
            .map(|i| self.variants()[i].label())
            .collect();
        if !duplicates.is_empty() {
            lines.push(format!("DUPLICATE  : {}", duplicates.join(" ")));
        }

        lines
    }
}

/// Greedy word wrap; words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
