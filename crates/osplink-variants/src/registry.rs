use std::collections::HashSet;
use std::path::Path;

use osplink_frame::is_legal_payload_size;
use tracing::debug;

use crate::error::{Result, VariantError};
use crate::table::builtin_variants;
use crate::variant::{SizeMask, TelegramVariant};

/// Number of telegram identifiers (7 bits).
pub const TID_COUNT: usize = 128;

/// Where the variants of one tid live in the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TidSlot {
    /// Index of the first variant with this tid.
    pub first: usize,
    /// Number of variants with this tid (at least one in a checked table).
    pub count: usize,
}

impl TidSlot {
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.first..self.first + self.count
    }
}

/// The variant chosen from a list of candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    /// Remaining candidates, in table order.
    pub alternates: Vec<usize>,
}

/// Checked telegram knowledge base with a tid index.
#[derive(Debug, Clone)]
pub struct VariantRegistry {
    variants: Vec<TelegramVariant>,
    slots: [TidSlot; TID_COUNT],
}

impl VariantRegistry {
    /// Check `variants` and build the tid index.
    ///
    /// The table must be ordered by tid, cover 00..7F without gaps, and
    /// every row must be either fully described or fully empty.
    pub fn new(variants: Vec<TelegramVariant>) -> Result<Self> {
        check_table(&variants)?;

        let mut slots = [TidSlot::default(); TID_COUNT];
        for (index, variant) in variants.iter().enumerate() {
            let slot = &mut slots[usize::from(variant.tid)];
            if slot.count == 0 {
                slot.first = index;
            }
            slot.count += 1;
        }

        debug!(
            variants = variants.len(),
            named = variants.iter().filter(|v| v.has_info()).count(),
            "telegram knowledge base checked"
        );
        Ok(Self { variants, slots })
    }

    /// Registry over the compiled-in OSP table.
    pub fn builtin() -> Result<Self> {
        Self::new(builtin_variants())
    }

    /// Load and check a knowledge base given as a JSON array of rows.
    pub fn from_json(json: &str) -> Result<Self> {
        let variants: Vec<TelegramVariant> = serde_json::from_str(json)?;
        Self::new(variants)
    }

    /// Load and check a knowledge base from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|err| VariantError::LoadFailed(format!("{}: {err}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn variants(&self) -> &[TelegramVariant] {
        &self.variants
    }

    pub fn get(&self, index: usize) -> Option<&TelegramVariant> {
        self.variants.get(index)
    }

    /// Index entry for `tid`; bits above the 7-bit field are ignored.
    pub fn slot(&self, tid: u8) -> TidSlot {
        self.slots[usize::from(tid & 0x7F)]
    }

    /// All rows for `tid`, placeholder rows included.
    pub fn for_tid(&self, tid: u8) -> &[TelegramVariant] {
        &self.variants[self.slot(tid).indices()]
    }

    /// Union of the size masks of all variants of `tid`.
    pub fn legal_sizes(&self, tid: u8) -> SizeMask {
        self.for_tid(tid)
            .iter()
            .fold(SizeMask::EMPTY, |mask, v| mask.union(v.sizes))
    }

    /// Turn an operator-typed key into candidate variant indices.
    ///
    /// - A two-character key starting with a digit that parses as hex is a
    ///   literal tid: all its rows are returned and names are not searched.
    /// - Otherwise an exact name match wins outright.
    /// - Otherwise every name containing `key` matches, in table order, up
    ///   to `cap` results.
    pub fn resolve(&self, key: &str, cap: usize) -> Vec<usize> {
        if let Some(tid) = literal_tid(key) {
            if usize::from(tid) >= TID_COUNT {
                return Vec::new();
            }
            return self.slot(tid).indices().collect();
        }

        if let Some(index) = self
            .variants
            .iter()
            .position(|v| v.name.as_deref() == Some(key))
        {
            return vec![index];
        }

        self.variants
            .iter()
            .enumerate()
            .filter(|(_, v)| v.name.as_deref().is_some_and(|name| name.contains(key)))
            .map(|(index, _)| index)
            .take(cap)
            .collect()
    }

    /// Choose one variant from `candidates` for a payload of `payload_size`.
    ///
    /// Candidates sharing one tid are size variants of the same telegram:
    /// the first whose mask accepts the payload wins, else the first one.
    /// Candidates with different tids come from an ambiguous name; the
    /// first in table order wins and the others become alternates.
    pub fn pick(&self, candidates: &[usize], payload_size: usize) -> Option<Selection> {
        let (&first, _) = candidates.split_first()?;
        let tid = self.variants.get(first)?.tid;
        let same_tid = candidates
            .iter()
            .all(|&i| self.variants.get(i).is_some_and(|v| v.tid == tid));

        let index = if same_tid {
            candidates
                .iter()
                .copied()
                .find(|&i| self.variants[i].sizes.contains(payload_size))
                .unwrap_or(first)
        } else {
            first
        };

        Some(Selection {
            index,
            alternates: candidates.iter().copied().filter(|&i| i != index).collect(),
        })
    }

    /// Variant for a decoded telegram: the size-fitting row of `tid`, or
    /// its first row when none fits.
    pub fn find(&self, tid: u8, payload_size: usize) -> usize {
        let slot = self.slot(tid);
        slot.indices()
            .find(|&i| self.variants[i].sizes.contains(payload_size))
            .unwrap_or(slot.first)
    }

    /// Named variants with their indices, in table order.
    pub fn named(&self) -> impl Iterator<Item = (usize, &TelegramVariant)> {
        self.variants.iter().enumerate().filter(|(_, v)| v.has_info())
    }
}

fn literal_tid(key: &str) -> Option<u8> {
    let bytes = key.as_bytes();
    if bytes.len() != 2 || !bytes[0].is_ascii_digit() {
        return None;
    }
    u8::from_str_radix(key, 16).ok()
}

fn check_table(variants: &[TelegramVariant]) -> Result<()> {
    let Some(first) = variants.first() else {
        return Err(VariantError::Empty);
    };
    if first.tid != 0 {
        return Err(VariantError::MissingTid { tid: 0 });
    }

    let mut names = HashSet::new();
    let mut prev = 0u8;
    for (row, variant) in variants.iter().enumerate() {
        let tid = variant.tid;
        if usize::from(tid) >= TID_COUNT {
            return Err(VariantError::TidOutOfRange { row, tid });
        }
        if tid < prev {
            return Err(VariantError::OutOfOrder { row, tid, prev });
        }
        if tid > prev + 1 {
            return Err(VariantError::MissingTid { tid: prev + 1 });
        }
        prev = tid;

        check_row(row, variant)?;
        if let Some(name) = variant.name.as_deref() {
            if !names.insert(name) {
                return Err(VariantError::DuplicateName {
                    row,
                    tid,
                    name: name.to_string(),
                });
            }
        }
    }

    if usize::from(prev) != TID_COUNT - 1 {
        return Err(VariantError::MissingTid { tid: prev + 1 });
    }
    Ok(())
}

fn check_row(row: usize, v: &TelegramVariant) -> Result<()> {
    let fail = |reason| {
        Err(VariantError::Inconsistent {
            row,
            tid: v.tid,
            reason,
        })
    };

    if !v.has_info() {
        if !v.sizes.is_empty()
            || v.response_size != 0
            || v.tele_args.is_some()
            || v.resp_args.is_some()
            || v.description.is_some()
        {
            return fail("row without name must be empty");
        }
        return Ok(());
    }

    if v.name.as_deref().is_some_and(str::is_empty) {
        return fail("name is empty");
    }
    if v.description.as_deref().is_none_or(str::is_empty) {
        return fail("description missing");
    }
    if v.sizes.is_empty() {
        return fail("size mask is empty");
    }
    if v.sizes.contains(5) || v.sizes.contains(7) {
        return fail("size mask contains 5 or 7");
    }
    if !is_legal_payload_size(usize::from(v.response_size)) {
        return fail("illegal response size");
    }
    if v.sizes.max().unwrap_or(0) > 0 && v.tele_args.is_none() {
        return fail("payload without argument description");
    }
    if v.sizes.max().unwrap_or(0) == 0 && v.tele_args.is_some() {
        return fail("argument description without payload");
    }
    if v.has_response() != v.resp_args.is_some() {
        return fail("response size and response description disagree");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;
    use crate::variant::Casting;

    fn registry() -> VariantRegistry {
        VariantRegistry::builtin().unwrap()
    }

    fn named(tid: u8, name: &'static str) -> TelegramVariant {
        TelegramVariant {
            tid,
            name: Some(Cow::Borrowed(name)),
            casting: Casting::Unicast,
            sizes: SizeMask::size(0),
            response_size: 0,
            tele_args: None,
            resp_args: None,
            description: Some(Cow::Borrowed("test telegram")),
        }
    }

    fn full_table() -> Vec<TelegramVariant> {
        (0..TID_COUNT as u8).map(TelegramVariant::unknown).collect()
    }

    #[test]
    fn builtin_table_passes_startup_check() {
        let reg = registry();
        assert!(reg.len() >= TID_COUNT);
        for tid in 0..TID_COUNT as u8 {
            assert!(reg.slot(tid).count >= 1, "tid {tid:02X} has no row");
        }
        assert_eq!(reg.slot(0x4E).count, 2);
        assert_eq!(reg.slot(0x4F).count, 2);
    }

    #[test]
    fn resolve_literal_tid() {
        let reg = registry();
        let found = reg.resolve("05", 8);
        assert_eq!(found.len(), 1);
        assert_eq!(reg.get(found[0]).unwrap().display_name(), "goactive");

        let found = reg.resolve("4F", 8);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|&i| reg.get(i).unwrap().tid == 0x4F));
    }

    #[test]
    fn resolve_literal_tid_never_searches_names() {
        let reg = registry();
        // "0E" is a placeholder row; no name contains "0E" either way
        let found = reg.resolve("0E", 8);
        assert_eq!(found.len(), 1);
        assert!(!reg.get(found[0]).unwrap().has_info());
        assert!(reg.resolve("99", 8).is_empty());
    }

    #[test]
    fn resolve_exact_name_wins() {
        let reg = registry();
        let found = reg.resolve("setpwm", 8);
        assert_eq!(found.len(), 1);
        assert_eq!(reg.get(found[0]).unwrap().display_name(), "setpwm");
    }

    #[test]
    fn resolve_substring_in_table_order_with_cap() {
        let reg = registry();
        let found = reg.resolve("pwm", 8);
        let names: Vec<_> = found
            .iter()
            .map(|&i| reg.get(i).unwrap().display_name())
            .collect();
        assert_eq!(
            names,
            vec!["readpwm", "readpwmchn", "setpwm", "setpwmchn", "setpwm_sr", "setpwmchn_sr"]
        );

        assert_eq!(reg.resolve("pwm", 3).len(), 3);
        assert!(reg.resolve("nosuchtelegram", 8).is_empty());
    }

    #[test]
    fn pick_same_tid_by_size() {
        let reg = registry();
        let found = reg.resolve("4F", 8);

        let sel = reg.pick(&found, 8).unwrap();
        assert_eq!(reg.get(sel.index).unwrap().display_name(), "setpwmchn");
        assert_eq!(sel.alternates.len(), 1);

        let sel = reg.pick(&found, 6).unwrap();
        assert_eq!(reg.get(sel.index).unwrap().display_name(), "setpwm");

        // nothing fits: first candidate
        let sel = reg.pick(&found, 2).unwrap();
        assert_eq!(sel.index, found[0]);
    }

    #[test]
    fn pick_different_tids_takes_first() {
        let reg = registry();
        let found = reg.resolve("setup", 8);
        assert_eq!(found.len(), 3);
        let sel = reg.pick(&found, 1).unwrap();
        assert_eq!(reg.get(sel.index).unwrap().display_name(), "readsetup");
        assert_eq!(sel.alternates, found[1..].to_vec());
        assert!(reg.pick(&[], 0).is_none());
    }

    #[test]
    fn find_by_tid_and_size() {
        let reg = registry();
        assert_eq!(reg.get(reg.find(0x4E, 1)).unwrap().display_name(), "readpwmchn");
        assert_eq!(reg.get(reg.find(0x4E, 0)).unwrap().display_name(), "readpwm");
        assert_eq!(reg.get(reg.find(0x4E, 3)).unwrap().display_name(), "readpwm");
        assert_eq!(reg.legal_sizes(0x4F).to_string(), "6,8");
    }

    #[test]
    fn rejects_out_of_order_table() {
        let mut table = full_table();
        table[5].tid = 3;
        let err = VariantRegistry::new(table).unwrap_err();
        assert!(matches!(err, VariantError::OutOfOrder { row: 5, tid: 3, prev: 4 }));
    }

    #[test]
    fn rejects_gap_in_table() {
        let mut table = full_table();
        table.remove(0x10);
        let err = VariantRegistry::new(table).unwrap_err();
        assert!(matches!(err, VariantError::MissingTid { tid: 0x10 }));

        let mut table = full_table();
        table.pop();
        let err = VariantRegistry::new(table).unwrap_err();
        assert!(matches!(err, VariantError::MissingTid { tid: 0x7F }));
    }

    #[test]
    fn rejects_partial_rows() {
        let mut table = full_table();
        let mut row = named(0x05, "goactive");
        row.description = None;
        table[5] = row;
        let err = VariantRegistry::new(table).unwrap_err();
        assert!(matches!(err, VariantError::Inconsistent { tid: 5, .. }));

        let mut table = full_table();
        table[6].response_size = 1;
        let err = VariantRegistry::new(table).unwrap_err();
        assert!(matches!(err, VariantError::Inconsistent { tid: 6, .. }));

        let mut table = full_table();
        let mut row = named(0x07, "odd");
        row.sizes = SizeMask::try_from(vec![5]).unwrap();
        table[7] = row;
        let err = VariantRegistry::new(table).unwrap_err();
        assert!(matches!(err, VariantError::Inconsistent { tid: 7, .. }));
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut table = full_table();
        table[1] = named(1, "twice");
        table[2] = named(2, "twice");
        let err = VariantRegistry::new(table).unwrap_err();
        assert!(matches!(err, VariantError::DuplicateName { row: 2, .. }));
    }

    #[test]
    fn loads_json_knowledge_base() {
        let mut rows: Vec<serde_json::Value> = (0..TID_COUNT)
            .map(|tid| serde_json::json!({ "tid": tid }))
            .collect();
        rows[0x07] = serde_json::json!({
            "tid": 7,
            "name": "identify",
            "sizes": [0],
            "response_size": 4,
            "resp_args": "id(4)",
            "description": "Returns the identification word."
        });
        let json = serde_json::Value::Array(rows).to_string();

        let reg = VariantRegistry::from_json(&json).unwrap();
        assert_eq!(reg.len(), TID_COUNT);
        assert_eq!(reg.resolve("ident", 8), vec![7]);
        assert!(reg.get(7).unwrap().has_response());
    }

    #[test]
    fn rejects_malformed_json() {
        let err = VariantRegistry::from_json("{ not json").unwrap_err();
        assert!(matches!(err, VariantError::InvalidJson(_)));
        assert!(matches!(
            VariantRegistry::from_json("[]").unwrap_err(),
            VariantError::Empty
        ));
    }
}
