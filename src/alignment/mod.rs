//! CTM phone alignment parsing.
//!
//! Each non-blank line holds
//! `<prefix>-<utterance> <segment> <onset_s> <dur_s> <phone>_<suffix> [extra]`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::info;

use crate::error::{PhonePoolError, Result};
use crate::types::{AlignmentRecord, Language, LanguageKind};

const MIN_COLUMNS: usize = 5;

/// Reads and parses a CTM alignment file.
pub fn load_alignment(path: &Path, language: &Language) -> Result<Vec<AlignmentRecord>> {
    let file =
        File::open(path).map_err(|err| PhonePoolError::io("opening alignment", path, err))?;
    let records = parse_alignment(BufReader::new(file), language)?;
    info!(path = %path.display(), records = records.len(), "alignment loaded");
    Ok(records)
}

pub fn parse_alignment<R: BufRead>(reader: R, language: &Language) -> Result<Vec<AlignmentRecord>> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|err| PhonePoolError::io("reading alignment", "<reader>", err))?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_line(&line, line_no, language)?);
    }
    Ok(records)
}

fn parse_line(line: &str, line_no: usize, language: &Language) -> Result<AlignmentRecord> {
    let columns: Vec<&str> = line.split_whitespace().collect();
    if columns.len() < MIN_COLUMNS {
        return Err(PhonePoolError::alignment_line(
            line_no,
            format!("expected at least {MIN_COLUMNS} columns, found {}", columns.len()),
        ));
    }

    let utterance_id = utterance_id(columns[0]).ok_or_else(|| {
        PhonePoolError::alignment_line(
            line_no,
            format!("utterance field \"{}\" has no '-' separated id", columns[0]),
        )
    })?;
    let segment = parse_column::<u32>(columns[1], "segment", line_no)?;
    let onset_s = parse_column::<f64>(columns[2], "onset", line_no)?;
    let duration_s = parse_column::<f64>(columns[3], "duration", line_no)?;
    let raw_phone = columns[4].to_string();
    let phone = normalize_phone(base_phone(&raw_phone), language);

    Ok(AlignmentRecord {
        utterance_id: utterance_id.to_string(),
        segment,
        onset_s,
        duration_s,
        raw_phone,
        phone,
        duration_ms: duration_s * 1000.0,
        extra: columns.get(MIN_COLUMNS).map(|extra| extra.to_string()),
    })
}

fn parse_column<T: std::str::FromStr>(raw: &str, label: &str, line_no: usize) -> Result<T> {
    raw.parse().map_err(|_| {
        PhonePoolError::alignment_line(line_no, format!("invalid {label} value \"{raw}\""))
    })
}

/// Second `-` separated piece of the CTM utterance field: `spk-utt001` gives `utt001`.
pub fn utterance_id(field: &str) -> Option<&str> {
    field.split('-').nth(1).filter(|id| !id.is_empty())
}

/// Phone label with its `_` position suffix removed: `aa_B` gives `aa`.
pub fn base_phone(label: &str) -> &str {
    label.split('_').next().unwrap_or(label)
}

/// Reconciles transcription symbols with the taxonomy tables.
pub fn normalize_phone(phone: &str, language: &Language) -> String {
    match (language.kind(), phone) {
        (LanguageKind::French, "au") => "oo".to_string(),
        _ => phone.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
spkA-utt001 1 0.10 0.20 aa_B 0.98
spkA-utt001 1 0.30 0.05 SIL 1.00

spkA-utt002 1 0.00 0.12 au_E 0.70
";

    #[test]
    fn parses_records_and_derived_columns() {
        let records = parse_alignment(SAMPLE.as_bytes(), &Language::en()).unwrap();
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(first.utterance_id, "utt001");
        assert_eq!(first.segment, 1);
        assert_eq!(first.raw_phone, "aa_B");
        assert_eq!(first.phone, "aa");
        assert!((first.duration_ms - 200.0).abs() < 1e-9);
        assert_eq!(first.extra.as_deref(), Some("0.98"));

        assert_eq!(records[1].phone, "SIL");
        assert_eq!(records[2].phone, "au");
    }

    #[test]
    fn french_rewrites_au_only() {
        let records = parse_alignment(SAMPLE.as_bytes(), &Language::fr()).unwrap();
        assert_eq!(records[0].phone, "aa");
        assert_eq!(records[2].phone, "oo");
        assert_eq!(records[2].raw_phone, "au_E");
    }

    #[test]
    fn uppercase_french_tag_still_rewrites_au() {
        let language: Language = "FR".parse().unwrap();
        let records = parse_alignment(SAMPLE.as_bytes(), &language).unwrap();
        assert_eq!(records[2].phone, "oo");
    }

    #[test]
    fn utterance_id_takes_second_piece() {
        assert_eq!(utterance_id("speakerA-utt001"), Some("utt001"));
        assert_eq!(utterance_id("a-b-c"), Some("b"));
        assert_eq!(utterance_id("nodash"), None);
    }

    #[test]
    fn short_and_malformed_lines_name_the_line() {
        let err = parse_alignment("spk-u 1 0.1 0.2\n".as_bytes(), &Language::en()).unwrap_err();
        assert!(err.to_string().contains("line 1"), "unexpected: {err}");

        let err = parse_alignment(
            "spk-u 1 0.1 0.2 aa_B\nspk-u 2 zero 0.2 bb_E\n".as_bytes(),
            &Language::en(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("line 2"), "unexpected: {err}");
        assert!(err.to_string().contains("onset"), "unexpected: {err}");
    }

    #[test]
    fn five_column_lines_have_no_extra() {
        let records = parse_alignment("spk-u 3 0.5 0.1 ee\n".as_bytes(), &Language::fr()).unwrap();
        assert_eq!(records[0].phone, "ee");
        assert_eq!(records[0].extra, None);
    }
}
