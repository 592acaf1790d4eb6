//! Import and export of vocabulary lists.
//!
//! # Formats
//! JSON is an array of objects in the item shape. Only `word` and `translation`
//! are required:
//! ```json
//! [{"word": "dog", "translation": "pes", "category": "animals"}]
//! ```
//!
//! CSV needs a header row naming the columns, with RFC 4180 quoting:
//! ```text
//! word,translation,example,category,difficulty
//! dog,pes,"The dog barks, loudly.",animals,easy
//! ```
//!
//! Both formats share one policy: a single invalid record rejects the whole
//! batch and nothing is imported.

use crate::error::{Error, ImportError};
use crate::store::ItemStore;
use crate::types::{Difficulty, ItemId, VocabularyItem, DEFAULT_CATEGORY};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

type ImportResult<T> = std::result::Result<T, ImportError>;

/// Content columns, in export order.
pub const CSV_COLUMNS: [&str; 5] = ["word", "translation", "example", "category", "difficulty"];

/// Learning-state columns appended on export and accepted on import.
const CSV_STATE_COLUMNS: [&str; 7] = [
    "id",
    "repetition_level",
    "correct_count",
    "incorrect_count",
    "last_reviewed",
    "next_review_date",
    "created_at",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferFormat {
    #[default]
    Json,
    Csv,
}

impl TransferFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }
}

/// What happens to the existing items on import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Keep existing items. Imported ids that collide get fresh ones.
    #[default]
    Append,
    /// Drop every existing item.
    Replace,
}

/// Outcome of an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub mode: ImportMode,
    pub imported: usize,
    /// Ids reassigned because they already existed in the store.
    pub reassigned: usize,
}

/// One record as it appears in an import file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ImportRecord {
    id: Option<Uuid>,
    word: Option<String>,
    translation: Option<String>,
    example: Option<String>,
    category: Option<String>,
    difficulty: Option<String>,
    repetition_level: Option<u32>,
    correct_count: Option<u32>,
    incorrect_count: Option<u32>,
    last_reviewed: Option<DateTime<Utc>>,
    next_review_date: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
}

impl ImportRecord {
    fn into_item(self, record: usize, now: DateTime<Utc>) -> ImportResult<VocabularyItem> {
        let word = required(self.word, record, "word")?;
        let translation = required(self.translation, record, "translation")?;
        let difficulty = match non_blank(self.difficulty) {
            None => None,
            Some(raw) => Some(Difficulty::parse(&raw).ok_or(ImportError::InvalidValue {
                record,
                field: "difficulty",
                value: raw,
            })?),
        };

        // A schedule only exists after a review.
        if self.last_reviewed.is_none() {
            if let Some(next) = self.next_review_date {
                return Err(ImportError::InvalidValue {
                    record,
                    field: "next_review_date",
                    value: format!("{} without last_reviewed", next.to_rfc3339()),
                });
            }
            if let Some(level) = self.repetition_level.filter(|&l| l > 0) {
                return Err(ImportError::InvalidValue {
                    record,
                    field: "repetition_level",
                    value: format!("{level} without last_reviewed"),
                });
            }
        }

        Ok(VocabularyItem {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            word,
            translation,
            example: non_blank(self.example),
            category: Some(non_blank(self.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string())),
            difficulty,
            repetition_level: self.repetition_level.unwrap_or(0),
            correct_count: self.correct_count.unwrap_or(0),
            incorrect_count: self.incorrect_count.unwrap_or(0),
            last_reviewed: self.last_reviewed,
            next_review_date: self.next_review_date,
            created_at: self.created_at.unwrap_or(now),
        })
    }
}

fn required(value: Option<String>, record: usize, field: &'static str) -> ImportResult<String> {
    non_blank(value).ok_or(ImportError::MissingField { record, field })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an import file into items. Fails on the first invalid record.
pub fn parse_items(
    content: &str,
    format: TransferFormat,
    now: DateTime<Utc>,
) -> ImportResult<Vec<VocabularyItem>> {
    if content.trim().is_empty() {
        return Err(ImportError::EmptyFile);
    }
    let records = match format {
        TransferFormat::Json => serde_json::from_str::<Vec<ImportRecord>>(content)?,
        TransferFormat::Csv => csv_records(content)?,
    };

    let mut seen: HashSet<ItemId> = HashSet::new();
    let mut items = Vec::with_capacity(records.len());
    for (idx, record) in records.into_iter().enumerate() {
        let record_no = idx + 1;
        if let Some(id) = record.id {
            if !seen.insert(id) {
                return Err(ImportError::DuplicateId {
                    id,
                    record: record_no,
                });
            }
        }
        items.push(record.into_item(record_no, now)?);
    }
    Ok(items)
}

/// Put parsed items into the store.
pub fn import_into(
    store: &mut ItemStore,
    mut items: Vec<VocabularyItem>,
    mode: ImportMode,
) -> crate::error::Result<ImportSummary> {
    let imported = items.len();
    let mut reassigned = 0;
    match mode {
        ImportMode::Replace => store.replace_all(items),
        ImportMode::Append => {
            for item in items.iter_mut().filter(|i| store.contains(i.id)) {
                item.id = Uuid::new_v4();
                reassigned += 1;
            }
            store.extend(items)?;
        }
    }
    tracing::debug!(?mode, imported, reassigned, "import applied");
    Ok(ImportSummary {
        mode,
        imported,
        reassigned,
    })
}

/// Serialize items in the given format.
pub fn export(items: &[VocabularyItem], format: TransferFormat) -> crate::error::Result<String> {
    match format {
        TransferFormat::Json => {
            serde_json::to_string_pretty(items).map_err(|err| Error::Export(err.to_string()))
        }
        TransferFormat::Csv => export_csv(items),
    }
}

fn export_csv(items: &[VocabularyItem]) -> crate::error::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CSV_COLUMNS.iter().chain(CSV_STATE_COLUMNS.iter()))
        .map_err(export_error)?;

    let ts = |t: Option<DateTime<Utc>>| t.map(|t| t.to_rfc3339()).unwrap_or_default();
    for item in items {
        writer
            .write_record([
                item.word.clone(),
                item.translation.clone(),
                item.example.clone().unwrap_or_default(),
                item.category.clone().unwrap_or_default(),
                item.difficulty.map(|d| d.as_str().to_string()).unwrap_or_default(),
                item.id.to_string(),
                item.repetition_level.to_string(),
                item.correct_count.to_string(),
                item.incorrect_count.to_string(),
                ts(item.last_reviewed),
                ts(item.next_review_date),
                item.created_at.to_rfc3339(),
            ])
            .map_err(export_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| Error::Export(err.into_error().to_string()))?;
    String::from_utf8(bytes).map_err(|err| Error::Export(err.to_string()))
}

fn export_error(err: csv::Error) -> Error {
    Error::Export(err.to_string())
}

/// Read CSV rows into records keyed by the header.
fn csv_records(content: &str) -> ImportResult<Vec<ImportRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(malformed)?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    for needed in ["word", "translation"] {
        if !columns.iter().any(|c| c == needed) {
            return Err(ImportError::MalformedCsv {
                line: 1,
                message: format!("header is missing the `{needed}` column"),
            });
        }
    }

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row.map_err(malformed)?;
        let mut record = ImportRecord::default();
        for (column, value) in columns.iter().zip(row.iter()) {
            apply_column(&mut record, column, value.to_string(), idx + 1)?;
        }
        records.push(record);
    }
    Ok(records)
}

fn malformed(err: csv::Error) -> ImportError {
    let line = err.position().map_or(0, |pos| pos.line() as usize);
    let message = match err.kind() {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} fields, found {len}"),
        _ => err.to_string(),
    };
    ImportError::MalformedCsv { line, message }
}

fn apply_column(
    record: &mut ImportRecord,
    column: &str,
    value: String,
    record_no: usize,
) -> ImportResult<()> {
    let blank = value.trim().is_empty();
    match column {
        "word" => record.word = Some(value),
        "translation" => record.translation = Some(value),
        "example" => record.example = Some(value),
        "category" => record.category = Some(value),
        "difficulty" => record.difficulty = Some(value),
        _ if blank => {}
        "id" => record.id = Some(parse_value(&value, record_no, "id")?),
        "repetition_level" => {
            record.repetition_level = Some(parse_value(&value, record_no, "repetition_level")?)
        }
        "correct_count" => {
            record.correct_count = Some(parse_value(&value, record_no, "correct_count")?)
        }
        "incorrect_count" => {
            record.incorrect_count = Some(parse_value(&value, record_no, "incorrect_count")?)
        }
        "last_reviewed" => {
            record.last_reviewed = Some(parse_value(&value, record_no, "last_reviewed")?)
        }
        "next_review_date" => {
            record.next_review_date = Some(parse_value(&value, record_no, "next_review_date")?)
        }
        "created_at" => record.created_at = Some(parse_value(&value, record_no, "created_at")?),
        // Unknown columns are ignored.
        _ => {}
    }
    Ok(())
}

fn parse_value<T: std::str::FromStr>(
    value: &str,
    record: usize,
    field: &'static str,
) -> ImportResult<T> {
    value.trim().parse().map_err(|_| ImportError::InvalidValue {
        record,
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn json_minimal_records_get_defaults() {
        let json = r#"[{"word": "dog", "translation": "pes"},
                       {"word": "cat", "translation": "kočka", "category": "animals", "difficulty": "Easy"}]"#;
        let items = parse_items(json, TransferFormat::Json, now()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].category.as_deref(), Some(DEFAULT_CATEGORY));
        assert_eq!(items[0].repetition_level, 0);
        assert_eq!(items[0].created_at, now());
        assert!(items[0].next_review_date.is_none());
        assert_eq!(items[1].difficulty, Some(Difficulty::Easy));
    }

    #[test]
    fn json_missing_translation_rejects_batch() {
        let json = r#"[{"word": "dog", "translation": "pes"}, {"word": "cat"}]"#;
        let err = parse_items(json, TransferFormat::Json, now()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::MissingField { record: 2, field: "translation" }
        ));
    }

    #[test]
    fn json_bad_difficulty_is_reported() {
        let json = r#"[{"word": "dog", "translation": "pes", "difficulty": "brutal"}]"#;
        let err = parse_items(json, TransferFormat::Json, now()).unwrap_err();
        assert!(matches!(err, ImportError::InvalidValue { field: "difficulty", .. }));
    }

    #[test]
    fn malformed_json_and_empty_file() {
        assert!(matches!(
            parse_items("[{", TransferFormat::Json, now()),
            Err(ImportError::Json(_))
        ));
        assert!(matches!(
            parse_items("  \n", TransferFormat::Csv, now()),
            Err(ImportError::EmptyFile)
        ));
    }

    #[test]
    fn duplicate_ids_in_batch_are_rejected() {
        let id = Uuid::new_v4();
        let json = format!(
            r#"[{{"id": "{id}", "word": "a", "translation": "b"}}, {{"id": "{id}", "word": "c", "translation": "d"}}]"#
        );
        let err = parse_items(&json, TransferFormat::Json, now()).unwrap_err();
        assert!(matches!(err, ImportError::DuplicateId { record: 2, .. }));
    }

    #[test]
    fn csv_with_quotes_and_line_breaks() {
        let csv = "word,translation,example,category,difficulty\r\n\
                   dog,pes,\"The dog barks, \"\"woof\"\".\",animals,easy\r\n\
                   \n\
                   bread,chléb,\"Fresh\nbread\",,\n";
        let items = parse_items(csv, TransferFormat::Csv, now()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].example.as_deref(), Some("The dog barks, \"woof\"."));
        assert_eq!(items[0].category.as_deref(), Some("animals"));
        assert_eq!(items[1].example.as_deref(), Some("Fresh\nbread"));
        assert_eq!(items[1].category.as_deref(), Some(DEFAULT_CATEGORY));
        assert_eq!(items[1].difficulty, None);
    }

    #[test]
    fn csv_header_order_is_free() {
        let csv = "translation,word\npes,dog\n";
        let items = parse_items(csv, TransferFormat::Csv, now()).unwrap();
        assert_eq!((items[0].word.as_str(), items[0].translation.as_str()), ("dog", "pes"));
    }

    #[test]
    fn csv_without_required_header_is_malformed() {
        let csv = "dog,pes\ncat,kočka\n";
        assert!(matches!(
            parse_items(csv, TransferFormat::Csv, now()),
            Err(ImportError::MalformedCsv { line: 1, .. })
        ));
    }

    #[test]
    fn csv_field_count_mismatch_names_the_line() {
        let csv = "word,translation\ndog,pes\ncat\n";
        let err = parse_items(csv, TransferFormat::Csv, now()).unwrap_err();
        assert!(matches!(err, ImportError::MalformedCsv { line: 3, .. }));
    }

    #[test]
    fn csv_blank_word_rejects_batch() {
        let csv = "word,translation\ndog,pes\n  ,kočka\n";
        let err = parse_items(csv, TransferFormat::Csv, now()).unwrap_err();
        assert!(matches!(err, ImportError::MissingField { record: 2, field: "word" }));
    }

    #[test]
    fn csv_unterminated_quote_swallows_the_row() {
        let csv = "word,translation\n\"dog,pes\n";
        assert!(matches!(
            parse_items(csv, TransferFormat::Csv, now()),
            Err(ImportError::MalformedCsv { line: 2, .. })
        ));
    }

    #[test]
    fn csv_export_reimports_with_state() {
        let mut item = VocabularyItem::new("ice, cream", "zmrzlina", now())
            .with_category("food")
            .with_example("I \"love\" it");
        item.repetition_level = 3;
        item.correct_count = 4;
        item.last_reviewed = Some(now() - chrono::Duration::days(7));
        item.next_review_date = Some(now());
        let csv = export(std::slice::from_ref(&item), TransferFormat::Csv).unwrap();
        assert!(csv.starts_with("word,translation,example,category,difficulty,id"));

        let back = parse_items(&csv, TransferFormat::Csv, now()).unwrap();
        assert_eq!(back, vec![item]);
    }

    #[test]
    fn json_schedule_without_review_is_rejected() {
        let json = r#"[{"word": "dog", "translation": "pes",
                        "next_review_date": "2024-03-11T09:00:00Z"}]"#;
        let err = parse_items(json, TransferFormat::Json, now()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::InvalidValue { record: 1, field: "next_review_date", .. }
        ));

        let json = r#"[{"word": "dog", "translation": "pes", "repetition_level": 2}]"#;
        let err = parse_items(json, TransferFormat::Json, now()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::InvalidValue { record: 1, field: "repetition_level", .. }
        ));
    }

    #[test]
    fn csv_schedule_without_review_is_rejected() {
        let csv = "word,translation,last_reviewed,next_review_date\n\
                   dog,pes,2024-03-09T09:00:00Z,2024-03-10T09:00:00Z\n\
                   cat,kočka,,2024-03-11T09:00:00Z\n";
        let err = parse_items(csv, TransferFormat::Csv, now()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::InvalidValue { record: 2, field: "next_review_date", .. }
        ));
    }

    #[test]
    fn append_reassigns_colliding_ids() {
        let existing = VocabularyItem::new("dog", "pes", now());
        let mut store = ItemStore::new(vec![existing.clone()]);
        let mut clash = VocabularyItem::new("dog", "pes", now());
        clash.id = existing.id;
        let fresh = VocabularyItem::new("cat", "kočka", now());

        let summary = import_into(&mut store, vec![clash, fresh], ImportMode::Append).unwrap();
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.reassigned, 1);
        assert_eq!(store.len(), 3);
        let ids: HashSet<ItemId> = store.items().iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn replace_drops_existing_items() {
        let mut store = ItemStore::new(vec![VocabularyItem::new("dog", "pes", now())]);
        let summary = import_into(
            &mut store,
            vec![VocabularyItem::new("cat", "kočka", now())],
            ImportMode::Replace,
        )
        .unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.items()[0].word, "cat");
    }
}
