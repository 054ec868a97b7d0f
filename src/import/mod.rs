//! Score file import. Survey exports arrive as CSV or XLSX with a `Score`
//! column; direct assessment sheets are CSV with a `Roll` column plus one
//! column per CO.

use anyhow::{Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::path::Path;

use crate::buffered_eprintln;
use crate::scores::ScoreBook;
use crate::subject::{roll_number, Subject};

/// One row of a direct-assessment sheet: a roll number and the marks
/// obtained per CO column.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectScoreRow {
    pub roll_number: String,
    pub co_scores: Vec<(String, f64)>,
}

/// Coerce a raw cell to a score. Anything that does not parse as a number
/// counts as 0, with a warning naming the row.
fn coerce_score(raw: &str, source: &str, row_num: usize) -> f64 {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            buffered_eprintln!(
                "Warning: {} row {}: non-numeric score '{}', counting as 0",
                source,
                row_num,
                trimmed
            );
            0.0
        }
    }
}

/// Normalize a raw roll cell to a roster roll number. Roll numbers are
/// ordinal, so "1" and "01" name the same student; anything non-numeric or
/// outside 1..=student_count is rejected.
fn normalize_roll(raw: &str, subject: &Subject) -> Option<String> {
    let ordinal = raw.trim().parse::<usize>().ok()?;
    if (1..=subject.student_count).contains(&ordinal) {
        Some(roll_number(ordinal))
    } else {
        None
    }
}

fn find_score_column(headers: &[String]) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("score"))
}

/// Read survey scores from a file, dispatching on extension. `.xlsx` goes
/// through calamine, everything else is treated as CSV.
pub fn read_score_rows(path: &Path) -> Result<Vec<f64>> {
    let is_xlsx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
    if is_xlsx {
        read_scores_xlsx(path)
    } else {
        read_scores_csv(path)
    }
}

fn read_scores_csv(path: &Path) -> Result<Vec<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read headers from {}", path.display()))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let score_col = find_score_column(&headers)
        .with_context(|| format!("{}: no 'Score' column found", path.display()))?;

    let source = path.display().to_string();
    let mut scores = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let row_num = i + 2; // 1-based, after the header row
        let record =
            record.with_context(|| format!("Failed to read {} row {}", source, row_num))?;
        let raw = record.get(score_col).unwrap_or("");
        scores.push(coerce_score(raw, &source, row_num));
    }
    Ok(scores)
}

fn read_scores_xlsx(path: &Path) -> Result<Vec<f64>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .with_context(|| format!("{}: workbook has no sheets", path.display()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("{}: failed to read sheet '{}'", path.display(), sheet_name))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .with_context(|| format!("{}: sheet '{}' is empty", path.display(), sheet_name))?
        .iter()
        .map(|cell| cell.to_string())
        .collect();
    let score_col = find_score_column(&headers)
        .with_context(|| format!("{}: no 'Score' column found", path.display()))?;

    let source = path.display().to_string();
    let mut scores = Vec::new();
    for (i, row) in rows.enumerate() {
        let row_num = i + 2;
        let score = match row.get(score_col) {
            Some(Data::Float(v)) => *v,
            Some(Data::Int(v)) => *v as f64,
            Some(cell) => coerce_score(&cell.to_string(), &source, row_num),
            None => coerce_score("", &source, row_num),
        };
        scores.push(score);
    }
    Ok(scores)
}

/// File survey scores under the indirect assessment. Respondents get
/// ordinal roll numbers in row order; a duplicate ordinal overwrites.
pub fn apply_survey(book: &mut ScoreBook, subject: &Subject, scores: &[f64]) {
    for (i, score) in scores.iter().enumerate() {
        book.record_indirect(subject, &roll_number(i + 1), *score);
    }
}

/// Read a direct-assessment CSV: a `Roll` column plus one column per CO id.
/// Columns that do not match any CO of the subject are reported and skipped.
pub fn read_direct_csv(path: &Path, subject: &Subject) -> Result<Vec<DirectScoreRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read headers from {}", path.display()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let roll_col = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("roll"))
        .with_context(|| format!("{}: no 'Roll' column found", path.display()))?;

    let mut co_cols: Vec<(usize, String)> = Vec::new();
    for (i, header) in headers.iter().enumerate() {
        if i == roll_col {
            continue;
        }
        let header = header.trim();
        if subject.course_outcome(header).is_some() {
            co_cols.push((i, header.to_string()));
        } else {
            buffered_eprintln!(
                "Warning: {}: column '{}' matches no CO of {}, skipping",
                path.display(),
                header,
                subject.code
            );
        }
    }

    let source = path.display().to_string();
    let mut out = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let row_num = i + 2;
        let record =
            record.with_context(|| format!("Failed to read {} row {}", source, row_num))?;
        let raw_roll = record.get(roll_col).unwrap_or("").trim();
        if raw_roll.is_empty() {
            buffered_eprintln!("Warning: {} row {}: empty roll number, skipping", source, row_num);
            continue;
        }
        let Some(roll) = normalize_roll(raw_roll, subject) else {
            buffered_eprintln!(
                "Warning: {} row {}: roll '{}' is not in the roster, skipping",
                source,
                row_num,
                raw_roll
            );
            continue;
        };
        let co_scores = co_cols
            .iter()
            .map(|(col, co_id)| {
                let raw = record.get(*col).unwrap_or("");
                (co_id.clone(), coerce_score(raw, &source, row_num))
            })
            .collect();
        out.push(DirectScoreRow {
            roll_number: roll,
            co_scores,
        });
    }
    Ok(out)
}

/// Record imported direct rows into the book under one assessment.
pub fn apply_direct(
    book: &mut ScoreBook,
    subject: &Subject,
    assessment_name: &str,
    rows: &[DirectScoreRow],
) {
    for row in rows {
        for (co_id, score) in &row.co_scores {
            book.record_direct(subject, assessment_name, &row.roll_number, co_id, *score);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::{INDIRECT_ASSESSMENT, INDIRECT_CO};
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("attainboard-test-{}-{}", std::process::id(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_read_survey_csv() {
        let path = write_temp("survey.csv", "Timestamp,Score\n2024-01-01,4\n2024-01-02,5\n");
        let scores = read_score_rows(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(scores, vec![4.0, 5.0]);
    }

    #[test]
    fn test_read_survey_csv_score_header_case_insensitive() {
        let path = write_temp("survey-case.csv", "name,SCORE\na,3\n");
        let scores = read_score_rows(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(scores, vec![3.0]);
    }

    #[test]
    fn test_non_numeric_score_counts_as_zero() {
        let path = write_temp("survey-bad.csv", "Score\n4\nN/A\n2\n");
        let scores = read_score_rows(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(scores, vec![4.0, 0.0, 2.0]);
    }

    #[test]
    fn test_missing_score_column_errors() {
        let path = write_temp("survey-noscore.csv", "a,b\n1,2\n");
        let result = read_score_rows(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_survey_assigns_ordinal_rolls() {
        let subject = Subject::sample();
        let mut book = ScoreBook::new();
        apply_survey(&mut book, &subject, &[10.0, 20.0, 30.0]);

        assert_eq!(book.len(), 3);
        for roll in ["01", "02", "03"] {
            let entry = book.get(roll, INDIRECT_ASSESSMENT, INDIRECT_CO);
            assert!(entry.is_some(), "missing survey entry for roll {}", roll);
        }
        // Scores above the survey maximum clamp to it.
        assert_eq!(
            book.get("02", INDIRECT_ASSESSMENT, INDIRECT_CO).unwrap().score,
            subject.indirect_assessment.max_marks
        );
    }

    #[test]
    fn test_read_direct_csv_maps_co_columns() {
        let subject = Subject::sample();
        let path = write_temp("direct.csv", "Roll,CO1,CO2,Remarks\n01,18,12,good\n02,x,9,\n");
        let rows = read_direct_csv(&path, &subject).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].roll_number, "01");
        assert_eq!(
            rows[0].co_scores,
            vec![("CO1".to_string(), 18.0), ("CO2".to_string(), 12.0)]
        );
        // "Remarks" is not a CO, and "x" coerces to 0.
        assert_eq!(rows[1].co_scores[0], ("CO1".to_string(), 0.0));
    }

    #[test]
    fn test_unpadded_roll_lands_on_roster_key() {
        let subject = Subject::sample();
        let path = write_temp("direct-unpadded.csv", "Roll,CO1\n1,18\n");
        let rows = read_direct_csv(&path, &subject).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(rows[0].roll_number, "01");

        let mut book = ScoreBook::new();
        apply_direct(&mut book, &subject, "Internal Test 1", &rows);
        // The entry is visible under the roster key and is the same one the
        // aggregates count; no phantom record under "1".
        assert!(book.get("01", "Internal Test 1", "CO1").is_some());
        assert!(book.get("1", "Internal Test 1", "CO1").is_none());
        assert_eq!(book.distribution_for_assessment("Internal Test 1").total(), 1);
        assert_eq!(book.co_student_scores(&subject, "CO1").len(), 1);
    }

    #[test]
    fn test_out_of_roster_rolls_are_skipped() {
        // Sample roster is 30 students; "99" and "abc" match no one
        let subject = Subject::sample();
        let path = write_temp("direct-stray.csv", "Roll,CO1\n99,10\nabc,10\n02,12\n");
        let rows = read_direct_csv(&path, &subject).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].roll_number, "02");
    }

    #[test]
    fn test_apply_direct_records_into_book() {
        let subject = Subject::sample();
        let mut book = ScoreBook::new();
        let rows = vec![DirectScoreRow {
            roll_number: "01".to_string(),
            co_scores: vec![("CO1".to_string(), 18.0)],
        }];
        apply_direct(&mut book, &subject, "Internal Test 1", &rows);
        assert_eq!(book.get("01", "Internal Test 1", "CO1").unwrap().score, 18.0);
    }
}
