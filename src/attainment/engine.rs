use super::band::target_level;
use crate::scores::ScoreBook;
use crate::subject::{CourseOutcome, Subject};

/// Fraction-of-roster threshold used for CO attainment when the caller does
/// not supply one.
pub const DEFAULT_CO_THRESHOLD: f64 = 60.0;

/// Maximum CO->PO mapping level; a level-3 mapping passes CO attainment
/// through to the PO unchanged.
const MAX_MAPPING_LEVEL: f64 = 3.0;

/// One student's performance on a single course outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentScore {
    pub co_id: String,
    pub score: f64,
    pub max_score: f64,
}

/// Computed attainment for one (CO, PO) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct AttainmentLevel {
    pub co_id: String,
    pub po_id: String,
    pub percentage: f64,
    pub level: u8,
}

/// Percentage of students whose score clears `threshold` percent of their
/// maximum.
///
/// # Panics
///
/// Panics on an empty slice. There is no meaningful zero-student answer, so
/// callers must guard the empty case instead of receiving a silent 0.
pub fn co_attainment(scores: &[StudentScore], threshold: f64) -> f64 {
    assert!(
        !scores.is_empty(),
        "co_attainment requires at least one student score"
    );
    let above = scores
        .iter()
        .filter(|s| s.score / s.max_score * 100.0 >= threshold)
        .count();
    above as f64 / scores.len() as f64 * 100.0
}

/// Weight CO attainment through the CO->PO mapping level and discretize it
/// against the fixed program targets.
///
/// An unmapped PO id contributes level 0, giving a weighted attainment of 0
/// and the floor level 1.
pub fn po_attainment(co: &CourseOutcome, co_attainment_pct: f64, po_id: &str) -> AttainmentLevel {
    let mapping_level = co.mapping_level(po_id);
    let weighted = co_attainment_pct * f64::from(mapping_level) / MAX_MAPPING_LEVEL;

    AttainmentLevel {
        co_id: co.id.clone(),
        po_id: po_id.to_string(),
        percentage: weighted,
        level: target_level(weighted),
    }
}

/// Compute the full CO x PO attainment matrix for a subject from the scores
/// recorded so far.
///
/// Each CO's attainment is taken over its direct-assessment scores; COs with
/// no recorded scores yet are skipped rather than fed to [`co_attainment`]
/// with an empty roster. Rows come out ordered by CO id, then PO id.
pub fn attainment_matrix(subject: &Subject, book: &ScoreBook) -> Vec<AttainmentLevel> {
    let po_ids = subject.po_ids();
    let mut matrix = Vec::new();

    for co in &subject.course_outcomes {
        let scores = book.co_student_scores(subject, &co.id);
        if scores.is_empty() {
            continue;
        }
        let co_pct = co_attainment(&scores, DEFAULT_CO_THRESHOLD);
        for po_id in &po_ids {
            matrix.push(po_attainment(co, co_pct, po_id));
        }
    }

    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::ScoreBook;
    use crate::subject::Subject;

    fn score(co: &str, value: f64, max: f64) -> StudentScore {
        StudentScore {
            co_id: co.to_string(),
            score: value,
            max_score: max,
        }
    }

    fn sample_co() -> CourseOutcome {
        CourseOutcome {
            id: "CO1".to_string(),
            description: "Apply mathematical foundations for analyzing algorithms".to_string(),
            mapping_levels: [("PO1".to_string(), 3u8), ("PO2".to_string(), 2u8)]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn test_co_attainment_half_pass() {
        // 85/100 clears 60, 55/100 does not: one of two passes
        let scores = vec![score("CO1", 85.0, 100.0), score("CO1", 55.0, 100.0)];
        let pct = co_attainment(&scores, 60.0);
        assert!((pct - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_co_attainment_all_pass() {
        let scores = vec![score("CO1", 90.0, 100.0), score("CO1", 60.0, 100.0)];
        assert!((co_attainment(&scores, 60.0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_co_attainment_threshold_inclusive() {
        let scores = vec![score("CO1", 60.0, 100.0)];
        assert!((co_attainment(&scores, 60.0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    #[should_panic(expected = "at least one student score")]
    fn test_co_attainment_empty_roster_panics() {
        co_attainment(&[], 60.0);
    }

    #[test]
    fn test_po_attainment_full_passthrough() {
        // Mapping level 3 passes 100% attainment straight through
        let co = sample_co();
        let result = po_attainment(&co, 100.0, "PO1");
        assert!((result.percentage - 100.0).abs() < f64::EPSILON);
        assert_eq!(result.level, 3);
        assert_eq!(result.co_id, "CO1");
        assert_eq!(result.po_id, "PO1");
    }

    #[test]
    fn test_po_attainment_scaled_by_mapping_level() {
        // Level 2 mapping scales attainment by 2/3
        let co = sample_co();
        let result = po_attainment(&co, 90.0, "PO2");
        assert!((result.percentage - 60.0).abs() < 1e-9);
        assert_eq!(result.level, 1);
    }

    #[test]
    fn test_po_attainment_unmapped_po() {
        let co = sample_co();
        let result = po_attainment(&co, 100.0, "PO9");
        assert!((result.percentage - 0.0).abs() < f64::EPSILON);
        assert_eq!(result.level, 1);
    }

    #[test]
    fn test_matrix_skips_cos_without_scores() {
        let subject = Subject::sample();
        let book = ScoreBook::new();
        assert!(attainment_matrix(&subject, &book).is_empty());
    }

    #[test]
    fn test_matrix_covers_all_pos_for_scored_co() {
        let subject = Subject::sample();
        let mut book = ScoreBook::new();
        let assessment = subject.direct_assessments[0].name.clone();
        for roll in subject.roll_numbers() {
            book.record_direct(&subject, &assessment, &roll, "CO1", 18.0);
        }

        let matrix = attainment_matrix(&subject, &book);
        let po_ids = subject.po_ids();
        let co1_rows: Vec<_> = matrix.iter().filter(|a| a.co_id == "CO1").collect();
        assert_eq!(co1_rows.len(), po_ids.len());
    }
}
