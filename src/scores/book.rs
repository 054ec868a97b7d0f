use std::collections::BTreeMap;

use crate::attainment::{
    aggregate_distribution, score_band, Band, ScoreDistribution, StudentScore,
};
use crate::subject::Subject;

/// Sentinel assessment name for the survey-based indirect assessment.
pub const INDIRECT_ASSESSMENT: &str = "indirect";

/// The CO id indirect survey scores are filed under.
pub const INDIRECT_CO: &str = "CO1";

/// Composite key for one score record. Uniqueness of
/// (roll number, assessment, CO) is enforced by the map itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScoreKey {
    pub roll_number: String,
    pub assessment: String,
    pub co_id: String,
}

/// A recorded score together with its derived band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreEntry {
    pub score: f64,
    pub band: Band,
}

/// All scores for one subject session, keyed by (roll, assessment, CO).
///
/// Every aggregate is recomputed from scratch on demand; at tens to low
/// hundreds of records that is the whole performance story.
#[derive(Debug, Clone, Default)]
pub struct ScoreBook {
    entries: BTreeMap<ScoreKey, ScoreEntry>,
}

impl ScoreBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, roll_number: &str, assessment: &str, co_id: &str) -> Option<&ScoreEntry> {
        self.entries.get(&ScoreKey {
            roll_number: roll_number.to_string(),
            assessment: assessment.to_string(),
            co_id: co_id.to_string(),
        })
    }

    /// Seed zero scores (band 1) for every (roll, CO) cell of a direct
    /// assessment, without touching cells that already hold a score.
    pub fn init_assessment(&mut self, subject: &Subject, assessment_name: &str) {
        let Some(assessment) = subject.direct_assessment(assessment_name) else {
            return;
        };
        let co_ids: Vec<String> = assessment.co_marks.keys().cloned().collect();
        for roll_number in subject.roll_numbers() {
            for co_id in &co_ids {
                self.entries
                    .entry(ScoreKey {
                        roll_number: roll_number.clone(),
                        assessment: assessment_name.to_string(),
                        co_id: co_id.clone(),
                    })
                    .or_insert(ScoreEntry {
                        score: 0.0,
                        band: Band::One,
                    });
            }
        }
    }

    /// Record (or update) a direct-assessment score. The raw value is
    /// clamped to the per-CO maximum and banded against the subject's
    /// thresholds. Unknown assessment names are ignored; a CO without an
    /// allotted maximum gets the neutral treatment (clamp to 0, band 1).
    pub fn record_direct(
        &mut self,
        subject: &Subject,
        assessment_name: &str,
        roll_number: &str,
        co_id: &str,
        raw_score: f64,
    ) {
        let Some(assessment) = subject.direct_assessment(assessment_name) else {
            return;
        };
        let max_for_co = assessment.co_marks.get(co_id).copied().unwrap_or(0.0);
        self.insert_banded(subject, assessment_name, roll_number, co_id, raw_score, max_for_co);
    }

    /// Record (or update) an indirect survey score, banded against the
    /// survey scale.
    pub fn record_indirect(&mut self, subject: &Subject, roll_number: &str, raw_score: f64) {
        let max = subject.indirect_assessment.max_marks;
        self.insert_banded(
            subject,
            INDIRECT_ASSESSMENT,
            roll_number,
            INDIRECT_CO,
            raw_score,
            max,
        );
    }

    fn insert_banded(
        &mut self,
        subject: &Subject,
        assessment: &str,
        roll_number: &str,
        co_id: &str,
        raw_score: f64,
        max_marks: f64,
    ) {
        let clamped = if max_marks > 0.0 {
            raw_score.clamp(0.0, max_marks)
        } else {
            0.0
        };
        let band = score_band(clamped, max_marks, subject.threshold2, subject.threshold3);
        self.entries.insert(
            ScoreKey {
                roll_number: roll_number.to_string(),
                assessment: assessment.to_string(),
                co_id: co_id.to_string(),
            },
            ScoreEntry {
                score: clamped,
                band,
            },
        );
    }

    /// Bands of every score in one assessment, across all COs.
    pub fn bands_for_assessment<'a>(
        &'a self,
        assessment: &'a str,
    ) -> impl Iterator<Item = Band> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key.assessment == assessment)
            .map(|(_, entry)| entry.band)
    }

    /// Bands of one (assessment, CO) pair.
    pub fn bands_for_co<'a>(
        &'a self,
        assessment: &'a str,
        co_id: &'a str,
    ) -> impl Iterator<Item = Band> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key.assessment == assessment && key.co_id == co_id)
            .map(|(_, entry)| entry.band)
    }

    /// Distribution over a whole assessment. Unknown names come back as the
    /// all-zero distribution.
    pub fn distribution_for_assessment(&self, assessment: &str) -> ScoreDistribution {
        aggregate_distribution(self.bands_for_assessment(assessment))
    }

    /// Distribution over one (assessment, CO) pair. Same reduction as
    /// [`Self::distribution_for_assessment`], narrower filter.
    pub fn distribution_for_co(&self, assessment: &str, co_id: &str) -> ScoreDistribution {
        aggregate_distribution(self.bands_for_co(assessment, co_id))
    }

    /// Collect a CO's direct-assessment scores as (score, max) pairs for the
    /// attainment engine. Entries whose assessment lacks an allotted maximum
    /// for this CO are excluded; no percentage can be formed for them.
    pub fn co_student_scores(&self, subject: &Subject, co_id: &str) -> Vec<StudentScore> {
        self.entries
            .iter()
            .filter(|(key, _)| key.co_id == co_id && key.assessment != INDIRECT_ASSESSMENT)
            .filter_map(|(key, entry)| {
                let max = subject
                    .direct_assessment(&key.assessment)?
                    .co_marks
                    .get(co_id)
                    .copied()?;
                if max <= 0.0 {
                    return None;
                }
                Some(StudentScore {
                    co_id: co_id.to_string(),
                    score: entry.score,
                    max_score: max,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::Subject;

    fn small_subject() -> Subject {
        let mut subject = Subject::sample();
        subject.student_count = 3;
        subject
    }

    #[test]
    fn test_init_assessment_fills_roster() {
        let subject = small_subject();
        let mut book = ScoreBook::new();
        book.init_assessment(&subject, "Internal Test 1");
        // 3 students x 3 COs
        assert_eq!(book.len(), 9);
        let entry = book.get("01", "Internal Test 1", "CO1").unwrap();
        assert_eq!(entry.score, 0.0);
        assert_eq!(entry.band, Band::One);
    }

    #[test]
    fn test_init_does_not_clobber_existing_scores() {
        let subject = small_subject();
        let mut book = ScoreBook::new();
        book.record_direct(&subject, "Internal Test 1", "02", "CO1", 18.0);
        book.init_assessment(&subject, "Internal Test 1");
        let entry = book.get("02", "Internal Test 1", "CO1").unwrap();
        assert_eq!(entry.score, 18.0);
    }

    #[test]
    fn test_record_clamps_to_co_max() {
        // CO1 is allotted 20 marks in Internal Test 1
        let subject = small_subject();
        let mut book = ScoreBook::new();
        book.record_direct(&subject, "Internal Test 1", "01", "CO1", 35.0);
        let entry = book.get("01", "Internal Test 1", "CO1").unwrap();
        assert_eq!(entry.score, 20.0);
        assert_eq!(entry.band, Band::Three);
    }

    #[test]
    fn test_record_bands_against_thresholds() {
        // 15/20 = 75%: band 2 at thresholds 60/80
        let subject = small_subject();
        let mut book = ScoreBook::new();
        book.record_direct(&subject, "Internal Test 1", "01", "CO1", 15.0);
        assert_eq!(
            book.get("01", "Internal Test 1", "CO1").unwrap().band,
            Band::Two
        );
    }

    #[test]
    fn test_record_same_key_updates_not_duplicates() {
        let subject = small_subject();
        let mut book = ScoreBook::new();
        book.record_direct(&subject, "Internal Test 1", "01", "CO1", 10.0);
        book.record_direct(&subject, "Internal Test 1", "01", "CO1", 17.0);
        assert_eq!(book.len(), 1);
        assert_eq!(book.get("01", "Internal Test 1", "CO1").unwrap().score, 17.0);
    }

    #[test]
    fn test_record_unknown_assessment_is_ignored() {
        let subject = small_subject();
        let mut book = ScoreBook::new();
        book.record_direct(&subject, "Surprise Quiz", "01", "CO1", 10.0);
        assert!(book.is_empty());
    }

    #[test]
    fn test_record_unallotted_co_is_neutral() {
        // Assignment has no CO3 allotment
        let subject = small_subject();
        let mut book = ScoreBook::new();
        book.record_direct(&subject, "Assignment", "01", "CO3", 10.0);
        let entry = book.get("01", "Assignment", "CO3").unwrap();
        assert_eq!(entry.score, 0.0);
        assert_eq!(entry.band, Band::One);
    }

    #[test]
    fn test_record_indirect_uses_survey_scale() {
        // 4/5 = 80%: band 3
        let subject = small_subject();
        let mut book = ScoreBook::new();
        book.record_indirect(&subject, "01", 4.0);
        let entry = book.get("01", INDIRECT_ASSESSMENT, INDIRECT_CO).unwrap();
        assert_eq!(entry.band, Band::Three);
    }

    #[test]
    fn test_distribution_granularities_share_totals() {
        let subject = small_subject();
        let mut book = ScoreBook::new();
        book.init_assessment(&subject, "Internal Test 1");
        book.record_direct(&subject, "Internal Test 1", "01", "CO1", 18.0);
        book.record_direct(&subject, "Internal Test 1", "02", "CO2", 10.0);

        let overall = book.distribution_for_assessment("Internal Test 1");
        assert_eq!(overall.total(), 9);

        let per_co_total: usize = ["CO1", "CO2", "CO3"]
            .iter()
            .map(|co| book.distribution_for_co("Internal Test 1", co).total())
            .sum();
        assert_eq!(per_co_total, overall.total());
    }

    #[test]
    fn test_distribution_unknown_assessment_all_zeros() {
        let book = ScoreBook::new();
        let dist = book.distribution_for_assessment("nope");
        assert_eq!(dist.total(), 0);
        assert_eq!(dist.average_band, 0.0);
    }

    #[test]
    fn test_co_student_scores_excludes_indirect() {
        let subject = small_subject();
        let mut book = ScoreBook::new();
        book.record_direct(&subject, "Internal Test 1", "01", "CO1", 18.0);
        book.record_indirect(&subject, "01", 4.0);

        let scores = book.co_student_scores(&subject, "CO1");
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].max_score, 20.0);
    }

    #[test]
    fn test_co_student_scores_spans_assessments() {
        // CO1 is covered by both Internal Test 1 (out of 20) and Assignment (out of 10)
        let subject = small_subject();
        let mut book = ScoreBook::new();
        book.record_direct(&subject, "Internal Test 1", "01", "CO1", 18.0);
        book.record_direct(&subject, "Assignment", "01", "CO1", 6.0);

        let scores = book.co_student_scores(&subject, "CO1");
        assert_eq!(scores.len(), 2);
        let maxes: Vec<f64> = scores.iter().map(|s| s.max_score).collect();
        assert!(maxes.contains(&20.0));
        assert!(maxes.contains(&10.0));
    }
}
