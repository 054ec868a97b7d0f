use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A subject definition as loaded from the YAML file.
///
/// Example:
/// ```yaml
/// id: cs301-2025
/// name: Design and Analysis of Algorithms
/// code: CS301
/// threshold2: 60
/// threshold3: 80
/// student_count: 30
/// course_outcomes:
///   - id: CO1
///     description: Apply mathematical foundations for analyzing algorithms
///     mapping_levels: { PO1: 3, PO2: 2 }
/// direct_assessments:
///   - name: Internal Test 1
///     weightage: 50
///     max_marks: 50
///     co_marks: { CO1: 20, CO2: 15, CO3: 15 }
/// indirect_assessment:
///   max_marks: 5
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub code: String,

    /// Percentage at or above which a score lands in band 2.
    pub threshold2: f64,

    /// Percentage at or above which a score lands in band 3. Checked before
    /// threshold2; ordering against threshold2 is deliberately not enforced.
    pub threshold3: f64,

    pub student_count: usize,

    pub course_outcomes: Vec<CourseOutcome>,
    pub direct_assessments: Vec<DirectAssessment>,
    pub indirect_assessment: IndirectAssessment,
}

/// An instructor-graded activity drawing from the 80% direct pool.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DirectAssessment {
    pub name: String,

    /// Share of the 80-point direct pool. All direct weightages must sum
    /// to exactly 80.
    pub weightage: f64,

    /// Overall maximum for the assessment. Per-CO marks are not required to
    /// sum to this; the leniency is intentional.
    pub max_marks: f64,

    /// Maximum marks allotted to each CO within this assessment.
    #[serde(default)]
    pub co_marks: BTreeMap<String, f64>,
}

/// The survey-based instrument carrying the remaining 20%.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IndirectAssessment {
    /// Fixed at 20 percentage points; present in the file for completeness.
    #[serde(default = "default_indirect_weightage")]
    pub weightage: f64,

    pub max_marks: f64,
}

fn default_indirect_weightage() -> f64 {
    20.0
}

/// A course outcome and its CO->PO mapping levels.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CourseOutcome {
    pub id: String,
    pub description: String,

    /// PO id -> mapping level in 0..=3. Absent keys mean "unmapped".
    #[serde(default)]
    pub mapping_levels: BTreeMap<String, u8>,
}

impl CourseOutcome {
    /// Total lookup of the mapping level for a PO, defaulting to 0 for
    /// absent keys. An explicitly entered 0 and an absent key behave the
    /// same: no contribution.
    pub fn mapping_level(&self, po_id: &str) -> u8 {
        self.mapping_levels.get(po_id).copied().unwrap_or(0)
    }
}

/// Ordinal roll number, 1-based and zero-padded to width 2 ("01", "02", ...).
///
/// Roll numbers are positional: re-deriving them from the student count is
/// the only way to enumerate the roster.
pub fn roll_number(ordinal: usize) -> String {
    format!("{:02}", ordinal)
}

impl Subject {
    /// The full roster as derived roll numbers, 1..=student_count.
    pub fn roll_numbers(&self) -> Vec<String> {
        (1..=self.student_count).map(roll_number).collect()
    }

    pub fn direct_assessment(&self, name: &str) -> Option<&DirectAssessment> {
        self.direct_assessments.iter().find(|a| a.name == name)
    }

    pub fn course_outcome(&self, id: &str) -> Option<&CourseOutcome> {
        self.course_outcomes.iter().find(|co| co.id == id)
    }

    /// Sorted union of every PO id mapped by any CO.
    pub fn po_ids(&self) -> Vec<String> {
        let set: BTreeSet<String> = self
            .course_outcomes
            .iter()
            .flat_map(|co| co.mapping_levels.keys().cloned())
            .collect();
        set.into_iter().collect()
    }

    /// A filled-in example subject, used as the wizard's starting point and
    /// in tests.
    pub fn sample() -> Self {
        Subject {
            id: "cs301-2025".to_string(),
            name: "Design and Analysis of Algorithms".to_string(),
            code: "CS301".to_string(),
            threshold2: 60.0,
            threshold3: 80.0,
            student_count: 30,
            course_outcomes: vec![
                CourseOutcome {
                    id: "CO1".to_string(),
                    description: "Apply mathematical foundations for analyzing algorithms"
                        .to_string(),
                    mapping_levels: [
                        ("PO1".to_string(), 3),
                        ("PO2".to_string(), 2),
                        ("PO3".to_string(), 1),
                        ("PO4".to_string(), 2),
                    ]
                    .into_iter()
                    .collect(),
                },
                CourseOutcome {
                    id: "CO2".to_string(),
                    description: "Design efficient algorithms using different paradigms"
                        .to_string(),
                    mapping_levels: [
                        ("PO1".to_string(), 2),
                        ("PO2".to_string(), 3),
                        ("PO3".to_string(), 2),
                        ("PO4".to_string(), 1),
                    ]
                    .into_iter()
                    .collect(),
                },
                CourseOutcome {
                    id: "CO3".to_string(),
                    description: "Implement and analyze graph algorithms".to_string(),
                    mapping_levels: [
                        ("PO1".to_string(), 1),
                        ("PO2".to_string(), 3),
                        ("PO3".to_string(), 3),
                        ("PO4".to_string(), 2),
                    ]
                    .into_iter()
                    .collect(),
                },
            ],
            direct_assessments: vec![
                DirectAssessment {
                    name: "Internal Test 1".to_string(),
                    weightage: 50.0,
                    max_marks: 50.0,
                    co_marks: [
                        ("CO1".to_string(), 20.0),
                        ("CO2".to_string(), 15.0),
                        ("CO3".to_string(), 15.0),
                    ]
                    .into_iter()
                    .collect(),
                },
                DirectAssessment {
                    name: "Assignment".to_string(),
                    weightage: 30.0,
                    max_marks: 20.0,
                    co_marks: [("CO1".to_string(), 10.0), ("CO2".to_string(), 10.0)]
                        .into_iter()
                        .collect(),
                },
            ],
            indirect_assessment: IndirectAssessment {
                weightage: 20.0,
                max_marks: 5.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_number_padding() {
        assert_eq!(roll_number(1), "01");
        assert_eq!(roll_number(9), "09");
        assert_eq!(roll_number(10), "10");
        assert_eq!(roll_number(100), "100");
    }

    #[test]
    fn test_roll_numbers_cover_roster() {
        let mut subject = Subject::sample();
        subject.student_count = 3;
        assert_eq!(subject.roll_numbers(), vec!["01", "02", "03"]);
    }

    #[test]
    fn test_mapping_level_absent_is_zero() {
        let subject = Subject::sample();
        let co = subject.course_outcome("CO1").unwrap();
        assert_eq!(co.mapping_level("PO1"), 3);
        assert_eq!(co.mapping_level("PO9"), 0);
    }

    #[test]
    fn test_po_ids_sorted_union() {
        let subject = Subject::sample();
        assert_eq!(subject.po_ids(), vec!["PO1", "PO2", "PO3", "PO4"]);
    }

    #[test]
    fn test_sample_weightages_sum_to_80() {
        let subject = Subject::sample();
        let sum: f64 = subject.direct_assessments.iter().map(|a| a.weightage).sum();
        assert!((sum - 80.0).abs() < f64::EPSILON);
        assert!((subject.indirect_assessment.weightage - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let subject = Subject::sample();
        let yaml = serde_saphyr::to_string(&subject).unwrap();
        let parsed: Subject = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(subject, parsed);
    }

    #[test]
    fn test_parse_minimal_yaml() {
        let yaml = r#"
id: m101
name: Mathematics
code: M101
threshold2: 50
threshold3: 75
student_count: 10
course_outcomes:
  - id: CO1
    description: Solve linear systems
    mapping_levels: { PO1: 2 }
direct_assessments:
  - name: Midterm
    weightage: 80
    max_marks: 100
    co_marks: { CO1: 100 }
indirect_assessment:
  max_marks: 5
"#;
        let subject: Subject = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(subject.code, "M101");
        // Indirect weightage defaults to the fixed 20 when omitted
        assert!((subject.indirect_assessment.weightage - 20.0).abs() < f64::EPSILON);
        assert_eq!(subject.direct_assessment("Midterm").unwrap().weightage, 80.0);
        assert!(subject.direct_assessment("Final").is_none());
    }
}
