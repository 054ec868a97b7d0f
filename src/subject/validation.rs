use super::schema::Subject;
use std::collections::BTreeSet;

const DIRECT_POOL: f64 = 80.0;
const INDIRECT_POOL: f64 = 20.0;

/// Validate a subject definition before anything else runs.
/// Returns all validation errors at once (not just the first).
///
/// Deliberately permissive where the original behavior was permissive:
/// `threshold2 <= threshold3` is not checked, and per-CO marks are not
/// required to sum to an assessment's overall maximum.
pub fn validate_subject(subject: &Subject) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if subject.student_count == 0 {
        errors.push("student_count: must be positive".to_string());
    }

    for (field, value) in [
        ("threshold2", subject.threshold2),
        ("threshold3", subject.threshold3),
    ] {
        if !(0.0..=100.0).contains(&value) {
            errors.push(format!("{}: must be within [0, 100], got {}", field, value));
        }
    }

    let weightage_sum: f64 = subject.direct_assessments.iter().map(|a| a.weightage).sum();
    if (weightage_sum - DIRECT_POOL).abs() > 1e-9 {
        errors.push(format!(
            "direct_assessments: weightages must sum to {}, got {}",
            DIRECT_POOL, weightage_sum
        ));
    }

    if (subject.indirect_assessment.weightage - INDIRECT_POOL).abs() > 1e-9 {
        errors.push(format!(
            "indirect_assessment.weightage: fixed at {}, got {}",
            INDIRECT_POOL, subject.indirect_assessment.weightage
        ));
    }

    let mut seen_assessments = BTreeSet::new();
    for (i, assessment) in subject.direct_assessments.iter().enumerate() {
        if !seen_assessments.insert(assessment.name.as_str()) {
            errors.push(format!(
                "direct_assessments[{}].name: duplicate name '{}'",
                i, assessment.name
            ));
        }
    }

    let mut seen_cos = BTreeSet::new();
    for (i, co) in subject.course_outcomes.iter().enumerate() {
        if !seen_cos.insert(co.id.as_str()) {
            errors.push(format!(
                "course_outcomes[{}].id: duplicate id '{}'",
                i, co.id
            ));
        }
        for (po_id, level) in &co.mapping_levels {
            if *level > 3 {
                errors.push(format!(
                    "course_outcomes[{}].mapping_levels.{}: level must be 0..=3, got {}",
                    i, po_id, level
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
