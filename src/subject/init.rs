use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use super::schema::{CourseOutcome, DirectAssessment, IndirectAssessment, Subject};
use super::{get_subject_path, validate_subject};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout().flush().context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Prompt for a number until it parses and passes `accept`.
fn prompt_number(message: &str, default: &str, accept: impl Fn(f64) -> bool) -> Result<f64> {
    loop {
        let input = prompt_with_default(message, default)?;
        match input.parse::<f64>() {
            Ok(v) if accept(v) => return Ok(v),
            Ok(_) => println!("  Out of range. Try again."),
            Err(_) => println!("  Invalid: must be a number. Try again."),
        }
    }
}

/// Parse a mapping-level line like "PO1=3 PO2=2 PO4=1".
fn parse_mapping_levels(input: &str) -> Result<BTreeMap<String, u8>, String> {
    let mut levels = BTreeMap::new();
    for pair in input.split_whitespace() {
        let (po, level) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected PO=LEVEL, got '{}'", pair))?;
        let level: u8 = level
            .parse()
            .map_err(|_| format!("level must be an integer, got '{}'", level))?;
        if level > 3 {
            return Err(format!("level must be 0..=3, got {}", level));
        }
        levels.insert(po.to_string(), level);
    }
    Ok(levels)
}

fn collect_course_outcomes() -> Result<Vec<CourseOutcome>> {
    println!();
    println!("Course outcomes (COs) describe what students should be able to do.");
    println!("Map each CO to program outcomes with levels 0-3, e.g. 'PO1=3 PO2=2'.");

    let mut cos = Vec::new();
    loop {
        let default_id = format!("CO{}", cos.len() + 1);
        let id = prompt_with_default("  CO id", &default_id)?;
        let description = loop {
            let d = prompt("  Description: ")?;
            if !d.is_empty() {
                break d;
            }
            println!("  Description is required.");
        };
        let mapping_levels = loop {
            let input = prompt("  Mapping levels (e.g. 'PO1=3 PO2=2', empty = unmapped): ")?;
            match parse_mapping_levels(&input) {
                Ok(levels) => break levels,
                Err(e) => println!("  Invalid: {}. Try again.", e),
            }
        };
        cos.push(CourseOutcome {
            id,
            description,
            mapping_levels,
        });
        if !prompt_yes_no("  Add another CO?", cos.len() < 2)? {
            break;
        }
    }
    Ok(cos)
}

fn collect_co_marks(co_ids: &[String]) -> Result<BTreeMap<String, f64>> {
    let mut co_marks = BTreeMap::new();
    for co_id in co_ids {
        let marks = prompt_number(
            &format!("    Max marks for {} (0 = not covered)", co_id),
            "0",
            |v| v >= 0.0,
        )?;
        if marks > 0.0 {
            co_marks.insert(co_id.clone(), marks);
        }
    }
    Ok(co_marks)
}

fn collect_direct_assessments(co_ids: &[String]) -> Result<Vec<DirectAssessment>> {
    println!();
    println!("Direct assessments share an 80-point weightage pool; the survey-based");
    println!("indirect assessment carries the remaining 20. Weightages must sum to 80.");

    loop {
        let mut assessments: Vec<DirectAssessment> = Vec::new();
        loop {
            println!();
            let name = loop {
                let n = prompt("  Assessment name (e.g. 'Internal Test 1'): ")?;
                if !n.is_empty() {
                    break n;
                }
                println!("  Name is required.");
            };
            let allocated: f64 = assessments.iter().map(|a| a.weightage).sum();
            let remaining = 80.0 - allocated;
            let weightage = prompt_number(
                &format!("  Weightage (remaining pool: {})", remaining),
                &format!("{}", remaining),
                |v| v > 0.0,
            )?;
            let max_marks = prompt_number("  Overall max marks", "50", |v| v > 0.0)?;
            let co_marks = collect_co_marks(co_ids)?;

            assessments.push(DirectAssessment {
                name,
                weightage,
                max_marks,
                co_marks,
            });

            let sum: f64 = assessments.iter().map(|a| a.weightage).sum();
            if sum >= 80.0 {
                break;
            }
            if !prompt_yes_no("  Add another assessment?", true)? {
                break;
            }
        }

        let sum: f64 = assessments.iter().map(|a| a.weightage).sum();
        if (sum - 80.0).abs() < 1e-9 {
            return Ok(assessments);
        }
        println!(
            "  Weightages sum to {} but must sum to 80. Let's redo the assessments.",
            sum
        );
    }
}

/// Run the interactive wizard to create a subject file.
///
/// If `default_path` is Some, uses that as the subject file path.
/// Otherwise, prompts the user with the default path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("Attainboard Subject Wizard");
    println!("==========================");
    println!();

    let sample = Subject::sample();

    let subject = if prompt_yes_no("Start from the built-in example subject?", false)? {
        sample
    } else {
        let name = loop {
            let n = prompt("Subject name: ")?;
            if !n.is_empty() {
                break n;
            }
            println!("  Subject name is required.");
        };
        let code = prompt_with_default("Subject code", "CS301")?;
        let id = prompt_with_default(
            "Subject id",
            &code.to_lowercase().replace(' ', "-"),
        )?;

        println!();
        println!("Band thresholds are percentages: a score at or above threshold3 lands");
        println!("in band 3, at or above threshold2 in band 2, below in band 1.");
        let threshold2 = prompt_number("threshold2", "60", |v| (0.0..=100.0).contains(&v))?;
        let threshold3 = prompt_number("threshold3", "80", |v| (0.0..=100.0).contains(&v))?;

        let student_count =
            prompt_number("Number of students", "30", |v| v >= 1.0 && v.fract() == 0.0)? as usize;

        let course_outcomes = collect_course_outcomes()?;
        let co_ids: Vec<String> = course_outcomes.iter().map(|co| co.id.clone()).collect();
        let direct_assessments = collect_direct_assessments(&co_ids)?;

        println!();
        let indirect_max = prompt_number("Indirect assessment max score (survey scale)", "5", |v| {
            v > 0.0
        })?;

        Subject {
            id,
            name,
            code,
            threshold2,
            threshold3,
            student_count,
            course_outcomes,
            direct_assessments,
            indirect_assessment: IndirectAssessment {
                weightage: 20.0,
                max_marks: indirect_max,
            },
        }
    };

    if let Err(errors) = validate_subject(&subject) {
        eprintln!("Subject definition is invalid:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        anyhow::bail!("Aborted without writing anything");
    }

    let default_subject_path = default_path.unwrap_or_else(get_subject_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the subject file be saved?",
        &default_subject_path.display().to_string(),
    )?;
    let subject_path = PathBuf::from(&path_str);

    if subject_path.exists()
        && !prompt_yes_no(
            &format!(
                "Subject file already exists at {}. Overwrite?",
                subject_path.display()
            ),
            false,
        )?
    {
        println!("Aborted.");
        return Ok(());
    }

    let yaml = serde_saphyr::to_string(&subject)
        .map_err(|e| anyhow::anyhow!("Failed to serialize subject: {}", e))?;

    if let Some(parent) = subject_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(&subject_path)
        .with_context(|| format!("Failed to open {} for writing", subject_path.display()))?;
    file.write_all(yaml.as_bytes())
        .context("Failed to write subject file")?;
    file.commit().context("Failed to commit subject file")?;

    println!();
    println!("Subject written to {}", subject_path.display());
    println!("Run `attainboard` to open the score board, or `attainboard report`");
    println!("once you have score files to feed it.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mapping_levels() {
        let levels = parse_mapping_levels("PO1=3 PO2=2 PO4=1").unwrap();
        assert_eq!(levels.get("PO1"), Some(&3));
        assert_eq!(levels.get("PO2"), Some(&2));
        assert_eq!(levels.get("PO3"), None);
        assert_eq!(levels.get("PO4"), Some(&1));
    }

    #[test]
    fn test_parse_mapping_levels_empty() {
        assert!(parse_mapping_levels("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_mapping_levels_rejects_bad_pair() {
        assert!(parse_mapping_levels("PO1").is_err());
        assert!(parse_mapping_levels("PO1=x").is_err());
    }

    #[test]
    fn test_parse_mapping_levels_rejects_level_above_three() {
        assert!(parse_mapping_levels("PO1=4").is_err());
    }
}
