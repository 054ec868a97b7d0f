pub mod formatter;

pub use formatter::{
    format_assessment_distributions, format_attainment_table, format_attainment_tsv,
    format_distribution, format_report, format_survey_analysis, should_use_colors,
};
