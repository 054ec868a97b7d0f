pub mod band;
pub mod distribution;
pub mod engine;

pub use band::{score_band, target_level, Band};
pub use distribution::{aggregate_distribution, ScoreDistribution};
pub use engine::{
    attainment_matrix, co_attainment, po_attainment, AttainmentLevel, StudentScore,
    DEFAULT_CO_THRESHOLD,
};
