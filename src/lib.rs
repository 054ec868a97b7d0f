pub mod attainment;
pub mod credentials;
pub mod import;
pub mod output;
pub mod scores;
pub mod stderr_buffer;
pub mod subject;
pub mod survey;
pub mod tui;
