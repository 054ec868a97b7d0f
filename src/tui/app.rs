use std::time::Instant;

use crate::scores::{ScoreBook, INDIRECT_CO};
use crate::subject::{DirectAssessment, Subject};
use crate::tui::theme::ThemeColors;

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    ScoreInput,
    Help,
}

/// What the current tab shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tab {
    Assessment(usize),
    Indirect,
    Analytics,
}

pub struct App {
    pub subject: Subject,
    pub book: ScoreBook,
    pub theme: ThemeColors,
    pub tab_index: usize,
    pub table_state: ratatui::widgets::TableState,
    pub selected_col: usize,
    pub input_mode: InputMode,
    pub score_input: String,
    pub flash_message: Option<(String, Instant)>,
    pub should_quit: bool,
}

impl App {
    pub fn new(subject: Subject, book: ScoreBook, theme: ThemeColors) -> Self {
        let mut table_state = ratatui::widgets::TableState::default();
        if subject.student_count > 0 {
            table_state.select(Some(0));
        }

        Self {
            subject,
            book,
            theme,
            tab_index: 0,
            table_state,
            selected_col: 0,
            input_mode: InputMode::Normal,
            score_input: String::new(),
            flash_message: None,
            should_quit: false,
        }
    }

    fn tab_count(&self) -> usize {
        // One per direct assessment, then Indirect, then Analytics
        self.subject.direct_assessments.len() + 2
    }

    pub fn tab_titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self
            .subject
            .direct_assessments
            .iter()
            .map(|a| a.name.clone())
            .collect();
        titles.push(format!(
            "Indirect ({}%)",
            self.subject.indirect_assessment.weightage
        ));
        titles.push("Analytics".to_string());
        titles
    }

    pub fn current_tab(&self) -> Tab {
        let direct = self.subject.direct_assessments.len();
        if self.tab_index < direct {
            Tab::Assessment(self.tab_index)
        } else if self.tab_index == direct {
            Tab::Indirect
        } else {
            Tab::Analytics
        }
    }

    pub fn current_assessment(&self) -> Option<&DirectAssessment> {
        match self.current_tab() {
            Tab::Assessment(i) => self.subject.direct_assessments.get(i),
            _ => None,
        }
    }

    /// CO column ids for the current tab. Empty on the analytics tab.
    pub fn column_cos(&self) -> Vec<String> {
        match self.current_tab() {
            Tab::Assessment(_) => self
                .current_assessment()
                .map(|a| a.co_marks.keys().cloned().collect())
                .unwrap_or_default(),
            Tab::Indirect => vec![INDIRECT_CO.to_string()],
            Tab::Analytics => Vec::new(),
        }
    }

    pub fn next_tab(&mut self) {
        self.tab_index = (self.tab_index + 1) % self.tab_count();
        self.reset_selection();
    }

    pub fn previous_tab(&mut self) {
        let count = self.tab_count();
        self.tab_index = (self.tab_index + count - 1) % count;
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        self.selected_col = 0;
        if self.subject.student_count > 0 && !matches!(self.current_tab(), Tab::Analytics) {
            self.table_state.select(Some(0));
        } else {
            self.table_state.select(None);
        }
    }

    pub fn next_row(&mut self) {
        let rows = self.subject.student_count;
        if rows == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= rows - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let rows = self.subject.student_count;
        if rows == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    rows - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn next_col(&mut self) {
        let cols = self.column_cos().len();
        if cols == 0 {
            return;
        }
        self.selected_col = (self.selected_col + 1) % cols;
    }

    pub fn previous_col(&mut self) {
        let cols = self.column_cos().len();
        if cols == 0 {
            return;
        }
        self.selected_col = (self.selected_col + cols - 1) % cols;
    }

    pub fn selected_roll(&self) -> Option<String> {
        self.table_state
            .selected()
            .map(|i| crate::subject::roll_number(i + 1))
    }

    pub fn selected_co(&self) -> Option<String> {
        self.column_cos().get(self.selected_col).cloned()
    }

    /// Start editing the selected cell. No-op on the analytics tab.
    pub fn start_score_input(&mut self) {
        if matches!(self.current_tab(), Tab::Analytics) {
            return;
        }
        if self.selected_roll().is_some() && self.selected_co().is_some() {
            self.input_mode = InputMode::ScoreInput;
            self.score_input.clear();
        }
    }

    pub fn cancel_score_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.score_input.clear();
    }

    /// Commit the typed score into the book. Non-numeric input counts as 0,
    /// matching the import behavior.
    pub fn confirm_score_input(&mut self) {
        let (Some(roll), Some(co_id)) = (self.selected_roll(), self.selected_co()) else {
            self.input_mode = InputMode::Normal;
            return;
        };

        let raw = self.score_input.trim().parse::<f64>().unwrap_or(0.0);

        match self.current_tab() {
            Tab::Assessment(_) => {
                let name = match self.current_assessment() {
                    Some(a) => a.name.clone(),
                    None => {
                        self.input_mode = InputMode::Normal;
                        return;
                    }
                };
                self.book.record_direct(&self.subject, &name, &roll, &co_id, raw);
                let recorded = self
                    .book
                    .get(&roll, &name, &co_id)
                    .map(|e| e.score)
                    .unwrap_or(0.0);
                self.show_flash(format!("Recorded {} for {} / {}", recorded, roll, co_id));
            }
            Tab::Indirect => {
                self.book.record_indirect(&self.subject, &roll, raw);
                self.show_flash(format!("Recorded survey score for {}", roll));
            }
            Tab::Analytics => {}
        }

        self.input_mode = InputMode::Normal;
        self.score_input.clear();
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }
}
