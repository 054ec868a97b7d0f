//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;

use crate::attainment::Band;

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Band colors (traffic light pattern, band 3 is good)
    pub band_high: Color,
    pub band_mid: Color,
    pub band_low: Color,

    // Bar colors
    pub bar_empty: Color,

    // Table colors
    pub row_alt_bg: Color,
    pub index_color: Color,

    // Styles
    pub header_style: Style,
    pub row_selected: Style,
    pub cell_selected: Style,

    // General colors
    pub muted: Color,
    pub title_color: Color,

    // Tab colors
    pub tab_active_style: Style,
    pub tab_inactive_style: Style,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,
}

impl ThemeColors {
    /// Dark theme palette
    pub fn dark() -> Self {
        Self {
            band_high: Color::Green,
            band_mid: Color::Yellow,
            band_low: Color::Red,
            bar_empty: Color::DarkGray,
            row_alt_bg: Color::Indexed(235),
            index_color: Color::DarkGray,
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            cell_selected: Style::new().reversed().bold(),
            muted: Color::Gray,
            title_color: Color::Cyan,
            tab_active_style: Style::new().fg(Color::Cyan).bold(),
            tab_inactive_style: Style::new().fg(Color::DarkGray),
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
        }
    }

    /// Light theme palette for light terminal backgrounds
    pub fn light() -> Self {
        Self {
            band_high: Color::Indexed(28),
            band_mid: Color::Indexed(130),
            band_low: Color::Indexed(124),
            bar_empty: Color::Indexed(250),
            row_alt_bg: Color::Indexed(254),
            index_color: Color::Indexed(245),
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            cell_selected: Style::new().reversed().bold(),
            muted: Color::Indexed(243),
            title_color: Color::Indexed(26),
            tab_active_style: Style::new().fg(Color::Indexed(26)).bold(),
            tab_inactive_style: Style::new().fg(Color::Indexed(245)),
            status_bar_bg: Color::Indexed(253),
            status_key_color: Color::Indexed(26),
            flash_success: Color::Indexed(28),
            flash_error: Color::Indexed(124),
        }
    }

    /// Color for a band value (3 = high/good, 1 = low)
    pub fn band_color(&self, band: Band) -> Color {
        match band {
            Band::Three => self.band_high,
            Band::Two => self.band_mid,
            Band::One => self.band_low,
        }
    }

    /// Color for an attainment level (same scale as bands)
    pub fn level_color(&self, level: u8) -> Color {
        match level {
            3 => self.band_high,
            2 => self.band_mid,
            _ => self.band_low,
        }
    }
}

/// Pick a palette matching the terminal background. Detection failures fall
/// back to the dark palette.
pub fn resolve_theme() -> ThemeColors {
    match terminal_light::luma() {
        Ok(luma) if luma > 0.6 => ThemeColors::light(),
        _ => ThemeColors::dark(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_color_traffic_light() {
        let theme = ThemeColors::dark();
        assert_eq!(theme.band_color(Band::Three), theme.band_high);
        assert_eq!(theme.band_color(Band::Two), theme.band_mid);
        assert_eq!(theme.band_color(Band::One), theme.band_low);
    }

    #[test]
    fn test_level_color_unknown_is_low() {
        let theme = ThemeColors::dark();
        assert_eq!(theme.level_color(0), theme.band_low);
    }
}
