// src/ui.rs
use iced::widget::container;
use iced::{Background, Color, Theme};
use once_cell::sync::Lazy;

use crate::settings::ThemeMode;
use crate::viewer_state::NotificationKind;

pub struct Styles {
    pub fg: Color,
    pub muted_fg: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub stripe_bg: Color,
    pub link_fg: Color,
    pub success_fg: Color,
    pub warning_fg: Color,
    pub error_fg: Color,
}

pub static DARK_THEME: Lazy<Styles> = Lazy::new(|| Styles {
    fg: Color::from_rgb(0.95, 0.95, 0.96),
    muted_fg: Color::from_rgb(0.61, 0.64, 0.69), // #9ca3af
    header_bg: Color::from_rgb(0.12, 0.16, 0.22), // #1f2937
    header_fg: Color::from_rgb(0.82, 0.84, 0.86),
    stripe_bg: Color::from_rgb(0.08, 0.1, 0.14),
    link_fg: Color::from_rgb(0.38, 0.65, 0.98), // #60a5fa
    success_fg: Color::from_rgb(0.29, 0.87, 0.5),
    warning_fg: Color::from_rgb(0.98, 0.75, 0.14),
    error_fg: Color::from_rgb(0.97, 0.44, 0.44),
});

pub static LIGHT_THEME: Lazy<Styles> = Lazy::new(|| Styles {
    fg: Color::from_rgb(0.07, 0.09, 0.15),
    muted_fg: Color::from_rgb(0.42, 0.45, 0.5), // #6b7280
    header_bg: Color::from_rgb(0.98, 0.98, 0.98), // #f9fafb
    header_fg: Color::from_rgb(0.42, 0.45, 0.5),
    stripe_bg: Color::from_rgb(0.96, 0.97, 0.98),
    link_fg: Color::from_rgb(0.15, 0.39, 0.92), // #2563eb
    success_fg: Color::from_rgb(0.09, 0.64, 0.29),
    warning_fg: Color::from_rgb(0.85, 0.47, 0.02),
    error_fg: Color::from_rgb(0.86, 0.15, 0.15),
});

pub fn styles(mode: ThemeMode) -> &'static Styles {
    match mode {
        ThemeMode::Dark => &DARK_THEME,
        ThemeMode::Light => &LIGHT_THEME,
    }
}

pub fn iced_theme(mode: ThemeMode) -> Theme {
    match mode {
        ThemeMode::Dark => Theme::Dark,
        ThemeMode::Light => Theme::Light,
    }
}

impl Styles {
    pub fn notification_fg(&self, kind: NotificationKind) -> Color {
        match kind {
            NotificationKind::Success => self.success_fg,
            NotificationKind::Warning => self.warning_fg,
            NotificationKind::Error => self.error_fg,
        }
    }
}

/// Flat background used for the header row and striped rows.
pub struct ContainerStyle {
    pub bg: Color,
}

impl container::StyleSheet for ContainerStyle {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> container::Appearance {
        container::Appearance {
            background: Some(Background::Color(self.bg)),
            ..Default::default()
        }
    }
}

pub fn background(bg: Color) -> iced::theme::Container {
    iced::theme::Container::Custom(Box::new(ContainerStyle { bg }))
}
