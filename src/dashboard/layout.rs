//! Responsive layout and transient notices

use std::time::{Duration, Instant};

/// Viewport class, by width in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Mobile,
    Tablet,
    Desktop,
}

impl LayoutMode {
    pub fn from_width(width: u32) -> Self {
        match width {
            0..=767 => Self::Mobile,
            768..=1023 => Self::Tablet,
            _ => Self::Desktop,
        }
    }

    /// The sidebar starts open only on desktop
    pub fn sidebar_open_by_default(&self) -> bool {
        matches!(self, Self::Desktop)
    }

    /// On narrow screens the sidebar is an overlay that closes after a pick
    pub fn closes_sidebar_on_select(&self) -> bool {
        !matches!(self, Self::Desktop)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A message shown to the user after an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    created: Instant,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self::at(NoticeLevel::Success, message, Instant::now())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::at(NoticeLevel::Error, message, Instant::now())
    }

    fn at(level: NoticeLevel, message: impl Into<String>, created: Instant) -> Self {
        Self {
            level,
            message: message.into(),
            created,
        }
    }

    /// Success notices clear after `ttl`; errors stay until replaced
    pub fn is_visible_at(&self, now: Instant, ttl: Duration) -> bool {
        match self.level {
            NoticeLevel::Error => true,
            NoticeLevel::Success => now.saturating_duration_since(self.created) < ttl,
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.level {
            NoticeLevel::Success => write!(f, "{}", self.message),
            NoticeLevel::Error => write!(f, "Error: {}", self.message),
        }
    }
}
