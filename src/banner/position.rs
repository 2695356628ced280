use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tracing::debug;

config_enum! {
    /// Where the banner sits on the page.
    pub enum BannerPosition {
        Bottom => "bottom",
        Top => "top",
        BottomLeft => "bottom-left",
        BottomRight => "bottom-right",
        TopLeft => "top-left",
        TopRight => "top-right",
        FloatingBottom => "floating-bottom",
        FloatingTop => "floating-top",
        Center => "center",
        ModalBottom => "modal-bottom",
        ModalFullscreen => "modal-fullscreen",
        SlideInLeft => "slide-in-left",
        SlideInRight => "slide-in-right",
    }
    default = Bottom;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionFamily {
    Bar,
    Floating,
    Modal,
    SlideIn,
}

impl BannerPosition {
    pub fn family(self) -> PositionFamily {
        match self {
            Self::Bottom | Self::Top => PositionFamily::Bar,
            Self::BottomLeft
            | Self::BottomRight
            | Self::TopLeft
            | Self::TopRight
            | Self::FloatingBottom
            | Self::FloatingTop => PositionFamily::Floating,
            Self::Center | Self::ModalBottom | Self::ModalFullscreen => PositionFamily::Modal,
            Self::SlideInLeft | Self::SlideInRight => PositionFamily::SlideIn,
        }
    }

    /// Inline positioning declarations for the banner root.
    pub fn css_fragment(self) -> &'static str {
        match self {
            Self::Bottom => "bottom:0;left:0;right:0;",
            Self::Top => "top:0;left:0;right:0;",
            Self::BottomLeft => "bottom:20px;left:20px;",
            Self::BottomRight => "bottom:20px;right:20px;",
            Self::TopLeft => "top:20px;left:20px;",
            Self::TopRight => "top:20px;right:20px;",
            Self::FloatingBottom => "bottom:20px;left:50%;transform:translateX(-50%);",
            Self::FloatingTop => "top:20px;left:50%;transform:translateX(-50%);",
            Self::Center => "top:50%;left:50%;transform:translate(-50%,-50%);",
            Self::ModalBottom => "bottom:0;left:50%;transform:translateX(-50%);",
            Self::ModalFullscreen => "top:0;left:0;right:0;bottom:0;",
            Self::SlideInLeft => "bottom:20px;left:0;",
            Self::SlideInRight => "bottom:20px;right:0;",
        }
    }

    pub fn has_close_button(self) -> bool {
        matches!(
            self.family(),
            PositionFamily::Floating | PositionFamily::Modal
        )
    }
}
