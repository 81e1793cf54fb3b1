#![forbid(unsafe_code)]

//! Styles per scene role.

use crate::cell::{Rgb, Style, StyleFlags};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub node: Style,
    pub title: Style,
    pub feature: Style,
    /// Border of nodes and containers on the current execution branch.
    pub active: Style,
    /// Border of the selected node or container.
    pub selected: Style,
    pub container: Style,
    pub container_label: Style,
    pub link: Style,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            node: Style::new().fg(Rgb(0x9a, 0xa5, 0xb1)),
            title: Style::new().fg(Rgb(0xe6, 0xe6, 0xe6)).attrs(StyleFlags::BOLD),
            feature: Style::new().fg(Rgb(0x8b, 0x94, 0x9e)),
            active: Style::new()
                .fg(Rgb(0x3f, 0xb9, 0x50))
                .attrs(StyleFlags::BOLD),
            selected: Style::new()
                .fg(Rgb(0x58, 0xa6, 0xff))
                .attrs(StyleFlags::BOLD),
            container: Style::new().fg(Rgb(0x48, 0x4f, 0x58)),
            container_label: Style::new()
                .fg(Rgb(0x8b, 0x94, 0x9e))
                .attrs(StyleFlags::ITALIC),
            link: Style::new().fg(Rgb(0x6e, 0x76, 0x81)),
        }
    }

    /// Attributes only, for terminals without color.
    pub fn monochrome() -> Self {
        Self {
            node: Style::new(),
            title: Style::new().attrs(StyleFlags::BOLD),
            feature: Style::new().attrs(StyleFlags::DIM),
            active: Style::new().attrs(StyleFlags::BOLD),
            selected: Style::new().attrs(StyleFlags::REVERSE),
            container: Style::new().attrs(StyleFlags::DIM),
            container_label: Style::new().attrs(StyleFlags::ITALIC),
            link: Style::new(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
