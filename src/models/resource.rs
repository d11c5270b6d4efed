//! Backend resource and editable component identifiers

use serde::{Deserialize, Serialize};

/// A list resource exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Pages,
    Cards,
    Carousel,
    AboutUs,
    /// Read-only nested page tree
    Navbar,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        Self::Pages,
        Self::Cards,
        Self::Carousel,
        Self::AboutUs,
        Self::Navbar,
    ];

    /// Path segment under the API root
    pub fn path(&self) -> &'static str {
        match self {
            Self::Pages => "pages-item",
            Self::Cards => "cards-item",
            Self::Carousel => "carousel1-item",
            Self::AboutUs => "aboutus-item",
            Self::Navbar => "navbar-list",
        }
    }

    /// Whether list responses carry image references
    pub fn has_images(&self) -> bool {
        matches!(self, Self::Cards | Self::Carousel | Self::AboutUs)
    }

    /// Whether the list endpoint answers with a bare array instead of an envelope
    pub fn is_bare_list(&self) -> bool {
        matches!(self, Self::Navbar)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pages => write!(f, "pages"),
            Self::Cards => write!(f, "cards"),
            Self::Carousel => write!(f, "carousel"),
            Self::AboutUs => write!(f, "aboutus"),
            Self::Navbar => write!(f, "navbar"),
        }
    }
}

/// A page component that has its own editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Cards,
    Carousel,
    #[serde(alias = "about_us")]
    AboutUs,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 3] = [Self::Cards, Self::Carousel, Self::AboutUs];

    pub fn resource(&self) -> ResourceKind {
        match self {
            Self::Cards => ResourceKind::Cards,
            Self::Carousel => ResourceKind::Carousel,
            Self::AboutUs => ResourceKind::AboutUs,
        }
    }

    /// Tag reported to the parent when an editor finishes
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Cards => "cards",
            Self::Carousel => "carousel",
            Self::AboutUs => "aboutus",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for ComponentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cards" | "card" => Ok(Self::Cards),
            "carousel" => Ok(Self::Carousel),
            "aboutus" | "about_us" | "about-us" => Ok(Self::AboutUs),
            _ => Err(anyhow::anyhow!("Invalid component type: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_paths() {
        assert_eq!(ResourceKind::Pages.path(), "pages-item");
        assert_eq!(ResourceKind::Cards.path(), "cards-item");
        assert_eq!(ResourceKind::Carousel.path(), "carousel1-item");
        assert_eq!(ResourceKind::AboutUs.path(), "aboutus-item");
        assert_eq!(ResourceKind::Navbar.path(), "navbar-list");
    }

    #[test]
    fn test_component_parse_and_tag() {
        for kind in ComponentKind::ALL {
            assert_eq!(kind.tag().parse::<ComponentKind>().unwrap(), kind);
        }
        assert_eq!("about-us".parse::<ComponentKind>().unwrap(), ComponentKind::AboutUs);
        assert!("gallery".parse::<ComponentKind>().is_err());
    }
}
