use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::BondReturnError;
use crate::BondReturnResult;

/// Collapsible group of links in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    About,
    FixedIncome,
}

impl Section {
    pub fn label(&self) -> &'static str {
        match self {
            Section::About => "About",
            Section::FixedIncome => "Fixed Income",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Section {
    type Err = BondReturnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', ' '], "-").as_str() {
            "about" => Ok(Section::About),
            "fixed-income" => Ok(Section::FixedIncome),
            other => Err(BondReturnError::InvalidInput {
                field: "section".into(),
                reason: format!("Unknown section '{other}'. Available: about, fixed-income"),
            }),
        }
    }
}

/// A page as the navigation sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageDescriptor {
    pub path: &'static str,
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
}

pub const HOME: PageDescriptor = PageDescriptor {
    path: "/",
    name: "Home",
    section: None,
};

pub const PROFESSIONAL_EXPERIENCE: PageDescriptor = PageDescriptor {
    path: "/about/professional-experience",
    name: "Professional Experience",
    section: Some(Section::About),
};

pub const WHY_A_WEBPAGE: PageDescriptor = PageDescriptor {
    path: "/about/why-a-webpage",
    name: "Why a webpage?",
    section: Some(Section::About),
};

pub const ACKNOWLEDGMENTS: PageDescriptor = PageDescriptor {
    path: "/about/acknowledgments",
    name: "Acknowledgments",
    section: Some(Section::About),
};

pub const DISCUSSION_BOND_RETURNS: PageDescriptor = PageDescriptor {
    path: "/fixed-income/discussion-br",
    name: "Discussion on Bond Returns",
    section: Some(Section::FixedIncome),
};

pub const SAMPLE_APP: PageDescriptor = PageDescriptor {
    path: "/fixed-income/sample-app",
    name: "Sample App",
    section: Some(Section::FixedIncome),
};

/// Every page in sidebar order.
pub const PAGES: &[PageDescriptor] = &[
    HOME,
    PROFESSIONAL_EXPERIENCE,
    WHY_A_WEBPAGE,
    ACKNOWLEDGMENTS,
    DISCUSSION_BOND_RETURNS,
    SAMPLE_APP,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavSection {
    pub section: Section,
    pub label: &'static str,
    pub is_open: bool,
    pub links: Vec<PageDescriptor>,
}

impl NavSection {
    /// Flip visibility and return the new state.
    pub fn toggle(&mut self) -> bool {
        self.is_open = !self.is_open;
        self.is_open
    }

    /// Click handler of the section header. A missing or zero click count is
    /// the initial render and leaves the state alone.
    pub fn on_click(&mut self, n_clicks: Option<u32>) -> bool {
        match n_clicks {
            Some(n) if n > 0 => self.toggle(),
            _ => self.is_open,
        }
    }
}

/// Sidebar configuration: a home link followed by collapsible sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavConfig {
    pub home: PageDescriptor,
    pub sections: Vec<NavSection>,
}

impl NavConfig {
    /// Group `pages` by section, keeping their order. Sections start open.
    pub fn from_pages(home: PageDescriptor, pages: &[PageDescriptor]) -> Self {
        let mut sections: Vec<NavSection> = Vec::new();

        for page in pages {
            let Some(section) = page.section else {
                continue;
            };
            match sections.iter_mut().find(|s| s.section == section) {
                Some(existing) => existing.links.push(*page),
                None => sections.push(NavSection {
                    section,
                    label: section.label(),
                    is_open: true,
                    links: vec![*page],
                }),
            }
        }

        Self { home, sections }
    }

    pub fn site_default() -> Self {
        Self::from_pages(HOME, PAGES)
    }

    pub fn section(&self, section: Section) -> Option<&NavSection> {
        self.sections.iter().find(|s| s.section == section)
    }

    pub fn toggle(&mut self, section: Section) -> BondReturnResult<bool> {
        self.sections
            .iter_mut()
            .find(|s| s.section == section)
            .map(NavSection::toggle)
            .ok_or_else(|| BondReturnError::InvalidInput {
                field: "section".into(),
                reason: format!("Section '{section}' is not in the navigation."),
            })
    }

    /// Links currently shown: home plus the links of every open section.
    pub fn visible_links(&self) -> Vec<&PageDescriptor> {
        std::iter::once(&self.home)
            .chain(
                self.sections
                    .iter()
                    .filter(|s| s.is_open)
                    .flat_map(|s| s.links.iter()),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sections_in_order() {
        let nav = NavConfig::site_default();
        let labels: Vec<_> = nav.sections.iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["About", "Fixed Income"]);
        assert_eq!(nav.sections[0].links.len(), 3);
        assert_eq!(nav.sections[1].links.len(), 2);
        assert!(nav.sections.iter().all(|s| s.is_open));
    }

    #[test]
    fn test_toggle_hides_section_links() {
        let mut nav = NavConfig::site_default();
        assert_eq!(nav.visible_links().len(), 6);
        assert!(!nav.toggle(Section::About).unwrap());
        assert_eq!(nav.visible_links().len(), 3);
        assert!(nav.toggle(Section::About).unwrap());
    }

    #[test]
    fn test_on_click_ignores_initial_render() {
        let mut nav = NavConfig::site_default();
        let section = &mut nav.sections[1];
        assert!(section.on_click(None));
        assert!(section.on_click(Some(0)));
        assert!(!section.on_click(Some(1)));
    }

    #[test]
    fn test_section_from_str() {
        assert_eq!("fixed_income".parse::<Section>().unwrap(), Section::FixedIncome);
        assert_eq!("About".parse::<Section>().unwrap(), Section::About);
        assert!("blog".parse::<Section>().is_err());
    }

    #[test]
    fn test_toggle_missing_section() {
        let mut nav = NavConfig::from_pages(HOME, &[HOME, SAMPLE_APP]);
        assert!(nav.toggle(Section::About).is_err());
        assert!(nav.section(Section::FixedIncome).is_some());
    }
}
