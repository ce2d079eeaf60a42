use serde::Serialize;

use crate::error::BondReturnError;
use crate::fixed_income::sweep::{error_grid, ErrorGrid, ErrorSweepInput};
use crate::site::navigation::{
    PageDescriptor, ACKNOWLEDGMENTS, DISCUSSION_BOND_RETURNS, HOME, PROFESSIONAL_EXPERIENCE,
    SAMPLE_APP, WHY_A_WEBPAGE,
};
use crate::BondReturnResult;

/// What a page hands to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub path: &'static str,
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breadcrumb: Option<String>,
    /// Data for the page's line chart, if it has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ErrorGrid>,
}

pub type RenderFn = fn(&PageDescriptor) -> BondReturnResult<Page>;

#[derive(Clone)]
pub struct Route {
    pub page: PageDescriptor,
    pub render: RenderFn,
}

/// Ordered path -> renderer table.
#[derive(Clone)]
pub struct RoutingTable {
    routes: Vec<Route>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Append a route. Paths must be unique.
    pub fn with_route(mut self, page: PageDescriptor, render: RenderFn) -> BondReturnResult<Self> {
        if self.routes.iter().any(|r| r.page.path == page.path) {
            return Err(BondReturnError::InvalidInput {
                field: "path".into(),
                reason: format!("Route '{}' registered twice.", page.path),
            });
        }
        self.routes.push(Route { page, render });
        Ok(self)
    }

    pub fn site_default() -> BondReturnResult<Self> {
        Self::new()
            .with_route(HOME, render_text_page)?
            .with_route(PROFESSIONAL_EXPERIENCE, render_text_page)?
            .with_route(WHY_A_WEBPAGE, render_text_page)?
            .with_route(ACKNOWLEDGMENTS, render_text_page)?
            .with_route(DISCUSSION_BOND_RETURNS, render_bond_return_discussion)?
            .with_route(SAMPLE_APP, render_text_page)
    }

    pub fn resolve(&self, path: &str) -> BondReturnResult<&Route> {
        let normalized = normalize_path(path);
        self.routes
            .iter()
            .find(|r| r.page.path == normalized)
            .ok_or_else(|| BondReturnError::RouteNotFound(path.to_string()))
    }

    pub fn render(&self, path: &str) -> BondReturnResult<Page> {
        let route = self.resolve(path)?;
        (route.render)(&route.page)
    }

    pub fn pages(&self) -> Vec<PageDescriptor> {
        self.routes.iter().map(|r| r.page).collect()
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::new()
    }
}

/// "" and trailing slashes resolve like the bare path.
fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

fn breadcrumb(page: &PageDescriptor) -> Option<String> {
    page.section
        .map(|section| format!("{} > {}", section.label(), page.name))
}

fn render_text_page(page: &PageDescriptor) -> BondReturnResult<Page> {
    Ok(Page {
        path: page.path,
        title: page.name,
        breadcrumb: breadcrumb(page),
        chart: None,
    })
}

/// The discussion page charts the default approximation error sweep.
fn render_bond_return_discussion(page: &PageDescriptor) -> BondReturnResult<Page> {
    let input = ErrorSweepInput::default();
    let grid = error_grid(
        input.maturity_years,
        &input.coupon_axis.values("coupon_axis")?,
        &input.yield_axis.values("yield_axis")?,
        input.base_yield,
        input.elapsed_years,
    )?;

    Ok(Page {
        path: page.path,
        title: page.name,
        breadcrumb: breadcrumb(page),
        chart: Some(grid),
    })
}
