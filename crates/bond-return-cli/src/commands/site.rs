use clap::Args;
use serde_json::Value;

use bond_return_core::site::navigation::{NavConfig, Section};
use bond_return_core::site::routes::RoutingTable;

/// Arguments for navigation and routing
#[derive(Args)]
pub struct RoutesArgs {
    /// Render the page at this path instead of listing routes
    #[arg(long)]
    pub render: Option<String>,

    /// Collapse a navigation section (about, fixed-income); repeatable
    #[arg(long)]
    pub collapse: Vec<String>,
}

pub fn run_routes(args: RoutesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let table = RoutingTable::site_default()?;

    if let Some(ref path) = args.render {
        let page = table.render(path)?;
        return Ok(serde_json::to_value(page)?);
    }

    let mut nav = NavConfig::site_default();
    for name in &args.collapse {
        let section: Section = name.parse()?;
        nav.toggle(section)?;
    }

    let visible_links = nav.visible_links();
    Ok(serde_json::json!({
        "routes": table.pages(),
        "navigation": &nav,
        "visible_links": visible_links,
    }))
}
