pub mod returns;
pub mod site;
pub mod sweep;
