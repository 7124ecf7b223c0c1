//! Renders the final repository as a sorted table.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use warpath_core::PathRepo;

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "METHOD")]
    method: String,
    #[tabled(rename = "HANDLER")]
    handler: String,
}

pub fn render(paths: &PathRepo) -> String {
    let mut rows = Vec::new();
    for url in paths.urls() {
        for (method, destination) in paths.destinations(url) {
            rows.push(Row {
                url: url.to_string(),
                method: method.to_string(),
                handler: destination.to_string(),
            });
        }
    }
    if rows.is_empty() {
        return "no paths discovered\n".to_string();
    }
    let mut table = Table::new(&rows);
    table.with(Style::psql());
    format!("{table}\n")
}
