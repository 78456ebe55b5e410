//! Website administration commands.

use clap::Subcommand;
use console::style;

use sa_api::NewWebsite;
use sa_core::config::AppConfig;
use sa_core::error::SaResult;

use super::{cell, new_table, print_json};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum WebsitesAction {
    /// List all websites in the account.
    List,
    /// Show one website.
    Get {
        /// Website hostname.
        hostname: String,
    },
    /// Add a website (Business or Enterprise plan).
    Add {
        /// Website hostname.
        hostname: String,
        /// Website timezone.
        #[arg(short, long, default_value = "UTC")]
        timezone: String,
        /// Make the dashboard public.
        #[arg(long)]
        public: bool,
        /// Label shown in the dashboard.
        #[arg(short, long)]
        label: Option<String>,
    },
}

pub fn run(config: &AppConfig, action: WebsitesAction, format: OutputFormat) -> SaResult<()> {
    let client = super::create_client(config)?;

    match action {
        WebsitesAction::List => {
            let sites = client.scope(|c| c.admin().list_websites())?;
            match format {
                OutputFormat::Json => print_json(&serde_json::Value::Array(sites)),
                OutputFormat::Text => {
                    if sites.is_empty() {
                        println!("No websites found.");
                    } else {
                        let mut table = new_table(vec!["Hostname", "Timezone", "Public", "Label"]);
                        for site in &sites {
                            table.add_row(vec![
                                cell(site.get("hostname")),
                                cell(site.get("timezone")),
                                cell(site.get("public")),
                                cell(site.get("label")),
                            ]);
                        }
                        println!("{table}");
                        println!("\n{} websites", sites.len());
                    }
                }
            }
        }
        WebsitesAction::Get { hostname } => {
            let site = client.scope(|c| c.admin().get_website(&hostname))?;
            match (site, format) {
                (Some(site), OutputFormat::Json) => print_json(&site),
                (Some(site), OutputFormat::Text) => {
                    let mut table = new_table(vec!["Field", "Value"]);
                    if let Some(fields) = site.as_object() {
                        for (key, value) in fields {
                            table.add_row(vec![key.clone(), cell(Some(value))]);
                        }
                    }
                    println!("{table}");
                }
                (None, OutputFormat::Json) => println!("null"),
                (None, OutputFormat::Text) => {
                    println!("{} {hostname}", style("Website not found:").yellow());
                }
            }
        }
        WebsitesAction::Add {
            hostname,
            timezone,
            public,
            label,
        } => {
            let mut website = NewWebsite::new(hostname.as_str()).timezone(timezone).public(public);
            if let Some(label) = label {
                website = website.label(label);
            }
            let created = client.scope(|c| c.admin().add_website(&website))?;
            match format {
                OutputFormat::Json => print_json(&created),
                OutputFormat::Text => {
                    println!("{} {}", style("Added website").green(), style(&hostname).cyan());
                }
            }
        }
    }
    Ok(())
}
