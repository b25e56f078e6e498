//! `explorer show` - render the detail view of one row.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::{EngineContext, FixtureArgs};
use crate::host::ObjectView;
use crate::service::ExplorerService;

/// Render the detail view of one row.
#[derive(Args)]
pub struct ShowCommand {
    #[command(flatten)]
    source: FixtureArgs,

    /// Target name or alias
    target: String,

    /// Primary key of the row
    id: String,
}

impl ShowCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let context = EngineContext::load(config_path, &self.source.fixture)?;
        let row = context.cache.service().get_entity(&self.target, &self.id).await?;
        let mut view = ObjectView::open(&context.cache, context.resolver.clone(), &self.target, row).await?;
        let rendered = view.render();

        println!("{} #{}", view.target().name().bold(), self.id);
        for tab in &rendered.tabs {
            if let Some(id) = &tab.id {
                println!("\n[{}]", id.cyan());
            }
            for (label, output) in &tab.fields {
                match &output.link {
                    Some(link) => println!("  {label}: {} <{link}>", output.text),
                    None => println!("  {label}: {}", output.text),
                }
            }
        }

        if !rendered.actions.is_empty() {
            let actions: Vec<&str> = rendered.actions.iter().map(|(_, output)| output.text.as_str()).collect();
            println!("\n{}", actions.join("  "));
        }
        Ok(())
    }
}
