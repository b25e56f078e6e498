//! `explorer resolve` - show renderer resolution of a target.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::{EngineContext, FixtureArgs};
use crate::metadata::Variant;
use crate::renderer::ResolutionSource;

/// Show which renderer each column and action resolves to.
#[derive(Args)]
pub struct ResolveCommand {
    #[command(flatten)]
    source: FixtureArgs,

    /// Target name or alias
    target: String,

    /// Only this view (`section` or `object`); both when omitted
    #[arg(long)]
    variant: Option<Variant>,
}

impl ResolveCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let context = EngineContext::load(config_path, &self.source.fixture)?;
        let variants = match self.variant {
            Some(variant) => vec![variant],
            None => vec![Variant::Section, Variant::Object],
        };

        for variant in variants {
            let data = context.cache.resolve(&self.target, Some(variant)).await?;
            println!("{} ({variant})", data.name().bold());

            for column in data.entity.enabled_columns(variant) {
                let resolution = context.resolver.resolve_column(column, variant);
                let source = match resolution.source {
                    ResolutionSource::Explicit => "explicit".green(),
                    ResolutionSource::TypeDefault => "type".normal(),
                    ResolutionSource::Fallback => "fallback".yellow(),
                };
                println!("  {:<16} {:<10} {} [{source}]", column.property, column.column_type.as_str(), resolution.code);
            }

            for action in data.entity.effective_actions(variant) {
                match context.resolver.resolve_action(&action) {
                    Some(loader) => println!("  action {:<9} {}", action.code, loader.code()),
                    None => println!("  action {:<9} {}", action.code, "skipped".yellow()),
                }
            }
        }
        Ok(())
    }
}
