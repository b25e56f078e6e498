//! `explorer list` - render one page of a list view.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::{EngineContext, FixtureArgs};
use crate::filter;
use crate::host::SectionView;
use crate::renderer::RenderOutput;
use crate::service::{ExplorerService, PageableParams, SortOrder};

/// Render one page of a target's list view.
#[derive(Args)]
pub struct ListCommand {
    #[command(flatten)]
    source: FixtureArgs,

    /// Target name or alias
    target: String,

    /// Filter token, e.g. '::done:false'
    #[arg(long)]
    filter: Option<String>,

    /// Property to sort by
    #[arg(long)]
    sort: Option<String>,

    /// Sort direction (ASC or DESC)
    #[arg(long)]
    order: Option<SortOrder>,

    /// Page size (defaults to section.default_limit)
    #[arg(long)]
    limit: Option<usize>,

    /// Zero-based page index
    #[arg(long, default_value_t = 0)]
    page: usize,
}

fn cell(output: &RenderOutput) -> String {
    match &output.link {
        Some(link) => format!("{} <{link}>", output.text),
        None => output.text.clone(),
    }
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(at, header)| {
            rows.iter().map(|row| row[at].chars().count()).chain([header.chars().count()]).max().unwrap_or(0)
        })
        .collect();
    let line = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    println!("{}", line(headers.iter().map(|h| (*h).to_string()).collect()).bold());
    for row in rows {
        println!("{}", line(row.clone()));
    }
}

impl ListCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let context = EngineContext::load(config_path, &self.source.fixture)?;

        if let Some(token) = &self.filter {
            for diagnostic in filter::parse(token).diagnostics {
                eprintln!("{}: {diagnostic}", "warning".yellow());
            }
        }

        let params = PageableParams {
            limit: Some(self.limit.unwrap_or(context.config.section.default_limit)),
            page: Some(self.page),
            sort: self.sort,
            order: self.order,
            filter: self.filter.filter(|token| !token.is_empty()),
        };
        let page = context.cache.service().get_section_list(&self.target, &params).await?;
        let mut view = SectionView::open(&context.cache, context.resolver.clone(), &self.target).await?;

        let rows: Vec<Vec<String>> =
            view.render(&page.content).iter().map(|row| row.iter().map(cell).collect()).collect();
        print_table(&view.headers(), &rows);

        let actions: Vec<String> = view.actions().iter().map(|(_, output)| cell(output)).collect();
        if !actions.is_empty() {
            println!("\n{}", actions.join("  "));
        }
        println!(
            "\n{} of {} rows, page {} (limit {})",
            page.content.len(),
            page.total,
            page.page,
            page.limit
        );
        Ok(())
    }
}
