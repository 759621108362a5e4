//! `scalepad list` – print a page (or several) of a resource as JSON lines.

use anyhow::{Context, Result};
use scalepad_core::query::FilterClause;
use scalepad_core::{ListOptions, ResourceKind, ScalePadClient};
use serde_json::Value;
use std::io::{self, Write};

#[derive(Debug)]
pub struct ListArgs {
    pub kind: ResourceKind,
    pub page_size: Option<u32>,
    pub filters: Vec<(String, FilterClause)>,
    pub sort: Vec<String>,
    pub cursor: Option<String>,
    pub all: bool,
    pub max_pages: Option<usize>,
}

impl ListArgs {
    pub fn options(&self) -> ListOptions {
        let mut options = ListOptions {
            page_size: self.page_size,
            cursor: self.cursor.clone(),
            sort: self.sort.clone(),
            ..ListOptions::default()
        };
        for (field, clause) in &self.filters {
            options.filters.insert(field.clone(), clause.clone());
        }
        options
    }

    /// Page limit when following cursors; `None` means single page mode.
    fn follow_limit(&self) -> Option<Option<usize>> {
        if self.all {
            Some(None)
        } else {
            self.max_pages.map(Some)
        }
    }
}

pub async fn run_list(client: &ScalePadClient, args: ListArgs) -> Result<()> {
    let resource = client.core().v1().resource(args.kind);
    let options = args.options();

    let Some(limit) = args.follow_limit() else {
        let page = resource
            .list(&options)
            .await
            .with_context(|| format!("listing {}", args.kind))?;
        write_items(&mut io::stdout().lock(), &page.data)?;
        eprintln!("{} of {} {}", page.data.len(), page.total_count, args.kind);
        if let Some(next) = page.next() {
            eprintln!("next cursor: {}", next);
        }
        return Ok(());
    };

    let mut pages = resource.pages(options);
    let mut fetched = 0usize;
    let mut items = 0usize;
    while limit.map_or(true, |max| fetched < max) {
        let Some(page) = pages.next_page().await else {
            break;
        };
        let page = page.with_context(|| format!("listing {} (page {})", args.kind, fetched + 1))?;
        fetched += 1;
        items += page.len();
        write_items(&mut io::stdout().lock(), &page)?;
    }
    eprintln!("{} {} from {} page(s)", items, args.kind, fetched);
    Ok(())
}

pub(crate) fn write_items<W: Write>(out: &mut W, items: &[Value]) -> Result<()> {
    for item in items {
        serde_json::to_writer(&mut *out, item)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}
