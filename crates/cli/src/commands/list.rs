use std::sync::Arc;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rosterfeed_core::domain::ResolutionMethod;
use rosterfeed_core::placeholder;
use rosterfeed_core::storage::http::HttpBackend;
use rosterfeed_core::{Feed, LoadOutcome};

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("  {spinner:.green} {msg:.dim}").unwrap());
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

pub async fn run(backend: Arc<HttpBackend>, page_size: usize, pages: usize) -> Result<()> {
    let feed = Feed::new(backend.clone(), backend, page_size);

    let mut loaded_pages = 0usize;
    loop {
        let pb = spinner(format!("loading page {loaded_pages}"));
        let outcome = feed.load_more().await;
        pb.finish_and_clear();

        match outcome? {
            LoadOutcome::Loaded(appended) => {
                loaded_pages += 1;
                println!("  page {} loaded ({appended} new)", loaded_pages - 1);
            }
            LoadOutcome::Exhausted => {
                println!("  no more results");
                break;
            }
            LoadOutcome::InFlight | LoadOutcome::Stale => continue,
        }

        if (pages != 0 && loaded_pages >= pages) || !feed.has_more() {
            break;
        }
    }

    println!();
    for entry in feed.items() {
        let cohort = entry.cohort.as_deref().unwrap_or("-");
        match feed.photo_url(entry.id) {
            Some(url) => {
                let method = match entry.photo.method {
                    ResolutionMethod::Public => "public",
                    ResolutionMethod::Signed => "signed",
                    ResolutionMethod::None => "none",
                };
                println!("  {:>6}  {:<24} {:<12} [{method}] {url}", entry.id, entry.full_name, cohort);
            }
            None => {
                let ph = placeholder::placeholder_for(&entry.full_name);
                let (r, g, b) = ph.color;
                println!(
                    "  {:>6}  {:<24} {:<12} ({} on #{r:02x}{g:02x}{b:02x})",
                    entry.id, entry.full_name, cohort, ph.initial
                );
            }
        }
    }

    println!();
    println!(
        "  {} entries loaded{}",
        feed.len(),
        if feed.has_more() { ", more available" } else { "" }
    );
    Ok(())
}
