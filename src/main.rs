use std::io::BufRead;

use anyhow::{Context, Result};
use clap::Parser;

use destination_entry::cli::{CliArgs, RunOptions};
use destination_entry::messages::EditMsg;
use destination_entry::{DestinationEntry, EntryConfig, EntryDriver, MemoryContactSource};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    destination_entry::tracing::init();

    let options = CliArgs::parse()
        .into_options()
        .map_err(anyhow::Error::msg)?;

    let config = match &options.config_path {
        Some(path) => EntryConfig::load_from(path)?,
        None => EntryConfig::load(),
    };
    let config = options.apply(config);

    let source = match &options.books {
        Some(path) => MemoryContactSource::load(path)?,
        None => MemoryContactSource::new(),
    };
    tracing::info!(
        books = source.books().count(),
        contacts = source.contact_count(),
        "address books loaded"
    );

    let inputs = if options.inputs.is_empty() {
        std::io::stdin()
            .lock()
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .context("Failed to read input lines")?
    } else {
        options.inputs.clone()
    };

    for line in inputs {
        let mut driver = EntryDriver::new(DestinationEntry::new(config.clone()), source.clone());
        driver.dispatch(EditMsg::FocusIn);

        for segment in RunOptions::segments(&line) {
            driver.type_text(segment);
            driver.settle().await;
            if options.accept && driver.entry().completion().is_completing() {
                driver.dispatch(EditMsg::Activate);
            } else {
                driver.type_text(",");
            }
            driver.settle().await;
        }

        driver.dispatch(EditMsg::FocusOut);
        driver.settle().await;

        println!("{}", driver.entry().text());
        for summary in driver.entry().summaries() {
            match &summary.members {
                Some(members) => println!("  {} ({} members)", summary.display_text, members.len()),
                None => println!("  {}", summary.display_text),
            }
        }
    }

    Ok(())
}
