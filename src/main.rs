//! Assortment CLI

use std::io::{self, Write};

use anyhow::{Context, Result};
use rusty_money::Money;
use tracing::info;

use assortment::{
    dispatch::{Dispatcher, FailureKind},
    fixtures::load_catalog_file,
    selection::Outcome,
    summary::{Summary, target_from_gross},
};

use crate::cli::Cli;

mod cli;
mod logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::load().unwrap_or_else(|error| error.exit());

    logging::init(&cli.logging)?;

    let catalog = load_catalog_file(&cli.catalog)
        .with_context(|| format!("failed to load catalog {}", cli.catalog.display()))?;

    let catalog = match cli.on {
        Some(date) => catalog.eligible_on(date),
        None => catalog,
    };

    let amount = Money::from_decimal(cli.target, catalog.currency());

    let target = if cli.gross {
        target_from_gross(amount, cli.vat_rate)?
    } else {
        amount
    };

    info!(%target, items = catalog.len(), "solving");

    let dispatcher = Dispatcher::from_config(cli.dispatch);
    let mut out = io::stdout().lock();

    match dispatcher.solve(&catalog, target).await {
        Ok(Outcome::Selected(selection)) => {
            Summary::from_selection(&selection)?.write_to(&mut out, cli.vat_rate)?;
        }
        Ok(Outcome::Empty) => writeln!(out, "Nothing to select for {target}.")?,
        Err(error) if error.kind() == FailureKind::NoCombinationFound => {
            writeln!(out, "No combination of items comes closer to {target} than none.")?;
        }
        Err(error) => return Err(error).context("solve failed"),
    }

    Ok(())
}
