/*
 * Plugin Loader
 * Copyright (C) 2024 Akaere Networks
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use plugin_loader::config::{Cli, RunConfig};
use plugin_loader::core::init_from_args;
use plugin_loader::plugins::settings::SettingSummary;
use plugin_loader::plugins::{LoaderObserver, LogObserver, create_plugin_state, handle_requires};
use plugin_loader::{log_info, log_warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_from_args(cli.debug, cli.journald).context("Failed to initialize logger")?;

    let run = RunConfig::from_cli(&cli)?;
    if run.requires.is_empty() {
        log_warn!("No modules to require; nothing to load");
    }

    let lua = create_plugin_state().context("Failed to create Lua state")?;
    let observer: Option<Arc<dyn LoaderObserver>> =
        cli.debug.then(|| Arc::new(LogObserver) as Arc<dyn LoaderObserver>);

    let settings = handle_requires(&lua, &run.requires, &run.ignored, observer)
        .await
        .context("Failed to load plugins")?;

    log_info!(
        "Loaded {} module(s), {} plugin setting(s)",
        run.requires.len(),
        settings.len()
    );

    let summary = settings.summary();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if summary.is_empty() {
        println!("No plugins found");
    }
    for (option_name, setting) in &summary {
        match setting {
            SettingSummary::RootHooks(counts) => println!(
                "{}: beforeAll={} beforeEach={} afterAll={} afterEach={}",
                option_name,
                counts.before_all,
                counts.before_each,
                counts.after_all,
                counts.after_each
            ),
            SettingSummary::Contributions(count) => {
                println!("{}: {} callback(s)", option_name, count)
            }
            SettingSummary::Value(type_name) => println!("{}: {}", option_name, type_name),
        }
    }

    Ok(())
}
