// This file is part of Polkadot.

// Copyright (C) Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later WITH Classpath-exception-2.0

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Command line front end of `coretime-renewals`.
//!
//! Reads the relay chain lease state from a node or a JSON snapshot, estimates the coretime sale
//! in which each lease holding para has to renew its core and prints the result.

mod cli;
mod names;
mod network;
mod report;
mod source;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use names::ParaRegistry;
use source::{ChainSource, RpcSource, SnapshotSource};
use std::io::Write;

pub(crate) const LOG_TARGET: &str = "coretime-renewals-cli";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::from_env(
		env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "info" }),
	)
	.format_timestamp(None)
	.target(env_logger::Target::Stderr)
	.init();

	let source: Box<dyn ChainSource> = match &cli.snapshot {
		Some(path) => Box::new(SnapshotSource::new(path)),
		None => Box::new(RpcSource::new(cli.relay_rpc(), cli.coretime_rpc())),
	};

	let mut state = source.fetch().await?;
	if cli.no_reconcile {
		state.snapshot.coretime_leases = None;
	}

	let constants = cli
		.timing
		.resolve(cli.network, &state.timing)
		.context("Invalid timing constants")?;
	log::debug!(target: LOG_TARGET, "Using {constants:?}");

	let registry = ParaRegistry::load(cli.names.as_deref(), cli.network)?;
	log::debug!(target: LOG_TARGET, "{} para names known", registry.len());
	let estimate = coretime_renewals::run(&state.snapshot, &constants, &registry)?;

	let mut stdout = std::io::stdout().lock();
	report::render(&estimate, cli.network, cli.format, &mut stdout)?;
	stdout.flush()?;

	Ok(())
}
