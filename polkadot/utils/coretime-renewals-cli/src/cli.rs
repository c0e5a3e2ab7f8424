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

//! Command line interface.

use crate::{network::Network, source::LeaseTiming};
use clap::{Args, Parser, ValueEnum};
use coretime_renewals::{
	BlockNumber, Timeslice, TimingConstants, DEFAULT_REGION_LENGTH, DEFAULT_TIMESLICE_PERIOD,
};
use std::path::PathBuf;

/// Estimate in which bulk coretime sale each lease holding para has to renew its core.
#[derive(Debug, Parser)]
#[command(name = "coretime-renewals", version, rename_all = "kebab-case")]
pub struct Cli {
	/// Relay chain to estimate renewals for.
	#[arg(long, value_enum, default_value_t = Network::Kusama)]
	pub network: Network,

	/// Read chain state from a JSON snapshot instead of querying a node.
	#[arg(long, conflicts_with_all = ["rpc", "coretime_rpc"])]
	pub snapshot: Option<PathBuf>,

	/// Relay chain RPC endpoint. Defaults to the network's public endpoint.
	#[arg(long)]
	pub rpc: Option<String>,

	/// Coretime chain RPC endpoint used to compare estimates with `Broker::Leases`.
	#[arg(long)]
	pub coretime_rpc: Option<String>,

	/// Do not compare estimates with the leases known to the broker pallet.
	#[arg(long)]
	pub no_reconcile: bool,

	/// Para name table; the bundled one is used if omitted.
	#[arg(long)]
	pub names: Option<PathBuf>,

	#[command(flatten)]
	pub timing: TimingArgs,

	/// Output format.
	#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
	pub format: OutputFormat,

	/// Enable debug logging.
	#[arg(long, short)]
	pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	Text,
	Json,
}

/// Overrides for the timing constants.
#[derive(Debug, Clone, Default, Args)]
pub struct TimingArgs {
	/// Relay chain block from which sale cycles are counted.
	#[arg(long)]
	pub sale_start: Option<BlockNumber>,

	/// Timeslices per sale cycle.
	#[arg(long)]
	pub region_length: Option<Timeslice>,

	/// Relay chain blocks per timeslice.
	#[arg(long)]
	pub timeslice_period: Option<u32>,

	/// Lease period length in blocks.
	#[arg(long)]
	pub lease_period: Option<BlockNumber>,

	/// Block at which lease period zero starts.
	#[arg(long)]
	pub lease_offset: Option<BlockNumber>,
}

impl TimingArgs {
	/// Command line values first, then values read from the chain, then the network defaults.
	pub fn resolve(
		&self,
		network: Network,
		chain: &LeaseTiming,
	) -> coretime_renewals::Result<TimingConstants> {
		let preset = network.preset();
		TimingConstants::new(
			self.lease_offset.or(chain.lease_offset).unwrap_or(preset.lease_offset),
			self.lease_period.or(chain.lease_period).unwrap_or(preset.lease_period),
			self.sale_start.unwrap_or(preset.sale_start),
			self.region_length.unwrap_or(DEFAULT_REGION_LENGTH),
			self.timeslice_period.unwrap_or(DEFAULT_TIMESLICE_PERIOD),
		)
	}
}

impl Cli {
	pub fn relay_rpc(&self) -> String {
		self.rpc.clone().unwrap_or_else(|| self.network.preset().relay_rpc.to_string())
	}

	/// Coretime chain endpoint to reconcile against, if reconciliation is enabled.
	pub fn coretime_rpc(&self) -> Option<String> {
		if self.no_reconcile {
			return None
		}
		self.coretime_rpc
			.clone()
			.or_else(|| self.network.preset().coretime_rpc.map(ToString::to_string))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn cli_is_well_formed() {
		Cli::command().debug_assert();
	}

	#[test]
	fn defaults_to_kusama_over_rpc() {
		let cli = Cli::parse_from(["coretime-renewals"]);

		assert_eq!(cli.network, Network::Kusama);
		assert_eq!(cli.relay_rpc(), "wss://kusama-rpc.polkadot.io");
		assert_eq!(cli.coretime_rpc(), None);
		assert_eq!(cli.format, OutputFormat::Text);
	}

	#[test]
	fn polkadot_reconciles_unless_disabled() {
		let cli = Cli::parse_from(["coretime-renewals", "--network", "polkadot"]);
		assert_eq!(
			cli.coretime_rpc().as_deref(),
			Some("wss://polkadot-coretime-rpc.polkadot.io")
		);

		let cli = Cli::parse_from(["coretime-renewals", "--network", "polkadot", "--no-reconcile"]);
		assert_eq!(cli.coretime_rpc(), None);
	}

	#[test]
	fn snapshot_conflicts_with_rpc() {
		let parsed = Cli::try_parse_from([
			"coretime-renewals",
			"--snapshot",
			"state.json",
			"--rpc",
			"ws://localhost:9944",
		]);
		assert!(parsed.is_err());
	}

	#[test]
	fn timing_prefers_flags_then_chain_then_preset() {
		let chain = LeaseTiming { lease_offset: Some(5), lease_period: Some(1_000) };

		let constants = TimingArgs::default().resolve(Network::Polkadot, &chain).unwrap();
		assert_eq!(constants.slot_offset, 5);
		assert_eq!(constants.lease_period, 1_000);
		assert_eq!(constants.sale_start, 22_602_000);
		assert_eq!(constants.region_length, DEFAULT_REGION_LENGTH);
		assert_eq!(constants.timeslice_period, DEFAULT_TIMESLICE_PERIOD);

		let args = TimingArgs { lease_period: Some(2_000), sale_start: Some(7), ..Default::default() };
		let constants = args.resolve(Network::Polkadot, &chain).unwrap();
		assert_eq!(constants.lease_period, 2_000);
		assert_eq!(constants.sale_start, 7);

		let constants =
			TimingArgs::default().resolve(Network::Kusama, &LeaseTiming::default()).unwrap();
		assert_eq!(constants.slot_offset, 0);
		assert_eq!(constants.lease_period, 604_800);
		assert_eq!(constants.sale_start, 22_893_599);
	}

	#[test]
	fn zero_lease_period_is_rejected() {
		let args = TimingArgs { lease_period: Some(0), ..Default::default() };
		assert!(args.resolve(Network::Kusama, &LeaseTiming::default()).is_err());
	}
}
