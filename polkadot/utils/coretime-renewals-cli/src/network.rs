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

//! Per network defaults.

use coretime_renewals::BlockNumber;
use std::fmt;

/// Relay chains the tool knows defaults for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Network {
	Kusama,
	Polkadot,
}

/// Endpoints and timing defaults of a [`Network`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkPreset {
	pub relay_rpc: &'static str,
	/// Coretime chain endpoint queried for broker leases by default.
	pub coretime_rpc: Option<&'static str>,
	/// Estimated relay chain block of the first bulk sale. Not yet queryable on chain.
	pub sale_start: BlockNumber,
	/// `Slots::LeasePeriod`.
	pub lease_period: BlockNumber,
	/// `Slots::LeaseOffset`.
	pub lease_offset: BlockNumber,
}

/// Sale interlude of 50 400 coretime chain blocks, in relay chain blocks.
const INTERLUDE_RELAY_BLOCKS: BlockNumber = 100_800;

impl Network {
	pub fn preset(self) -> NetworkPreset {
		match self {
			Network::Kusama => NetworkPreset {
				relay_rpc: "wss://kusama-rpc.polkadot.io",
				coretime_rpc: None,
				// The announced start may slip by up to one interlude; use its last block.
				sale_start: 22_793_600 + INTERLUDE_RELAY_BLOCKS - 1,
				lease_period: 604_800,
				lease_offset: 0,
			},
			Network::Polkadot => NetworkPreset {
				relay_rpc: "wss://rpc.polkadot.io",
				coretime_rpc: Some("wss://polkadot-coretime-rpc.polkadot.io"),
				sale_start: 22_602_000,
				lease_period: 1_209_600,
				lease_offset: 921_600,
			},
		}
	}

	/// Key of this network in the para name table.
	pub fn as_str(&self) -> &'static str {
		match self {
			Network::Kusama => "kusama",
			Network::Polkadot => "polkadot",
		}
	}
}

impl fmt::Display for Network {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
