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

//! Where chain state comes from.

mod rpc;
mod snapshot;

pub use rpc::RpcSource;
pub use snapshot::SnapshotSource;

use async_trait::async_trait;
use coretime_renewals::{BlockNumber, LeaseSnapshot};
use serde::{Deserialize, Serialize};

/// Slots pallet constants, when the source knows them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseTiming {
	#[serde(default)]
	pub lease_offset: Option<BlockNumber>,
	#[serde(default)]
	pub lease_period: Option<BlockNumber>,
}

/// Everything an estimate needs from the chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainState {
	#[serde(flatten)]
	pub timing: LeaseTiming,
	#[serde(flatten)]
	pub snapshot: LeaseSnapshot,
}

/// A provider of [`ChainState`].
#[async_trait]
pub trait ChainSource {
	async fn fetch(&self) -> anyhow::Result<ChainState>;
}
