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

//! Chain state saved to a JSON file.

use super::{ChainSource, ChainState};
use anyhow::Context;
use async_trait::async_trait;
use std::{fs, path::PathBuf};

/// Reads a [`ChainState`] from a JSON file, e.g.
///
/// ```json
/// {
///   "leaseOffset": 0,
///   "leasePeriod": 604800,
///   "currentBlock": 22500000,
///   "leases": [{ "paraId": 2000, "periodsRemaining": 4 }],
///   "coretimeLeases": [{ "paraId": 2000, "until": 300000 }]
/// }
/// ```
///
/// `leaseOffset`, `leasePeriod` and `coretimeLeases` are optional.
pub struct SnapshotSource {
	path: PathBuf,
}

impl SnapshotSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

#[async_trait]
impl ChainSource for SnapshotSource {
	async fn fetch(&self) -> anyhow::Result<ChainState> {
		let json = fs::read_to_string(&self.path)
			.with_context(|| format!("Failed to read snapshot {}", self.path.display()))?;
		let state: ChainState = serde_json::from_str(&json)
			.with_context(|| format!("Malformed snapshot {}", self.path.display()))?;

		log::info!(
			target: crate::LOG_TARGET,
			"Loaded {} leases at block {} from {}",
			state.snapshot.leases.len(),
			state.snapshot.current_block,
			self.path.display(),
		);
		Ok(state)
	}
}
