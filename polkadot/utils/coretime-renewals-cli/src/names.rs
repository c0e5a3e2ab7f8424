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

//! Para id to name lookup, one table per network.

use crate::network::Network;
use anyhow::Context;
use coretime_renewals::{NameLookup, ParaId};
use serde::Deserialize;
use std::{collections::BTreeMap, fs, path::Path};

/// Table shipped with the binary.
const BUNDLED_TABLE: &str = include_str!("../res/parachains.json");

#[derive(Debug, Deserialize)]
struct ParaInfo {
	paraid: ParaId,
	name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ParaTable {
	#[serde(default)]
	kusama: Vec<ParaInfo>,
	#[serde(default)]
	polkadot: Vec<ParaInfo>,
}

/// Names of the paras of a single network.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParaRegistry {
	names: BTreeMap<ParaId, String>,
}

impl ParaRegistry {
	/// Load the table at `path`, or the bundled one if no path is given.
	pub fn load(path: Option<&Path>, network: Network) -> anyhow::Result<Self> {
		match path {
			Some(path) => {
				let json = fs::read_to_string(path)
					.with_context(|| format!("Failed to read para names from {}", path.display()))?;
				Self::from_json(&json, network)
					.with_context(|| format!("Invalid para name table {}", path.display()))
			},
			None => Self::from_json(BUNDLED_TABLE, network),
		}
	}

	/// Parse a `{"kusama": [..], "polkadot": [..]}` table and keep the entries of `network`.
	///
	/// If a para id is listed twice the first name wins.
	pub fn from_json(json: &str, network: Network) -> anyhow::Result<Self> {
		let table: ParaTable = serde_json::from_str(json).context("Malformed para name table")?;
		let entries = match network {
			Network::Kusama => table.kusama,
			Network::Polkadot => table.polkadot,
		};

		let mut names = BTreeMap::new();
		for ParaInfo { paraid, name } in entries {
			names.entry(paraid).or_insert(name);
		}
		log::debug!(target: crate::LOG_TARGET, "Loaded {} {network} para names", names.len());

		Ok(Self { names })
	}

	pub fn len(&self) -> usize {
		self.names.len()
	}
}

impl NameLookup for ParaRegistry {
	fn name_of(&self, para_id: ParaId) -> Option<String> {
		self.names.get(&para_id).cloned()
	}
}
