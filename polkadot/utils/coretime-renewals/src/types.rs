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

//! Records flowing through the estimation pipeline.

use core::fmt;
use serde::{Deserialize, Serialize};
use sp_arithmetic::FixedI128;

/// Identifier of a parachain (the lease holder).
pub type ParaId = u32;

/// Relay chain block number.
pub type BlockNumber = u64;

/// Index of a lease period, counted from the lease offset.
pub type LeasePeriod = u64;

/// Broker pallet time unit; `region_length` of them make up one sale cycle.
pub type Timeslice = u32;

/// Index of a bulk coretime sale, counted from the configured sale start.
pub type SaleCycle = u64;

/// Marker used wherever a para name or an observation is unavailable.
pub const UNKNOWN: &str = "NA";

/// One para's entry in the `Slots::Leases` map, reduced to what the estimate needs.
///
/// Both fields are as received from the data source and are validated when cohorts are built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLease {
	/// Lease holder. `None` when the source record carried no para id.
	pub para_id: Option<ParaId>,
	/// Number of lease periods left, the current one included.
	pub periods_remaining: i64,
}

impl RawLease {
	/// A well formed lease record.
	pub fn new(para_id: ParaId, periods_remaining: u32) -> Self {
		Self { para_id: Some(para_id), periods_remaining: periods_remaining.into() }
	}

	/// Build a record from the raw lease vector of `Slots::Leases`; only its length matters.
	pub fn from_periods<T>(para_id: ParaId, periods: &[T]) -> Self {
		Self { para_id: Some(para_id), periods_remaining: periods.len() as i64 }
	}
}

/// A lease as recorded by the broker pallet on the coretime chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoretimeLease {
	pub para_id: ParaId,
	/// Timeslice until which the lease is valid.
	pub until: Timeslice,
}

/// A para that belongs to a lease cohort.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CohortMember {
	pub para_id: ParaId,
	pub name: String,
}

/// When a para has to act to keep its core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenewalTarget {
	/// Renew during the given bulk sale.
	SaleCycle(SaleCycle),
	/// The lease ends before any renewal is possible; the core must be bought on the open market.
	OpenMarket,
}

impl RenewalTarget {
	/// The sale cycle index, if any.
	pub fn sale_cycle(&self) -> Option<SaleCycle> {
		match self {
			Self::SaleCycle(cycle) => Some(*cycle),
			Self::OpenMarket => None,
		}
	}
}

impl fmt::Display for RenewalTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::SaleCycle(cycle) => write!(f, "{cycle}"),
			Self::OpenMarket => f.write_str("Buys on Open Market"),
		}
	}
}

/// The estimate for a single para.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedRecord {
	pub para_id: ParaId,
	pub name: String,
	/// Final lease period of the para's cohort.
	pub final_lease_period: LeasePeriod,
	/// Block until which the core is expected to be held.
	pub expiry_block: BlockNumber,
	pub renewal_target: RenewalTarget,
	/// Lease end expressed in timeslices. `None` for open market purchases.
	pub expiry_timeslice: Option<FixedI128>,
	/// First block after the final lease period, i.e. when the legacy lease would have ended.
	pub legacy_expiry_block: BlockNumber,
}

/// A [`ClassifiedRecord`] checked against the leases known to the broker pallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconciledRecord {
	pub record: ClassifiedRecord,
	/// `until` of the broker lease for the same para, if there is one.
	pub observed_timeslice: Option<Timeslice>,
	/// `expiry_timeslice - observed_timeslice`, when both are known.
	pub timeslice_delta: Option<FixedI128>,
}
