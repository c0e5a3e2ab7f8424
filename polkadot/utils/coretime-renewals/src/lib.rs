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

//! # Coretime renewals
//!
//! Estimates, for every para still holding a slot lease, in which bulk coretime sale its core
//! has to be renewed once leases are migrated to the coretime chain.
//!
//! The estimate is a pure computation over data already fetched from the chain:
//!
//! 1. [`build_cohorts`] groups the `Slots::Leases` entries by the lease period in which they end.
//! 2. [`CycleClassifier`] turns each final lease period into an expiry block and a
//!    [`RenewalTarget`], either a sale cycle or [`RenewalTarget::OpenMarket`].
//! 3. [`summarize`] counts renewals per sale cycle.
//! 4. If the leases recorded by the broker pallet are available, [`reconcile`] compares them
//!    with the estimate.
//!
//! [`run`] chains these steps together.

mod classify;
mod cohort;
mod constants;
mod error;
mod reconcile;
mod summary;
mod types;


pub use classify::{classify, CycleClassifier, CycleEstimate};
pub use cohort::{build_cohorts, CohortBuild, LeaseCohorts, NameLookup};
pub use constants::{TimingConstants, DEFAULT_REGION_LENGTH, DEFAULT_TIMESLICE_PERIOD};
pub use error::{Error, MalformedLease, Result};
pub use reconcile::{observed_timeslices, reconcile};
pub use summary::{summarize, RenewalSummary};
pub use types::*;

use serde::{Deserialize, Serialize};

pub(crate) const LOG_TARGET: &str = "coretime-renewals";

/// Chain state an estimate is computed from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseSnapshot {
	/// Relay chain block the leases were read at.
	pub current_block: BlockNumber,
	/// Entries of `Slots::Leases`.
	pub leases: Vec<RawLease>,
	/// `Broker::Leases` of the coretime chain, if it was queried.
	#[serde(default)]
	pub coretime_leases: Option<Vec<CoretimeLease>>,
}

/// Per para estimates, reconciled when broker leases were supplied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EstimatedRecords {
	Classified(Vec<ClassifiedRecord>),
	Reconciled(Vec<ReconciledRecord>),
}

impl EstimatedRecords {
	/// The classified records, whether reconciled or not.
	pub fn classified(&self) -> Box<dyn Iterator<Item = &ClassifiedRecord> + '_> {
		match self {
			Self::Classified(records) => Box::new(records.iter()),
			Self::Reconciled(records) => Box::new(records.iter().map(|r| &r.record)),
		}
	}

	pub fn len(&self) -> usize {
		match self {
			Self::Classified(records) => records.len(),
			Self::Reconciled(records) => records.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Outcome of [`run`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenewalEstimate {
	/// Lease period of the snapshot's block.
	pub current_lease_period: LeasePeriod,
	/// Block from which sale cycles are counted.
	pub sale_start: BlockNumber,
	pub records: EstimatedRecords,
	pub summary: RenewalSummary,
	/// Lease records that were left out of the estimate.
	pub skipped: Vec<MalformedLease>,
}

/// Estimate coretime renewals for every lease in `snapshot`.
///
/// Fails without a partial result if the constants are invalid or a block computation
/// overflows. Malformed lease records are skipped and reported in
/// [`RenewalEstimate::skipped`].
pub fn run<N: NameLookup + ?Sized>(
	snapshot: &LeaseSnapshot,
	constants: &TimingConstants,
	names: &N,
) -> Result<RenewalEstimate> {
	let classifier = CycleClassifier::new(*constants)?;
	let current_lease_period = constants.current_lease_period(snapshot.current_block)?;
	log::debug!(
		target: LOG_TARGET,
		"Block {} is in lease period {current_lease_period}",
		snapshot.current_block,
	);

	let CohortBuild { cohorts, skipped } =
		build_cohorts(&snapshot.leases, current_lease_period, names)?;
	let classified = classifier.classify(&cohorts)?;
	let summary = summarize(&classified);

	let records = match &snapshot.coretime_leases {
		Some(coretime_leases) => {
			let observed = observed_timeslices(coretime_leases);
			EstimatedRecords::Reconciled(reconcile(classified, &observed))
		},
		None => EstimatedRecords::Classified(classified),
	};

	log::info!(
		target: LOG_TARGET,
		"Estimated renewals for {} paras, {} lease records skipped",
		summary.total_active_cores,
		skipped.len(),
	);

	Ok(RenewalEstimate {
		current_lease_period,
		sale_start: constants.sale_start,
		records,
		summary,
		skipped,
	})
}
