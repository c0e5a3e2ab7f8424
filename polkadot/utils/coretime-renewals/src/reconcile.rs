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

//! Comparison of the estimates against the leases held by the broker pallet.

use crate::{ClassifiedRecord, CoretimeLease, ParaId, ReconciledRecord, Timeslice, LOG_TARGET};
use sp_arithmetic::{traits::Saturating, FixedI128, FixedPointNumber};
use std::collections::BTreeMap;

/// Index broker leases by para. A para listed more than once keeps its last entry.
pub fn observed_timeslices(leases: &[CoretimeLease]) -> BTreeMap<ParaId, Timeslice> {
	let mut observed = BTreeMap::new();
	for lease in leases {
		if let Some(previous) = observed.insert(lease.para_id, lease.until) {
			log::debug!(
				target: LOG_TARGET,
				"Para {} has several broker leases, using {} over {}",
				lease.para_id,
				lease.until,
				previous,
			);
		}
	}
	observed
}

/// Attach the observed broker lease, if any, to every record.
pub fn reconcile(
	records: impl IntoIterator<Item = ClassifiedRecord>,
	observed: &BTreeMap<ParaId, Timeslice>,
) -> Vec<ReconciledRecord> {
	records
		.into_iter()
		.map(|record| {
			let observed_timeslice = observed.get(&record.para_id).copied();
			if observed_timeslice.is_none() {
				log::debug!(target: LOG_TARGET, "No broker lease found for para {}", record.para_id);
			}
			let timeslice_delta = record.expiry_timeslice.zip(observed_timeslice).map(
				|(expected, observed)| {
					expected.saturating_sub(FixedI128::saturating_from_integer(observed))
				},
			);

			ReconciledRecord { record, observed_timeslice, timeslice_delta }
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::RenewalTarget;

	fn record(para_id: ParaId, expiry_timeslice: Option<FixedI128>) -> ClassifiedRecord {
		ClassifiedRecord {
			para_id,
			name: crate::UNKNOWN.into(),
			final_lease_period: 20,
			expiry_block: 2100,
			renewal_target: if expiry_timeslice.is_some() {
				RenewalTarget::SaleCycle(11)
			} else {
				RenewalTarget::OpenMarket
			},
			expiry_timeslice,
			legacy_expiry_block: 2100,
		}
	}

	#[test]
	fn delta_is_estimate_minus_observation() {
		let observed = observed_timeslices(&[
			CoretimeLease { para_id: 2000, until: 200 },
			CoretimeLease { para_id: 2004, until: 300 },
		]);
		let records = vec![
			record(2000, Some(FixedI128::saturating_from_integer(210))),
			record(2004, Some(FixedI128::saturating_from_rational(2101, 10))),
		];

		let reconciled = reconcile(records, &observed);

		assert_eq!(reconciled[0].observed_timeslice, Some(200));
		assert_eq!(reconciled[0].timeslice_delta, Some(FixedI128::saturating_from_integer(10)));
		assert_eq!(reconciled[1].observed_timeslice, Some(300));
		assert_eq!(
			reconciled[1].timeslice_delta,
			Some(FixedI128::saturating_from_rational(-899, 10))
		);
	}

	#[test]
	fn missing_observation_leaves_delta_unset() {
		let observed = observed_timeslices(&[CoretimeLease { para_id: 2000, until: 200 }]);
		let records = vec![record(2004, Some(FixedI128::saturating_from_integer(210)))];

		let reconciled = reconcile(records.clone(), &observed);

		assert_eq!(reconciled.len(), 1);
		assert_eq!(reconciled[0].record, records[0]);
		assert_eq!(reconciled[0].observed_timeslice, None);
		assert_eq!(reconciled[0].timeslice_delta, None);
	}

	#[test]
	fn open_market_records_have_no_delta() {
		let observed = observed_timeslices(&[CoretimeLease { para_id: 2000, until: 200 }]);

		let reconciled = reconcile(vec![record(2000, None)], &observed);

		assert_eq!(reconciled[0].observed_timeslice, Some(200));
		assert_eq!(reconciled[0].timeslice_delta, None);
	}

	#[test]
	fn duplicate_broker_leases_keep_the_last_one() {
		let observed = observed_timeslices(&[
			CoretimeLease { para_id: 2000, until: 200 },
			CoretimeLease { para_id: 2000, until: 250 },
		]);

		assert_eq!(observed.len(), 1);
		assert_eq!(observed[&2000], 250);
	}
}
