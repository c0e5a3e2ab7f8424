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

//! Per sale cycle renewal counts.

use crate::{ClassifiedRecord, RenewalTarget};
use std::collections::BTreeMap;

/// Number of cores to be renewed per sale cycle.
///
/// Iteration over [`RenewalSummary::renewals`] yields sale cycles in ascending order followed by
/// [`RenewalTarget::OpenMarket`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenewalSummary {
	pub renewals: BTreeMap<RenewalTarget, u32>,
	pub total_active_cores: u32,
}

impl RenewalSummary {
	/// Count of paras renewing at `target`.
	pub fn count(&self, target: RenewalTarget) -> u32 {
		self.renewals.get(&target).copied().unwrap_or_default()
	}

	fn record(&mut self, target: RenewalTarget) {
		*self.renewals.entry(target).or_default() += 1;
		self.total_active_cores += 1;
	}
}

/// Fold `records` into a [`RenewalSummary`].
pub fn summarize<'a>(records: impl IntoIterator<Item = &'a ClassifiedRecord>) -> RenewalSummary {
	records.into_iter().fold(RenewalSummary::default(), |mut summary, record| {
		summary.record(record.renewal_target);
		summary
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn record(para_id: u32, renewal_target: RenewalTarget) -> ClassifiedRecord {
		ClassifiedRecord {
			para_id,
			name: crate::UNKNOWN.into(),
			final_lease_period: 0,
			expiry_block: 0,
			renewal_target,
			expiry_timeslice: None,
			legacy_expiry_block: 0,
		}
	}

	#[test]
	fn counts_per_target_with_open_market_last() {
		let records = vec![
			record(2000, RenewalTarget::OpenMarket),
			record(2001, RenewalTarget::SaleCycle(11)),
			record(2004, RenewalTarget::SaleCycle(2)),
			record(2007, RenewalTarget::SaleCycle(11)),
			record(2023, RenewalTarget::SaleCycle(0)),
		];

		let summary = summarize(&records);

		assert_eq!(summary.total_active_cores, 5);
		assert_eq!(
			summary.renewals.into_iter().collect::<Vec<_>>(),
			vec![
				(RenewalTarget::SaleCycle(0), 1),
				(RenewalTarget::SaleCycle(2), 1),
				(RenewalTarget::SaleCycle(11), 2),
				(RenewalTarget::OpenMarket, 1),
			]
		);
	}

	#[test]
	fn open_market_is_not_sale_cycle_zero() {
		let summary = summarize(&[record(2000, RenewalTarget::OpenMarket)]);

		assert_eq!(summary.count(RenewalTarget::OpenMarket), 1);
		assert_eq!(summary.count(RenewalTarget::SaleCycle(0)), 0);
	}

	#[test]
	fn empty_input_gives_empty_summary() {
		assert_eq!(summarize(&Vec::<ClassifiedRecord>::new()), RenewalSummary::default());
	}
}
