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

//! Grouping of lease holders by the lease period in which their lease ends.

use crate::{
	CohortMember, Error, LeasePeriod, MalformedLease, ParaId, RawLease, Result, LOG_TARGET,
	UNKNOWN,
};
use std::collections::BTreeMap;

/// Paras keyed by their final lease period, in the order they were encountered.
pub type LeaseCohorts = BTreeMap<LeasePeriod, Vec<CohortMember>>;

/// Resolves a para id to a human readable name.
pub trait NameLookup {
	/// The name of `para_id`, if known.
	fn name_of(&self, para_id: ParaId) -> Option<String>;

	/// The name of `para_id`, or [`UNKNOWN`].
	fn name_or_unknown(&self, para_id: ParaId) -> String {
		self.name_of(para_id).unwrap_or_else(|| UNKNOWN.to_string())
	}
}

impl NameLookup for () {
	fn name_of(&self, _: ParaId) -> Option<String> {
		None
	}
}

impl NameLookup for BTreeMap<ParaId, String> {
	fn name_of(&self, para_id: ParaId) -> Option<String> {
		self.get(&para_id).cloned()
	}
}

impl<T: NameLookup + ?Sized> NameLookup for &T {
	fn name_of(&self, para_id: ParaId) -> Option<String> {
		(**self).name_of(para_id)
	}
}

/// Cohorts together with the records that had to be skipped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CohortBuild {
	pub cohorts: LeaseCohorts,
	pub skipped: Vec<MalformedLease>,
}

impl CohortBuild {
	/// Number of paras across all cohorts.
	pub fn member_count(&self) -> usize {
		self.cohorts.values().map(Vec::len).sum()
	}
}

/// Group `leases` by final lease period.
///
/// Leases are assumed to be contiguous and to start at `current_lease_period`, so a para with
/// `n` remaining periods holds its slot until period `current_lease_period + n - 1`. Paras with
/// nothing left, or whose lease would end in period zero, are not part of any cohort.
pub fn build_cohorts<N: NameLookup + ?Sized>(
	leases: &[RawLease],
	current_lease_period: LeasePeriod,
	names: &N,
) -> Result<CohortBuild> {
	let mut build = CohortBuild::default();

	for (index, lease) in leases.iter().enumerate() {
		let para_id = match lease.para_id {
			None => {
				build.skipped.push(MalformedLease::MissingParaId { index });
				continue
			},
			Some(0) => {
				build.skipped.push(MalformedLease::ZeroParaId { index });
				continue
			},
			Some(para_id) => para_id,
		};

		let remaining = match u64::try_from(lease.periods_remaining) {
			Ok(remaining) => remaining,
			Err(_) => {
				build.skipped.push(MalformedLease::NegativePeriodCount {
					index,
					para_id,
					count: lease.periods_remaining,
				});
				continue
			},
		};

		if remaining == 0 {
			log::debug!(target: LOG_TARGET, "Para {para_id} has no lease periods left");
			continue
		}

		let final_period = current_lease_period
			.checked_add(remaining - 1)
			.ok_or(Error::ArithmeticOverflow("final lease period"))?;
		if final_period == 0 {
			log::debug!(target: LOG_TARGET, "Para {para_id} lease ends in lease period 0");
			continue
		}

		build
			.cohorts
			.entry(final_period)
			.or_default()
			.push(CohortMember { para_id, name: names.name_or_unknown(para_id) });
	}

	for skipped in &build.skipped {
		log::warn!(target: LOG_TARGET, "Skipping malformed lease record: {skipped}");
	}

	Ok(build)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn names() -> BTreeMap<ParaId, String> {
		[(2000, "Karura".to_string()), (2004, "Khala".to_string())].into_iter().collect()
	}

	#[test]
	fn groups_by_final_lease_period_in_encounter_order() {
		let leases = vec![
			RawLease::new(2004, 3),
			RawLease::new(2000, 1),
			RawLease::new(2090, 3),
			RawLease::new(2001, 1),
		];

		let build = build_cohorts(&leases, 40, &names()).unwrap();

		assert!(build.skipped.is_empty());
		assert_eq!(build.cohorts.keys().copied().collect::<Vec<_>>(), vec![40, 42]);
		assert_eq!(
			build.cohorts[&40],
			vec![
				CohortMember { para_id: 2000, name: "Karura".into() },
				CohortMember { para_id: 2001, name: UNKNOWN.into() },
			]
		);
		assert_eq!(
			build.cohorts[&42],
			vec![
				CohortMember { para_id: 2004, name: "Khala".into() },
				CohortMember { para_id: 2090, name: UNKNOWN.into() },
			]
		);
		assert_eq!(build.member_count(), 4);
	}

	#[test]
	fn paras_without_remaining_periods_are_excluded() {
		let leases = vec![RawLease::new(2000, 0), RawLease::new(2004, 2)];

		let build = build_cohorts(&leases, 10, &()).unwrap();

		assert_eq!(build.member_count(), 1);
		assert_eq!(build.cohorts[&11][0].para_id, 2004);
		assert!(build.skipped.is_empty());
	}

	#[test]
	fn lease_ending_in_period_zero_is_excluded() {
		let build = build_cohorts(&[RawLease::new(2000, 1)], 0, &()).unwrap();
		assert!(build.cohorts.is_empty());

		let build = build_cohorts(&[RawLease::new(2000, 2)], 0, &()).unwrap();
		assert_eq!(build.cohorts.keys().copied().collect::<Vec<_>>(), vec![1]);
	}

	#[test]
	fn malformed_records_are_reported_and_skipped() {
		let leases = vec![
			RawLease { para_id: None, periods_remaining: 2 },
			RawLease { para_id: Some(0), periods_remaining: 2 },
			RawLease { para_id: Some(2000), periods_remaining: -1 },
			RawLease::new(2004, 2),
		];

		let build = build_cohorts(&leases, 10, &names()).unwrap();

		assert_eq!(
			build.skipped,
			vec![
				MalformedLease::MissingParaId { index: 0 },
				MalformedLease::ZeroParaId { index: 1 },
				MalformedLease::NegativePeriodCount { index: 2, para_id: 2000, count: -1 },
			]
		);
		assert_eq!(build.member_count(), 1);
	}

	#[test]
	fn final_period_overflow_is_fatal() {
		let leases = vec![RawLease::new(2000, 3)];
		assert_eq!(
			build_cohorts(&leases, LeasePeriod::MAX, &()),
			Err(Error::ArithmeticOverflow("final lease period"))
		);
	}
}
