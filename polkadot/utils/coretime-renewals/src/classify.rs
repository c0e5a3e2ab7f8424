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

//! Mapping of lease ends onto bulk coretime sale cycles.
//!
//! With `d` the distance in blocks from the sale start to the last block covered by a lease and
//! `C` the sale cycle length, the number of sales until the lease runs out is
//! `raw = d / C + 1`. The renewal falls into one of three cases:
//!
//! - `raw > 2`: the core is covered past at least one full cycle boundary and is renewed in
//!   sale `ceil(raw) - 1`.
//! - `1 < raw <= 2`: the lease ends inside the cycle following the first sale, so renewal is
//!   pushed to sale `ceil(raw)`.
//! - `raw <= 1`: the lease ends before the first sale and the core has to be bought on the open
//!   market.
//!
//! `raw` is never materialised. Every comparison is done on `d` and `C` with integers, so exact
//! boundaries (`raw == 1`, `raw == 2`) are classified without rounding error.

use crate::{
	BlockNumber, ClassifiedRecord, Error, LeaseCohorts, LeasePeriod, RenewalTarget, Result,
	SaleCycle, TimingConstants,
};
use sp_arithmetic::{FixedI128, FixedPointNumber};

/// Renewal estimate for a single final lease period. Shared by every para of a cohort.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleEstimate {
	/// Last block, inclusive, covered by the lease.
	pub last_lease_block: BlockNumber,
	pub expiry_block: BlockNumber,
	pub renewal_target: RenewalTarget,
	pub expiry_timeslice: Option<FixedI128>,
	pub legacy_expiry_block: BlockNumber,
}

/// Classifies lease cohorts against a fixed set of [`TimingConstants`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleClassifier {
	constants: TimingConstants,
}

impl CycleClassifier {
	/// Fails with [`Error::InvalidConstants`] if any duration is zero.
	pub fn new(constants: TimingConstants) -> Result<Self> {
		constants.validate()?;
		Ok(Self { constants })
	}

	pub fn constants(&self) -> &TimingConstants {
		&self.constants
	}

	/// First block after `final_period`, i.e. the end of the lease under the slots model.
	pub fn lease_end(&self, final_period: LeasePeriod) -> Result<BlockNumber> {
		final_period
			.checked_add(1)
			.and_then(|periods| periods.checked_mul(self.constants.lease_period))
			.and_then(|blocks| blocks.checked_add(self.constants.slot_offset))
			.ok_or(Error::ArithmeticOverflow("lease end block"))
	}

	/// Estimate the renewal of a lease that ends with `final_period`.
	pub fn estimate(&self, final_period: LeasePeriod) -> Result<CycleEstimate> {
		let lease_end = self.lease_end(final_period)?;
		// `lease_end >= lease_period > 0`
		let last_lease_block = lease_end - 1;

		let sale_start = self.constants.sale_start;
		let cycle_length = self.constants.cycle_length();
		let since_sale_start = i128::from(last_lease_block) - i128::from(sale_start);
		let cycle = i128::from(cycle_length);

		let renewal_cycle = if since_sale_start > cycle {
			// ceil(raw) - 1
			Some(div_ceil(since_sale_start, cycle))
		} else if since_sale_start > 0 {
			// ceil(raw)
			Some(div_ceil(since_sale_start, cycle) + 1)
		} else {
			None
		};

		let estimate = match renewal_cycle {
			Some(cycle) => {
				let cycle = SaleCycle::try_from(cycle)
					.map_err(|_| Error::ArithmeticOverflow("renewal sale cycle"))?;
				let expiry_block = cycle
					.checked_mul(cycle_length)
					.and_then(|blocks| blocks.checked_add(sale_start))
					.ok_or(Error::ArithmeticOverflow("core expiry block"))?;
				let expiry_timeslice =
					FixedI128::checked_from_rational(lease_end, self.constants.timeslice_period)
						.ok_or(Error::ArithmeticOverflow("expiry timeslice"))?;

				CycleEstimate {
					last_lease_block,
					expiry_block,
					renewal_target: RenewalTarget::SaleCycle(cycle),
					expiry_timeslice: Some(expiry_timeslice),
					legacy_expiry_block: lease_end,
				}
			},
			None => CycleEstimate {
				last_lease_block,
				expiry_block: lease_end,
				renewal_target: RenewalTarget::OpenMarket,
				expiry_timeslice: None,
				legacy_expiry_block: lease_end,
			},
		};

		Ok(estimate)
	}

	/// One record per cohort member, cohorts in ascending final lease period order.
	pub fn classify(&self, cohorts: &LeaseCohorts) -> Result<Vec<ClassifiedRecord>> {
		let mut records = Vec::with_capacity(cohorts.values().map(Vec::len).sum());

		for (final_period, members) in cohorts {
			let estimate = self.estimate(*final_period)?;
			records.extend(members.iter().map(|member| ClassifiedRecord {
				para_id: member.para_id,
				name: member.name.clone(),
				final_lease_period: *final_period,
				expiry_block: estimate.expiry_block,
				renewal_target: estimate.renewal_target,
				expiry_timeslice: estimate.expiry_timeslice,
				legacy_expiry_block: estimate.legacy_expiry_block,
			}));
		}

		Ok(records)
	}
}

/// Classify `cohorts` with `constants`.
pub fn classify(
	cohorts: &LeaseCohorts,
	constants: &TimingConstants,
) -> Result<Vec<ClassifiedRecord>> {
	CycleClassifier::new(*constants)?.classify(cohorts)
}

// Only called with a positive numerator and denominator.
fn div_ceil(numerator: i128, denominator: i128) -> i128 {
	(numerator + denominator - 1) / denominator
}
