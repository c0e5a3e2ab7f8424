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

//! Timing parameters shared by every step of the estimate.

use crate::{BlockNumber, Error, LeasePeriod, Result, Timeslice};

/// Timeslices per bulk sale region, as recommended in RFC-1.
pub const DEFAULT_REGION_LENGTH: Timeslice = 5040;

/// Relay chain blocks per timeslice, as recommended in RFC-1.
pub const DEFAULT_TIMESLICE_PERIOD: u32 = 80;

/// Chain derived (`slot_offset`, `lease_period`) and configured (the rest) timing constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingConstants {
	/// Block at which lease period zero starts (`Slots::LeaseOffset`).
	pub slot_offset: BlockNumber,
	/// Length of a lease period in blocks (`Slots::LeasePeriod`).
	pub lease_period: BlockNumber,
	/// Block from which sale cycles are counted.
	pub sale_start: BlockNumber,
	/// Timeslices per sale cycle.
	pub region_length: Timeslice,
	/// Blocks per timeslice.
	pub timeslice_period: u32,
}

impl TimingConstants {
	/// Create a validated set of constants.
	pub fn new(
		slot_offset: BlockNumber,
		lease_period: BlockNumber,
		sale_start: BlockNumber,
		region_length: Timeslice,
		timeslice_period: u32,
	) -> Result<Self> {
		let constants =
			Self { slot_offset, lease_period, sale_start, region_length, timeslice_period };
		constants.validate()?;
		Ok(constants)
	}

	/// Constants using the RFC-1 region and timeslice lengths.
	pub fn with_default_regions(
		slot_offset: BlockNumber,
		lease_period: BlockNumber,
		sale_start: BlockNumber,
	) -> Result<Self> {
		Self::new(
			slot_offset,
			lease_period,
			sale_start,
			DEFAULT_REGION_LENGTH,
			DEFAULT_TIMESLICE_PERIOD,
		)
	}

	/// Ensure every duration is non-zero.
	pub fn validate(&self) -> Result<()> {
		if self.lease_period == 0 {
			return Err(Error::InvalidConstants("lease period must be greater than zero"))
		}
		if self.timeslice_period == 0 {
			return Err(Error::InvalidConstants("timeslice period must be greater than zero"))
		}
		if self.cycle_length() == 0 {
			return Err(Error::InvalidConstants("sale cycle length must be greater than zero"))
		}
		Ok(())
	}

	/// Length of one sale cycle in blocks.
	pub fn cycle_length(&self) -> BlockNumber {
		BlockNumber::from(self.region_length) * BlockNumber::from(self.timeslice_period)
	}

	/// The lease period `block` falls into.
	pub fn current_lease_period(&self, block: BlockNumber) -> Result<LeasePeriod> {
		self.validate()?;
		let since_offset = block
			.checked_sub(self.slot_offset)
			.ok_or(Error::BlockBeforeLeaseOffset { block, offset: self.slot_offset })?;
		Ok(since_offset / self.lease_period)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use assert_matches::assert_matches;

	#[test]
	fn cycle_length_is_region_times_timeslice() {
		let constants = TimingConstants::with_default_regions(0, 604_800, 1).unwrap();
		assert_eq!(constants.cycle_length(), 403_200);
	}

	#[test]
	fn zero_durations_are_rejected() {
		assert_matches!(TimingConstants::new(0, 0, 1000, 10, 10), Err(Error::InvalidConstants(_)));
		assert_matches!(TimingConstants::new(0, 100, 1000, 0, 10), Err(Error::InvalidConstants(_)));
		assert_matches!(TimingConstants::new(0, 100, 1000, 10, 0), Err(Error::InvalidConstants(_)));
		assert!(TimingConstants::new(0, 100, 1000, 10, 10).is_ok());
	}

	#[test]
	fn current_lease_period_accounts_for_offset() {
		let constants = TimingConstants::with_default_regions(921_600, 1_209_600, 0).unwrap();
		assert_eq!(constants.current_lease_period(921_600).unwrap(), 0);
		assert_eq!(constants.current_lease_period(8_179_200).unwrap(), 6);
		assert_eq!(constants.current_lease_period(8_179_199).unwrap(), 5);
		assert_eq!(
			constants.current_lease_period(921_599),
			Err(Error::BlockBeforeLeaseOffset { block: 921_599, offset: 921_600 })
		);
	}
}
