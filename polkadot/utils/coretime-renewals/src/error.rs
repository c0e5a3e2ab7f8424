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

//! Error types of the renewal estimator.

use crate::{BlockNumber, ParaId};

/// Result of a renewal estimate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort an estimate. No partial result is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	/// The timing constants can not describe a real chain.
	#[error("Invalid timing constants: {0}")]
	InvalidConstants(&'static str),
	/// Lease periods have not started yet at the given block.
	#[error("Block {block} precedes the lease offset {offset}")]
	BlockBeforeLeaseOffset { block: BlockNumber, offset: BlockNumber },
	/// A block computation left the representable range.
	#[error("Arithmetic overflow while computing {0}")]
	ArithmeticOverflow(&'static str),
}

/// A lease record that was left out of the estimate. The rest of the run is unaffected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedLease {
	#[error("Lease record #{index} has no para id")]
	MissingParaId { index: usize },
	#[error("Lease record #{index} has para id 0")]
	ZeroParaId { index: usize },
	#[error("Lease record #{index} of para {para_id} has a negative period count ({count})")]
	NegativePeriodCount { index: usize, para_id: ParaId, count: i64 },
}
