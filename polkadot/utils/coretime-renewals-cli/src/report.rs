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

//! Rendering of a [`RenewalEstimate`].

use crate::{cli::OutputFormat, network::Network};
use coretime_renewals::{
	BlockNumber, ClassifiedRecord, EstimatedRecords, LeasePeriod, ParaId, RenewalEstimate,
	RenewalTarget, Timeslice, UNKNOWN,
};
use serde::Serialize;
use sp_arithmetic::{FixedI128, FixedPointNumber};
use std::io::{self, Write};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryRow {
	renew_at: RenewalTarget,
	cores: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParaRow<'a> {
	para_id: ParaId,
	name: &'a str,
	final_lease_period: LeasePeriod,
	renew_core_at: RenewalTarget,
	core_until_block: BlockNumber,
	legacy_lease_end: BlockNumber,
	#[serde(skip_serializing_if = "Option::is_none")]
	core_until_timeslice: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	observed_timeslice: Option<Timeslice>,
	#[serde(skip_serializing_if = "Option::is_none")]
	timeslice_delta: Option<f64>,
}

impl<'a> ParaRow<'a> {
	fn new(
		record: &'a ClassifiedRecord,
		observed_timeslice: Option<Timeslice>,
		timeslice_delta: Option<FixedI128>,
	) -> Self {
		Self {
			para_id: record.para_id,
			name: &record.name,
			final_lease_period: record.final_lease_period,
			renew_core_at: record.renewal_target,
			core_until_block: record.expiry_block,
			legacy_lease_end: record.legacy_expiry_block,
			core_until_timeslice: record.expiry_timeslice.map(to_f64),
			observed_timeslice,
			timeslice_delta: timeslice_delta.map(to_f64),
		}
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
	network: &'a str,
	sale_start: BlockNumber,
	current_lease_period: LeasePeriod,
	reconciled: bool,
	total_active_cores: u32,
	summary: Vec<SummaryRow>,
	paras: Vec<ParaRow<'a>>,
	skipped: Vec<String>,
}

impl<'a> Report<'a> {
	fn new(network: Network, estimate: &'a RenewalEstimate) -> Self {
		let (reconciled, paras) = match &estimate.records {
			EstimatedRecords::Classified(records) =>
				(false, records.iter().map(|record| ParaRow::new(record, None, None)).collect()),
			EstimatedRecords::Reconciled(records) => (
				true,
				records
					.iter()
					.map(|r| ParaRow::new(&r.record, r.observed_timeslice, r.timeslice_delta))
					.collect(),
			),
		};

		Report {
			network: network.as_str(),
			sale_start: estimate.sale_start,
			current_lease_period: estimate.current_lease_period,
			reconciled,
			total_active_cores: estimate.summary.total_active_cores,
			summary: estimate
				.summary
				.renewals
				.iter()
				.map(|(target, cores)| SummaryRow { renew_at: *target, cores: *cores })
				.collect(),
			paras,
			skipped: estimate.skipped.iter().map(ToString::to_string).collect(),
		}
	}
}

fn to_f64(value: FixedI128) -> f64 {
	value.into_inner() as f64 / FixedI128::DIV as f64
}

/// Write `estimate` to `out` in the requested format.
pub fn render(
	estimate: &RenewalEstimate,
	network: Network,
	format: OutputFormat,
	out: &mut impl Write,
) -> io::Result<()> {
	let report = Report::new(network, estimate);
	match format {
		OutputFormat::Json => {
			serde_json::to_writer_pretty(&mut *out, &report)?;
			writeln!(out)
		},
		OutputFormat::Text => render_text(&report, out),
	}
}

fn render_text(report: &Report, out: &mut impl Write) -> io::Result<()> {
	writeln!(out, "**************************")?;
	writeln!(out, "** CORETIME RENOVATIONS **")?;
	writeln!(out, "**************************")?;
	writeln!(out)?;
	writeln!(out, "NETWORK -> {}", report.network)?;
	writeln!(out, "CURRENT LEASE PERIOD -> {}", report.current_lease_period)?;
	writeln!(out, "ESTIMATED CORETIME SALE START -> {}", report.sale_start)?;
	writeln!(out)?;
	writeln!(out, "TOTAL ACTIVE CORES -> {}", report.total_active_cores)?;
	writeln!(out)?;
	writeln!(out, "CORES SUMMARY -> Number of estimated renewals per sale cycle.")?;
	for row in &report.summary {
		writeln!(out, "  {:<22} {}", row.renew_at.to_string(), row.cores)?;
	}
	writeln!(out)?;

	writeln!(out, "PARAID DETAILS")?;
	write!(
		out,
		"{:>6}  {:<24} {:>8}  {:<22} {:>12} {:>12}",
		"para", "name", "final LP", "renew at", "core until", "lease end",
	)?;
	if report.reconciled {
		write!(out, " {:>14} {:>10} {:>12}", "until slice", "observed", "delta")?;
	}
	writeln!(out)?;

	for para in &report.paras {
		write!(
			out,
			"{:>6}  {:<24} {:>8}  {:<22} {:>12} {:>12}",
			para.para_id,
			para.name,
			para.final_lease_period,
			para.renew_core_at.to_string(),
			para.core_until_block,
			para.legacy_lease_end,
		)?;
		if report.reconciled {
			write!(
				out,
				" {:>14} {:>10} {:>12}",
				optional(para.core_until_timeslice),
				optional(para.observed_timeslice),
				optional(para.timeslice_delta),
			)?;
		}
		writeln!(out)?;
	}

	if !report.skipped.is_empty() {
		writeln!(out)?;
		writeln!(out, "SKIPPED LEASE RECORDS")?;
		for skipped in &report.skipped {
			writeln!(out, "  {skipped}")?;
		}
	}

	Ok(())
}

fn optional<T: ToString>(value: Option<T>) -> String {
	value.map(|v| v.to_string()).unwrap_or_else(|| UNKNOWN.to_string())
}
