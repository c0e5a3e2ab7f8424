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

//! Chain state read from live nodes over JSON-RPC.

use super::{ChainSource, ChainState, LeaseTiming};
use crate::LOG_TARGET;
use anyhow::Context;
use async_trait::async_trait;
use codec::{Decode, DecodeAll, Encode};
use coretime_renewals::{BlockNumber, CoretimeLease, LeaseSnapshot, ParaId, RawLease, Timeslice};
use frame_metadata::{RuntimeMetadata, RuntimeMetadataPrefixed, META_RESERVED};
use jsonrpsee::{
	core::{client::ClientT, params::ArrayParams},
	ws_client::{WsClient, WsClientBuilder},
};
use serde::Deserialize;
use serde_json::{json, Value};
use sp_crypto_hashing::{twox_128, twox_64};
use std::time::Duration;

/// Timeout for connecting and for every single request.
pub const RPC_TIMEOUT: Duration = Duration::from_secs(60);

const KEYS_PAGE_SIZE: u32 = 1000;
const VALUES_BATCH_SIZE: usize = 256;

/// `twox_128(pallet) ++ twox_128(item)`.
const STORAGE_PREFIX_LEN: usize = 32;
/// Hash preceding the encoded key of a `Twox64Concat` map.
const TWOX_64_LEN: usize = 8;

/// Value of `Slots::Leases`: one optional `(AccountId32, Balance)` deposit per lease period.
type LeasePeriods = Vec<Option<([u8; 32], u128)>>;

/// Item of `Broker::Leases`.
#[derive(Debug, Encode, Decode)]
struct LeaseRecordItem {
	until: Timeslice,
	task: u32,
}

#[derive(Debug, Deserialize)]
struct StorageChangeSet {
	changes: Vec<(String, Option<String>)>,
}

/// Reads `Slots::Leases` from the relay chain and, optionally, `Broker::Leases` from the
/// coretime chain.
pub struct RpcSource {
	relay_uri: String,
	coretime_uri: Option<String>,
}

impl RpcSource {
	pub fn new(relay_uri: impl Into<String>, coretime_uri: Option<String>) -> Self {
		Self { relay_uri: relay_uri.into(), coretime_uri }
	}
}

#[async_trait]
impl ChainSource for RpcSource {
	async fn fetch(&self) -> anyhow::Result<ChainState> {
		let relay = connect(&self.relay_uri).await?;
		let (current_block, at) = best_block(&relay).await?;
		let timing = lease_timing(&relay, &at).await?;
		let leases = slot_leases(&relay, &at).await?;
		log::info!(
			target: LOG_TARGET,
			"Fetched {} slot leases at block #{current_block} ({at})",
			leases.len(),
		);

		// The broker leases only serve as a cross-check, the estimate does not depend on them.
		let coretime_leases = match &self.coretime_uri {
			Some(uri) => match fetch_broker_leases(uri).await {
				Ok(leases) => {
					log::info!(target: LOG_TARGET, "Fetched {} broker leases", leases.len());
					Some(leases)
				},
				Err(e) => {
					log::warn!(target: LOG_TARGET, "Broker leases unavailable: {e:?}");
					None
				},
			},
			None => None,
		};

		Ok(ChainState {
			timing,
			snapshot: LeaseSnapshot { current_block, leases, coretime_leases },
		})
	}
}

async fn connect(uri: &str) -> anyhow::Result<WsClient> {
	log::debug!(target: LOG_TARGET, "Connecting to {uri}");
	WsClientBuilder::default()
		.connection_timeout(RPC_TIMEOUT)
		.request_timeout(RPC_TIMEOUT)
		.max_response_size(u32::MAX)
		.build(uri)
		.await
		.with_context(|| format!("Failed to connect to {uri}"))
}

/// Number and hash of the best block.
async fn best_block(client: &WsClient) -> anyhow::Result<(BlockNumber, String)> {
	let hash: Option<String> = client
		.request("chain_getBlockHash", ArrayParams::new())
		.await
		.context("chain_getBlockHash failed")?;
	let hash = hash.context("Node returned no best block hash")?;

	let header: Value = client
		.request("chain_getHeader", params([json!(hash)])?)
		.await
		.context("chain_getHeader failed")?;
	let number = header
		.get("number")
		.and_then(Value::as_str)
		.context("Block header has no number")?;

	Ok((parse_block_number(number)?, hash))
}

/// `Slots::LeaseOffset` and `Slots::LeasePeriod` of the runtime at `at`.
async fn lease_timing(client: &WsClient, at: &str) -> anyhow::Result<LeaseTiming> {
	let metadata: String = client
		.request("state_getMetadata", params([json!(at)])?)
		.await
		.context("state_getMetadata failed")?;
	let timing = slots_constants(&from_hex(&metadata)?)?;
	log::info!(
		target: LOG_TARGET,
		"Chain lease offset {:?}, lease period {:?}",
		timing.lease_offset,
		timing.lease_period,
	);
	Ok(timing)
}

fn slots_constants(encoded: &[u8]) -> anyhow::Result<LeaseTiming> {
	let RuntimeMetadataPrefixed(magic, metadata) =
		RuntimeMetadataPrefixed::decode(&mut &encoded[..])
			.context("Failed to decode runtime metadata")?;
	anyhow::ensure!(magic == META_RESERVED, "Unexpected runtime metadata magic {magic:#x}");

	let constants: Option<Vec<(&str, &[u8])>> = match &metadata {
		RuntimeMetadata::V14(metadata) =>
			metadata.pallets.iter().find(|pallet| pallet.name == "Slots").map(|pallet| {
				pallet.constants.iter().map(|c| (c.name.as_str(), c.value.as_slice())).collect()
			}),
		RuntimeMetadata::V15(metadata) =>
			metadata.pallets.iter().find(|pallet| pallet.name == "Slots").map(|pallet| {
				pallet.constants.iter().map(|c| (c.name.as_str(), c.value.as_slice())).collect()
			}),
		other => anyhow::bail!("Unsupported runtime metadata version {}", other.version()),
	};

	let Some(constants) = constants else {
		log::warn!(target: LOG_TARGET, "Runtime has no Slots pallet");
		return Ok(LeaseTiming::default())
	};

	let mut timing = LeaseTiming::default();
	for (name, value) in constants {
		match name {
			"LeaseOffset" => {
				let offset = decode_block_number(value).context("Invalid Slots::LeaseOffset")?;
				timing.lease_offset = Some(offset);
			},
			"LeasePeriod" => {
				let period = decode_block_number(value).context("Invalid Slots::LeasePeriod")?;
				timing.lease_period = Some(period);
			},
			_ => {},
		}
	}
	Ok(timing)
}

/// Relay chain block numbers are `u32`, wider encodings are accepted as well.
fn decode_block_number(value: &[u8]) -> anyhow::Result<BlockNumber> {
	match value.len() {
		4 => Ok(u32::decode_all(&mut &value[..])?.into()),
		8 => Ok(u64::decode_all(&mut &value[..])?),
		len => anyhow::bail!("Unexpected {len} byte block number"),
	}
}

async fn slot_leases(client: &WsClient, at: &str) -> anyhow::Result<Vec<RawLease>> {
	let prefix = to_hex(&storage_prefix(b"Slots", b"Leases"));

	let mut keys = Vec::new();
	let mut start_key: Option<String> = None;
	loop {
		let page: Vec<String> = client
			.request(
				"state_getKeysPaged",
				params([json!(prefix), json!(KEYS_PAGE_SIZE), json!(start_key), json!(at)])?,
			)
			.await
			.context("state_getKeysPaged failed")?;
		let full_page = page.len() == KEYS_PAGE_SIZE as usize;
		start_key = page.last().cloned();
		keys.extend(page);
		if !full_page {
			break
		}
	}
	log::debug!(target: LOG_TARGET, "Found {} Slots::Leases keys", keys.len());

	let mut leases = Vec::with_capacity(keys.len());
	for batch in keys.chunks(VALUES_BATCH_SIZE) {
		let change_sets: Vec<StorageChangeSet> = client
			.request("state_queryStorageAt", params([json!(batch), json!(at)])?)
			.await
			.context("state_queryStorageAt failed")?;

		for (key, value) in change_sets.into_iter().flat_map(|set| set.changes) {
			let Some(value) = value else { continue };
			let periods = decode_lease_periods(&from_hex(&value)?)
				.with_context(|| format!("Failed to decode Slots::Leases value of {key}"))?;
			match para_id_from_key(&from_hex(&key)?) {
				Some(para_id) => leases.push(RawLease::from_periods(para_id, &periods)),
				None => {
					log::warn!(target: LOG_TARGET, "Unexpected Slots::Leases key {key}");
					leases.push(RawLease { para_id: None, periods_remaining: periods.len() as i64 });
				},
			}
		}
	}

	Ok(leases)
}

async fn fetch_broker_leases(uri: &str) -> anyhow::Result<Vec<CoretimeLease>> {
	let client = connect(uri).await?;
	let key = to_hex(&storage_prefix(b"Broker", b"Leases"));
	let value: Option<String> = client
		.request("state_getStorage", params([json!(key)])?)
		.await
		.context("state_getStorage failed")?;

	match value {
		Some(value) => decode_broker_leases(&from_hex(&value)?),
		None => Ok(Vec::new()),
	}
}

fn params<const N: usize>(values: [Value; N]) -> anyhow::Result<ArrayParams> {
	let mut params = ArrayParams::new();
	for value in values {
		params.insert(value).context("Failed to encode RPC parameters")?;
	}
	Ok(params)
}

fn storage_prefix(pallet: &[u8], item: &[u8]) -> Vec<u8> {
	[twox_128(pallet), twox_128(item)].concat()
}

/// Para id of a `Slots::Leases` key, checking its `Twox64Concat` hash.
fn para_id_from_key(key: &[u8]) -> Option<ParaId> {
	let hashed = key.get(STORAGE_PREFIX_LEN..)?;
	let hash = hashed.get(..TWOX_64_LEN)?;
	let encoded = hashed.get(TWOX_64_LEN..)?;
	if hash != &twox_64(encoded)[..] {
		return None
	}
	ParaId::decode_all(&mut &encoded[..]).ok()
}

fn decode_lease_periods(data: &[u8]) -> Result<LeasePeriods, codec::Error> {
	LeasePeriods::decode_all(&mut &data[..])
}

fn decode_broker_leases(data: &[u8]) -> anyhow::Result<Vec<CoretimeLease>> {
	let items = Vec::<LeaseRecordItem>::decode_all(&mut &data[..])
		.context("Failed to decode Broker::Leases")?;
	Ok(items
		.into_iter()
		.map(|item| CoretimeLease { para_id: item.task, until: item.until })
		.collect())
}

fn parse_block_number(number: &str) -> anyhow::Result<BlockNumber> {
	BlockNumber::from_str_radix(number.trim_start_matches("0x"), 16)
		.with_context(|| format!("Invalid block number {number}"))
}

fn to_hex(bytes: &[u8]) -> String {
	format!("0x{}", hex::encode(bytes))
}

fn from_hex(value: &str) -> anyhow::Result<Vec<u8>> {
	hex::decode(value.trim_start_matches("0x")).with_context(|| format!("Invalid hex {value}"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use frame_metadata::v14::{
		ExtrinsicMetadata, PalletConstantMetadata, PalletMetadata, RuntimeMetadataV14,
	};
	use scale_info::meta_type;

	fn encoded_metadata(
		pallet: &'static str,
		constants: Vec<(&'static str, Vec<u8>)>,
	) -> Vec<u8> {
		let pallet = PalletMetadata {
			name: pallet,
			storage: None,
			calls: None,
			event: None,
			constants: constants
				.into_iter()
				.map(|(name, value)| PalletConstantMetadata {
					name,
					ty: meta_type::<u32>(),
					value,
					docs: vec![],
				})
				.collect(),
			error: None,
			index: 71,
		};
		let extrinsic =
			ExtrinsicMetadata { ty: meta_type::<()>(), version: 4, signed_extensions: vec![] };
		RuntimeMetadataPrefixed::from(RuntimeMetadataV14::new(
			vec![pallet],
			extrinsic,
			meta_type::<()>(),
		))
		.encode()
	}

	fn leases_key(para_id: ParaId) -> Vec<u8> {
		let encoded = para_id.encode();
		[storage_prefix(b"Slots", b"Leases"), twox_64(&encoded).to_vec(), encoded].concat()
	}

	#[test]
	fn storage_prefix_matches_known_value() {
		// twox_128("System") ++ twox_128("Account")
		assert_eq!(
			to_hex(&storage_prefix(b"System", b"Account")),
			"0x26aa394eea5630e07c48ae0c9558cef7b99d880ec681799c0cf30e8886371da9"
		);
	}

	#[test]
	fn para_id_is_read_from_map_key() {
		assert_eq!(para_id_from_key(&leases_key(2000)), Some(2000));
		assert_eq!(para_id_from_key(&leases_key(u32::MAX)), Some(u32::MAX));
	}

	#[test]
	fn key_with_wrong_hash_or_length_is_rejected() {
		let mut key = leases_key(2000);
		key[STORAGE_PREFIX_LEN] ^= 1;
		assert_eq!(para_id_from_key(&key), None);

		let key = leases_key(2000);
		assert_eq!(para_id_from_key(&key[..key.len() - 1]), None);
		assert_eq!(para_id_from_key(&key[..STORAGE_PREFIX_LEN]), None);
	}

	#[test]
	fn lease_periods_are_counted_including_empty_ones() {
		let periods: LeasePeriods = vec![Some(([1; 32], 10)), None, Some(([2; 32], 20))];

		let decoded = decode_lease_periods(&periods.encode()).unwrap();

		assert_eq!(decoded.len(), 3);
		assert_eq!(RawLease::from_periods(2000, &decoded), RawLease::new(2000, 3));
		assert!(decode_lease_periods(&[0xff]).is_err());
	}

	#[test]
	fn broker_leases_are_decoded() {
		let items = vec![
			LeaseRecordItem { until: 300_000, task: 2000 },
			LeaseRecordItem { until: 310_080, task: 2004 },
		];

		assert_eq!(
			decode_broker_leases(&items.encode()).unwrap(),
			vec![
				CoretimeLease { para_id: 2000, until: 300_000 },
				CoretimeLease { para_id: 2004, until: 310_080 },
			]
		);
	}

	#[test]
	fn lease_constants_are_read_from_metadata() {
		let metadata = encoded_metadata(
			"Slots",
			vec![
				("LeaseOffset", 921_600u32.encode()),
				("LeasePeriod", 1_209_600u32.encode()),
				("EarlyLeaseTemplate", 7u32.encode()),
			],
		);

		assert_eq!(
			slots_constants(&metadata).unwrap(),
			LeaseTiming { lease_offset: Some(921_600), lease_period: Some(1_209_600) }
		);
	}

	#[test]
	fn missing_slots_pallet_leaves_timing_unset() {
		let metadata = encoded_metadata("System", vec![("BlockHashCount", 4096u32.encode())]);

		assert_eq!(slots_constants(&metadata).unwrap(), LeaseTiming::default());
	}

	#[test]
	fn malformed_metadata_is_rejected() {
		let mut metadata = encoded_metadata("Slots", vec![("LeasePeriod", 604_800u32.encode())]);
		metadata[0] ^= 1;
		assert!(slots_constants(&metadata).is_err());

		let metadata = encoded_metadata("Slots", vec![("LeasePeriod", vec![1, 2, 3])]);
		assert!(slots_constants(&metadata).is_err());
	}

	#[test]
	fn block_number_constants_accept_both_widths() {
		assert_eq!(decode_block_number(&604_800u32.encode()).unwrap(), 604_800);
		assert_eq!(decode_block_number(&(u32::MAX as u64 + 1).encode()).unwrap(), 1 << 32);
		assert!(decode_block_number(&[0; 2]).is_err());
	}

	#[test]
	fn block_numbers_are_hex() {
		assert_eq!(parse_block_number("0x15a5e00").unwrap(), 22_699_520);
		assert!(parse_block_number("0xzz").is_err());
	}
}
