//! Pending queues and the linear retry drain.

use std::mem;

use mapforge_node::Node;

use super::Configuration;
use crate::assistant::{self, BuilderAssistant, ResultMapRequest};
use crate::error::{ConfigError, Result};
use crate::mapper;
use crate::outcome::{ArtifactKind, Outcome, PendingReport, Unresolved};

/// A result map waiting for its parent or type.
#[derive(Debug, Clone)]
pub(crate) struct PendingResultMap {
	pub(crate) request: ResultMapRequest,
	/// Document that declared the map.
	pub(crate) resource: String,
	pub(crate) blocked_on: Unresolved,
}

/// A namespace waiting for the cache it references.
#[derive(Debug, Clone)]
pub(crate) struct PendingCacheRef {
	pub(crate) namespace: String,
	pub(crate) target: String,
	pub(crate) blocked_on: Unresolved,
}

/// A statement element to parse again from scratch.
#[derive(Debug, Clone)]
pub(crate) struct PendingStatement {
	pub(crate) assistant: BuilderAssistant,
	pub(crate) node: Node,
	pub(crate) required_database_id: Option<String>,
	pub(crate) id: String,
	pub(crate) blocked_on: Unresolved,
}

#[derive(Debug, Default)]
pub(crate) struct PendingQueues {
	pub(crate) result_maps: Vec<PendingResultMap>,
	pub(crate) cache_refs: Vec<PendingCacheRef>,
	pub(crate) statements: Vec<PendingStatement>,
}

impl PendingQueues {
	pub(crate) fn len(&self) -> usize {
		self.result_maps.len() + self.cache_refs.len() + self.statements.len()
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn reports(&self) -> Vec<PendingReport> {
		let result_maps = self.result_maps.iter().map(|p| PendingReport {
			kind: ArtifactKind::ResultMap,
			id: p.request.id.clone(),
			blocked_on: p.blocked_on.clone(),
		});
		let cache_refs = self.cache_refs.iter().map(|p| PendingReport {
			kind: ArtifactKind::CacheRef,
			id: p.namespace.clone(),
			blocked_on: p.blocked_on.clone(),
		});
		let statements = self.statements.iter().map(|p| PendingReport {
			kind: ArtifactKind::Statement,
			id: p.id.clone(),
			blocked_on: p.blocked_on.clone(),
		});
		result_maps.chain(cache_refs).chain(statements).collect()
	}
}

/// Counts from one drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
	/// Entries resolved during the drain.
	pub resolved: usize,
	/// Entries still pending afterwards.
	pub remaining: usize,
}

impl Configuration {
	/// Retries every pending entry once: result maps, then cache references,
	/// then statements.
	///
	/// Each queue is taken out for its pass; entries that are still
	/// incomplete are put back ahead of anything enqueued during the pass.
	/// This is a single pass, not a loop to a fixed point.
	pub fn drain_pending(&mut self) -> Result<DrainSummary> {
		if self.pending.is_empty() {
			return Ok(DrainSummary::default());
		}
		let mut resolved = 0;

		let queued = mem::take(&mut self.pending.result_maps);
		let mut waiting = Vec::new();
		for mut entry in queued {
			let outcome = assistant::resolve_result_map(self, &entry.request)
				.map_err(|e| e.in_mapper(&entry.resource))?;
			match outcome {
				Outcome::Resolved(_) => resolved += 1,
				Outcome::Incomplete(missing) => {
					entry.blocked_on = missing;
					waiting.push(entry);
				}
			}
		}
		waiting.append(&mut self.pending.result_maps);
		self.pending.result_maps = waiting;

		let queued = mem::take(&mut self.pending.cache_refs);
		let mut waiting = Vec::new();
		for mut entry in queued {
			match assistant::resolve_cache_ref(self, &entry.namespace, &entry.target) {
				Outcome::Resolved(()) => resolved += 1,
				Outcome::Incomplete(missing) => {
					entry.blocked_on = missing;
					waiting.push(entry);
				}
			}
		}
		waiting.append(&mut self.pending.cache_refs);
		self.pending.cache_refs = waiting;

		let queued = mem::take(&mut self.pending.statements);
		let mut waiting = Vec::new();
		for mut entry in queued {
			let outcome = mapper::parse_statement(
				self,
				&entry.assistant,
				&entry.node,
				entry.required_database_id.as_deref(),
			)
			.map_err(|e| e.in_mapper(entry.assistant.resource()))?;
			match outcome {
				Outcome::Resolved(()) => resolved += 1,
				Outcome::Incomplete(missing) => {
					entry.blocked_on = missing;
					waiting.push(entry);
				}
			}
		}
		waiting.append(&mut self.pending.statements);
		self.pending.statements = waiting;

		let summary = DrainSummary {
			resolved,
			remaining: self.pending.len(),
		};
		tracing::debug!(
			resolved = summary.resolved,
			remaining = summary.remaining,
			"drained pending definitions"
		);
		Ok(summary)
	}

	/// Fails with every entry still pending.
	pub fn ensure_resolved(&self) -> Result<()> {
		if self.pending.is_empty() {
			return Ok(());
		}
		let reports = self.pending.reports();
		for report in &reports {
			tracing::warn!(%report, "unresolved definition");
		}
		Err(ConfigError::Unresolved(reports))
	}
}
