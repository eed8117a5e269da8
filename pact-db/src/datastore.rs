//! In-memory datastore with atomic multi-row transactions
//!
//! The protocol's durable records live behind this store. Its contract is
//! what the protocol needs from any store: CRUD over the five record
//! kinds, conditional writes ("update the Deal only if its status is X"),
//! and multi-row transactions that commit or roll back as one unit.
//!
//! The in-memory implementation serializes writers on one lock and rolls
//! back by restoring a snapshot when a transaction closure fails, so a
//! failed confirm leaves every table untouched. Concurrent confirm
//! attempts on the same Deal serialize here; the loser observes the Deal
//! already terminal.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

use pact_core::error::{PactError, ProtocolResult};
use pact_core::types::{
    AccessToken, ActorType, AuditEventType, AuditLogEntry, AuditMetadata, Deal, DealId,
    DealStatus, OneTimeCode, PublicId, VerificationRecord, VerificationType,
};

use crate::error::{PactDbError, PactDbResult};

/// All durable tables; cloned as the rollback snapshot
#[derive(Debug, Default, Clone)]
pub struct Tables {
    deals: HashMap<String, Deal>,
    /// public_id -> deal_id
    public_index: HashMap<String, String>,
    /// One token per Deal, keyed by deal_id
    tokens: HashMap<String, AccessToken>,
    /// At most one record per (deal_id, verification_type)
    verifications: HashMap<(String, VerificationType), VerificationRecord>,
    codes: Vec<OneTimeCode>,
    audit: Vec<AuditLogEntry>,
    audit_seq: u64,
}

impl Tables {
    /// Insert a fresh Deal with its access token
    pub fn insert_deal(&mut self, deal: Deal, token: AccessToken) -> PactDbResult<()> {
        let deal_id = deal.deal_id.as_str().to_string();
        let public_id = deal.public_id.as_str().to_string();
        if self.deals.contains_key(&deal_id) {
            return Err(PactDbError::AlreadyExists(format!("deal {}", deal_id)));
        }
        if self.public_index.contains_key(&public_id) {
            return Err(PactDbError::AlreadyExists(format!(
                "public id {}",
                public_id
            )));
        }
        self.public_index.insert(public_id, deal_id.clone());
        self.tokens.insert(deal_id.clone(), token);
        self.deals.insert(deal_id, deal);
        Ok(())
    }

    pub fn deal(&self, deal_id: &DealId) -> Option<&Deal> {
        self.deals.get(deal_id.as_str())
    }

    pub fn deal_mut(&mut self, deal_id: &DealId) -> Option<&mut Deal> {
        self.deals.get_mut(deal_id.as_str())
    }

    pub fn deal_by_public_id(&self, public_id: &PublicId) -> Option<&Deal> {
        let deal_id = self.public_index.get(public_id.as_str())?;
        self.deals.get(deal_id)
    }

    pub fn public_id_taken(&self, public_id: &str) -> bool {
        self.public_index.contains_key(public_id)
    }

    pub fn deals_by_creator(&self, creator_id: &str) -> Vec<Deal> {
        self.deals
            .values()
            .filter(|d| d.creator_id == creator_id)
            .cloned()
            .collect()
    }

    pub fn token(&self, deal_id: &DealId) -> Option<&AccessToken> {
        self.tokens.get(deal_id.as_str())
    }

    pub fn token_mut(&mut self, deal_id: &DealId) -> Option<&mut AccessToken> {
        self.tokens.get_mut(deal_id.as_str())
    }

    /// Conditional write: mutate the Deal only if its current status
    /// matches `expected`
    pub fn update_deal_if_status(
        &mut self,
        deal_id: &DealId,
        expected: DealStatus,
        update: impl FnOnce(&mut Deal),
    ) -> PactDbResult<()> {
        let deal = self
            .deals
            .get_mut(deal_id.as_str())
            .ok_or_else(|| PactDbError::NotFound(format!("deal {}", deal_id)))?;
        if deal.status != expected {
            return Err(PactDbError::Conflict(format!(
                "deal {} is {}, expected {}",
                deal_id,
                deal.status.as_str(),
                expected.as_str()
            )));
        }
        update(deal);
        Ok(())
    }

    /// Upsert semantics: at most one record per (deal, type)
    pub fn upsert_verification(&mut self, record: VerificationRecord) {
        let key = (
            record.deal_id.as_str().to_string(),
            record.verification_type,
        );
        self.verifications.insert(key, record);
    }

    /// Verification records for a Deal, sorted by type name
    pub fn verifications_for(&self, deal_id: &DealId) -> Vec<VerificationRecord> {
        let mut records: Vec<VerificationRecord> = self
            .verifications
            .values()
            .filter(|r| r.deal_id == *deal_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.verification_type);
        records
    }

    pub fn verification(
        &self,
        deal_id: &DealId,
        verification_type: VerificationType,
    ) -> Option<&VerificationRecord> {
        self.verifications
            .get(&(deal_id.as_str().to_string(), verification_type))
    }

    pub fn push_code(&mut self, code: OneTimeCode) {
        self.codes.push(code);
    }

    /// The most recently issued usable code for a channel
    pub fn usable_code(
        &self,
        deal_id: &DealId,
        code_type: VerificationType,
        target: &str,
        at: DateTime<Utc>,
    ) -> Option<&OneTimeCode> {
        self.codes.iter().rev().find(|c| {
            c.deal_id == *deal_id
                && c.code_type == code_type
                && c.target == target
                && c.is_usable(at)
        })
    }

    /// Mutable variant of [`Tables::usable_code`], used by the consume path
    pub fn usable_code_mut(
        &mut self,
        deal_id: &DealId,
        code_type: VerificationType,
        target: &str,
        at: DateTime<Utc>,
    ) -> Option<&mut OneTimeCode> {
        self.codes
            .iter_mut()
            .rev()
            .find(|c| {
                c.deal_id == *deal_id
                    && c.code_type == code_type
                    && c.target == target
                    && c.is_usable(at)
            })
    }

    /// Append one audit entry; entries are never updated or removed
    pub fn append_audit(
        &mut self,
        deal_id: &DealId,
        actor_type: ActorType,
        actor_id: Option<String>,
        metadata: AuditMetadata,
        at: DateTime<Utc>,
    ) {
        self.audit_seq += 1;
        let entry_id = format!("audit_{:016x}_{:08x}", at.timestamp_micros(), self.audit_seq);
        self.audit.push(AuditLogEntry::new(
            entry_id,
            deal_id.clone(),
            actor_type,
            actor_id,
            metadata,
            at,
        ));
    }

    /// Entries for a Deal in creation order
    pub fn audit_for(&self, deal_id: &DealId) -> Vec<AuditLogEntry> {
        self.audit
            .iter()
            .filter(|e| e.deal_id == *deal_id)
            .cloned()
            .collect()
    }

    pub fn count_audit(&self, deal_id: &DealId, event_type: AuditEventType) -> u64 {
        self.audit
            .iter()
            .filter(|e| e.deal_id == *deal_id && e.event_type == event_type)
            .count() as u64
    }
}

/// In-memory datastore
///
/// One exclusive lock over all tables gives the transaction guarantee the
/// protocol requires without a database at hand; a durable deployment
/// swaps this for a store with multi-row transactions and conditional
/// writes.
#[derive(Debug, Default)]
pub struct MemoryDatastore {
    inner: RwLock<Tables>,
}

impl MemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only access to the tables
    pub fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> ProtocolResult<T> {
        let guard = self
            .inner
            .read()
            .map_err(|e| PactError::Storage(format!("lock poisoned: {}", e)))?;
        Ok(f(&guard))
    }

    /// Run a closure against the tables as one atomic unit
    ///
    /// If the closure returns an error the tables are restored from a
    /// snapshot, so partial mutations never become visible.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&mut Tables) -> ProtocolResult<T>,
    ) -> ProtocolResult<T> {
        let mut guard = self
            .inner
            .write()
            .map_err(|e| PactError::Storage(format!("lock poisoned: {}", e)))?;
        let snapshot = guard.clone();
        match f(&mut guard) {
            Ok(value) => Ok(value),
            Err(err) => {
                *guard = snapshot;
                Err(err)
            }
        }
    }
}
