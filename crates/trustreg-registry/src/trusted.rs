//! Allow-list of external collaborating contracts.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use trustreg_core::{
    AccessPolicy, Address, Capability, Clock, EventSink, RegistryEvent, SystemClock,
};

use crate::error::RegistryError;

/// A registered external contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedContractEntry {
    pub address: Address,
    pub name: String,
    pub trusted: bool,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug)]
struct Slot {
    sequence: u64,
    entry: TrustedContractEntry,
}

/// Administrator-managed registry of external contracts and their trust flag.
pub struct TrustedContractRegistry {
    policy: AccessPolicy,
    contracts: DashMap<Address, Slot>,
    next_sequence: AtomicU64,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
}

impl TrustedContractRegistry {
    pub fn new(administrator: Address, events: Arc<dyn EventSink>) -> Self {
        Self {
            policy: AccessPolicy::new(administrator),
            contracts: DashMap::new(),
            next_sequence: AtomicU64::new(0),
            clock: Arc::new(SystemClock),
            events,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register a contract. Each address may be registered once.
    pub fn register(
        &self,
        caller: Address,
        address: Address,
        name: impl Into<String>,
        trusted: bool,
    ) -> Result<(), RegistryError> {
        self.policy
            .authorize(&caller, &Capability::Administer)
            .require()?;

        let entry = match self.contracts.entry(address) {
            Entry::Occupied(_) => return Err(RegistryError::ContractAlreadyRegistered(address)),
            Entry::Vacant(vacant) => {
                let entry = TrustedContractEntry {
                    address,
                    name: name.into(),
                    trusted,
                    registered_at: self.clock.now(),
                };
                vacant.insert(Slot {
                    sequence: self.next_sequence.fetch_add(1, Ordering::SeqCst),
                    entry: entry.clone(),
                });
                entry
            }
        };

        tracing::info!(address = %address, name = %entry.name, trusted, "contract registered");
        self.events.emit(RegistryEvent::ContractRegistered {
            address,
            name: entry.name,
            trusted,
            registered_at: entry.registered_at,
        });
        Ok(())
    }

    /// Set the trust flag of a registered contract.
    pub fn edit_trust(
        &self,
        caller: Address,
        address: Address,
        trusted: bool,
    ) -> Result<(), RegistryError> {
        self.policy
            .authorize(&caller, &Capability::Administer)
            .require()?;

        self.contracts
            .get_mut(&address)
            .ok_or(RegistryError::ContractNotFound(address))?
            .entry
            .trusted = trusted;

        tracing::info!(address = %address, trusted, "contract trust edited");
        self.events
            .emit(RegistryEvent::ContractTrustEdited { address, trusted });
        Ok(())
    }

    /// Trust flag of a registered contract. Unknown addresses are an error,
    /// not `false`.
    pub fn is_trusted(&self, address: &Address) -> Result<bool, RegistryError> {
        self.contracts
            .get(address)
            .map(|slot| slot.entry.trusted)
            .ok_or(RegistryError::ContractNotFound(*address))
    }

    pub fn get_contract(&self, address: &Address) -> Result<TrustedContractEntry, RegistryError> {
        self.contracts
            .get(address)
            .map(|slot| slot.entry.clone())
            .ok_or(RegistryError::ContractNotFound(*address))
    }

    pub fn get_contract_count(&self) -> usize {
        self.contracts.len()
    }

    /// All registered contracts in registration order.
    pub fn list_contracts(&self) -> Vec<TrustedContractEntry> {
        let mut slots: Vec<(u64, TrustedContractEntry)> = self
            .contracts
            .iter()
            .map(|slot| (slot.sequence, slot.entry.clone()))
            .collect();
        slots.sort_by_key(|(sequence, _)| *sequence);
        slots.into_iter().map(|(_, entry)| entry).collect()
    }
}
