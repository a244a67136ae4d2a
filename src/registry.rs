//! The room registry: bounded `code → Room` mapping with a time-ordered
//! secondary index for oldest-room eviction, plus the session→room-code
//! index. Primary lookups are lock-free (per-shard) via `DashMap`; the
//! dual-index mutation during create/destroy is serialized by `order`,
//! matching spec.md §4.1/§5's "registry-wide guard... during create/
//! destroy; primary-code lookup is lock-free".

use std::collections::BTreeMap;
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use rand::Rng;
use uuid::Uuid;

use crate::room::Room;
use crate::validation::ROOM_CODE_ALPHABET;

const DEFAULT_MAX_ROOMS: usize = 2500;
const CODE_GENERATION_ATTEMPTS: usize = 10_000;

#[derive(Debug, Clone, Copy)]
pub struct RegistryConfig {
    pub max_rooms: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig { max_rooms: DEFAULT_MAX_ROOMS }
    }
}

impl RegistryConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(val) = env::var("MAX_ROOMS")
            && let Ok(n) = val.parse::<usize>()
        {
            config.max_rooms = n;
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    RoomNotFound,
    Exhausted,
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::RoomNotFound => write!(f, "room not found"),
            RegistryError::Exhausted => write!(f, "room code space exhausted"),
        }
    }
}

fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0)
}

pub struct RoomRegistry {
    rooms: DashMap<String, Arc<Room>>,
    /// (created_at_nanos, order_seq) → code. The tie-broken ordering key
    /// resolving spec.md §9's Open Question.
    order: Mutex<BTreeMap<(i64, u64), String>>,
    sessions: DashMap<Uuid, String>,
    next_order_seq: AtomicU64,
    config: RegistryConfig,
}

impl RoomRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        RoomRegistry {
            rooms: DashMap::new(),
            order: Mutex::new(BTreeMap::new()),
            sessions: DashMap::new(),
            next_order_seq: AtomicU64::new(0),
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Uniform-random sample over the room-code alphabet until an unused
    /// code is found. Fails only if the space cannot be exhausted within a
    /// generous retry budget (never observed at documented capacity).
    pub fn generate_code(&self) -> Result<String, RegistryError> {
        let mut rng = rand::thread_rng();
        for _ in 0..CODE_GENERATION_ATTEMPTS {
            let code: String = (0..4)
                .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
                .collect();
            if !self.rooms.contains_key(&code) {
                return Ok(code);
            }
        }
        Err(RegistryError::Exhausted)
    }

    /// Creates the room if absent, evicting the oldest room first if the
    /// registry is at capacity. Returns the resulting (existing or new) room.
    pub fn create(&self, code: &str) -> Arc<Room> {
        if let Some(existing) = self.rooms.get(code) {
            return Arc::clone(existing.value());
        }

        let mut order = self.order.lock().unwrap();
        // Re-check under the lock: another thread may have created it first.
        if let Some(existing) = self.rooms.get(code) {
            return Arc::clone(existing.value());
        }

        if self.rooms.len() >= self.config.max_rooms {
            self.evict_oldest_locked(&mut order);
        }

        let created_at_nanos = now_nanos();
        let order_seq = self.next_order_seq.fetch_add(1, Ordering::Relaxed);
        let room = Arc::new(Room::new(code.to_string(), created_at_nanos, order_seq));
        order.insert((created_at_nanos, order_seq), code.to_string());
        self.rooms.insert(code.to_string(), Arc::clone(&room));
        room
    }

    fn evict_oldest_locked(&self, order: &mut BTreeMap<(i64, u64), String>) {
        let Some((&key, _)) = order.iter().next() else { return };
        if let Some((_, code)) = order.remove_entry(&key) {
            self.rooms.remove(&code);
            self.sessions.retain(|_, v| v != &code);
        }
    }

    pub fn find(&self, code: &str) -> Option<Arc<Room>> {
        self.rooms.get(code).map(|r| Arc::clone(r.value()))
    }

    pub fn find_or_fail(&self, code: &str) -> Result<Arc<Room>, RegistryError> {
        self.find(code).ok_or(RegistryError::RoomNotFound)
    }

    pub fn bind_session(&self, session_id: Uuid, code: &str) {
        self.sessions.insert(session_id, code.to_string());
    }

    pub fn unbind_session(&self, session_id: Uuid) {
        self.sessions.remove(&session_id);
    }

    /// Chained lookup; a session bound to a code with no surviving room is
    /// pruned lazily.
    pub fn room_of_session(&self, session_id: Uuid) -> Option<Arc<Room>> {
        let code = self.sessions.get(&session_id).map(|c| c.clone())?;
        match self.find(&code) {
            Some(room) => Some(room),
            None => {
                self.sessions.remove(&session_id);
                None
            }
        }
    }

    pub fn sessions_of(&self, code: &str) -> Vec<Uuid> {
        self.sessions
            .iter()
            .filter(|entry| entry.value() == code)
            .map(|entry| *entry.key())
            .collect()
    }

    pub fn destroy(&self, code: &str) {
        let mut order = self.order.lock().unwrap();
        if let Some((_, room)) = self.rooms.remove(code) {
            order.retain(|_, v| v != &room.code);
        }
        self.sessions.retain(|_, v| v != code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_is_idempotent_for_existing_code() {
        let reg = RoomRegistry::new(RegistryConfig { max_rooms: 10 });
        let r1 = reg.create("ABCD");
        let r2 = reg.create("ABCD");
        assert!(Arc::ptr_eq(&r1, &r2));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn eviction_removes_oldest_at_capacity() {
        let reg = RoomRegistry::new(RegistryConfig { max_rooms: 2 });
        reg.create("R1");
        reg.create("R2");
        reg.create("R3");
        assert_eq!(reg.len(), 2);
        assert!(reg.find("R1").is_none());
        assert!(reg.find("R2").is_some());
        assert!(reg.find("R3").is_some());
    }

    #[test]
    fn eviction_prunes_session_bindings() {
        let reg = RoomRegistry::new(RegistryConfig { max_rooms: 1 });
        reg.create("R1");
        let session = Uuid::new_v4();
        reg.bind_session(session, "R1");
        reg.create("R2");
        assert!(reg.room_of_session(session).is_none());
    }

    #[test]
    fn registry_bound_never_exceeded() {
        let reg = RoomRegistry::new(RegistryConfig { max_rooms: 5 });
        for i in 0..50 {
            reg.create(&format!("R{i:03}"));
            assert!(reg.len() <= 5);
        }
    }

    #[test]
    fn find_or_fail_reports_not_found() {
        let reg = RoomRegistry::new(RegistryConfig::default());
        match reg.find_or_fail("ZZZZ") {
            Err(RegistryError::RoomNotFound) => {}
            other => panic!("expected RoomNotFound, got {:?}", other.map(|r| r.code.clone())),
        }
    }

    #[test]
    fn destroy_removes_room_and_sessions() {
        let reg = RoomRegistry::new(RegistryConfig::default());
        reg.create("ABCD");
        let s = Uuid::new_v4();
        reg.bind_session(s, "ABCD");
        reg.destroy("ABCD");
        assert!(reg.find("ABCD").is_none());
        assert!(reg.room_of_session(s).is_none());
    }

    #[test]
    fn generated_codes_are_well_formed() {
        let reg = RoomRegistry::new(RegistryConfig::default());
        for _ in 0..200 {
            let code = reg.generate_code().unwrap();
            assert_eq!(code.chars().count(), 4);
            assert!(code.chars().all(|c| crate::validation::ROOM_CODE_ALPHABET.contains(&(c as u8))));
            reg.create(&code);
        }
    }
}
