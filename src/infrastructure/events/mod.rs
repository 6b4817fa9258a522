mod codec;
mod in_memory_store;
mod redis_store;

pub use codec::{decode_entry, encode_payload};
pub use in_memory_store::InMemoryEventStore;
pub use redis_store::RedisEventStore;
