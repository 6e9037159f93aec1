//! Client and request identifiers.
//!
//! The client id is computed once per process and then only read; each
//! `HubClient` receives it at construction. Request ids come from an
//! injectable generator so embedders can plug in their own scheme.

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random part of the process client id.
const CLIENT_ID_RANDOM_LEN: usize = 11;

static PROCESS_CLIENT_ID: OnceLock<ClientId> = OnceLock::new();

/// Identifier sent to the hub as the `client_id` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(Arc<str>);

impl ClientId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Random base-36 prefix salted with the current Unix time (ms, base 36).
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let mut id = random_base36(CLIENT_ID_RANDOM_LEN);
        id.push_str(&to_base36(millis));
        Self(id.into())
    }

    /// The id shared by every client in this process, generated on first use.
    pub fn process() -> Self {
        PROCESS_CLIENT_ID.get_or_init(ClientId::generate).clone()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Produces request ids. Must not repeat an id that is still pending.
pub type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Default generator: `len` random base-36 characters.
pub fn random_id_generator(len: usize) -> IdGenerator {
    Arc::new(move || random_base36(len))
}

pub fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect()
}

fn to_base36(mut n: u128) -> String {
    if n == 0 {
        return "0".into();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
