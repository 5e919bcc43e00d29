//! Transaction serial numbers, nonce strings and gateway timestamps

use chrono::{DateTime, Local, TimeZone};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::fmt::Display;
use std::sync::{Mutex, OnceLock};

const ALPHANUMERIC: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Run `f` with the process-wide generator, seeded from the OS on first use.
fn with_rng<T>(f: impl FnOnce(&mut StdRng) -> T) -> T {
    static RNG: OnceLock<Mutex<StdRng>> = OnceLock::new();

    let rng = RNG.get_or_init(|| Mutex::new(StdRng::from_entropy()));
    let mut guard = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut guard)
}

/// `prefix` + `MMDDhhmmss` local time + four random digits.
pub fn transaction_id(prefix: &str) -> String {
    let serial: u32 = with_rng(|rng| rng.gen_range(0..10_000));
    format!("{prefix}{}{serial:04}", Local::now().format("%m%d%H%M%S"))
}

/// Random `[0-9a-zA-Z]` string of `len` characters.
pub fn random_string(len: usize) -> String {
    with_rng(|rng| {
        (0..len)
            .map(|_| ALPHANUMERIC[rng.gen_range(0..ALPHANUMERIC.len())] as char)
            .collect()
    })
}

/// Timestamp layouts the gateway accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeFormat {
    /// `20240131235959`
    #[default]
    YmdHis,
    /// `20240131`
    Ymd,
    /// `2024-01-31 23:59:59`
    DateTime,
    /// `2024-01-31`
    Date,
}

impl TimeFormat {
    fn pattern(self) -> &'static str {
        match self {
            Self::YmdHis => "%Y%m%d%H%M%S",
            Self::Ymd => "%Y%m%d",
            Self::DateTime => "%Y-%m-%d %H:%M:%S",
            Self::Date => "%Y-%m-%d",
        }
    }
}

// Unknown layouts fall back to `YmdHis`.
impl From<&str> for TimeFormat {
    fn from(layout: &str) -> Self {
        match layout {
            "Ymd" => Self::Ymd,
            "Y-m-d H:i:s" => Self::DateTime,
            "Y-m-d" => Self::Date,
            _ => Self::YmdHis,
        }
    }
}

pub fn format_time<Tz>(time: &DateTime<Tz>, format: TimeFormat) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format(format.pattern()).to_string()
}

/// Current local time in `format`.
pub fn timestamp(format: TimeFormat) -> String {
    format_time(&Local::now(), format)
}
