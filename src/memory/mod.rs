use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Deserialize;

use crate::config_err;
use crate::error::{Error, Result};

pub mod directory;
pub mod frame;
pub mod replacer;

/// Size of a virtual page and of a physical frame, in bytes.
pub const PAGE_SIZE: u64 = 4096;

/// Virtual page number, i.e. a raw address divided by [`PAGE_SIZE`].
pub type PageNumber = u64;

/// Page replacement policy used once every frame is occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Policy {
    Fifo,
    Lru,
    /// Belady's MIN. Needs the whole trace up front.
    Optimal,
    SecondChance,
    Clock,
}

impl Policy {
    pub const ALL: [Policy; 5] =
        [Policy::Fifo, Policy::Lru, Policy::Optimal, Policy::SecondChance, Policy::Clock];

    /// The numeric id accepted on the command line.
    pub fn id(&self) -> u8 {
        match self {
            Policy::Fifo => 0,
            Policy::Lru => 1,
            Policy::Optimal => 2,
            Policy::SecondChance => 3,
            Policy::Clock => 4,
        }
    }
}

impl Display for Policy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Policy::Fifo => "FIFO",
            Policy::Lru => "LRU",
            Policy::Optimal => "MIN",
            Policy::SecondChance => "SECOND CHANCE",
            Policy::Clock => "CLOCK",
        };
        write!(f, "{}", name)
    }
}

impl TryFrom<u8> for Policy {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self> {
        Policy::ALL
            .into_iter()
            .find(|p| p.id() == id)
            .ok_or_else(|| config_err!("invalid algorithm choice: {}", id))
    }
}

impl FromStr for Policy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(id) = s.parse::<u8>() {
            return Policy::try_from(id);
        }
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "fifo" => Ok(Policy::Fifo),
            "lru" => Ok(Policy::Lru),
            "min" | "opt" | "optimal" => Ok(Policy::Optimal),
            "second-chance" | "sc" => Ok(Policy::SecondChance),
            "clock" => Ok(Policy::Clock),
            _ => Err(config_err!("invalid algorithm choice: {}", s)),
        }
    }
}

impl TryFrom<String> for Policy {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Supported physical memory sizes, named after the width of a physical address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u32")]
pub enum MemorySize {
    /// 1 MiB, 256 frames.
    Bits20,
    /// 16 MiB, 4096 frames.
    Bits24,
}

impl MemorySize {
    pub fn bits(&self) -> u32 {
        match self {
            MemorySize::Bits20 => 20,
            MemorySize::Bits24 => 24,
        }
    }

    pub fn bytes(&self) -> u64 {
        1 << self.bits()
    }

    pub fn frames(&self) -> usize {
        (self.bytes() / PAGE_SIZE) as usize
    }
}

impl TryFrom<u32> for MemorySize {
    type Error = Error;

    fn try_from(bits: u32) -> Result<Self> {
        match bits {
            20 => Ok(MemorySize::Bits20),
            24 => Ok(MemorySize::Bits24),
            _ => Err(config_err!("invalid physical address bits {} (must be 20 or 24)", bits)),
        }
    }
}
