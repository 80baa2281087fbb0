//! Memory access traces.
//!
//! A [`Trace`] is built once, either parsed from a text file, sampled from
//! the mappings of a live process or assembled in code, and is read-only
//! afterwards. Every simulation pass borrows it from the start.

use std::fmt::{Display, Formatter};
use std::io::BufRead;
use std::ops::Index;

use log::debug;
use rand::Rng;
use regex::Regex;

use crate::error::Result;
use crate::memory::replacer::Lookahead;
use crate::memory::{PageNumber, PAGE_SIZE};
use crate::{internal_err, value_err};

/// Upper bound of distinct pages sampled from a process's mappings.
pub const MAX_SAMPLED_PAGES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Load,
    Store,
}

impl Display for AccessKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessKind::Load => write!(f, "l"),
            AccessKind::Store => write!(f, "s"),
        }
    }
}

/// A single memory access, already reduced to its page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Access {
    pub kind: AccessKind,
    pub page: PageNumber,
}

impl Access {
    pub fn load(page: PageNumber) -> Self {
        Access { kind: AccessKind::Load, page }
    }

    pub fn store(page: PageNumber) -> Self {
        Access { kind: AccessKind::Store, page }
    }

    pub fn from_address(kind: AccessKind, address: u64) -> Self {
        Access { kind, page: address / PAGE_SIZE }
    }
}

/// An ordered, replayable sequence of memory accesses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    accesses: Vec<Access>,
}

impl Trace {
    pub fn new(accesses: Vec<Access>) -> Self {
        Trace { accesses }
    }

    /// A trace of loads of the given pages.
    pub fn from_pages(pages: impl IntoIterator<Item = PageNumber>) -> Self {
        pages.into_iter().map(Access::load).collect()
    }

    /// Parse a text trace, one `<op> <address>` access per line. `op` is `l`
    /// for a load or `s` for a store, the address is decimal or `0x` prefixed
    /// hex. Blank lines and lines starting with `#` are skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut accesses = vec![];
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let access = parse_line(line).map_err(|err| value_err!("line {}: {}", i + 1, err))?;
            accesses.push(access);
        }
        debug!("parsed {} accesses", accesses.len());
        Ok(Trace { accesses })
    }

    pub fn len(&self) -> usize {
        self.accesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accesses.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Access> {
        self.accesses.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Access> + '_ {
        self.accesses.iter()
    }

    pub fn pages(&self) -> impl Iterator<Item = PageNumber> + '_ {
        self.accesses.iter().map(|a| a.page)
    }
}

impl Index<usize> for Trace {
    type Output = Access;

    fn index(&self, index: usize) -> &Self::Output {
        &self.accesses[index]
    }
}

impl FromIterator<Access> for Trace {
    fn from_iter<T: IntoIterator<Item = Access>>(iter: T) -> Self {
        Trace { accesses: iter.into_iter().collect() }
    }
}

impl Lookahead for Trace {
    fn next_use(&self, page: PageNumber, from: usize) -> Option<usize> {
        self.accesses.iter().skip(from).position(|a| a.page == page).map(|i| i + from)
    }
}

fn parse_line(line: &str) -> Result<Access> {
    let mut parts = line.split_whitespace();
    let (Some(op), Some(address), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(value_err!("expected `<op> <address>`, got `{}`", line));
    };
    let kind = match op {
        "l" | "L" => AccessKind::Load,
        "s" | "S" => AccessKind::Store,
        _ => return Err(value_err!("unknown operation `{}`", op)),
    };
    let address = match address.strip_prefix("0x").or_else(|| address.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16)?,
        None => address.parse::<u64>()?,
    };
    Ok(Access::from_address(kind, address))
}

/// Sample a synthetic trace from the memory mappings of a process, in the
/// format of `/proc/<pid>/maps`.
///
/// Every page of a mapping is loaded once followed by 2 to 4 repeated loads,
/// then the first page of the mapping is stored to with 2 to 4 repeats.
/// Sampling stops adding pages once [`MAX_SAMPLED_PAGES`] distinct pages were
/// visited.
pub fn sample_maps<R: BufRead, G: Rng>(reader: R, rng: &mut G) -> Result<Trace> {
    let pattern = Regex::new(r"^([0-9a-fA-F]+)-([0-9a-fA-F]+)\s+(\S{4})")
        .map_err(|err| internal_err!("{}", err))?;
    let mut accesses = vec![];
    let mut sampled = 0;
    for line in reader.lines() {
        let line = line?;
        let Some(caps) = pattern.captures(&line) else {
            continue;
        };
        let start = u64::from_str_radix(&caps[1], 16)?;
        let end = u64::from_str_radix(&caps[2], 16)?;

        let mut address = start;
        while address < end && sampled < MAX_SAMPLED_PAGES {
            let repeats = rng.gen_range(2..=4);
            for _ in 0..=repeats {
                accesses.push(Access::from_address(AccessKind::Load, address));
            }
            sampled += 1;
            address += PAGE_SIZE;
        }

        let repeats = rng.gen_range(2..=4);
        for _ in 0..=repeats {
            accesses.push(Access::from_address(AccessKind::Store, start));
        }
    }
    debug!("sampled {} accesses over {} pages", accesses.len(), sampled);
    Ok(Trace { accesses })
}
