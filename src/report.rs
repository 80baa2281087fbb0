//! Output for external consumers: plot data files and per-step records.

use std::io::Write;

use crate::engine::{Outcome, Step};
use crate::error::Result;
use crate::trace::Trace;

/// Write the access trace as `<step> <page>` lines, ready to be plotted as
/// page number over time.
pub fn write_plot<W: Write>(trace: &Trace, w: &mut W) -> Result<()> {
    for (i, page) in trace.pages().enumerate() {
        writeln!(w, "{} {}", i, page)?;
    }
    Ok(())
}

/// Write per-step results as `<step> <page> <hit> <frame>` lines, `hit` is 1
/// for a hit and 0 for a miss.
pub fn write_steps<'s, W, I>(steps: I, w: &mut W) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'s Step>,
{
    for step in steps {
        let hit = match step.outcome {
            Outcome::Hit => 1,
            Outcome::Miss => 0,
        };
        writeln!(w, "{} {} {} {}", step.index, step.page, hit, step.frame)?;
    }
    Ok(())
}
