use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Multi,
    Single,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseReport {
    pub kind: PhaseKind,
    /// HTTP calls issued.
    pub calls: usize,
    /// Words sent across all calls.
    pub entries: usize,
    pub elapsed: Duration,
}

impl PhaseReport {
    pub fn total_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    /// Per request for the multi phase, per entry for the single phase.
    pub fn average_ms(&self) -> f64 {
        let divisor = match self.kind {
            PhaseKind::Multi => self.calls,
            PhaseKind::Single => self.entries,
        };
        if divisor == 0 { 0.0 } else { self.total_ms() / divisor as f64 }
    }
}

impl fmt::Display for PhaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PhaseKind::Multi => {
                writeln!(f, "Multi request")?;
                writeln!(f, "time per request: {:.4} ms", self.average_ms())?;
            }
            PhaseKind::Single => {
                writeln!(f, "Single request")?;
                writeln!(f, "time per entry: {:.4} ms", self.average_ms())?;
            }
        }
        write!(f, "total time: {:.4} ms", self.total_ms())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchSummary {
    pub phases: Vec<PhaseReport>,
}

impl BenchSummary {
    pub fn phase(&self, kind: PhaseKind) -> Option<&PhaseReport> {
        self.phases.iter().find(|p| p.kind == kind)
    }
}

impl fmt::Display for BenchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for phase in &self.phases {
            writeln!(f, "{}", phase)?;
        }
        Ok(())
    }
}
