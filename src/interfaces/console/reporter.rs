use crate::application::reconciler::ReconcileReport;
use crate::domain::address::Address;
use crate::domain::amount::Balance;
use crate::domain::feature::PremiumFeature;
use crate::domain::outcome::{PaymentOutcome, PaymentProgress};
use crate::error::Result;
use std::io::Write;

/// Renders command results for a terminal.
///
/// Human-readable lines for listings and progress; outcomes and reports are
/// one JSON document each so they can be piped into other tools.
pub struct ConsoleReporter<W: Write> {
    writer: W,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_features(&mut self, features: &[PremiumFeature]) -> Result<()> {
        for feature in features {
            writeln!(
                self.writer,
                "{:<20} {:>6} USDC  {}: {}",
                feature.id, feature.price, feature.name, feature.description
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_balance(&mut self, address: &Address, balance: Balance) -> Result<()> {
        writeln!(self.writer, "{} {} USDC", address, balance)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_progress(&mut self, event: &PaymentProgress) -> Result<()> {
        writeln!(self.writer, "{}", event)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_outcome(&mut self, outcome: &PaymentOutcome) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, outcome)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_report(&mut self, report: &ReconcileReport) -> Result<()> {
        serde_json::to_writer(&mut self.writer, report)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
