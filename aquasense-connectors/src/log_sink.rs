//! Sink that writes reading sets to the log
//!
//! Used on the bench and on stations whose only uplink is a serial console.
//! Each set becomes one JSON line so the output can be grepped or piped
//! into a collector.

use aquasense_core::{Ack, ReadingSet, SinkError, TelemetrySink};

use crate::{ConnectionStats, ConnectorError};

/// Log-backed telemetry sink
#[derive(Debug, Clone)]
pub struct LogSink {
    station: String,
    stats: ConnectionStats,
}

impl LogSink {
    /// Sink tagging every line with `station`
    pub fn new(station: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            stats: ConnectionStats::default(),
        }
    }

    /// Station tag
    pub fn station(&self) -> &str {
        &self.station
    }

    /// Get connection statistics
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    /// Render a set as the logged JSON line
    pub fn render(&self, readings: &ReadingSet) -> Result<String, ConnectorError> {
        serde_json::to_string(readings).map_err(|e| ConnectorError::Serialization(e.to_string()))
    }
}

impl TelemetrySink for LogSink {
    fn publish(&mut self, readings: ReadingSet) -> Result<Ack, SinkError> {
        match self.render(&readings) {
            Ok(line) => {
                log::info!("[{}] cycle {}: {}", self.station, readings.cycle(), line);
                self.stats.record_sent(line.len());
                Ok(Ack)
            }
            Err(err) => {
                log::warn!("[{}] cycle {} not logged: {}", self.station, readings.cycle(), err);
                self.stats.record_failure(&err);
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquasense_core::{derived::DerivedQuantities, CalibrationProfile, PhysicalReading, QuantityKind};

    fn healthy_set() -> ReadingSet {
        let readings = [
            PhysicalReading::measured(QuantityKind::Ph, 7.5),
            PhysicalReading::measured(QuantityKind::Tds, 500.0),
            PhysicalReading::measured(QuantityKind::Turbidity, 30.0),
            PhysicalReading::measured(QuantityKind::Distance, 50.0),
        ];
        let derived = DerivedQuantities::compute(&readings, &CalibrationProfile::REFERENCE_PROBE);
        ReadingSet::assemble(3, 9_000, readings, derived)
    }

    #[test]
    fn publish_counts_bytes() {
        let mut sink = LogSink::new("pond-a");
        let set = healthy_set();
        let line = sink.render(&set).unwrap();

        assert_eq!(sink.publish(set), Ok(Ack));
        assert_eq!(sink.stats().messages_sent, 1);
        assert_eq!(sink.stats().bytes_sent, line.len() as u64);
        assert_eq!(sink.stats().messages_failed, 0);
    }

    #[test]
    fn rendered_line_carries_cycle_and_values() {
        let sink = LogSink::new("pond-a");
        let json: serde_json::Value = serde_json::from_str(&sink.render(&healthy_set()).unwrap()).unwrap();

        assert_eq!(json["cycle"], 3);
        assert_eq!(json["timestamp"], 9_000);
        assert_eq!(json["sendable"], true);
        assert_eq!(json["ph"]["value"], 7.5);
    }
}
