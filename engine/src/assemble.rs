//! Record assembly – turns a resolved measurement into a complete,
//! immutable `TreeRecord` with both metric sets attached.

use kanopi_common::tree::{Measurement, TreeRecord};

use crate::carbon::compute_carbon;
use crate::services::compute_ecosystem_services;

/// Identifier source for new records.
///
/// Uniqueness within a session is the only contract; injected so tests
/// get deterministic ids instead of wall-clock-derived ones.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Timestamp source for new records.
pub trait Clock {
    /// ISO-8601 timestamp in the local timezone.
    fn now(&self) -> String;
}

/// Session-scoped monotonic id generator (`tree-0001`, `tree-0002`, …).
#[derive(Debug, Default)]
pub struct SessionIds {
    counter: u64,
}

impl SessionIds {
    /// Resume numbering past `count` existing records so a reloaded
    /// session never reissues an id already on disk.
    pub fn resuming_from(count: u64) -> SessionIds {
        SessionIds { counter: count }
    }
}

impl IdGenerator for SessionIds {
    fn next_id(&mut self) -> String {
        self.counter += 1;
        format!("tree-{:04}", self.counter)
    }
}

/// Wall-clock `Clock` backed by chrono.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        chrono::Local::now().to_rfc3339()
    }
}

/// Assemble a complete record from a measurement.
///
/// Runs the carbon model on (dbh, height) and the ecosystem service model
/// on (dbh, proximity); measurement fields are copied verbatim. The caller
/// owns the prepend into the inventory.
pub fn assemble(
    measurement: Measurement,
    ids: &mut dyn IdGenerator,
    clock: &dyn Clock,
) -> TreeRecord {
    let carbon = compute_carbon(measurement.dbh_cm, measurement.height_m);
    let services = compute_ecosystem_services(measurement.dbh_cm, measurement.proximity);

    TreeRecord {
        id: ids.next_id(),
        recorded_at: clock.now(),
        measurement,
        carbon,
        services,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanopi_common::tree::{Condition, Proximity};

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> String {
            "2025-03-01T09:00:00+07:00".into()
        }
    }

    fn measurement() -> Measurement {
        Measurement {
            species: "Jati".into(),
            dbh_cm: 50.0,
            height_m: 25.0,
            proximity: Proximity::Near,
            condition: Condition::Healthy,
            latitude: -6.2,
            longitude: 106.8,
            notes: "roadside".into(),
            photo: None,
        }
    }

    #[test]
    fn test_ids_are_unique_and_monotonic() {
        let mut ids = SessionIds::default();
        let a = assemble(measurement(), &mut ids, &FixedClock);
        let b = assemble(measurement(), &mut ids, &FixedClock);
        assert_eq!(a.id, "tree-0001");
        assert_eq!(b.id, "tree-0002");
    }

    #[test]
    fn test_resumed_session_continues_numbering() {
        let mut ids = SessionIds::resuming_from(41);
        assert_eq!(ids.next_id(), "tree-0042");
    }

    #[test]
    fn test_metrics_attached_and_fields_copied() {
        let mut ids = SessionIds::default();
        let record = assemble(measurement(), &mut ids, &FixedClock);
        assert_eq!(record.measurement.species, "Jati");
        assert_eq!(record.measurement.notes, "roadside");
        assert_eq!(record.recorded_at, "2025-03-01T09:00:00+07:00");
        assert!(record.carbon.biomass_kg > 0.0);
        // Near a building at dbh 50: fixed energy figure.
        assert_eq!(record.services.energy_savings_idr, 360_000.0);
    }

    #[test]
    fn test_degenerate_measurement_yields_zero_metrics() {
        let mut ids = SessionIds::default();
        let mut m = measurement();
        m.dbh_cm = 0.0;
        let record = assemble(m, &mut ids, &FixedClock);
        assert_eq!(record.carbon.biomass_kg, 0.0);
        assert_eq!(record.services.annual_value.total_idr, 0.0);
    }
}
