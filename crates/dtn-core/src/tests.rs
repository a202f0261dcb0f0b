//! Unit tests for dtn-core primitives.

#[cfg(test)]
mod ids {
    use crate::{ConnectionId, HostAddress, InterfaceId};

    #[test]
    fn index_roundtrip() {
        let id = InterfaceId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(InterfaceId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(HostAddress(0) < HostAddress(1));
        assert!(ConnectionId(100) > ConnectionId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(HostAddress::INVALID.0, u32::MAX);
        assert_eq!(InterfaceId::INVALID.0, u32::MAX);
        assert_eq!(ConnectionId::INVALID.0, u32::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(HostAddress(7).to_string(), "HostAddress(7)");
    }
}

#[cfg(test)]
mod coord {
    use crate::Coord;

    #[test]
    fn zero_distance() {
        let p = Coord::new(12.5, -3.0);
        assert_eq!(p.distance(p), 0.0);
    }

    #[test]
    fn pythagorean_distance() {
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.distance(a), 5.0);
    }

    #[test]
    fn translated() {
        let p = Coord::new(1.0, 2.0).translated(-1.0, 3.0);
        assert_eq!(p, Coord::new(0.0, 5.0));
    }
}

#[cfg(test)]
mod time {
    use crate::SimClock;

    #[test]
    fn set_then_advance() {
        let mut clock = SimClock::new();
        clock.set_time(10.0);
        clock.advance(2.5);
        assert_eq!(clock.time(), 12.5);
    }

    #[test]
    fn int_time_floors() {
        let mut clock = SimClock::new();
        clock.set_time(3.9);
        assert_eq!(clock.int_time(), 3);
        clock.set_time(-0.5);
        assert_eq!(clock.int_time(), -1);
    }

    #[test]
    fn starts_at_zero() {
        assert_eq!(SimClock::new().time(), 0.0);
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = SimRng::new(12345);
        let mut r2 = SimRng::new(12345);
        for _ in 0..100 {
            let a: f64 = r1.gen_range(0.0..1.0);
            let b: f64 = r2.gen_range(0.0..1.0);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn shuffle_reproduces_for_same_time_seed() {
        let mut v1: Vec<u32> = (0..50).collect();
        let mut v2: Vec<u32> = (0..50).collect();
        SimRng::for_int_time(17).shuffle(&mut v1);
        SimRng::for_int_time(17).shuffle(&mut v2);
        assert_eq!(v1, v2);
    }

    #[test]
    fn different_time_seeds_differ() {
        let mut v1: Vec<u32> = (0..50).collect();
        let mut v2: Vec<u32> = (0..50).collect();
        SimRng::for_int_time(1).shuffle(&mut v1);
        SimRng::for_int_time(2).shuffle(&mut v2);
        assert_ne!(v1, v2);
    }

    #[test]
    fn gen_range_in_bounds() {
        let mut rng = SimRng::new(0);
        for _ in 0..1000 {
            let v: f64 = rng.gen_range(0.0..5.0);
            assert!((0.0..5.0).contains(&v));
        }
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = SimRng::new(0);
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
    }
}

#[cfg(test)]
mod bus {
    use crate::bus::{ENERGY_VALUE_ID, RANGE_ID};
    use crate::{BusValue, InterfaceId, ModuleCommunicationBus, SimError};

    #[test]
    fn add_property_once() {
        let mut bus = ModuleCommunicationBus::new();
        bus.add_property(RANGE_ID, BusValue::Double(10.0)).unwrap();
        assert!(bus.contains_property(RANGE_ID));
        let err = bus.add_property(RANGE_ID, BusValue::Double(20.0)).unwrap_err();
        assert!(matches!(err, SimError::DuplicateBusProperty(_)));
    }

    #[test]
    fn get_double_with_default() {
        let mut bus = ModuleCommunicationBus::new();
        assert_eq!(bus.get_double(ENERGY_VALUE_ID, 1.0), 1.0);
        bus.add_property(ENERGY_VALUE_ID, BusValue::Double(0.25)).unwrap();
        assert_eq!(bus.get_double(ENERGY_VALUE_ID, 1.0), 0.25);
        // wrong type falls back to the default as well
        let _ = bus.update_property(ENERGY_VALUE_ID, BusValue::Bool(true));
        assert_eq!(bus.get_double(ENERGY_VALUE_ID, 1.0), 1.0);
    }

    #[test]
    fn update_returns_subscribers() {
        let mut bus = ModuleCommunicationBus::new();
        bus.add_property(RANGE_ID, BusValue::Double(10.0)).unwrap();
        bus.subscribe(RANGE_ID, InterfaceId(3));
        bus.subscribe(RANGE_ID, InterfaceId(8));

        let notified = bus.update_property(RANGE_ID, BusValue::Double(0.0));
        assert_eq!(notified, vec![InterfaceId(3), InterfaceId(8)]);
        assert_eq!(bus.get(RANGE_ID), Some(BusValue::Double(0.0)));
    }

    #[test]
    fn subscribe_before_add_still_notified() {
        let mut bus = ModuleCommunicationBus::new();
        bus.subscribe(RANGE_ID, InterfaceId(1));
        let notified = bus.update_property(RANGE_ID, BusValue::Double(5.0));
        assert_eq!(notified, vec![InterfaceId(1)]);
    }
}

#[cfg(test)]
mod settings {
    use crate::{InterfaceSettings, SettingsError, WorldConfig};

    #[test]
    fn default_world_config_is_valid() {
        assert!(WorldConfig::default().validate().is_ok());
    }

    #[test]
    fn non_positive_interval_rejected() {
        let cfg = WorldConfig {
            update_interval: 0.0,
            ..WorldConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SettingsError::NonPositiveValue { setting: "updateInterval", .. })
        ));
    }

    #[test]
    fn negative_range_rejected() {
        let s = InterfaceSettings::new("T", -1.0, 100);
        assert!(matches!(
            s.validate(),
            Err(SettingsError::NegativeValue { setting: "transmitRange", .. })
        ));
    }

    #[test]
    fn negative_speed_rejected() {
        let s = InterfaceSettings::new("T", 10.0, -5);
        assert!(matches!(
            s.validate(),
            Err(SettingsError::NegativeValue { setting: "transmitSpeed", .. })
        ));
    }

    #[test]
    fn inverted_active_period_rejected() {
        let mut s = InterfaceSettings::new("T", 10.0, 100);
        s.active_periods = Some(vec![(20.0, 10.0)]);
        assert!(matches!(
            s.validate(),
            Err(SettingsError::InvalidActivePeriod { .. })
        ));
    }

    #[test]
    fn zero_range_is_allowed() {
        assert!(InterfaceSettings::new("T", 0.0, 0).validate().is_ok());
    }
}
