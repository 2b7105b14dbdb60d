use ising_scan::config::{ConfigError, ConvergenceOpts, ScanConfig};

#[test]
fn test_default_configuration_is_valid() {
    assert_eq!(ScanConfig::default().validate(), Ok(()));
}

#[test]
fn test_invalid_fields_are_named() {
    let base = ScanConfig::default;

    let cfg = ScanConfig {
        lattice_size: 0,
        ..base()
    };
    assert_eq!(cfg.validate(), Err(ConfigError::LatticeSize(0)));

    let cfg = ScanConfig {
        couplings: vec![],
        ..base()
    };
    assert_eq!(cfg.validate(), Err(ConfigError::EmptyCouplings));

    let cfg = ScanConfig {
        fields: vec![],
        ..base()
    };
    assert_eq!(cfg.validate(), Err(ConfigError::EmptyFields));

    let cfg = ScanConfig {
        n_temps: 0,
        ..base()
    };
    assert_eq!(cfg.validate(), Err(ConfigError::TemperatureCount(0)));

    let cfg = ScanConfig {
        t_min: 3.0,
        t_max: 1.0,
        ..base()
    };
    assert_eq!(
        cfg.validate(),
        Err(ConfigError::TemperatureRange { min: 3.0, max: 1.0 })
    );

    let cfg = ScanConfig {
        t_min: -0.5,
        ..base()
    };
    assert_eq!(cfg.validate(), Err(ConfigError::NegativeTemperature(-0.5)));

    let cfg = ScanConfig {
        couplings: vec![f64::NAN],
        ..base()
    };
    assert_eq!(
        cfg.validate(),
        Err(ConfigError::NonFinite { name: "couplings" })
    );

    let cfg = ScanConfig {
        convergence: ConvergenceOpts {
            tail_fraction: 0.0,
            ..ConvergenceOpts::default()
        },
        ..base()
    };
    assert_eq!(cfg.validate(), Err(ConfigError::TailFraction(0.0)));
}

#[test]
fn test_error_messages_name_the_field() {
    let msg = ConfigError::LatticeSize(0).to_string();
    assert!(msg.contains("lattice_size"));

    let msg = ConfigError::TemperatureRange { min: 2.0, max: 1.0 }.to_string();
    assert!(msg.contains("min 2"));
    assert!(msg.contains("max 1"));
}

#[test]
fn test_temperature_grid_is_ascending_and_inclusive() {
    let cfg = ScanConfig {
        t_min: 0.5,
        t_max: 4.0,
        n_temps: 10,
        ..ScanConfig::default()
    };
    let grid = cfg.temperature_grid();

    assert_eq!(grid.len(), 10);
    assert_eq!(grid[0], 0.5);
    assert!((grid[9] - 4.0).abs() < 1e-12);
    for pair in grid.windows(2) {
        assert!(pair[0] < pair[1]);
    }

    // Even spacing.
    let step = grid[1] - grid[0];
    for pair in grid.windows(2) {
        assert!((pair[1] - pair[0] - step).abs() < 1e-12);
    }
}

#[test]
fn test_single_point_grid_sits_at_the_minimum() {
    let cfg = ScanConfig {
        t_min: 1.25,
        t_max: 2.0,
        n_temps: 1,
        ..ScanConfig::default()
    };
    assert_eq!(cfg.temperature_grid(), vec![1.25]);
}
