use nrss_lib::{
    encode_rle, Config, Error, Lattice, Ledger, Noise, Odometer, PatternCache, PhaseTable,
    Placement, Repeat, Snapshot, SoupBuilder, Speed, Status, Step, TransitionTable, Trial,
};
use std::{collections::HashSet, fs};
use tempfile::tempdir;

const LIFE: &str = "B3/S23";

/// A lightweight spaceship, period 4, two cells west per period.
const LWSS: &str = "x = 5, y = 4, rule = B3/S23\nbo2bo$o$o3bo$4o!";

/// A glider, period 4, one cell down-right per period.
const GLIDER: &str = "x = 3, y = 3, rule = B3/S23\nbob$2bo$3o!";

const BLINKER: &str = "x = 3, y = 1, rule = B3/S23\n3o!";

fn life() -> Result<TransitionTable, Error> {
    TransitionTable::parse_rule(LIFE)
}

#[test]
fn still_life_is_stable() -> Result<(), Box<dyn std::error::Error>> {
    let table = life()?;
    let mut lattice = Lattice::new(8, 8);
    for (row, col) in [(20, 20), (20, 21), (21, 20), (21, 21)] {
        lattice.set_alive(row, col);
    }
    let bbox = lattice.bbox().unwrap();
    for _ in 0..64 {
        assert_eq!(lattice.step(&table), Step::Live);
        assert_eq!(lattice.bbox(), Some(bbox));
    }
    for (row, col) in [(20, 20), (20, 21), (21, 20), (21, 21)] {
        assert!(lattice.is_alive(row, col));
    }
    Ok(())
}

#[test]
fn bounding_box_stays_tight() -> Result<(), Box<dyn std::error::Error>> {
    let table = life()?;
    let mut lattice = Lattice::new(8, 8);
    // An r-pentomino, which churns for a long time.
    for (row, col) in [(128, 129), (128, 130), (129, 128), (129, 129), (130, 129)] {
        lattice.set_alive(row, col);
    }
    for _ in 0..50 {
        assert_eq!(lattice.step(&table), Step::Live);
        let bbox = lattice.bbox().unwrap();
        let (mut top, mut bottom, mut left, mut right) = (false, false, false, false);
        for row in 0..lattice.height() {
            for col in 0..lattice.width() {
                if lattice.is_alive(row, col) {
                    assert!(row >= bbox.top && row <= bbox.bottom);
                    assert!(col >= bbox.left && col <= bbox.right);
                    top |= row == bbox.top;
                    bottom |= row == bbox.bottom;
                    left |= col == bbox.left;
                    right |= col == bbox.right;
                }
            }
        }
        assert!(top && bottom && left && right);
    }
    Ok(())
}

#[test]
fn lone_cell_goes_extinct() -> Result<(), Box<dyn std::error::Error>> {
    let table = life()?;
    let mut lattice = Lattice::new(6, 6);
    lattice.set_alive(30, 30);
    assert_eq!(lattice.step(&table), Step::Extinct);
    assert_eq!(lattice.bbox(), None);
    Ok(())
}

#[test]
fn engine_phase_cycle_closes() -> Result<(), Box<dyn std::error::Error>> {
    let table = life()?;
    let mut lattice = Lattice::new(8, 8);
    let phases = PhaseTable::generate(BLINKER, 5, &table, &mut lattice)?;
    assert_eq!(phases.len(), 5);
    // The blinker has period 2: phase 2 must be bit-identical to phase 0.
    assert_eq!(phases[0], phases[2]);
    assert_eq!(phases[1], phases[3]);
    assert_eq!(phases[0].height(), 1);
    assert_eq!(phases[0].width(), 3);
    assert_eq!(phases[1].height(), 3);
    assert_eq!(phases[1].width(), 1);
    assert!((0..3).all(|row| phases[1].is_alive(row, 0)));
    // The lattice is handed back empty.
    assert_eq!(lattice.bbox(), None);
    Ok(())
}

#[test]
fn detector_reports_true_period_and_displacement() -> Result<(), Box<dyn std::error::Error>> {
    let table = life()?;
    let mut lattice = Lattice::new(8, 8);
    let phases = PhaseTable::generate(LWSS, 1, &table, &mut lattice)?;
    for (row, col) in phases[0].live_cells() {
        lattice.set_alive(128 + row, 128 + col);
    }
    let mut cache = PatternCache::new(1);
    let mut found = None;
    for generation in 1..=12 {
        assert_eq!(lattice.step(&table), Step::Live);
        if let Some(repeat) = cache.observe(&lattice, generation) {
            found = Some((generation, repeat));
            break;
        }
    }
    // The first cached snapshot is generation 1, so the earliest possible
    // exact repeat of an LWSS is generation 5.
    assert_eq!(
        found,
        Some((5, Repeat::Spaceship(Speed { dx: 2, period: 4 })))
    );
    assert_eq!(cache.len(), 5);
    cache.clear();
    assert!(cache.is_empty());
    Ok(())
}

#[test]
fn snapshot_records_prefilter_data() {
    let mut lattice = Lattice::new(6, 6);
    for (row, col) in [(10, 10), (10, 11), (11, 10), (11, 11)] {
        lattice.set_alive(row, col);
    }
    let block = Snapshot::capture(&lattice).unwrap();
    assert_eq!((block.top(), block.left()), (10, 10));
    assert_eq!((block.height(), block.width()), (2, 2));
    assert_eq!(block.population(), 4);

    // The same content elsewhere hashes identically, so a translated
    // repeat passes the pre-filter.
    lattice.clear();
    for (row, col) in [(10, 14), (10, 15), (11, 14), (11, 15)] {
        lattice.set_alive(row, col);
    }
    let moved = Snapshot::capture(&lattice).unwrap();
    assert_eq!(block.hash(), moved.hash());

    lattice.clear();
    assert!(Snapshot::capture(&lattice).is_none());
}

#[test]
fn config_rejects_inconsistent_parameters() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("state");

    let config = Config::new(2, 4, 64, false).set_gap_range(9, 3);
    assert!(matches!(config.search(&path), Err(Error::ConfigError(_))));

    let config = Config::new(2, 4, 64, false).set_phase_count(0);
    assert!(matches!(config.search(&path), Err(Error::ConfigError(_))));

    // 40 engine copies at gaps of at least 7 rows cannot fit a 64-row
    // lattice.
    let config = Config::new(40, 4, 64, false)
        .set_rule_string(LIFE.to_string())
        .set_engine_rle(BLINKER.to_string())
        .set_phase_count(4)
        .set_lattice_size(6, 6);
    assert!(matches!(config.search(&path), Err(Error::ConfigError(_))));
    Ok(())
}

#[test]
fn detector_respects_check_interval() -> Result<(), Box<dyn std::error::Error>> {
    let table = life()?;
    let mut lattice = Lattice::new(8, 8);
    for col in [128, 129, 130] {
        lattice.set_alive(128, col);
    }
    let mut cache = PatternCache::new(2);
    let mut found = None;
    for generation in 1..=8 {
        assert_eq!(lattice.step(&table), Step::Live);
        if generation % 2 == 1 {
            assert_eq!(cache.observe(&lattice, generation), None);
            continue;
        }
        if let Some(repeat) = cache.observe(&lattice, generation) {
            found = Some((generation, repeat));
            break;
        }
    }
    // Snapshots at generations 2 and 4 are both horizontal blinker phases:
    // one snapshot interval apart, so the reported period is 2.
    assert_eq!(found, Some((4, Repeat::Oscillator { period: 2 })));
    Ok(())
}

#[test]
fn speed_reduction() {
    let speed = Speed { dx: 10, period: 20 };
    assert_eq!(speed.reduced(), Speed { dx: 1, period: 2 });
    assert_eq!(speed.to_string(), "10c/20");
    assert_eq!("10c/20".parse::<Speed>().unwrap(), speed);
    let oscillator = Speed { dx: 0, period: 6 };
    assert_eq!(oscillator.reduced(), oscillator);
    assert!("10/20".parse::<Speed>().is_err());
}

#[test]
fn uniform_is_bounded_and_zero_range_is_zero() {
    let mut noise = Noise::from_seed(1);
    assert_eq!(noise.uniform(0), 0);
    let mut seen = HashSet::new();
    for _ in 0..1000 {
        let draw = noise.uniform(6);
        assert!(draw < 6);
        seen.insert(draw);
    }
    assert_eq!(seen.len(), 6);
}

#[test]
fn odometer_visits_every_combination_once() {
    let mut odometer = Odometer::new(1, 3, 3, 2);
    assert_eq!(odometer.total(), 18);
    let mut seen = HashSet::new();
    while let Some(digits) = odometer.next() {
        assert!(seen.insert(digits.to_vec()));
    }
    assert_eq!(seen.len(), 18);
    assert!(odometer.next().is_none());

    let mut odometer = Odometer::new(2, 3, 2, 2);
    assert_eq!(odometer.total(), 144);
    let mut seen = HashSet::new();
    while let Some(digits) = odometer.next() {
        assert!(seen.insert(digits.to_vec()));
    }
    assert_eq!(seen.len(), 144);

    // No free slots: exactly one (empty) configuration.
    let mut odometer = Odometer::new(0, 5, 5, 5);
    assert_eq!(odometer.total(), 1);
    assert_eq!(odometer.next().map(|digits| digits.len()), Some(0));
    assert!(odometer.next().is_none());
}

#[test]
fn ledger_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("state");

    let mut lattice = Lattice::new(6, 6);
    for (row, col) in [(20, 20), (20, 21), (21, 20), (21, 21)] {
        lattice.set_alive(row, col);
    }
    let block = encode_rle(&lattice, LIFE).unwrap();

    let mut ledger = Ledger::load(&path)?;
    assert_eq!(ledger.count(), 0);
    assert!(ledger.record(Speed { dx: 2, period: 7 }, format!("#C 2c/7\n{}", block))?);
    assert!(ledger.record(Speed { dx: 1, period: 4 }, format!("#C 1c/4\n{}", block))?);
    assert!(!ledger.record(Speed { dx: 2, period: 7 }, String::new())?);
    assert_eq!(ledger.count(), 2);

    let reloaded = Ledger::load(&path)?;
    let speeds: HashSet<Speed> = reloaded.speeds().iter().copied().collect();
    assert_eq!(
        speeds,
        HashSet::from([Speed { dx: 2, period: 7 }, Speed { dx: 1, period: 4 }])
    );
    assert!(reloaded.pattern().contains("x = 2, y = 2"));

    let text = fs::read_to_string(&path)?;
    assert!(text.starts_with("2 NRSS\n"));
    Ok(())
}

#[test]
fn malformed_ledger_fails_closed() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    let path = dir.path().join("truncated");
    fs::write(&path, "1 NRSS\n")?;
    assert!(matches!(Ledger::load(&path), Err(Error::LedgerError(_))));

    let path = dir.path().join("miscounted");
    fs::write(&path, "2 NRSS\n1c/4\nx = 1, y = 1, rule = B3/S23\no!\n")?;
    assert!(matches!(Ledger::load(&path), Err(Error::LedgerError(_))));

    let path = dir.path().join("bad-speeds");
    fs::write(&path, "1 NRSS\nnonsense\nx = 1, y = 1, rule = B3/S23\no!\n")?;
    assert!(matches!(Ledger::load(&path), Err(Error::LedgerError(_))));
    Ok(())
}

#[test]
fn lwss_search_finds_reduced_speed() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("state");
    let config = Config::new(1, 0, 64, false)
        .set_rule_string(LIFE.to_string())
        .set_engine_rle(LWSS.to_string())
        .set_phase_count(8)
        .set_lattice_size(8, 8);
    let mut search = config.search(&path)?;
    assert_eq!(search.total_soups(), Some(1));
    assert_eq!(search.search(None)?, Status::Exhausted);
    assert_eq!(search.soup_count(), 1);
    assert_eq!(search.ledger().speeds(), [Speed { dx: 1, period: 2 }]);
    assert!(search.ledger().pattern().starts_with("#C 1c/2\n"));

    let text = fs::read_to_string(&path)?;
    assert!(text.starts_with("1 NRSS\n1c/2\n"));
    Ok(())
}

#[test]
fn exhaustive_search_is_deterministic() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let config = Config::new(1, 0, 64, false)
        .set_rule_string(LIFE.to_string())
        .set_engine_rle(LWSS.to_string())
        .set_phase_count(8)
        .set_lattice_size(8, 8)
        .set_check_interval(2);
    let mut outputs = Vec::new();
    for name in ["first", "second"] {
        let path = dir.path().join(name);
        let mut search = config.search(&path)?;
        assert_eq!(search.search(None)?, Status::Exhausted);
        outputs.push(fs::read(&path)?);
    }
    assert_eq!(outputs[0], outputs[1]);
    Ok(())
}

#[test]
fn oscillators_are_skipped_or_recorded() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    let config = Config::new(1, 0, 64, false)
        .set_rule_string(LIFE.to_string())
        .set_engine_rle(BLINKER.to_string())
        .set_phase_count(4)
        .set_lattice_size(8, 8);
    let mut search = config.search(dir.path().join("skipped"))?;
    assert_eq!(
        search.run_soup()?,
        Some(Trial::Oscillator { period: 2 })
    );
    assert_eq!(search.ship_count(), 0);
    assert_eq!(search.run_soup()?, None);

    let config = config.set_skip_oscillators(false);
    let mut search = config.search(dir.path().join("kept"))?;
    assert_eq!(
        search.run_soup()?,
        Some(Trial::Oscillator { period: 2 })
    );
    assert_eq!(search.ledger().speeds(), [Speed { dx: 0, period: 2 }]);
    Ok(())
}

#[test]
fn diagonal_travel_escapes_instead_of_matching() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let config = Config::new(1, 0, 1024, false)
        .set_rule_string(LIFE.to_string())
        .set_engine_rle(GLIDER.to_string())
        .set_phase_count(8)
        .set_lattice_size(6, 6);
    let mut search = config.search(dir.path().join("state"))?;
    // A glider repeats its shape every 4 generations but always one row
    // lower, so the detector must never report it; the trial ends when the
    // glider reaches the margin.
    assert_eq!(search.run_soup()?, Some(Trial::Escaped));
    assert_eq!(search.ship_count(), 0);
    Ok(())
}

#[test]
fn soup_builder_anchors_first_engine() -> Result<(), Box<dyn std::error::Error>> {
    let table = life()?;
    let mut lattice = Lattice::new(8, 8);
    let phases = PhaseTable::generate(BLINKER, 2, &table, &mut lattice)?;
    let mut builder = SoupBuilder::exhaustive(2, 1, 7, 8, (64, 32), phases.len());
    assert_eq!(builder.total_soups(), Some(2 * 2 * 2));
    assert!(builder.next_soup(&phases, &mut lattice));
    let placements = builder.placements();
    assert_eq!(placements.len(), 2);
    assert_eq!(
        placements[0],
        Placement {
            row: 64,
            col: 32,
            phase: 0
        }
    );
    assert_eq!(placements[1].row, 64 + 7);
    // Phase 0 of the blinker is horizontal: three live cells per copy.
    let bbox = lattice.bbox().unwrap();
    let mut population = 0;
    for row in bbox.top..=bbox.bottom {
        for col in bbox.left..=bbox.right {
            population += usize::from(lattice.is_alive(row, col));
        }
    }
    assert_eq!(population, 6);
    lattice.clear();
    Ok(())
}
