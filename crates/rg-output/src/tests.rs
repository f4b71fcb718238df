//! Integration tests for rg-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::{CsvWriter, SNAPSHOT_HEADERS, SUMMARY_HEADERS};
    use crate::row::{TickSummaryRow, TrainSnapshotRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn snap_row(train_id: &str, tick: u64, edge: u32) -> TrainSnapshotRow {
        TrainSnapshotRow {
            tick,
            train_id:    train_id.to_owned(),
            kind:        "Express",
            status:      "EN_ROUTE",
            speed_kmh:   36.0,
            edge,
            from_node:   0,
            to_node:     1,
            progress_m:  125.5,
            destination: 4,
        }
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("train_snapshots.csv").exists());
        assert!(dir.path().join("tick_summaries.csv").exists());
    }

    #[test]
    fn missing_directory_is_created() {
        let dir = tmp();
        let nested = dir.path().join("run").join("1");
        let _w = CsvWriter::new(&nested).unwrap();
        assert!(nested.join("tick_summaries.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("train_snapshots.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, SNAPSHOT_HEADERS);

        let mut rdr2 = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let headers2: Vec<_> = rdr2.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers2, SUMMARY_HEADERS);
    }

    #[test]
    fn snapshot_rows_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row("Express_1", 5, 3), snap_row("Goods_1", 5, u32::MAX)]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("train_snapshots.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "5");
        assert_eq!(&rows[0][1], "Express_1");
        assert_eq!(&rows[0][4], "36.00");
        assert_eq!(&rows[0][5], "3");
        assert_eq!(&rows[0][8], "125.50");
        // Off-track trains leave the edge column empty.
        assert_eq!(&rows[1][5], "");
    }

    #[test]
    fn tick_summary_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&TickSummaryRow {
            tick:             3,
            unix_time_secs:   1_700_000_003,
            active_trains:    2,
            waiting_trains:   1,
            arrivals:         1,
            emergency_brakes: 0,
            safety_alerts:    0,
        })
        .unwrap();
        w.finish().unwrap();
        // Idempotent.
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "3");
        assert_eq!(&rows[0][1], "1700000003");
        assert_eq!(&rows[0][2], "2");
        assert_eq!(&rows[0][4], "1");
    }
}

#[cfg(test)]
mod observer_tests {
    use rg_core::{NodeId, Point, SimConfig, Tick, TrainKind};
    use rg_motion::TrainSpec;
    use rg_network::{NodeKind, TrackNetworkBuilder};
    use rg_sim::{SimBuilder, SimObserver, World};

    use crate::{CsvWriter, OutputError, OutputResult, OutputWriter, SimOutputObserver};
    use crate::row::{TickSummaryRow, TrainSnapshotRow};

    /// `a ── b`, 500 m.
    fn short_world(config: SimConfig) -> (World, NodeId, NodeId) {
        let mut b = TrackNetworkBuilder::new();
        let a = b.add_node("a", NodeKind::Station, Point::new(0.0, 0.0)).unwrap();
        let z = b.add_node("b", NodeKind::Station, Point::new(0.5, 0.0)).unwrap();
        b.add_track(a, z, 500.0, 30).unwrap();
        let world = SimBuilder::new(config, b.build()).build().unwrap();
        (world, a, z)
    }

    #[test]
    fn run_writes_one_summary_per_tick() {
        let dir = tempfile::tempdir().unwrap();
        let config = SimConfig { output_interval_ticks: 5, ..SimConfig::default() };
        let (mut world, a, z) = short_world(config);
        world.dispatch(TrainSpec::new("Local_1", a, z, TrainKind::Local, 2)).unwrap();

        let mut obs = SimOutputObserver::new(CsvWriter::new(dir.path()).unwrap());
        world.run_ticks(20, &mut obs).unwrap();
        obs.on_sim_end(world.clock.current_tick);
        assert!(obs.take_error().is_none());

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 20);
        assert_eq!(&rows[0][0], "1");
        assert_eq!(&rows[19][0], "20");

        let mut rdr = csv::Reader::from_path(dir.path().join("train_snapshots.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        let ticks: Vec<&str> = rows.iter().map(|r| r.get(0).unwrap()).collect();
        assert_eq!(ticks, ["5", "10", "15", "20"]);
        assert!(rows.iter().all(|r| &r[1] == "Local_1"));
    }

    /// Fails every write.
    struct Broken;

    impl OutputWriter for Broken {
        fn write_snapshots(&mut self, _rows: &[TrainSnapshotRow]) -> OutputResult<()> {
            Err(OutputError::Io(std::io::Error::other("disk full")))
        }
        fn write_tick_summary(&mut self, _row: &TickSummaryRow) -> OutputResult<()> {
            Err(OutputError::Io(std::io::Error::other("disk full")))
        }
        fn finish(&mut self) -> OutputResult<()> {
            Ok(())
        }
    }

    #[test]
    fn first_error_is_kept() {
        let (mut world, _, _) = short_world(SimConfig::default());
        let mut obs = SimOutputObserver::new(Broken);
        world.run_ticks(3, &mut obs).unwrap();
        obs.on_sim_end(Tick(3));
        assert!(matches!(obs.take_error(), Some(OutputError::Io(_))));
        assert!(obs.take_error().is_none());
    }
}
