//! CLI integration tests.
//!
//! Tests cover:
//! - Argument parsing for every subcommand
//! - Config loading and validation against real INI files on disk
//! - Universe loading and threshold store selection
//! - Command dispatch exit codes with CSV data on disk

mod common;

use clap::Parser;
use common::*;
use findbetter::adapters::file_config_adapter::FileConfigAdapter;
use findbetter::cli::{self, Cli, Command, ThresholdAction};
use findbetter::domain::error::FindBetterError;
use findbetter::domain::thresholds::YIELD_THRESHOLD;
use findbetter::domain::trailing::TrailingWindow;
use std::path::PathBuf;
use std::process::ExitCode;

/// ExitCode has no equality; compare the debug form.
fn same_code(actual: ExitCode, expected: ExitCode) -> bool {
    format!("{actual:?}") == format!("{expected:?}")
}

struct Fixture {
    _csv: tempfile::NamedTempFile,
    _ini: tempfile::NamedTempFile,
    config: PathBuf,
}

fn fixture(extra: &str) -> Fixture {
    let csv = write_temp_file(&to_csv(&scenario_records()));
    let ini = write_temp_file(&format!(
        "[data]\ncsv_path = {}\n\n{}",
        csv.path().display(),
        extra
    ));
    let config = ini.path().to_path_buf();
    Fixture {
        _csv: csv,
        _ini: ini,
        config,
    }
}

fn run(args: &[&str]) -> ExitCode {
    cli::run(Cli::try_parse_from(args).unwrap())
}

mod argument_parsing {
    use super::*;

    #[test]
    fn find_better_parses_window_and_period() {
        let cli = Cli::try_parse_from([
            "findbetter",
            "find-better",
            "-c",
            "app.ini",
            "--fund",
            "1001",
            "--window",
            "3Y",
            "--period",
            "202312",
            "-n",
            "3",
        ])
        .unwrap();
        match cli.command {
            Command::FindBetter {
                fund,
                window,
                period: p,
                top,
                ..
            } => {
                assert_eq!(fund, 1001);
                assert_eq!(window, Some(TrailingWindow::THREE_YEARS));
                assert_eq!(p, Some(period(202312)));
                assert_eq!(top, Some(3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn invalid_window_is_rejected_by_parser() {
        let result = Cli::try_parse_from([
            "findbetter", "yield", "-c", "a.ini", "-f", "1", "-w", "2W",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_period_is_rejected_by_parser() {
        let result = Cli::try_parse_from([
            "findbetter", "yield", "-c", "a.ini", "-f", "1", "-p", "202313",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn thresholds_set_parses_operator() {
        let cli = Cli::try_parse_from([
            "findbetter",
            "thresholds",
            "-c",
            "a.ini",
            "set",
            "yield_threshold",
            "0.5",
            "--operator",
            "12",
        ])
        .unwrap();
        match cli.command {
            Command::Thresholds {
                action:
                    ThresholdAction::Set {
                        key,
                        value,
                        operator,
                    },
                ..
            } => {
                assert_eq!(key, "yield_threshold");
                assert_eq!(value, 0.5);
                assert_eq!(operator, Some(12));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn in_strategy_defaults_window_to_one_year() {
        let cli = Cli::try_parse_from([
            "findbetter",
            "in-strategy",
            "-c",
            "a.ini",
            "--target-yield",
            "10",
            "--stock",
            "45",
            "--stock-tol",
            "2",
        ])
        .unwrap();
        match cli.command {
            Command::InStrategy(args) => {
                assert_eq!(args.window, "1Y");
                assert_eq!(args.stock, Some(45.0));
                assert_eq!(args.stock_tol, Some(2.0));
                assert_eq!(args.target_std, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

mod config_loading {
    use super::*;

    #[test]
    fn load_config_accepts_valid_file() {
        let f = fixture("[find_better]\nwindow = 6M\ntop_n = 2\n");
        assert!(cli::load_config(&f.config).is_ok());
    }

    #[test]
    fn load_config_rejects_missing_file() {
        let code = cli::load_config(&PathBuf::from("/nonexistent/path/config.ini")).err();
        assert!(same_code(code.unwrap(), ExitCode::from(1)));
    }

    #[test]
    fn load_config_rejects_invalid_values() {
        let f = fixture("[find_better]\ntop_n = 0\n");
        let code = cli::load_config(&f.config).err();
        assert!(same_code(code.unwrap(), ExitCode::from(2)));
    }

    #[test]
    fn load_universe_reads_csv_and_precomputes() {
        let f = fixture("");
        let config = FileConfigAdapter::from_file(&f.config).unwrap();
        let universe = cli::load_universe(&config).unwrap();
        assert_eq!(universe.len(), 6);
        assert!(
            universe
                .series(1001)
                .unwrap()
                .precomputed(12, period(202312))
                .is_some()
        );
    }

    #[test]
    fn load_universe_missing_csv_is_io_error() {
        let config =
            FileConfigAdapter::from_string("[data]\ncsv_path = /nonexistent/funds.csv\n").unwrap();
        assert!(matches!(cli::load_universe(&config), Err(FindBetterError::Io(_))));
    }

    #[test]
    fn open_store_without_database_is_in_memory() {
        let config = FileConfigAdapter::from_string("[data]\ncsv_path = a.csv\n").unwrap();
        let store = cli::open_store(&config).unwrap();
        assert_eq!(store.get(YIELD_THRESHOLD), 0.1);
        assert!(store.update(YIELD_THRESHOLD, 0.3));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn open_store_uses_configured_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = dir.path().join("settings.db");
        let config = FileConfigAdapter::from_string(&format!(
            "[data]\ncsv_path = a.csv\n[settings]\nsqlite_path = {}\n",
            db.display()
        ))
        .unwrap();

        let store = cli::open_store(&config).unwrap();
        assert!(store.update(YIELD_THRESHOLD, 0.3));
        drop(store);

        let store = cli::open_store(&config).unwrap();
        assert_eq!(store.get(YIELD_THRESHOLD), 0.3);
        assert!(db.exists());
    }
}

mod dispatch {
    use super::*;

    fn cfg(f: &Fixture) -> &str {
        f.config.to_str().unwrap()
    }

    #[test]
    fn validate_succeeds() {
        let f = fixture("");
        assert!(same_code(
            run(&["findbetter", "validate", "-c", cfg(&f)]),
            ExitCode::SUCCESS
        ));
    }

    #[test]
    fn yield_succeeds_for_known_fund() {
        let f = fixture("");
        assert!(same_code(
            run(&["findbetter", "yield", "-c", cfg(&f), "-f", "1001"]),
            ExitCode::SUCCESS
        ));
    }

    #[test]
    fn yield_not_computable_exits_5() {
        let f = fixture("");
        assert!(same_code(
            run(&["findbetter", "yield", "-c", cfg(&f), "-f", "1001", "-w", "5Y"]),
            ExitCode::from(5)
        ));
    }

    #[test]
    fn find_better_succeeds() {
        let f = fixture("[find_better]\nwindow = 1Y\ntop_n = 3\n");
        assert!(same_code(
            run(&["findbetter", "find-better", "-c", cfg(&f), "-f", "1001"]),
            ExitCode::SUCCESS
        ));
    }

    #[test]
    fn find_better_unknown_fund_exits_4() {
        let f = fixture("");
        assert!(same_code(
            run(&["findbetter", "find-better", "-c", cfg(&f), "-f", "9999"]),
            ExitCode::from(4)
        ));
    }

    #[test]
    fn in_strategy_succeeds_with_no_matches() {
        let f = fixture("");
        assert!(same_code(
            run(&[
                "findbetter",
                "in-strategy",
                "-c",
                cfg(&f),
                "--target-yield",
                "99",
            ]),
            ExitCode::SUCCESS
        ));
    }

    #[test]
    fn in_strategy_bad_window_exits_2() {
        let f = fixture("");
        assert!(same_code(
            run(&[
                "findbetter",
                "in-strategy",
                "-c",
                cfg(&f),
                "--target-yield",
                "10",
                "-w",
                "forever",
            ]),
            ExitCode::from(2)
        ));
    }

    #[test]
    fn thresholds_set_without_database_exits_2() {
        let f = fixture("");
        assert!(same_code(
            run(&[
                "findbetter",
                "thresholds",
                "-c",
                cfg(&f),
                "set",
                "yield_threshold",
                "0.4",
            ]),
            ExitCode::from(2)
        ));
        let config = FileConfigAdapter::from_file(&f.config).unwrap();
        assert!(!cli::persistent_store_configured(&config));
        assert_eq!(cli::open_store(&config).unwrap().get(YIELD_THRESHOLD), 0.1);
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn thresholds_set_persists_to_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let f = fixture(&format!(
            "[settings]\nsqlite_path = {}\n",
            dir.path().join("settings.db").display()
        ));
        assert!(same_code(
            run(&[
                "findbetter",
                "thresholds",
                "-c",
                cfg(&f),
                "set",
                "yield_threshold",
                "9",
            ]),
            ExitCode::from(2)
        ));
        assert!(same_code(
            run(&[
                "findbetter",
                "thresholds",
                "-c",
                cfg(&f),
                "set",
                "yield_threshold",
                "0.4",
                "--operator",
                "12",
            ]),
            ExitCode::SUCCESS
        ));

        let config = FileConfigAdapter::from_file(&f.config).unwrap();
        let store = cli::open_store(&config).unwrap();
        assert_eq!(store.get(YIELD_THRESHOLD), 0.4);
        assert_eq!(store.get_setting(YIELD_THRESHOLD).unwrap().updated_by, Some(12));
    }

    #[test]
    fn period_missing_from_data_exits_4() {
        let f = fixture("");
        assert!(same_code(
            run(&["findbetter", "yield", "-c", cfg(&f), "-f", "1001", "-p", "202001"]),
            ExitCode::from(4)
        ));
        assert!(same_code(
            run(&[
                "findbetter",
                "in-strategy",
                "-c",
                cfg(&f),
                "--target-yield",
                "10",
                "-p",
                "202401",
            ]),
            ExitCode::from(4)
        ));
    }

    #[test]
    fn thresholds_list_and_periods_succeed() {
        let f = fixture("");
        assert!(same_code(
            run(&["findbetter", "thresholds", "-c", cfg(&f), "list"]),
            ExitCode::SUCCESS
        ));
        assert!(same_code(
            run(&["findbetter", "periods", "-c", cfg(&f)]),
            ExitCode::SUCCESS
        ));
    }
}
