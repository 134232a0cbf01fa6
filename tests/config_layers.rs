//! Settings precedence: file, then environment, then flags.
//!
//! Kept in its own test binary because it mutates process environment.

use std::io::Write;

use clap::Parser;
use vitalsim::{Cli, OutputKind, ProducerKind};

#[test]
fn flags_beat_environment_which_beats_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
stream_name = "from-file"
partition_key = "from-file"
output = "file"
path = "/tmp/from-file.ndjson"
limit = 5

[heart_rate]
high = 0.2
"#
    )
    .unwrap();

    std::env::set_var("VITALSIM_PARTITION_KEY", "from-env");
    std::env::set_var("VITALSIM_LIMIT", "7");
    std::env::set_var("VITALSIM_HEART_RATE__HIGH", "0.3");

    let config = file.path().to_str().unwrap();
    let cli = Cli::try_parse_from([
        "vitalsim",
        "--config",
        config,
        "heart-rate",
        "--limit",
        "9",
    ])
    .unwrap();
    assert_eq!(cli.producer, ProducerKind::HeartRate);

    let settings = cli.settings().unwrap();
    // File only
    assert_eq!(settings.stream_name, "from-file");
    assert_eq!(settings.output, OutputKind::File);
    // Environment over file
    assert_eq!(settings.partition_key, "from-env");
    assert_eq!(settings.heart_rate.high, 0.3);
    // Flag over environment
    assert_eq!(settings.limit, Some(9));
    // Untouched default
    assert!(settings.echo);
}
