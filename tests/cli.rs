use clap::Parser;
use vitalsim::{Cli, OutputKind, ProducerKind};

#[test]
fn defaults_without_config_or_flags() {
    let cli = Cli::try_parse_from(["vitalsim", "heart-rate"]).unwrap();
    let settings = cli.settings().unwrap();

    assert_eq!(cli.producer, ProducerKind::HeartRate);
    assert_eq!(settings.output, OutputKind::Stdout);
    assert_eq!(settings.stream_name, "inputStream");
    assert_eq!(settings.partition_key, "partitionkey");
    assert!(settings.limit.is_none());
}

#[test]
fn file_output_without_path_fails_validation() {
    let cli = Cli::try_parse_from(["vitalsim", "blood-pressure", "--output", "file"]).unwrap();
    let err = cli.settings().unwrap_err();
    assert!(err.to_string().contains("path"));
}

#[test]
fn inverted_thresholds_fail_validation() {
    let cli = Cli::try_parse_from([
        "vitalsim",
        "blood-pressure",
        "--low-threshold",
        "0.9",
        "--high-threshold",
        "0.1",
    ])
    .unwrap();
    assert!(cli.settings().is_err());
}

#[test]
fn unknown_output_is_a_parse_error() {
    assert!(Cli::try_parse_from(["vitalsim", "heart-rate", "--output", "kafka"]).is_err());
}

#[test]
fn config_flag_may_follow_producer() {
    let cli = Cli::try_parse_from(["vitalsim", "heart-rate", "--config", "vitalsim.toml"]).unwrap();
    assert_eq!(cli.config.unwrap().to_str(), Some("vitalsim.toml"));
}
