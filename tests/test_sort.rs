use std::fs;

use record_file_sort::config::Config;
use record_file_sort::external_sort;

mod common;

#[test]
fn two_record_file_ba_sorts_to_ab() -> Result<(), anyhow::Error> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input.dat");
    let output = dir.path().join("output.dat");

    let a = common::record(0x41);
    let b = common::record(0x42);
    let mut data = b.clone();
    data.extend_from_slice(&a);
    fs::write(&input, &data)?;

    let config = Config::new().with_tmp_dir(dir.path().to_path_buf());
    external_sort::sort(&input, &output, &config)?;

    let mut expected = a;
    expected.extend_from_slice(&b);
    assert_eq!(fs::read(&output)?, expected);
    Ok(())
}

#[test]
fn thousand_identical_records_round_trip() -> Result<(), anyhow::Error> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input.dat");
    let output = dir.path().join("output.dat");

    let data = common::identical_records(0x00, 1000);
    fs::write(&input, &data)?;

    let config = Config::new().with_tmp_dir(dir.path().to_path_buf());
    external_sort::sort(&input, &output, &config)?;

    assert_eq!(fs::read(&output)?, data);
    Ok(())
}

#[test]
fn descending_records_sort_to_ascending() -> Result<(), anyhow::Error> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input.dat");
    let output = dir.path().join("output.dat");

    fs::write(&input, common::descending_records(2_000))?;

    let config = Config::new()
        .with_memory_budget_bytes(20_000)
        .with_tmp_dir(dir.path().to_path_buf());
    external_sort::sort(&input, &output, &config)?;

    assert_eq!(fs::read(&output)?, common::ascending_records(2_000));
    Ok(())
}

#[test]
fn idempotent_on_already_sorted_input() -> Result<(), anyhow::Error> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input.dat");
    let output = dir.path().join("output.dat");

    let data = common::ascending_records(500);
    fs::write(&input, &data)?;

    let config = Config::new().with_tmp_dir(dir.path().to_path_buf());
    external_sort::sort(&input, &output, &config)?;

    assert_eq!(fs::read(&output)?, data);
    Ok(())
}

#[test]
fn empty_input_yields_empty_output_without_error() -> Result<(), anyhow::Error> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input.dat");
    let output = dir.path().join("output.dat");
    fs::write(&input, [])?;

    let config = Config::new().with_tmp_dir(dir.path().to_path_buf());
    external_sort::sort(&input, &output, &config)?;
    assert_eq!(fs::metadata(&output)?.len(), 0);
    Ok(())
}

#[test]
fn single_record_file_is_unchanged() -> Result<(), anyhow::Error> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input.dat");
    let output = dir.path().join("output.dat");
    let data = common::record(0x07);
    fs::write(&input, &data)?;

    let config = Config::new().with_tmp_dir(dir.path().to_path_buf());
    external_sort::sort(&input, &output, &config)?;
    assert_eq!(fs::read(&output)?, data);
    Ok(())
}

#[test]
fn trailing_partial_record_is_discarded_from_output() -> Result<(), anyhow::Error> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input.dat");
    let output = dir.path().join("output.dat");

    let mut data = common::ascending_records(10);
    data.extend_from_slice(&[0xaa; 37]);
    fs::write(&input, &data)?;

    let config = Config::new().with_tmp_dir(dir.path().to_path_buf());
    external_sort::sort(&input, &output, &config)?;
    assert_eq!(fs::read(&output)?, common::ascending_records(10));
    Ok(())
}

#[test]
fn memory_budget_smaller_than_a_record_is_a_configuration_error() {
    let config = Config::new().with_memory_budget_bytes(4);
    assert!(config.validate().is_err());
}
