use std::fs;

use record_file_sort::config::{Config, WorkerCount};
use record_file_sort::{external_sort, external_sort_mt};

mod common;

#[test]
fn sort_and_sort_mt_produce_byte_identical_output() -> Result<(), anyhow::Error> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input.dat");
    fs::write(&input, common::seeded_random_records(42, 5_000))?;

    let config = Config::new()
        .with_memory_budget_bytes(50_000)
        .with_worker_count(WorkerCount::Fixed(4))
        .with_tmp_dir(dir.path().to_path_buf());

    let output_st = dir.path().join("output_st.dat");
    let output_mt = dir.path().join("output_mt.dat");
    external_sort::sort(&input, &output_st, &config)?;
    external_sort_mt::sort(&input, &output_mt, &config)?;

    let st = fs::read(&output_st)?;
    let mt = fs::read(&output_mt)?;
    assert_eq!(st, mt);

    // and both are actually sorted
    let records = common::into_records(&mt);
    assert!(records.windows(2).all(|w| w[0] <= w[1]));
    Ok(())
}

#[test]
fn sort_mt_with_forced_thread_count_covers_every_record() -> Result<(), anyhow::Error> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input.dat");
    let data = common::descending_records(25_000);
    fs::write(&input, &data)?;

    let config = Config::new()
        .with_memory_budget_bytes(100_000)
        .with_worker_count(WorkerCount::Fixed(4))
        .with_tmp_dir(dir.path().to_path_buf());

    let output = dir.path().join("output.dat");
    external_sort_mt::sort(&input, &output, &config)?;

    assert_eq!(fs::read(&output)?, common::ascending_records(25_000));
    Ok(())
}

#[test]
fn sort_mt_empty_input_yields_empty_output() -> Result<(), anyhow::Error> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input.dat");
    let output = dir.path().join("output.dat");
    fs::write(&input, [])?;

    let config = Config::new()
        .with_worker_count(WorkerCount::Fixed(4))
        .with_tmp_dir(dir.path().to_path_buf());
    external_sort_mt::sort(&input, &output, &config)?;
    assert_eq!(fs::metadata(&output)?.len(), 0);
    Ok(())
}

#[test]
fn sort_mt_with_more_threads_than_records_still_sorts() -> Result<(), anyhow::Error> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input.dat");
    fs::write(&input, common::descending_records(3))?;

    let config = Config::new()
        .with_worker_count(WorkerCount::Fixed(8))
        .with_tmp_dir(dir.path().to_path_buf());
    let output = dir.path().join("output.dat");
    external_sort_mt::sort(&input, &output, &config)?;

    assert_eq!(fs::read(&output)?, common::ascending_records(3));
    Ok(())
}

#[test]
fn sort_mt_leaves_no_scratch_files_behind() -> Result<(), anyhow::Error> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input.dat");
    let output = dir.path().join("output.dat");
    fs::write(&input, common::seeded_random_records(7, 2_000))?;

    let config = Config::new()
        .with_memory_budget_bytes(20_000)
        .with_worker_count(WorkerCount::Fixed(4))
        .with_tmp_dir(dir.path().to_path_buf());
    external_sort_mt::sort(&input, &output, &config)?;

    let leftovers: Vec<_> = fs::read_dir(dir.path())?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p != &input && p != &output)
        .collect();
    assert!(leftovers.is_empty(), "leftover scratch entries: {:?}", leftovers);
    Ok(())
}
