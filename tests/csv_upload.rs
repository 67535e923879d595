use agristat::catalog::FetchQuery;
use agristat::ingestion::{CsvConnector, DatasetSource, SimulatedSource};
use agristat::session::SessionContext;
use agristat::AnalysisError;
use std::fs;
use std::path::PathBuf;

/// Write a CSV fixture into a per-test temp directory
fn write_csv(name: &str, contents: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let dir = std::env::temp_dir().join(format!("agristat-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{}.csv", name));
    fs::write(&path, contents)?;
    Ok(path)
}

#[test]
fn test_upload_analyze_and_ask() -> Result<(), Box<dyn std::error::Error>> {
    let path = write_csv(
        "upload",
        "Year,Value,Unit,Country\n\
         2015,1200.5,tonnes,Peru\n\
         2016,,tonnes,Peru\n\
         2017,1350,tonnes,Peru\n\
         2018,n/a,tonnes,Peru\n\
         2019,1500,tonnes,Peru\n",
    )?;

    let connector = CsvConnector::from_path(&path)?;
    assert_eq!(connector.source_id(), "upload");
    assert_eq!(connector.source_uri(), Some(path.display().to_string().as_str()));
    let dataset = connector.read_dataset()?;
    assert_eq!(dataset.row_count(), 5);

    let mut session = SessionContext::default();
    let report = session.load_dataset(dataset)?;

    // "n/a" reads as a missing cell, so Value stays numeric
    assert_eq!(report.stats.columns, 4);
    assert_eq!(report.stats.numeric_columns, 2);
    assert_eq!(report.describe.iter().map(|s| s.column.as_str()).collect::<Vec<_>>(), vec!["Year", "Value"]);
    let years: Vec<i64> = report
        .trend
        .series()
        .map(|s| s.points().iter().map(|p| p.year).collect())
        .unwrap_or_default();
    assert_eq!(years, vec![2015, 2017, 2019]);

    assert!(session.ask("What is the highest value?")?.contains("1,500.00"));
    assert!(session.ask("earliest year?")?.contains("2015"));

    fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn test_na_markers_keep_value_column_numeric() -> Result<(), Box<dyn std::error::Error>> {
    let path = write_csv("markers", "Year,Value\n2010,100\n2011,NA\n2012,NaN\n2013,121\n")?;
    let dataset = CsvConnector::from_path(&path)?.read_dataset()?;

    let mut session = SessionContext::default();
    let report = session.load_dataset(dataset)?;

    assert_eq!(report.stats.numeric_columns, 2);
    let value = report
        .describe
        .iter()
        .find(|s| s.column == "Value")
        .ok_or("Value missing from describe table")?;
    assert_eq!(value.count, 2);
    assert_eq!(value.mean, Some(110.5));
    let change = report.metrics.change_percent.ok_or("change should be defined")?;
    assert!((change - 21.0).abs() < 1e-9);

    fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn test_missing_file_is_an_io_error() {
    let err = CsvConnector::from_path("/definitely/not/here.csv").err();
    assert!(matches!(err, Some(AnalysisError::Io(_))));
}

#[test]
fn test_simulated_fetch_flows_through_session() -> Result<(), Box<dyn std::error::Error>> {
    let source = SimulatedSource::new("simulator".to_string(), 11);
    assert_eq!(source.source_type(), "simulator");

    let query = FetchQuery::new("Prices", "Producer Price", "Tea", "Kenya", 1990, 2009)?;
    let mut session = SessionContext::default();
    let report = session.fetch(&source, query)?;

    assert_eq!(report.stats.rows, 20);
    assert_eq!(report.annual_changes.len(), 20);
    assert!(report.metrics.volatility_percent.is_some());
    assert!(!report.recommendations.is_empty());
    assert_eq!(session.last_query().map(|q| q.country.as_str()), Some("Kenya"));
    assert!(session.ask("trend")?.starts_with("The overall trend from 1990 to 2009"));
    Ok(())
}
