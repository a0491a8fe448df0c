use crate::infra::load_reference_store;
use chrono::{Local, NaiveDate};
use clap::{ArgGroup, Args};
use offer_estimator::config::AppConfig;
use offer_estimator::data::{EventHistoryItem, GeoProperty};
use offer_estimator::error::AppError;
use offer_estimator::workflows::comparables::{ComparableFinder, ComparableSearchResult};
use offer_estimator::workflows::underwrite::{
    ReferenceStore, SubjectProfile, UnderwriteDefaults, UnderwriteRequest, UnderwriteScenarios,
    UnderwriteService,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct CompsArgs {
    /// JSON fixture holding `target`, `candidates` and `events`
    #[arg(long)]
    pub(crate) fixture: PathBuf,
    /// Evaluation date for the lookback windows (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["defaults", "request"])))]
pub(crate) struct UnderwriteArgs {
    /// Print the default rent and flip scenarios
    #[arg(long)]
    pub(crate) defaults: bool,
    /// JSON file with `comparables` and `subject` to underwrite
    #[arg(long)]
    pub(crate) request: Option<PathBuf>,
}

/// Offline neighborhood snapshot, shaped like the provider responses.
#[derive(Debug, Deserialize)]
pub(crate) struct CompsFixture {
    pub(crate) target: GeoProperty,
    #[serde(default)]
    pub(crate) candidates: Vec<GeoProperty>,
    #[serde(default)]
    pub(crate) events: Vec<EventHistoryItem>,
    #[serde(default)]
    pub(crate) condition: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CompsReport {
    pub(crate) today: NaiveDate,
    pub(crate) comparables: ComparableSearchResult,
    pub(crate) underwrite: UnderwriteScenarios,
}

pub(crate) fn run_comps(args: CompsArgs) -> Result<(), AppError> {
    let CompsArgs { fixture, today } = args;

    let config = AppConfig::load()?;
    let store = load_reference_store(config.reference_data_path.as_deref())?;
    let finder = ComparableFinder::new(config.comparables);
    let underwrite = UnderwriteService::new(Arc::new(store), UnderwriteDefaults::standard());

    let fixture: CompsFixture = serde_json::from_reader(BufReader::new(File::open(fixture)?))?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let report = comps_report(fixture, &finder, &underwrite, today);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(crate) fn comps_report<S: ReferenceStore>(
    fixture: CompsFixture,
    finder: &ComparableFinder,
    underwrite: &UnderwriteService<S>,
    today: NaiveDate,
) -> CompsReport {
    let CompsFixture {
        target,
        candidates,
        events,
        condition,
    } = fixture;

    let comparables = finder.find(&target, &candidates, &events, today);
    let subject = SubjectProfile::from_property(&target, condition);
    let scenarios = underwrite.underwrite(&comparables.properties, &subject);

    CompsReport {
        today,
        comparables,
        underwrite: scenarios,
    }
}

pub(crate) fn run_underwrite(args: UnderwriteArgs) -> Result<(), AppError> {
    let scenarios = match args.request {
        Some(path) => {
            let config = AppConfig::load()?;
            let store = load_reference_store(config.reference_data_path.as_deref())?;
            let service = UnderwriteService::new(Arc::new(store), UnderwriteDefaults::standard());
            let request: UnderwriteRequest =
                serde_json::from_reader(BufReader::new(File::open(path)?))?;
            service.underwrite(&request.comparables, &request.subject)
        }
        None => UnderwriteDefaults::standard().scenarios(),
    };

    println!("{}", serde_json::to_string_pretty(&scenarios)?);
    Ok(())
}
