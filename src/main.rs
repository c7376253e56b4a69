use std::{fs, path::PathBuf, thread, time::Duration};

use _model::{ResultSet, SearchParams, MAX_RESULTS};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::ProgressBar;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use placefinder::{
    config::Config,
    error::ExportError,
    export::ExportFormat,
    job::SearchJobs,
    search::{FeatureSource, Geocoder, Nominatim, Overpass, SearchPipeline},
    session::Session,
    utils,
};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Parser)]
#[command(name = "placefinder")]
#[command(about = "Find establishments near a location using OpenStreetMap data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search for establishments by name around a location.
    Search(SearchArgs),
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// What to look for, e.g. "padaria" or "pizza".
    establishment_type: String,
    /// Where to look, as free text.
    location: String,
    #[arg(short = 'n', long, default_value_t = MAX_RESULTS, value_parser = clap::value_parser!(u32).range(1..=MAX_RESULTS as i64))]
    max_results: u32,
    /// Write the results in these formats (repeatable).
    #[arg(short, long, value_enum)]
    export: Vec<ExportFormat>,
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Run the search as a background job and poll it for status.
    #[arg(long)]
    background: bool,
    #[command(flatten)]
    config: Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("placefinder=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Search(args) => search(args),
    }
}

fn search(args: SearchArgs) -> Result<()> {
    let agent = utils::agent(&args.config);
    let pipeline = SearchPipeline::new(
        Nominatim::new(agent.clone(), &args.config.nominatim_url),
        Overpass::new(agent, &args.config.overpass_url),
    )
    .with_radius(args.config.radius_m)
    .with_enrich_delay(args.config.enrich_delay());

    let params = SearchParams {
        establishment_type: args.establishment_type,
        location: args.location,
        max_results: args.max_results,
    };

    let mut session = Session::default();
    let mut pb = utils::progress_bar();
    let outcome = if args.background {
        run_in_background(pipeline, params, &mut session, &pb)
    } else {
        pipeline
            .run_search(&mut session, params, &mut pb)
            .map(|_| ())
            .map_err(Into::into)
    };
    pb.finish_and_clear();
    outcome.context("search failed")?;

    let Some(set) = session.current() else {
        bail!("search finished without results");
    };
    render(set);

    for format in args.export {
        let export = match session.export(format) {
            Ok(x) => x,
            Err(ExportError::EmptyResultSet) => {
                warn!(?format, "nothing to export");
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let path = args.out_dir.join(export.file_name);
        fs::write(&path, &export.contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), mime = export.mime_type, "exported");
    }

    Ok(())
}

fn run_in_background<G, F>(
    pipeline: SearchPipeline<G, F>,
    params: SearchParams,
    session: &mut Session,
    pb: &ProgressBar,
) -> Result<()>
where
    G: Geocoder + Send + Sync + 'static,
    F: FeatureSource + Send + Sync + 'static,
{
    let mut jobs = SearchJobs::new(pipeline);
    jobs.start(params)?;

    loop {
        let status = jobs.poll(session);
        pb.set_position(status.progress as u64);
        pb.set_message(status.message);

        if !status.is_running {
            if let Some(err) = status.error {
                bail!(err);
            }
            return Ok(());
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn render(set: &ResultSet) {
    println!(
        "{} in {}: {} result(s)",
        set.params.establishment_type,
        set.params.location,
        set.results.len()
    );

    for x in &set.results {
        println!();
        println!("{} ({})", x.name, x.kind);
        println!("  {}", x.address);
        println!("  tel: {}  web: {}", x.phone, x.website);
        println!("  hours: {}", x.opening_hours);
        if let (Some(rating), Some(count)) = (&x.average_rating, x.review_count) {
            let note = if x.is_synthetic { " [simulated]" } else { "" };
            println!("  {rating}/5 ({count} reviews){note}");
        }
        if let Some(c) = x.coordinates {
            println!("  {:.5}, {:.5}", c.lat, c.lon);
        }
        println!("  {}", x.map_url);
    }
}
