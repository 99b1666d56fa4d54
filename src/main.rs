use log::*;
use seq2single::{Dataset, QuerySet, ReferenceData, Settings};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Clone)]
#[structopt(
    name = "seq2single",
    about = "Re-ranks global place-recognition candidates with depth-filtered, sequence-aggregated local matching"
)]
struct Opt {
    /// The file where settings are specified.
    ///
    /// This is in the format of `seq2single::Settings`.
    #[structopt(short, long, default_value = "seq2single-settings.json")]
    settings: PathBuf,
    /// Reference global descriptors (.npy, shape [numRefImages, dim]).
    #[structopt(long)]
    reference_globals: PathBuf,
    /// Query global descriptors (.npy, shape [numQueryImages, dim]).
    #[structopt(long)]
    query_globals: PathBuf,
    /// Directory of reference dense tensors, one zero-padded .npy per image.
    #[structopt(long)]
    reference_dense: PathBuf,
    /// Directory of query dense tensors, one zero-padded .npy per image.
    #[structopt(long)]
    query_dense: PathBuf,
    /// Reference depth maps (.npy, shape [numRefImages, rows, cols]).
    #[structopt(long)]
    depths: PathBuf,
    /// Feature grid rows.
    #[structopt(long, default_value = "20")]
    grid_rows: usize,
    /// Feature grid columns.
    #[structopt(long, default_value = "31")]
    grid_cols: usize,
    /// Output file for the re-ranked best match per query.
    #[structopt(long, default_value = "matches-reranked.txt")]
    reranked_output: PathBuf,
    /// Output file for the global-retrieval baseline match per query.
    #[structopt(long, default_value = "matches-global.txt")]
    baseline_output: PathBuf,
}

fn main() {
    pretty_env_logger::init_timed();
    let opt = Opt::from_args();

    let settings = std::fs::File::open(&opt.settings)
        .ok()
        .and_then(|file| serde_json::from_reader(file).ok());
    if settings.is_some() {
        info!("loaded existing settings");
    } else {
        info!("used default settings");
    }
    let settings: Settings = settings.unwrap_or_default();

    let reference = ReferenceData::load(
        &opt.reference_globals,
        &opt.reference_dense,
        &opt.depths,
        (opt.grid_rows, opt.grid_cols),
    )
    .expect("failed to load reference data");
    let queries =
        QuerySet::load(&opt.query_globals, &opt.query_dense).expect("failed to load query data");
    let dataset = Dataset::new(reference, queries).expect("reference and query sets disagree");

    info!(
        "re-ranking {} queries against {} reference images ({} mode)",
        dataset.queries.len(),
        dataset.reference.len(),
        if settings.parallel {
            "parallel"
        } else {
            "sequential"
        }
    );
    let tables = seq2single::run(&dataset, &settings).expect("re-ranking run failed");

    seq2single::write_match_table(&opt.reranked_output, &tables.reranked)
        .expect("failed to write re-ranked matches");
    seq2single::write_match_table(&opt.baseline_output, &tables.baseline)
        .expect("failed to write baseline matches");
    info!(
        "wrote {} matches to {:?} and {:?}",
        tables.reranked.len(),
        opt.reranked_output,
        opt.baseline_output
    );
}
