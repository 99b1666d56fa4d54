use float_ord::FloatOrd;
use log::*;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::rerank::rerank_candidates;
use crate::retrieval::{retrieve_candidates, Retrieval};
use crate::settings::Settings;

/// The two output tables of a run, one `(query, reference)` row per query.
pub struct MatchTables {
    /// Best match per query after re-ranking.
    pub reranked: Vec<(usize, usize)>,
    /// Best match per query from global retrieval alone.
    pub baseline: Vec<(usize, usize)>,
}

/// Runs the whole pipeline: global retrieval, per-query re-ranking, and
/// arg-min selection of the final match.
///
/// Queries are independent of each other; the sequential mode processes
/// them in index order, the parallel mode dispatches them to a pinned
/// worker pool in batches of `settings.workers`. Either way the output is
/// ordered by query index.
pub fn run(dataset: &Dataset, settings: &Settings) -> Result<MatchTables> {
    let retrieval = retrieve_candidates(
        dataset.reference.globals(),
        dataset.queries.globals(),
        settings.top_n,
    )?;
    let matches = if settings.parallel {
        run_parallel(dataset, settings, &retrieval)?
    } else {
        run_sequential(dataset, settings, &retrieval)?
    };
    Ok(MatchTables {
        reranked: matches.into_iter().enumerate().collect(),
        baseline: retrieval.baseline().into_iter().enumerate().collect(),
    })
}

/// Re-ranks one query and selects the candidate of minimum score.
///
/// Ties keep the earliest candidate, so a query whose every candidate is
/// degenerate (all scores infinite) falls back to the global baseline.
fn best_match(
    dataset: &Dataset,
    settings: &Settings,
    retrieval: &Retrieval,
    query: usize,
) -> Result<(usize, f32)> {
    let dense = dataset.query_dense(query)?;
    let candidates = &retrieval.candidates[query];
    let scores = rerank_candidates(
        &dataset.reference,
        dense.view(),
        candidates,
        settings.window_length,
        settings.depth_threshold,
    );
    let (slot, score) = scores
        .iter()
        .enumerate()
        .min_by_key(|&(_, &score)| FloatOrd(score))
        .expect("candidate lists are never empty");
    Ok((candidates[slot], *score))
}

fn run_sequential(
    dataset: &Dataset,
    settings: &Settings,
    retrieval: &Retrieval,
) -> Result<Vec<usize>> {
    let total = dataset.queries.len();
    let mut matches = Vec::with_capacity(total);
    for query in 0..total {
        let (reference, score) = best_match(dataset, settings, retrieval, query)?;
        info!(
            "query {}/{}: matched reference {} at distance {}",
            query + 1,
            total,
            reference,
            score
        );
        matches.push(reference);
    }
    Ok(matches)
}

fn run_parallel(
    dataset: &Dataset,
    settings: &Settings,
    retrieval: &Retrieval,
) -> Result<Vec<usize>> {
    let workers = settings.workers.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()?;
    let total = dataset.queries.len();
    let queries: Vec<usize> = (0..total).collect();
    let mut matches = Vec::with_capacity(total);
    // One batch per worker count; the join between batches keeps at most
    // `workers` queries in flight.
    for batch in queries.chunks(workers) {
        let scored: Vec<(usize, f32)> = pool.install(|| {
            batch
                .par_iter()
                .map(|&query| best_match(dataset, settings, retrieval, query))
                .collect::<Result<Vec<_>>>()
        })?;
        for (&query, &(reference, score)) in batch.iter().zip(&scored) {
            debug!(
                "query {}: matched reference {} at distance {}",
                query, reference, score
            );
            matches.push(reference);
        }
        info!(
            "scored {}/{} queries",
            batch.last().map(|&q| q + 1).unwrap_or(0),
            total
        );
    }
    Ok(matches)
}

/// Writes a match table as plain text, one `query reference` row per line.
pub fn write_match_table(path: &Path, table: &[(usize, usize)]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for &(query, reference) in table {
        writeln!(out, "{} {}", query, reference)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_table_rows_are_two_columns() {
        let path = std::env::temp_dir().join("seq2single-match-table-test.txt");
        write_match_table(&path, &[(0, 4), (1, 2)]).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "0 4\n1 2\n");
        std::fs::remove_file(&path).unwrap();
    }
}
