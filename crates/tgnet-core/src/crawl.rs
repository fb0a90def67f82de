use std::{collections::HashSet, path::PathBuf, sync::Arc};

use chrono::NaiveTime;
use tracing::info;

use crate::{
    classify::Classifier,
    config::Config,
    domain::{ChatId, Discovery},
    record::Run,
    scan::Scanner,
    seeds,
    source::{MessageSource, ScanWindow},
    Result,
};

/// Outcome of one crawl, for callers that want to assert or report without
/// re-reading the output files.
#[derive(Clone, Debug)]
pub struct CrawlSummary {
    pub rounds_run: u32,
    pub nodes_written: usize,
    pub edges_written: usize,
    pub run_dir: PathBuf,
}

/// Bounded breadth-first expansion over the chat graph.
///
/// Each round scans every chat in the current frontier sequentially,
/// persists everything discovered, then promotes the discovered targets to
/// the next frontier. A round is fully persisted before the next begins.
pub struct Crawler {
    source: Arc<dyn MessageSource>,
    config: Config,
}

impl Crawler {
    pub fn new(source: Arc<dyn MessageSource>, config: Config) -> Self {
        Self { source, config }
    }

    /// Load seeds from the configured file and crawl.
    pub async fn run(&self) -> Result<CrawlSummary> {
        let seeds = seeds::load(&self.config.seeds_file)?;
        self.run_with_seeds(seeds).await
    }

    pub async fn run_with_seeds(&self, seeds: Vec<ChatId>) -> Result<CrawlSummary> {
        let mut run = Run::open(&self.config.data_dir)?;

        let classifier = Classifier::new(self.source.clone(), self.config.mention_policy);
        let scanner = Scanner::new(self.source.clone(), classifier, self.config.pacing);
        let window = self.window();

        // Seeds count as visited from the start, so a cycle back into the
        // seed set is caught when tracking is on.
        let mut visited: HashSet<ChatId> = seeds.iter().copied().collect();
        let mut frontier = seeds;

        let mut rounds_run = 0;
        let mut nodes_written = 0;
        let mut edges_written = 0;

        for round in 0..self.config.rounds {
            if frontier.is_empty() {
                break;
            }
            rounds_run += 1;
            run.log().info(
                "crawl",
                &format!("round {round}: scanning {} chats", frontier.len()),
            );
            info!(round, chats = frontier.len(), "scanning frontier");

            let mut discovered: Vec<Discovery> = Vec::new();
            for seed in &frontier {
                let found = scanner.scan(run.log(), *seed, window).await;
                discovered.extend(found);
            }

            let nodes: Vec<_> = discovered.iter().map(Discovery::node).collect();
            let edges: Vec<_> = discovered.iter().map(Discovery::edge).collect();
            run.append_nodes(&nodes)?;
            run.append_edges(&edges)?;
            nodes_written += nodes.len();
            edges_written += edges.len();
            run.log().info(
                "crawl",
                &format!(
                    "round {round}: recorded {} nodes, {} edges",
                    nodes.len(),
                    edges.len()
                ),
            );

            let mut next: Vec<ChatId> = discovered.iter().map(|d| d.target).collect();
            if self.config.track_visited {
                next.retain(|id| visited.insert(*id));
            }
            frontier = next;
        }

        run.log()
            .info("crawl", &format!("crawl complete after {rounds_run} rounds"));
        info!(rounds_run, nodes_written, edges_written, "crawl complete");

        let run_dir = run.dir().to_path_buf();
        run.close()?;
        Ok(CrawlSummary {
            rounds_run,
            nodes_written,
            edges_written,
            run_dir,
        })
    }

    fn window(&self) -> ScanWindow {
        match self.config.offset_date {
            Some(date) => ScanWindow::since(date.and_time(NaiveTime::MIN).and_utc()),
            None => ScanWindow::newest(self.config.message_limit),
        }
    }
}
