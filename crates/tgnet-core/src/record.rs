use std::{
    fs::{self, File, OpenOptions},
    io::{BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use chrono::{Local, Utc};

use crate::{
    domain::{ChatNode, Edge},
    Result,
};

pub const NODE_FILE: &str = "node.csv";
pub const EDGE_FILE: &str = "edge.csv";
pub const LOG_FILE: &str = "file.log";

const NODE_COLUMNS: [&str; 3] = ["id", "label", "size"];
const EDGE_COLUMNS: [&str; 4] = ["source", "target", "connection_type", "connection_date"];

/// Append-only log file scoped to one run.
///
/// Cheap to clone; every clone appends to the same file. Dropping the last
/// clone detaches the sink, so nothing keeps writing to a finished run.
/// Write failures here are swallowed: diagnostics must not take down a
/// crawl whose output files are still healthy.
#[derive(Clone)]
pub struct RunLog {
    file: Arc<Mutex<File>>,
}

impl RunLog {
    fn attach(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }

    pub fn debug(&self, component: &str, message: &str) {
        self.write("DEBUG", component, message);
    }

    pub fn info(&self, component: &str, message: &str) {
        self.write("INFO", component, message);
    }

    pub fn warn(&self, component: &str, message: &str) {
        self.write("WARN", component, message);
    }

    fn write(&self, level: &str, component: &str, message: &str) {
        let Ok(mut file) = self.file.lock() else {
            return;
        };
        let _ = writeln!(
            file,
            "{} {:5} {} {}",
            Utc::now().to_rfc3339(),
            level,
            component,
            message
        );
    }
}

/// One crawl's output directory: `node.csv`, `edge.csv` and `file.log`,
/// opened once and kept open for the run's lifetime.
pub struct Run {
    dir: PathBuf,
    log: RunLog,
    nodes: BufWriter<File>,
    edges: BufWriter<File>,
}

impl Run {
    /// Create a fresh timestamped directory under `data_dir` and open the
    /// output files inside it. Any failure here is fatal to the caller;
    /// persistence is the whole point.
    pub fn open(data_dir: &Path) -> Result<Run> {
        fs::create_dir_all(data_dir)?;
        let dir = unique_run_dir(data_dir)?;

        let log = RunLog::attach(&dir.join(LOG_FILE))?;

        let node_path = dir.join(NODE_FILE);
        let edge_path = dir.join(EDGE_FILE);
        ensure_file(&node_path, &NODE_COLUMNS)?;
        ensure_file(&edge_path, &EDGE_COLUMNS)?;

        let nodes = BufWriter::new(OpenOptions::new().append(true).open(&node_path)?);
        let edges = BufWriter::new(OpenOptions::new().append(true).open(&edge_path)?);

        log.info("record", &format!("opened run {}", dir.display()));
        Ok(Run {
            dir,
            log,
            nodes,
            edges,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn log(&self) -> &RunLog {
        &self.log
    }

    /// Append one row per node, in input order. No deduplication: a chat
    /// rediscovered in a later round is written again.
    pub fn append_nodes(&mut self, nodes: &[ChatNode]) -> Result<()> {
        for node in nodes {
            let size = node.size.map(|s| s.to_string()).unwrap_or_default();
            writeln!(
                self.nodes,
                "{}\t{}\t{}",
                node.id,
                sanitize_field(&node.label),
                size
            )?;
        }
        self.nodes.flush()?;
        Ok(())
    }

    pub fn append_edges(&mut self, edges: &[Edge]) -> Result<()> {
        for edge in edges {
            writeln!(
                self.edges,
                "{}\t{}\t{}\t{}",
                edge.source,
                edge.target,
                edge.connection_type,
                edge.observed_at.to_rfc3339()
            )?;
        }
        self.edges.flush()?;
        Ok(())
    }

    /// Flush and close the run. The log sink goes away with the last
    /// `RunLog` clone.
    pub fn close(mut self) -> Result<()> {
        self.nodes.flush()?;
        self.edges.flush()?;
        self.log.info("record", "run closed");
        Ok(())
    }
}

/// Create the file with a single header row, only if it does not already
/// exist. Safe to call repeatedly.
pub fn ensure_file(path: &Path, columns: &[&str]) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    let mut file = File::create(path)?;
    writeln!(file, "{}", columns.join("\t"))?;
    Ok(())
}

/// Run directories are named after the invocation timestamp; a numeric
/// suffix resolves same-second collisions.
fn unique_run_dir(data_dir: &Path) -> Result<PathBuf> {
    let stamp = Local::now().format("%d-%m-%Y_%H-%M-%S").to_string();
    let mut n = 1;
    loop {
        let candidate = if n == 1 {
            data_dir.join(format!("run_{stamp}"))
        } else {
            data_dir.join(format!("run_{stamp}_{n}"))
        };
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(err) => return Err(err.into()),
        }
    }
}

/// Titles go into tab-separated rows, so embedded tabs/newlines become
/// spaces.
fn sanitize_field(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}
