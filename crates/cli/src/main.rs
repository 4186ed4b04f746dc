use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::SubscriberBuilder;

use tricross::scenes::{generate, SceneCfg};
use tricross::store::write_input;
use tricross::{naive, BuildCfg, Bvh, QueryCfg, Tolerance, TriangleStore};

mod render;
mod summary;

use render::{render, Answer, Format};
use summary::{write_summary, Summary, Timings};

#[derive(Parser)]
#[command(name = "tricross", version)]
#[command(about = "Find intersecting triangles in 3-D with a bounding volume hierarchy")]
struct Cmd {
    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// No log output at all
    #[arg(long, global = true)]
    quiet: bool,

    #[command(flatten)]
    run: RunOpts,

    #[command(subcommand)]
    action: Option<Action>,
}

#[derive(Subcommand)]
enum Action {
    /// Read triangles and print the intersections (the default)
    Solve(RunOpts),
    /// Run engine and oracle on the same input; fail if they disagree
    Compare(RunOpts),
    /// Write a synthetic input file to stdout
    Gen {
        kind: SceneKind,
        #[arg(long, default_value_t = 1000)]
        count: usize,
        /// Cell width, circle radius, half box side or soup extent
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
        #[arg(long, default_value_t = 228)]
        seed: u64,
    },
}

#[derive(Args, Clone, Debug)]
struct RunOpts {
    /// Input file (defaults to stdin)
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Format::Pairs)]
    format: Format,
    #[arg(long, value_enum, default_value_t = Engine::Bvh)]
    engine: Engine,
    /// Relative epsilon of the intersection predicate
    #[arg(long)]
    eps: Option<f64>,
    #[arg(long)]
    leaf_size: Option<usize>,
    /// Worker threads (defaults to the number of cores)
    #[arg(long)]
    threads: Option<usize>,
    /// Build and query on the calling thread only
    #[arg(long)]
    sequential: bool,
    /// Validate the hierarchy after building it
    #[arg(long)]
    check: bool,
    /// Write a JSON run summary to this path
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Engine {
    Bvh,
    Naive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SceneKind {
    Grid,
    Fan,
    Random,
    Soup,
}

impl RunOpts {
    fn tolerance(&self) -> Result<Tolerance> {
        match self.eps {
            None => Ok(Tolerance::default()),
            Some(e) if e.is_finite() && e >= 0.0 => Ok(Tolerance::with_eps(e)),
            Some(e) => bail!("--eps must be a finite non-negative number, got {e}"),
        }
    }

    fn build_cfg(&self) -> BuildCfg {
        let mut cfg = if self.sequential {
            BuildCfg::sequential()
        } else {
            BuildCfg::default()
        };
        if let Some(leaf) = self.leaf_size {
            cfg.leaf_size = leaf;
        }
        cfg
    }

    fn query_cfg(&self) -> QueryCfg {
        if self.sequential {
            QueryCfg::sequential()
        } else {
            QueryCfg::default()
        }
    }
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    init_logging(cmd.verbose, cmd.quiet);
    let out = match cmd.action {
        None => run(&cmd.run, false)?,
        Some(Action::Solve(opts)) => run(&opts, false)?,
        Some(Action::Compare(opts)) => run(&opts, true)?,
        Some(Action::Gen {
            kind,
            count,
            scale,
            seed,
        }) => gen(kind, count, scale, seed)?,
    };
    let mut stdout = io::stdout().lock();
    stdout.write_all(&out).context("writing stdout")?;
    stdout.flush().context("flushing stdout")?;
    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::OFF,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, _) => LevelFilter::DEBUG,
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();
}

fn read_store(input: Option<&Path>, tol: Tolerance) -> Result<TriangleStore> {
    let parsed = match input {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            TriangleStore::from_reader(io::BufReader::new(file), tol)
                .with_context(|| format!("reading {}", path.display()))?
        }
        None => TriangleStore::from_reader(io::stdin().lock(), tol).context("reading stdin")?,
    };
    Ok(parsed?)
}

fn solve(
    store: &TriangleStore,
    opts: &RunOpts,
    engine: Engine,
    timings: &mut Timings,
) -> Result<Answer> {
    match engine {
        Engine::Naive => {
            let t = Instant::now();
            let answer = if opts.format.wants_members() {
                Answer::Members(naive::members(store))
            } else {
                Answer::Pairs(naive::intersections(store)?)
            };
            timings.query_ms = ms_since(t);
            Ok(answer)
        }
        Engine::Bvh => {
            let t = Instant::now();
            let bvh = Bvh::build(store, opts.build_cfg())?;
            if opts.check {
                bvh.validate(store)?;
            }
            timings.build_ms = ms_since(t);
            tracing::info!(
                nodes = bvh.len(),
                depth = bvh.depth(),
                leaves = bvh.leaf_count(),
                "hierarchy ready"
            );
            let t = Instant::now();
            let q = opts.query_cfg();
            let answer = if opts.format.wants_members() {
                Answer::Members(bvh.members(store, q))
            } else {
                Answer::Pairs(bvh.intersections(store, q)?)
            };
            timings.query_ms = ms_since(t);
            Ok(answer)
        }
    }
}

fn run(opts: &RunOpts, compare: bool) -> Result<Vec<u8>> {
    if let Some(n) = opts.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .context("configuring the worker pool")?;
    }
    let tol = opts.tolerance()?;
    let mut timings = Timings::default();

    let t = Instant::now();
    let store = read_store(opts.input.as_deref(), tol)?;
    timings.parse_ms = ms_since(t);
    tracing::info!(triangles = store.len(), parse_ms = timings.parse_ms, "input parsed");

    let engine = if compare { Engine::Bvh } else { opts.engine };
    let answer = solve(&store, opts, engine, &mut timings)?;
    tracing::info!(
        results = answer.len(),
        build_ms = timings.build_ms,
        query_ms = timings.query_ms,
        "solved"
    );

    if compare {
        let oracle = solve(&store, opts, Engine::Naive, &mut Timings::default())?;
        if let Some(diff) = answer.first_difference(&oracle) {
            bail!("engine and oracle disagree at {diff}");
        }
        tracing::info!(results = answer.len(), "engine matches oracle");
    }

    if let Some(path) = &opts.summary {
        let s = Summary {
            version: tricross::VERSION,
            engine: format!("{engine:?}").to_lowercase(),
            format: format!("{:?}", opts.format).to_lowercase(),
            input: opts.input.clone(),
            triangles: store.len(),
            results: answer.len(),
            eps_rel: tol.eps_rel,
            leaf_size: opts.build_cfg().leaf_size,
            timings,
        };
        write_summary(path, &s)?;
    }

    let mut out = Vec::new();
    render(&mut out, &answer, opts.format, store.len())?;
    Ok(out)
}

fn gen(kind: SceneKind, count: usize, scale: f64, seed: u64) -> Result<Vec<u8>> {
    if !(scale.is_finite() && scale > 0.0) {
        bail!("--scale must be a positive finite number, got {scale}");
    }
    let cfg = match kind {
        SceneKind::Grid => SceneCfg::grid_for(count, scale),
        SceneKind::Fan => SceneCfg::Fan {
            count,
            radius: scale,
        },
        SceneKind::Random => SceneCfg::RandomBox {
            count,
            half_side: scale,
        },
        SceneKind::Soup => SceneCfg::Soup {
            count,
            extent: scale,
            size: scale / 10.0,
        },
    };
    let tris = generate(cfg, seed);
    tracing::info!(kind = ?kind, triangles = tris.len(), seed, "generated");
    let mut out = Vec::new();
    write_input(&mut out, &tris)?;
    Ok(out)
}

fn ms_since(t: Instant) -> f64 {
    t.elapsed().as_secs_f64() * 1e3
}
