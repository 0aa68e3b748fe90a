mod countdown;
mod render;
mod sound;
mod storage;
mod sweep;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use countdown::CountdownEnd;
use mayhem_game::constants::MAX_ROUNDS;
use mayhem_game::{
    AllocationError, AllocatorConfig, AllocatorPolicy, Companion, DecayPolicy, EngineError, StartOutcome,
    TileAllocator, TotalsPolicy,
};
use render::{allocation_lines, slide_lines, status_lines, supply_color};
use sound::Speaker;
use storage::FileStore;

type CliCompanion = Companion<FileStore, Speaker>;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Totals {
    /// Any total inside the player count's range
    Range,
    /// Only totals that split evenly between survivors
    Divisible,
}

impl From<Totals> for TotalsPolicy {
    fn from(value: Totals) -> Self {
        match value {
            Totals::Range => Self::Range,
            Totals::Divisible => Self::Divisible,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Decay {
    /// Remove a number of random supply tiles
    Count,
    /// Remove one tile of a named supply
    Category,
}

impl From<Decay> for DecayPolicy {
    fn from(value: Decay) -> Self {
        match value {
            Decay::Count => Self::Count,
            Decay::Category => Self::Category,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "mayhem", version)]
#[command(about = "Companion for Countdown to Mayhem - round timer, board setup and rules")]
struct Args {
    /// Saved game file
    #[arg(long, global = true, default_value = ".mayhem-state.json")]
    state: PathBuf,

    /// Allocator config JSON (tile ranges and ratios)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// How first-day board totals are drawn
    #[arg(long, global = true, value_enum, default_value_t = Totals::Divisible)]
    totals: Totals,

    /// What later days remove from the board
    #[arg(long, global = true, value_enum, default_value_t = Decay::Category)]
    decay: Decay,

    /// Seed for every random draw (random when omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Silence sound cues
    #[arg(long, global = true)]
    mute: bool,

    /// Length of one countdown second in milliseconds
    #[arg(long, global = true, default_value_t = 1000)]
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the round, the clock and any needed supply
    Status,
    /// Calculate the board for today's survivors and start the round
    Setup {
        /// Survivors still in the game (2-5)
        #[arg(short, long)]
        players: u32,
    },
    /// Resume a paused round, or open setup for the next day
    Start,
    /// Read the rules guide
    Rules {
        /// Slide to show, starting at 1
        #[arg(long, conflicts_with = "all")]
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        page: Option<u64>,

        /// Print every slide
        #[arg(long)]
        all: bool,
    },
    /// Wipe the saved game and start over
    Reset,
    /// Draw many boards per player count and report on them
    Sweep {
        /// Boards drawn per player count
        #[arg(long, default_value_t = 1000)]
        iterations: usize,

        /// Output report format
        #[arg(long, default_value = "console")]
        #[arg(value_parser = ["json", "console"])]
        report: String,

        /// Optional path to write the report output instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Command::Sweep {
        iterations,
        report,
        output,
    } = &args.command
    {
        return cmd_sweep(&args, *iterations, report, output.clone());
    }

    announce_banner();
    let mut companion = open_companion(&args)?;
    let second = Duration::from_millis(args.tick_ms);

    match &args.command {
        Command::Status => cmd_status(&companion),
        Command::Setup { players } => cmd_setup(&mut companion, *players, second).await?,
        Command::Start => cmd_start(&mut companion, second).await?,
        Command::Rules { page, all } => cmd_rules(&mut companion, *page, *all)?,
        Command::Reset => {
            companion.reset()?;
            println!("{}", "🧹 Saved game wiped. A new game awaits.".green());
        }
        Command::Sweep { .. } => {}
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn announce_banner() {
    println!("{}", "🎲 Countdown to Mayhem".bright_cyan().bold());
    println!("{}", "======================".cyan());
}

fn build_allocator(args: &Args) -> Result<TileAllocator> {
    let policy = AllocatorPolicy {
        totals: args.totals.into(),
        decay: args.decay.into(),
    };
    let Some(path) = &args.config else {
        return Ok(TileAllocator::default().with_policy(policy));
    };
    let config = load_config(path)?;
    TileAllocator::new(&config, policy)
        .with_context(|| format!("invalid allocator config {}", path.display()))
}

fn load_config(path: &Path) -> Result<AllocatorConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read allocator config {}", path.display()))?;
    AllocatorConfig::from_json(&raw)
        .with_context(|| format!("invalid allocator config {}", path.display()))
}

fn resolve_seed(args: &Args) -> u64 {
    let seed = args.seed.unwrap_or_else(rand::random);
    log::debug!("using seed {seed}");
    seed
}

fn open_companion(args: &Args) -> Result<CliCompanion> {
    let allocator = build_allocator(args)?;
    let store = FileStore::open(&args.state)
        .with_context(|| format!("failed to open saved game {}", args.state.display()))?;
    log::debug!("saved game at {}", store.path().display());
    Companion::load(
        store,
        Speaker::new(args.mute),
        allocator,
        resolve_seed(args),
    )
    .context("failed to restore saved game")
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn cmd_status(companion: &CliCompanion) {
    print_lines(&status_lines(companion.timer(), companion.session()));
}

fn reject(err: &AllocationError) -> ! {
    eprintln!("❌ {}", err.to_string().red());
    std::process::exit(1);
}

async fn cmd_setup(companion: &mut CliCompanion, players: u32, second: Duration) -> Result<()> {
    let timer = companion.timer();
    if timer.is_game_over() {
        bail!("all {MAX_ROUNDS} days are over; run `mayhem reset` to play again");
    }
    if timer.is_resumable() {
        bail!("a round is in progress; run `mayhem start` to resume it");
    }
    // Rejected input must leave the saved game untouched, so check before
    // opening the next day.
    if let Err(err) = companion.check_survivors(players) {
        reject(&err);
    }
    if !companion.timer().setup_open {
        companion.start()?;
    }

    let copy = companion.timer().setup_copy();
    println!("{}", copy.title.bright_yellow().bold());
    println!("{}", copy.subtitle.bold());
    println!("{}", copy.description);
    println!();

    let allocation = match companion.calculate(players) {
        Ok(allocation) => allocation,
        Err(EngineError::Allocation(err)) => reject(&err),
        Err(err) => return Err(err.into()),
    };
    print_lines(&allocation_lines(&allocation));
    println!();
    println!("{}", copy.proceed_label.bright_green().bold());

    companion.proceed()?;
    run_round(companion, second).await
}

async fn cmd_start(companion: &mut CliCompanion, second: Duration) -> Result<()> {
    match companion.start()? {
        StartOutcome::Resumed => {
            println!("{}", companion.timer().round_label().bold());
            run_round(companion, second).await
        }
        StartOutcome::SetupRequired => {
            let copy = companion.timer().setup_copy();
            println!("{}", copy.title.bright_yellow().bold());
            println!("{}", copy.description);
            println!(
                "Run {} to calculate the board.",
                "mayhem setup --players <2-5>".bold()
            );
            Ok(())
        }
        StartOutcome::GameOver => {
            println!(
                "{}",
                "All days survived. Run `mayhem reset` to play again.".yellow()
            );
            Ok(())
        }
    }
}

async fn run_round(companion: &mut CliCompanion, second: Duration) -> Result<()> {
    let started = Instant::now();
    let end = countdown::run(companion, second).await?;
    log::debug!("countdown ended after {:?}: {end:?}", started.elapsed());
    match end {
        CountdownEnd::DayOver { next_round, needed } => {
            println!("{}", "⏰ DAY COMPLETE!".bright_red().bold());
            println!(
                "NEEDED SUPPLY: {}",
                supply_color(needed, needed.name()).bold()
            );
            println!(
                "Run {} when day {next_round} begins.",
                "mayhem setup --players <survivors>".bold()
            );
        }
        CountdownEnd::GameOver => {
            println!("{}", "🏁 All days survived. GAME OVER.".bright_green().bold());
        }
        CountdownEnd::Paused => {
            println!(
                "{} Run {} to resume.",
                "⏸ Round paused.".yellow(),
                "mayhem start".bold()
            );
        }
    }
    Ok(())
}

fn cmd_rules(companion: &mut CliCompanion, page: Option<u64>, all: bool) -> Result<()> {
    let mut guide = companion.open_guide()?;
    if all {
        for index in 0..guide.len() {
            guide.go_to(index);
            print_lines(&slide_lines(&guide));
            println!();
        }
        return Ok(());
    }
    let index = page
        .and_then(|page| usize::try_from(page - 1).ok())
        .unwrap_or(0);
    guide.go_to(index);
    print_lines(&slide_lines(&guide));
    if !guide.is_last() {
        println!(
            "{} mayhem rules --page {}",
            guide.next_label().dimmed(),
            guide.index() + 2
        );
    }
    Ok(())
}

fn cmd_sweep(args: &Args, iterations: usize, report: &str, output: Option<PathBuf>) -> Result<()> {
    let allocator = build_allocator(args)?;
    let seed = resolve_seed(args);
    let start_time = Instant::now();
    let results = sweep::run(&allocator, iterations, seed)?;

    let mut output_target = OutputTarget::new(output)?;
    match report {
        "json" => sweep::generate_json_report(&mut output_target, &results)?,
        _ => {
            sweep::generate_console_report(&mut output_target, &results)?;
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }
    output_target.flush_inner()?;

    if !results.passed() {
        std::process::exit(1);
    }
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
