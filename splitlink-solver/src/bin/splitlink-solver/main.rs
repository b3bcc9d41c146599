mod result;

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use log::error;
use log::info;
use log::LevelFilter;
use result::SolverResult;
use splitlink_core::build_layer_tree_with_statistics;
use splitlink_core::convert_case::Case;
use splitlink_core::jobs::JobTag;
use splitlink_core::model::Solution;
use splitlink_core::statistics::configure_statistic_logging;
use splitlink_core::statistics::log_statistic_postfix;
use splitlink_core::statistics::should_log_statistics;
use splitlink_core::statistics::Statistic;
use splitlink_core::statistics::StatisticLogger;
use splitlink_core::LayerTreeOptions;
use splitlink_solver::parsers::instance::parse_instance;

#[derive(Debug, Parser)]
#[command(
    help_template = "\
{before-help}{name} {version}
Authors: {author}
About: {about}

{usage-heading}\n{tab}{usage}

{all-args}{after-help}
",
    author,
    version,
    about,
    arg_required_else_help = true
)]
struct Args {
    /// The instance to build a layer tree for, in the line-based instance format.
    instance_path: PathBuf,

    /// Keep a node which fits its parent node exactly, instead of assigning its segments to the
    /// segments of the parent.
    #[arg(long)]
    no_trivial_assignments: bool,

    /// Do not merge the nodes of events which share their resources.
    #[arg(long)]
    no_node_merging: bool,

    /// Leave out the jobs of a constraint family. May be given more than once.
    #[arg(long = "skip-job", value_enum)]
    skipped_jobs: Vec<JobTag>,

    /// Enables logging of the decisions taken on the split forest.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Print the statistics of the build after the layer tree.
    #[arg(short = 's', long = "log-statistics")]
    log_statistics: bool,
}

impl Args {
    fn layer_tree_options(&self) -> LayerTreeOptions {
        LayerTreeOptions {
            make_trivial_assignments: !self.no_trivial_assignments,
            merge_resource_nodes: !self.no_node_merging,
            skipped_jobs: self.skipped_jobs.iter().copied().collect(),
        }
    }
}

fn configure_logging(verbose: bool, log_statistics: bool) {
    if log_statistics {
        configure_statistic_logging("%% stat:", None, Some(Case::Snake), None);
    }
    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .format(move |buf, record| {
            write!(buf, "% ")?;
            writeln!(buf, "{}", record.args())
        })
        .filter_level(level_filter)
        .target(env_logger::Target::Stdout)
        .init();
    info!("Logging successfully configured");
}

fn main() {
    match run() {
        Ok(()) => {}
        Err(e) => {
            error!("Execution failed, error: {e}");
            std::process::exit(1);
        }
    }
}

fn run() -> SolverResult<()> {
    let args = Args::parse();
    configure_logging(args.verbose, args.log_statistics);

    let instance = parse_instance(File::open(&args.instance_path)?)?;
    let mut solution = Solution::new(&instance);
    let (_, statistics) =
        build_layer_tree_with_statistics(&instance, &mut solution, args.layer_tree_options())?;

    print!("{solution}");
    if should_log_statistics() {
        statistics.log(StatisticLogger::default());
        log_statistic_postfix();
    }
    Ok(())
}
